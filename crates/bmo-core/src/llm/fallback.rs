//! Multi-model fallback chain with per-candidate retry.
//!
//! Routes a completion through an ordered list of model candidates served by
//! one provider. Each candidate gets a bounded retry loop with exponential
//! backoff for transient errors (network, timeout, rate limit). Other
//! provider errors move on to the next candidate immediately. A rejected
//! API key aborts the whole chain: no candidate can succeed with bad
//! credentials.

use std::time::Duration;

use bmo_types::config::ModelSettings;
use bmo_types::llm::{
    CandidateFailure, CompletionRequest, CompletionResponse, LlmError, Message, ModelChainError,
};

use super::box_provider::BoxLlmProvider;

/// Retry budget applied to each candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per candidate, including the first one.
    pub max_attempts: u32,
    /// Delay before the first retry; doubled after every retry.
    pub initial_delay: Duration,
}

impl RetryPolicy {
    pub fn from_settings(settings: &ModelSettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            initial_delay: Duration::from_millis(settings.initial_backoff_ms),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
        }
    }
}

/// Build the ordered candidate list: primary first, then fallbacks, with
/// blanks and duplicates removed (first occurrence wins).
pub fn candidate_models(settings: &ModelSettings) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::with_capacity(settings.fallbacks.len() + 1);
    for model in std::iter::once(&settings.primary).chain(settings.fallbacks.iter()) {
        let model = model.trim();
        if model.is_empty() || candidates.iter().any(|c| c == model) {
            continue;
        }
        candidates.push(model.to_string());
    }
    candidates
}

/// A successful completion from the chain.
#[derive(Debug)]
pub struct ChainReply {
    /// Raw reply text from the model.
    pub content: String,
    /// Candidate that produced the reply.
    pub model: String,
}

/// How a single candidate ended when it did not succeed.
enum CandidateError {
    AuthenticationRejected,
    Failed(CandidateFailure),
}

/// Ordered model candidates over one provider, with retry and fallback.
///
/// Immutable after construction; share it behind an `Arc`.
pub struct ModelChain {
    provider: BoxLlmProvider,
    candidates: Vec<String>,
    retry: RetryPolicy,
    temperature: Option<f64>,
}

impl ModelChain {
    pub fn new(provider: BoxLlmProvider, candidates: Vec<String>, retry: RetryPolicy) -> Self {
        Self {
            provider,
            candidates,
            retry,
            temperature: None,
        }
    }

    /// Build a chain from model settings (candidate list, retry budget, temperature).
    pub fn from_settings(provider: BoxLlmProvider, settings: &ModelSettings) -> Self {
        Self::new(
            provider,
            candidate_models(settings),
            RetryPolicy::from_settings(settings),
        )
        .with_temperature(settings.temperature)
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Candidates in the order they are tried.
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Complete `messages`, trying each candidate in order.
    ///
    /// Returns the first successful reply. Fails fast with
    /// [`ModelChainError::AuthenticationRejected`] on bad credentials, or with
    /// [`ModelChainError::AllCandidatesExhausted`] listing every candidate's
    /// terminal error once the list runs out.
    pub async fn complete(&self, messages: &[Message]) -> Result<ChainReply, ModelChainError> {
        let mut failures = Vec::new();

        for (position, model) in self.candidates.iter().enumerate() {
            match self.complete_with_retry(messages, model).await {
                Ok(response) => {
                    tracing::debug!(
                        provider = self.provider.name(),
                        model = %model,
                        input_tokens = response.usage.input_tokens,
                        output_tokens = response.usage.output_tokens,
                        "Model candidate succeeded"
                    );
                    if position > 0 {
                        tracing::warn!(model = %model, "Failover occurred, switched to {model}");
                    }
                    return Ok(ChainReply {
                        content: response.content,
                        model: model.clone(),
                    });
                }
                Err(CandidateError::AuthenticationRejected) => {
                    tracing::error!(
                        provider = self.provider.name(),
                        model = %model,
                        "Authentication rejected, aborting model chain"
                    );
                    return Err(ModelChainError::AuthenticationRejected {
                        model: model.clone(),
                    });
                }
                Err(CandidateError::Failed(failure)) => {
                    tracing::warn!(
                        model = %model,
                        class = %failure.class,
                        attempts = failure.attempts,
                        detail = %failure.detail,
                        "Model candidate failed, trying next in chain"
                    );
                    failures.push(failure);
                }
            }
        }

        Err(ModelChainError::AllCandidatesExhausted { failures })
    }

    /// Run the bounded retry loop for one candidate.
    async fn complete_with_retry(
        &self,
        messages: &[Message],
        model: &str,
    ) -> Result<CompletionResponse, CandidateError> {
        let request = CompletionRequest {
            model: model.to_string(),
            messages: messages.to_vec(),
            temperature: self.temperature,
            json_object: true,
        };

        let max_attempts = self.retry.max_attempts.max(1);
        let mut delay = self.retry.initial_delay;
        let mut attempt = 1;

        loop {
            match self.provider.complete(&request).await {
                Ok(response) => return Ok(response),
                Err(LlmError::AuthenticationFailed) => {
                    return Err(CandidateError::AuthenticationRejected);
                }
                Err(err) if err.is_transient() && attempt < max_attempts => {
                    tracing::debug!(
                        model,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Transient model error, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    delay = delay.saturating_mul(2);
                    attempt += 1;
                }
                Err(err) => {
                    return Err(CandidateError::Failed(CandidateFailure {
                        model: model.to_string(),
                        class: err.failure_class(),
                        attempts: attempt,
                        detail: describe_failure(&err, attempt),
                    }));
                }
            }
        }
    }
}

fn describe_failure(err: &LlmError, attempts: u32) -> String {
    match err {
        LlmError::RateLimited { .. } => {
            format!("rate limit reached after {attempts} attempt(s), retry in a moment")
        }
        LlmError::Network(_) | LlmError::Timeout { .. } => {
            format!("could not reach provider after {attempts} attempt(s): {err}")
        }
        _ => format!("provider rejected the request: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::{Outcome, ScriptedProvider};
    use bmo_types::llm::{FailureClass, MessageRole};

    fn chain(provider: &ScriptedProvider, candidates: &[&str]) -> ModelChain {
        ModelChain::new(
            BoxLlmProvider::new(provider.clone()),
            candidates.iter().map(|c| c.to_string()).collect(),
            RetryPolicy::default(),
        )
    }

    fn messages() -> Vec<Message> {
        vec![
            Message::system("map"),
            Message {
                role: MessageRole::User,
                content: "Where is the library?".to_string(),
            },
        ]
    }

    #[test]
    fn test_candidate_models_primary_first_and_deduplicated() {
        let settings = ModelSettings {
            primary: "b".to_string(),
            fallbacks: vec![
                "a".to_string(),
                "b".to_string(),
                " ".to_string(),
                "c".to_string(),
                "a".to_string(),
            ],
            ..ModelSettings::default()
        };
        assert_eq!(candidate_models(&settings), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_candidate_models_primary_only() {
        let settings = ModelSettings {
            primary: "solo".to_string(),
            fallbacks: vec![],
            ..ModelSettings::default()
        };
        assert_eq!(candidate_models(&settings), vec!["solo"]);
    }

    #[test]
    fn test_candidate_models_defaults() {
        let candidates = candidate_models(&ModelSettings::default());
        assert_eq!(candidates.len(), 4);
        assert_eq!(candidates[0], "google/gemini-2.0-flash-exp:free");
    }

    #[test]
    fn test_retry_policy_from_settings() {
        let settings = ModelSettings {
            max_attempts: 0,
            initial_backoff_ms: 250,
            ..ModelSettings::default()
        };
        let policy = RetryPolicy::from_settings(&settings);
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.initial_delay, Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_primary_succeeds_first_try() {
        let provider = ScriptedProvider::new();
        provider.script("a", [Outcome::Reply("{}".into())]);
        provider.script("b", [Outcome::Reply("from b".into())]);

        let reply = chain(&provider, &["a", "b"]).complete(&messages()).await.unwrap();

        assert_eq!(reply.content, "{}");
        assert_eq!(reply.model, "a");
        assert_eq!(provider.calls(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_request_carries_model_messages_and_json_mode() {
        let provider = ScriptedProvider::new();
        provider.script("a", [Outcome::Reply("{}".into())]);

        chain(&provider, &["a"])
            .with_temperature(0.2)
            .complete(&messages())
            .await
            .unwrap();

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "a");
        assert_eq!(requests[0].messages, messages());
        assert_eq!(requests[0].temperature, Some(0.2));
        assert!(requests[0].json_object);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_retries_with_doubling_backoff() {
        let provider = ScriptedProvider::new();
        provider.script(
            "a",
            [
                Outcome::RateLimited,
                Outcome::RateLimited,
                Outcome::Reply("third time".into()),
            ],
        );
        provider.script("b", [Outcome::Reply("from b".into())]);

        let reply = chain(&provider, &["a", "b"]).complete(&messages()).await.unwrap();

        assert_eq!(reply.content, "third time");
        assert_eq!(reply.model, "a");
        assert_eq!(provider.calls(), vec!["a", "a", "a"]);

        let times = provider.call_times();
        let first_gap = times[1] - times[0];
        let second_gap = times[2] - times[1];
        assert!(
            first_gap >= Duration::from_secs(1) && first_gap < Duration::from_millis(1100),
            "first backoff was {first_gap:?}"
        );
        assert!(
            second_gap >= Duration::from_secs(2) && second_gap < Duration::from_millis(2100),
            "second backoff was {second_gap:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_and_timeout_errors_are_retried() {
        let provider = ScriptedProvider::new();
        provider.script(
            "a",
            [Outcome::Network, Outcome::Timeout, Outcome::Reply("ok".into())],
        );

        let reply = chain(&provider, &["a"]).complete(&messages()).await.unwrap();
        assert_eq!(reply.content, "ok");
        assert_eq!(provider.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_auth_error_short_circuits_chain() {
        let provider = ScriptedProvider::new();
        provider.script("a", [Outcome::Auth]);
        provider.script("b", [Outcome::Reply("from b".into())]);

        let err = chain(&provider, &["a", "b"])
            .complete(&messages())
            .await
            .unwrap_err();

        match err {
            ModelChainError::AuthenticationRejected { model } => assert_eq!(model, "a"),
            other => panic!("expected auth error, got {other:?}"),
        }
        assert_eq!(provider.calls(), vec!["a"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auth_error_after_transient_retry_still_aborts() {
        let provider = ScriptedProvider::new();
        provider.script("a", [Outcome::RateLimited, Outcome::Auth]);
        provider.script("b", [Outcome::Reply("from b".into())]);

        let err = chain(&provider, &["a", "b"])
            .complete(&messages())
            .await
            .unwrap_err();

        assert!(matches!(err, ModelChainError::AuthenticationRejected { .. }));
        assert_eq!(provider.calls(), vec!["a", "a"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_exhaustion_falls_back_to_next_candidate() {
        let provider = ScriptedProvider::new();
        provider.script("a", [Outcome::Network, Outcome::Network, Outcome::Network]);
        provider.script("b", [Outcome::Reply("from b".into())]);

        let reply = chain(&provider, &["a", "b"]).complete(&messages()).await.unwrap();

        assert_eq!(reply.content, "from b");
        assert_eq!(reply.model, "b");
        assert_eq!(provider.calls(), vec!["a", "a", "a", "b"]);
    }

    #[tokio::test]
    async fn test_provider_error_is_not_retried() {
        let provider = ScriptedProvider::new();
        provider.script("a", [Outcome::Provider("HTTP 500".into())]);
        provider.script("b", [Outcome::Reply("from b".into())]);

        let reply = chain(&provider, &["a", "b"]).complete(&messages()).await.unwrap();

        assert_eq!(reply.model, "b");
        assert_eq!(provider.calls(), vec!["a", "b"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_candidates_exhausted_aggregates_errors() {
        let provider = ScriptedProvider::new();
        provider.script(
            "a",
            [Outcome::RateLimited, Outcome::RateLimited, Outcome::RateLimited],
        );
        provider.script("b", [Outcome::Provider("HTTP 400: bad model".into())]);

        let err = chain(&provider, &["a", "b"])
            .complete(&messages())
            .await
            .unwrap_err();

        let msg = err.to_string();
        match err {
            ModelChainError::AllCandidatesExhausted { failures } => {
                assert_eq!(failures.len(), 2);
                assert_eq!(failures[0].model, "a");
                assert_eq!(failures[0].class, FailureClass::RateLimited);
                assert_eq!(failures[0].attempts, 3);
                assert_eq!(failures[1].model, "b");
                assert_eq!(failures[1].class, FailureClass::Provider);
                assert_eq!(failures[1].attempts, 1);
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
        assert!(msg.contains("a: rate limit reached"), "got: {msg}");
        assert!(msg.contains("b: provider rejected the request"), "got: {msg}");
        assert!(msg.contains("bad model"), "got: {msg}");
    }

    #[tokio::test]
    async fn test_empty_candidate_list_is_exhausted() {
        let provider = ScriptedProvider::new();
        let err = chain(&provider, &[]).complete(&messages()).await.unwrap_err();
        assert!(matches!(
            err,
            ModelChainError::AllCandidatesExhausted { ref failures } if failures.is_empty()
        ));
        assert!(provider.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_attempt_policy_never_sleeps() {
        let provider = ScriptedProvider::new();
        provider.script("a", [Outcome::RateLimited]);
        provider.script("b", [Outcome::Reply("from b".into())]);

        let chain = ModelChain::new(
            BoxLlmProvider::new(provider.clone()),
            vec!["a".into(), "b".into()],
            RetryPolicy {
                max_attempts: 1,
                initial_delay: Duration::from_secs(1),
            },
        );
        let start = tokio::time::Instant::now();
        let reply = chain.complete(&messages()).await.unwrap();

        assert_eq!(reply.model, "b");
        assert!(start.elapsed() < Duration::from_millis(10));
    }
}
