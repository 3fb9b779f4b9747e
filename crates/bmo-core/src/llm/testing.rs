//! Scripted provider shared by the chain and service tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use tokio::time::Instant;

use bmo_types::llm::{CompletionRequest, CompletionResponse, LlmError, Usage};

use super::provider::LlmProvider;

/// What one scripted call returns.
#[derive(Debug, Clone)]
pub(crate) enum Outcome {
    Reply(String),
    RateLimited,
    Network,
    Timeout,
    Auth,
    Provider(String),
}

impl Outcome {
    fn into_result(self, model: &str) -> Result<CompletionResponse, LlmError> {
        match self {
            Outcome::Reply(content) => Ok(CompletionResponse {
                id: format!("resp-{model}"),
                content,
                model: model.to_string(),
                usage: Usage {
                    input_tokens: 10,
                    output_tokens: 20,
                },
            }),
            Outcome::RateLimited => Err(LlmError::RateLimited {
                retry_after_ms: None,
            }),
            Outcome::Network => Err(LlmError::Network("connection refused".to_string())),
            Outcome::Timeout => Err(LlmError::Timeout { after_secs: 60 }),
            Outcome::Auth => Err(LlmError::AuthenticationFailed),
            Outcome::Provider(message) => Err(LlmError::Provider { message }),
        }
    }
}

#[derive(Default)]
struct Inner {
    scripts: HashMap<String, VecDeque<Outcome>>,
    calls: Vec<(String, Instant)>,
    requests: Vec<CompletionRequest>,
}

/// Provider returning pre-scripted outcomes per model, recording every call.
///
/// Clones share state, so a test can keep a handle after boxing one.
#[derive(Clone, Default)]
pub(crate) struct ScriptedProvider {
    inner: Arc<Mutex<Inner>>,
}

impl ScriptedProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn script(&self, model: &str, outcomes: impl IntoIterator<Item = Outcome>) {
        self.inner
            .lock()
            .unwrap()
            .scripts
            .entry(model.to_string())
            .or_default()
            .extend(outcomes);
    }

    /// Models called, in call order.
    pub(crate) fn calls(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap()
            .calls
            .iter()
            .map(|(model, _)| model.clone())
            .collect()
    }

    pub(crate) fn call_times(&self) -> Vec<Instant> {
        self.inner
            .lock()
            .unwrap()
            .calls
            .iter()
            .map(|(_, at)| *at)
            .collect()
    }

    pub(crate) fn requests(&self) -> Vec<CompletionRequest> {
        self.inner.lock().unwrap().requests.clone()
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let outcome = {
            let mut inner = self.inner.lock().unwrap();
            inner.calls.push((request.model.clone(), Instant::now()));
            inner.requests.push(request.clone());
            inner
                .scripts
                .get_mut(&request.model)
                .and_then(VecDeque::pop_front)
                .unwrap_or_else(|| Outcome::Provider("script exhausted".to_string()))
        };
        outcome.into_result(&request.model)
    }
}
