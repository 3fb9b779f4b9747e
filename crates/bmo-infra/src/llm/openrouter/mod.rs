//! OpenRouterProvider -- concrete [`LlmProvider`] for the OpenRouter API.
//!
//! One provider serves every candidate model in the chain; the model id
//! travels in each request. Non-streaming only: BMO needs the whole JSON
//! object before it can normalize anything.
//!
//! Failure mapping, which the fallback chain relies on:
//!
//! | Upstream                          | `LlmError`              |
//! |-----------------------------------|-------------------------|
//! | 401, 403                          | `AuthenticationFailed`  |
//! | 429                               | `RateLimited`           |
//! | connect/transport failure         | `Network`               |
//! | request exceeded the timeout      | `Timeout`               |
//! | any other non-2xx                 | `Provider`              |
//! | 2xx with an `error` object        | `Provider`              |
//! | 2xx without usable content        | `Deserialization`       |

pub mod config;
pub mod types;

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use secrecy::ExposeSecret;
use tracing::Instrument;
use tracing::field::Empty;

use bmo_core::llm::provider::LlmProvider;
use bmo_observe::genai_attrs::{
    ERROR_TYPE, GEN_AI_RESPONSE_ID, GEN_AI_RESPONSE_MODEL, GEN_AI_USAGE_INPUT_TOKENS,
    GEN_AI_USAGE_OUTPUT_TOKENS, OP_CHAT, PROVIDER_OPENROUTER,
};
use bmo_types::llm::{CompletionRequest, CompletionResponse, LlmError, Usage};

use self::config::OpenRouterConfig;
use self::types::{ChatMessage, ChatRequest, ChatResponse, ResponseFormat};

/// Largest error body echoed into an error message.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// OpenRouter chat-completion provider.
///
/// Does NOT derive Debug: the API key is only exposed while building the
/// `Authorization` header.
pub struct OpenRouterProvider {
    client: reqwest::Client,
    config: OpenRouterConfig,
}

impl OpenRouterProvider {
    /// Build the provider and its HTTP client.
    pub fn new(config: OpenRouterConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::InvalidRequest(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    fn build_body<'a>(request: &'a CompletionRequest) -> ChatRequest<'a> {
        ChatRequest {
            model: &request.model,
            messages: request
                .messages
                .iter()
                .map(|m| ChatMessage {
                    role: m.role.to_string(),
                    content: &m.content,
                })
                .collect(),
            temperature: request.temperature,
            response_format: request.json_object.then(ResponseFormat::json_object),
        }
    }

    async fn send(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = Self::build_body(request);

        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(self.config.api_key.expose_secret())
            .header("HTTP-Referer", &self.config.app_url)
            .header("X-Title", &self.config.app_name)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after_ms = retry_after_ms(response.headers());
            let error_body = response.text().await.unwrap_or_default();
            return Err(map_status(status, retry_after_ms, &error_body));
        }

        let bytes = response.bytes().await.map_err(|e| self.map_transport(e))?;
        parse_response(&bytes, &request.model)
    }

    fn map_transport(&self, err: reqwest::Error) -> LlmError {
        if err.is_timeout() {
            LlmError::Timeout {
                after_secs: self.config.timeout.as_secs(),
            }
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl LlmProvider for OpenRouterProvider {
    fn name(&self) -> &str {
        PROVIDER_OPENROUTER
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let span = tracing::info_span!(
            "chat",
            gen_ai.operation.name = OP_CHAT,
            gen_ai.provider.name = PROVIDER_OPENROUTER,
            gen_ai.request.model = %request.model,
            gen_ai.request.temperature = ?request.temperature,
            gen_ai.response.id = Empty,
            gen_ai.response.model = Empty,
            gen_ai.usage.input_tokens = Empty,
            gen_ai.usage.output_tokens = Empty,
            "error.type" = Empty,
        );

        let result = self.send(request).instrument(span.clone()).await;

        match &result {
            Ok(response) => {
                span.record(GEN_AI_RESPONSE_ID, response.id.as_str());
                span.record(GEN_AI_RESPONSE_MODEL, response.model.as_str());
                span.record(GEN_AI_USAGE_INPUT_TOKENS, response.usage.input_tokens);
                span.record(GEN_AI_USAGE_OUTPUT_TOKENS, response.usage.output_tokens);
            }
            Err(err) => {
                span.record(ERROR_TYPE, error_type(err));
            }
        }

        result
    }
}

/// Map a non-2xx status onto the chain's error taxonomy.
pub fn map_status(status: StatusCode, retry_after_ms: Option<u64>, body: &str) -> LlmError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::AuthenticationFailed,
        StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited { retry_after_ms },
        _ => LlmError::Provider {
            message: format!("HTTP {status}: {}", truncate(body.trim())),
        },
    }
}

/// Extract the reply text from a 2xx body.
pub fn parse_response(bytes: &[u8], requested_model: &str) -> Result<CompletionResponse, LlmError> {
    let parsed: ChatResponse = serde_json::from_slice(bytes)
        .map_err(|e| LlmError::Deserialization(format!("failed to parse response: {e}")))?;

    if let Some(error) = parsed.error {
        let code = error.code.map(|c| format!(" ({c})")).unwrap_or_default();
        return Err(LlmError::Provider {
            message: format!("{}{code}", error.message),
        });
    }

    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| {
            LlmError::Deserialization("unexpected response structure: no message content".into())
        })?;

    let usage = parsed.usage.unwrap_or_default();

    Ok(CompletionResponse {
        id: parsed.id.unwrap_or_default(),
        content,
        model: parsed.model.unwrap_or_else(|| requested_model.to_string()),
        usage: Usage {
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
        },
    })
}

/// `Retry-After` in delta-seconds form, as milliseconds.
fn retry_after_ms(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(|secs| secs.saturating_mul(1000))
}

fn error_type(err: &LlmError) -> &'static str {
    match err {
        LlmError::AuthenticationFailed => "authentication_failed",
        LlmError::RateLimited { .. } => "rate_limited",
        LlmError::Network(_) => "network",
        LlmError::Timeout { .. } => "timeout",
        LlmError::Deserialization(_) => "deserialization",
        LlmError::Provider { .. } | LlmError::InvalidRequest(_) => "provider",
    }
}

fn truncate(body: &str) -> String {
    if body.chars().count() <= MAX_ERROR_BODY_CHARS {
        body.to_string()
    } else {
        let cut: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use bmo_types::llm::{Message, MessageRole};
    use secrecy::SecretString;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer, timeout: Duration) -> OpenRouterProvider {
        OpenRouterProvider::new(OpenRouterConfig {
            base_url: format!("{}/api/v1", server.uri()),
            api_key: SecretString::from("sk-or-test"),
            app_url: "https://bmo.example.edu".into(),
            app_name: "BMO Backend".into(),
            timeout,
        })
        .unwrap()
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "mistralai/mistral-nemo:free".into(),
            messages: vec![
                Message::system("map"),
                Message {
                    role: MessageRole::User,
                    content: "Where is the gym?".into(),
                },
            ],
            temperature: Some(0.2),
            json_object: true,
        }
    }

    fn success_body(content: &str) -> serde_json::Value {
        json!({
            "id": "gen-123",
            "model": "mistralai/mistral-nemo",
            "choices": [{ "message": { "role": "assistant", "content": content } }],
            "usage": { "prompt_tokens": 120, "completion_tokens": 40 }
        })
    }

    #[tokio::test]
    async fn complete_sends_expected_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-or-test"))
            .and(header("http-referer", "https://bmo.example.edu"))
            .and(header("x-title", "BMO Backend"))
            .and(body_partial_json(json!({
                "model": "mistralai/mistral-nemo:free",
                "temperature": 0.2,
                "response_format": { "type": "json_object" },
                "messages": [
                    { "role": "system", "content": "map" },
                    { "role": "user", "content": "Where is the gym?" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("{\"emotion\":\"happy\"}")))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server, Duration::from_secs(5));
        let response = provider.complete(&request()).await.unwrap();

        assert_eq!(response.content, "{\"emotion\":\"happy\"}");
        assert_eq!(response.id, "gen-123");
        assert_eq!(response.model, "mistralai/mistral-nemo");
        assert_eq!(response.usage.input_tokens, 120);
        assert_eq!(response.usage.output_tokens, 40);
    }

    #[tokio::test]
    async fn unauthorized_maps_to_authentication_failed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("{\"error\":\"bad key\"}"))
            .mount(&server)
            .await;

        let err = provider_for(&server, Duration::from_secs(5))
            .complete(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::AuthenticationFailed));
    }

    #[tokio::test]
    async fn too_many_requests_maps_to_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "3"))
            .mount(&server)
            .await;

        let err = provider_for(&server, Duration::from_secs(5))
            .complete(&request())
            .await
            .unwrap_err();
        match err {
            LlmError::RateLimited { retry_after_ms } => assert_eq!(retry_after_ms, Some(3000)),
            other => panic!("expected rate limit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_error_maps_to_provider_error_with_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream overloaded"))
            .mount(&server)
            .await;

        let err = provider_for(&server, Duration::from_secs(5))
            .complete(&request())
            .await
            .unwrap_err();
        assert!(!err.is_transient());
        let msg = err.to_string();
        assert!(msg.contains("503"), "got: {msg}");
        assert!(msg.contains("upstream overloaded"), "got: {msg}");
    }

    #[tokio::test]
    async fn slow_response_maps_to_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(success_body("{}"))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let err = provider_for(&server, Duration::from_millis(200))
            .complete(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Timeout { .. }), "got {err:?}");
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn unreachable_host_maps_to_network() {
        // Bind then release an ephemeral port so nothing is listening on it.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let provider = OpenRouterProvider::new(OpenRouterConfig {
            base_url: format!("http://{addr}"),
            api_key: SecretString::from("k"),
            app_url: "http://localhost:3000".into(),
            app_name: "BMO".into(),
            timeout: Duration::from_secs(5),
        })
        .unwrap();

        let err = provider.complete(&request()).await.unwrap_err();
        assert!(matches!(err, LlmError::Network(_)), "got {err:?}");
    }

    #[test]
    fn map_status_classifies_codes() {
        assert!(matches!(
            map_status(StatusCode::FORBIDDEN, None, ""),
            LlmError::AuthenticationFailed
        ));
        assert!(matches!(
            map_status(StatusCode::TOO_MANY_REQUESTS, None, ""),
            LlmError::RateLimited { retry_after_ms: None }
        ));
        assert!(matches!(
            map_status(StatusCode::BAD_REQUEST, None, "bad model"),
            LlmError::Provider { .. }
        ));
    }

    #[test]
    fn map_status_truncates_long_bodies() {
        let body = "x".repeat(2_000);
        let msg = map_status(StatusCode::BAD_GATEWAY, None, &body).to_string();
        assert!(msg.len() < 600, "message was {} bytes", msg.len());
        assert!(msg.ends_with("..."));
    }

    #[test]
    fn parse_response_with_error_object_is_provider_error() {
        let body = json!({ "error": { "code": 502, "message": "model offline" } });
        let err = parse_response(body.to_string().as_bytes(), "m").unwrap_err();
        match err {
            LlmError::Provider { message } => {
                assert!(message.contains("model offline"));
                assert!(message.contains("502"));
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[test]
    fn parse_response_without_content_is_deserialization_error() {
        let body = json!({ "id": "x", "choices": [] });
        let err = parse_response(body.to_string().as_bytes(), "m").unwrap_err();
        assert!(matches!(err, LlmError::Deserialization(_)));

        let body = json!({ "choices": [{ "message": { "content": null } }] });
        let err = parse_response(body.to_string().as_bytes(), "m").unwrap_err();
        assert!(matches!(err, LlmError::Deserialization(_)));
    }

    #[test]
    fn parse_response_defaults_missing_metadata() {
        let body = json!({ "choices": [{ "message": { "content": "{}" } }] });
        let response = parse_response(body.to_string().as_bytes(), "requested/model").unwrap();
        assert_eq!(response.model, "requested/model");
        assert_eq!(response.id, "");
        assert_eq!(response.usage.input_tokens, 0);
    }

    #[test]
    fn parse_response_rejects_non_json() {
        let err = parse_response(b"<html>gateway</html>", "m").unwrap_err();
        assert!(matches!(err, LlmError::Deserialization(_)));
    }

    #[test]
    fn body_omits_response_format_when_not_requested() {
        let mut req = request();
        req.json_object = false;
        req.temperature = None;
        let body = serde_json::to_value(OpenRouterProvider::build_body(&req)).unwrap();
        assert!(body.get("response_format").is_none());
        assert!(body.get("temperature").is_none());
        assert_eq!(body["messages"][1]["role"], "user");
    }
}
