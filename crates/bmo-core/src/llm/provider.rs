//! LlmProvider trait definition.
//!
//! The core abstraction every chat-completion backend implements. Uses
//! RPITIT for `complete` so implementations can be plain `async fn`.

use bmo_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for chat-completion backends (OpenRouter and other OpenAI-compatible APIs).
///
/// Implementations must map their transport failures onto [`LlmError`] so the
/// fallback chain can tell transient failures from fatal ones:
/// connection errors and timeouts become `Network`/`Timeout`, HTTP 429 becomes
/// `RateLimited`, rejected credentials become `AuthenticationFailed`.
///
/// Implementations live in bmo-infra (e.g., `OpenRouterProvider`).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "openrouter").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
