//! LLM provider implementations.
//!
//! Contains the OpenRouter implementation of the [`LlmProvider`] trait
//! defined in `bmo-core`, and the factory the composition root uses.
//!
//! [`LlmProvider`]: bmo_core::llm::provider::LlmProvider

pub mod openrouter;

use secrecy::SecretString;

use bmo_core::llm::box_provider::BoxLlmProvider;
use bmo_types::config::Settings;
use bmo_types::llm::LlmError;

use self::openrouter::OpenRouterProvider;
use self::openrouter::config::OpenRouterConfig;

/// Create the chat-completion provider described by `settings`.
pub fn create_provider(settings: &Settings, api_key: SecretString) -> Result<BoxLlmProvider, LlmError> {
    let config = OpenRouterConfig::from_settings(settings, api_key);
    let provider = OpenRouterProvider::new(config)?;
    tracing::debug!(base_url = %settings.model.base_url, "Created OpenRouter provider");
    Ok(BoxLlmProvider::new(provider))
}
