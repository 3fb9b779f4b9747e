//! Connection settings for the OpenRouter provider.

use std::time::Duration;

use secrecy::SecretString;

use bmo_types::config::Settings;

/// Everything [`super::OpenRouterProvider`] needs to reach the API.
///
/// No `Debug`: the API key lives here.
pub struct OpenRouterConfig {
    /// API base, e.g. `https://openrouter.ai/api/v1`. No trailing slash needed.
    pub base_url: String,
    pub api_key: SecretString,
    /// Sent as `HTTP-Referer` for OpenRouter app attribution.
    pub app_url: String,
    /// Sent as `X-Title`.
    pub app_name: String,
    /// Overall timeout for one request, connect included.
    pub timeout: Duration,
}

impl OpenRouterConfig {
    pub fn from_settings(settings: &Settings, api_key: SecretString) -> Self {
        Self {
            base_url: settings.model.base_url.clone(),
            api_key,
            app_url: settings.app_url.clone(),
            app_name: settings.app_name.clone(),
            timeout: Duration::from_secs(settings.model.request_timeout_secs),
        }
    }

    /// Full chat-completions endpoint URL.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}
