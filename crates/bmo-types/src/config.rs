//! Configuration types for the BMO backend.
//!
//! `Settings` represents the top-level `config.toml`. Every field has a
//! default so an empty (or missing) file yields a working configuration;
//! only the provider API key must come from the environment.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Public URL of the web client. Sent as `HTTP-Referer` to the model
    /// provider and always allowed by CORS.
    #[serde(default = "default_app_url")]
    pub app_url: String,

    /// Allowed CORS origins. `"*"` allows any origin.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Greeting spoken on wake, and the fallback narration.
    #[serde(default = "default_greeting")]
    pub default_greeting: String,

    /// Markdown file with the campus map context. Built-in map when unset.
    #[serde(default)]
    pub map_context_path: Option<PathBuf>,

    #[serde(default)]
    pub model: ModelSettings,

    #[serde(default)]
    pub speech: SpeechSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            app_url: default_app_url(),
            cors_origins: default_cors_origins(),
            default_greeting: default_greeting(),
            map_context_path: None,
            model: ModelSettings::default(),
            speech: SpeechSettings::default(),
        }
    }
}

fn default_app_name() -> String {
    "BMO Backend".to_string()
}

fn default_app_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "https://localhost:3000".to_string(),
    ]
}

fn default_greeting() -> String {
    "Hey there! I\u{2019}m BMO, broadcasting from the Central Library. \
     Ask me about any building or shortcut."
        .to_string()
}

/// Chat-completion provider and fallback-chain settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    /// OpenAI-compatible API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Primary model, always tried first.
    #[serde(default = "default_primary_model")]
    pub primary: String,

    /// Fallback models, tried in order after the primary.
    #[serde(default = "default_fallback_models")]
    pub fallbacks: Vec<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Overall timeout for one completion call.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Attempts per candidate before moving to the next one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry; doubled after every retry.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            primary: default_primary_model(),
            fallbacks: default_fallback_models(),
            temperature: default_temperature(),
            request_timeout_secs: default_request_timeout_secs(),
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
        }
    }
}

fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_primary_model() -> String {
    "google/gemini-2.0-flash-exp:free".to_string()
}

fn default_fallback_models() -> Vec<String> {
    vec![
        "google/gemini-2.0-flash-exp:free".to_string(),
        "meta-llama/llama-3.3-70b-instruct:free".to_string(),
        "qwen/qwen-2.5-72b-instruct:free".to_string(),
        "mistralai/mistral-nemo:free".to_string(),
    ]
}

fn default_temperature() -> f64 {
    0.2
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    1000
}

/// Speech-synthesis engine settings (edge-tts compatible CLI).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechSettings {
    /// Executable invoked to synthesize narration.
    #[serde(default = "default_speech_binary")]
    pub binary: PathBuf,

    #[serde(default = "default_voice")]
    pub voice: String,

    /// Speaking rate adjustment, e.g. `"+0%"`, `"-10%"`.
    #[serde(default = "default_adjustment")]
    pub rate: String,

    /// Volume adjustment, e.g. `"+0%"`.
    #[serde(default = "default_adjustment")]
    pub volume: String,

    #[serde(default = "default_speech_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            binary: default_speech_binary(),
            voice: default_voice(),
            rate: default_adjustment(),
            volume: default_adjustment(),
            timeout_secs: default_speech_timeout_secs(),
        }
    }
}

fn default_speech_binary() -> PathBuf {
    PathBuf::from("edge-tts")
}

fn default_voice() -> String {
    "en-US-JennyNeural".to_string()
}

fn default_adjustment() -> String {
    "+0%".to_string()
}

fn default_speech_timeout_secs() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_deserialize_empty_uses_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings.app_name, "BMO Backend");
        assert_eq!(settings.model.primary, "google/gemini-2.0-flash-exp:free");
        assert_eq!(settings.model.fallbacks.len(), 4);
        assert_eq!(settings.model.max_attempts, 3);
        assert_eq!(settings.model.initial_backoff_ms, 1000);
        assert_eq!(settings.model.request_timeout_secs, 60);
        assert_eq!(settings.speech.voice, "en-US-JennyNeural");
        assert!(settings.map_context_path.is_none());
        assert!(settings.default_greeting.starts_with("Hey there!"));
    }

    #[test]
    fn test_settings_deserialize_partial_tables() {
        let toml_str = r#"
app_url = "https://bmo.example.edu"
cors_origins = ["*"]
map_context_path = "resources/aiu_map.md"

[model]
primary = "openai/gpt-4o-mini"
fallbacks = []
temperature = 0.5

[speech]
voice = "en-GB-SoniaNeural"
rate = "-10%"
"#;
        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.app_url, "https://bmo.example.edu");
        assert_eq!(settings.cors_origins, vec!["*".to_string()]);
        assert_eq!(
            settings.map_context_path,
            Some(PathBuf::from("resources/aiu_map.md"))
        );
        assert_eq!(settings.model.primary, "openai/gpt-4o-mini");
        assert!(settings.model.fallbacks.is_empty());
        assert!((settings.model.temperature - 0.5).abs() < f64::EPSILON);
        assert_eq!(settings.model.max_attempts, 3);
        assert_eq!(settings.speech.voice, "en-GB-SoniaNeural");
        assert_eq!(settings.speech.rate, "-10%");
        assert_eq!(settings.speech.volume, "+0%");
    }

    #[test]
    fn test_default_matches_empty_toml() {
        let from_toml: Settings = toml::from_str("").unwrap();
        let default = Settings::default();
        assert_eq!(from_toml.app_url, default.app_url);
        assert_eq!(from_toml.cors_origins, default.cors_origins);
        assert_eq!(from_toml.model.fallbacks, default.model.fallbacks);
        assert_eq!(from_toml.speech.binary, default.speech.binary);
    }
}
