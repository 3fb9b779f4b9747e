//! Configuration loaders.
//!
//! Reads `config.toml` into [`Settings`] and the campus map markdown into the
//! map-context prompt block. Both fall back to built-in defaults when the
//! file is missing or unusable, so the server always starts.

use std::path::Path;

use bmo_core::conversation::prompt::DEFAULT_MAP_CONTEXT;
use bmo_types::config::Settings;

/// Load settings from `path`.
///
/// - Missing file: [`Settings::default()`].
/// - Unreadable or unparsable file: logs a warning, returns the default.
pub async fn load_settings(path: &Path) -> Settings {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Settings::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return Settings::default();
        }
    };

    match toml::from_str::<Settings>(&content) {
        Ok(settings) => settings,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            Settings::default()
        }
    }
}

/// Load the campus map prompt block.
///
/// Uses the built-in map when `path` is unset, the file cannot be read, or
/// it is blank. File content is trimmed.
pub async fn load_map_context(path: Option<&Path>) -> String {
    let Some(path) = path else {
        return DEFAULT_MAP_CONTEXT.to_string();
    };

    match tokio::fs::read_to_string(path).await {
        Ok(content) if !content.trim().is_empty() => content.trim().to_string(),
        Ok(_) => {
            tracing::warn!("Map file {} is empty, using built-in map", path.display());
            DEFAULT_MAP_CONTEXT.to_string()
        }
        Err(err) => {
            tracing::warn!("Failed to read map file {}: {err}, using built-in map", path.display());
            DEFAULT_MAP_CONTEXT.to_string()
        }
    }
}
