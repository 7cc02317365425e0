//! Configuration loading for Finsight.
//!
//! Reads `config.toml` from the data directory and deserializes it into
//! [`GeminiConfig`], falling back to defaults when the file is missing or
//! malformed. The API key never lives in the config file; it is resolved
//! from the environment and wrapped in a [`SecretString`].

use std::path::Path;

use secrecy::SecretString;

use finsight_types::config::GeminiConfig;

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";

/// Load provider configuration from `{data_dir}/config.toml`.
///
/// - Missing file: returns [`GeminiConfig::default()`].
/// - Unreadable or unparseable file: logs a warning and returns the default.
pub async fn load_config(data_dir: &Path) -> GeminiConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("no config.toml at {}, using defaults", config_path.display());
            return GeminiConfig::default();
        }
        Err(err) => {
            tracing::warn!("failed to read {}: {err}, using defaults", config_path.display());
            return GeminiConfig::default();
        }
    };

    match toml::from_str::<GeminiConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            GeminiConfig::default()
        }
    }
}

/// Resolve the API key from the environment.
///
/// An unset variable, an empty value, or a non-Unicode value all resolve to
/// `None`; the provider then fails eagerly with a configuration error on
/// first use.
pub fn api_key_from_env() -> Option<SecretString> {
    match std::env::var(API_KEY_ENV_VAR) {
        Ok(value) if !value.trim().is_empty() => Some(SecretString::from(value)),
        _ => None,
    }
}
