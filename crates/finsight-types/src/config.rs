//! Provider configuration for Finsight.

use serde::{Deserialize, Serialize};

/// Configuration for the Gemini provider.
///
/// Loaded from `config.toml` in the data directory; every field has a
/// default so a missing or partial file still yields a usable config.
/// The API key is deliberately NOT part of this struct -- it is resolved
/// from the environment and wrapped in a `SecretString` at the infra layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Model identifier sent in the request path.
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the model-serving endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds. A call that exceeds this fails without
    /// mutating persisted history.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
