//! GeminiProvider -- concrete [`ModelProvider`] implementation for the
//! Gemini `generateContent` API.
//!
//! The API key travels as a query credential on the request URL, which is
//! how the hosted endpoint authenticates browserless clients. The key is
//! wrapped in [`secrecy::SecretString`] and is never logged.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use finsight_core::llm::{GenerateRequest, ModelProvider};
use finsight_types::config::GeminiConfig;
use finsight_types::error::{ConfigError, RemoteError};

use super::types::{
    GeminiContent, GeminiPart, GeminiRequest, GeminiResponse, GeminiSystemInstruction,
};

/// Gemini text-generation provider.
///
/// # API Key Security
///
/// The API key is stored as a [`SecretString`] and is only exposed when
/// building the request URL. The struct intentionally does not derive
/// `Debug` so the key cannot leak through formatting.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    config: GeminiConfig,
}

impl GeminiProvider {
    /// Create a new Gemini provider.
    ///
    /// `api_key` may be absent; the provider then reports not-ready and
    /// every call short-circuits before the network.
    pub fn new(api_key: Option<SecretString>, config: GeminiConfig) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RemoteError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            config,
        })
    }

    /// The configured model identifier.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Full request URL, including the query credential.
    fn url(&self, key: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.base_url, self.config.model, key
        )
    }

    /// Convert a [`GenerateRequest`] into the wire shape.
    fn to_wire_request(request: &GenerateRequest) -> GeminiRequest {
        let contents = request
            .turns
            .iter()
            .map(|turn| GeminiContent {
                role: turn.role.to_string(),
                parts: vec![GeminiPart {
                    text: turn.text.clone(),
                }],
            })
            .collect();

        GeminiRequest {
            contents,
            system_instruction: request.system.as_ref().map(|text| GeminiSystemInstruction {
                parts: vec![GeminiPart { text: text.clone() }],
            }),
        }
    }
}

impl ModelProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn ready(&self) -> Result<(), ConfigError> {
        match &self.api_key {
            Some(key) if !key.expose_secret().is_empty() => Ok(()),
            _ => Err(ConfigError::MissingApiKey),
        }
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String, RemoteError> {
        let key = match &self.api_key {
            Some(key) if !key.expose_secret().is_empty() => key,
            _ => return Err(RemoteError::Http("no API key configured".to_string())),
        };

        let body = Self::to_wire_request(request);
        debug!(
            model = %self.config.model,
            turns = request.turns.len(),
            "sending generateContent request"
        );

        let response = self
            .client
            .post(self.url(key.expose_secret()))
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RemoteError::Timeout(self.config.timeout_secs)
                } else {
                    RemoteError::Http(format!("HTTP request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => RemoteError::AuthenticationFailed,
                429 => RemoteError::RateLimited,
                code => RemoteError::Status { status: code, body },
            });
        }

        let parsed: GeminiResponse = response
            .json()
            .await
            .map_err(|_| RemoteError::MalformedResponse)?;

        parsed.reply_text().ok_or(RemoteError::MalformedResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finsight_types::chat::Turn;

    fn provider_with_key(key: &str) -> GeminiProvider {
        GeminiProvider::new(Some(SecretString::from(key)), GeminiConfig::default()).unwrap()
    }

    #[test]
    fn test_ready_with_key() {
        assert!(provider_with_key("test-key").ready().is_ok());
    }

    #[test]
    fn test_not_ready_without_key() {
        let provider = GeminiProvider::new(None, GeminiConfig::default()).unwrap();
        assert!(matches!(
            provider.ready(),
            Err(ConfigError::MissingApiKey)
        ));
    }

    #[test]
    fn test_not_ready_with_empty_key() {
        let provider = provider_with_key("");
        assert!(provider.ready().is_err());
    }

    #[test]
    fn test_url_carries_query_credential() {
        let provider = provider_with_key("abc123");
        let url = provider.url("abc123");
        assert_eq!(
            url,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent?key=abc123"
        );
    }

    #[test]
    fn test_wire_request_preserves_turn_order() {
        let request = GenerateRequest {
            system: Some("instrução".to_string()),
            turns: vec![
                Turn::user("primeira"),
                Turn::model("resposta"),
                Turn::user("segunda"),
            ],
        };

        let wire = GeminiProvider::to_wire_request(&request);
        let roles: Vec<&str> = wire.contents.iter().map(|c| c.role.as_str()).collect();
        assert_eq!(roles, ["user", "model", "user"]);
        assert_eq!(wire.contents[2].parts[0].text, "segunda");
        assert!(wire.system_instruction.is_some());
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(provider_with_key("k").name(), "gemini");
    }
}
