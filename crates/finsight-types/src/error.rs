use thiserror::Error;

/// Errors from provider configuration.
///
/// Fatal to the attempted call and non-retryable until the configuration
/// changes; always raised before any network activity.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no Gemini API key configured (set GEMINI_API_KEY)")]
    MissingApiKey,
}

/// Errors from the remote model call.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("rate limited")]
    RateLimited,

    #[error("response missing reply text")]
    MalformedResponse,

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("request cancelled")]
    Cancelled,
}

/// Errors from slot storage operations.
///
/// These never escape the session-store facade: reads degrade to an empty
/// sentinel and writes degrade to a logged warning.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
