//! ModelProvider trait definition.
//!
//! The abstraction over the hosted model API. Uses RPITIT (native async fn
//! in traits, Rust 2024 edition). The concrete Gemini implementation lives
//! in finsight-infra; tests use hand-rolled doubles.

use finsight_types::chat::Turn;
use finsight_types::error::{ConfigError, RemoteError};

/// A fully composed generation request.
///
/// Turn ordering is fixed by the orchestrator: prior history replayed in
/// full, new user turn last. The system instruction travels separately from
/// the turn sequence, mirroring the wire format.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Fixed system instruction, if any.
    pub system: Option<String>,
    /// Conversation turns in strict chronological order.
    pub turns: Vec<Turn>,
}

/// Trait for hosted text-generation backends.
///
/// One request, one reply: no streaming and no automatic retry. A failed
/// call is just reported to the caller.
pub trait ModelProvider: Send + Sync {
    /// Human-readable provider name (e.g., "gemini").
    fn name(&self) -> &str;

    /// Eager configuration check.
    ///
    /// The orchestrator calls this before any network activity so a missing
    /// credential short-circuits without touching the wire.
    fn ready(&self) -> Result<(), ConfigError>;

    /// Send the request and return the model's reply text.
    fn generate(
        &self,
        request: &GenerateRequest,
    ) -> impl std::future::Future<Output = Result<String, RemoteError>> + Send;
}
