//! Conversation orchestration.
//!
//! [`ConversationService`] owns the multi-turn history lifecycle: it loads
//! persisted history, assembles the outgoing request (system instruction
//! first, history replayed in full, new turn last), calls the model under a
//! timeout, and appends the exchange to history only on success. Overlapping
//! sends are serialized by a per-session lock so the history
//! read-modify-append-write is a single atomic step per call.
//!
//! History is unbounded: no truncation or summarization policy exists, so
//! long sessions grow without limit. Known limitation, carried deliberately.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use finsight_types::analysis::AnalysisPayload;
use finsight_types::chat::Turn;
use finsight_types::error::{ConfigError, RemoteError};

use crate::dashboard::{self, Dashboard, DashboardParseError};
use crate::llm::{GenerateRequest, ModelProvider};
use crate::prompt::{self, PromptKind};
use crate::storage::{SessionStore, SlotStore};

/// Failure of a conversational exchange.
#[derive(Debug, thiserror::Error)]
pub enum ConversationError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("remote call failed: {0}")]
    Remote(#[from] RemoteError),
}

/// Failure of a dashboard generation.
///
/// `Parse` is distinct from `Conversation`: the network call itself
/// succeeded but the reply did not conform to the dashboard shape.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error(transparent)]
    Conversation(#[from] ConversationError),

    #[error("dashboard reply could not be parsed: {0}")]
    Parse(#[from] DashboardParseError),
}

/// Orchestrates conversation turns against a model provider.
///
/// Generic over [`SlotStore`] and [`ModelProvider`] to keep the dependency
/// direction clean (finsight-core never depends on finsight-infra).
pub struct ConversationService<S: SlotStore, P: ModelProvider> {
    store: SessionStore<S>,
    provider: P,
    timeout: Duration,
    send_lock: Mutex<()>,
}

impl<S: SlotStore, P: ModelProvider> ConversationService<S, P> {
    /// Create a service over the given store and provider.
    pub fn new(store: S, provider: P, timeout: Duration) -> Self {
        Self {
            store: SessionStore::new(store),
            provider,
            timeout,
            send_lock: Mutex::new(()),
        }
    }

    /// Access the session store (e.g., to persist an uploaded file).
    pub fn session(&self) -> &SessionStore<S> {
        &self.store
    }

    /// Send one conversational turn and return the model's reply text.
    ///
    /// On success, exactly one user turn and one model turn are appended to
    /// the persisted history. On any failure the persisted history is left
    /// exactly as it was.
    pub async fn send_message(&self, payload: &AnalysisPayload) -> Result<String, ConversationError> {
        self.send_message_with_cancel(payload, &CancellationToken::new())
            .await
    }

    /// [`Self::send_message`] with caller-controlled cancellation.
    ///
    /// A call cancelled before completion fails with `RemoteError::Cancelled`
    /// and never mutates the persisted history.
    pub async fn send_message_with_cancel(
        &self,
        payload: &AnalysisPayload,
        cancel: &CancellationToken,
    ) -> Result<String, ConversationError> {
        self.provider.ready()?;
        let _guard = self.send_lock.lock().await;

        let mut history = self.store.history().await;
        let user_text = prompt::build_user_turn(payload);

        let mut turns = history.clone();
        turns.push(Turn::user(user_text.clone()));
        let request = GenerateRequest {
            system: Some(PromptKind::Analysis.system_instruction().to_string()),
            turns,
        };

        debug!(
            provider = self.provider.name(),
            history_turns = history.len(),
            "sending conversation turn"
        );

        let reply = self.call_model(&request, cancel).await.map_err(|err| {
            error!(provider = self.provider.name(), %err, "conversation turn failed");
            ConversationError::Remote(err)
        })?;

        history.push(Turn::user(user_text));
        history.push(Turn::model(reply.clone()));
        self.store.save_history(&history).await;

        Ok(reply)
    }

    /// Generate a structured dashboard from tabular data.
    ///
    /// The dashboard exchange is stateless: one user turn, no history
    /// replay. The parsed dashboard is persisted into the dashboard slot
    /// best-effort before being returned.
    pub async fn generate_dashboard(
        &self,
        data: &serde_json::Value,
    ) -> Result<Dashboard, DashboardError> {
        self.provider.ready().map_err(ConversationError::from)?;
        let _guard = self.send_lock.lock().await;

        let request = GenerateRequest {
            system: Some(PromptKind::Dashboard.system_instruction().to_string()),
            turns: vec![Turn::user(prompt::build_dashboard_turn(data))],
        };

        let raw = self
            .call_model(&request, &CancellationToken::new())
            .await
            .map_err(|err| {
                error!(provider = self.provider.name(), %err, "dashboard generation failed");
                ConversationError::Remote(err)
            })?;

        let dashboard = dashboard::recover_dashboard(&raw)?;

        match serde_json::to_value(&dashboard) {
            Ok(value) => self.store.save_dashboard_data(&value).await,
            Err(err) => error!(%err, "failed to serialize dashboard for persistence"),
        }

        Ok(dashboard)
    }

    /// Clear the whole session: history, uploaded file, and dashboard.
    ///
    /// Idempotent; clearing an already-empty session is a no-op.
    pub async fn clear_session(&self) {
        self.store.clear_all().await;
        info!("session cleared");
    }

    /// Run the provider call under the configured timeout, racing the
    /// cancellation token. Neither outcome mutates history; the caller
    /// appends only after a successful reply.
    async fn call_model(
        &self,
        request: &GenerateRequest,
        cancel: &CancellationToken,
    ) -> Result<String, RemoteError> {
        tokio::select! {
            _ = cancel.cancelled() => Err(RemoteError::Cancelled),
            result = tokio::time::timeout(self.timeout, self.provider.generate(request)) => {
                match result {
                    Ok(inner) => inner,
                    Err(_) => Err(RemoteError::Timeout(self.timeout.as_secs())),
                }
            }
        }
    }
}
