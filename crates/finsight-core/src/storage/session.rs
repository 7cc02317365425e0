//! Typed session-store facade over a [`SlotStore`].
//!
//! The facade enforces the storage contract of the session layer: reads
//! never fail (an absent slot, a read error, or undecodable content all
//! degrade to the empty sentinel with a logged warning), and writes never
//! abort the caller's in-progress flow. Storage problems are an
//! observability concern here, not a control-flow one.

use finsight_types::chat::Turn;
use finsight_types::storage::StoredSlot;
use tracing::warn;

use crate::storage::slot_store::SlotStore;

/// Typed accessors for the three session slots.
pub struct SessionStore<S: SlotStore> {
    inner: S,
}

impl<S: SlotStore> SessionStore<S> {
    /// Wrap a slot store.
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Access the underlying slot store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Load the conversation history. Empty on first run or on any
    /// storage/decode failure.
    pub async fn history(&self) -> Vec<Turn> {
        let value = match self.inner.get(StoredSlot::ChatHistory).await {
            Ok(Some(value)) => value,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!(slot = %StoredSlot::ChatHistory, %err, "failed to read history, starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_value(value) {
            Ok(turns) => turns,
            Err(err) => {
                warn!(slot = %StoredSlot::ChatHistory, %err, "stored history is not decodable, starting empty");
                Vec::new()
            }
        }
    }

    /// Persist the conversation history.
    pub async fn save_history(&self, turns: &[Turn]) {
        let value = match serde_json::to_value(turns) {
            Ok(value) => value,
            Err(err) => {
                warn!(slot = %StoredSlot::ChatHistory, %err, "failed to serialize history");
                return;
            }
        };
        self.save_slot(StoredSlot::ChatHistory, &value).await;
    }

    /// Load the uploaded file data, if present.
    pub async fn uploaded_file(&self) -> Option<serde_json::Value> {
        self.load_slot(StoredSlot::UploadedFile).await
    }

    /// Persist the uploaded file data.
    pub async fn save_uploaded_file(&self, data: &serde_json::Value) {
        self.save_slot(StoredSlot::UploadedFile, data).await;
    }

    /// Load the generated dashboard data, if present.
    pub async fn dashboard_data(&self) -> Option<serde_json::Value> {
        self.load_slot(StoredSlot::DashboardData).await
    }

    /// Persist the generated dashboard data.
    pub async fn save_dashboard_data(&self, data: &serde_json::Value) {
        self.save_slot(StoredSlot::DashboardData, data).await;
    }

    /// Clear all three slots. Idempotent: clearing an already-empty store
    /// is a no-op, and a failure on one slot does not stop the others.
    pub async fn clear_all(&self) {
        for slot in StoredSlot::ALL {
            if let Err(err) = self.inner.remove(slot).await {
                warn!(%slot, %err, "failed to clear slot");
            }
        }
    }

    async fn load_slot(&self, slot: StoredSlot) -> Option<serde_json::Value> {
        match self.inner.get(slot).await {
            Ok(value) => value,
            Err(err) => {
                warn!(%slot, %err, "failed to read slot");
                None
            }
        }
    }

    async fn save_slot(&self, slot: StoredSlot, value: &serde_json::Value) {
        if let Err(err) = self.inner.set(slot, value).await {
            warn!(%slot, %err, "failed to write slot");
        }
    }
}
