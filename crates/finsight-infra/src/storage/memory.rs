//! In-memory slot store.
//!
//! The test and ephemeral-session adapter: slots live in a concurrent map
//! and vanish with the process.

use dashmap::DashMap;

use finsight_core::storage::SlotStore;
use finsight_types::error::StorageError;
use finsight_types::storage::StoredSlot;

/// DashMap-backed implementation of [`SlotStore`].
#[derive(Default)]
pub struct MemorySlotStore {
    slots: DashMap<&'static str, serde_json::Value>,
}

impl MemorySlotStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStore for MemorySlotStore {
    async fn get(&self, slot: StoredSlot) -> Result<Option<serde_json::Value>, StorageError> {
        Ok(self.slots.get(slot.key()).map(|entry| entry.value().clone()))
    }

    async fn set(&self, slot: StoredSlot, value: &serde_json::Value) -> Result<(), StorageError> {
        self.slots.insert(slot.key(), value.clone());
        Ok(())
    }

    async fn remove(&self, slot: StoredSlot) -> Result<(), StorageError> {
        self.slots.remove(slot.key());
        Ok(())
    }
}
