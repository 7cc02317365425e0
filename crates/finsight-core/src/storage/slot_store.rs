//! Slot store trait.
//!
//! Defines the interface for session slot persistence: three independent
//! named slots, each holding a JSON-serialized value or absent.
//! Uses RPITIT (native async fn in traits, Rust 2024 edition).
//! Implementations live in finsight-infra.

use finsight_types::error::StorageError;
use finsight_types::storage::StoredSlot;

/// Trait for persistent slot storage.
///
/// Adapters are expected to be cheap and local (filesystem, in-memory);
/// there is no network on this path.
pub trait SlotStore: Send + Sync {
    /// Read a slot. Returns `None` if the slot is absent.
    fn get(
        &self,
        slot: StoredSlot,
    ) -> impl std::future::Future<Output = Result<Option<serde_json::Value>, StorageError>> + Send;

    /// Write a slot (upsert).
    fn set(
        &self,
        slot: StoredSlot,
        value: &serde_json::Value,
    ) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;

    /// Remove a slot. No-op if the slot is absent.
    fn remove(
        &self,
        slot: StoredSlot,
    ) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;
}
