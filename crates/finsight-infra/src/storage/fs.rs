//! Filesystem slot store.
//!
//! One JSON file per slot under a root directory (the platform data dir by
//! default). The local-persistence counterpart of the browser
//! implementation's localStorage slots; file names reuse the stable slot
//! keys so a session survives process restarts.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use finsight_core::storage::SlotStore;
use finsight_types::error::StorageError;
use finsight_types::storage::StoredSlot;

/// Directory name under the user's home for default storage.
const DATA_DIR_NAME: &str = ".finsight";

/// Filesystem-backed implementation of [`SlotStore`].
pub struct FsSlotStore {
    root: PathBuf,
}

impl FsSlotStore {
    /// Create a store rooted at the given directory.
    ///
    /// The directory is created lazily on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a store rooted at `~/.finsight`.
    ///
    /// Falls back to the current directory when no home directory can be
    /// resolved (e.g., stripped-down containers).
    pub fn at_default_dir() -> Self {
        let root = dirs::home_dir()
            .map(|home| home.join(DATA_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from(DATA_DIR_NAME));
        Self::new(root)
    }

    /// The root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn slot_path(&self, slot: StoredSlot) -> PathBuf {
        self.root.join(format!("{}.json", slot.key()))
    }
}

impl SlotStore for FsSlotStore {
    async fn get(&self, slot: StoredSlot) -> Result<Option<serde_json::Value>, StorageError> {
        let path = self.slot_path(slot);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StorageError::Io(err.to_string())),
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }

    async fn set(&self, slot: StoredSlot, value: &serde_json::Value) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;

        let content = serde_json::to_string_pretty(value)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        tokio::fs::write(self.slot_path(slot), content)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))
    }

    async fn remove(&self, slot: StoredSlot) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.slot_path(slot)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::Io(err.to_string())),
        }
    }
}
