//! Stored-slot identifiers for session persistence.
//!
//! A session persists three independent slots: the conversation history,
//! the uploaded file data, and the generated dashboard. Each slot holds a
//! JSON-serialized value or is absent; absence is a valid state (first run).

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three independently persisted session slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoredSlot {
    ChatHistory,
    UploadedFile,
    DashboardData,
}

impl StoredSlot {
    /// All slots, in the order they are cleared by a session reset.
    pub const ALL: [StoredSlot; 3] = [
        StoredSlot::ChatHistory,
        StoredSlot::UploadedFile,
        StoredSlot::DashboardData,
    ];

    /// Stable storage key for this slot.
    ///
    /// These are the keys the browser implementation used in localStorage;
    /// kept stable so existing persisted sessions remain readable.
    pub fn key(&self) -> &'static str {
        match self {
            StoredSlot::ChatHistory => "chatHistory",
            StoredSlot::UploadedFile => "uploadedFileData",
            StoredSlot::DashboardData => "dashboardData",
        }
    }
}

impl fmt::Display for StoredSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}
