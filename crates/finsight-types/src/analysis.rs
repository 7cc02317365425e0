//! Analysis payload submitted by the caller for a single turn.

use serde::{Deserialize, Serialize};

/// The unit of work for one conversational turn.
///
/// `tabular_data` is the uploaded company payment data as parsed JSON. It is
/// treated as opaque here and forwarded verbatim to the prompt assembler;
/// its internal shape is never validated on this side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisPayload {
    /// The user's question, if any. When absent, a default
    /// "analyze the provided data" instruction is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,

    /// Uploaded tabular data, serialized into the prompt when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tabular_data: Option<serde_json::Value>,
}

impl AnalysisPayload {
    /// A payload carrying only a question.
    pub fn question(text: impl Into<String>) -> Self {
        Self {
            question: Some(text.into()),
            tabular_data: None,
        }
    }

    /// A payload carrying a question and tabular data.
    pub fn with_data(text: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            question: Some(text.into()),
            tabular_data: Some(data),
        }
    }
}
