//! Wire types for the Gemini `generateContent` API.
//!
//! Request: `{ contents: [{role, parts:[{text}]}], systemInstruction?: {parts:[{text}]} }`.
//! Response text lives at `candidates[0].content.parts[0].text`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(super) struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<GeminiSystemInstruction>,
}

#[derive(Debug, Serialize)]
pub(super) struct GeminiContent {
    pub role: String,
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct GeminiPart {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub(super) struct GeminiSystemInstruction {
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GeminiCandidate {
    pub content: Option<GeminiCandidateContent>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GeminiCandidateContent {
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

impl GeminiResponse {
    /// Reply text of the first candidate's first part, if present.
    pub(super) fn reply_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()
            .map(|part| part.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization_shape() {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: "Resuma".to_string(),
                }],
            }],
            system_instruction: Some(GeminiSystemInstruction {
                parts: vec![GeminiPart {
                    text: "instrução".to_string(),
                }],
            }),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "Resuma");
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "instrução");
    }

    #[test]
    fn test_system_instruction_omitted_when_absent() {
        let request = GeminiRequest {
            contents: Vec::new(),
            system_instruction: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("systemInstruction").is_none());
    }

    #[test]
    fn test_reply_text_extraction() {
        let body = r#"{
            "candidates": [
                { "content": { "parts": [{ "text": "Receita de 1000." }] } }
            ]
        }"#;
        let response: GeminiResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.reply_text().as_deref(), Some("Receita de 1000."));
    }

    #[test]
    fn test_reply_text_missing_candidates() {
        let response: GeminiResponse = serde_json::from_str("{}").unwrap();
        assert!(response.reply_text().is_none());
    }

    #[test]
    fn test_reply_text_missing_content() {
        let body = r#"{ "candidates": [ { "finishReason": "SAFETY" } ] }"#;
        let response: GeminiResponse = serde_json::from_str(body).unwrap();
        assert!(response.reply_text().is_none());
    }

    #[test]
    fn test_reply_text_empty_parts() {
        let body = r#"{ "candidates": [ { "content": { "parts": [] } } ] }"#;
        let response: GeminiResponse = serde_json::from_str(body).unwrap();
        assert!(response.reply_text().is_none());
    }
}
