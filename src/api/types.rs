//! Wire types for the backend endpoints.
//!
//! Field names here are the backend's, not ours; do not rename them.

use serde::{Deserialize, Serialize};

use crate::models::JobStatus;

/// Response to a successful multipart upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub task_id: String,
    pub file_name: String,
    /// Text the backend extracted from the file, fed to the segmenter.
    #[serde(default)]
    pub extracted_text: String,
}

/// Status endpoint payload.
///
/// Newer backend builds wrap the status in an object; older ones return a
/// bare string. Both decode here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatusPayload {
    Wrapped { status: String },
    Bare(String),
}

impl StatusPayload {
    pub fn into_status(self) -> JobStatus {
        match self {
            Self::Wrapped { status } => JobStatus::parse(&status),
            Self::Bare(status) => JobStatus::parse(&status),
        }
    }
}

/// Chat endpoint reply.
///
/// The answer arrives under `answer` or `message` depending on the backend
/// build; some builds also echo the conversation back.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_history: Option<serde_json::Value>,
}

impl ChatReply {
    /// The reply text, preferring `answer` over `message`.
    pub fn text(&self) -> Option<&str> {
        self.answer
            .as_deref()
            .or(self.message.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}

/// Health endpoint payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_decodes_wrapped_object() {
        let payload: StatusPayload = serde_json::from_str(r#"{"status": "processing"}"#).unwrap();
        assert_eq!(payload.into_status(), JobStatus::Processing);
    }

    #[test]
    fn test_status_decodes_bare_string() {
        let payload: StatusPayload = serde_json::from_str(r#""completed""#).unwrap();
        assert_eq!(payload.into_status(), JobStatus::Completed);
    }

    #[test]
    fn test_status_keeps_unknown_values() {
        let payload: StatusPayload = serde_json::from_str(r#"{"status": "warming_up"}"#).unwrap();
        let status = payload.into_status();
        assert!(status.is_in_progress());
    }

    #[test]
    fn test_chat_reply_prefers_answer() {
        let reply = ChatReply {
            answer: Some("from answer".to_string()),
            message: Some("from message".to_string()),
            conversation_history: None,
        };
        assert_eq!(reply.text(), Some("from answer"));
    }

    #[test]
    fn test_chat_reply_falls_back_to_message() {
        let reply: ChatReply = serde_json::from_str(r#"{"message": "hello"}"#).unwrap();
        assert_eq!(reply.text(), Some("hello"));
    }

    #[test]
    fn test_chat_reply_empty_is_none() {
        let reply: ChatReply = serde_json::from_str(r#"{"answer": "  "}"#).unwrap();
        assert_eq!(reply.text(), None);
        assert_eq!(ChatReply::default().text(), None);
    }

    #[test]
    fn test_upload_receipt_tolerates_missing_text() {
        let receipt: UploadReceipt =
            serde_json::from_str(r#"{"task_id": "t1", "file_name": "a.pdf"}"#).unwrap();
        assert_eq!(receipt.extracted_text, "");
    }
}
