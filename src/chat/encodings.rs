use serde_json::{json, Value};

use crate::models::ChatTurn;

/// Request body shapes the backend has been seen to accept, in the order
/// they are tried. Deployments differ in which one they expect, so the
/// client probes from richest to plainest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatEncoding {
    /// `{"message": ..., "conversation_history": [...]}`
    MessageWithConversationHistory,
    /// `{"question": ..., "conversation_history": [...]}`
    QuestionWithConversationHistory,
    /// `{"message": ..., "history": [...]}`
    MessageWithHistory,
    /// `{"message": ...}`
    MessageOnly,
}

impl ChatEncoding {
    pub const CANDIDATES: [ChatEncoding; 4] = [
        ChatEncoding::MessageWithConversationHistory,
        ChatEncoding::QuestionWithConversationHistory,
        ChatEncoding::MessageWithHistory,
        ChatEncoding::MessageOnly,
    ];

    /// Builds the request body for this shape.
    pub fn payload(&self, message: &str, history: &[ChatTurn]) -> Value {
        match self {
            ChatEncoding::MessageWithConversationHistory => json!({
                "message": message,
                "conversation_history": history,
            }),
            ChatEncoding::QuestionWithConversationHistory => json!({
                "question": message,
                "conversation_history": history,
            }),
            ChatEncoding::MessageWithHistory => json!({
                "message": message,
                "history": history,
            }),
            ChatEncoding::MessageOnly => json!({
                "message": message,
            }),
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            ChatEncoding::MessageWithConversationHistory => "message + conversation_history",
            ChatEncoding::QuestionWithConversationHistory => "question + conversation_history",
            ChatEncoding::MessageWithHistory => "message + history",
            ChatEncoding::MessageOnly => "message only",
        }
    }
}
