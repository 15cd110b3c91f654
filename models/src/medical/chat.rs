// models/src/medical/chat.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::util::string_or_number;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatbotResponse {
    pub message: String,
    #[serde(default)]
    pub message_type: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub doctor_recommendations: Vec<Value>,
    #[serde(default)]
    pub home_remedies: Vec<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub requires_human_intervention: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub session_id: String,
    pub sender: String,
    pub content: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub message_type: Option<String>,
}

/// The `/ask` endpoint answers either with a bare session id or with a session object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatSessionHandle {
    Id(String),
    Session {
        #[serde(alias = "sessionId", deserialize_with = "string_or_number")]
        id: String,
    },
}

impl ChatSessionHandle {
    pub fn into_id(self) -> String {
        match self {
            ChatSessionHandle::Id(id) => id,
            ChatSessionHandle::Session { id } => id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_accept_both_session_handle_shapes() {
        let bare: ChatSessionHandle = serde_json::from_str(r#""abc-123""#).unwrap();
        let object: ChatSessionHandle = serde_json::from_str(r#"{"id": 99, "active": true}"#).unwrap();
        assert_eq!(bare.into_id(), "abc-123");
        assert_eq!(object.into_id(), "99");
    }
}
