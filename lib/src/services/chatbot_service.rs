// lib/src/services/chatbot_service.rs
use log::{error, warn};
use models::{ChatMessage, ChatMessageRequest, ChatSessionHandle, ChatbotResponse, PortalError, PortalResult};
use serde_json::{json, Value};
use crate::http::{ApiClient, Method};

const SERVICE: &str = "Chatbot";

pub struct ChatbotService {
    client: ApiClient,
    base_url: String,
}

impl ChatbotService {
    pub fn new(client: ApiClient, base_url: impl Into<String>) -> Self {
        ChatbotService { client, base_url: base_url.into() }
    }

    fn root(&self) -> PortalResult<String> {
        let uid = self.client.require_user_id()?;
        Ok(format!("{}/{}", self.base_url, uid))
    }

    /// Opens a session and returns its id. The backend sends either a JSON
    /// value or the bare id as plain text.
    pub async fn start_chat_session(&self) -> PortalResult<String> {
        let url = format!("{}/ask", self.root()?);
        let body = self.client.get_bytes(SERVICE, &url).await?;
        if let Ok(handle) = serde_json::from_slice::<ChatSessionHandle>(&body) {
            return Ok(handle.into_id());
        }
        let text = String::from_utf8_lossy(&body).trim().to_string();
        if text.is_empty() {
            let err = PortalError::Deserialization("Chat session response carried no id".to_string());
            error!("{} service error: {}", SERVICE, err);
            return Err(err);
        }
        warn!("Chat session id returned as plain text");
        Ok(text)
    }

    pub async fn send_message(&self, message: &str, session_id: Option<&str>) -> PortalResult<ChatbotResponse> {
        let url = format!("{}/chatbot/message", self.root()?);
        let body = ChatMessageRequest {
            message: message.to_string(),
            session_id: session_id.map(str::to_string),
        };
        self.client.post(SERVICE, &url, &body).await
    }

    pub async fn chat_history(&self, session_id: Option<&str>) -> PortalResult<Vec<ChatMessage>> {
        let url = format!("{}/chatbot/history", self.root()?);
        let query = session_id
            .map(|id| vec![("sessionId".to_string(), id.to_string())])
            .unwrap_or_default();
        self.client.get(SERVICE, &url, query).await
    }

    pub async fn end_chat_session(&self, session_id: &str) -> PortalResult<()> {
        let url = format!("{}/chatbot/end-session", self.root()?);
        let query = vec![("sessionId".to_string(), session_id.to_string())];
        let _: Value = self.client.call(SERVICE, Method::POST, &url, query, Some(json!({}))).await?;
        Ok(())
    }
}
