// lib/src/views/chat_modal.rs
use std::sync::Arc;
use log::{debug, error};
use models::{ChatbotResponse, PortalResult};
use crate::services::ChatbotService;

pub const CHAT_GREETING: &str = "Hi! How can I help you today?";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    pub speaker: Speaker,
    pub text: String,
}

impl ChatEntry {
    fn assistant(text: impl Into<String>) -> Self {
        ChatEntry { speaker: Speaker::Assistant, text: text.into() }
    }
}

/// AI assistant modal. The backend session is opened on the first message
/// and forgotten when the modal closes.
pub struct ChatModal {
    chatbot: Arc<ChatbotService>,
    session_id: Option<String>,
    transcript: Vec<ChatEntry>,
    loading: bool,
    error: Option<String>,
}

impl ChatModal {
    pub fn new(chatbot: Arc<ChatbotService>) -> Self {
        ChatModal {
            chatbot,
            session_id: None,
            transcript: vec![ChatEntry::assistant(CHAT_GREETING)],
            loading: false,
            error: None,
        }
    }

    pub fn transcript(&self) -> &[ChatEntry] {
        &self.transcript
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Blank input is ignored and returns `Ok(None)`.
    pub async fn send(&mut self, input: &str) -> PortalResult<Option<ChatbotResponse>> {
        let text = input.trim();
        if text.is_empty() {
            return Ok(None);
        }
        self.transcript.push(ChatEntry { speaker: Speaker::User, text: text.to_string() });
        self.loading = true;
        self.error = None;

        let result = self.exchange(text).await;
        self.loading = false;
        match result {
            Ok(reply) => {
                self.transcript.push(ChatEntry::assistant(reply.message.clone()));
                Ok(Some(reply))
            }
            Err(e) => {
                error!("Chat message failed: {}", e);
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    async fn exchange(&mut self, text: &str) -> PortalResult<ChatbotResponse> {
        if self.session_id.is_none() {
            let id = self.chatbot.start_chat_session().await?;
            debug!("Opened chat session {}", id);
            self.session_id = Some(id);
        }
        self.chatbot.send_message(text, self.session_id.as_deref()).await
    }

    pub fn close(&mut self) {
        self.session_id = None;
        self.transcript = vec![ChatEntry::assistant(CHAT_GREETING)];
        self.loading = false;
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::PortalError;
    use reqwest::Method;
    use serde_json::json;
    use crate::http::ApiClient;
    use crate::session::SessionStore;
    use crate::storage::MemoryStorage;
    use crate::testing::{patient_user, MockTransport};

    const ASK: &str = "http://chat/7/ask";
    const MESSAGE: &str = "http://chat/7/chatbot/message";

    async fn modal() -> (ChatModal, Arc<MockTransport>) {
        let session = SessionStore::open(Arc::new(MemoryStorage::new())).await.unwrap();
        session.establish(patient_user(7, true), "tok").await.unwrap();
        let mock = Arc::new(MockTransport::new());
        let chatbot = ChatbotService::new(ApiClient::new(mock.clone(), session), "http://chat");
        (ChatModal::new(Arc::new(chatbot)), mock)
    }

    #[tokio::test]
    async fn should_open_session_lazily_and_append_reply() {
        let (mut chat, mock) = modal().await;
        assert_eq!(chat.transcript(), &[ChatEntry::assistant(CHAT_GREETING)]);
        assert_eq!(chat.send("   ").await.unwrap(), None);
        assert!(mock.requests().is_empty());

        mock.respond_raw(Method::GET, ASK, 200, b"sess-1");
        mock.respond(Method::POST, MESSAGE, 200, json!({"message": "Drink water and rest."}));
        chat.send("I have a headache").await.unwrap();
        chat.send("Since yesterday").await.unwrap();

        assert_eq!(chat.session_id(), Some("sess-1"));
        assert_eq!(mock.requests_to(Method::GET, ASK).len(), 1);
        assert_eq!(chat.transcript().len(), 5);
        assert_eq!(chat.transcript()[2].text, "Drink water and rest.");
        let last = mock.last_request().unwrap();
        assert_eq!(last.body, Some(json!({"message": "Since yesterday", "sessionId": "sess-1"})));
    }

    #[tokio::test]
    async fn should_stop_loading_on_error_and_reset_on_close() {
        let (mut chat, mock) = modal().await;
        mock.respond_raw(Method::GET, ASK, 200, b"sess-1");
        mock.fail(Method::POST, MESSAGE, PortalError::Network("offline".into()));
        assert!(chat.send("Hello").await.is_err());
        assert!(!chat.is_loading());
        assert!(chat.error().is_some());
        assert_eq!(chat.transcript().len(), 2);

        chat.close();
        assert_eq!(chat.session_id(), None);
        assert_eq!(chat.transcript().len(), 1);
        assert_eq!(chat.error(), None);
    }
}
