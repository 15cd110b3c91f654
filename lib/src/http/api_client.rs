// lib/src/http/api_client.rs
//! Shared request path for every domain service.
//!
//! Headers are rebuilt from the session on each call, so a login or logout
//! takes effect on the very next request. Every failure goes through
//! `execute`, is logged with the calling service's name and returned.

use std::sync::Arc;
use log::error;
use models::{ApiEnvelope, PortalError, PortalResult};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use crate::session::SessionStore;
use super::transport::{ApiRequest, ApiResponse, ApiTransport};

pub type Query = Vec<(String, String)>;

#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn ApiTransport>,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn ApiTransport>, session: SessionStore) -> Self {
        ApiClient { transport, session }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// The signed-in user's id, or `NotAuthenticated` before anything is sent.
    pub fn require_user_id(&self) -> PortalResult<i64> {
        self.session.current_user_id().ok_or(PortalError::NotAuthenticated)
    }

    fn headers(&self) -> Vec<(String, String)> {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if let Some(token) = self.session.token().filter(|t| !t.is_empty()) {
            headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
        }
        headers
    }

    async fn execute(&self, service: &str, method: Method, url: &str, query: Query, body: Option<Value>) -> PortalResult<Vec<u8>> {
        let request = ApiRequest {
            method,
            url: url.to_string(),
            headers: self.headers(),
            query,
            body,
        };
        let outcome = match self.transport.send(request).await {
            Ok(response) => check_status(response),
            Err(e) => Err(e),
        };
        outcome.map_err(|e| {
            error!("{} service error: {}", service, e);
            e
        })
    }

    fn decode<T: DeserializeOwned>(&self, service: &str, body: &[u8]) -> PortalResult<T> {
        let raw: &[u8] = if body.iter().all(u8::is_ascii_whitespace) { b"null" } else { body };
        serde_json::from_slice(raw).map_err(|e| {
            let err = PortalError::Deserialization(format!("Unexpected response body: {}", e));
            error!("{} service error: {}", service, err);
            err
        })
    }

    pub fn encode<B: Serialize>(body: &B) -> PortalResult<Value> {
        serde_json::to_value(body).map_err(|e| PortalError::Serialization(e.to_string()))
    }

    /// General form behind the verb helpers, for calls that need both a query and a body.
    pub async fn call<T: DeserializeOwned>(&self, service: &str, method: Method, url: &str, query: Query, body: Option<Value>) -> PortalResult<T> {
        let body = self.execute(service, method, url, query, body).await?;
        self.decode(service, &body)
    }

    pub async fn get<T: DeserializeOwned>(&self, service: &str, url: &str, query: Query) -> PortalResult<T> {
        self.call(service, Method::GET, url, query, None).await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(&self, service: &str, url: &str, body: &B) -> PortalResult<T> {
        let payload = Self::encode(body)?;
        self.call(service, Method::POST, url, Vec::new(), Some(payload)).await
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(&self, service: &str, url: &str, body: &B) -> PortalResult<T> {
        let payload = Self::encode(body)?;
        self.call(service, Method::PUT, url, Vec::new(), Some(payload)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, service: &str, url: &str) -> PortalResult<T> {
        self.call(service, Method::DELETE, url, Vec::new(), None).await
    }

    /// Raw body, for file downloads.
    pub async fn get_bytes(&self, service: &str, url: &str) -> PortalResult<Vec<u8>> {
        self.execute(service, Method::GET, url, Vec::new(), None).await
    }

    pub async fn get_enveloped<T: DeserializeOwned>(&self, service: &str, url: &str, query: Query) -> PortalResult<T> {
        let envelope: ApiEnvelope<T> = self.get(service, url, query).await?;
        self.open_envelope(service, envelope)
    }

    pub async fn post_enveloped<B: Serialize, T: DeserializeOwned>(&self, service: &str, url: &str, body: &B) -> PortalResult<T> {
        let envelope: ApiEnvelope<T> = self.post(service, url, body).await?;
        self.open_envelope(service, envelope)
    }

    pub async fn put_enveloped<B: Serialize, T: DeserializeOwned>(&self, service: &str, url: &str, body: &B) -> PortalResult<T> {
        let envelope: ApiEnvelope<T> = self.put(service, url, body).await?;
        self.open_envelope(service, envelope)
    }

    /// For envelopes whose `data` may legitimately be absent.
    pub fn accept_envelope<T>(&self, service: &str, envelope: ApiEnvelope<T>) -> PortalResult<Option<T>> {
        envelope.into_result().map_err(|e| {
            error!("{} service error: {}", service, e);
            e
        })
    }

    fn open_envelope<T>(&self, service: &str, envelope: ApiEnvelope<T>) -> PortalResult<T> {
        envelope.into_data().map_err(|e| {
            error!("{} service error: {}", service, e);
            e
        })
    }
}

fn check_status(response: ApiResponse) -> PortalResult<Vec<u8>> {
    if response.is_success() {
        return Ok(response.body);
    }
    let message = error_message(&response);
    match response.status {
        401 | 403 => Err(PortalError::Unauthorized(message)),
        status => Err(PortalError::Http { status, message }),
    }
}

/// Prefers the backend's own `message` field over the raw body.
fn error_message(response: &ApiResponse) -> String {
    if let Ok(value) = serde_json::from_slice::<Value>(&response.body) {
        if let Some(message) = value.get("message").and_then(Value::as_str).filter(|m| !m.is_empty()) {
            return message.to_string();
        }
    }
    let text = String::from_utf8_lossy(&response.body).trim().to_string();
    if text.is_empty() {
        format!("Request failed with status {}", response.status)
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::testing::{patient_user, MockTransport};
    use serde_json::json;

    async fn client(signed_in: bool) -> (ApiClient, Arc<MockTransport>) {
        let session = SessionStore::open(Arc::new(MemoryStorage::new())).await.unwrap();
        if signed_in {
            session.establish(patient_user(7, true), "tok-7").await.unwrap();
        }
        let mock = Arc::new(MockTransport::new());
        (ApiClient::new(mock.clone(), session), mock)
    }

    #[tokio::test]
    async fn should_attach_bearer_only_with_token() {
        let (anonymous, mock) = client(false).await;
        mock.respond(Method::GET, "http://api/x", 200, json!([]));
        let _: Vec<Value> = anonymous.get("Test", "http://api/x", Vec::new()).await.unwrap();
        let sent = mock.last_request().unwrap();
        assert_eq!(sent.header("Content-Type"), Some("application/json"));
        assert_eq!(sent.header("Authorization"), None);

        let (signed_in, mock) = client(true).await;
        mock.respond(Method::GET, "http://api/x", 200, json!([]));
        let _: Vec<Value> = signed_in.get("Test", "http://api/x", Vec::new()).await.unwrap();
        assert_eq!(mock.last_request().unwrap().header("authorization"), Some("Bearer tok-7"));
    }

    #[tokio::test]
    async fn should_classify_failures() {
        let (client, mock) = client(true).await;
        mock.respond(Method::GET, "http://api/forbidden", 403, json!({"message": "nope"}));
        mock.respond(Method::GET, "http://api/broken", 500, json!({"message": "boom"}));
        mock.respond(Method::GET, "http://api/garbled", 200, json!({"unexpected": true}));
        mock.fail(Method::GET, "http://api/offline", PortalError::Network("connection refused".into()));

        let err = client.get::<Vec<Value>>("Test", "http://api/forbidden", Vec::new()).await.unwrap_err();
        assert_eq!(err, PortalError::Unauthorized("nope".into()));
        assert!(err.is_auth_error());

        let err = client.get::<Vec<Value>>("Test", "http://api/broken", Vec::new()).await.unwrap_err();
        assert_eq!(err, PortalError::Http { status: 500, message: "boom".into() });

        let err = client.get::<Vec<Value>>("Test", "http://api/garbled", Vec::new()).await.unwrap_err();
        assert!(matches!(err, PortalError::Deserialization(_)));

        let err = client.get::<Vec<Value>>("Test", "http://api/offline", Vec::new()).await.unwrap_err();
        assert!(matches!(err, PortalError::Network(_)));
    }

    #[tokio::test]
    async fn should_surface_envelope_rejection_message() {
        let (client, mock) = client(true).await;
        mock.respond(Method::POST, "http://api/book", 200, json!({"success": false, "message": "Slot taken"}));
        let err = client
            .post_enveloped::<_, Value>("Test", "http://api/book", &json!({}))
            .await
            .unwrap_err();
        assert_eq!(err, PortalError::Rejected("Slot taken".into()));
    }

    #[tokio::test]
    async fn should_require_session_for_user_scoped_calls() {
        let (client, _) = client(false).await;
        assert_eq!(client.require_user_id(), Err(PortalError::NotAuthenticated));
    }
}
