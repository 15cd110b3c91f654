// lib/src/services/notification_service.rs
use std::sync::Arc;
use models::medical::notification::count_unread;
use models::{Notification, PortalResult, UnreadCount};
use serde_json::{json, Value};
use tokio::sync::watch;
use crate::http::ApiClient;

const SERVICE: &str = "Notification";

/// Keeps an unread-count stream in step with every fetch and mutation.
pub struct NotificationService {
    client: ApiClient,
    base_url: String,
    unread: Arc<watch::Sender<u64>>,
}

impl NotificationService {
    pub fn new(client: ApiClient, base_url: impl Into<String>) -> Self {
        let (unread, _) = watch::channel(0);
        NotificationService { client, base_url: base_url.into(), unread: Arc::new(unread) }
    }

    fn root(&self) -> PortalResult<String> {
        let uid = self.client.require_user_id()?;
        Ok(format!("{}/{}/notifications", self.base_url, uid))
    }

    pub fn subscribe_unread(&self) -> watch::Receiver<u64> {
        self.unread.subscribe()
    }

    pub fn unread_snapshot(&self) -> u64 {
        *self.unread.borrow()
    }

    pub async fn list(&self) -> PortalResult<Vec<Notification>> {
        let url = self.root()?;
        let notifications: Vec<Notification> = self.client.get(SERVICE, &url, Vec::new()).await?;
        self.unread.send_replace(count_unread(&notifications));
        Ok(notifications)
    }

    pub async fn unread(&self) -> PortalResult<Vec<Notification>> {
        let url = format!("{}/unread", self.root()?);
        self.client.get(SERVICE, &url, Vec::new()).await
    }

    pub async fn mark_read(&self, notification_id: &str) -> PortalResult<Vec<Notification>> {
        let url = format!("{}/{}/read", self.root()?, notification_id);
        let _: Value = self.client.put(SERVICE, &url, &json!({})).await?;
        self.list().await
    }

    pub async fn mark_all_read(&self) -> PortalResult<Vec<Notification>> {
        let url = format!("{}/read-all", self.root()?);
        let _: Value = self.client.put(SERVICE, &url, &json!({})).await?;
        self.list().await
    }

    pub async fn delete(&self, notification_id: &str) -> PortalResult<Vec<Notification>> {
        let url = format!("{}/{}", self.root()?, notification_id);
        let _: Value = self.client.delete(SERVICE, &url).await?;
        self.list().await
    }

    pub async fn unread_count(&self) -> PortalResult<u64> {
        let url = format!("{}/unread-count", self.root()?);
        let UnreadCount { count } = self.client.get(SERVICE, &url, Vec::new()).await?;
        self.unread.send_replace(count);
        Ok(count)
    }
}
