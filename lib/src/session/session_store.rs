// lib/src/session/session_store.rs
//! Single owner of the signed-in identity.
//!
//! The session lives in a watch channel so the guard, the services and any
//! view model observe the same value, and is mirrored to durable storage
//! under two keys so a restart can pick it up again.

use std::sync::Arc;
use log::{debug, info, warn};
use models::{PortalResult, Role, Session, User};
use tokio::sync::watch;
use crate::storage::DurableStorage;

pub const TOKEN_KEY: &str = "token";
pub const CURRENT_USER_KEY: &str = "currentUser";

#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn DurableStorage>,
    current: Arc<watch::Sender<Option<Session>>>,
}

impl SessionStore {
    /// Rehydrates from storage. A token without a readable user (or the
    /// reverse) is treated as no session, and both keys are cleared.
    pub async fn open(storage: Arc<dyn DurableStorage>) -> PortalResult<Self> {
        let token = storage.get(TOKEN_KEY).await?;
        let raw_user = storage.get(CURRENT_USER_KEY).await?;

        let restored = match (token, raw_user) {
            (Some(token), Some(raw)) if !token.is_empty() => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(Session::new(user, token)),
                Err(e) => {
                    warn!("Discarding unreadable stored user: {}", e);
                    None
                }
            },
            _ => None,
        };

        if restored.is_none() {
            storage.remove(TOKEN_KEY).await?;
            storage.remove(CURRENT_USER_KEY).await?;
        } else {
            debug!("Restored session from storage");
        }

        let (sender, _) = watch::channel(restored);
        Ok(SessionStore { storage, current: Arc::new(sender) })
    }

    pub async fn establish(&self, user: User, token: impl Into<String>) -> PortalResult<Session> {
        let session = Session::new(user, token);
        self.persist(&session).await?;
        info!("Session established for user {} ({})", session.user_id(), session.role());
        self.current.send_replace(Some(session.clone()));
        Ok(session)
    }

    /// Always succeeds; storage failures are only logged.
    pub async fn clear(&self) {
        for key in [TOKEN_KEY, CURRENT_USER_KEY] {
            if let Err(e) = self.storage.remove(key).await {
                warn!("Failed to remove '{}' from storage: {}", key, e);
            }
        }
        if self.current.send_replace(None).is_some() {
            info!("Session cleared");
        }
    }

    pub async fn set_profile_completed(&self, completed: bool) -> PortalResult<()> {
        let Some(mut session) = self.current_session() else {
            return Ok(());
        };
        session.user.profile_completed = completed;
        self.persist(&session).await?;
        self.current.send_replace(Some(session));
        Ok(())
    }

    async fn persist(&self, session: &Session) -> PortalResult<()> {
        let user_json = serde_json::to_string(&session.user)?;
        self.storage.set(TOKEN_KEY, &session.token).await?;
        self.storage.set(CURRENT_USER_KEY, &user_json).await?;
        Ok(())
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.current.subscribe()
    }

    pub fn current_session(&self) -> Option<Session> {
        self.current.borrow().clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.current.borrow().as_ref().map(|s| s.user.clone())
    }

    pub fn current_user_id(&self) -> Option<i64> {
        self.current.borrow().as_ref().map(Session::user_id)
    }

    pub fn token(&self) -> Option<String> {
        self.current.borrow().as_ref().map(|s| s.token.clone())
    }

    pub fn role(&self) -> Option<Role> {
        self.current.borrow().as_ref().map(Session::role)
    }

    pub fn is_logged_in(&self) -> bool {
        self.current.borrow().is_some()
    }

    pub fn has_completed_profile(&self) -> bool {
        self.current.borrow().as_ref().map(Session::profile_completed).unwrap_or(false)
    }
}
