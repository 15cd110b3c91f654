// models/src/envelope.rs
use serde::{Deserialize, Serialize};
use crate::errors::{PortalError, PortalResult};

pub const DEFAULT_REJECTION_MESSAGE: &str = "Request failed";

/// `{ success, message, data }` wrapper used by the newer endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(data: T) -> Self {
        ApiEnvelope { success: true, message: None, data: Some(data) }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        ApiEnvelope { success: false, message: Some(message.into()), data: None }
    }

    /// `success: false` becomes a domain rejection carrying the server message.
    pub fn into_result(self) -> PortalResult<Option<T>> {
        if self.success {
            Ok(self.data)
        } else {
            let message = self
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_REJECTION_MESSAGE.to_string());
            Err(PortalError::Rejected(message))
        }
    }

    pub fn into_data(self) -> PortalResult<T> {
        self.into_result()?
            .ok_or_else(|| PortalError::Deserialization("envelope carried no data".to_string()))
    }
}
