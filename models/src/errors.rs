// models/src/errors.rs
use std::io;
use anyhow::Error as AnyhowError;
use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeJsonError;
pub use thiserror::Error;

/// Coarse classification used by callers to decide how a failure is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Local form/input problem; blocks a transition, nothing was sent.
    Validation,
    /// Missing session or a 401/403 from the backend.
    Authorization,
    /// Transport failure, non-2xx status or an undecodable body.
    Remote,
    /// The backend answered `success: false`.
    DomainRejection,
    /// Storage, configuration and other client-side infrastructure.
    Local,
}

#[derive(Debug, Serialize, Deserialize, Error, Clone, PartialEq)]
pub enum PortalError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Invalid Request: {0}")]
    InvalidRequest(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Deserialization error: {0}")]
    Deserialization(String),
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Not authenticated")]
    NotAuthenticated,
    #[error("{0}")]
    Rejected(String),
    #[error("entity {0} was not found")]
    NotFound(String),
    #[error("Validation error: {0}")]
    Validation(ValidationError),
    #[cfg(feature = "sled-errors")]
    #[error("Sled error: {0}")]
    Sled(String),
}

impl PortalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PortalError::Validation(_) | PortalError::InvalidRequest(_) => ErrorKind::Validation,
            PortalError::Unauthorized(_) | PortalError::NotAuthenticated => ErrorKind::Authorization,
            PortalError::Network(_)
            | PortalError::Http { .. }
            | PortalError::Deserialization(_)
            | PortalError::NotFound(_) => ErrorKind::Remote,
            PortalError::Rejected(_) => ErrorKind::DomainRejection,
            _ => ErrorKind::Local,
        }
    }

    /// 401 and 403 both end up here; the caller decides whether to send the user to login.
    pub fn is_auth_error(&self) -> bool {
        self.kind() == ErrorKind::Authorization
    }

    /// Message suitable for a blocking alert.
    pub fn user_message(&self) -> String {
        match self {
            PortalError::Rejected(message) => message.clone(),
            PortalError::Validation(err) => err.to_string(),
            PortalError::NotAuthenticated | PortalError::Unauthorized(_) => {
                "Your session has expired. Please sign in again.".to_string()
            }
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }
}

impl From<&str> for PortalError {
    fn from(error: &str) -> Self {
        PortalError::InvalidRequest(error.to_string())
    }
}

impl From<SerdeJsonError> for PortalError {
    fn from(err: SerdeJsonError) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            PortalError::Deserialization(format!("JSON decode error: {}", err))
        } else {
            PortalError::Serialization(format!("JSON serialization error: {}", err))
        }
    }
}

impl From<AnyhowError> for PortalError {
    fn from(err: AnyhowError) -> Self {
        PortalError::StorageError(format!("Underlying operation failed: {}", err))
    }
}

impl From<io::Error> for PortalError {
    fn from(err: io::Error) -> Self {
        PortalError::Io(format!("IO error: {}", err))
    }
}

impl From<ValidationError> for PortalError {
    fn from(err: ValidationError) -> Self {
        PortalError::Validation(err)
    }
}

#[cfg(feature = "sled-errors")]
impl From<sled::Error> for PortalError {
    fn from(err: sled::Error) -> Self {
        PortalError::Sled(format!("Sled error: {}", err))
    }
}

#[cfg(feature = "reqwest-errors")]
impl From<reqwest::Error> for PortalError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            PortalError::Deserialization(format!("Response decode error: {}", err))
        } else if let Some(status) = err.status() {
            PortalError::Http { status: status.as_u16(), message: err.to_string() }
        } else {
            PortalError::Network(format!("Request failed: {}", err))
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Error, PartialEq, Clone)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
    #[error("{0} is required")]
    MissingField(String),
    #[error("{0}")]
    Blocking(String),
    #[error("invalid ID number: {0}")]
    InvalidIdNumber(String),
    #[error("invalid date format: {0}")]
    InvalidDateFormat(String),
    #[error("invalid value provided")]
    InvalidValue,
}

impl ValidationError {
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError::InvalidField { field: field.into(), message: message.into() }
    }
}

/// A type alias for a `Result` that returns a `PortalError` on failure.
pub type PortalResult<T> = Result<T, PortalError>;

/// A type alias for a `Result` that returns a `ValidationError` on failure.
pub type ValidationResult<T> = Result<T, ValidationError>;
