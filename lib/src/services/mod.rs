// lib/src/services/mod.rs
//! One service per REST resource. Each owns its base URL and a cache for
//! its domain, and drops that cache after any mutating call.

use caching::Cache;
use log::warn;
use models::{PortalError, ValidationError};
use schema::ValidationReport;
use serde::Serialize;
use crate::http::ApiClient;

pub mod appointment_service;
pub mod auth_service;
pub mod chatbot_service;
pub mod doctor_service;
pub mod notification_service;
pub mod patient_service;
pub mod payment_service;
pub mod prescription_service;

pub use appointment_service::AppointmentService;
pub use auth_service::{landing_route, AuthService, LoginOutcome, REGISTRATION_CONFIRMATION};
pub use chatbot_service::ChatbotService;
pub use doctor_service::DoctorService;
pub use notification_service::NotificationService;
pub use patient_service::PatientService;
pub use payment_service::PaymentService;
pub use prescription_service::PrescriptionService;

/// Collapses a failed report into the error a caller shows first.
pub fn validation_failure(report: &ValidationReport) -> PortalError {
    let error = match (report.blocking_message(), report.errors.first()) {
        (Some(message), _) => ValidationError::Blocking(message.to_string()),
        (None, Some(first)) => ValidationError::InvalidField {
            field: first.path.clone(),
            message: first.message.clone(),
        },
        (None, None) => ValidationError::Blocking("Please check the form".to_string()),
    };
    PortalError::Validation(error)
}

pub(crate) fn cache_key(parts: &[&str]) -> String {
    parts.join(":")
}

/// Key prefixed with the signed-in user's id, for entries whose URL does not carry it.
pub(crate) fn user_cache_key(client: &ApiClient, parts: &[&str]) -> String {
    let uid = client.session().current_user_id().map(|id| id.to_string()).unwrap_or_else(|| "-".to_string());
    let mut scoped = vec![uid.as_str()];
    scoped.extend_from_slice(parts);
    cache_key(&scoped)
}

/// A failed cache write never fails the read that fetched the value.
pub(crate) async fn remember<T: Serialize>(cache: &Cache, key: String, value: &T) {
    if let Err(e) = cache.insert_as(key.as_str(), value).await {
        warn!("Could not cache {} in {}: {}", key, cache.domain(), e);
    }
}
