// lib/src/views/booking_form.rs
use chrono::NaiveDate;
use log::info;
use models::util::DATE_FORMAT;
use models::{Appointment, AppointmentStatus, AppointmentType, BookingRequest, PortalError, PortalResult, Role};
use once_cell::sync::Lazy;
use schema::{Constraint, EnforcementLevel, FieldError, FieldRule, RuleSet, ValidationReport};
use serde_json::json;
use crate::services::{validation_failure, AppointmentService};
use crate::session::SessionStore;

static BOOKING_RULES: Lazy<RuleSet> = Lazy::new(|| {
    let types = AppointmentType::ALL.iter().map(|t| t.as_str().to_string()).collect();
    RuleSet::new("booking")
        .rule(FieldRule::new("doctorId").label("Doctor").required())
        .rule(FieldRule::new("patientId").label("Patient").required())
        .rule(FieldRule::new("appointmentDate").required())
        .rule(FieldRule::new("reason").required())
        .rule(FieldRule::new("appointmentType").required().with(Constraint::Enum(types)))
});

/// Booking modal opened from the doctor search. The patient is always the
/// signed-in patient; other roles leave it blank and fail validation.
#[derive(Debug, Clone)]
pub struct BookingForm {
    pub doctor_id: String,
    pub patient_id: Option<String>,
    pub appointment_date: Option<NaiveDate>,
    pub appointment_type: Option<AppointmentType>,
    pub reason: String,
    submitting: bool,
    booked: Option<Appointment>,
    error: Option<String>,
}

impl BookingForm {
    pub fn new(doctor_id: impl Into<String>, session: &SessionStore) -> Self {
        let patient_id = session
            .current_user()
            .filter(|u| u.role == Role::Patient)
            .map(|u| u.id.to_string());
        BookingForm {
            doctor_id: doctor_id.into(),
            patient_id,
            appointment_date: None,
            appointment_type: None,
            reason: String::new(),
            submitting: false,
            booked: None,
            error: None,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn booked(&self) -> Option<&Appointment> {
        self.booked.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn validate(&self, today: NaiveDate) -> ValidationReport {
        let snapshot = json!({
            "doctorId": self.doctor_id,
            "patientId": self.patient_id,
            "appointmentDate": self.appointment_date.map(|d| d.format(DATE_FORMAT).to_string()),
            "reason": self.reason,
            "appointmentType": self.appointment_type.map(|t| t.as_str()),
        });
        let mut report = BOOKING_RULES.validate(&snapshot);
        if matches!(self.appointment_date, Some(date) if date < today) {
            report.errors.push(FieldError {
                path: "appointmentDate".to_string(),
                message: "Appointment date cannot be in the past".to_string(),
                enforcement_level: EnforcementLevel::Inline,
            });
        }
        report
    }

    /// Books exactly once per valid submit; a second submit while one is in
    /// flight is refused.
    pub async fn submit(&mut self, appointments: &AppointmentService, today: NaiveDate) -> PortalResult<Appointment> {
        if self.submitting {
            return Err(PortalError::InvalidRequest("Booking already in progress".to_string()));
        }
        let report = self.validate(today);
        let (Some(patient_id), Some(date), Some(kind)) = (self.patient_id.clone(), self.appointment_date, self.appointment_type) else {
            return Err(validation_failure(&report));
        };
        if !report.is_valid() {
            return Err(validation_failure(&report));
        }

        let request = BookingRequest {
            doctor_id: self.doctor_id.clone(),
            patient_id,
            appointment_date: date,
            start_time: None,
            end_time: None,
            reason: self.reason.trim().to_string(),
            appointment_type: kind,
            status: AppointmentStatus::Confirmed,
        };

        self.submitting = true;
        self.error = None;
        let result = appointments.book(&request).await;
        self.submitting = false;
        match result {
            Ok(appointment) => {
                info!("Booked appointment {} with doctor {}", appointment.id, self.doctor_id);
                self.booked = Some(appointment.clone());
                Ok(appointment)
            }
            Err(e) => {
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use models::ValidationError;
    use reqwest::Method;
    use crate::http::ApiClient;
    use crate::storage::MemoryStorage;
    use crate::testing::{appointment_json, doctor_user, patient_user, test_cache, MockTransport};

    const BOOK_URL: &str = "http://appts/7/appointments/book";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    async fn fixture() -> (SessionStore, AppointmentService, Arc<MockTransport>) {
        let session = SessionStore::open(Arc::new(MemoryStorage::new())).await.unwrap();
        session.establish(patient_user(7, true), "tok").await.unwrap();
        let mock = Arc::new(MockTransport::new());
        let service = AppointmentService::new(ApiClient::new(mock.clone(), session.clone()), "http://appts", test_cache("appointments"));
        (session, service, mock)
    }

    #[tokio::test]
    async fn should_require_every_field_and_a_future_date() {
        let (session, service, mock) = fixture().await;
        let mut form = BookingForm::new("11", &session);
        assert_eq!(form.patient_id.as_deref(), Some("7"));
        let report = form.validate(today());
        assert_eq!(report.message_for("reason"), Some("Reason is required"));
        assert_eq!(report.message_for("appointmentType"), Some("Appointment type is required"));

        form.appointment_date = NaiveDate::from_ymd_opt(2025, 3, 9);
        form.reason = "Chest pain".into();
        form.appointment_type = Some(AppointmentType::Initial);
        let err = form.submit(&service, today()).await.unwrap_err();
        assert_eq!(
            err,
            PortalError::Validation(ValidationError::field("appointmentDate", "Appointment date cannot be in the past"))
        );
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn should_book_once_when_valid() {
        let (session, service, mock) = fixture().await;
        mock.respond(Method::POST, BOOK_URL, 200, appointment_json("55", "2025-03-10", "09:00", "CONFIRMED"));
        let mut form = BookingForm::new("11", &session);
        form.appointment_date = Some(today());
        form.reason = "Checkup".into();
        form.appointment_type = Some(AppointmentType::FollowUp);

        let booked = form.submit(&service, today()).await.unwrap();
        assert_eq!(booked.id, "55");
        assert_eq!(form.booked().map(|a| a.id.as_str()), Some("55"));
        let requests = mock.requests_to(Method::POST, BOOK_URL);
        assert_eq!(requests.len(), 1);
        let body = requests[0].body.clone().unwrap();
        assert_eq!(body["patientId"], "7");
        assert_eq!(body["appointmentType"], "follow_up");
        assert_eq!(body["status"], "CONFIRMED");
    }

    #[tokio::test]
    async fn should_leave_patient_blank_for_non_patients() {
        let (session, _, _) = fixture().await;
        session.establish(doctor_user(11, true), "tok").await.unwrap();
        let form = BookingForm::new("11", &session);
        assert_eq!(form.patient_id, None);
        assert_eq!(form.validate(today()).message_for("patientId"), Some("Patient is required"));
    }
}
