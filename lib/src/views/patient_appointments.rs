// lib/src/views/patient_appointments.rs
use std::sync::Arc;
use chrono::NaiveDateTime;
use log::{error, info};
use models::{Appointment, PortalError, PortalResult};
use crate::services::AppointmentService;
use crate::util::appointment_status_color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppointmentsTab {
    #[default]
    Upcoming,
    Past,
}

pub struct PatientAppointments {
    appointments: Arc<AppointmentService>,
    tab: AppointmentsTab,
    items: Vec<Appointment>,
    loading: bool,
    error: Option<String>,
}

impl PatientAppointments {
    pub fn new(appointments: Arc<AppointmentService>) -> Self {
        PatientAppointments {
            appointments,
            tab: AppointmentsTab::default(),
            items: Vec::new(),
            loading: false,
            error: None,
        }
    }

    pub async fn load(&mut self) -> PortalResult<usize> {
        self.loading = true;
        self.error = None;
        let result = match self.tab {
            AppointmentsTab::Upcoming => self.appointments.upcoming().await,
            AppointmentsTab::Past => self.appointments.past().await,
        };
        self.loading = false;
        match result {
            Ok(list) => {
                self.items = list;
                Ok(self.items.len())
            }
            Err(e) => {
                error!("Failed to load appointments: {}", e);
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    pub async fn switch_tab(&mut self, tab: AppointmentsTab) -> PortalResult<usize> {
        self.tab = tab;
        self.load().await
    }

    /// Cancels and reloads the current tab. Appointments the list says
    /// cannot be cancelled any more are refused locally.
    pub async fn cancel(&mut self, appointment_id: &str, reason: Option<String>, now: NaiveDateTime) -> PortalResult<()> {
        let cancellable = self
            .items
            .iter()
            .find(|a| a.id == appointment_id)
            .map_or(true, |a| a.can_cancel(now));
        if !cancellable {
            return Err(PortalError::InvalidRequest(
                "Appointments can only be cancelled more than 24 hours in advance".to_string(),
            ));
        }
        if let Err(e) = self.appointments.cancel(appointment_id, reason).await {
            self.error = Some(e.user_message());
            return Err(e);
        }
        info!("Cancelled appointment {}", appointment_id);
        self.load().await.map(|_| ())
    }

    pub fn tab(&self) -> AppointmentsTab {
        self.tab
    }

    pub fn items(&self) -> &[Appointment] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn status_color(appointment: &Appointment) -> &'static str {
        appointment_status_color(&appointment.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use reqwest::Method;
    use serde_json::json;
    use crate::http::ApiClient;
    use crate::session::SessionStore;
    use crate::storage::MemoryStorage;
    use crate::testing::{appointment_json, patient_user, test_cache, MockTransport};

    const UPCOMING: &str = "http://appts/7/appointments/upcoming";
    const PAST: &str = "http://appts/7/appointments/past";
    const CANCEL: &str = "http://appts/7/appointments/1/cancel";

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap().and_hms_opt(8, 0, 0).unwrap()
    }

    async fn view() -> (PatientAppointments, Arc<MockTransport>) {
        let session = SessionStore::open(Arc::new(MemoryStorage::new())).await.unwrap();
        session.establish(patient_user(7, true), "tok").await.unwrap();
        let mock = Arc::new(MockTransport::new());
        let service = AppointmentService::new(ApiClient::new(mock.clone(), session), "http://appts", test_cache("appointments"));
        (PatientAppointments::new(Arc::new(service)), mock)
    }

    #[tokio::test]
    async fn should_switch_between_upcoming_and_past() {
        let (mut view, mock) = view().await;
        mock.respond(Method::GET, UPCOMING, 200, json!([appointment_json("1", "2025-03-20", "09:00", "SCHEDULED")]));
        mock.respond(Method::GET, PAST, 200, json!([
            appointment_json("2", "2025-01-20", "09:00", "COMPLETED"),
            appointment_json("3", "2025-01-21", "09:00", "CANCELLED"),
        ]));
        assert_eq!(view.load().await.unwrap(), 1);
        assert_eq!(view.switch_tab(AppointmentsTab::Past).await.unwrap(), 2);
        assert_eq!(view.tab(), AppointmentsTab::Past);
        assert_eq!(PatientAppointments::status_color(&view.items()[1]), "#EF4444");
    }

    #[tokio::test]
    async fn should_cancel_then_reload() {
        let (mut view, mock) = view().await;
        mock.respond(Method::GET, UPCOMING, 200, json!([appointment_json("1", "2025-03-20", "09:00", "SCHEDULED")]));
        view.load().await.unwrap();

        mock.respond(Method::PUT, CANCEL, 200, appointment_json("1", "2025-03-20", "09:00", "CANCELLED"));
        mock.respond(Method::GET, UPCOMING, 200, json!([]));
        view.cancel("1", Some("Feeling better".into()), now()).await.unwrap();

        let cancel = mock.requests_to(Method::PUT, CANCEL);
        assert_eq!(cancel.len(), 1);
        assert_eq!(cancel[0].body, Some(json!({"reason": "Feeling better"})));
        assert!(view.items().is_empty());
    }

    #[tokio::test]
    async fn should_refuse_late_cancellation() {
        let (mut view, mock) = view().await;
        mock.respond(Method::GET, UPCOMING, 200, json!([appointment_json("1", "2025-03-10", "18:00", "SCHEDULED")]));
        view.load().await.unwrap();
        assert!(view.cancel("1", None, now()).await.is_err());
        assert!(mock.requests_to(Method::PUT, CANCEL).is_empty());
    }
}
