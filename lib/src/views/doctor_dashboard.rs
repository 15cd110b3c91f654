// lib/src/views/doctor_dashboard.rs
use std::sync::Arc;
use chrono::NaiveDateTime;
use log::{error, info};
use models::{Appointment, AppointmentStatus, PortalError, PortalResult};
use crate::services::DoctorService;
use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppointmentTab {
    #[default]
    All,
    Scheduled,
    Confirmed,
    Upcoming,
    Cancelled,
    Completed,
}

impl AppointmentTab {
    pub const ALL: [AppointmentTab; 6] = [
        AppointmentTab::All,
        AppointmentTab::Scheduled,
        AppointmentTab::Confirmed,
        AppointmentTab::Upcoming,
        AppointmentTab::Cancelled,
        AppointmentTab::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentTab::All => "all",
            AppointmentTab::Scheduled => "scheduled",
            AppointmentTab::Confirmed => "confirmed",
            AppointmentTab::Upcoming => "upcoming",
            AppointmentTab::Cancelled => "cancelled",
            AppointmentTab::Completed => "completed",
        }
    }

    /// Upcoming means confirmed and still ahead of `now`.
    pub fn includes(&self, appointment: &Appointment, now: NaiveDateTime) -> bool {
        match self {
            AppointmentTab::All => true,
            AppointmentTab::Scheduled => appointment.status == AppointmentStatus::Scheduled,
            AppointmentTab::Confirmed => appointment.status == AppointmentStatus::Confirmed,
            AppointmentTab::Upcoming => {
                appointment.status == AppointmentStatus::Confirmed && appointment.is_upcoming(now)
            }
            AppointmentTab::Cancelled => appointment.status == AppointmentStatus::Cancelled,
            AppointmentTab::Completed => appointment.status == AppointmentStatus::Completed,
        }
    }
}

pub struct DoctorDashboard {
    session: SessionStore,
    doctors: Arc<DoctorService>,
    appointments: Vec<Appointment>,
    active_tab: AppointmentTab,
    error: Option<String>,
}

impl DoctorDashboard {
    pub fn new(session: SessionStore, doctors: Arc<DoctorService>) -> Self {
        DoctorDashboard {
            session,
            doctors,
            appointments: Vec::new(),
            active_tab: AppointmentTab::default(),
            error: None,
        }
    }

    pub async fn load(&mut self) -> PortalResult<usize> {
        let Some(uid) = self.session.current_user_id() else {
            return Err(PortalError::NotAuthenticated);
        };
        self.error = None;
        match self.doctors.doctor_appointments(&uid.to_string()).await {
            Ok(list) => {
                self.appointments = list;
                Ok(self.appointments.len())
            }
            Err(e) => {
                error!("Failed to load doctor appointments: {}", e);
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Confirms and refetches so the tabs reflect the server's view.
    pub async fn confirm(&mut self, appointment_id: &str) -> PortalResult<()> {
        if let Err(e) = self.doctors.confirm_appointment(appointment_id).await {
            self.error = Some(e.user_message());
            return Err(e);
        }
        info!("Confirmed appointment {}", appointment_id);
        self.load().await.map(|_| ())
    }

    pub fn select_tab(&mut self, tab: AppointmentTab) {
        self.active_tab = tab;
    }

    pub fn active_tab(&self) -> AppointmentTab {
        self.active_tab
    }

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn visible(&self, now: NaiveDateTime) -> Vec<&Appointment> {
        self.appointments.iter().filter(|a| self.active_tab.includes(a, now)).collect()
    }

    pub fn count(&self, tab: AppointmentTab, now: NaiveDateTime) -> usize {
        self.appointments.iter().filter(|a| tab.includes(a, now)).count()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use reqwest::Method;
    use serde_json::json;
    use crate::http::ApiClient;
    use crate::storage::MemoryStorage;
    use crate::testing::{appointment_json, doctor_user, test_cache, MockTransport};

    const ALL: &str = "http://docs/11/doctor/appointments/get-all";
    const CONFIRM: &str = "http://docs/11/doctor/appointments/2/confirm";

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    async fn dashboard() -> (DoctorDashboard, Arc<MockTransport>) {
        let session = SessionStore::open(Arc::new(MemoryStorage::new())).await.unwrap();
        session.establish(doctor_user(11, true), "doc").await.unwrap();
        let mock = Arc::new(MockTransport::new());
        let doctors = DoctorService::new(ApiClient::new(mock.clone(), session.clone()), "http://docs", test_cache("doctors"));
        (DoctorDashboard::new(session, Arc::new(doctors)), mock)
    }

    #[tokio::test]
    async fn should_filter_tabs_in_memory() {
        let (mut view, mock) = dashboard().await;
        mock.respond(Method::GET, ALL, 200, json!([
            appointment_json("1", "2025-03-11", "09:00", "CONFIRMED"),
            appointment_json("2", "2025-03-12", "10:00", "SCHEDULED"),
            appointment_json("3", "2025-03-01", "10:00", "CONFIRMED"),
            appointment_json("4", "2025-02-01", "10:00", "COMPLETED"),
        ]));
        assert_eq!(view.load().await.unwrap(), 4);
        assert_eq!(view.count(AppointmentTab::Confirmed, now()), 2);
        assert_eq!(view.count(AppointmentTab::Upcoming, now()), 1);
        assert_eq!(view.count(AppointmentTab::Cancelled, now()), 0);

        view.select_tab(AppointmentTab::Scheduled);
        let ids: Vec<_> = view.visible(now()).iter().map(|a| a.id.clone()).collect();
        assert_eq!(ids, vec!["2"]);
    }

    #[tokio::test]
    async fn should_refetch_after_confirming() {
        let (mut view, mock) = dashboard().await;
        mock.respond(Method::GET, ALL, 200, json!([appointment_json("2", "2025-03-12", "10:00", "SCHEDULED")]));
        view.load().await.unwrap();

        mock.respond(Method::PUT, CONFIRM, 200, json!({"success": true}));
        mock.respond(Method::GET, ALL, 200, json!([appointment_json("2", "2025-03-12", "10:00", "CONFIRMED")]));
        view.confirm("2").await.unwrap();

        assert_eq!(mock.requests_to(Method::GET, ALL).len(), 2);
        assert_eq!(view.appointments()[0].status, AppointmentStatus::Confirmed);
    }
}
