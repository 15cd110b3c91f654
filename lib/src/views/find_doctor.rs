// lib/src/views/find_doctor.rs
use std::sync::Arc;
use log::error;
use models::{Doctor, DoctorSearchFilters, PortalResult};
use crate::services::PatientService;
use crate::session::SessionStore;
use super::booking_form::BookingForm;

pub struct FindDoctor {
    session: SessionStore,
    patients: Arc<PatientService>,
    pub filters: DoctorSearchFilters,
    doctors: Vec<Doctor>,
    loading: bool,
    error: Option<String>,
    booking: Option<BookingForm>,
}

impl FindDoctor {
    pub fn new(session: SessionStore, patients: Arc<PatientService>) -> Self {
        FindDoctor {
            session,
            patients,
            filters: DoctorSearchFilters::default(),
            doctors: Vec::new(),
            loading: false,
            error: None,
            booking: None,
        }
    }

    pub async fn load_all(&mut self) -> PortalResult<usize> {
        self.loading = true;
        let result = self.patients.all_doctors().await;
        self.settle(result)
    }

    /// Empty filters fall back to the full list.
    pub async fn search(&mut self) -> PortalResult<usize> {
        if self.filters.is_empty() {
            return self.load_all().await;
        }
        self.loading = true;
        let result = self.patients.search_doctors(&self.filters).await;
        self.settle(result)
    }

    pub async fn clear_filters(&mut self) -> PortalResult<usize> {
        self.filters = DoctorSearchFilters::default();
        self.load_all().await
    }

    fn settle(&mut self, result: PortalResult<Vec<Doctor>>) -> PortalResult<usize> {
        self.loading = false;
        match result {
            Ok(doctors) => {
                self.error = None;
                self.doctors = doctors;
                Ok(self.doctors.len())
            }
            Err(e) => {
                error!("Doctor lookup failed: {}", e);
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    pub fn doctors(&self) -> &[Doctor] {
        &self.doctors
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn open_booking(&mut self, doctor_id: &str) -> &mut BookingForm {
        self.booking.insert(BookingForm::new(doctor_id, &self.session))
    }

    pub fn booking(&mut self) -> Option<&mut BookingForm> {
        self.booking.as_mut()
    }

    pub fn close_booking(&mut self) {
        self.booking = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;
    use serde_json::json;
    use crate::http::ApiClient;
    use crate::storage::MemoryStorage;
    use crate::testing::{patient_user, test_cache, MockTransport};

    const ALL: &str = "http://pat/service/7/patient/doctors/get-all";
    const SEARCH: &str = "http://pat/7/patient/doctors/search";

    async fn view() -> (FindDoctor, Arc<MockTransport>) {
        let session = SessionStore::open(Arc::new(MemoryStorage::new())).await.unwrap();
        session.establish(patient_user(7, true), "tok").await.unwrap();
        let mock = Arc::new(MockTransport::new());
        let patients = PatientService::new(ApiClient::new(mock.clone(), session.clone()), "http://pat", test_cache("patients"));
        (FindDoctor::new(session, Arc::new(patients)), mock)
    }

    fn doctor(id: u32, last: &str) -> serde_json::Value {
        json!({"id": id, "firstName": "Thandi", "lastName": last, "specialization": "Cardiology"})
    }

    #[tokio::test]
    async fn should_search_with_filters_and_reload_on_clear() {
        let (mut view, mock) = view().await;
        mock.respond(Method::GET, ALL, 200, json!({"success": true, "data": [doctor(1, "Nkosi"), doctor(2, "Mokoena")]}));
        mock.respond(Method::GET, SEARCH, 200, json!([doctor(2, "Mokoena")]));

        assert_eq!(view.search().await.unwrap(), 2);
        assert!(mock.requests_to(Method::GET, SEARCH).is_empty());

        view.filters.name = "Mokoena".into();
        assert_eq!(view.search().await.unwrap(), 1);
        let search = mock.requests_to(Method::GET, SEARCH);
        assert_eq!(search[0].query_param("name"), Some("Mokoena"));

        assert_eq!(view.clear_filters().await.unwrap(), 2);
        assert!(view.filters.is_empty());
    }

    #[tokio::test]
    async fn should_open_booking_for_selected_doctor() {
        let (mut view, _) = view().await;
        let form = view.open_booking("2");
        assert_eq!(form.doctor_id, "2");
        assert_eq!(form.patient_id.as_deref(), Some("7"));
        view.close_booking();
        assert!(view.booking().is_none());
    }
}
