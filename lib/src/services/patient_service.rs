// lib/src/services/patient_service.rs
//! Patient-scoped endpoints: profile, appointments, doctor discovery,
//! medical records and prescriptions as seen by the patient.

use caching::Cache;
use chrono::NaiveDateTime;
use log::debug;
use models::{
    Appointment, CancelRequest, Doctor, DoctorSearchFilters, EmergencyContact, MedicalRecord,
    MedicalRecordFilter, MedicalRecordSummary, PatientProfile, PortalResult, Prescription,
    PrescriptionFilter, RescheduleRequest,
};
use serde::Serialize;
use serde_json::Value;
use crate::http::ApiClient;
use super::{cache_key, remember, user_cache_key};

const SERVICE: &str = "Patient";

pub struct PatientService {
    client: ApiClient,
    base_url: String,
    cache: Cache,
}

impl PatientService {
    pub fn new(client: ApiClient, base_url: impl Into<String>, cache: Cache) -> Self {
        PatientService { client, base_url: base_url.into(), cache }
    }

    fn patient_url(&self, tail: &str) -> PortalResult<String> {
        let uid = self.client.require_user_id()?;
        Ok(format!("{}/{}/patient/{}", self.base_url, uid, tail))
    }

    fn service_url(&self, tail: &str) -> PortalResult<String> {
        let uid = self.client.require_user_id()?;
        Ok(format!("{}/service/{}/patient/{}", self.base_url, uid, tail))
    }

    async fn mutated<T>(&self, result: PortalResult<T>) -> PortalResult<T> {
        let value = result?;
        self.cache.invalidate_all();
        Ok(value)
    }

    // Profile

    pub async fn get_profile(&self) -> PortalResult<PatientProfile> {
        let url = self.patient_url("profile")?;
        self.client.get(SERVICE, &url, Vec::new()).await
    }

    pub async fn update_profile<P: Serialize + Sync>(&self, payload: &P) -> PortalResult<Value> {
        let url = self.patient_url("profile")?;
        let result = self.client.put(SERVICE, &url, payload).await;
        self.mutated(result).await
    }

    pub async fn emergency_contacts(&self) -> PortalResult<Vec<EmergencyContact>> {
        let url = self.patient_url("emergency-contacts")?;
        self.client.get(SERVICE, &url, Vec::new()).await
    }

    // Appointments

    pub async fn upcoming_appointments(&self) -> PortalResult<Vec<Appointment>> {
        let url = self.patient_url("appointments/upcoming")?;
        self.client.get(SERVICE, &url, Vec::new()).await
    }

    pub async fn past_appointments(&self) -> PortalResult<Vec<Appointment>> {
        let url = self.patient_url("appointments/past")?;
        self.client.get(SERVICE, &url, Vec::new()).await
    }

    pub async fn appointments(&self, status: Option<&str>, limit: Option<u32>, offset: Option<u32>) -> PortalResult<Vec<Appointment>> {
        let url = self.patient_url("appointments")?;
        let mut query = Vec::new();
        if let Some(status) = status.filter(|s| !s.is_empty()) {
            query.push(("status".to_string(), status.to_string()));
        }
        if let Some(limit) = limit.filter(|l| *l > 0) {
            query.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(offset) = offset.filter(|o| *o > 0) {
            query.push(("offset".to_string(), offset.to_string()));
        }

        let key = cache_key(&[
            &url,
            &query.iter().map(|(k, v)| format!("{}={}", k, v)).collect::<Vec<_>>().join("&"),
        ]);
        if let Some(hit) = self.cache.get_as::<Vec<Appointment>>(&key).await {
            return Ok(hit);
        }
        let appointments: Vec<Appointment> = self.client.get_enveloped(SERVICE, &url, query).await?;
        remember(&self.cache, key, &appointments).await;
        for appointment in &appointments {
            remember(&self.cache, user_cache_key(&self.client, &["appointment", &appointment.id]), appointment).await;
        }
        Ok(appointments)
    }

    /// Answers from previously listed appointments when possible.
    pub async fn appointment(&self, appointment_id: &str) -> PortalResult<Appointment> {
        let key = user_cache_key(&self.client, &["appointment", appointment_id]);
        if let Some(hit) = self.cache.get_as::<Appointment>(&key).await {
            debug!("Appointment {} served from cache", appointment_id);
            return Ok(hit);
        }
        let url = self.patient_url(&format!("appointments/{}", appointment_id))?;
        self.client.get(SERVICE, &url, Vec::new()).await
    }

    pub async fn cancel_appointment(&self, appointment_id: &str, reason: Option<String>) -> PortalResult<Value> {
        let url = self.patient_url(&format!("appointments/{}/cancel", appointment_id))?;
        let body = CancelRequest { reason: reason.filter(|r| !r.trim().is_empty()) };
        let result = self.client.put(SERVICE, &url, &body).await;
        self.mutated(result).await
    }

    pub async fn reschedule_appointment(&self, appointment_id: &str, request: &RescheduleRequest) -> PortalResult<Value> {
        let url = self.patient_url(&format!("appointments/{}/reschedule", appointment_id))?;
        let result = self.client.put(SERVICE, &url, request).await;
        self.mutated(result).await
    }

    /// Earliest upcoming appointment that has not started yet.
    pub async fn next_appointment(&self, now: NaiveDateTime) -> PortalResult<Option<Appointment>> {
        let upcoming = self.upcoming_appointments().await?;
        Ok(upcoming
            .into_iter()
            .filter(|a| a.is_upcoming(now))
            .min_by_key(Appointment::starts_at))
    }

    pub async fn book_appointment<B: Serialize + Sync>(&self, booking: &B) -> PortalResult<Value> {
        let url = self.service_url("appointments/book")?;
        let result = self.client.post_enveloped(SERVICE, &url, booking).await;
        self.mutated(result).await
    }

    // Doctor discovery

    pub async fn all_doctors(&self) -> PortalResult<Vec<Doctor>> {
        let url = self.service_url("doctors/get-all")?;
        self.cached_doctor_list(url).await
    }

    pub async fn doctors_by_specialization(&self, specialization: &str) -> PortalResult<Vec<Doctor>> {
        let url = self.service_url(&format!("doctors/get-by-specialization/{}", specialization))?;
        self.cached_doctor_list(url).await
    }

    async fn cached_doctor_list(&self, url: String) -> PortalResult<Vec<Doctor>> {
        if let Some(hit) = self.cache.get_as::<Vec<Doctor>>(&url).await {
            return Ok(hit);
        }
        let doctors: Vec<Doctor> = self.client.get_enveloped(SERVICE, &url, Vec::new()).await?;
        remember(&self.cache, url, &doctors).await;
        Ok(doctors)
    }

    pub async fn search_doctors(&self, filters: &DoctorSearchFilters) -> PortalResult<Vec<Doctor>> {
        let url = self.patient_url("doctors/search")?;
        self.client.get(SERVICE, &url, filters.to_query()).await
    }

    pub async fn doctor_by_id(&self, doctor_id: &str) -> PortalResult<Doctor> {
        let key = user_cache_key(&self.client, &["doctor", doctor_id]);
        if let Some(hit) = self.cache.get_as::<Doctor>(&key).await {
            return Ok(hit);
        }
        let url = format!("{}/patient/doctors/{}", self.base_url, doctor_id);
        let doctor: Doctor = self.client.get(SERVICE, &url, Vec::new()).await?;
        remember(&self.cache, key, &doctor).await;
        Ok(doctor)
    }

    // Records and prescriptions

    pub async fn medical_records(&self, filter: &MedicalRecordFilter) -> PortalResult<Vec<MedicalRecord>> {
        let url = self.patient_url("medical-records")?;
        self.client.get(SERVICE, &url, filter.to_query()).await
    }

    pub async fn medical_records_by_doctor(&self, doctor_id: &str) -> PortalResult<Vec<MedicalRecord>> {
        let url = self.patient_url(&format!("medical-records/doctor/{}", doctor_id))?;
        self.client.get(SERVICE, &url, Vec::new()).await
    }

    pub async fn medical_records_summary(&self) -> PortalResult<MedicalRecordSummary> {
        let url = self.patient_url("medical-records/summary")?;
        self.client.get(SERVICE, &url, Vec::new()).await
    }

    pub async fn prescriptions(&self, filter: &PrescriptionFilter) -> PortalResult<Vec<Prescription>> {
        let url = self.patient_url("prescriptions")?;
        let query = filter.to_query();
        let key = cache_key(&[&url, &format!("{:?}", query)]);
        if let Some(hit) = self.cache.get_as::<Vec<Prescription>>(&key).await {
            return Ok(hit);
        }
        let prescriptions: Vec<Prescription> = self.client.get(SERVICE, &url, query).await?;
        remember(&self.cache, key, &prescriptions).await;
        Ok(prescriptions)
    }

    pub async fn active_prescriptions(&self) -> PortalResult<Vec<Prescription>> {
        let url = self.patient_url("prescriptions/active")?;
        self.client.get(SERVICE, &url, Vec::new()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use chrono::NaiveDate;
    use reqwest::Method;
    use serde_json::json;
    use crate::session::SessionStore;
    use crate::storage::MemoryStorage;
    use crate::testing::{appointment_json, patient_user, test_cache, MockTransport};

    const BASE: &str = "http://patients";

    async fn service() -> (PatientService, Arc<MockTransport>) {
        let session = SessionStore::open(Arc::new(MemoryStorage::new())).await.unwrap();
        session.establish(patient_user(7, true), "tok").await.unwrap();
        let mock = Arc::new(MockTransport::new());
        let client = ApiClient::new(mock.clone(), session);
        (PatientService::new(client, BASE, test_cache("patients")), mock)
    }

    #[tokio::test]
    async fn should_answer_appointment_lookup_from_listing() {
        let (service, mock) = service().await;
        mock.respond(
            Method::GET,
            "http://patients/7/patient/appointments",
            200,
            json!({"success": true, "data": [appointment_json("3", "2030-01-01", "10:00", "CONFIRMED")]}),
        );
        service.appointments(Some("CONFIRMED"), Some(10), None).await.unwrap();
        let sent = mock.last_request().unwrap();
        assert_eq!(sent.query_param("limit"), Some("10"));
        assert_eq!(sent.query_param("offset"), None);

        let hit = service.appointment("3").await.unwrap();
        assert_eq!(hit.id, "3");
        assert_eq!(mock.requests().len(), 1);
    }

    #[tokio::test]
    async fn should_not_serve_previous_users_appointment_after_switch() {
        let session = SessionStore::open(Arc::new(MemoryStorage::new())).await.unwrap();
        session.establish(patient_user(7, true), "tok-7").await.unwrap();
        let mock = Arc::new(MockTransport::new());
        let service = PatientService::new(ApiClient::new(mock.clone(), session.clone()), BASE, test_cache("patients"));
        mock.respond(
            Method::GET,
            "http://patients/7/patient/appointments",
            200,
            json!({"success": true, "data": [appointment_json("42", "2030-01-01", "10:00", "CONFIRMED")]}),
        );
        service.appointments(None, None, None).await.unwrap();

        session.clear().await;
        session.establish(patient_user(8, true), "tok-8").await.unwrap();
        let foreign = "http://patients/8/patient/appointments/42";
        mock.respond(Method::GET, foreign, 403, json!({"message": "Forbidden"}));

        let err = service.appointment("42").await.unwrap_err();
        assert!(matches!(err, models::PortalError::Unauthorized(_)));
        let sent = mock.requests_to(Method::GET, foreign);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].header("Authorization"), Some("Bearer tok-8"));
    }

    #[tokio::test]
    async fn should_drop_cache_after_cancel() {
        let (service, mock) = service().await;
        let list = "http://patients/service/7/patient/doctors/get-all";
        mock.respond(Method::GET, list, 200, json!({"success": true, "data": [{"id": 1, "firstName": "Sipho"}]}));
        mock.respond(Method::PUT, "http://patients/7/patient/appointments/3/cancel", 200, json!({"ok": true}));

        service.all_doctors().await.unwrap();
        service.all_doctors().await.unwrap();
        service.cancel_appointment("3", Some("Feeling better".into())).await.unwrap();
        assert_eq!(mock.last_request().unwrap().body, Some(json!({"reason": "Feeling better"})));
        service.all_doctors().await.unwrap();
        assert_eq!(mock.requests_to(Method::GET, list).len(), 2);
    }

    #[tokio::test]
    async fn should_pick_earliest_future_appointment() {
        let (service, mock) = service().await;
        mock.respond(
            Method::GET,
            "http://patients/7/patient/appointments/upcoming",
            200,
            json!([
                appointment_json("a", "2030-05-02", "09:00", "SCHEDULED"),
                appointment_json("b", "2030-05-01", "15:00", "SCHEDULED"),
                appointment_json("c", "2020-01-01", "09:00", "SCHEDULED")
            ]),
        );
        let now = NaiveDate::from_ymd_opt(2030, 4, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let next = service.next_appointment(now).await.unwrap().unwrap();
        assert_eq!(next.id, "b");
    }

    #[tokio::test]
    async fn should_send_search_filters_without_blanks() {
        let (service, mock) = service().await;
        mock.respond(Method::GET, "http://patients/7/patient/doctors/search", 200, json!([]));
        let filters = DoctorSearchFilters { name: "Naidoo".into(), specialty: String::new(), practice_name: "Sunrise".into() };
        service.search_doctors(&filters).await.unwrap();
        let sent = mock.last_request().unwrap();
        assert_eq!(sent.query_param("name"), Some("Naidoo"));
        assert_eq!(sent.query_param("specialty"), None);
        assert_eq!(sent.query_param("practiceName"), Some("Sunrise"));
    }
}
