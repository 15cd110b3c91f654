// lib/src/services/appointment_service.rs
use caching::Cache;
use chrono::NaiveDate;
use log::debug;
use models::util::DATE_FORMAT;
use models::{Appointment, BookingRequest, CancelRequest, PortalResult, RescheduleRequest, TimeSlot};
use crate::http::ApiClient;
use super::{cache_key, remember};

const SERVICE: &str = "Appointment";

pub struct AppointmentService {
    client: ApiClient,
    base_url: String,
    cache: Cache,
}

impl AppointmentService {
    pub fn new(client: ApiClient, base_url: impl Into<String>, cache: Cache) -> Self {
        AppointmentService { client, base_url: base_url.into(), cache }
    }

    fn root(&self) -> PortalResult<String> {
        let uid = self.client.require_user_id()?;
        Ok(format!("{}/{}/appointments", self.base_url, uid))
    }

    pub async fn book(&self, booking: &BookingRequest) -> PortalResult<Appointment> {
        let url = format!("{}/book", self.root()?);
        let booked = self.client.post(SERVICE, &url, booking).await?;
        self.cache.invalidate_all();
        Ok(booked)
    }

    pub async fn get(&self, appointment_id: &str) -> PortalResult<Appointment> {
        let url = format!("{}/{}", self.root()?, appointment_id);
        self.client.get(SERVICE, &url, Vec::new()).await
    }

    pub async fn list(&self, status: Option<&str>) -> PortalResult<Vec<Appointment>> {
        let url = self.root()?;
        let status = status.map(str::trim).filter(|s| !s.is_empty());
        let key = cache_key(&[&url, status.unwrap_or("*")]);
        if let Some(hit) = self.cache.get_as::<Vec<Appointment>>(&key).await {
            debug!("Appointment cache hit for {}", key);
            return Ok(hit);
        }

        let query = status.map(|s| vec![("status".to_string(), s.to_string())]).unwrap_or_default();
        let appointments: Vec<Appointment> = self.client.get(SERVICE, &url, query).await?;
        remember(&self.cache, key, &appointments).await;
        Ok(appointments)
    }

    pub async fn upcoming(&self) -> PortalResult<Vec<Appointment>> {
        let url = format!("{}/upcoming", self.root()?);
        self.client.get(SERVICE, &url, Vec::new()).await
    }

    pub async fn past(&self) -> PortalResult<Vec<Appointment>> {
        let url = format!("{}/past", self.root()?);
        self.client.get(SERVICE, &url, Vec::new()).await
    }

    pub async fn cancel(&self, appointment_id: &str, reason: Option<String>) -> PortalResult<Appointment> {
        let url = format!("{}/{}/cancel", self.root()?, appointment_id);
        let body = CancelRequest { reason: reason.filter(|r| !r.trim().is_empty()) };
        let cancelled = self.client.put(SERVICE, &url, &body).await?;
        self.cache.invalidate_all();
        Ok(cancelled)
    }

    pub async fn reschedule(&self, appointment_id: &str, date: NaiveDate, start_time: &str) -> PortalResult<Appointment> {
        let url = format!("{}/{}/reschedule", self.root()?, appointment_id);
        let body = RescheduleRequest { appointment_date: date, start_time: start_time.to_string() };
        let moved = self.client.put(SERVICE, &url, &body).await?;
        self.cache.invalidate_all();
        Ok(moved)
    }

    pub async fn available_slots(&self, doctor_id: &str, date: NaiveDate) -> PortalResult<Vec<TimeSlot>> {
        let url = format!("{}/available-slots", self.root()?);
        let query = vec![
            ("doctorId".to_string(), doctor_id.to_string()),
            ("date".to_string(), date.format(DATE_FORMAT).to_string()),
        ];
        self.client.get(SERVICE, &url, query).await
    }

    pub fn clear_cache(&self) {
        self.cache.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use models::{AppointmentStatus, AppointmentType, PortalError};
    use reqwest::Method;
    use serde_json::json;
    use crate::session::SessionStore;
    use crate::storage::MemoryStorage;
    use crate::testing::{appointment_json, patient_user, test_cache, MockTransport};

    const ROOT: &str = "http://appts/7/appointments";

    async fn service(signed_in: bool) -> (AppointmentService, Arc<MockTransport>) {
        let session = SessionStore::open(Arc::new(MemoryStorage::new())).await.unwrap();
        if signed_in {
            session.establish(patient_user(7, true), "tok").await.unwrap();
        }
        let mock = Arc::new(MockTransport::new());
        let client = ApiClient::new(mock.clone(), session);
        (AppointmentService::new(client, "http://appts", test_cache("appointments")), mock)
    }

    #[tokio::test]
    async fn should_refuse_without_session() {
        let (service, mock) = service(false).await;
        assert_eq!(service.upcoming().await.unwrap_err(), PortalError::NotAuthenticated);
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn should_cache_list_until_mutation() {
        let (service, mock) = service(true).await;
        mock.respond(Method::GET, ROOT, 200, json!([appointment_json("1", "2030-01-10", "09:00", "SCHEDULED")]));
        mock.respond(Method::PUT, &format!("{}/1/cancel", ROOT), 200, appointment_json("1", "2030-01-10", "09:00", "CANCELLED"));

        let first = service.list(None).await.unwrap();
        let second = service.list(None).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(mock.requests_to(Method::GET, ROOT).len(), 1);

        let cancelled = service.cancel("1", None).await.unwrap();
        assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
        assert_eq!(mock.last_request().unwrap().body, Some(json!({})));

        service.list(None).await.unwrap();
        assert_eq!(mock.requests_to(Method::GET, ROOT).len(), 2);
    }

    #[tokio::test]
    async fn should_pass_status_and_slot_filters_as_query() {
        let (service, mock) = service(true).await;
        mock.respond(Method::GET, ROOT, 200, json!([]));
        mock.respond(Method::GET, &format!("{}/available-slots", ROOT), 200, json!([{"startTime": "09:00"}]));

        service.list(Some("CONFIRMED")).await.unwrap();
        assert_eq!(mock.last_request().unwrap().query_param("status"), Some("CONFIRMED"));

        let date = NaiveDate::from_ymd_opt(2030, 1, 10).unwrap();
        let slots = service.available_slots("11", date).await.unwrap();
        assert!(slots[0].available);
        let sent = mock.last_request().unwrap();
        assert_eq!(sent.query_param("doctorId"), Some("11"));
        assert_eq!(sent.query_param("date"), Some("2030-01-10"));
    }

    #[tokio::test]
    async fn should_post_booking_and_reschedule_bodies() {
        let (service, mock) = service(true).await;
        mock.respond(Method::POST, &format!("{}/book", ROOT), 200, appointment_json("9", "2030-02-01", "10:00", "CONFIRMED"));
        mock.respond(Method::PUT, &format!("{}/9/reschedule", ROOT), 200, appointment_json("9", "2030-02-03", "11:00", "RESCHEDULED"));

        let booking = BookingRequest {
            doctor_id: "11".into(),
            patient_id: "7".into(),
            appointment_date: NaiveDate::from_ymd_opt(2030, 2, 1).unwrap(),
            start_time: Some("10:00".into()),
            end_time: None,
            reason: "Follow up on results".into(),
            appointment_type: AppointmentType::FollowUp,
            status: AppointmentStatus::Confirmed,
        };
        let booked = service.book(&booking).await.unwrap();
        assert_eq!(booked.id, "9");
        let body = mock.last_request().unwrap().body.unwrap();
        assert_eq!(body["appointmentDate"], "2030-02-01");
        assert_eq!(body["appointmentType"], "follow_up");

        let date = NaiveDate::from_ymd_opt(2030, 2, 3).unwrap();
        service.reschedule("9", date, "11:00").await.unwrap();
        assert_eq!(
            mock.last_request().unwrap().body,
            Some(json!({"appointmentDate": "2030-02-03", "startTime": "11:00"}))
        );
    }
}
