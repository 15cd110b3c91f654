// lib/src/services/doctor_service.rs
use caching::Cache;
use chrono::NaiveDate;
use log::debug;
use models::util::DATE_FORMAT;
use models::{ApiEnvelope, Appointment, Doctor, PortalResult};
use serde_json::{json, Value};
use crate::http::ApiClient;
use super::{remember, user_cache_key};

const SERVICE: &str = "Doctor";

pub struct DoctorService {
    client: ApiClient,
    base_url: String,
    cache: Cache,
}

impl DoctorService {
    pub fn new(client: ApiClient, base_url: impl Into<String>, cache: Cache) -> Self {
        DoctorService { client, base_url: base_url.into(), cache }
    }

    fn doctor_url(&self, doctor_id: &str, tail: &str) -> String {
        format!("{}/{}/doctor/{}", self.base_url, doctor_id, tail)
    }

    /// Profile of the signed-in doctor.
    pub async fn get_profile(&self) -> PortalResult<Doctor> {
        let uid = self.client.require_user_id()?.to_string();
        let url = self.doctor_url(&uid, "profiles/get-by-id");
        self.client.get_enveloped(SERVICE, &url, Vec::new()).await
    }

    pub async fn get_doctor_profile(&self, doctor_id: &str) -> PortalResult<Doctor> {
        let key = user_cache_key(&self.client, &["doctor", doctor_id]);
        if let Some(hit) = self.cache.get_as::<Doctor>(&key).await {
            debug!("Doctor cache hit for {}", doctor_id);
            return Ok(hit);
        }
        let url = self.doctor_url(doctor_id, "profiles/get-by-id");
        let doctor: Doctor = self.client.get_enveloped(SERVICE, &url, Vec::new()).await?;
        remember(&self.cache, key, &doctor).await;
        Ok(doctor)
    }

    /// Sends the flat profile payload as-is. The backend may or may not echo the saved profile.
    pub async fn update_profile(&self, payload: &Value) -> PortalResult<Option<Doctor>> {
        let uid = self.client.require_user_id()?.to_string();
        let url = self.doctor_url(&uid, "profiles/update");
        let envelope: ApiEnvelope<Doctor> = self.client.put(SERVICE, &url, payload).await?;
        let saved = self.client.accept_envelope(SERVICE, envelope)?;
        self.cache.invalidate_all();
        Ok(saved)
    }

    pub async fn available_slots(&self, doctor_id: &str, date: NaiveDate) -> PortalResult<Vec<String>> {
        let url = self.doctor_url(doctor_id, "appointments/available-slots");
        let query = vec![("date".to_string(), date.format(DATE_FORMAT).to_string())];
        self.client.get_enveloped(SERVICE, &url, query).await
    }

    pub async fn doctor_appointments(&self, doctor_id: &str) -> PortalResult<Vec<Appointment>> {
        let key = user_cache_key(&self.client, &["appointments", doctor_id]);
        if let Some(hit) = self.cache.get_as::<Vec<Appointment>>(&key).await {
            return Ok(hit);
        }
        let url = self.doctor_url(doctor_id, "appointments/get-all");
        let appointments: Vec<Appointment> = self.client.get(SERVICE, &url, Vec::new()).await?;
        remember(&self.cache, key, &appointments).await;
        Ok(appointments)
    }

    pub async fn confirm_appointment(&self, appointment_id: &str) -> PortalResult<Value> {
        let uid = self.client.require_user_id()?.to_string();
        let url = self.doctor_url(&uid, &format!("appointments/{}/confirm", appointment_id));
        let result = self.client.put(SERVICE, &url, &json!({})).await?;
        self.cache.invalidate_all();
        Ok(result)
    }
}
