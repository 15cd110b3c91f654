// lib/src/services/prescription_service.rs
use caching::Cache;
use models::{PortalResult, Prescription};
use crate::http::ApiClient;
use super::remember;

const SERVICE: &str = "Prescription";

pub struct PrescriptionService {
    client: ApiClient,
    base_url: String,
    cache: Cache,
}

impl PrescriptionService {
    pub fn new(client: ApiClient, base_url: impl Into<String>, cache: Cache) -> Self {
        PrescriptionService { client, base_url: base_url.into(), cache }
    }

    fn root(&self) -> PortalResult<String> {
        let uid = self.client.require_user_id()?;
        Ok(format!("{}/{}/prescriptions", self.base_url, uid))
    }

    pub async fn list(&self) -> PortalResult<Vec<Prescription>> {
        let url = self.root()?;
        if let Some(hit) = self.cache.get_as::<Vec<Prescription>>(&url).await {
            return Ok(hit);
        }
        let prescriptions: Vec<Prescription> = self.client.get(SERVICE, &url, Vec::new()).await?;
        remember(&self.cache, url, &prescriptions).await;
        Ok(prescriptions)
    }

    pub async fn get(&self, prescription_id: &str) -> PortalResult<Prescription> {
        let url = format!("{}/{}", self.root()?, prescription_id);
        self.client.get(SERVICE, &url, Vec::new()).await
    }

    pub async fn active(&self) -> PortalResult<Vec<Prescription>> {
        let url = format!("{}/active", self.root()?);
        self.client.get(SERVICE, &url, Vec::new()).await
    }

    pub async fn by_appointment(&self, appointment_id: &str) -> PortalResult<Vec<Prescription>> {
        let url = format!("{}/appointment/{}", self.root()?, appointment_id);
        self.client.get(SERVICE, &url, Vec::new()).await
    }

    /// Raw document bytes, typically a PDF.
    pub async fn download(&self, prescription_id: &str) -> PortalResult<Vec<u8>> {
        let url = format!("{}/{}/download", self.root()?, prescription_id);
        self.client.get_bytes(SERVICE, &url).await
    }

    pub fn clear_cache(&self) {
        self.cache.invalidate_all();
    }
}
