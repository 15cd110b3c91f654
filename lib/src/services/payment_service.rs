// lib/src/services/payment_service.rs
use caching::Cache;
use models::{Payment, PaymentRequest, PortalResult};
use serde_json::Value;
use crate::http::ApiClient;
use super::remember;

const SERVICE: &str = "Payment";

pub struct PaymentService {
    client: ApiClient,
    base_url: String,
    cache: Cache,
}

impl PaymentService {
    pub fn new(client: ApiClient, base_url: impl Into<String>, cache: Cache) -> Self {
        PaymentService { client, base_url: base_url.into(), cache }
    }

    fn root(&self) -> PortalResult<String> {
        let uid = self.client.require_user_id()?;
        Ok(format!("{}/{}/payments", self.base_url, uid))
    }

    pub async fn initiate(&self, request: &PaymentRequest) -> PortalResult<Value> {
        let url = format!("{}/initiate", self.root()?);
        let result = self.client.post(SERVICE, &url, request).await?;
        self.cache.invalidate_all();
        Ok(result)
    }

    pub async fn get(&self, payment_id: &str) -> PortalResult<Payment> {
        let url = format!("{}/{}", self.root()?, payment_id);
        self.client.get(SERVICE, &url, Vec::new()).await
    }

    pub async fn list(&self) -> PortalResult<Vec<Payment>> {
        let url = self.root()?;
        if let Some(hit) = self.cache.get_as::<Vec<Payment>>(&url).await {
            return Ok(hit);
        }
        let payments: Vec<Payment> = self.client.get(SERVICE, &url, Vec::new()).await?;
        remember(&self.cache, url, &payments).await;
        Ok(payments)
    }

    pub async fn status(&self, payment_id: &str) -> PortalResult<Value> {
        let url = format!("{}/{}/status", self.root()?, payment_id);
        self.client.get(SERVICE, &url, Vec::new()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use models::PaymentStatus;
    use reqwest::Method;
    use serde_json::json;
    use crate::session::SessionStore;
    use crate::storage::MemoryStorage;
    use crate::testing::{patient_user, test_cache, MockTransport};

    #[tokio::test]
    async fn should_invalidate_payment_list_after_initiate() {
        let session = SessionStore::open(Arc::new(MemoryStorage::new())).await.unwrap();
        session.establish(patient_user(7, true), "tok").await.unwrap();
        let mock = Arc::new(MockTransport::new());
        let service = PaymentService::new(ApiClient::new(mock.clone(), session), "http://pay", test_cache("payments"));

        mock.respond(
            Method::GET,
            "http://pay/7/payments",
            200,
            json!([{"id": 1, "appointmentId": 3, "amount": 450.0, "status": "PENDING"}]),
        );
        mock.respond(Method::POST, "http://pay/7/payments/initiate", 200, json!({"redirectUrl": "https://pay.example"}));

        let payments = service.list().await.unwrap();
        assert_eq!(payments[0].status, PaymentStatus::Pending);

        let request = PaymentRequest { appointment_id: "3".into(), amount: 450.0, payment_method: "card".into() };
        service.initiate(&request).await.unwrap();
        service.list().await.unwrap();
        assert_eq!(mock.requests_to(Method::GET, "http://pay/7/payments").len(), 2);
    }
}
