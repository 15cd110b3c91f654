// lib/src/testing.rs
//! Fixtures shared by the unit tests and by downstream crates built with
//! the `test-suite` feature.

use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use caching::Cache;
use logging_service::{LogService, LogServiceTrait};
use models::{Address, EmergencyContact, PortalError, PortalResult, Role, User};
use reqwest::Method;
use serde_json::{json, Value};
use crate::http::{ApiRequest, ApiResponse, ApiTransport};
use crate::wizard::{DoctorProfileForm, PatientProfileForm, PersonalInfo, WorkingHours};

type Reply = PortalResult<ApiResponse>;

/// Transport that answers from a table keyed by exact method and URL and
/// records every request it sees. Unregistered routes answer 404.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<Vec<(Method, String, Reply)>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        MockTransport::default()
    }

    fn register(&self, method: Method, url: &str, reply: Reply) {
        if let Ok(mut routes) = self.routes.lock() {
            routes.retain(|(m, u, _)| !(*m == method && u == url));
            routes.push((method, url.to_string(), reply));
        }
    }

    /// Later registrations for the same route replace earlier ones.
    pub fn respond(&self, method: Method, url: &str, status: u16, body: Value) {
        self.register(method, url, Ok(ApiResponse::json(status, &body)));
    }

    pub fn respond_raw(&self, method: Method, url: &str, status: u16, body: &[u8]) {
        self.register(method, url, Ok(ApiResponse { status, body: body.to_vec() }));
    }

    pub fn fail(&self, method: Method, url: &str, error: PortalError) {
        self.register(method, url, Err(error));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn last_request(&self) -> Option<ApiRequest> {
        self.requests().pop()
    }

    pub fn requests_to(&self, method: Method, url: &str) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.url == url)
            .collect()
    }

    pub fn clear_requests(&self) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.clear();
        }
    }
}

#[async_trait]
impl ApiTransport for MockTransport {
    async fn send(&self, request: ApiRequest) -> PortalResult<ApiResponse> {
        let reply = self.routes.lock().ok().and_then(|routes| {
            routes
                .iter()
                .find(|(m, u, _)| *m == request.method && *u == request.url)
                .map(|(_, _, reply)| reply.clone())
        });
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        reply.unwrap_or_else(|| {
            Ok(ApiResponse::json(404, &json!({"message": format!("no route for {} {}", request.method, request.url)})))
        })
    }
}

pub fn user(id: i64, role: Role, profile_completed: bool) -> User {
    User {
        id,
        username: Some(format!("{}{}", role, id)),
        email: format!("{}{}@example.co.za", role, id),
        id_number: None,
        role,
        profile_completed,
        is_active: true,
    }
}

pub fn patient_user(id: i64, profile_completed: bool) -> User {
    user(id, Role::Patient, profile_completed)
}

pub fn doctor_user(id: i64, profile_completed: bool) -> User {
    user(id, Role::Doctor, profile_completed)
}

/// Audit trail that writes nothing.
pub fn quiet_audit() -> Arc<dyn LogServiceTrait> {
    Arc::new(LogService::discard(Cache::for_domain("audit", 64, None)))
}

pub fn test_cache(domain: &str) -> Cache {
    Cache::for_domain(domain, 64, None)
}

/// Minimal appointment body as the backend returns it.
pub fn appointment_json(id: &str, date: &str, start: &str, status: &str) -> Value {
    json!({
        "id": id,
        "patientId": 7,
        "doctorId": 11,
        "appointmentDate": date,
        "startTime": start,
        "type": "initial",
        "status": status,
        "reason": "Checkup"
    })
}

/// Doctor form that passes every step.
pub fn complete_doctor_form() -> DoctorProfileForm {
    let mut form = DoctorProfileForm {
        first_name: "Sipho".into(),
        last_name: "Dlamini".into(),
        email: "sipho@example.co.za".into(),
        phone_number: "0821234567".into(),
        date_of_birth: "1980-01-01".into(),
        gender: "Male".into(),
        id_number: "8001015009087".into(),
        medical_license_number: "MP123456".into(),
        hpcsa_number: "HPCSA-998".into(),
        years_of_experience: Some(12),
        practice_name: "Berea Family Practice".into(),
        practice_type: "Private".into(),
        address: Address {
            street: "1 Musgrave Rd".into(),
            city: "Durban".into(),
            province: "KwaZulu-Natal".into(),
            postal_code: "4001".into(),
            ..Address::default()
        },
        agree_to_terms: true,
        agree_to_privacy_policy: true,
        ..DoctorProfileForm::default()
    };
    form.add_specialization("2");
    form.working_hours.push(WorkingHours {
        day_of_week: "Monday".into(),
        start_time: "08:00".into(),
        end_time: "17:00".into(),
        ..WorkingHours::default()
    });
    form
}

/// Patient form that passes every step.
pub fn complete_patient_form() -> PatientProfileForm {
    PatientProfileForm {
        personal_info: PersonalInfo {
            first_name: "Thandi".into(),
            last_name: "Nkosi".into(),
            date_of_birth: "1980-01-01".into(),
            gender: "Female".into(),
            phone_number: "0821234567".into(),
            id_number: "8001014009088".into(),
            address: Address {
                street: "1 Main Rd".into(),
                suburb: "Berea".into(),
                city: "Durban".into(),
                province: "KwaZulu-Natal".into(),
                postal_code: "4001".into(),
                ..Address::default()
            },
            ..PersonalInfo::default()
        },
        emergency_contacts: vec![EmergencyContact {
            name: "Sizwe Nkosi".into(),
            relationship: "Sibling".into(),
            phone_number: "+27731234567".into(),
            ..EmergencyContact::default()
        }]
        .into(),
        ..PatientProfileForm::default()
    }
}
