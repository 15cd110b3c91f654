// lib/src/portal.rs
//! Everything a front end needs, built once from `PortalConfig`: the
//! session, one service per resource over a shared transport, the audit
//! trail and the navigator.

use std::sync::Arc;
use std::time::Duration;
use caching::Cache;
use log::info;
use logging_service::{LogService, LogServiceTrait};
use models::{PortalError, PortalResult};
use crate::config::PortalConfig;
use crate::guard::Navigator;
use crate::http::{ApiClient, ApiTransport, ReqwestTransport};
use crate::services::{
    AppointmentService, AuthService, ChatbotService, DoctorService, NotificationService, PatientService,
    PaymentService, PrescriptionService,
};
use crate::session::SessionStore;
use crate::storage::{DurableStorage, SledStorage};
use crate::views::{
    ChatModal, DoctorDashboard, DoctorProfileSetup, FindDoctor, PatientAppointments, PatientDashboard,
    PatientProfileSetup,
};

pub struct Portal {
    pub config: PortalConfig,
    pub session: SessionStore,
    pub storage: Arc<dyn DurableStorage>,
    pub audit: Arc<dyn LogServiceTrait>,
    pub navigator: Navigator,
    pub auth: Arc<AuthService>,
    pub appointments: Arc<AppointmentService>,
    pub doctors: Arc<DoctorService>,
    pub patients: Arc<PatientService>,
    pub prescriptions: Arc<PrescriptionService>,
    pub notifications: Arc<NotificationService>,
    pub chatbot: Arc<ChatbotService>,
    pub payments: Arc<PaymentService>,
}

impl Portal {
    /// Restores any persisted session from `storage` before wiring the services.
    pub async fn new(
        storage: Arc<dyn DurableStorage>,
        transport: Arc<dyn ApiTransport>,
        audit: Arc<dyn LogServiceTrait>,
        config: PortalConfig,
    ) -> PortalResult<Self> {
        let session = SessionStore::open(storage.clone()).await?;
        let client = ApiClient::new(transport, session.clone());
        let ttl = config.cache.ttl_secs.map(Duration::from_secs);
        let capacity = config.cache.capacity;
        let cache = |domain: &str| Cache::for_domain(domain, capacity, ttl);
        let api = config.api.clone();
        let caches = ["appointments", "doctors", "patients", "prescriptions", "payments"].map(cache);
        let [appointments, doctors, patients, prescriptions, payments] = caches.clone();
        let auth = AuthService::new(client.clone(), api.auth.as_str(), audit.clone()).with_user_caches(caches.to_vec());

        let portal = Portal {
            navigator: Navigator::new(session.clone(), audit.clone()),
            auth: Arc::new(auth),
            appointments: Arc::new(AppointmentService::new(client.clone(), api.appointments.as_str(), appointments)),
            doctors: Arc::new(DoctorService::new(client.clone(), api.doctors.as_str(), doctors)),
            patients: Arc::new(PatientService::new(client.clone(), api.patients.as_str(), patients)),
            prescriptions: Arc::new(PrescriptionService::new(client.clone(), api.prescriptions.as_str(), prescriptions)),
            notifications: Arc::new(NotificationService::new(client.clone(), api.notifications.as_str())),
            chatbot: Arc::new(ChatbotService::new(client.clone(), api.chatbot.as_str())),
            payments: Arc::new(PaymentService::new(client, api.payments.as_str(), payments)),
            session,
            storage,
            audit,
            config,
        };
        info!("Portal ready; signed in: {}", portal.session.is_logged_in());
        Ok(portal)
    }

    /// Sled storage at `storage.path`, reqwest transport, terminal audit trail.
    pub async fn from_config(config: PortalConfig) -> PortalResult<Self> {
        let storage = Arc::new(SledStorage::open(&config.storage.path)?);
        let timeout = config.http.timeout_secs.map(Duration::from_secs);
        let transport = Arc::new(ReqwestTransport::new(timeout)?);
        let audit_cache = Cache::for_domain("audit", config.cache.capacity, None);
        let audit = LogService::new(audit_cache).map_err(|e| PortalError::ConfigurationError(e.to_string()))?;
        Portal::new(storage, transport, Arc::new(audit), config).await
    }

    pub fn patient_dashboard(&self) -> PatientDashboard {
        PatientDashboard::new(self.session.clone(), self.appointments.clone(), self.chatbot.clone())
    }

    pub fn doctor_dashboard(&self) -> DoctorDashboard {
        DoctorDashboard::new(self.session.clone(), self.doctors.clone())
    }

    pub fn patient_appointments(&self) -> PatientAppointments {
        PatientAppointments::new(self.appointments.clone())
    }

    pub fn find_doctor(&self) -> FindDoctor {
        FindDoctor::new(self.session.clone(), self.patients.clone())
    }

    pub fn chat(&self) -> ChatModal {
        ChatModal::new(self.chatbot.clone())
    }

    pub fn patient_profile_setup(&self) -> PatientProfileSetup {
        PatientProfileSetup::new(self.session.clone(), self.patients.clone(), self.storage.clone(), self.audit.clone())
    }

    pub fn doctor_profile_setup(&self) -> DoctorProfileSetup {
        DoctorProfileSetup::new(self.session.clone(), self.doctors.clone(), self.audit.clone())
    }
}
