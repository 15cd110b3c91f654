// lib/src/views/profile_setup.rs
//! Profile setup screens for both roles. Each wraps a `Wizard` and sends
//! the finished form in exactly one update call.

use std::sync::Arc;
use log::{info, warn};
use logging_service::{AuditEvent, AuditKind, LogServiceTrait};
use models::{PortalResult, Role};
use crate::services::{DoctorService, PatientService};
use crate::session::SessionStore;
use crate::storage::DurableStorage;
use crate::wizard::{DoctorProfileForm, PatientProfileForm, Wizard, WizardError};

async fn complete_profile(session: &SessionStore, audit: &dyn LogServiceTrait, role: Role) -> PortalResult<String> {
    session.set_profile_completed(true).await?;
    let actor = session.current_user_id().map(|id| id.to_string());
    let event = AuditEvent::new(AuditKind::ProfileSubmitted, actor, format!("{} profile completed", role));
    if let Err(e) = audit.record(event).await {
        warn!("Failed to record profile submission: {}", e);
    }
    Ok(role.dashboard_path().to_string())
}

pub struct PatientProfileSetup {
    session: SessionStore,
    patients: Arc<PatientService>,
    storage: Arc<dyn DurableStorage>,
    audit: Arc<dyn LogServiceTrait>,
    wizard: Wizard<PatientProfileForm>,
}

impl PatientProfileSetup {
    pub fn new(
        session: SessionStore,
        patients: Arc<PatientService>,
        storage: Arc<dyn DurableStorage>,
        audit: Arc<dyn LogServiceTrait>,
    ) -> Self {
        PatientProfileSetup {
            session,
            patients,
            storage,
            audit,
            wizard: Wizard::new(PatientProfileForm::default()),
        }
    }

    /// A saved draft wins; otherwise a completed profile is loaded for editing.
    pub async fn init(&mut self) -> PortalResult<()> {
        if let Some(draft) = PatientProfileForm::load_draft(&*self.storage).await? {
            info!("Restored patient profile draft");
            self.wizard = Wizard::new(draft);
            return Ok(());
        }
        if !self.session.has_completed_profile() {
            return Ok(());
        }
        match self.patients.get_profile().await {
            Ok(profile) => self.wizard = Wizard::new(PatientProfileForm::from_profile(&profile)),
            Err(e) => warn!("Could not load existing patient profile: {}", e),
        }
        Ok(())
    }

    pub fn wizard(&self) -> &Wizard<PatientProfileForm> {
        &self.wizard
    }

    pub fn wizard_mut(&mut self) -> &mut Wizard<PatientProfileForm> {
        &mut self.wizard
    }

    pub async fn save_draft(&self) -> PortalResult<()> {
        self.wizard.form().save_draft(&*self.storage).await
    }

    /// Returns the route to go to after a successful save.
    pub async fn submit(&mut self) -> Result<String, WizardError> {
        let payload = self.wizard.prepare_submission()?;
        if let Err(e) = self.patients.update_profile(&payload).await {
            self.wizard.submission_failed(&e);
            return Err(e.into());
        }
        self.wizard.submission_succeeded();
        if let Err(e) = PatientProfileForm::discard_draft(&*self.storage).await {
            warn!("Failed to discard patient profile draft: {}", e);
        }
        Ok(complete_profile(&self.session, &*self.audit, Role::Patient).await?)
    }
}

pub struct DoctorProfileSetup {
    session: SessionStore,
    doctors: Arc<DoctorService>,
    audit: Arc<dyn LogServiceTrait>,
    wizard: Wizard<DoctorProfileForm>,
}

impl DoctorProfileSetup {
    pub fn new(session: SessionStore, doctors: Arc<DoctorService>, audit: Arc<dyn LogServiceTrait>) -> Self {
        DoctorProfileSetup {
            session,
            doctors,
            audit,
            wizard: Wizard::new(DoctorProfileForm::default()),
        }
    }

    pub async fn init(&mut self) -> PortalResult<()> {
        let prefill = self
            .session
            .current_user()
            .map_or(false, |user| DoctorProfileForm::should_prefill(&user));
        if !prefill {
            return Ok(());
        }
        match self.doctors.get_profile().await {
            Ok(doctor) => self.wizard = Wizard::new(DoctorProfileForm::from_doctor(&doctor)),
            Err(e) => warn!("Could not load existing doctor profile: {}", e),
        }
        Ok(())
    }

    pub fn wizard(&self) -> &Wizard<DoctorProfileForm> {
        &self.wizard
    }

    pub fn wizard_mut(&mut self) -> &mut Wizard<DoctorProfileForm> {
        &mut self.wizard
    }

    pub async fn submit(&mut self) -> Result<String, WizardError> {
        let payload = self.wizard.prepare_submission()?;
        if let Err(e) = self.doctors.update_profile(&payload).await {
            self.wizard.submission_failed(&e);
            return Err(e.into());
        }
        self.wizard.submission_succeeded();
        Ok(complete_profile(&self.session, &*self.audit, Role::Doctor).await?)
    }
}
