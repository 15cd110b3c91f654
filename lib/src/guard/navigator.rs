// lib/src/guard/navigator.rs
use std::sync::Arc;
use log::{debug, warn};
use logging_service::{AuditEvent, AuditKind, LogServiceTrait};
use models::Role;
use crate::session::SessionStore;
use super::route_guard::{GuardDecision, RouteGuard};

const MAX_REDIRECTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    PatientDashboard,
    PatientViewProfile,
    PatientProfileSetup,
    PatientAppointments,
    MedicalRecords,
    Prescriptions,
    AiAgent,
    FindDoctor,
    DoctorProfileSetup,
    DoctorDashboard,
    DoctorProfile { doctor_id: String },
    AdminDashboard,
}

impl Route {
    pub fn expected_role(&self) -> Option<Role> {
        match self {
            Route::Login | Route::Register => None,
            Route::DoctorProfileSetup | Route::DoctorDashboard | Route::DoctorProfile { .. } => Some(Role::Doctor),
            Route::AdminDashboard => Some(Role::Admin),
            _ => Some(Role::Patient),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::PatientDashboard => "/patient/patient-dashboard".to_string(),
            Route::PatientViewProfile => "/patient/patient-view-profile".to_string(),
            Route::PatientProfileSetup => "/patient/patient-profile-setup".to_string(),
            Route::PatientAppointments => "/patient/appointments".to_string(),
            Route::MedicalRecords => "/patient/medical-records".to_string(),
            Route::Prescriptions => "/patient/prescriptions".to_string(),
            Route::AiAgent => "/patient/ai-agent".to_string(),
            Route::FindDoctor => "/patient/find-doctor".to_string(),
            Route::DoctorProfileSetup => "/doctor/doctor-profile-setup".to_string(),
            Route::DoctorDashboard => "/doctor/doctor-dashboard".to_string(),
            Route::DoctorProfile { doctor_id } => format!("/doctor/{}/profile", doctor_id),
            Route::AdminDashboard => "/admin/admin-dashboard".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Rendered(Route),
    Redirected(String),
}

enum Resolution {
    Route(Route),
    Redirect(&'static str),
}

fn strip_query(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url)
}

fn resolve(path: &str) -> Resolution {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        [] => Resolution::Redirect("/login"),
        ["login"] => Resolution::Route(Route::Login),
        ["register"] => Resolution::Route(Route::Register),
        ["patient"] => Resolution::Redirect("/patient/patient-dashboard"),
        ["patient", "patient-dashboard"] => Resolution::Route(Route::PatientDashboard),
        ["patient", "patient-view-profile"] => Resolution::Route(Route::PatientViewProfile),
        ["patient", "patient-profile-setup"] => Resolution::Route(Route::PatientProfileSetup),
        ["patient", "appointments"] => Resolution::Route(Route::PatientAppointments),
        ["patient", "medical-records"] => Resolution::Route(Route::MedicalRecords),
        ["patient", "prescriptions"] => Resolution::Route(Route::Prescriptions),
        ["patient", "ai-agent"] => Resolution::Route(Route::AiAgent),
        ["patient", "find-doctor"] => Resolution::Route(Route::FindDoctor),
        ["doctor"] => Resolution::Redirect("/doctor/doctor-dashboard"),
        ["doctor", "doctor-profile-setup"] => Resolution::Route(Route::DoctorProfileSetup),
        ["doctor", "doctor-dashboard"] => Resolution::Route(Route::DoctorDashboard),
        ["doctor", id, "profile"] => Resolution::Route(Route::DoctorProfile { doctor_id: id.to_string() }),
        ["admin"] => Resolution::Redirect("/admin/admin-dashboard"),
        ["admin", "admin-dashboard"] => Resolution::Route(Route::AdminDashboard),
        _ => Resolution::Redirect("/login"),
    }
}

/// Resolves URLs against the route tree and runs the guard on every
/// role-scoped route. Denials are recorded on the audit trail.
pub struct Navigator {
    guard: RouteGuard,
    session: SessionStore,
    audit: Arc<dyn LogServiceTrait>,
}

impl Navigator {
    pub fn new(session: SessionStore, audit: Arc<dyn LogServiceTrait>) -> Self {
        Navigator { guard: RouteGuard::new(session.clone()), session, audit }
    }

    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    pub async fn navigate(&self, url: &str) -> Navigation {
        let mut target = url.to_string();
        let mut redirected = false;
        let mut route = None;
        for _ in 0..MAX_REDIRECTS {
            match resolve(strip_query(&target)) {
                Resolution::Route(found) => {
                    route = Some(found);
                    break;
                }
                Resolution::Redirect(next) => {
                    target = next.to_string();
                    redirected = true;
                }
            }
        }
        let Some(route) = route else {
            return Navigation::Redirected("/login".to_string());
        };

        if let Some(role) = route.expected_role() {
            let decision = self.guard.can_activate_for(&target, role);
            if let Some(location) = decision.location() {
                self.record_denial(&target, &decision).await;
                return Navigation::Redirected(location);
            }
        }

        debug!("Navigating to {}", route.path());
        if redirected {
            Navigation::Redirected(target)
        } else {
            Navigation::Rendered(route)
        }
    }

    async fn record_denial(&self, target: &str, decision: &GuardDecision) {
        let actor = self.session.current_user_id().map(|id| id.to_string());
        let detail = format!("{} -> {:?}", target, decision);
        if let Err(e) = self.audit.record(AuditEvent::new(AuditKind::GuardDenied, actor, detail)).await {
            warn!("Failed to record guard denial: {}", e);
        }
    }
}
