// lib/src/services/auth_service.rs
use std::sync::Arc;
use caching::Cache;
use log::{debug, info, warn};
use logging_service::{AuditEvent, AuditKind, LogServiceTrait};
use models::{AuthResponse, LoginRequest, PortalError, PortalResult, RegisterRequest, Role, Session, User};
use once_cell::sync::Lazy;
use schema::{Constraint, EnforcementLevel, FieldError, FieldRule, RuleSet};
use crate::http::ApiClient;
use crate::session::SessionStore;
use super::validation_failure;

const SERVICE: &str = "Auth";
pub const REGISTRATION_CONFIRMATION: &str = "Account created successfully! You can now sign in.";

static LOGIN_RULES: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::new("login")
        .rule(FieldRule::new("username").required())
        .rule(FieldRule::new("password").required())
});

static REGISTER_RULES: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::new("register")
        .rule(FieldRule::new("username").required().min_length(3))
        .rule(FieldRule::new("email").required().email())
        .rule(FieldRule::new("password").required().min_length(6))
        .rule(FieldRule::new("confirmPassword").label("Confirm password").required())
        .rule(
            FieldRule::new("userType")
                .with(Constraint::Enum(vec!["patient".to_string(), "doctor".to_string()]))
                .message("Please choose a patient or doctor account"),
        )
});

#[derive(Debug, Clone, PartialEq)]
pub struct LoginOutcome {
    pub session: Session,
    /// Where the user should land next.
    pub landing_route: String,
    pub message: Option<String>,
}

/// `redirectTo` from the backend wins; otherwise an unfinished profile goes
/// to its setup wizard and a finished one to the role dashboard.
pub fn landing_route(user: &User, redirect_to: Option<&str>) -> String {
    if let Some(target) = redirect_to.map(|t| t.trim().trim_start_matches('/')).filter(|t| !t.is_empty()) {
        return format!("/{}/{}", user.role.as_str(), target);
    }
    if !user.profile_completed {
        if let Some(setup) = user.role.profile_setup_path() {
            return setup.to_string();
        }
    }
    user.role.dashboard_path().to_string()
}

pub struct AuthService {
    client: ApiClient,
    base_url: String,
    audit: Arc<dyn LogServiceTrait>,
    user_caches: Vec<Cache>,
}

impl AuthService {
    pub fn new(client: ApiClient, base_url: impl Into<String>, audit: Arc<dyn LogServiceTrait>) -> Self {
        AuthService { client, base_url: base_url.into(), audit, user_caches: Vec::new() }
    }

    /// Caches holding data fetched on behalf of the signed-in user.
    /// They are emptied whenever a user signs in or out.
    pub fn with_user_caches(mut self, caches: Vec<Cache>) -> Self {
        self.user_caches = caches;
        self
    }

    fn forget_user_data(&self) {
        for cache in &self.user_caches {
            debug!("Dropping {} cache", cache.domain());
            cache.invalidate_all();
        }
    }

    fn session(&self) -> &SessionStore {
        self.client.session()
    }

    async fn audit(&self, kind: AuditKind, actor: Option<String>, detail: String) {
        if let Err(e) = self.audit.record(AuditEvent::new(kind, actor, detail)).await {
            warn!("Failed to record {} audit event: {}", kind, e);
        }
    }

    pub async fn login(&self, credentials: &LoginRequest) -> PortalResult<LoginOutcome> {
        let report = LOGIN_RULES.validate(&serde_json::to_value(credentials)?);
        if !report.is_valid() {
            return Err(validation_failure(&report));
        }

        let url = format!("{}/login", self.base_url);
        let response: AuthResponse = match self.client.post(SERVICE, &url, credentials).await {
            Ok(response) => response,
            Err(e) => {
                self.audit(AuditKind::LoginFailed, Some(credentials.username.clone()), e.to_string()).await;
                return Err(e);
            }
        };

        match response {
            AuthResponse { success: true, user: Some(user), token: Some(token), redirect_to, message } => {
                let landing = landing_route(&user, redirect_to.as_deref());
                self.forget_user_data();
                let session = self.session().establish(user, token).await?;
                info!("User {} signed in, landing on {}", session.user_id(), landing);
                self.audit(AuditKind::Login, Some(session.user_id().to_string()), landing.clone()).await;
                Ok(LoginOutcome { session, landing_route: landing, message })
            }
            AuthResponse { message, .. } => {
                let message = message.filter(|m| !m.trim().is_empty()).unwrap_or_else(|| "Login failed".to_string());
                self.audit(AuditKind::LoginFailed, Some(credentials.username.clone()), message.clone()).await;
                Err(PortalError::Rejected(message))
            }
        }
    }

    /// Returns the confirmation message to show before sending the user to `/login`.
    pub async fn register(&self, request: &RegisterRequest) -> PortalResult<String> {
        let mut report = REGISTER_RULES.validate(&serde_json::to_value(request)?);
        if report.message_for("confirmPassword").is_none() && request.confirm_password != request.password {
            report.errors.push(FieldError {
                path: "confirmPassword".to_string(),
                message: "Passwords do not match".to_string(),
                enforcement_level: EnforcementLevel::Inline,
            });
        }
        if !report.is_valid() {
            return Err(validation_failure(&report));
        }

        let url = format!("{}/register", self.base_url);
        let response: AuthResponse = self.client.post(SERVICE, &url, request).await?;
        if !response.success {
            let message = response
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| "Registration failed".to_string());
            return Err(PortalError::Rejected(message));
        }
        self.audit(AuditKind::Registration, Some(request.username.clone()), request.user_type.to_string()).await;
        Ok(REGISTRATION_CONFIRMATION.to_string())
    }

    pub async fn logout(&self) {
        let actor = self.session().current_user_id().map(|id| id.to_string());
        self.session().clear().await;
        self.forget_user_data();
        self.audit(AuditKind::Logout, actor, "signed out".to_string()).await;
    }

    pub fn role(&self) -> Option<Role> {
        self.session().role()
    }
}
