// models/src/medical/user.rs
use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::errors::ValidationError;

/// Portal role. The backend is inconsistent about casing, so parsing ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    Patient,
    Doctor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Doctor => "doctor",
            Role::Admin => "admin",
        }
    }

    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Role::Patient => "/patient/patient-dashboard",
            Role::Doctor => "/doctor/doctor-dashboard",
            Role::Admin => "/admin/admin-dashboard",
        }
    }

    /// Admins have no profile wizard.
    pub fn profile_setup_path(&self) -> Option<&'static str> {
        match self {
            Role::Patient => Some("/patient/patient-profile-setup"),
            Role::Doctor => Some("/doctor/doctor-profile-setup"),
            Role::Admin => None,
        }
    }

    pub fn matches(&self, raw: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(raw.trim())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "patient" => Ok(Role::Patient),
            "doctor" => Ok(Role::Doctor),
            "admin" => Ok(Role::Admin),
            other => Err(ValidationError::field("role", format!("unknown role '{}'", other))),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub id_number: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub profile_completed: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl User {
    pub fn display_name(&self) -> &str {
        self.username.as_deref().filter(|u| !u.is_empty()).unwrap_or(&self.email)
    }
}

/// Authenticated identity plus bearer token, as held by the session store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub token: String,
}

impl Session {
    pub fn new(user: User, token: impl Into<String>) -> Self {
        Session { user, token: token.into() }
    }

    pub fn user_id(&self) -> i64 {
        self.user.id
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn profile_completed(&self) -> bool {
        self.user.profile_completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_role_case_insensitively() {
        assert_eq!("PATIENT".parse::<Role>().unwrap(), Role::Patient);
        assert_eq!(" Doctor ".parse::<Role>().unwrap(), Role::Doctor);
        assert!("nurse".parse::<Role>().is_err());
        assert!(Role::Admin.matches("ADMIN"));
    }

    #[test]
    fn should_deserialize_user_with_defaults() {
        let user: User = serde_json::from_str(
            r#"{"id": 7, "email": "thandi@example.co.za", "role": "PATIENT", "profileCompleted": true}"#,
        )
        .unwrap();
        assert_eq!(user.role, Role::Patient);
        assert!(user.profile_completed);
        assert!(user.is_active);
        assert_eq!(user.display_name(), "thandi@example.co.za");
        let back = serde_json::to_value(&user).unwrap();
        assert_eq!(back["role"], "patient");
    }

    #[test]
    fn should_route_roles_to_their_own_dashboard() {
        assert_eq!(Role::Patient.dashboard_path(), "/patient/patient-dashboard");
        assert_eq!(Role::Doctor.profile_setup_path(), Some("/doctor/doctor-profile-setup"));
        assert_eq!(Role::Admin.profile_setup_path(), None);
    }
}
