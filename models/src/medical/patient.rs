// models/src/medical/patient.rs
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use super::address::Address;
use super::insurance::InsurancePolicy;
use crate::util::{opt_string_or_number, truthy};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmergencyContact {
    pub name: String,
    pub relationship: String,
    pub phone_number: String,
    pub alternate_phone_number: String,
    pub email: String,
    pub address: String,
    pub is_primary: bool,
    pub can_make_decisions: bool,
}

/// Allergy, chronic condition, medication or surgery entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MedicalItem {
    pub name: String,
    pub description: String,
    pub severity: String,
    pub start_date: String,
    pub end_date: String,
    pub notes: String,
}

impl MedicalItem {
    pub fn named(name: impl Into<String>) -> Self {
        MedicalItem { name: name.into(), ..Default::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VaccinationStatus {
    pub covid19: bool,
    pub flu: bool,
    pub hepatitis_b: bool,
    pub tetanus: bool,
    pub other: String,
}

impl VaccinationStatus {
    /// Parses the free-text summary stored on older profiles, e.g. `"Covid-19, influenza, measles"`.
    pub fn from_summary(summary: &str) -> Self {
        let mut status = VaccinationStatus::default();
        let mut other = Vec::new();
        for entry in summary.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            match entry.to_ascii_lowercase().as_str() {
                "covid-19" | "covid19" | "covid" => status.covid19 = true,
                "flu" | "influenza" => status.flu = true,
                "hepatitis b" | "hepatitisb" | "hep b" | "hepb" => status.hepatitis_b = true,
                "tetanus" => status.tetanus = true,
                _ => other.push(entry.to_string()),
            }
        }
        status.other = other.join(", ");
        status
    }

    pub fn to_summary(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if self.covid19 {
            parts.push("COVID-19");
        }
        if self.flu {
            parts.push("Flu");
        }
        if self.hepatitis_b {
            parts.push("Hepatitis B");
        }
        if self.tetanus {
            parts.push("Tetanus");
        }
        if !self.other.trim().is_empty() {
            parts.push(self.other.trim());
        }
        parts.join(", ")
    }
}

/// Older profiles store the summary string, newer ones the checkbox object.
fn summary_or_status<'de, D>(deserializer: D) -> Result<VaccinationStatus, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(VaccinationStatus::default()),
        Value::String(summary) => Ok(VaccinationStatus::from_summary(&summary)),
        other => serde_json::from_value(other).map_err(de::Error::custom),
    }
}

/// Medical section of a patient profile. Numeric fields stay optional so an
/// untouched form serialises them as `null`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MedicalHistory {
    pub blood_type: String,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub allergies: Vec<MedicalItem>,
    pub chronic_conditions: Vec<MedicalItem>,
    pub current_medications: Vec<MedicalItem>,
    pub previous_surgeries: Vec<MedicalItem>,
    pub family_medical_history: String,
    pub smoking_status: String,
    pub alcohol_consumption: String,
    pub exercise_frequency: String,
    pub dietary_restrictions: String,
    #[serde(deserialize_with = "summary_or_status")]
    pub vaccination_status: VaccinationStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommunicationPreferences {
    pub email_reminders: bool,
    pub sms_reminders: bool,
    pub appointment_confirmations: bool,
    pub test_results: bool,
    pub promotional_emails: bool,
}

impl Default for CommunicationPreferences {
    fn default() -> Self {
        CommunicationPreferences {
            email_reminders: true,
            sms_reminders: true,
            appointment_confirmations: true,
            test_results: true,
            promotional_emails: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrivacySettings {
    pub share_data_with_research: bool,
    pub allow_marketing_communication: bool,
    pub profile_visibility: String,
}

impl Default for PrivacySettings {
    fn default() -> Self {
        PrivacySettings {
            share_data_with_research: false,
            allow_marketing_communication: false,
            profile_visibility: "private".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientPreferences {
    pub preferred_doctor_gender: String,
    pub preferred_language: String,
    pub communication_preferences: CommunicationPreferences,
    pub privacy_settings: PrivacySettings,
}

impl Default for PatientPreferences {
    fn default() -> Self {
        PatientPreferences {
            preferred_doctor_gender: String::new(),
            preferred_language: "English".to_string(),
            communication_preferences: CommunicationPreferences::default(),
            privacy_settings: PrivacySettings::default(),
        }
    }
}

/// Patient profile as the backend returns it. The shape is flatter and looser
/// than the setup form; `insurance` is sometimes a flag, sometimes an object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientProfile {
    #[serde(deserialize_with = "opt_string_or_number")]
    pub id: Option<String>,
    #[serde(deserialize_with = "opt_string_or_number")]
    pub user_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub alternate_phone_number: String,
    pub date_of_birth: String,
    pub gender: String,
    pub id_number: String,
    pub address: Option<Address>,
    pub occupation: String,
    pub employer: String,
    pub marital_status: String,
    pub preferred_language: String,
    #[serde(deserialize_with = "truthy")]
    pub insurance: bool,
    pub primary_insurance: Option<InsurancePolicy>,
    pub medical_aid_name: String,
    pub medical_aid_number: String,
    pub medical_history: Option<MedicalHistory>,
    pub emergency_contacts: Vec<EmergencyContact>,
    pub preferences: Option<Value>,
}

pub const PROFILE_COMPLETION_FIELDS: u32 = 15;

impl PatientProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim()).trim().to_string()
    }

    pub fn has_address(&self) -> bool {
        self.address.as_ref().map(|a| !a.is_blank()).unwrap_or(false)
    }

    /// Minimum needed before the dashboard stops nagging.
    pub fn is_complete(&self) -> bool {
        !self.first_name.trim().is_empty()
            && !self.last_name.trim().is_empty()
            && !self.date_of_birth.trim().is_empty()
            && !self.phone_number.trim().is_empty()
            && self.has_address()
            && !self.emergency_contacts.is_empty()
    }

    /// Ten tracked fields scored out of fifteen, rounded to a whole percent.
    pub fn completion_percentage(&self) -> u32 {
        let checks = [
            !self.first_name.trim().is_empty(),
            !self.last_name.trim().is_empty(),
            !self.date_of_birth.trim().is_empty(),
            !self.phone_number.trim().is_empty(),
            !self.id_number.trim().is_empty(),
            self.has_address(),
            !self.emergency_contacts.is_empty(),
            self.insurance,
            !self.occupation.trim().is_empty(),
            self.preferences.as_ref().map(|p| !p.is_null()).unwrap_or(false),
        ];
        let completed = checks.iter().filter(|c| **c).count() as f64;
        ((completed / PROFILE_COMPLETION_FIELDS as f64) * 100.0).round() as u32
    }
}
