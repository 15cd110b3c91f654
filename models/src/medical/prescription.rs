// models/src/medical/prescription.rs
use serde::{Deserialize, Serialize};
use crate::util::{opt_string_or_number, string_or_number};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PrescriptionStatus {
    Active,
    Filled,
    Expired,
    Cancelled,
    Unknown(String),
}

impl PrescriptionStatus {
    pub fn as_wire(&self) -> &str {
        match self {
            PrescriptionStatus::Active => "ACTIVE",
            PrescriptionStatus::Filled => "FILLED",
            PrescriptionStatus::Expired => "EXPIRED",
            PrescriptionStatus::Cancelled => "CANCELLED",
            PrescriptionStatus::Unknown(raw) => raw,
        }
    }
}

impl From<String> for PrescriptionStatus {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ACTIVE" => PrescriptionStatus::Active,
            "FILLED" => PrescriptionStatus::Filled,
            "EXPIRED" => PrescriptionStatus::Expired,
            "CANCELLED" | "CANCELED" => PrescriptionStatus::Cancelled,
            _ => PrescriptionStatus::Unknown(raw),
        }
    }
}

impl From<PrescriptionStatus> for String {
    fn from(status: PrescriptionStatus) -> Self {
        status.as_wire().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub patient_id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub doctor_id: String,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub appointment_id: Option<String>,
    #[serde(default)]
    pub medication_name: String,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    pub status: PrescriptionStatus,
    #[serde(default)]
    pub issued_date: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<String>,
    #[serde(default)]
    pub doctor_name: Option<String>,
}

/// Query filter for the prescriptions list; unset fields are not sent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionFilter {
    pub doctor_id: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub medication_name: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl PrescriptionFilter {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        let text = [
            ("doctorId", &self.doctor_id),
            ("status", &self.status),
            ("startDate", &self.start_date),
            ("endDate", &self.end_date),
            ("medicationName", &self.medication_name),
        ];
        for (key, value) in text {
            if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
                query.push((key.to_string(), v.to_string()));
            }
        }
        if let Some(limit) = self.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(offset) = self.offset {
            query.push(("offset".to_string(), offset.to_string()));
        }
        query
    }
}
