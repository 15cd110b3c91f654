// models/src/medical/medical_record.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::util::{opt_string_or_number, string_or_number};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub patient_id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub doctor_id: String,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub appointment_id: Option<String>,
    #[serde(default)]
    pub record_type: Option<String>,
    #[serde(default)]
    pub visit_date: Option<String>,
    #[serde(default)]
    pub chief_complaint: Option<String>,
    #[serde(default)]
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub treatment: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub follow_up_required: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecordFilter {
    pub doctor_id: Option<String>,
    pub record_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub search_term: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl MedicalRecordFilter {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query: Vec<(String, String)> = [
            ("doctorId", &self.doctor_id),
            ("recordType", &self.record_type),
            ("startDate", &self.start_date),
            ("endDate", &self.end_date),
            ("searchTerm", &self.search_term),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.as_deref().filter(|v| !v.is_empty()).map(|v| (k.to_string(), v.to_string())))
        .collect();
        if let Some(limit) = self.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(offset) = self.offset {
            query.push(("offset".to_string(), offset.to_string()));
        }
        query
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecordSummary {
    #[serde(default)]
    pub total_records: u64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}
