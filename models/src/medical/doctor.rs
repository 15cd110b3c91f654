// models/src/medical/doctor.rs
use serde::{Deserialize, Serialize};
use super::address::Address;
use crate::util::{opt_string_or_number, string_list};

/// Doctor as returned by the profile and search endpoints.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Doctor {
    #[serde(deserialize_with = "opt_string_or_number")]
    pub id: Option<String>,
    #[serde(deserialize_with = "opt_string_or_number")]
    pub user_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    #[serde(alias = "telephone")]
    pub phone_number: Option<String>,
    pub gender: Option<String>,
    pub specialization: Option<String>,
    pub license_number: Option<String>,
    pub consultation_fee: Option<f64>,
    #[serde(deserialize_with = "string_list")]
    pub accepted_insurance: Vec<String>,
    pub is_private_practice: Option<bool>,
    pub practice_name: Option<String>,
    pub hospital_name: Option<String>,
    pub is_active: Option<bool>,
    pub clinic_address: Option<Address>,
    pub hospital_address: Option<Address>,
    pub bio: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub rating: Option<f64>,
    #[serde(deserialize_with = "string_list")]
    pub languages: Vec<String>,
}

impl Doctor {
    pub fn display_name(&self) -> String {
        match self.full_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Dr. {} {}", self.first_name.trim(), self.last_name.trim()).trim_end().to_string(),
        }
    }

    /// Clinic address wins over hospital address, as on the profile page.
    pub fn primary_address(&self) -> Option<&Address> {
        self.clinic_address
            .as_ref()
            .filter(|a| !a.is_blank())
            .or(self.hospital_address.as_ref().filter(|a| !a.is_blank()))
    }
}

/// Find-a-doctor filters; blank fields are left out of the query.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DoctorSearchFilters {
    pub name: String,
    pub specialty: String,
    pub practice_name: String,
}

impl DoctorSearchFilters {
    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty() && self.specialty.trim().is_empty() && self.practice_name.trim().is_empty()
    }

    pub fn to_query(&self) -> Vec<(String, String)> {
        [("name", &self.name), ("specialty", &self.specialty), ("practiceName", &self.practice_name)]
            .into_iter()
            .filter(|(_, v)| !v.trim().is_empty())
            .map(|(k, v)| (k.to_string(), v.trim().to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_read_comma_separated_insurance_and_telephone_alias() {
        let doctor: Doctor = serde_json::from_str(
            r#"{"id": 5, "firstName": "Sipho", "lastName": "Dlamini", "telephone": "0821234567",
                "acceptedInsurance": "Bonitas Medical Fund, Polmed"}"#,
        )
        .unwrap();
        assert_eq!(doctor.id.as_deref(), Some("5"));
        assert_eq!(doctor.phone_number.as_deref(), Some("0821234567"));
        assert_eq!(doctor.accepted_insurance, vec!["Bonitas Medical Fund", "Polmed"]);
        assert_eq!(doctor.display_name(), "Dr. Sipho Dlamini");
    }

    #[test]
    fn should_only_query_filled_filters() {
        let filters = DoctorSearchFilters {
            name: " ".into(),
            specialty: "Cardiology".into(),
            practice_name: String::new(),
        };
        assert_eq!(filters.to_query(), vec![("specialty".to_string(), "Cardiology".to_string())]);
        assert!(DoctorSearchFilters::default().is_empty());
    }
}
