// models/src/medical/catalog.rs
//! Static pick-lists shown by the profile wizards.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Specialization {
    pub id: &'static str,
    pub name: &'static str,
    pub category: &'static str,
}

pub const SPECIALIZATIONS: [Specialization; 10] = [
    Specialization { id: "1", name: "General Practice", category: "Primary Care" },
    Specialization { id: "2", name: "Cardiology", category: "Specialist" },
    Specialization { id: "3", name: "Dermatology", category: "Specialist" },
    Specialization { id: "4", name: "Neurology", category: "Specialist" },
    Specialization { id: "5", name: "Pediatrics", category: "Specialist" },
    Specialization { id: "6", name: "Orthopedics", category: "Specialist" },
    Specialization { id: "7", name: "Gynecology", category: "Specialist" },
    Specialization { id: "8", name: "Psychiatry", category: "Mental Health" },
    Specialization { id: "9", name: "Radiology", category: "Diagnostic" },
    Specialization { id: "10", name: "Emergency Medicine", category: "Emergency" },
];

pub const MEDICAL_AID_PROVIDERS: [&str; 22] = [
    "Discovery Health Medical Scheme",
    "Bonitas Medical Fund",
    "Momentum Health",
    "Fedhealth Medical Scheme",
    "Medihelp Medical Scheme",
    "Bestmed Medical Scheme",
    "Medshield Medical Scheme",
    "Genesis Medical Scheme",
    "Sizwe Hosmed Medical Scheme",
    "Keyhealth",
    "GEMS (Government Employees Medical Scheme)",
    "Bankmed",
    "Polmed",
    "CAMAF (Chartered Accountants Medical Aid Fund)",
    "Profmed",
    "OnePlan Health Insurance",
    "Sanlam Health Insurance",
    "Dis-Chem Health Insurance",
    "Essential Med",
    "GetSavvi Health",
    "Discovery Gap Cover",
    "Stratum Benefits (Gap Cover)",
];

pub const LANGUAGES: [&str; 11] = [
    "English", "Afrikaans", "Zulu", "Xhosa", "Sotho",
    "Tswana", "Pedi", "Venda", "Tsonga", "Ndebele", "Swati",
];

pub const PROVINCES: [&str; 9] = [
    "Eastern Cape", "Free State", "Gauteng", "KwaZulu-Natal",
    "Limpopo", "Mpumalanga", "North West", "Northern Cape", "Western Cape",
];

pub const BLOOD_TYPES: [&str; 9] = ["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-", "Unknown"];

pub const GENDERS: [&str; 4] = ["Male", "Female", "Other", "Prefer not to say"];

pub const RELATIONSHIP_TYPES: [&str; 6] = ["Spouse", "Parent", "Child", "Sibling", "Friend", "Other"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsultationType {
    InPerson,
    Virtual,
    Both,
}

impl ConsultationType {
    pub const ALL: [ConsultationType; 3] =
        [ConsultationType::InPerson, ConsultationType::Virtual, ConsultationType::Both];

    pub fn label(&self) -> &'static str {
        match self {
            ConsultationType::InPerson => "In-Person",
            ConsultationType::Virtual => "Virtual/Online",
            ConsultationType::Both => "Both In-Person & Virtual",
        }
    }
}

pub fn specialization_by_id(id: &str) -> Option<&'static Specialization> {
    SPECIALIZATIONS.iter().find(|s| s.id == id)
}

pub fn is_known_province(name: &str) -> bool {
    PROVINCES.iter().any(|p| p.eq_ignore_ascii_case(name.trim()))
}
