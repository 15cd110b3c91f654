// models/src/medical/insurance.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InsurancePolicy {
    pub provider: String,
    pub policy_number: String,
    pub group_number: String,
    pub plan_name: String,
    pub effective_date: String,
    pub expiration_date: String,
    pub copay_amount: String,
    pub deductible_amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SecondaryInsurance {
    pub has_secondary: bool,
    pub provider: String,
    pub policy_number: String,
    pub group_number: String,
    pub plan_name: String,
}

/// Insurance step of the patient profile. Provider and policy number only
/// matter when the matching `has_*` flag is set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InsuranceInfo {
    pub has_insurance: bool,
    pub primary_insurance: InsurancePolicy,
    pub secondary_insurance: SecondaryInsurance,
    pub medical_aid_number: String,
    pub dependent_code: String,
    pub authorization_required: bool,
}
