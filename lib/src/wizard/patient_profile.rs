// lib/src/wizard/patient_profile.rs
//! Four-step patient profile form: personal info, medical history,
//! emergency contacts and insurance.

use chrono::NaiveDate;
use models::util::parse_lenient_date;
use models::{
    Address, EmergencyContact, InsuranceInfo, InsurancePolicy, MedicalHistory, MedicalItem, PatientPreferences,
    PatientProfile, PortalResult, VaccinationStatus,
};
use once_cell::sync::Lazy;
use regex::Regex;
use schema::{FieldRule, RuleSet};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use crate::storage::DurableStorage;
use crate::util::{age_on, bmi, validate_sa_id_number};
use super::{FormArray, WizardError, WizardForm};

pub const PATIENT_PROFILE_DRAFT_KEY: &str = "patientProfileDraft";

pub(crate) static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\+27|0)[6-8][0-9]{8}$").expect("phone pattern compiles"));
pub(crate) static ID_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{13}$").expect("id number pattern compiles"));
pub(crate) static POSTAL_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}$").expect("postal code pattern compiles"));

pub(crate) fn id_number_checksum(value: &Value) -> bool {
    value.as_str().map(|s| validate_sa_id_number(s.trim())).unwrap_or(false)
}

static STEPS: Lazy<Vec<RuleSet>> = Lazy::new(|| {
    let personal = RuleSet::new("personal information")
        .rule(FieldRule::new("personalInfo.firstName").required().min_length(2))
        .rule(FieldRule::new("personalInfo.lastName").required().min_length(2))
        .rule(FieldRule::new("personalInfo.dateOfBirth").required())
        .rule(FieldRule::new("personalInfo.gender").required())
        .rule(FieldRule::new("personalInfo.phoneNumber").required().format(&PHONE_RE))
        .rule(FieldRule::new("personalInfo.idNumber").label("ID number").required().format(&ID_NUMBER_RE))
        .rule(
            FieldRule::new("personalInfo.idNumber")
                .custom("sa_id_checksum", id_number_checksum)
                .message("Invalid South African ID number"),
        )
        .rule(FieldRule::new("personalInfo.address.street").required())
        .rule(FieldRule::new("personalInfo.address.suburb").required())
        .rule(FieldRule::new("personalInfo.address.city").required())
        .rule(FieldRule::new("personalInfo.address.province").required())
        .rule(FieldRule::new("personalInfo.address.postalCode").required().format(&POSTAL_CODE_RE));

    let medical = RuleSet::new("medical information")
        .rule(FieldRule::new("medicalHistory.height").range(50.0, 300.0))
        .rule(FieldRule::new("medicalHistory.weight").range(20.0, 500.0))
        .rule(FieldRule::new("medicalHistory.allergies[].name").label("Allergy").required())
        .rule(FieldRule::new("medicalHistory.chronicConditions[].name").label("Condition").required())
        .rule(FieldRule::new("medicalHistory.currentMedications[].name").label("Medication").required())
        .rule(FieldRule::new("medicalHistory.previousSurgeries[].name").label("Surgery").required());

    let contacts = RuleSet::new("emergency contacts")
        .rule(
            FieldRule::new("emergencyContacts")
                .min_items(1)
                .message("Please add at least one emergency contact"),
        )
        .rule(FieldRule::new("emergencyContacts[].name").required())
        .rule(FieldRule::new("emergencyContacts[].relationship").required())
        .rule(FieldRule::new("emergencyContacts[].phoneNumber").required().format(&PHONE_RE))
        .rule(FieldRule::new("emergencyContacts[].email").email());

    let insurance = RuleSet::new("insurance information")
        .rule(FieldRule::new("insuranceInfo.primaryInsurance.provider").required().when("insuranceInfo.hasInsurance"))
        .rule(
            FieldRule::new("insuranceInfo.primaryInsurance.policyNumber")
                .required()
                .when("insuranceInfo.hasInsurance"),
        )
        .rule(
            FieldRule::new("insuranceInfo.secondaryInsurance.provider")
                .required()
                .when("insuranceInfo.secondaryInsurance.hasSecondary"),
        )
        .rule(
            FieldRule::new("insuranceInfo.secondaryInsurance.policyNumber")
                .required()
                .when("insuranceInfo.secondaryInsurance.hasSecondary"),
        );

    vec![personal, medical, contacts, insurance]
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub gender: String,
    pub phone_number: String,
    pub alternate_phone_number: String,
    pub id_number: String,
    pub address: Address,
    pub occupation: String,
    pub employer: String,
    pub marital_status: String,
    pub preferred_language: String,
    pub profile_picture: Option<String>,
}

impl Default for PersonalInfo {
    fn default() -> Self {
        PersonalInfo {
            first_name: String::new(),
            last_name: String::new(),
            date_of_birth: String::new(),
            gender: String::new(),
            phone_number: String::new(),
            alternate_phone_number: String::new(),
            id_number: String::new(),
            address: Address::default(),
            occupation: String::new(),
            employer: String::new(),
            marital_status: String::new(),
            preferred_language: "English".to_string(),
            profile_picture: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MedicalHistoryForm {
    pub blood_type: String,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub allergies: FormArray<MedicalItem>,
    pub chronic_conditions: FormArray<MedicalItem>,
    pub current_medications: FormArray<MedicalItem>,
    pub previous_surgeries: FormArray<MedicalItem>,
    pub family_medical_history: String,
    pub smoking_status: String,
    pub alcohol_consumption: String,
    pub exercise_frequency: String,
    pub dietary_restrictions: String,
    pub vaccination_status: VaccinationStatus,
}

impl From<MedicalHistory> for MedicalHistoryForm {
    fn from(history: MedicalHistory) -> Self {
        MedicalHistoryForm {
            blood_type: history.blood_type,
            height: history.height,
            weight: history.weight,
            allergies: history.allergies.into(),
            chronic_conditions: history.chronic_conditions.into(),
            current_medications: history.current_medications.into(),
            previous_surgeries: history.previous_surgeries.into(),
            family_medical_history: history.family_medical_history,
            smoking_status: history.smoking_status,
            alcohol_consumption: history.alcohol_consumption,
            exercise_frequency: history.exercise_frequency,
            dietary_restrictions: history.dietary_restrictions,
            vaccination_status: history.vaccination_status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientProfileForm {
    pub personal_info: PersonalInfo,
    pub medical_history: MedicalHistoryForm,
    pub emergency_contacts: FormArray<EmergencyContact>,
    pub insurance_info: InsuranceInfo,
    pub preferences: PatientPreferences,
}

impl Default for PatientProfileForm {
    /// Starts with one blank emergency contact, which can never be removed.
    fn default() -> Self {
        PatientProfileForm {
            personal_info: PersonalInfo::default(),
            medical_history: MedicalHistoryForm::default(),
            emergency_contacts: vec![EmergencyContact::default()].into(),
            insurance_info: InsuranceInfo::default(),
            preferences: PatientPreferences::default(),
        }
    }
}

impl WizardForm for PatientProfileForm {
    const TOTAL_STEPS: u32 = 4;

    fn step_rules(step: u32) -> Option<&'static RuleSet> {
        step.checked_sub(1).and_then(|i| STEPS.get(i as usize))
    }

    fn step_title(step: u32) -> &'static str {
        match step {
            1 => "Personal Information",
            2 => "Medical Information",
            3 => "Emergency Contacts",
            4 => "Insurance Information",
            _ => "",
        }
    }

    fn step_description(step: u32) -> &'static str {
        match step {
            1 => "Tell us who you are and where we can reach you",
            2 => "Share your medical background; everything here is optional",
            3 => "Add at least one person we can contact in an emergency",
            4 => "Add your medical aid or insurance details if you have any",
            _ => "",
        }
    }

    /// `insurance` is the primary policy, or null without insurance.
    fn to_payload(&self) -> PortalResult<Value> {
        let insurance = if self.insurance_info.has_insurance {
            serde_json::to_value(&self.insurance_info.primary_insurance)?
        } else {
            Value::Null
        };
        Ok(json!({
            "personalInfo": serde_json::to_value(&self.personal_info)?,
            "medicalHistory": serde_json::to_value(&self.medical_history)?,
            "emergencyContacts": serde_json::to_value(&self.emergency_contacts)?,
            "insurance": insurance,
            "medicalAidNumber": self.insurance_info.medical_aid_number,
            "preferences": serde_json::to_value(&self.preferences)?,
        }))
    }
}

impl PatientProfileForm {
    /// Pre-fills the form from a stored profile; anything missing keeps its default.
    pub fn from_profile(profile: &PatientProfile) -> Self {
        let preferences = profile
            .preferences
            .clone()
            .and_then(|raw| serde_json::from_value::<PatientPreferences>(raw).ok())
            .unwrap_or_default();

        let preferred_language = if profile.preferred_language.trim().is_empty() {
            preferences.preferred_language.clone()
        } else {
            profile.preferred_language.clone()
        };

        let personal_info = PersonalInfo {
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            date_of_birth: profile.date_of_birth.clone(),
            gender: profile.gender.clone(),
            phone_number: profile.phone_number.clone(),
            alternate_phone_number: profile.alternate_phone_number.clone(),
            id_number: profile.id_number.clone(),
            address: profile.address.clone().unwrap_or_default(),
            occupation: profile.occupation.clone(),
            employer: profile.employer.clone(),
            marital_status: profile.marital_status.clone(),
            preferred_language,
            profile_picture: None,
        };

        let mut form = PatientProfileForm {
            personal_info,
            medical_history: profile.medical_history.clone().map(Into::into).unwrap_or_default(),
            preferences,
            ..PatientProfileForm::default()
        };

        if !profile.emergency_contacts.is_empty() {
            form.emergency_contacts = profile.emergency_contacts.clone().into();
        }

        if profile.insurance {
            form.insurance_info.has_insurance = true;
            form.insurance_info.primary_insurance = profile.primary_insurance.clone().unwrap_or_else(|| InsurancePolicy {
                provider: profile.medical_aid_name.clone(),
                ..InsurancePolicy::default()
            });
        }
        form.insurance_info.medical_aid_number = profile.medical_aid_number.clone();
        form
    }

    pub fn date_of_birth(&self) -> Option<NaiveDate> {
        parse_lenient_date(&self.personal_info.date_of_birth)
    }

    pub fn age(&self, today: NaiveDate) -> Option<u32> {
        self.date_of_birth().map(|dob| age_on(dob, today))
    }

    pub fn bmi(&self) -> Option<f64> {
        let value = bmi(self.medical_history.height, self.medical_history.weight);
        (value > 0.0).then_some(value)
    }

    pub fn add_emergency_contact(&mut self) -> usize {
        self.emergency_contacts.push(EmergencyContact::default())
    }

    /// The last remaining contact cannot be removed.
    pub fn remove_emergency_contact(&mut self, index: usize) -> Result<Option<EmergencyContact>, WizardError> {
        if self.emergency_contacts.len() <= 1 {
            return Err(WizardError::MinimumEntries("At least one emergency contact is required".to_string()));
        }
        Ok(self.emergency_contacts.remove_at(index))
    }

    pub fn add_allergy(&mut self) -> usize {
        self.medical_history.allergies.push(MedicalItem::default())
    }

    pub fn add_chronic_condition(&mut self) -> usize {
        self.medical_history.chronic_conditions.push(MedicalItem::default())
    }

    pub fn add_medication(&mut self) -> usize {
        self.medical_history.current_medications.push(MedicalItem::default())
    }

    pub fn add_surgery(&mut self) -> usize {
        self.medical_history.previous_surgeries.push(MedicalItem::default())
    }

    pub async fn save_draft(&self, storage: &dyn DurableStorage) -> PortalResult<()> {
        let raw = serde_json::to_string(self)?;
        storage.set(PATIENT_PROFILE_DRAFT_KEY, &raw).await
    }

    pub async fn load_draft(storage: &dyn DurableStorage) -> PortalResult<Option<Self>> {
        match storage.get(PATIENT_PROFILE_DRAFT_KEY).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub async fn discard_draft(storage: &dyn DurableStorage) -> PortalResult<()> {
        storage.remove(PATIENT_PROFILE_DRAFT_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::testing::complete_patient_form;
    use crate::wizard::Wizard;

    fn personal() -> PersonalInfo {
        PersonalInfo {
            first_name: "Thandi".into(),
            last_name: "Nkosi".into(),
            date_of_birth: "1980-01-01".into(),
            gender: "Female".into(),
            phone_number: "0821234567".into(),
            id_number: "8001014009088".into(),
            address: Address {
                street: "1 Main Rd".into(),
                suburb: "Berea".into(),
                city: "Durban".into(),
                province: "KwaZulu-Natal".into(),
                postal_code: "4001".into(),
                ..Address::default()
            },
            ..PersonalInfo::default()
        }
    }

    fn contact() -> EmergencyContact {
        EmergencyContact {
            name: "Sizwe Nkosi".into(),
            relationship: "Sibling".into(),
            phone_number: "+27731234567".into(),
            ..EmergencyContact::default()
        }
    }

    #[test]
    fn should_require_personal_details_on_first_step() {
        let mut wizard = Wizard::new(PatientProfileForm::default());
        assert!(wizard.next_step().is_err());
        assert_eq!(wizard.field_error("personalInfo.firstName"), Some("First name is required"));
        assert_eq!(wizard.field_error("personalInfo.address.suburb"), Some("Suburb is required"));

        wizard.form_mut().personal_info = personal();
        assert_eq!(wizard.next_step().unwrap(), 2);
    }

    #[test]
    fn should_hold_first_step_on_blank_postal_code() {
        let mut form = complete_patient_form();
        form.personal_info.address.postal_code = "  ".into();
        let mut wizard = Wizard::new(form);
        assert!(wizard.next_step().is_err());
        assert_eq!(wizard.current_step(), 1);
        assert_eq!(wizard.field_error("personalInfo.address.postalCode"), Some("Postal code is required"));
    }

    #[test]
    fn should_reject_each_blank_required_field() {
        type Blank = fn(&mut PatientProfileForm);
        let cases: &[(u32, &str, Blank)] = &[
            (1, "personalInfo.firstName", |f| f.personal_info.first_name.clear()),
            (1, "personalInfo.lastName", |f| f.personal_info.last_name.clear()),
            (1, "personalInfo.dateOfBirth", |f| f.personal_info.date_of_birth.clear()),
            (1, "personalInfo.gender", |f| f.personal_info.gender.clear()),
            (1, "personalInfo.phoneNumber", |f| f.personal_info.phone_number.clear()),
            (1, "personalInfo.idNumber", |f| f.personal_info.id_number.clear()),
            (1, "personalInfo.address.street", |f| f.personal_info.address.street.clear()),
            (1, "personalInfo.address.suburb", |f| f.personal_info.address.suburb.clear()),
            (1, "personalInfo.address.city", |f| f.personal_info.address.city.clear()),
            (1, "personalInfo.address.province", |f| f.personal_info.address.province.clear()),
            (1, "personalInfo.address.postalCode", |f| f.personal_info.address.postal_code.clear()),
            (3, "emergencyContacts.0.name", |f| f.emergency_contacts.get_mut(0).unwrap().name.clear()),
            (3, "emergencyContacts.0.relationship", |f| f.emergency_contacts.get_mut(0).unwrap().relationship.clear()),
            (3, "emergencyContacts.0.phoneNumber", |f| f.emergency_contacts.get_mut(0).unwrap().phone_number.clear()),
            (4, "insuranceInfo.primaryInsurance.provider", |f| {
                f.insurance_info.has_insurance = true;
                f.insurance_info.primary_insurance.policy_number = "BON-1".into();
            }),
            (4, "insuranceInfo.primaryInsurance.policyNumber", |f| {
                f.insurance_info.has_insurance = true;
                f.insurance_info.primary_insurance.provider = "Bonitas Medical Fund".into();
            }),
        ];

        for &(step, path, blank) in cases {
            let mut form = complete_patient_form();
            assert!(Wizard::new(form.clone()).check_step(step).unwrap().is_valid(), "{} starts valid", path);
            blank(&mut form);
            let report = Wizard::new(form).check_step(step).unwrap();
            let message = report.message_for(path).unwrap_or_else(|| panic!("{} accepted blank", path));
            assert!(message.ends_with("is required"), "{}: {}", path, message);
        }
    }

    #[test]
    fn should_reject_id_number_with_bad_checksum() {
        let mut wizard = Wizard::new(PatientProfileForm { personal_info: personal(), ..Default::default() });
        wizard.form_mut().personal_info.id_number = "8001015009088".into();
        assert!(wizard.validate_current_step().is_err());
        assert_eq!(wizard.field_error("personalInfo.idNumber"), Some("Invalid South African ID number"));

        wizard.form_mut().personal_info.id_number = "80010150".into();
        assert!(wizard.validate_current_step().is_err());
        assert_eq!(wizard.field_error("personalInfo.idNumber"), Some("Invalid id number format"));
    }

    #[test]
    fn should_check_medical_ranges_and_item_names() {
        let mut form = PatientProfileForm { personal_info: personal(), ..Default::default() };
        form.medical_history.height = Some(20.0);
        form.add_allergy();
        let mut wizard = Wizard::new(form);
        wizard.go_to_step(2).unwrap();
        assert!(wizard.next_step().is_err());
        assert_eq!(wizard.field_error("medicalHistory.height"), Some("Height must be at least 50"));
        assert_eq!(wizard.field_error("medicalHistory.allergies.0.name"), Some("Allergy is required"));
    }

    #[test]
    fn should_keep_at_least_one_emergency_contact() {
        let mut form = PatientProfileForm::default();
        assert!(matches!(form.remove_emergency_contact(0), Err(WizardError::MinimumEntries(_))));
        assert_eq!(form.add_emergency_contact(), 1);
        assert_eq!(form.remove_emergency_contact(5).unwrap(), None);
        assert!(form.remove_emergency_contact(0).unwrap().is_some());
        assert_eq!(form.emergency_contacts.len(), 1);
    }

    #[test]
    fn should_validate_contacts_on_third_step() {
        let mut wizard = Wizard::new(PatientProfileForm { personal_info: personal(), ..Default::default() });
        wizard.form_mut().emergency_contacts.get_mut(0).unwrap().email = "nope".into();
        wizard.go_to_step(3).unwrap();
        assert!(wizard.next_step().is_err());
        assert_eq!(wizard.field_error("emergencyContacts.0.name"), Some("Name is required"));
        assert_eq!(wizard.field_error("emergencyContacts.0.email"), Some("Invalid email format"));

        wizard.form_mut().emergency_contacts = vec![contact()].into();
        assert_eq!(wizard.next_step().unwrap(), 4);
    }

    #[test]
    fn should_require_policy_details_only_when_insured() {
        let mut form = PatientProfileForm { personal_info: personal(), ..Default::default() };
        form.emergency_contacts = vec![contact()].into();
        let mut wizard = Wizard::new(form);
        assert!(wizard.check_step(4).unwrap().is_valid());

        wizard.form_mut().insurance_info.has_insurance = true;
        let report = wizard.check_step(4).unwrap();
        assert_eq!(report.message_for("insuranceInfo.primaryInsurance.provider"), Some("Provider is required"));

        wizard.form_mut().insurance_info.primary_insurance.provider = "Bonitas Medical Fund".into();
        wizard.form_mut().insurance_info.primary_insurance.policy_number = "BON-1".into();
        wizard.form_mut().insurance_info.secondary_insurance.has_secondary = true;
        assert_eq!(wizard.check_step(4).unwrap().errors.len(), 2);
    }

    #[test]
    fn should_map_insurance_into_payload() {
        let mut form = PatientProfileForm { personal_info: personal(), ..Default::default() };
        form.insurance_info.medical_aid_number = "MA-123".into();
        form.insurance_info.primary_insurance.provider = "Polmed".into();
        let payload = form.to_payload().unwrap();
        assert_eq!(payload["insurance"], Value::Null);
        assert_eq!(payload["medicalAidNumber"], "MA-123");
        assert_eq!(payload["personalInfo"]["firstName"], "Thandi");
        assert!(payload.get("insuranceInfo").is_none());

        form.insurance_info.has_insurance = true;
        assert_eq!(form.to_payload().unwrap()["insurance"]["provider"], "Polmed");
    }

    #[test]
    fn should_prefill_from_existing_profile() {
        let profile: PatientProfile = serde_json::from_value(json!({
            "firstName": "Thandi",
            "lastName": "Nkosi",
            "dateOfBirth": "1980-01-01",
            "insurance": true,
            "medicalAidName": "Discovery Health Medical Scheme",
            "medicalAidNumber": "DH-9",
            "medicalHistory": {"height": 170, "weight": 65, "vaccinationStatus": "covid, measles"},
            "preferences": {"preferredLanguage": "Zulu"}
        }))
        .unwrap();
        let form = PatientProfileForm::from_profile(&profile);
        assert_eq!(form.personal_info.preferred_language, "Zulu");
        assert_eq!(form.emergency_contacts.len(), 1);
        assert!(form.insurance_info.has_insurance);
        assert_eq!(form.insurance_info.primary_insurance.provider, "Discovery Health Medical Scheme");
        assert!(form.medical_history.vaccination_status.covid19);
        assert_eq!(form.medical_history.vaccination_status.other, "measles");
        assert_eq!(form.bmi(), Some(22.5));
        assert_eq!(form.age(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()), Some(45));
    }

    #[tokio::test]
    async fn should_round_trip_draft_through_storage() {
        let storage = MemoryStorage::new();
        assert!(PatientProfileForm::load_draft(&storage).await.unwrap().is_none());

        let mut form = PatientProfileForm { personal_info: personal(), ..Default::default() };
        form.add_medication();
        form.save_draft(&storage).await.unwrap();
        assert_eq!(PatientProfileForm::load_draft(&storage).await.unwrap(), Some(form));

        PatientProfileForm::discard_draft(&storage).await.unwrap();
        assert!(!storage.contains(PATIENT_PROFILE_DRAFT_KEY).await.unwrap());
    }
}
