// lib/src/wizard/doctor_profile.rs
use models::catalog::SPECIALIZATIONS;
use models::{Address, ConsultationType, Doctor, PortalResult, Role, User};
use once_cell::sync::Lazy;
use schema::{FieldRule, RuleSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use super::patient_profile::{id_number_checksum, ID_NUMBER_RE, PHONE_RE, POSTAL_CODE_RE};
use super::{FormArray, WizardForm};

static STEPS: Lazy<Vec<RuleSet>> = Lazy::new(|| {
    let basic = RuleSet::new("basic information")
        .rule(FieldRule::new("firstName").required())
        .rule(FieldRule::new("lastName").required())
        .rule(FieldRule::new("email").email())
        .rule(FieldRule::new("phoneNumber").required().format(&PHONE_RE))
        .rule(FieldRule::new("dateOfBirth").required())
        .rule(FieldRule::new("gender").required())
        .rule(FieldRule::new("idNumber").label("ID number").required().format(&ID_NUMBER_RE))
        .rule(
            FieldRule::new("idNumber")
                .custom("sa_id_checksum", id_number_checksum)
                .message("Invalid South African ID number"),
        );

    let professional = RuleSet::new("professional information")
        .rule(FieldRule::new("medicalLicenseNumber").label("Medical license number").required())
        .rule(FieldRule::new("hpcsaNumber").label("HPCSA number").required())
        .rule(FieldRule::new("yearsOfExperience").required().min(0.0))
        .rule(
            FieldRule::new("specializations")
                .min_items(1)
                .message("Please select at least one specialization")
                .hard_stop(),
        );

    let education = RuleSet::new("education")
        .rule(FieldRule::new("education[].institution").required())
        .rule(FieldRule::new("education[].degree").required())
        .rule(FieldRule::new("education[].fieldOfStudy").required())
        .rule(FieldRule::new("education[].startYear").required())
        .rule(FieldRule::new("education[].endYear").required())
        .rule(FieldRule::new("certifications[].name").required())
        .rule(FieldRule::new("certifications[].issuingOrganization").required())
        .rule(FieldRule::new("certifications[].issueDate").required());

    let practice = RuleSet::new("practice information")
        .rule(FieldRule::new("practiceName").required())
        .rule(FieldRule::new("practiceType").required())
        .rule(FieldRule::new("address.street").required())
        .rule(FieldRule::new("address.city").required())
        .rule(FieldRule::new("address.province").required())
        .rule(FieldRule::new("address.postalCode").required().format(&POSTAL_CODE_RE));

    let availability = RuleSet::new("availability")
        .rule(FieldRule::new("workingHours[].dayOfWeek").label("Day").required())
        .rule(FieldRule::new("workingHours[].startTime").required())
        .rule(FieldRule::new("workingHours[].endTime").required())
        .rule(
            FieldRule::new("agreeToTerms")
                .must_be_true()
                .message("Please agree to the terms and conditions")
                .hard_stop(),
        )
        .rule(
            FieldRule::new("agreeToPrivacyPolicy")
                .must_be_true()
                .message("Please agree to the privacy policy")
                .hard_stop(),
        );

    vec![basic, professional, education, practice, availability]
});

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    pub institution: String,
    pub degree: String,
    pub field_of_study: String,
    pub start_year: String,
    pub end_year: String,
    pub is_currently_studying: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Certification {
    pub name: String,
    pub issuing_organization: String,
    pub issue_date: String,
    pub expiry_date: String,
    pub credential_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkingHours {
    pub day_of_week: String,
    pub start_time: String,
    pub end_time: String,
    pub lunch_break_start: String,
    pub lunch_break_end: String,
    pub is_available: bool,
}

impl Default for WorkingHours {
    fn default() -> Self {
        WorkingHours {
            day_of_week: String::new(),
            start_time: String::new(),
            end_time: String::new(),
            lunch_break_start: String::new(),
            lunch_break_end: String::new(),
            is_available: true,
        }
    }
}

/// Doctor profile form. Serialises to exactly the update payload, except
/// that accepted insurance goes out as one comma-separated string.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DoctorProfileForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub date_of_birth: String,
    pub gender: String,
    pub id_number: String,
    pub profile_picture: Option<String>,

    pub medical_license_number: String,
    pub hpcsa_number: String,
    pub years_of_experience: Option<u32>,
    pub specializations: FormArray<String>,
    pub languages_spoken: FormArray<String>,

    pub education: FormArray<Education>,
    pub certifications: FormArray<Certification>,

    pub practice_name: String,
    pub practice_type: String,
    pub address: Address,
    pub consultation_types: FormArray<ConsultationType>,
    pub consultation_fee: Option<f64>,
    pub accepted_insurance: Vec<String>,

    pub working_hours: FormArray<WorkingHours>,
    pub bio: String,
    pub agree_to_terms: bool,
    pub agree_to_privacy_policy: bool,
}

impl WizardForm for DoctorProfileForm {
    const TOTAL_STEPS: u32 = 5;

    fn step_rules(step: u32) -> Option<&'static RuleSet> {
        step.checked_sub(1).and_then(|i| STEPS.get(i as usize))
    }

    fn step_title(step: u32) -> &'static str {
        match step {
            1 => "Basic Information",
            2 => "Professional Information",
            3 => "Education & Qualifications",
            4 => "Practice Information",
            5 => "Availability & Final Details",
            _ => "",
        }
    }

    fn step_description(step: u32) -> &'static str {
        match step {
            1 => "Please provide your basic personal information",
            2 => "Enter your professional credentials and specializations",
            3 => "Add your educational background and certifications",
            4 => "Setup your practice details and consultation information",
            5 => "Set your availability and complete your profile",
            _ => "",
        }
    }

    fn to_payload(&self) -> PortalResult<Value> {
        let mut payload = serde_json::to_value(self)?;
        if let Some(fields) = payload.as_object_mut() {
            fields.insert("acceptedInsurance".to_string(), Value::String(self.accepted_insurance.join(",")));
        }
        Ok(payload)
    }
}

impl DoctorProfileForm {
    /// Only doctors who already finished setup get their stored profile loaded.
    pub fn should_prefill(user: &User) -> bool {
        user.profile_completed && user.role == Role::Doctor
    }

    pub fn from_doctor(doctor: &Doctor) -> Self {
        let mut form = DoctorProfileForm {
            first_name: doctor.first_name.clone(),
            last_name: doctor.last_name.clone(),
            email: doctor.email.clone().unwrap_or_default(),
            phone_number: doctor.phone_number.clone().unwrap_or_default(),
            gender: doctor.gender.clone().unwrap_or_default(),
            medical_license_number: doctor.license_number.clone().unwrap_or_default(),
            practice_name: doctor.practice_name.clone().unwrap_or_default(),
            bio: doctor.bio.clone().unwrap_or_default(),
            consultation_fee: doctor.consultation_fee,
            languages_spoken: doctor.languages.clone().into(),
            ..DoctorProfileForm::default()
        };
        for provider in &doctor.accepted_insurance {
            form.add_accepted_insurance(provider);
        }
        // the hospital address overrides the clinic one when both are set
        if let Some(address) = doctor.hospital_address.as_ref().or(doctor.clinic_address.as_ref()) {
            form.address = address.clone();
        }
        if let Some(name) = doctor.specialization.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            let id = SPECIALIZATIONS
                .iter()
                .find(|s| s.name.eq_ignore_ascii_case(name))
                .map(|s| s.id.to_string())
                .unwrap_or_else(|| name.to_string());
            form.add_specialization(&id);
        }
        form
    }

    pub fn add_specialization(&mut self, id: &str) -> bool {
        let id = id.trim().to_string();
        if id.is_empty() || self.specializations.contains(&id) {
            return false;
        }
        self.specializations.push(id);
        true
    }

    pub fn add_language(&mut self, language: &str) -> bool {
        let language = language.trim().to_string();
        if language.is_empty() || self.languages_spoken.contains(&language) {
            return false;
        }
        self.languages_spoken.push(language);
        true
    }

    /// Tag box: blank and duplicate providers are ignored.
    pub fn add_accepted_insurance(&mut self, provider: &str) -> bool {
        let provider = provider.trim();
        if provider.is_empty() || self.accepted_insurance.iter().any(|p| p == provider) {
            return false;
        }
        self.accepted_insurance.push(provider.to_string());
        true
    }

    pub fn remove_accepted_insurance(&mut self, provider: &str) -> bool {
        let before = self.accepted_insurance.len();
        self.accepted_insurance.retain(|p| p != provider);
        self.accepted_insurance.len() != before
    }

    pub fn add_education(&mut self) -> usize {
        self.education.push(Education::default())
    }

    pub fn add_certification(&mut self) -> usize {
        self.certifications.push(Certification::default())
    }

    pub fn add_working_hours(&mut self) -> usize {
        self.working_hours.push(WorkingHours::default())
    }

    pub fn toggle_consultation_type(&mut self, kind: ConsultationType) {
        match self.consultation_types.iter().position(|k| *k == kind) {
            Some(index) => {
                self.consultation_types.remove_at(index);
            }
            None => {
                self.consultation_types.push(kind);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{complete_doctor_form, doctor_user, patient_user};
    use crate::wizard::{Wizard, WizardError};
    use serde_json::json;

    #[test]
    fn should_hard_stop_without_specialization() {
        let mut form = complete_doctor_form();
        form.specializations.clear();
        let mut wizard = Wizard::new(form);
        wizard.next_step().unwrap();
        let err = wizard.next_step().unwrap_err();
        assert!(matches!(err, WizardError::Validation { step: 2, .. }));
        assert_eq!(wizard.blocking_message(), Some("Please select at least one specialization"));
        assert_eq!(wizard.current_step(), 2);
    }

    fn education() -> Education {
        Education {
            institution: "University of KwaZulu-Natal".into(),
            degree: "MBChB".into(),
            field_of_study: "Medicine".into(),
            start_year: "1998".into(),
            end_year: "2004".into(),
            ..Education::default()
        }
    }

    fn certification() -> Certification {
        Certification {
            name: "ACLS".into(),
            issuing_organization: "Resuscitation Council of SA".into(),
            issue_date: "2020-03-01".into(),
            ..Certification::default()
        }
    }

    #[test]
    fn should_reject_each_blank_required_field() {
        type Blank = fn(&mut DoctorProfileForm);
        let cases: &[(u32, &str, Blank)] = &[
            (1, "firstName", |f| f.first_name.clear()),
            (1, "lastName", |f| f.last_name.clear()),
            (1, "phoneNumber", |f| f.phone_number.clear()),
            (1, "dateOfBirth", |f| f.date_of_birth.clear()),
            (1, "gender", |f| f.gender.clear()),
            (1, "idNumber", |f| f.id_number.clear()),
            (2, "medicalLicenseNumber", |f| f.medical_license_number.clear()),
            (2, "hpcsaNumber", |f| f.hpcsa_number.clear()),
            (2, "yearsOfExperience", |f| f.years_of_experience = None),
            (3, "education.0.institution", |f| {
                f.education.push(Education { institution: String::new(), ..education() });
            }),
            (3, "education.0.degree", |f| {
                f.education.push(Education { degree: String::new(), ..education() });
            }),
            (3, "education.0.fieldOfStudy", |f| {
                f.education.push(Education { field_of_study: String::new(), ..education() });
            }),
            (3, "education.0.startYear", |f| {
                f.education.push(Education { start_year: String::new(), ..education() });
            }),
            (3, "education.0.endYear", |f| {
                f.education.push(Education { end_year: String::new(), ..education() });
            }),
            (3, "certifications.0.name", |f| {
                f.certifications.push(Certification { name: String::new(), ..certification() });
            }),
            (3, "certifications.0.issuingOrganization", |f| {
                f.certifications.push(Certification { issuing_organization: String::new(), ..certification() });
            }),
            (3, "certifications.0.issueDate", |f| {
                f.certifications.push(Certification { issue_date: String::new(), ..certification() });
            }),
            (4, "practiceName", |f| f.practice_name.clear()),
            (4, "practiceType", |f| f.practice_type.clear()),
            (4, "address.street", |f| f.address.street.clear()),
            (4, "address.city", |f| f.address.city.clear()),
            (4, "address.province", |f| f.address.province.clear()),
            (4, "address.postalCode", |f| f.address.postal_code.clear()),
            (5, "workingHours.0.dayOfWeek", |f| f.working_hours.get_mut(0).unwrap().day_of_week.clear()),
            (5, "workingHours.0.startTime", |f| f.working_hours.get_mut(0).unwrap().start_time.clear()),
            (5, "workingHours.0.endTime", |f| f.working_hours.get_mut(0).unwrap().end_time.clear()),
        ];

        for &(step, path, blank) in cases {
            let mut form = complete_doctor_form();
            blank(&mut form);
            let report = Wizard::new(form).check_step(step).unwrap();
            let message = report.message_for(path).unwrap_or_else(|| panic!("{} accepted blank", path));
            assert!(message.ends_with("is required"), "{}: {}", path, message);
        }

        let mut form = complete_doctor_form();
        form.education.push(education());
        form.certifications.push(certification());
        let wizard = Wizard::new(form);
        for step in 1..=5 {
            assert!(wizard.check_step(step).unwrap().is_valid(), "step {} starts valid", step);
        }
    }

    #[test]
    fn should_accept_blank_optional_email() {
        let mut form = complete_doctor_form();
        form.email.clear();
        assert!(Wizard::new(form.clone()).check_step(1).unwrap().is_valid());
        form.email = "sipho.example".into();
        let report = Wizard::new(form).check_step(1).unwrap();
        assert_eq!(report.message_for("email"), Some("Invalid email format"));
    }

    #[test]
    fn should_block_submission_until_terms_and_privacy_accepted() {
        let mut form = complete_doctor_form();
        form.agree_to_terms = false;
        form.agree_to_privacy_policy = false;
        let mut wizard = Wizard::new(form);
        let err = wizard.prepare_submission().unwrap_err();
        assert_eq!(err.message(), "Please agree to the terms and conditions");

        wizard.form_mut().agree_to_terms = true;
        let err = wizard.prepare_submission().unwrap_err();
        assert_eq!(err.message(), "Please agree to the privacy policy");

        wizard.form_mut().agree_to_privacy_policy = true;
        assert!(wizard.prepare_submission().is_ok());
    }

    #[test]
    fn should_require_each_working_hours_entry() {
        let mut form = complete_doctor_form();
        form.add_working_hours();
        let mut wizard = Wizard::new(form);
        wizard.go_to_step(5).unwrap();
        assert!(wizard.validate_current_step().is_err());
        assert_eq!(wizard.field_error("workingHours.1.dayOfWeek"), Some("Day is required"));
        assert_eq!(wizard.field_error("workingHours.1.endTime"), Some("End time is required"));
    }

    #[test]
    fn should_keep_insurance_tags_unique_and_join_them() {
        let mut form = complete_doctor_form();
        assert!(form.add_accepted_insurance("Polmed"));
        assert!(!form.add_accepted_insurance(" Polmed "));
        assert!(!form.add_accepted_insurance(""));
        assert!(form.add_accepted_insurance("Bankmed"));
        assert!(form.remove_accepted_insurance("Polmed"));
        assert!(!form.remove_accepted_insurance("Polmed"));
        form.add_accepted_insurance("Profmed");

        let payload = form.to_payload().unwrap();
        assert_eq!(payload["acceptedInsurance"], "Bankmed,Profmed");
        assert_eq!(payload["specializations"], json!(["2"]));
        assert_eq!(payload["agreeToTerms"], true);
    }

    #[test]
    fn should_prefill_from_existing_doctor() {
        let doctor: Doctor = serde_json::from_value(json!({
            "firstName": "Sipho",
            "lastName": "Dlamini",
            "telephone": "0821234567",
            "licenseNumber": "MP123",
            "specialization": "cardiology",
            "acceptedInsurance": "Polmed, Polmed, Bankmed",
            "clinicAddress": {"street": "1 Clinic Rd", "city": "Durban"},
            "hospitalAddress": {"street": "2 Hospital Rd", "city": "Durban"}
        }))
        .unwrap();
        let form = DoctorProfileForm::from_doctor(&doctor);
        assert_eq!(form.medical_license_number, "MP123");
        assert_eq!(form.phone_number, "0821234567");
        assert_eq!(form.accepted_insurance, vec!["Polmed", "Bankmed"]);
        assert_eq!(form.address.street, "2 Hospital Rd");
        assert_eq!(form.specializations.as_slice(), &["2".to_string()]);

        assert!(DoctorProfileForm::should_prefill(&doctor_user(4, true)));
        assert!(!DoctorProfileForm::should_prefill(&doctor_user(4, false)));
        assert!(!DoctorProfileForm::should_prefill(&patient_user(4, true)));
    }

    #[test]
    fn should_describe_steps_and_progress() {
        let mut wizard = Wizard::new(complete_doctor_form());
        assert_eq!(wizard.progress_percentage(), 20);
        assert_eq!(wizard.step_title(), "Basic Information");
        wizard.go_to_step(3).unwrap();
        assert_eq!(wizard.progress_percentage(), 60);
        assert_eq!(wizard.step_description(), "Add your educational background and certifications");
        assert_eq!(DoctorProfileForm::step_title(9), "");
    }

    #[test]
    fn should_toggle_consultation_types() {
        let mut form = DoctorProfileForm::default();
        form.toggle_consultation_type(ConsultationType::Virtual);
        form.toggle_consultation_type(ConsultationType::InPerson);
        form.toggle_consultation_type(ConsultationType::Virtual);
        assert_eq!(form.consultation_types.as_slice(), &[ConsultationType::InPerson]);
    }
}
