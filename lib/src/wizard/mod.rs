// lib/src/wizard/mod.rs
//! Multi-step form state machine.
//!
//! A form is a plain serde struct; each step owns a `RuleSet` keyed by the
//! camelCase field paths of the serialised form. The wizard tracks which
//! fields have been looked at, the last errors per field and the alert to
//! show, and only moves forward when the steps behind it validate.

use std::collections::{BTreeMap, BTreeSet};
use models::{PortalError, PortalResult, ValidationError};
use schema::{RuleSet, ValidationReport};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use crate::services::validation_failure;

pub mod doctor_profile;
pub mod form_array;
pub mod patient_profile;

pub use doctor_profile::{Certification, DoctorProfileForm, Education, WorkingHours};
pub use form_array::FormArray;
pub use patient_profile::{MedicalHistoryForm, PatientProfileForm, PersonalInfo, PATIENT_PROFILE_DRAFT_KEY};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum WizardError {
    #[error("step {step}: {report}")]
    Validation { step: u32, report: ValidationReport },
    #[error("step {0} does not exist")]
    StepOutOfRange(u32),
    #[error("{0}")]
    MinimumEntries(String),
    #[error(transparent)]
    Portal(#[from] PortalError),
}

impl WizardError {
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            WizardError::Validation { report, .. } => Some(report),
            _ => None,
        }
    }

    /// The message an alert would show.
    pub fn message(&self) -> String {
        match self {
            WizardError::Validation { report, .. } => {
                report.first_message().unwrap_or("Please fill in all required fields.").to_string()
            }
            WizardError::Portal(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

impl From<WizardError> for PortalError {
    fn from(err: WizardError) -> Self {
        match err {
            WizardError::Validation { report, .. } => validation_failure(&report),
            WizardError::StepOutOfRange(step) => PortalError::InvalidRequest(format!("step {} does not exist", step)),
            WizardError::MinimumEntries(message) => PortalError::Validation(ValidationError::Blocking(message)),
            WizardError::Portal(e) => e,
        }
    }
}

pub trait WizardForm: Serialize {
    const TOTAL_STEPS: u32;

    /// Rules for a step; `None` outside `1..=TOTAL_STEPS`.
    fn step_rules(step: u32) -> Option<&'static RuleSet>;

    fn step_title(step: u32) -> &'static str;

    fn step_description(step: u32) -> &'static str;

    /// Body of the update call. Defaults to the form itself.
    fn to_payload(&self) -> PortalResult<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

pub struct Wizard<F: WizardForm> {
    form: F,
    current_step: u32,
    touched: BTreeSet<String>,
    errors: BTreeMap<String, String>,
    blocking_message: Option<String>,
    submitting: bool,
}

impl<F: WizardForm> Wizard<F> {
    pub fn new(form: F) -> Self {
        Wizard {
            form,
            current_step: 1,
            touched: BTreeSet::new(),
            errors: BTreeMap::new(),
            blocking_message: None,
            submitting: false,
        }
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut F {
        &mut self.form
    }

    pub fn into_form(self) -> F {
        self.form
    }

    pub fn current_step(&self) -> u32 {
        self.current_step
    }

    pub fn total_steps(&self) -> u32 {
        F::TOTAL_STEPS
    }

    pub fn is_last_step(&self) -> bool {
        self.current_step == F::TOTAL_STEPS
    }

    pub fn step_title(&self) -> &'static str {
        F::step_title(self.current_step)
    }

    pub fn step_description(&self) -> &'static str {
        F::step_description(self.current_step)
    }

    pub fn progress_percentage(&self) -> u32 {
        ((self.current_step as f64 / F::TOTAL_STEPS as f64) * 100.0).round() as u32
    }

    pub fn is_touched(&self, path: &str) -> bool {
        self.touched.contains(path)
    }

    /// Errors are only shown for fields the user has been through.
    pub fn field_error(&self, path: &str) -> Option<&str> {
        if !self.is_touched(path) {
            return None;
        }
        self.errors.get(path).map(String::as_str)
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn blocking_message(&self) -> Option<&str> {
        self.blocking_message.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Runs a step's rules without touching any wizard state.
    pub fn check_step(&self, step: u32) -> Result<ValidationReport, WizardError> {
        let rules = F::step_rules(step).ok_or(WizardError::StepOutOfRange(step))?;
        let snapshot = serde_json::to_value(&self.form).map_err(PortalError::from)?;
        Ok(rules.validate(&snapshot))
    }

    fn record(&mut self, report: &ValidationReport) {
        self.touched.extend(report.checked.iter().cloned());
        self.errors = report
            .errors
            .iter()
            .map(|e| (e.path.clone(), e.message.clone()))
            .collect();
        self.blocking_message = report.blocking_message().map(str::to_string);
    }

    pub fn validate_step(&mut self, step: u32) -> Result<(), WizardError> {
        let report = self.check_step(step)?;
        self.record(&report);
        if report.is_valid() {
            Ok(())
        } else {
            Err(WizardError::Validation { step, report })
        }
    }

    pub fn validate_current_step(&mut self) -> Result<(), WizardError> {
        self.validate_step(self.current_step)
    }

    /// Moves forward by one when the current step is valid. Stays put on the last step.
    pub fn next_step(&mut self) -> Result<u32, WizardError> {
        self.validate_current_step()?;
        if self.current_step < F::TOTAL_STEPS {
            self.current_step += 1;
        }
        Ok(self.current_step)
    }

    pub fn previous_step(&mut self) -> u32 {
        if self.current_step > 1 {
            self.current_step -= 1;
        }
        self.current_step
    }

    /// Backward jumps are free. A forward jump needs every earlier step to
    /// validate; on the first failure nothing changes.
    pub fn go_to_step(&mut self, step: u32) -> Result<u32, WizardError> {
        if step < 1 || step > F::TOTAL_STEPS {
            return Err(WizardError::StepOutOfRange(step));
        }
        if step > self.current_step {
            for earlier in 1..step {
                let report = self.check_step(earlier)?;
                if !report.is_valid() {
                    return Err(WizardError::Validation { step: earlier, report });
                }
            }
        }
        self.current_step = step;
        Ok(step)
    }

    /// Validates every step. On success the wizard is marked as submitting
    /// and the payload returned; on failure every field is marked touched.
    pub fn prepare_submission(&mut self) -> Result<Value, WizardError> {
        let mut combined = ValidationReport::default();
        let mut first_failing = None;
        for step in 1..=F::TOTAL_STEPS {
            let report = self.check_step(step)?;
            if first_failing.is_none() && !report.is_valid() {
                first_failing = Some(step);
            }
            combined.merge(report);
        }
        self.record(&combined);

        if let Some(step) = first_failing {
            self.blocking_message = combined.first_message().map(str::to_string);
            return Err(WizardError::Validation { step, report: combined });
        }

        let payload = self.form.to_payload()?;
        self.submitting = true;
        Ok(payload)
    }

    pub fn submission_failed(&mut self, error: &PortalError) {
        self.submitting = false;
        self.blocking_message = Some(error.user_message());
    }

    pub fn submission_succeeded(&mut self) {
        self.submitting = false;
        self.blocking_message = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use proptest::prelude::*;
    use schema::FieldRule;

    #[derive(Debug, Clone, Default, Serialize)]
    #[serde(rename_all = "camelCase")]
    struct ThreeStepForm {
        name: String,
        city: String,
        agree_to_terms: bool,
    }

    static STEPS: Lazy<Vec<RuleSet>> = Lazy::new(|| {
        vec![
            RuleSet::new("name").rule(FieldRule::new("name").required()),
            RuleSet::new("city").rule(FieldRule::new("city").required()),
            RuleSet::new("terms").rule(
                FieldRule::new("agreeToTerms")
                    .must_be_true()
                    .message("Please agree to the terms and conditions")
                    .hard_stop(),
            ),
        ]
    });

    impl WizardForm for ThreeStepForm {
        const TOTAL_STEPS: u32 = 3;

        fn step_rules(step: u32) -> Option<&'static RuleSet> {
            step.checked_sub(1).and_then(|i| STEPS.get(i as usize))
        }

        fn step_title(step: u32) -> &'static str {
            ["Name", "City", "Terms"].get(step.saturating_sub(1) as usize).copied().unwrap_or("")
        }

        fn step_description(_step: u32) -> &'static str {
            ""
        }
    }

    fn filled() -> ThreeStepForm {
        ThreeStepForm { name: "Thandi".into(), city: "Durban".into(), agree_to_terms: true }
    }

    #[test]
    fn should_stay_on_invalid_step_and_record_errors() {
        let mut wizard = Wizard::new(ThreeStepForm::default());
        let err = wizard.next_step().unwrap_err();
        assert!(matches!(err, WizardError::Validation { step: 1, .. }));
        assert_eq!(wizard.current_step(), 1);
        assert_eq!(wizard.field_error("name"), Some("Name is required"));
        assert!(!wizard.is_touched("city"));

        wizard.form_mut().name = "Thandi".into();
        assert_eq!(wizard.next_step().unwrap(), 2);
        assert_eq!(wizard.field_error("name"), None);
        assert_eq!(wizard.step_title(), "City");
    }

    #[test]
    fn should_clamp_at_both_ends() {
        let mut wizard = Wizard::new(filled());
        assert_eq!(wizard.previous_step(), 1);
        wizard.next_step().unwrap();
        wizard.next_step().unwrap();
        assert_eq!(wizard.next_step().unwrap(), 3);
        assert!(wizard.is_last_step());
        assert_eq!(wizard.progress_percentage(), 100);
    }

    #[test]
    fn should_revalidate_every_earlier_step_on_forward_jump() {
        let mut wizard = Wizard::new(ThreeStepForm { name: "Thandi".into(), ..Default::default() });
        let err = wizard.go_to_step(3).unwrap_err();
        assert!(matches!(err, WizardError::Validation { step: 2, .. }));
        assert_eq!(wizard.current_step(), 1);
        assert!(wizard.errors().is_empty());
        assert!(matches!(wizard.go_to_step(4), Err(WizardError::StepOutOfRange(4))));
        assert!(matches!(wizard.go_to_step(0), Err(WizardError::StepOutOfRange(0))));

        wizard.form_mut().city = "Durban".into();
        assert_eq!(wizard.go_to_step(3).unwrap(), 3);
        assert_eq!(wizard.go_to_step(1).unwrap(), 1);
    }

    #[test]
    fn should_block_submission_with_hard_stop_message() {
        let mut wizard = Wizard::new(ThreeStepForm { agree_to_terms: false, ..filled() });
        let err = wizard.prepare_submission().unwrap_err();
        assert_eq!(err.message(), "Please agree to the terms and conditions");
        assert_eq!(wizard.blocking_message(), Some("Please agree to the terms and conditions"));
        assert!(!wizard.is_submitting());
        assert!(wizard.is_touched("name"));

        wizard.form_mut().agree_to_terms = true;
        let payload = wizard.prepare_submission().unwrap();
        assert_eq!(payload["agreeToTerms"], true);
        assert!(wizard.is_submitting());
        assert_eq!(wizard.blocking_message(), None);
    }

    #[test]
    fn should_keep_form_and_surface_message_when_submission_fails() {
        let mut wizard = Wizard::new(filled());
        wizard.prepare_submission().unwrap();
        wizard.submission_failed(&PortalError::Http { status: 500, message: "boom".into() });
        assert!(!wizard.is_submitting());
        assert_eq!(wizard.blocking_message(), Some("Something went wrong. Please try again."));
        assert_eq!(wizard.form().name, "Thandi");
    }

    #[test]
    fn should_convert_into_portal_errors() {
        let mut wizard = Wizard::new(ThreeStepForm::default());
        let err: PortalError = wizard.next_step().unwrap_err().into();
        assert_eq!(err, PortalError::Validation(ValidationError::field("name", "Name is required")));
        let err: PortalError = WizardError::MinimumEntries("At least one".into()).into();
        assert_eq!(err, PortalError::Validation(ValidationError::Blocking("At least one".into())));
    }

    proptest! {
        #[test]
        fn next_step_never_skips(name in "[a-z]{0,3}", city in "[a-z]{0,3}", presses in 1usize..6) {
            let mut wizard = Wizard::new(ThreeStepForm { name, city, agree_to_terms: true });
            for _ in 0..presses {
                let before = wizard.current_step();
                let valid = wizard.check_step(before).unwrap().is_valid();
                match wizard.next_step() {
                    Ok(after) => {
                        prop_assert!(valid);
                        prop_assert_eq!(after, (before + 1).min(3));
                    }
                    Err(_) => {
                        prop_assert!(!valid);
                        prop_assert_eq!(wizard.current_step(), before);
                    }
                }
            }
        }
    }
}
