// schema/src/rules.rs

use std::fmt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::constraints::FieldRule;
use crate::errors::SchemaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnforcementLevel {
    /// Blocks the transition and is raised as an alert.
    HardStop,
    /// Blocks the transition and is shown next to the field.
    Inline,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub path: String,
    pub message: String,
    pub enforcement_level: EnforcementLevel,
}

/// Outcome of running a `RuleSet`: every concrete field that was looked at,
/// plus the ones that failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub checked: Vec<String>,
    pub errors: Vec<FieldError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn message_for(&self, path: &str) -> Option<&str> {
        self.errors.iter().find(|e| e.path == path).map(|e| e.message.as_str())
    }

    pub fn blocking_message(&self) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.enforcement_level == EnforcementLevel::HardStop)
            .map(|e| e.message.as_str())
    }

    /// Hard stops win over inline errors.
    pub fn first_message(&self) -> Option<&str> {
        self.blocking_message().or_else(|| self.errors.first().map(|e| e.message.as_str()))
    }

    pub fn merge(&mut self, other: ValidationReport) {
        self.checked.extend(other.checked);
        self.errors.extend(other.errors);
    }

    pub fn into_result(self) -> Result<(), SchemaError> {
        match self.first_message() {
            None => Ok(()),
            Some(message) => Err(SchemaError::ConstraintViolation(message.to_string())),
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.len() {
            0 => write!(f, "all fields valid"),
            1 => write!(f, "{}", self.errors[0].message),
            n => write!(f, "{} ({} more field(s) need attention)", self.first_message().unwrap_or_default(), n - 1),
        }
    }
}

/// An ordered table of field rules, typically one per wizard step.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    pub name: String,
    rules: Vec<FieldRule>,
}

impl RuleSet {
    pub fn new(name: &str) -> Self {
        RuleSet { name: name.to_string(), rules: Vec::new() }
    }

    pub fn rule(mut self, rule: FieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn validate(&self, root: &Value) -> ValidationReport {
        let mut report = ValidationReport::default();
        for rule in &self.rules {
            let level = if rule.hard_stop { EnforcementLevel::HardStop } else { EnforcementLevel::Inline };
            for (path, failure) in rule.evaluate(root) {
                if let Some(message) = failure {
                    // one message per field; earlier rules take precedence
                    if report.message_for(&path).is_none() {
                        report.errors.push(FieldError { path: path.clone(), message, enforcement_level: level });
                    }
                }
                if !report.checked.contains(&path) {
                    report.checked.push(path);
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn terms_rules() -> RuleSet {
        RuleSet::new("final")
            .rule(FieldRule::new("bio").required())
            .rule(
                FieldRule::new("agreeToTerms")
                    .must_be_true()
                    .message("Please agree to the terms and conditions")
                    .hard_stop(),
            )
    }

    #[test]
    fn should_prefer_hard_stop_message() {
        let report = terms_rules().validate(&json!({"bio": "", "agreeToTerms": false}));
        assert!(!report.is_valid());
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.first_message(), Some("Please agree to the terms and conditions"));
        assert_eq!(report.message_for("bio"), Some("Bio is required"));
        assert_eq!(report.checked, vec!["bio".to_string(), "agreeToTerms".to_string()]);
    }

    #[test]
    fn should_pass_when_every_rule_holds() {
        let report = terms_rules().validate(&json!({"bio": "GP in Soweto", "agreeToTerms": true}));
        assert!(report.is_valid());
        assert_eq!(report.into_result(), Ok(()));
    }

    #[test]
    fn should_keep_first_error_per_field() {
        let rules = RuleSet::new("dup")
            .rule(FieldRule::new("email").required())
            .rule(FieldRule::new("email").email());
        let report = rules.validate(&json!({"email": ""}));
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.checked.len(), 1);
    }
}
