// schema/src/lib.rs
//! Declarative validation for nested form values.
//!
//! Forms are serialised to JSON and checked against a table of `FieldRule`s
//! keyed by dotted field path. Rules never mutate the form.

pub mod constraints;
pub mod errors;
pub mod rules;

pub use constraints::{is_blank, resolve, Constraint, CustomCheck, FieldRule, EMAIL_RE};
pub use errors::SchemaError;
pub use rules::{EnforcementLevel, FieldError, RuleSet, ValidationReport};
