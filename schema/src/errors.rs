// schema/src/errors.rs
use thiserror::Error;

/// Error type for rule definitions and validation outcomes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A `Format` constraint was given a pattern that does not compile.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// Validation failed; carries the first message to show the user.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}
