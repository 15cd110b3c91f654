// models/src/lib.rs

pub mod envelope;
pub mod errors;
pub mod util;

pub mod medical;

pub use envelope::ApiEnvelope;
pub use errors::{ErrorKind, PortalError, PortalResult, ValidationError, ValidationResult};
pub use medical::*;
