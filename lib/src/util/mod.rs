// lib/src/util/mod.rs
//! Deterministic helpers shared by the forms and view models. Nothing here
//! performs I/O; anything time-dependent takes `today`/`now` explicitly.

pub mod formatting;
pub mod health_metrics;
pub mod sa_id;
pub mod status_colors;

pub use formatting::{
    format_appointment_date, format_appointment_datetime, format_appointment_time, format_currency,
    format_phone_number,
};
pub use health_metrics::{age_on, bmi, bmi_category};
pub use sa_id::{extract_sa_id_info, validate_sa_id_number, Citizenship, Gender, SaIdInfo};
pub use status_colors::{appointment_status_color, payment_status_color, prescription_status_color, DEFAULT_STATUS_COLOR};
