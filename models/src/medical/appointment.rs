// models/src/medical/appointment.rs
use std::fmt;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use crate::util::{lenient_date, opt_string_or_number, string_or_number};

/// Lifecycle status. Transitions happen on the server; the client only reads them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Scheduled,
    Confirmed,
    Rescheduled,
    Completed,
    Cancelled,
    NoShow,
    Unknown(String),
}

impl AppointmentStatus {
    pub fn as_wire(&self) -> &str {
        match self {
            AppointmentStatus::Pending => "PENDING",
            AppointmentStatus::Scheduled => "SCHEDULED",
            AppointmentStatus::Confirmed => "CONFIRMED",
            AppointmentStatus::Rescheduled => "RESCHEDULED",
            AppointmentStatus::Completed => "COMPLETED",
            AppointmentStatus::Cancelled => "CANCELLED",
            AppointmentStatus::NoShow => "NO_SHOW",
            AppointmentStatus::Unknown(raw) => raw,
        }
    }

    pub fn label(&self) -> String {
        match self {
            AppointmentStatus::NoShow => "No Show".to_string(),
            AppointmentStatus::Unknown(raw) => raw.clone(),
            other => {
                let wire = other.as_wire().to_ascii_lowercase();
                let mut chars = wire.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                    None => String::new(),
                }
            }
        }
    }
}

impl From<String> for AppointmentStatus {
    fn from(raw: String) -> Self {
        let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "pending" => AppointmentStatus::Pending,
            "scheduled" => AppointmentStatus::Scheduled,
            "confirmed" => AppointmentStatus::Confirmed,
            "rescheduled" => AppointmentStatus::Rescheduled,
            "completed" => AppointmentStatus::Completed,
            "cancelled" | "canceled" => AppointmentStatus::Cancelled,
            "no_show" | "noshow" => AppointmentStatus::NoShow,
            _ => AppointmentStatus::Unknown(raw),
        }
    }
}

impl From<&str> for AppointmentStatus {
    fn from(raw: &str) -> Self {
        AppointmentStatus::from(raw.to_string())
    }
}

impl From<AppointmentStatus> for String {
    fn from(status: AppointmentStatus) -> Self {
        status.as_wire().to_string()
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentType {
    #[serde(alias = "INITIAL")]
    Initial,
    #[serde(alias = "FOLLOW_UP", alias = "follow-up")]
    FollowUp,
    #[serde(alias = "EMERGENCY")]
    Emergency,
    #[serde(alias = "VIRTUAL")]
    Virtual,
}

impl AppointmentType {
    pub const ALL: [AppointmentType; 4] = [
        AppointmentType::Initial,
        AppointmentType::FollowUp,
        AppointmentType::Emergency,
        AppointmentType::Virtual,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentType::Initial => "initial",
            AppointmentType::FollowUp => "follow_up",
            AppointmentType::Emergency => "emergency",
            AppointmentType::Virtual => "virtual",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
        AppointmentType::ALL.into_iter().find(|t| t.as_str() == normalized)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(alias = "appointmentId", deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub patient_id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub doctor_id: String,
    #[serde(alias = "scheduledDateTime", with = "lenient_date")]
    pub appointment_date: NaiveDate,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default, rename = "type", alias = "appointmentType")]
    pub appointment_type: Option<AppointmentType>,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub fee: Option<f64>,
    #[serde(default)]
    pub doctor_name: Option<String>,
    #[serde(default)]
    pub patient_name: Option<String>,
}

pub fn parse_clock(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

impl Appointment {
    /// Start instant; a missing or malformed start time counts as midnight.
    pub fn starts_at(&self) -> NaiveDateTime {
        let time = parse_clock(&self.start_time).unwrap_or(NaiveTime::MIN);
        self.appointment_date.and_time(time)
    }

    pub fn hours_until(&self, now: NaiveDateTime) -> f64 {
        (self.starts_at() - now).num_seconds() as f64 / 3600.0
    }

    pub fn is_upcoming(&self, now: NaiveDateTime) -> bool {
        self.starts_at() > now
    }

    pub fn can_cancel(&self, now: NaiveDateTime) -> bool {
        self.status == AppointmentStatus::Scheduled && self.hours_until(now) > 24.0
    }

    pub fn can_reschedule(&self, now: NaiveDateTime) -> bool {
        self.status == AppointmentStatus::Scheduled && self.hours_until(now) > 48.0
    }
}

fn default_booking_status() -> AppointmentStatus {
    AppointmentStatus::Confirmed
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub doctor_id: String,
    pub patient_id: String,
    #[serde(with = "lenient_date")]
    pub appointment_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    pub reason: String,
    pub appointment_type: AppointmentType,
    #[serde(default = "default_booking_status")]
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleRequest {
    #[serde(with = "lenient_date")]
    pub appointment_date: NaiveDate,
    pub start_time: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CancelRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub start_time: String,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default = "slot_available")]
    pub available: bool,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub doctor_id: Option<String>,
}

fn slot_available() -> bool {
    true
}
