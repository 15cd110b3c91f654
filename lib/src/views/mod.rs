// lib/src/views/mod.rs
//! Screen-level state. Each view loads on init, holds what it fetched,
//! filters in memory and hands actions to the services. Navigation
//! targets come back as plain route strings.

pub mod booking_form;
pub mod chat_modal;
pub mod doctor_dashboard;
pub mod find_doctor;
pub mod patient_appointments;
pub mod patient_dashboard;
pub mod profile_setup;

pub use booking_form::BookingForm;
pub use chat_modal::{ChatEntry, ChatModal, Speaker, CHAT_GREETING};
pub use doctor_dashboard::{AppointmentTab, DoctorDashboard};
pub use find_doctor::FindDoctor;
pub use patient_appointments::{AppointmentsTab, PatientAppointments};
pub use patient_dashboard::PatientDashboard;
pub use profile_setup::{DoctorProfileSetup, PatientProfileSetup};
