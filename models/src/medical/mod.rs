// models/src/medical/mod.rs
pub mod address;
pub mod appointment;
pub mod auth;
pub mod catalog;
pub mod chat;
pub mod doctor;
pub mod insurance;
pub mod medical_record;
pub mod notification;
pub mod patient;
pub mod payment;
pub mod prescription;
pub mod user;

pub use address::Address;
pub use appointment::{
    Appointment, AppointmentStatus, AppointmentType, BookingRequest, CancelRequest,
    RescheduleRequest, TimeSlot,
};
pub use auth::{AuthResponse, LoginRequest, RegisterRequest};
pub use catalog::ConsultationType;
pub use chat::{ChatMessage, ChatMessageRequest, ChatSessionHandle, ChatbotResponse};
pub use doctor::{Doctor, DoctorSearchFilters};
pub use insurance::{InsuranceInfo, InsurancePolicy, SecondaryInsurance};
pub use medical_record::{MedicalRecord, MedicalRecordFilter, MedicalRecordSummary};
pub use notification::{Notification, UnreadCount};
pub use patient::{
    EmergencyContact, MedicalHistory, MedicalItem, PatientPreferences, PatientProfile,
    VaccinationStatus,
};
pub use payment::{Payment, PaymentRequest, PaymentStatus};
pub use prescription::{Prescription, PrescriptionFilter, PrescriptionStatus};
pub use user::{Role, Session, User};
