// lib/src/util/status_colors.rs
use models::{AppointmentStatus, PaymentStatus, PrescriptionStatus};

pub const DEFAULT_STATUS_COLOR: &str = "#7F8C8D";

pub fn appointment_status_color(status: &AppointmentStatus) -> &'static str {
    match status {
        AppointmentStatus::Scheduled => "#3B82F6",
        AppointmentStatus::Confirmed => "#10B981",
        AppointmentStatus::Completed => "#6B7280",
        AppointmentStatus::Cancelled => "#EF4444",
        AppointmentStatus::NoShow => "#F59E0B",
        AppointmentStatus::Rescheduled => "#F39C12",
        _ => DEFAULT_STATUS_COLOR,
    }
}

pub fn prescription_status_color(status: &PrescriptionStatus) -> &'static str {
    match status {
        PrescriptionStatus::Active => "#2ECC71",
        PrescriptionStatus::Filled => "#3498DB",
        PrescriptionStatus::Expired => "#E74C3C",
        PrescriptionStatus::Cancelled => "#95A5A6",
        _ => DEFAULT_STATUS_COLOR,
    }
}

pub fn payment_status_color(status: &PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Pending => "#F59E0B",
        PaymentStatus::Completed => "#10B981",
        PaymentStatus::Failed => "#EF4444",
        PaymentStatus::Refunded => "#6B7280",
        _ => DEFAULT_STATUS_COLOR,
    }
}
