// server/src/cli/mod.rs

pub mod cli;
pub mod commands;
pub mod handlers;

pub use cli::start_cli;
pub use commands::{AppointmentCommand, CliArgs, Commands, DoctorCommand, NotificationCommand, PrescriptionCommand};
pub use handlers::handle_command;
