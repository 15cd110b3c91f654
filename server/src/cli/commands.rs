// server/src/cli/commands.rs
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "healthease", version, about = "HealthEase patient and doctor portal client")]
pub struct CliArgs {
    /// Config file (YAML or TOML); defaults to healthease.yaml when present
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Clone)]
pub enum Commands {
    /// Sign in and persist the session
    Login { username: String, password: String },
    /// Clear the persisted session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Resolve a portal URL through the route guard
    Navigate { url: String },
    #[command(subcommand)]
    Appointments(AppointmentCommand),
    #[command(subcommand)]
    Doctors(DoctorCommand),
    #[command(subcommand)]
    Prescriptions(PrescriptionCommand),
    #[command(subcommand)]
    Notifications(NotificationCommand),
    /// Ask the AI assistant
    Chat {
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
    /// Decode a South African ID number
    IdNumber { id: String },
    /// Body-mass index from height and weight
    Bmi { height_cm: f64, weight_kg: f64 },
}

#[derive(Subcommand, Debug, PartialEq, Clone)]
pub enum AppointmentCommand {
    Upcoming,
    Past,
    List {
        #[arg(long)] status: Option<String>,
    },
    Cancel {
        id: String,
        #[arg(long)] reason: Option<String>,
    },
    /// Free slots for a doctor on a date (YYYY-MM-DD)
    Slots { doctor: String, date: NaiveDate },
}

#[derive(Subcommand, Debug, PartialEq, Clone)]
pub enum DoctorCommand {
    List,
    Search {
        #[arg(long)] name: Option<String>,
        #[arg(long)] specialty: Option<String>,
        #[arg(long)] practice: Option<String>,
    },
}

#[derive(Subcommand, Debug, PartialEq, Clone)]
pub enum PrescriptionCommand {
    List,
    Active,
}

#[derive(Subcommand, Debug, PartialEq, Clone)]
pub enum NotificationCommand {
    List,
    Read { id: String },
    ReadAll,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_nested_subcommands() {
        let args = CliArgs::try_parse_from([
            "healthease", "--config", "staging.yaml", "appointments", "cancel", "42", "--reason", "Travel",
        ])
        .unwrap();
        assert_eq!(args.config.as_deref(), Some("staging.yaml"));
        assert_eq!(
            args.command,
            Commands::Appointments(AppointmentCommand::Cancel { id: "42".into(), reason: Some("Travel".into()) })
        );
    }

    #[test]
    fn should_join_chat_words_and_parse_dates() {
        let args = CliArgs::try_parse_from(["healthease", "chat", "I", "have", "a", "cough"]).unwrap();
        assert_eq!(args.command, Commands::Chat { message: vec!["I".into(), "have".into(), "a".into(), "cough".into()] });

        let args = CliArgs::try_parse_from(["healthease", "appointments", "slots", "11", "2025-03-10"]).unwrap();
        assert_eq!(
            args.command,
            Commands::Appointments(AppointmentCommand::Slots {
                doctor: "11".into(),
                date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            })
        );
        assert!(CliArgs::try_parse_from(["healthease", "chat"]).is_err());
    }
}
