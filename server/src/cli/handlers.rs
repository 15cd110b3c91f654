// server/src/cli/handlers.rs
use anyhow::{Context, Result};
use chrono::Local;
use lib::guard::Navigation;
use lib::util::{bmi, bmi_category, extract_sa_id_info, format_appointment_datetime, validate_sa_id_number};
use lib::Portal;
use log::debug;
use models::{Appointment, DoctorSearchFilters, LoginRequest, PrescriptionFilter};
use serde::Serialize;
use serde_yaml2 as serde_yaml;
use super::commands::{AppointmentCommand, Commands, DoctorCommand, NotificationCommand, PrescriptionCommand};

fn print_yaml<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_yaml::to_string(value).context("Failed to render output as YAML")?;
    println!("{}", rendered.trim_end());
    Ok(())
}

fn print_appointments(appointments: &[Appointment]) {
    if appointments.is_empty() {
        println!("No appointments.");
        return;
    }
    for appointment in appointments {
        let who = appointment.doctor_name.as_deref().unwrap_or("-");
        println!(
            "{:<8} {:<28} {:<12} {}",
            appointment.id,
            format_appointment_datetime(appointment),
            appointment.status.label(),
            who
        );
    }
}

pub async fn handle_command(portal: &Portal, command: Commands) -> Result<()> {
    debug!("Dispatching {:?}", command);
    match command {
        Commands::Login { username, password } => handle_login(portal, username, password).await,
        Commands::Logout => {
            portal.auth.logout().await;
            println!("Signed out.");
            Ok(())
        }
        Commands::Whoami => match portal.session.current_user() {
            Some(user) => print_yaml(&user),
            None => {
                println!("Not signed in.");
                Ok(())
            }
        },
        Commands::Navigate { url } => {
            match portal.navigator.navigate(&url).await {
                Navigation::Rendered(route) => println!("{}", route.path()),
                Navigation::Redirected(target) => println!("redirect -> {}", target),
            }
            Ok(())
        }
        Commands::Appointments(action) => handle_appointments(portal, action).await,
        Commands::Doctors(action) => handle_doctors(portal, action).await,
        Commands::Prescriptions(action) => handle_prescriptions(portal, action).await,
        Commands::Notifications(action) => handle_notifications(portal, action).await,
        Commands::Chat { message } => {
            let mut chat = portal.chat();
            if let Some(reply) = chat.send(&message.join(" ")).await? {
                println!("{}", reply.message);
            }
            Ok(())
        }
        Commands::IdNumber { id } => {
            if !validate_sa_id_number(&id) {
                anyhow::bail!("{} is not a valid South African ID number", id);
            }
            match extract_sa_id_info(&id, Local::now().date_naive()) {
                Some(info) => print_yaml(&info),
                None => anyhow::bail!("Could not decode {}", id),
            }
        }
        Commands::Bmi { height_cm, weight_kg } => {
            let value = bmi(Some(height_cm), Some(weight_kg));
            println!("{:.1} ({})", value, bmi_category(value));
            Ok(())
        }
    }
}

async fn handle_login(portal: &Portal, username: String, password: String) -> Result<()> {
    let outcome = portal
        .auth
        .login(&LoginRequest::new(username, password))
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    if let Some(message) = outcome.message {
        println!("{}", message);
    }
    println!("Signed in as {} ({})", outcome.session.user.display_name(), outcome.session.role());
    println!("Next: {}", outcome.landing_route);
    Ok(())
}

async fn handle_appointments(portal: &Portal, action: AppointmentCommand) -> Result<()> {
    match action {
        AppointmentCommand::Upcoming => print_appointments(&portal.appointments.upcoming().await?),
        AppointmentCommand::Past => print_appointments(&portal.appointments.past().await?),
        AppointmentCommand::List { status } => {
            print_appointments(&portal.appointments.list(status.as_deref()).await?)
        }
        AppointmentCommand::Cancel { id, reason } => {
            let cancelled = portal.appointments.cancel(&id, reason).await?;
            println!("Appointment {} is now {}", cancelled.id, cancelled.status.label());
        }
        AppointmentCommand::Slots { doctor, date } => {
            let slots = portal.appointments.available_slots(&doctor, date).await?;
            print_yaml(&slots)?;
        }
    }
    Ok(())
}

async fn handle_doctors(portal: &Portal, action: DoctorCommand) -> Result<()> {
    let mut view = portal.find_doctor();
    match action {
        DoctorCommand::List => {
            view.load_all().await?;
        }
        DoctorCommand::Search { name, specialty, practice } => {
            view.filters = DoctorSearchFilters {
                name: name.unwrap_or_default(),
                specialty: specialty.unwrap_or_default(),
                practice_name: practice.unwrap_or_default(),
            };
            view.search().await?;
        }
    }
    for doctor in view.doctors() {
        println!(
            "{:<6} {:<30} {}",
            doctor.id.as_deref().unwrap_or("-"),
            doctor.display_name(),
            doctor.specialization.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

async fn handle_prescriptions(portal: &Portal, action: PrescriptionCommand) -> Result<()> {
    let prescriptions = match action {
        PrescriptionCommand::List => portal.patients.prescriptions(&PrescriptionFilter::default()).await?,
        PrescriptionCommand::Active => portal.prescriptions.active().await?,
    };
    print_yaml(&prescriptions)
}

async fn handle_notifications(portal: &Portal, action: NotificationCommand) -> Result<()> {
    let notifications = match action {
        NotificationCommand::List => portal.notifications.list().await?,
        NotificationCommand::Read { id } => portal.notifications.mark_read(&id).await?,
        NotificationCommand::ReadAll => portal.notifications.mark_all_read().await?,
    };
    print_yaml(&notifications)?;
    println!("Unread: {}", portal.notifications.unread_snapshot());
    Ok(())
}
