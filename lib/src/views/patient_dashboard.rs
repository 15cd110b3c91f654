// lib/src/views/patient_dashboard.rs
use std::sync::Arc;
use log::{error, info};
use models::{Appointment, PortalResult};
use crate::services::{AppointmentService, ChatbotService};
use crate::session::SessionStore;
use super::chat_modal::ChatModal;

pub struct PatientDashboard {
    session: SessionStore,
    appointments: Arc<AppointmentService>,
    chatbot: Arc<ChatbotService>,
    upcoming: Vec<Appointment>,
    loading: bool,
    error: Option<String>,
    chat: Option<ChatModal>,
}

impl PatientDashboard {
    pub fn new(session: SessionStore, appointments: Arc<AppointmentService>, chatbot: Arc<ChatbotService>) -> Self {
        PatientDashboard {
            session,
            appointments,
            chatbot,
            upcoming: Vec::new(),
            loading: false,
            error: None,
            chat: None,
        }
    }

    /// Returns the redirect target when there is nobody signed in;
    /// otherwise loads the upcoming appointments.
    pub async fn init(&mut self) -> Option<String> {
        if !self.session.is_logged_in() {
            info!("Dashboard opened without a session");
            return Some("/login".to_string());
        }
        // Load failures are kept on the view and shown inline.
        let _ = self.load_upcoming().await;
        None
    }

    pub async fn load_upcoming(&mut self) -> PortalResult<&[Appointment]> {
        self.loading = true;
        self.error = None;
        let result = self.appointments.upcoming().await;
        self.loading = false;
        match result {
            Ok(list) => {
                self.upcoming = list;
                Ok(&self.upcoming)
            }
            Err(e) => {
                error!("Failed to load upcoming appointments: {}", e);
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    pub fn upcoming(&self) -> &[Appointment] {
        &self.upcoming
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn open_chat(&mut self) -> &mut ChatModal {
        let chatbot = self.chatbot.clone();
        self.chat.get_or_insert_with(|| ChatModal::new(chatbot))
    }

    pub fn chat(&mut self) -> Option<&mut ChatModal> {
        self.chat.as_mut()
    }

    pub fn is_chat_open(&self) -> bool {
        self.chat.is_some()
    }

    pub fn close_chat(&mut self) {
        if let Some(mut chat) = self.chat.take() {
            chat.close();
        }
    }
}
