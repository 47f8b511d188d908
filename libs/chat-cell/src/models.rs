use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use appointment_cell::AppointmentError;
use doctor_cell::{DoctorError, DoctorSummary};
use prescription_cell::PrescriptionError;
use shared_models::error::AppError;

pub const CHATBOT_FAILURE: &str = "Failed to communicate with the chatbot.";

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub user_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctors: Option<Vec<DoctorSummary>>,
}

impl ChatResponse {
    pub fn text(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            doctors: None,
        }
    }
}

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("triage failed: {0}")]
    Triage(#[source] anyhow::Error),

    #[error(transparent)]
    Doctor(#[from] DoctorError),

    #[error(transparent)]
    Appointment(#[from] AppointmentError),

    #[error(transparent)]
    Prescription(#[from] PrescriptionError),
}

impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        error!("Error during chatbot response: {}", err);
        AppError::Internal(CHATBOT_FAILURE.to_string())
    }
}
