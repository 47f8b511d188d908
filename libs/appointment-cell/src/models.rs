use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use doctor_cell::DoctorError;
use patient_cell::PatientError;
use shared_database::DbError;
use shared_models::error::AppError;

pub const APPOINTMENT_TABLE: &str = "appointment";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub appointment_id: Uuid,
    pub appointment_date: NaiveDate,
    pub is_active: bool,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookAppointmentRequest {
    pub appointment_date: NaiveDate,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub time_slot_id: Uuid,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub(crate) struct NewAppointmentRow {
    pub appointment_date: NaiveDate,
    pub is_active: bool,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
}

impl From<&BookAppointmentRequest> for NewAppointmentRow {
    fn from(request: &BookAppointmentRequest) -> Self {
        Self {
            appointment_date: request.appointment_date,
            is_active: request.is_active,
            patient_id: request.patient_id,
            doctor_id: request.doctor_id,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = AppointmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(AppointmentError::InvalidSortOrder(other.to_string())),
        }
    }
}

/// `?search=&sort_order=` on the doctor listings.
#[derive(Debug, Default, Deserialize)]
pub struct AppointmentFilter {
    pub search: Option<String>,
    pub sort_order: Option<String>,
}

impl AppointmentFilter {
    pub fn sort_order(&self) -> Result<SortOrder, AppointmentError> {
        self.sort_order
            .as_deref()
            .map_or(Ok(SortOrder::default()), str::parse)
    }

    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InactiveResult {
    pub appointment_id: Uuid,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InactiveResponse {
    pub message: String,
    pub result: InactiveResult,
}

#[derive(Error, Debug)]
pub enum AppointmentError {
    #[error("The selected time slot is unavailable.")]
    SlotUnavailable,

    #[error("Time slot not found for ID: {0}")]
    SlotNotFound(Uuid),

    #[error("Appointment with ID {0} not found.")]
    NotFound(Uuid),

    #[error("No appointments found for the specified doctor.")]
    NoneForDoctor,

    #[error("You do not have permission to mark this appointment as inactive.")]
    PermissionDenied,

    #[error("sort_order must be 'asc' or 'desc', got '{0}'")]
    InvalidSortOrder(String),

    #[error(transparent)]
    Doctor(#[from] DoctorError),

    #[error(transparent)]
    Patient(#[from] PatientError),

    #[error(transparent)]
    Database(#[from] DbError),
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::SlotUnavailable | AppointmentError::InvalidSortOrder(_) => {
                AppError::BadRequest(err.to_string())
            }
            AppointmentError::SlotNotFound(_)
            | AppointmentError::NotFound(_)
            | AppointmentError::NoneForDoctor => AppError::NotFound(err.to_string()),
            AppointmentError::PermissionDenied => AppError::Forbidden(err.to_string()),
            AppointmentError::Doctor(e) => e.into(),
            AppointmentError::Patient(e) => e.into(),
            AppointmentError::Database(db) => db.into(),
        }
    }
}
