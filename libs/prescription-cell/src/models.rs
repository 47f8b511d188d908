use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_database::DbError;
use shared_models::error::AppError;
use shared_utils::validation::validate_dosage;

pub const PRESCRIPTION_TABLE: &str = "prescription";
pub const REMINDER_TABLE: &str = "reminder";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prescription {
    pub prescription_id: Uuid,
    pub medication_name: String,
    pub dosage: String,
    pub frequency: i32,
    pub duration: i32,
    pub instructions: Option<String>,
    pub is_active: bool,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
}

fn validate_medication_name(name: &str) -> Result<(), String> {
    let len = name.chars().count();
    if (2..=100).contains(&len) {
        Ok(())
    } else {
        Err("Medication name must be between 2 and 100 characters long".to_string())
    }
}

fn validate_frequency(frequency: i32) -> Result<(), String> {
    if (1..=3).contains(&frequency) {
        Ok(())
    } else {
        Err("Frequency must be between 1 and 3 times per day".to_string())
    }
}

fn validate_duration(duration: i32) -> Result<(), String> {
    if (1..=30).contains(&duration) {
        Ok(())
    } else {
        Err("Duration must be between 1 and 30 days".to_string())
    }
}

fn validate_instructions(instructions: &str) -> Result<(), String> {
    if instructions.chars().count() <= 255 {
        Ok(())
    } else {
        Err("Instructions must be at most 255 characters long".to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePrescriptionRequest {
    pub medication_name: String,
    pub dosage: String,
    pub frequency: i32,
    pub duration: i32,
    pub instructions: Option<String>,
    pub patient_id: Uuid,
}

impl CreatePrescriptionRequest {
    pub fn validate(&self) -> Result<(), String> {
        validate_medication_name(&self.medication_name)?;
        validate_dosage(&self.dosage)?;
        validate_frequency(self.frequency)?;
        validate_duration(self.duration)?;
        if let Some(instructions) = self.instructions.as_deref() {
            validate_instructions(instructions)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UpdatePrescriptionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medication_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UpdatePrescriptionRequest {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = self.medication_name.as_deref() {
            validate_medication_name(name)?;
        }
        if let Some(dosage) = self.dosage.as_deref() {
            validate_dosage(dosage)?;
        }
        self.frequency.map_or(Ok(()), validate_frequency)?;
        self.duration.map_or(Ok(()), validate_duration)?;
        if let Some(instructions) = self.instructions.as_deref() {
            validate_instructions(instructions)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.medication_name.is_none()
            && self.dosage.is_none()
            && self.frequency.is_none()
            && self.duration.is_none()
            && self.instructions.is_none()
            && self.is_active.is_none()
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct NewPrescriptionRow<'a> {
    pub medication_name: &'a str,
    pub dosage: &'a str,
    pub frequency: i32,
    pub duration: i32,
    pub instructions: Option<&'a str>,
    pub is_active: bool,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReminderStatus {
    Active,
    Inactive,
}

impl fmt::Display for ReminderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReminderStatus::Active => f.write_str("Active"),
            ReminderStatus::Inactive => f.write_str("Inactive"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reminder {
    pub reminder_id: Uuid,
    pub prescription_id: Uuid,
    pub reminder_time: NaiveTime,
    pub reminder_date: Option<NaiveDate>,
    pub status: ReminderStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewReminderRow {
    pub prescription_id: Uuid,
    pub reminder_time: NaiveTime,
    pub reminder_date: Option<NaiveDate>,
    pub status: ReminderStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReminderFeed {
    pub reminders: Vec<String>,
}

#[derive(Error, Debug)]
pub enum PrescriptionError {
    #[error("Prescription not found for ID: {0}")]
    NotFound(Uuid),

    #[error("No reminders found for prescription ID: {0}")]
    NoReminders(Uuid),

    #[error("Unsupported frequency value: {0}")]
    UnsupportedFrequency(i32),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Database(#[from] DbError),
}

impl From<PrescriptionError> for AppError {
    fn from(err: PrescriptionError) -> Self {
        match err {
            PrescriptionError::NotFound(_) | PrescriptionError::NoReminders(_) => {
                AppError::NotFound(err.to_string())
            }
            PrescriptionError::UnsupportedFrequency(_) => AppError::ValidationError(err.to_string()),
            PrescriptionError::Validation(msg) => AppError::ValidationError(msg),
            PrescriptionError::Database(db) => db.into(),
        }
    }
}
