use std::fmt;

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_database::DbError;
use shared_models::error::AppError;
use shared_utils::validation::{
    validate_city, validate_email, validate_gender, validate_name, validate_optional,
    validate_password, validate_phone, validate_username,
};

pub const DOCTOR_TABLE: &str = "doctors";
pub const TIME_SLOT_TABLE: &str = "time_slot";

pub const DOCTOR_COLUMNS: &str = "user_id,username,email,city,is_active,timestamp,first_name,last_name,specialization,phone_number,gender,years_of_experience,consultation_fee";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub city: Option<String>,
    pub is_active: bool,
    pub timestamp: NaiveDateTime,
    pub first_name: String,
    pub last_name: String,
    pub specialization: String,
    pub phone_number: String,
    pub gender: String,
    pub years_of_experience: i32,
    pub consultation_fee: i32,
}

impl Doctor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Public summary used in chatbot suggestions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorSummary {
    pub first_name: String,
    pub last_name: String,
    pub specialization: String,
    pub years_of_experience: i32,
    pub consultation_fee: i32,
}

impl From<&Doctor> for DoctorSummary {
    fn from(doctor: &Doctor) -> Self {
        Self {
            first_name: doctor.first_name.clone(),
            last_name: doctor.last_name.clone(),
            specialization: doctor.specialization.clone(),
            years_of_experience: doctor.years_of_experience,
            consultation_fee: doctor.consultation_fee,
        }
    }
}

fn validate_experience(years: i32) -> Result<(), String> {
    if (1..=70).contains(&years) {
        Ok(())
    } else {
        Err("Years of experience must be between 1 and 70".to_string())
    }
}

fn validate_fee(fee: i32) -> Result<(), String> {
    if fee > 0 {
        Ok(())
    } else {
        Err("Consultation fee must be greater than 0".to_string())
    }
}

fn validate_specialization(value: &str) -> Result<(), String> {
    let len = value.trim().chars().count();
    if (3..=100).contains(&len) {
        Ok(())
    } else {
        Err("Specialization must be between 3 and 100 characters long".to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDoctorRequest {
    pub username: String,
    pub email: String,
    pub city: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub specialization: String,
    pub phone_number: String,
    pub gender: String,
    pub years_of_experience: i32,
    pub consultation_fee: i32,
}

impl CreateDoctorRequest {
    pub fn validate(&self) -> Result<(), String> {
        validate_username(&self.username)?;
        validate_email(&self.email)?;
        validate_city(&self.city)?;
        validate_password(&self.password)?;
        validate_name(&self.first_name)?;
        validate_name(&self.last_name)?;
        validate_specialization(&self.specialization)?;
        validate_phone(&self.phone_number)?;
        validate_gender(&self.gender)?;
        validate_experience(self.years_of_experience)?;
        validate_fee(self.consultation_fee)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDoctorRequest {
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub specialization: Option<String>,
    pub phone_number: Option<String>,
    pub gender: Option<String>,
    pub years_of_experience: Option<i32>,
    pub consultation_fee: Option<i32>,
    pub email: Option<String>,
    pub city: Option<String>,
}

impl UpdateDoctorRequest {
    pub fn validate(&self) -> Result<(), String> {
        validate_optional(self.password.as_deref(), validate_password)?;
        validate_optional(self.first_name.as_deref(), validate_name)?;
        validate_optional(self.last_name.as_deref(), validate_name)?;
        validate_optional(self.specialization.as_deref(), validate_specialization)?;
        validate_optional(self.phone_number.as_deref(), validate_phone)?;
        validate_optional(self.gender.as_deref(), validate_gender)?;
        validate_optional(self.email.as_deref(), validate_email)?;
        validate_optional(self.city.as_deref(), validate_city)?;
        self.years_of_experience.map_or(Ok(()), validate_experience)?;
        self.consultation_fee.map_or(Ok(()), validate_fee)?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct NewDoctorRow<'a> {
    pub username: &'a str,
    pub hashed_password: String,
    pub email: &'a str,
    pub city: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub specialization: &'a str,
    pub phone_number: &'a str,
    pub gender: &'a str,
    pub years_of_experience: i32,
    pub consultation_fee: i32,
    pub is_active: bool,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Default, Serialize)]
pub(crate) struct DoctorPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hashed_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years_of_experience: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consultation_fee: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SpecializationQuery {
    pub specialization: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Available,
    Booked,
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotStatus::Available => f.write_str("available"),
            SlotStatus::Booked => f.write_str("booked"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlot {
    pub time_slot_id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Option<Uuid>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: SlotStatus,
}

impl TimeSlot {
    /// `09:00 AM - 09:30 AM`
    pub fn display_range(&self) -> String {
        format!(
            "{} - {}",
            self.start_time.format("%I:%M %p"),
            self.end_time.format("%I:%M %p")
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTimeSlotRequest {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default = "default_slot_status")]
    pub status: SlotStatus,
}

fn default_slot_status() -> SlotStatus {
    SlotStatus::Available
}

impl CreateTimeSlotRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.end_time <= self.start_time {
            return Err("End time must be after start time".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct NewTimeSlotRow {
    pub doctor_id: Uuid,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: SlotStatus,
}

#[derive(Error, Debug)]
pub enum DoctorError {
    #[error("Doctor already exists")]
    AlreadyExists,

    #[error("Doctor not found")]
    NotFound,

    #[error("No doctors found for the given specialization: '{0}'")]
    NoneForSpecialization(String),

    #[error("Timeslot not found for doctor ID: {0}")]
    TimeSlotNotFound(Uuid),

    #[error("Time slot {0} does not exist")]
    UnknownTimeSlot(Uuid),

    #[error("{0}")]
    Validation(String),

    #[error("Failed to secure password")]
    PasswordHash,

    #[error(transparent)]
    Database(#[from] DbError),
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::AlreadyExists => AppError::Conflict(err.to_string()),
            DoctorError::NotFound
            | DoctorError::NoneForSpecialization(_)
            | DoctorError::TimeSlotNotFound(_)
            | DoctorError::UnknownTimeSlot(_) => AppError::NotFound(err.to_string()),
            DoctorError::Validation(msg) => AppError::ValidationError(msg),
            DoctorError::PasswordHash => AppError::Internal(err.to_string()),
            DoctorError::Database(db) => db.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_range_uses_twelve_hour_clock() {
        let slot = TimeSlot {
            time_slot_id: Uuid::nil(),
            doctor_id: Uuid::nil(),
            patient_id: None,
            start_time: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(14, 30, 0).unwrap(),
            status: SlotStatus::Available,
        };
        assert_eq!(slot.display_range(), "02:00 PM - 02:30 PM");
    }

    #[test]
    fn slot_must_end_after_it_starts() {
        let request = CreateTimeSlotRequest {
            start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            status: SlotStatus::Available,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn doctor_experience_and_fee_bounds() {
        let update = UpdateDoctorRequest {
            years_of_experience: Some(71),
            ..Default::default()
        };
        assert!(update.validate().is_err());

        let update = UpdateDoctorRequest {
            consultation_fee: Some(0),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }
}
