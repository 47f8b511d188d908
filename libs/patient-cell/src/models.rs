use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_database::DbError;
use shared_models::error::AppError;
use shared_utils::validation::{
    validate_blood_group, validate_city, validate_email, validate_gender, validate_name,
    validate_optional, validate_password, validate_phone, validate_username,
};

pub const PATIENT_TABLE: &str = "patients";

/// Columns returned to clients. `hashed_password` never leaves the database.
pub const PATIENT_COLUMNS: &str = "user_id,username,email,city,is_active,timestamp,first_name,last_name,phone_number,dob,gender,blood_group,emergency_contact";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub city: Option<String>,
    pub is_active: bool,
    pub timestamp: NaiveDateTime,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub dob: NaiveDate,
    pub gender: String,
    pub blood_group: Option<String>,
    pub emergency_contact: Option<String>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePatientRequest {
    pub username: String,
    pub email: String,
    pub city: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub dob: NaiveDate,
    pub gender: String,
    pub blood_group: Option<String>,
    pub emergency_contact: Option<String>,
}

impl CreatePatientRequest {
    pub fn validate(&self) -> Result<(), String> {
        validate_username(&self.username)?;
        validate_email(&self.email)?;
        validate_city(&self.city)?;
        validate_password(&self.password)?;
        validate_name(&self.first_name)?;
        validate_name(&self.last_name)?;
        validate_phone(&self.phone_number)?;
        validate_gender(&self.gender)?;
        validate_optional(self.blood_group.as_deref(), validate_blood_group)?;
        validate_optional(self.emergency_contact.as_deref(), validate_phone)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePatientRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub city: Option<String>,
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    pub blood_group: Option<String>,
    pub emergency_contact: Option<String>,
}

impl UpdatePatientRequest {
    pub fn validate(&self) -> Result<(), String> {
        validate_optional(self.email.as_deref(), validate_email)?;
        validate_optional(self.password.as_deref(), validate_password)?;
        validate_optional(self.first_name.as_deref(), validate_name)?;
        validate_optional(self.last_name.as_deref(), validate_name)?;
        validate_optional(self.phone_number.as_deref(), validate_phone)?;
        validate_optional(self.city.as_deref(), validate_city)?;
        validate_optional(self.gender.as_deref(), validate_gender)?;
        validate_optional(self.blood_group.as_deref(), validate_blood_group)?;
        validate_optional(self.emergency_contact.as_deref(), validate_phone)?;
        Ok(())
    }
}

/// Row written on registration.
#[derive(Debug, Serialize)]
pub(crate) struct NewPatientRow<'a> {
    pub username: &'a str,
    pub hashed_password: String,
    pub email: &'a str,
    pub city: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub phone_number: &'a str,
    pub dob: NaiveDate,
    pub gender: &'a str,
    pub blood_group: Option<&'a str>,
    pub emergency_contact: Option<&'a str>,
    pub is_active: bool,
    pub timestamp: NaiveDateTime,
}

/// Partial update body. Absent fields are left untouched.
#[derive(Debug, Default, Serialize)]
pub(crate) struct PatientPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hashed_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<String>,
}

impl PatientPatch {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.hashed_password.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.phone_number.is_none()
            && self.city.is_none()
            && self.dob.is_none()
            && self.gender.is_none()
            && self.blood_group.is_none()
            && self.emergency_contact.is_none()
    }
}

#[derive(Error, Debug)]
pub enum PatientError {
    #[error("Patient already exists")]
    AlreadyExists,

    #[error("Patient not found")]
    NotFound,

    #[error("Patient not found with ID: {0}")]
    NotFoundWithId(Uuid),

    #[error("{0}")]
    Validation(String),

    #[error("Failed to secure password")]
    PasswordHash,

    #[error(transparent)]
    Database(#[from] DbError),
}

impl From<PatientError> for AppError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::AlreadyExists => AppError::Conflict(err.to_string()),
            PatientError::NotFound | PatientError::NotFoundWithId(_) => {
                AppError::NotFound(err.to_string())
            }
            PatientError::Validation(msg) => AppError::ValidationError(msg),
            PatientError::PasswordHash => AppError::Internal(err.to_string()),
            PatientError::Database(db) => db.into(),
        }
    }
}
