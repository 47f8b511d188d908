use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_database::DbError;
use shared_models::error::AppError;
use shared_utils::validation::{
    validate_city, validate_email, validate_optional, validate_password, validate_username,
};

pub const ADMIN_TABLE: &str = "admins";

pub const ADMIN_COLUMNS: &str = "user_id,username,email,city,is_active,timestamp";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admin {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub city: Option<String>,
    pub is_active: bool,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAdminRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub city: Option<String>,
}

impl CreateAdminRequest {
    pub fn validate(&self) -> Result<(), String> {
        validate_username(&self.username)?;
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        validate_optional(self.city.as_deref(), validate_city)?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct NewAdminRow<'a> {
    pub username: &'a str,
    pub hashed_password: String,
    pub email: &'a str,
    pub city: Option<&'a str>,
    pub is_active: bool,
    pub timestamp: NaiveDateTime,
}

/// `?search=` on the people listings.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

impl SearchQuery {
    pub fn term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("Admin already exists")]
    AlreadyExists,

    #[error("{0}")]
    Validation(String),

    #[error("Failed to secure password")]
    PasswordHash,

    #[error(transparent)]
    Database(#[from] DbError),
}

impl From<AdminError> for AppError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::AlreadyExists => AppError::Conflict(err.to_string()),
            AdminError::Validation(msg) => AppError::ValidationError(msg),
            AdminError::PasswordHash => AppError::Internal(err.to_string()),
            AdminError::Database(db) => db.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateAdminRequest {
        CreateAdminRequest {
            username: "root_admin".to_string(),
            email: "root@example.com".to_string(),
            password: "Adm1n#Pass".to_string(),
            city: None,
        }
    }

    #[test]
    fn city_is_optional() {
        assert!(request().validate().is_ok());

        let bad_city = CreateAdminRequest {
            city: Some("Lahore 42".to_string()),
            ..request()
        };
        assert!(bad_city.validate().is_err());
    }

    #[test]
    fn weak_password_is_rejected() {
        let weak = CreateAdminRequest {
            password: "password".to_string(),
            ..request()
        };
        assert!(weak.validate().is_err());
    }

    #[test]
    fn blank_search_is_ignored() {
        let query = SearchQuery {
            search: Some("   ".to_string()),
        };
        assert_eq!(query.term(), None);
    }
}
