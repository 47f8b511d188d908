use thiserror::Error;
use tracing::error;

use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database authentication failed: {0}")]
    Auth(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflicting record: {0}")]
    Conflict(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl DbError {
    pub(crate) fn from_status(status: u16, body: String) -> Self {
        // 23505 is the PostgreSQL unique_violation code, surfaced in the body
        if status == 409 || body.contains("23505") {
            return DbError::Conflict(body);
        }
        match status {
            401 | 403 => DbError::Auth(body),
            404 => DbError::NotFound(body),
            _ => DbError::Api {
                status,
                message: body,
            },
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, DbError::Conflict(_))
    }
}

/// Raw PostgREST bodies stay in the logs, clients get a fixed message.
impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        error!("Database failure: {}", err);
        match err {
            DbError::NotFound(_) => AppError::NotFound("Resource not found".to_string()),
            DbError::Conflict(_) => AppError::Conflict("Resource already exists".to_string()),
            _ => AppError::Database("A database error occurred".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn unique_violation_body_is_a_conflict() {
        let err = DbError::from_status(400, r#"{"code":"23505","message":"duplicate key"}"#.into());
        assert_matches!(err, DbError::Conflict(_));
    }

    #[test]
    fn status_codes_map_to_variants() {
        assert_matches!(DbError::from_status(401, String::new()), DbError::Auth(_));
        assert_matches!(DbError::from_status(404, String::new()), DbError::NotFound(_));
        assert_matches!(DbError::from_status(500, String::new()), DbError::Api { status: 500, .. });
    }

    #[test]
    fn converts_into_app_error() {
        assert_matches!(AppError::from(DbError::Conflict("x".into())), AppError::Conflict(_));
        assert_matches!(AppError::from(DbError::Decode("x".into())), AppError::Database(_));
    }

    #[test]
    fn database_body_is_not_exposed() {
        let err = AppError::from(DbError::from_status(
            500,
            r#"{"code":"42P01","message":"relation \"secret_table\" does not exist"}"#.into(),
        ));
        assert_matches!(err, AppError::Database(_));
        assert_eq!(err.detail(), "A database error occurred");
        assert!(!err.detail().contains("secret_table"));

        let err = AppError::from(DbError::Conflict("duplicate key value (email)".into()));
        assert_eq!(err.detail(), "Resource already exists");
    }
}
