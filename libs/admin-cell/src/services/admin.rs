use chrono::Utc;
use tracing::{info, instrument};

use auth_cell::PasswordService;
use shared_config::AppConfig;
use shared_database::{DbClient, DbError};

use crate::models::{Admin, AdminError, CreateAdminRequest, NewAdminRow, ADMIN_TABLE};

pub struct AdminService {
    db: DbClient,
}

impl AdminService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: DbClient::new(config),
        }
    }

    pub fn with_client(db: DbClient) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register(&self, request: CreateAdminRequest) -> Result<Admin, AdminError> {
        request.validate().map_err(AdminError::Validation)?;

        let hashed_password = PasswordService::hash_password(&request.password)
            .map_err(|_| AdminError::PasswordHash)?;

        let row = NewAdminRow {
            username: &request.username,
            hashed_password,
            email: &request.email,
            city: request.city.as_deref(),
            is_active: true,
            timestamp: Utc::now().naive_utc(),
        };

        let mut created: Vec<Admin> = self
            .db
            .insert(ADMIN_TABLE, &row)
            .await
            .map_err(|e| match e {
                DbError::Conflict(_) => AdminError::AlreadyExists,
                other => AdminError::Database(other),
            })?;

        let admin = created.pop().ok_or_else(|| {
            AdminError::Database(DbError::Decode("insert returned no rows".to_string()))
        })?;

        info!("Admin registered successfully with ID: {}", admin.user_id);
        Ok(admin)
    }
}
