use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::DbClient;
use shared_models::auth::Role;
use shared_models::error::AppError;

use crate::services::password::PasswordService;

/// Credential columns common to the three account tables.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub user_id: Uuid,
    pub username: String,
    pub hashed_password: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

pub struct AuthService {
    db: DbClient,
}

impl AuthService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: DbClient::new(config),
        }
    }

    pub fn with_client(db: DbClient) -> Self {
        Self { db }
    }

    /// Returns the account when the username exists in the role's table and
    /// the password matches.
    #[instrument(skip(self, password))]
    pub async fn authenticate(
        &self,
        role: Role,
        username: &str,
        password: &str,
    ) -> Result<Option<Account>, AppError> {
        let query = format!(
            "username=eq.{}&select=user_id,username,hashed_password,is_active",
            shared_database::encode(username)
        );
        let account: Option<Account> = self.db.select_one(role.table(), &query).await?;

        let Some(account) = account else {
            warn!("No {} account named {}", role, username);
            return Ok(None);
        };

        if !PasswordService::verify_password(password, &account.hashed_password) {
            warn!("Password mismatch for {} {}", role, username);
            return Ok(None);
        }

        info!("{} {} authenticated", role, username);
        Ok(Some(account))
    }
}
