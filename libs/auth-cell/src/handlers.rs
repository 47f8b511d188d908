use std::sync::Arc;

use axum::{extract::State, Json};
use tracing::{info, warn};

use shared_config::AppConfig;
use shared_models::auth::{LoginRequest, Role, Token};
use shared_models::error::AppError;
use shared_utils::jwt::create_access_token;

use crate::services::auth::AuthService;

pub async fn login(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Token>, AppError> {
    info!("Attempting to authenticate user {} as {}", request.username, request.role);

    let role: Role = request.role.parse().map_err(|_| {
        warn!("Invalid role provided: {}", request.role);
        AppError::BadRequest("Invalid role specified".to_string())
    })?;

    let account = AuthService::new(&config)
        .authenticate(role, &request.username, &request.password)
        .await?
        .ok_or_else(|| AppError::Auth("Invalid credentials".to_string()))?;

    let access_token = create_access_token(account.user_id, &account.username, role, &config)?;

    info!("User authenticated successfully: {} as {}", account.username, role);
    Ok(Json(Token::bearer(access_token)))
}
