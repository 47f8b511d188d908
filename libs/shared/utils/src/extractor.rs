use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use tracing::{debug, error, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::DbClient;
use shared_models::auth::{AuthUser, Role};
use shared_models::error::AppError;

use crate::jwt::validate_token;

#[derive(Deserialize)]
struct AccountRow {
    user_id: Uuid,
    username: String,
}

fn bearer_token(request: &Request<Body>) -> Result<&str, AppError> {
    let auth_value = request
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Auth("Not authenticated".to_string()))?
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

    auth_value
        .strip_prefix("Bearer ")
        .or_else(|| auth_value.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Auth("Invalid authorization header format".to_string()))
}

/// Validates the bearer token, confirms the account still exists and puts an
/// [`AuthUser`] into the request extensions.
pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let claims = validate_token(bearer_token(&request)?, &config)?;

    let db = DbClient::new(&config);
    let query = format!("user_id=eq.{}&select=user_id,username", claims.user_id);
    let account: Option<AccountRow> = db
        .select_one(claims.role.table(), &query)
        .await
        .map_err(|e| {
            error!("Failed to look up authenticated user: {}", e);
            AppError::Internal("An unexpected error occurred".to_string())
        })?;

    let account = account.ok_or_else(|| {
        warn!("User not found - user_id: {}, user_type: {}", claims.user_id, claims.role);
        AppError::Auth("User not found".to_string())
    })?;

    debug!("Authenticated {} {}", claims.role, account.user_id);
    request.extensions_mut().insert(AuthUser {
        id: account.user_id,
        username: account.username,
        role: claims.role,
    });

    Ok(next.run(request).await)
}

pub fn require_role(user: &AuthUser, allowed: &[Role]) -> Result<(), AppError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        warn!("{} {} denied, requires one of {:?}", user.role, user.id, allowed);
        Err(AppError::Forbidden(
            "You do not have permission to access this resource.".to_string(),
        ))
    }
}
