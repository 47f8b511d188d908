use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{Claims, Role};
use shared_models::error::AppError;

const CREDENTIALS_ERROR: &str = "Could not validate credentials";

fn algorithm(config: &AppConfig) -> Result<Algorithm, AppError> {
    match config.jwt_algorithm.to_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => {
            error!("Unsupported JWT algorithm configured: {}", other);
            Err(AppError::Internal("Unsupported token algorithm".to_string()))
        }
    }
}

pub fn create_access_token(
    user_id: Uuid,
    username: &str,
    role: Role,
    config: &AppConfig,
) -> Result<String, AppError> {
    if config.jwt_secret.is_empty() {
        return Err(AppError::Internal("JWT secret is not set".to_string()));
    }

    let claims = Claims {
        sub: username.to_string(),
        user_id,
        role,
        exp: (Utc::now() + Duration::minutes(config.access_token_expire_minutes)).timestamp(),
    };

    let token = encode(
        &Header::new(algorithm(config)?),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| {
        error!("Error creating access token: {}", e);
        AppError::Internal("Error creating access token".to_string())
    })?;

    info!("Access token created for {} {}", role, username);
    Ok(token)
}

pub fn validate_token(token: &str, config: &AppConfig) -> Result<Claims, AppError> {
    if config.jwt_secret.is_empty() {
        return Err(AppError::Auth("JWT secret is not set".to_string()));
    }

    let validation = Validation::new(algorithm(config)?);
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        warn!("Token verification failed: {}", e);
        AppError::Auth(CREDENTIALS_ERROR.to_string())
    })?;

    debug!("Token validated for user {}", data.claims.user_id);
    Ok(data.claims)
}
