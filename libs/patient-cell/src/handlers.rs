use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::{info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{AuthUser, Role};
use shared_models::error::AppError;
use shared_utils::extractor::require_role;

use crate::models::{CreatePatientRequest, Patient, UpdatePatientRequest};
use crate::services::patient::PatientService;

pub async fn register_patient(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<CreatePatientRequest>,
) -> Result<Json<Patient>, AppError> {
    info!("Attempting to register patient with username: {}", request.username);
    let patient = PatientService::new(&config).register(request).await?;
    Ok(Json(patient))
}

pub async fn update_patient(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
    Path(patient_id): Path<Uuid>,
    Json(request): Json<UpdatePatientRequest>,
) -> Result<Json<Patient>, AppError> {
    require_role(&user, &[Role::Patient])?;
    if patient_id != user.id {
        warn!("Patient {} tried to update patient {}", user.id, patient_id);
        return Err(AppError::Forbidden(
            "You can only update your own profile.".to_string(),
        ));
    }

    let patient = PatientService::new(&config).update(user.id, request).await?;
    Ok(Json(patient))
}

pub async fn get_patient(
    State(config): State<Arc<AppConfig>>,
    Extension(_user): Extension<AuthUser>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Patient>, AppError> {
    let patient = PatientService::new(&config).get(patient_id).await?;
    Ok(Json(patient))
}

pub async fn delete_patient(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
    Path(patient_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    require_role(&user, &[Role::Admin])?;
    PatientService::new(&config).delete(patient_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
