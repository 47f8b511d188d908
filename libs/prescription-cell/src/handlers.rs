use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::{info, warn};
use uuid::Uuid;

use shared_models::auth::{AuthUser, Role};
use shared_models::error::AppError;
use shared_utils::extractor::require_role;

use crate::models::{
    CreatePrescriptionRequest, Prescription, Reminder, ReminderFeed, UpdatePrescriptionRequest,
};
use crate::router::PrescriptionState;
use crate::services::prescription::PrescriptionService;

pub async fn create_prescription(
    State(state): State<PrescriptionState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreatePrescriptionRequest>,
) -> Result<(StatusCode, Json<Prescription>), AppError> {
    require_role(&user, &[Role::Doctor])?;
    info!("Doctor {} creating prescription for patient {}", user.id, request.patient_id);

    let prescription = PrescriptionService::new(&state.config)
        .create(user.id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(prescription)))
}

pub async fn get_prescription(
    State(state): State<PrescriptionState>,
    Extension(user): Extension<AuthUser>,
    Path(prescription_id): Path<Uuid>,
) -> Result<Json<Prescription>, AppError> {
    let prescription = PrescriptionService::new(&state.config)
        .get(prescription_id)
        .await?;

    if user.role == Role::Patient && prescription.patient_id != user.id {
        warn!("Patient {} requested prescription {} of another patient", user.id, prescription_id);
        return Err(AppError::Forbidden(
            "You do not have permission to access this resource.".to_string(),
        ));
    }
    Ok(Json(prescription))
}

pub async fn update_prescription(
    State(state): State<PrescriptionState>,
    Extension(user): Extension<AuthUser>,
    Path(prescription_id): Path<Uuid>,
    Json(request): Json<UpdatePrescriptionRequest>,
) -> Result<Json<Prescription>, AppError> {
    require_role(&user, &[Role::Doctor])?;
    let prescription = PrescriptionService::new(&state.config)
        .update(prescription_id, request)
        .await?;
    Ok(Json(prescription))
}

pub async fn delete_prescription(
    State(state): State<PrescriptionState>,
    Extension(user): Extension<AuthUser>,
    Path(prescription_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    require_role(&user, &[Role::Doctor, Role::Admin])?;
    PrescriptionService::new(&state.config)
        .delete(prescription_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn activate_reminders(
    State(state): State<PrescriptionState>,
    Extension(user): Extension<AuthUser>,
    Path(prescription_id): Path<Uuid>,
) -> Result<Json<Vec<Reminder>>, AppError> {
    let service = PrescriptionService::new(&state.config);

    if user.role == Role::Patient {
        let prescription = service.get(prescription_id).await?;
        if prescription.patient_id != user.id {
            return Err(AppError::Forbidden(
                "You do not have permission to access this resource.".to_string(),
            ));
        }
    }

    let reminders = service.activate_reminders(prescription_id).await?;
    info!("Activated reminders for prescription ID: {}", prescription_id);
    Ok(Json(reminders))
}

pub async fn get_reminders(
    State(state): State<PrescriptionState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ReminderFeed>, AppError> {
    require_role(&user, &[Role::Patient])?;
    let reminders = state.inbox.drain(user.id).await;
    Ok(Json(ReminderFeed { reminders }))
}
