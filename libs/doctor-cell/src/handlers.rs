use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{AuthUser, Role};
use shared_models::error::AppError;
use shared_utils::extractor::require_role;

use crate::models::{
    CreateDoctorRequest, CreateTimeSlotRequest, Doctor, DoctorError, SpecializationQuery,
    TimeSlot, UpdateDoctorRequest,
};
use crate::services::{doctor::DoctorService, timeslot::TimeSlotService};

pub async fn register_doctor(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<CreateDoctorRequest>,
) -> Result<Json<Doctor>, AppError> {
    info!("Attempting to register doctor with username: {}", request.username);
    let doctor = DoctorService::new(&config).register(request).await?;
    Ok(Json(doctor))
}

pub async fn update_doctor(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
    Path(doctor_id): Path<Uuid>,
    Json(request): Json<UpdateDoctorRequest>,
) -> Result<Json<Doctor>, AppError> {
    require_role(&user, &[Role::Doctor])?;
    if doctor_id != user.id {
        warn!("Doctor {} tried to update doctor {}", user.id, doctor_id);
        return Err(AppError::Forbidden(
            "You can only update your own profile.".to_string(),
        ));
    }

    let doctor = DoctorService::new(&config).update(user.id, request).await?;
    Ok(Json(doctor))
}

pub async fn get_doctors_by_specialization(
    State(config): State<Arc<AppConfig>>,
    Query(query): Query<SpecializationQuery>,
) -> Result<Json<Vec<Doctor>>, AppError> {
    debug!("Searching for doctors with specialization: '{}'", query.specialization);

    let doctors = DoctorService::new(&config)
        .by_specialization(&query.specialization)
        .await?;

    if doctors.is_empty() {
        warn!("No doctors found for specialization: '{}'", query.specialization);
        return Err(DoctorError::NoneForSpecialization(query.specialization).into());
    }
    Ok(Json(doctors))
}

pub async fn get_doctor(
    State(config): State<Arc<AppConfig>>,
    Extension(_user): Extension<AuthUser>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Doctor>, AppError> {
    let doctor = DoctorService::new(&config).get(doctor_id).await?;
    Ok(Json(doctor))
}

pub async fn delete_doctor(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
    Path(doctor_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    require_role(&user, &[Role::Admin])?;
    DoctorService::new(&config).delete(doctor_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_time_slot(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateTimeSlotRequest>,
) -> Result<Json<TimeSlot>, AppError> {
    require_role(&user, &[Role::Doctor])?;
    info!("Attempting to register time slot for doctor ID: {}", user.id);

    let slot = TimeSlotService::new(&config).create(user.id, request).await?;
    Ok(Json(slot))
}

pub async fn get_available_time_slots(
    State(config): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Vec<TimeSlot>>, AppError> {
    let slots = TimeSlotService::new(&config)
        .available_for_doctor(doctor_id)
        .await?;
    Ok(Json(slots))
}

pub async fn get_time_slot_for_patient(
    State(config): State<Arc<AppConfig>>,
    Extension(_user): Extension<AuthUser>,
    Path((doctor_id, patient_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<TimeSlot>, AppError> {
    let slot = TimeSlotService::new(&config)
        .for_doctor_and_patient(doctor_id, patient_id)
        .await?;
    Ok(Json(slot))
}
