use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use tracing::{info, warn};
use uuid::Uuid;

use shared_models::auth::{AuthUser, Role};
use shared_models::error::AppError;
use shared_models::pagination::{Page, PageParams};
use shared_utils::extractor::require_role;

use crate::models::{
    Appointment, AppointmentError, AppointmentFilter, BookAppointmentRequest, InactiveResponse,
};
use crate::router::AppointmentState;
use crate::services::appointment::AppointmentService;

pub async fn book_appointment(
    State(state): State<AppointmentState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Appointment>, AppError> {
    require_role(&user, &[Role::Patient, Role::Admin])?;
    if user.role == Role::Patient && request.patient_id != user.id {
        warn!("Patient {} tried to book for patient {}", user.id, request.patient_id);
        return Err(AppError::Forbidden(
            "You can only book appointments for yourself.".to_string(),
        ));
    }

    info!("Booking time slot {} for patient {}", request.time_slot_id, request.patient_id);
    let appointment = AppointmentService::new(&state.config, state.hub.clone())
        .book(request)
        .await?;
    Ok(Json(appointment))
}

pub async fn get_doctor_active_appointments(
    state: State<AppointmentState>,
    user: Extension<AuthUser>,
    params: Query<PageParams>,
    filter: Query<AppointmentFilter>,
) -> Result<Json<Page<Appointment>>, AppError> {
    doctor_appointments(state, user, params, filter, true).await
}

pub async fn get_doctor_inactive_appointments(
    state: State<AppointmentState>,
    user: Extension<AuthUser>,
    params: Query<PageParams>,
    filter: Query<AppointmentFilter>,
) -> Result<Json<Page<Appointment>>, AppError> {
    doctor_appointments(state, user, params, filter, false).await
}

async fn doctor_appointments(
    State(state): State<AppointmentState>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<PageParams>,
    Query(filter): Query<AppointmentFilter>,
    active: bool,
) -> Result<Json<Page<Appointment>>, AppError> {
    require_role(&user, &[Role::Doctor])?;
    params.validate().map_err(AppError::ValidationError)?;
    let sort_order = filter.sort_order()?;

    let page = AppointmentService::new(&state.config, state.hub.clone())
        .list_for_doctor(user.id, active, filter.search_term(), sort_order, &params)
        .await?;

    if page.items.is_empty() {
        return Err(AppointmentError::NoneForDoctor.into());
    }
    Ok(Json(page))
}

pub async fn mark_appointment_inactive(
    State(state): State<AppointmentState>,
    Extension(user): Extension<AuthUser>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<InactiveResponse>, AppError> {
    require_role(&user, &[Role::Doctor])?;

    let result = AppointmentService::new(&state.config, state.hub.clone())
        .mark_inactive(appointment_id, user.id)
        .await?;

    Ok(Json(InactiveResponse {
        message: "Appointment marked as inactive successfully".to_string(),
        result,
    }))
}
