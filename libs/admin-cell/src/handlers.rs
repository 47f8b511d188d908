use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::info;
use uuid::Uuid;

use appointment_cell::{Appointment, AppointmentService};
use doctor_cell::{Doctor, DoctorService};
use patient_cell::{Patient, PatientService};
use shared_models::auth::{AuthUser, Role};
use shared_models::error::AppError;
use shared_models::pagination::{Page, PageParams};
use shared_utils::extractor::require_role;

use crate::models::{Admin, CreateAdminRequest, SearchQuery};
use crate::router::AdminState;
use crate::services::admin::AdminService;

pub async fn register_admin(
    State(state): State<AdminState>,
    Json(request): Json<CreateAdminRequest>,
) -> Result<Json<Admin>, AppError> {
    let admin = AdminService::new(&state.config).register(request).await?;
    Ok(Json(admin))
}

fn admin_only(user: &AuthUser, params: &PageParams) -> Result<(), AppError> {
    require_role(user, &[Role::Admin])?;
    params.validate().map_err(AppError::ValidationError)
}

pub async fn list_appointments(
    State(state): State<AdminState>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<Appointment>>, AppError> {
    admin_only(&user, &params)?;
    let page = AppointmentService::new(&state.config, state.hub.clone())
        .list_all(&params)
        .await?;
    Ok(Json(page))
}

pub async fn list_doctors(
    State(state): State<AdminState>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<PageParams>,
    Query(search): Query<SearchQuery>,
) -> Result<Json<Page<Doctor>>, AppError> {
    admin_only(&user, &params)?;
    let page = DoctorService::new(&state.config)
        .list(search.term(), &params)
        .await?;
    Ok(Json(page))
}

pub async fn list_patients(
    State(state): State<AdminState>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<PageParams>,
    Query(search): Query<SearchQuery>,
) -> Result<Json<Page<Patient>>, AppError> {
    admin_only(&user, &params)?;
    let page = PatientService::new(&state.config)
        .list(search.term(), &params)
        .await?;
    Ok(Json(page))
}

pub async fn delete_doctor(
    State(state): State<AdminState>,
    Extension(user): Extension<AuthUser>,
    Path(doctor_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    require_role(&user, &[Role::Admin])?;
    DoctorService::new(&state.config).delete(doctor_id).await?;
    info!("Admin {} deleted doctor {}", user.id, doctor_id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_patient(
    State(state): State<AdminState>,
    Extension(user): Extension<AuthUser>,
    Path(patient_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    require_role(&user, &[Role::Admin])?;
    PatientService::new(&state.config).delete(patient_id).await?;
    info!("Admin {} deleted patient {}", user.id, patient_id);
    Ok(StatusCode::NO_CONTENT)
}
