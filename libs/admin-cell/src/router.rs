use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use notification_cell::NotificationHub;
use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

#[derive(Clone)]
pub struct AdminState {
    pub config: Arc<AppConfig>,
    pub hub: NotificationHub,
}

pub fn admin_routes(config: Arc<AppConfig>, hub: NotificationHub) -> Router {
    let state = AdminState {
        config: config.clone(),
        hub,
    };

    let public_routes = Router::new().route("/register/admin", post(handlers::register_admin));

    let protected_routes = Router::new()
        .route("/admin/appointments", get(handlers::list_appointments))
        .route("/admin/doctors", get(handlers::list_doctors))
        .route("/admin/patients", get(handlers::list_patients))
        .route("/admin/doctors/{doctor_id}", delete(handlers::delete_doctor))
        .route("/admin/patients/{patient_id}", delete(handlers::delete_patient))
        .layer(middleware::from_fn_with_state(config, auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
