use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use notification_cell::NotificationHub;
use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

#[derive(Clone)]
pub struct AppointmentState {
    pub config: Arc<AppConfig>,
    pub hub: NotificationHub,
}

pub fn appointment_routes(config: Arc<AppConfig>, hub: NotificationHub) -> Router {
    let state = AppointmentState {
        config: config.clone(),
        hub,
    };

    Router::new()
        .route("/book_appointment", post(handlers::book_appointment))
        .route(
            "/doctor/active/appointments",
            get(handlers::get_doctor_active_appointments),
        )
        .route(
            "/doctor/inactive/appointments",
            get(handlers::get_doctor_inactive_appointments),
        )
        .route(
            "/appointments/{appointment_id}/inactive",
            patch(handlers::mark_appointment_inactive),
        )
        .layer(middleware::from_fn_with_state(config, auth_middleware))
        .with_state(state)
}
