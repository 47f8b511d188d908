use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn doctor_routes(state: Arc<AppConfig>) -> Router {
    let public_routes = Router::new()
        .route("/register/doctor", post(handlers::register_doctor))
        .route("/doctors", get(handlers::get_doctors_by_specialization))
        .route(
            "/doctors/{doctor_id}/available_slots",
            get(handlers::get_available_time_slots),
        );

    let protected_routes = Router::new()
        .route("/update/doctor/{doctor_id}", put(handlers::update_doctor))
        .route(
            "/doctors/{doctor_id}",
            get(handlers::get_doctor).delete(handlers::delete_doctor),
        )
        .route("/create/timeslot", post(handlers::create_time_slot))
        .route(
            "/timeslots/{doctor_id}/{patient_id}",
            get(handlers::get_time_slot_for_patient),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
