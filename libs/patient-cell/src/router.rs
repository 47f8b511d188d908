use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn patient_routes(state: Arc<AppConfig>) -> Router {
    let public_routes = Router::new().route("/register/patient", post(handlers::register_patient));

    let protected_routes = Router::new()
        .route("/update/patient/{patient_id}", put(handlers::update_patient))
        .route(
            "/patients/{patient_id}",
            get(handlers::get_patient).delete(handlers::delete_patient),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
