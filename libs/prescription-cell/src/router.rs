use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::services::inbox::ReminderInbox;

#[derive(Clone)]
pub struct PrescriptionState {
    pub config: Arc<AppConfig>,
    pub inbox: ReminderInbox,
}

pub fn prescription_routes(config: Arc<AppConfig>, inbox: ReminderInbox) -> Router {
    let state = PrescriptionState {
        config: config.clone(),
        inbox,
    };

    Router::new()
        .route("/prescriptions", post(handlers::create_prescription))
        .route(
            "/prescriptions/{prescription_id}",
            get(handlers::get_prescription)
                .put(handlers::update_prescription)
                .delete(handlers::delete_prescription),
        )
        .route(
            "/prescriptions/{prescription_id}/reminders/activate",
            put(handlers::activate_reminders),
        )
        .route("/chat/reminders", get(handlers::get_reminders))
        .layer(middleware::from_fn_with_state(config, auth_middleware))
        .with_state(state)
}
