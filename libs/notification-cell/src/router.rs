use axum::{routing::get, Router};

use crate::handlers;
use crate::hub::NotificationHub;

pub fn notification_routes(hub: NotificationHub) -> Router {
    Router::new()
        .route("/ws/notifications/{doctor_id}", get(handlers::notifications_ws))
        .with_state(hub)
}
