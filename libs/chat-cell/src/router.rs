use std::sync::Arc;

use axum::{middleware, routing::post, Router};

use notification_cell::NotificationHub;
use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::conversation::ConversationStore;
use crate::handlers;
use crate::services::triage::Triage;

#[derive(Clone)]
pub struct ChatState {
    pub config: Arc<AppConfig>,
    pub store: ConversationStore,
    pub triage: Arc<dyn Triage>,
    pub hub: NotificationHub,
}

pub fn chat_routes(
    config: Arc<AppConfig>,
    store: ConversationStore,
    triage: Arc<dyn Triage>,
    hub: NotificationHub,
) -> Router {
    let state = ChatState {
        config: config.clone(),
        store,
        triage,
        hub,
    };

    Router::new()
        .route("/chat", post(handlers::chat))
        .layer(middleware::from_fn_with_state(config, auth_middleware))
        .with_state(state)
}
