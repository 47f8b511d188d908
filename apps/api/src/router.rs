use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use admin_cell::router::admin_routes;
use appointment_cell::router::appointment_routes;
use auth_cell::router::auth_routes;
use chat_cell::router::chat_routes;
use chat_cell::{ConversationStore, Triage};
use doctor_cell::router::doctor_routes;
use notification_cell::router::notification_routes;
use notification_cell::NotificationHub;
use patient_cell::router::patient_routes;
use prescription_cell::router::prescription_routes;
use prescription_cell::ReminderInbox;
use shared_config::AppConfig;

/// Process-wide state shared between cells.
#[derive(Clone)]
pub struct AppServices {
    pub hub: NotificationHub,
    pub inbox: ReminderInbox,
    pub conversations: ConversationStore,
    pub triage: Arc<dyn Triage>,
}

pub fn create_router(config: Arc<AppConfig>, services: AppServices) -> Router {
    Router::new()
        .route("/", get(|| async { "Careline API is running!" }))
        .route("/health", get(health))
        .merge(auth_routes(config.clone()))
        .merge(patient_routes(config.clone()))
        .merge(doctor_routes(config.clone()))
        .merge(notification_routes(services.hub.clone()))
        .merge(appointment_routes(config.clone(), services.hub.clone()))
        .merge(prescription_routes(config.clone(), services.inbox.clone()))
        .merge(chat_routes(
            config.clone(),
            services.conversations,
            services.triage,
            services.hub.clone(),
        ))
        .merge(admin_routes(config, services.hub))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chat_cell::OpenAiTriage;
    use shared_utils::test_utils::TestConfig;
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        let config = TestConfig::default().to_arc();
        let services = AppServices {
            hub: NotificationHub::new(),
            inbox: ReminderInbox::new(),
            conversations: ConversationStore::new(),
            triage: Arc::new(OpenAiTriage::new(&config)),
        };
        create_router(config, services)
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn protected_routes_need_a_token() {
        for (method, uri) in [
            ("POST", "/chat"),
            ("GET", "/admin/appointments"),
            ("GET", "/chat/reminders"),
            ("POST", "/book_appointment"),
        ] {
            let response = app()
                .oneshot(
                    Request::builder()
                        .method(method)
                        .uri(uri)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        }
    }
}
