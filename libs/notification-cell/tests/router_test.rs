use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use tower::ServiceExt;
use uuid::Uuid;

use notification_cell::router::notification_routes;
use notification_cell::NotificationHub;

#[tokio::test]
async fn plain_get_without_upgrade_is_rejected() {
    let app = notification_routes(NotificationHub::new());

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/ws/notifications/{}", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
    assert_ne!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_doctor_id_is_rejected() {
    let app = notification_routes(NotificationHub::new());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/ws/notifications/not-a-uuid")
                .header("connection", "upgrade")
                .header("upgrade", "websocket")
                .header("sec-websocket-version", "13")
                .header("sec-websocket-key", "dGhlIHNhbXBsZSBub25jZQ==")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}
