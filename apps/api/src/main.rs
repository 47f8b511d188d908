use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::http::{HeaderName, HeaderValue, Method};
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use chat_cell::{ConversationStore, OpenAiTriage};
use notification_cell::NotificationHub;
use prescription_cell::{ReminderInbox, ReminderScheduler};
use shared_config::AppConfig;

use crate::router::AppServices;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Careline API server");

    let config = Arc::new(AppConfig::from_env());
    if !config.is_configured() {
        warn!("Database is not configured, requests touching storage will fail");
    }
    if !config.is_chatbot_configured() {
        warn!("OpenAI key is missing, the chatbot will answer with errors");
    }

    let services = AppServices {
        hub: NotificationHub::new(),
        inbox: ReminderInbox::new(),
        conversations: ConversationStore::new(),
        triage: Arc::new(OpenAiTriage::new(&config)),
    };

    let scheduler = ReminderScheduler::new(&config, services.inbox.clone()).spawn();

    let app = router::create_router(config.clone(), services)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&config));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    scheduler.abort();
    info!("Server stopped");
    Ok(())
}

/// Empty lists allow anything.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter(|o| o.as_str() != "*")
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    let methods: Vec<Method> = config
        .allowed_methods
        .iter()
        .filter(|m| m.as_str() != "*")
        .filter_map(|m| Method::from_bytes(m.to_uppercase().as_bytes()).ok())
        .collect();
    let headers: Vec<HeaderName> = config
        .allowed_headers
        .iter()
        .filter(|h| h.as_str() != "*")
        .filter_map(|h| HeaderName::from_bytes(h.as_bytes()).ok())
        .collect();

    // Wildcards cannot be combined with credentials, so mirror the request instead.
    let credentials = config.allow_credentials;
    let origin = match (origins.is_empty(), credentials) {
        (false, _) => AllowOrigin::list(origins),
        (true, true) => AllowOrigin::mirror_request(),
        (true, false) => AllowOrigin::from(Any),
    };
    let methods = match (methods.is_empty(), credentials) {
        (false, _) => AllowMethods::list(methods),
        (true, true) => AllowMethods::mirror_request(),
        (true, false) => AllowMethods::from(Any),
    };
    let headers = match (headers.is_empty(), credentials) {
        (false, _) => AllowHeaders::list(headers),
        (true, true) => AllowHeaders::mirror_request(),
        (true, false) => AllowHeaders::from(Any),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(credentials)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}
