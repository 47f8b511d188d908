use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::hub::NotificationHub;

pub async fn notifications_ws(
    ws: WebSocketUpgrade,
    State(hub): State<NotificationHub>,
    Path(doctor_id): Path<Uuid>,
) -> Response {
    info!("WebSocket connection initiated for doctor_id: {}", doctor_id);
    ws.on_upgrade(move |socket| serve_connection(socket, hub, doctor_id))
}

async fn serve_connection(socket: WebSocket, hub: NotificationHub, doctor_id: Uuid) {
    let mut notifications = hub.subscribe(doctor_id).await;
    let (mut sink, mut stream) = socket.split();

    let mut forward = tokio::spawn(async move {
        loop {
            match notifications.recv().await {
                Ok(payload) => {
                    if sink.send(Message::Text(payload.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Doctor {} connection lagged, {} notifications dropped", doctor_id, skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Client frames are drained and ignored until the socket closes.
    let mut drain = tokio::spawn(async move {
        while let Some(Ok(frame)) = stream.next().await {
            if let Message::Close(_) = frame {
                break;
            }
            debug!("Ignoring client frame from doctor {}", doctor_id);
        }
    });

    tokio::select! {
        _ = &mut forward => drain.abort(),
        _ = &mut drain => forward.abort(),
    }
    // Both tasks must be gone before release counts receivers.
    let _ = forward.await;
    let _ = drain.await;

    hub.release(doctor_id).await;
    info!("WebSocket disconnected for doctor_id: {}", doctor_id);
}
