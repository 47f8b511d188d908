use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub type NotificationSender = broadcast::Sender<String>;
pub type NotificationReceiver = broadcast::Receiver<String>;

const CHANNEL_CAPACITY: usize = 100;

/// Payload pushed to a doctor's open connections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub doctor_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

/// One broadcast channel per doctor with at least one live connection.
#[derive(Clone, Default)]
pub struct NotificationHub {
    channels: Arc<RwLock<HashMap<Uuid, NotificationSender>>>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection for `doctor_id`.
    pub async fn subscribe(&self, doctor_id: Uuid) -> NotificationReceiver {
        let mut channels = self.channels.write().await;
        let sender = channels.entry(doctor_id).or_insert_with(|| {
            info!("New connection set created for doctor_id: {}", doctor_id);
            broadcast::channel(CHANNEL_CAPACITY).0
        });
        let receiver = sender.subscribe();
        info!(
            "Connection added for doctor_id: {}. Total connections: {}",
            doctor_id,
            sender.receiver_count()
        );
        receiver
    }

    /// Called after a connection's receiver has been dropped. The channel
    /// goes away with the doctor's last connection.
    pub async fn release(&self, doctor_id: Uuid) {
        let mut channels = self.channels.write().await;
        if let Some(sender) = channels.get(&doctor_id) {
            let remaining = sender.receiver_count();
            debug!("Connection removed for doctor_id: {}. Remaining connections: {}", doctor_id, remaining);
            if remaining == 0 {
                channels.remove(&doctor_id);
                info!("No active connections left for doctor_id: {}. Entry removed.", doctor_id);
            }
        }
    }

    /// Pushes `message` to every connection of the doctor and returns how
    /// many received it.
    pub async fn send_notification(&self, doctor_id: Uuid, message: &str) -> usize {
        let channels = self.channels.read().await;
        let Some(sender) = channels.get(&doctor_id) else {
            warn!("No active connections found for doctor_id: {}. Notification not sent.", doctor_id);
            return 0;
        };

        let payload = Notification {
            message: message.to_string(),
            doctor_id,
            timestamp: Utc::now(),
        };
        let encoded = match serde_json::to_string(&payload) {
            Ok(encoded) => encoded,
            Err(e) => {
                error!("Failed to encode notification for doctor_id {}: {}", doctor_id, e);
                return 0;
            }
        };

        match sender.send(encoded) {
            Ok(delivered) => {
                info!("Notification sent to doctor_id: {} on {} connection(s)", doctor_id, delivered);
                delivered
            }
            Err(e) => {
                warn!("Error sending notification to doctor_id: {} - {}", doctor_id, e);
                0
            }
        }
    }

    pub async fn connection_count(&self, doctor_id: Uuid) -> usize {
        self.channels
            .read()
            .await
            .get(&doctor_id)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    pub async fn active_doctors(&self) -> Vec<Uuid> {
        self.channels.read().await.keys().copied().collect()
    }
}
