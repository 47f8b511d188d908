use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// Fired reminder messages waiting for their patient to poll.
#[derive(Clone, Default)]
pub struct ReminderInbox {
    queues: Arc<Mutex<HashMap<Uuid, VecDeque<String>>>>,
}

impl ReminderInbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, patient_id: Uuid, message: String) {
        let mut queues = self.queues.lock().await;
        let queue = queues.entry(patient_id).or_default();
        queue.push_back(message);
        debug!("Patient {} has {} pending reminders", patient_id, queue.len());
    }

    /// Takes every pending message for `patient_id`, oldest first.
    pub async fn drain(&self, patient_id: Uuid) -> Vec<String> {
        self.queues
            .lock()
            .await
            .remove(&patient_id)
            .map(Vec::from)
            .unwrap_or_default()
    }

    pub async fn pending(&self, patient_id: Uuid) -> usize {
        self.queues
            .lock()
            .await
            .get(&patient_id)
            .map_or(0, VecDeque::len)
    }
}
