use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use doctor_cell::Doctor;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Stage {
    #[default]
    General,
    AwaitingDoctorSelection,
    AwaitingSlotSelection,
    CheckPrescriptions,
    WaitingForExit,
    ActivateReminders,
    UpdateReminderPrompt,
    CollectReminderTimes,
}

/// A prescription still waiting for the patient to decide on reminders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPrescription {
    pub prescription_id: Uuid,
    pub medication_name: String,
}

/// Per-patient chat state.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    pub stage: Stage,
    pub doctors: Vec<Doctor>,
    pub selected_doctor: Option<Doctor>,
    pub pending: VecDeque<PendingPrescription>,
    pub prescription_id: Option<Uuid>,
}

impl Conversation {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_idle(&self) -> bool {
        self.stage == Stage::General && self.pending.is_empty()
    }
}

/// Conversations keyed by patient. Each one sits behind its own lock so a
/// patient's messages are handled one after another.
#[derive(Clone, Default)]
pub struct ConversationStore {
    conversations: Arc<Mutex<HashMap<Uuid, Arc<Mutex<Conversation>>>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclusive access to `patient_id`'s conversation, fresh if none exists.
    /// Waits while another message from the same patient is in flight.
    pub async fn checkout(&self, patient_id: Uuid) -> OwnedMutexGuard<Conversation> {
        let slot = self
            .conversations
            .lock()
            .await
            .entry(patient_id)
            .or_default()
            .clone();
        slot.lock_owned().await
    }

    /// Hands the conversation back and forgets it once idle and unclaimed.
    pub async fn checkin(&self, patient_id: Uuid, conversation: OwnedMutexGuard<Conversation>) {
        drop(conversation);

        let mut conversations = self.conversations.lock().await;
        let idle = conversations.get(&patient_id).is_some_and(|slot| {
            Arc::strong_count(slot) == 1 && slot.try_lock().is_ok_and(|c| c.is_idle())
        });
        if idle {
            conversations.remove(&patient_id);
        }
    }

    pub async fn stage(&self, patient_id: Uuid) -> Stage {
        let slot = self.conversations.lock().await.get(&patient_id).cloned();
        match slot {
            Some(slot) => slot.lock().await.stage,
            None => Stage::General,
        }
    }
}
