use std::collections::HashMap;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::DbClient;

use crate::models::{Prescription, PrescriptionError, Reminder, ReminderStatus, PRESCRIPTION_TABLE, REMINDER_TABLE};
use crate::reminders::is_due;
use crate::services::inbox::ReminderInbox;

/// Upper bound on ids per `in.(...)` delete.
const DELETE_CHUNK: usize = 100;

/// Periodically fires due reminders into patients' inboxes.
pub struct ReminderScheduler {
    db: DbClient,
    inbox: ReminderInbox,
    period: Duration,
}

impl ReminderScheduler {
    pub fn new(config: &AppConfig, inbox: ReminderInbox) -> Self {
        Self::with_client(
            DbClient::new(config),
            inbox,
            Duration::from_secs(config.reminder_interval_seconds.max(1)),
        )
    }

    pub fn with_client(db: DbClient, inbox: ReminderInbox, period: Duration) -> Self {
        Self { db, inbox, period }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    pub async fn run(self) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!("Reminder scheduler started, checking every {:?}", self.period);

        loop {
            ticker.tick().await;
            match self.tick(Local::now().naive_local()).await {
                Ok(0) => debug!("No reminders due"),
                Ok(fired) => info!("Processed and deleted {} reminders.", fired),
                Err(e) => error!("Error processing reminders: {}", e),
            }
        }
    }

    /// Fires every reminder due at `now` and deletes it. Returns how many fired.
    ///
    /// Reminders are deleted in chunks before anything is pushed, so a failed
    /// delete leaves them for the next tick instead of delivering them twice.
    pub async fn tick(&self, now: NaiveDateTime) -> Result<usize, PrescriptionError> {
        let query = format!(
            "status=eq.{}&reminder_date=lte.{}&order=reminder_date.asc,reminder_time.asc",
            ReminderStatus::Active,
            now.date()
        );
        let candidates: Vec<Reminder> = self.db.select(REMINDER_TABLE, &query).await?;
        let due: Vec<Reminder> = candidates.into_iter().filter(|r| is_due(r, now)).collect();
        if due.is_empty() {
            return Ok(0);
        }

        let mut prescriptions: HashMap<Uuid, Option<Prescription>> = HashMap::new();
        let mut fired = 0;

        for chunk in due.chunks(DELETE_CHUNK) {
            let mut ready = Vec::with_capacity(chunk.len());
            for reminder in chunk {
                if !prescriptions.contains_key(&reminder.prescription_id) {
                    let lookup = self
                        .db
                        .select_one(
                            PRESCRIPTION_TABLE,
                            &format!("prescription_id=eq.{}", reminder.prescription_id),
                        )
                        .await;
                    match lookup {
                        Ok(found) => {
                            prescriptions.insert(reminder.prescription_id, found);
                        }
                        Err(e) => {
                            warn!(
                                "Deferring reminder {}, prescription lookup failed: {}",
                                reminder.reminder_id, e
                            );
                            continue;
                        }
                    }
                }

                let message = match prescriptions.get(&reminder.prescription_id).and_then(Option::as_ref) {
                    Some(prescription) => Some((
                        prescription.patient_id,
                        format!("Time to take your medication: {}", prescription.medication_name),
                    )),
                    None => {
                        warn!(
                            "Reminder {} points at missing prescription {}",
                            reminder.reminder_id, reminder.prescription_id
                        );
                        None
                    }
                };
                ready.push((reminder.reminder_id, message));
            }

            if ready.is_empty() {
                continue;
            }

            let ids: Vec<String> = ready.iter().map(|(id, _)| id.to_string()).collect();
            self.db
                .delete(REMINDER_TABLE, &format!("reminder_id=in.({})", ids.join(",")))
                .await?;

            for (_, message) in ready {
                if let Some((patient_id, text)) = message {
                    self.inbox.push(patient_id, text).await;
                }
            }
            fired += ids.len();
        }

        Ok(fired)
    }
}
