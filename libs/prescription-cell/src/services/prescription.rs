use std::collections::BTreeMap;

use chrono::{Days, Local, NaiveDate, NaiveTime};
use serde_json::json;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{DbClient, DbError};

use crate::models::{
    CreatePrescriptionRequest, NewPrescriptionRow, Prescription, PrescriptionError, Reminder,
    ReminderStatus, UpdatePrescriptionRequest, PRESCRIPTION_TABLE, REMINDER_TABLE,
};
use crate::reminders::{assign_times, build_reminders, plan_activation};

pub struct PrescriptionService {
    db: DbClient,
}

impl PrescriptionService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: DbClient::new(config),
        }
    }

    pub fn with_client(db: DbClient) -> Self {
        Self { db }
    }

    /// Stores the prescription for `doctor_id` and generates its reminders.
    #[instrument(skip(self, request), fields(patient_id = %request.patient_id))]
    pub async fn create(
        &self,
        doctor_id: Uuid,
        request: CreatePrescriptionRequest,
    ) -> Result<Prescription, PrescriptionError> {
        request.validate().map_err(PrescriptionError::Validation)?;

        let row = NewPrescriptionRow {
            medication_name: &request.medication_name,
            dosage: &request.dosage,
            frequency: request.frequency,
            duration: request.duration,
            instructions: request.instructions.as_deref(),
            is_active: true,
            patient_id: request.patient_id,
            doctor_id,
        };

        let mut created: Vec<Prescription> = self.db.insert(PRESCRIPTION_TABLE, &row).await?;
        let prescription = created
            .pop()
            .ok_or_else(|| DbError::Decode("insert returned no rows".to_string()))?;
        info!("Prescription created successfully with ID: {}", prescription.prescription_id);

        if let Err(e) = self.insert_reminders(&prescription).await {
            error!(
                "Failed to create reminders for prescription {}, removing it: {}",
                prescription.prescription_id, e
            );
            if let Err(cleanup) = self.delete(prescription.prescription_id).await {
                error!(
                    "Failed to remove prescription {}: {}",
                    prescription.prescription_id, cleanup
                );
            }
            return Err(e);
        }
        info!(
            "Reminders created successfully for prescription ID: {}",
            prescription.prescription_id
        );

        Ok(prescription)
    }

    async fn insert_reminders(&self, prescription: &Prescription) -> Result<(), PrescriptionError> {
        let reminders = build_reminders(prescription)?;
        let _: Vec<Reminder> = self.db.insert(REMINDER_TABLE, &reminders).await?;
        Ok(())
    }

    pub async fn get(&self, prescription_id: Uuid) -> Result<Prescription, PrescriptionError> {
        let query = format!("prescription_id=eq.{}", prescription_id);
        self.db
            .select_one(PRESCRIPTION_TABLE, &query)
            .await?
            .ok_or_else(|| {
                warn!("Prescription with ID {} not found", prescription_id);
                PrescriptionError::NotFound(prescription_id)
            })
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        prescription_id: Uuid,
        request: UpdatePrescriptionRequest,
    ) -> Result<Prescription, PrescriptionError> {
        request.validate().map_err(PrescriptionError::Validation)?;
        if request.is_empty() {
            return self.get(prescription_id).await;
        }

        let query = format!("prescription_id=eq.{}", prescription_id);
        let mut updated: Vec<Prescription> =
            self.db.update(PRESCRIPTION_TABLE, &query, &request).await?;

        let prescription = updated
            .pop()
            .ok_or(PrescriptionError::NotFound(prescription_id))?;
        info!("Prescription with ID {} updated successfully", prescription_id);
        Ok(prescription)
    }

    pub async fn delete(&self, prescription_id: Uuid) -> Result<(), PrescriptionError> {
        let removed = self
            .db
            .delete(
                PRESCRIPTION_TABLE,
                &format!("prescription_id=eq.{}", prescription_id),
            )
            .await?;

        if removed == 0 {
            warn!("Prescription with ID {} not found for deletion", prescription_id);
            return Err(PrescriptionError::NotFound(prescription_id));
        }
        info!("Prescription with ID {} deleted successfully", prescription_id);
        Ok(())
    }

    /// Stops the prescription from being offered for activation again.
    pub async fn mark_inactive(&self, prescription_id: Uuid) -> Result<Prescription, PrescriptionError> {
        let query = format!("prescription_id=eq.{}", prescription_id);
        let mut updated: Vec<Prescription> = self
            .db
            .update(PRESCRIPTION_TABLE, &query, &json!({ "is_active": false }))
            .await?;
        let prescription = updated
            .pop()
            .ok_or(PrescriptionError::NotFound(prescription_id))?;
        info!("Prescription with ID {} marked as inactive successfully", prescription_id);
        Ok(prescription)
    }

    /// Everything `doctor_id` prescribed to `patient_id`.
    pub async fn for_appointment(
        &self,
        patient_id: Uuid,
        doctor_id: Uuid,
    ) -> Result<Vec<Prescription>, PrescriptionError> {
        let query = format!("patient_id=eq.{}&doctor_id=eq.{}", patient_id, doctor_id);
        Ok(self.db.select(PRESCRIPTION_TABLE, &query).await?)
    }

    /// Active prescriptions that have no active reminder yet.
    pub async fn without_active_reminders(
        &self,
        prescriptions: Vec<Prescription>,
    ) -> Result<Vec<Prescription>, PrescriptionError> {
        let mut pending = Vec::new();
        for prescription in prescriptions.into_iter().filter(|p| p.is_active) {
            let query = format!(
                "prescription_id=eq.{}&status=eq.{}&select=reminder_id",
                prescription.prescription_id,
                ReminderStatus::Active
            );
            let active: Option<serde_json::Value> = self.db.select_one(REMINDER_TABLE, &query).await?;
            if active.is_none() {
                pending.push(prescription);
            }
        }
        debug!("{} prescriptions without active reminders", pending.len());
        Ok(pending)
    }

    pub async fn reminders_for(&self, prescription_id: Uuid) -> Result<Vec<Reminder>, PrescriptionError> {
        let query = format!(
            "prescription_id=eq.{}&order=reminder_date.asc.nullsfirst,reminder_time.asc",
            prescription_id
        );
        Ok(self.db.select(REMINDER_TABLE, &query).await?)
    }

    /// Dates the prescription's reminders from tomorrow on and activates them.
    #[instrument(skip(self))]
    pub async fn activate_reminders(&self, prescription_id: Uuid) -> Result<Vec<Reminder>, PrescriptionError> {
        let prescription = self.get(prescription_id).await?;
        let reminders = self.reminders_for(prescription_id).await?;
        if reminders.is_empty() {
            warn!("No reminders found for prescription ID: {}", prescription_id);
            return Err(PrescriptionError::NoReminders(prescription_id));
        }

        let today = Local::now().date_naive();
        let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(today);

        let mut by_date: BTreeMap<NaiveDate, Vec<Uuid>> = BTreeMap::new();
        for (reminder_id, date) in plan_activation(&reminders, &prescription, tomorrow) {
            by_date.entry(date).or_default().push(reminder_id);
        }

        let mut activated = Vec::with_capacity(reminders.len());
        for (date, ids) in by_date {
            let mut rows: Vec<Reminder> = self
                .db
                .update(
                    REMINDER_TABLE,
                    &id_filter(&ids),
                    &json!({ "reminder_date": date, "status": ReminderStatus::Active }),
                )
                .await
                .map_err(|e| {
                    error!("Error activating reminders: {}", e);
                    e
                })?;
            activated.append(&mut rows);
        }

        activated.sort_by_key(|r| (r.reminder_date, r.reminder_time));
        info!("Successfully activated {} reminders with dates.", activated.len());
        Ok(activated)
    }

    /// Reassigns reminder times cyclically from `new_times`.
    #[instrument(skip(self))]
    pub async fn update_reminder_times(
        &self,
        prescription_id: Uuid,
        new_times: &[NaiveTime],
    ) -> Result<usize, PrescriptionError> {
        let reminders = self.reminders_for(prescription_id).await?;
        if reminders.is_empty() {
            warn!("No reminders found for prescription ID: {}", prescription_id);
            return Ok(0);
        }

        let mut by_time: BTreeMap<NaiveTime, Vec<Uuid>> = BTreeMap::new();
        for (reminder_id, time) in assign_times(&reminders, new_times) {
            by_time.entry(time).or_default().push(reminder_id);
        }

        let mut changed = 0;
        for (time, ids) in by_time {
            let rows: Vec<Reminder> = self
                .db
                .update(REMINDER_TABLE, &id_filter(&ids), &json!({ "reminder_time": time }))
                .await?;
            changed += rows.len();
        }

        info!("Reminder times updated for prescription ID: {}", prescription_id);
        Ok(changed)
    }
}

fn id_filter(ids: &[Uuid]) -> String {
    let joined: Vec<String> = ids.iter().map(Uuid::to_string).collect();
    format!("reminder_id=in.({})", joined.join(","))
}
