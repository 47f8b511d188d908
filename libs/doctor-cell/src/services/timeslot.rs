use serde_json::json;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{DbClient, DbError};

use crate::models::{
    CreateTimeSlotRequest, DoctorError, NewTimeSlotRow, SlotStatus, TimeSlot, TIME_SLOT_TABLE,
};

pub struct TimeSlotService {
    db: DbClient,
}

impl TimeSlotService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: DbClient::new(config),
        }
    }

    pub fn with_client(db: DbClient) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        doctor_id: Uuid,
        request: CreateTimeSlotRequest,
    ) -> Result<TimeSlot, DoctorError> {
        request.validate().map_err(DoctorError::Validation)?;

        let row = NewTimeSlotRow {
            doctor_id,
            start_time: request.start_time,
            end_time: request.end_time,
            status: request.status,
        };

        let mut created: Vec<TimeSlot> = self.db.insert(TIME_SLOT_TABLE, &row).await?;
        let slot = created.pop().ok_or_else(|| {
            DoctorError::Database(DbError::Decode("insert returned no rows".to_string()))
        })?;

        info!("Time slot created successfully with ID: {}", slot.time_slot_id);
        Ok(slot)
    }

    /// Available slots of a doctor, earliest first.
    #[instrument(skip(self))]
    pub async fn available_for_doctor(&self, doctor_id: Uuid) -> Result<Vec<TimeSlot>, DoctorError> {
        let query = format!(
            "doctor_id=eq.{}&status=eq.{}&order=start_time.asc",
            doctor_id,
            SlotStatus::Available
        );
        let slots: Vec<TimeSlot> = self.db.select(TIME_SLOT_TABLE, &query).await?;
        debug!("Doctor {} has {} available slots", doctor_id, slots.len());
        Ok(slots)
    }

    pub async fn get(&self, time_slot_id: Uuid) -> Result<Option<TimeSlot>, DoctorError> {
        let query = format!("time_slot_id=eq.{}", time_slot_id);
        Ok(self.db.select_one(TIME_SLOT_TABLE, &query).await?)
    }

    pub async fn set_status(&self, time_slot_id: Uuid, status: SlotStatus) -> Result<TimeSlot, DoctorError> {
        self.patch(time_slot_id, json!({ "status": status })).await
    }

    pub async fn assign_patient(&self, time_slot_id: Uuid, patient_id: Uuid) -> Result<TimeSlot, DoctorError> {
        self.patch(time_slot_id, json!({ "patient_id": patient_id })).await
    }

    /// Claims the slot for `patient_id` only while it is still available.
    /// `None` means another booking got there first.
    #[instrument(skip(self))]
    pub async fn book(&self, time_slot_id: Uuid, patient_id: Uuid) -> Result<Option<TimeSlot>, DoctorError> {
        let query = format!(
            "time_slot_id=eq.{}&status=eq.{}",
            time_slot_id,
            SlotStatus::Available
        );
        let mut updated: Vec<TimeSlot> = self
            .db
            .update(
                TIME_SLOT_TABLE,
                &query,
                &json!({ "status": SlotStatus::Booked, "patient_id": patient_id }),
            )
            .await?;

        match updated.pop() {
            Some(slot) => {
                info!("Time slot {} booked by patient {}", time_slot_id, patient_id);
                Ok(Some(slot))
            }
            None => {
                warn!("Time slot {} was no longer available", time_slot_id);
                Ok(None)
            }
        }
    }

    /// Undoes [`TimeSlotService::book`] while the slot is still held by `patient_id`.
    #[instrument(skip(self))]
    pub async fn release(&self, time_slot_id: Uuid, patient_id: Uuid) -> Result<(), DoctorError> {
        let query = format!("time_slot_id=eq.{}&patient_id=eq.{}", time_slot_id, patient_id);
        let _: Vec<TimeSlot> = self
            .db
            .update(
                TIME_SLOT_TABLE,
                &query,
                &json!({ "status": SlotStatus::Available, "patient_id": null }),
            )
            .await?;
        info!("Time slot {} released", time_slot_id);
        Ok(())
    }

    async fn patch(&self, time_slot_id: Uuid, body: serde_json::Value) -> Result<TimeSlot, DoctorError> {
        let query = format!("time_slot_id=eq.{}", time_slot_id);
        let mut updated: Vec<TimeSlot> = self.db.update(TIME_SLOT_TABLE, &query, &body).await?;
        updated
            .pop()
            .ok_or(DoctorError::UnknownTimeSlot(time_slot_id))
    }

    /// First slot a patient holds with a doctor.
    #[instrument(skip(self))]
    pub async fn for_doctor_and_patient(
        &self,
        doctor_id: Uuid,
        patient_id: Uuid,
    ) -> Result<TimeSlot, DoctorError> {
        let query = format!(
            "doctor_id=eq.{}&patient_id=eq.{}&order=start_time.asc",
            doctor_id, patient_id
        );
        self.db
            .select_one(TIME_SLOT_TABLE, &query)
            .await?
            .ok_or(DoctorError::TimeSlotNotFound(doctor_id))
    }

    /// Removes the doctor's earliest slot by start time, if any.
    #[instrument(skip(self))]
    pub async fn delete_earliest_for_doctor(&self, doctor_id: Uuid) -> Result<Option<Uuid>, DoctorError> {
        let query = format!("doctor_id=eq.{}&order=start_time.asc", doctor_id);
        let earliest: Option<TimeSlot> = self.db.select_one(TIME_SLOT_TABLE, &query).await?;

        let Some(slot) = earliest else {
            warn!("Doctor {} has no time slots to remove", doctor_id);
            return Ok(None);
        };

        self.db
            .delete(TIME_SLOT_TABLE, &format!("time_slot_id=eq.{}", slot.time_slot_id))
            .await?;
        info!("Deleted time slot with ID: {}", slot.time_slot_id);
        Ok(Some(slot.time_slot_id))
    }
}
