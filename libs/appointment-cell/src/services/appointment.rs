use serde_json::json;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use doctor_cell::{SlotStatus, TimeSlotService};
use notification_cell::NotificationHub;
use patient_cell::PatientService;
use shared_config::AppConfig;
use shared_database::{DbClient, DbError};
use shared_models::pagination::{Page, PageParams};

use crate::models::{
    Appointment, AppointmentError, BookAppointmentRequest, InactiveResult, NewAppointmentRow,
    SortOrder, APPOINTMENT_TABLE,
};

pub struct AppointmentService {
    db: DbClient,
    slots: TimeSlotService,
    patients: PatientService,
    hub: NotificationHub,
}

impl AppointmentService {
    pub fn new(config: &AppConfig, hub: NotificationHub) -> Self {
        Self::with_client(DbClient::new(config), hub)
    }

    pub fn with_client(db: DbClient, hub: NotificationHub) -> Self {
        Self {
            slots: TimeSlotService::with_client(db.clone()),
            patients: PatientService::with_client(db.clone()),
            db,
            hub,
        }
    }

    /// Claims an available slot, records the appointment and tells the doctor.
    /// The slot is released again when the appointment cannot be written.
    #[instrument(skip(self, request), fields(time_slot_id = %request.time_slot_id))]
    pub async fn book(&self, request: BookAppointmentRequest) -> Result<Appointment, AppointmentError> {
        let slot = self
            .slots
            .get(request.time_slot_id)
            .await?
            .ok_or(AppointmentError::SlotNotFound(request.time_slot_id))?;

        if slot.status != SlotStatus::Available {
            warn!("Time slot {} is {}, refusing to book", slot.time_slot_id, slot.status);
            return Err(AppointmentError::SlotUnavailable);
        }

        if self
            .slots
            .book(request.time_slot_id, request.patient_id)
            .await?
            .is_none()
        {
            return Err(AppointmentError::SlotUnavailable);
        }

        let appointment = match self.insert_appointment(&request).await {
            Ok(appointment) => appointment,
            Err(e) => {
                error!("Failed to record appointment, releasing slot {}: {}", request.time_slot_id, e);
                if let Err(release_err) = self
                    .slots
                    .release(request.time_slot_id, request.patient_id)
                    .await
                {
                    error!("Failed to release time slot {}: {}", request.time_slot_id, release_err);
                }
                return Err(e.into());
            }
        };

        info!(
            "Appointment {} booked for patient {} with doctor {}",
            appointment.appointment_id, appointment.patient_id, appointment.doctor_id
        );

        self.notify_doctor(&appointment).await;
        Ok(appointment)
    }

    async fn insert_appointment(&self, request: &BookAppointmentRequest) -> Result<Appointment, DbError> {
        let mut created: Vec<Appointment> = self
            .db
            .insert(APPOINTMENT_TABLE, &NewAppointmentRow::from(request))
            .await?;
        created
            .pop()
            .ok_or_else(|| DbError::Decode("insert returned no rows".to_string()))
    }

    async fn notify_doctor(&self, appointment: &Appointment) {
        match self.patients.get(appointment.patient_id).await {
            Ok(patient) => {
                let message = format!(
                    "A new appointment has been booked for {} on {}.",
                    patient.full_name(),
                    appointment.appointment_date
                );
                self.hub
                    .send_notification(appointment.doctor_id, &message)
                    .await;
            }
            Err(e) => warn!(
                "Skipping booking notification for appointment {}: {}",
                appointment.appointment_id, e
            ),
        }
    }

    #[instrument(skip(self))]
    pub async fn get(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        let query = format!("appointment_id=eq.{}", appointment_id);
        self.db
            .select_one(APPOINTMENT_TABLE, &query)
            .await?
            .ok_or(AppointmentError::NotFound(appointment_id))
    }

    /// A doctor's active or inactive appointments, optionally narrowed to
    /// patients whose first or last name contains `search`.
    #[instrument(skip(self))]
    pub async fn list_for_doctor(
        &self,
        doctor_id: Uuid,
        active: bool,
        search: Option<&str>,
        sort_order: SortOrder,
        params: &PageParams,
    ) -> Result<Page<Appointment>, AppointmentError> {
        let mut query = format!(
            "doctor_id=eq.{}&is_active=is.{}&order=appointment_date.{}",
            doctor_id, active, sort_order
        );

        if let Some(term) = search {
            let patient_ids = self.patients.ids_matching_name(term).await?;
            if patient_ids.is_empty() {
                debug!("No patients match '{}'", term);
                return Ok(Page::new(Vec::new(), 0, params));
            }
            let ids: Vec<String> = patient_ids.iter().map(Uuid::to_string).collect();
            query.push_str(&format!("&patient_id=in.({})", ids.join(",")));
        }

        let (items, total) = self
            .db
            .select_page(APPOINTMENT_TABLE, &query, params.limit(), params.offset())
            .await?;

        info!(
            "Total {} appointments retrieved for doctor {}: {}",
            if active { "active" } else { "inactive" },
            doctor_id,
            items.len()
        );
        Ok(Page::new(items, total, params))
    }

    /// Every appointment, newest date first.
    pub async fn list_all(&self, params: &PageParams) -> Result<Page<Appointment>, AppointmentError> {
        let (items, total) = self
            .db
            .select_page(
                APPOINTMENT_TABLE,
                "order=appointment_date.desc",
                params.limit(),
                params.offset(),
            )
            .await?;
        Ok(Page::new(items, total, params))
    }

    /// Closes an appointment owned by `doctor_id` and frees the doctor's
    /// earliest time slot.
    #[instrument(skip(self))]
    pub async fn mark_inactive(
        &self,
        appointment_id: Uuid,
        doctor_id: Uuid,
    ) -> Result<InactiveResult, AppointmentError> {
        let appointment = self.get(appointment_id).await?;
        if appointment.doctor_id != doctor_id {
            warn!(
                "Doctor {} tried to close appointment {} owned by {}",
                doctor_id, appointment_id, appointment.doctor_id
            );
            return Err(AppointmentError::PermissionDenied);
        }

        let query = format!("appointment_id=eq.{}", appointment_id);
        let updated: Vec<Appointment> = self
            .db
            .update(APPOINTMENT_TABLE, &query, &json!({ "is_active": false }))
            .await?;
        if updated.is_empty() {
            return Err(AppointmentError::NotFound(appointment_id));
        }

        self.slots.delete_earliest_for_doctor(doctor_id).await?;

        info!("Appointment {} marked as inactive", appointment_id);
        Ok(InactiveResult {
            appointment_id,
            status: "inactive".to_string(),
        })
    }

    /// Most recent closed appointment of a patient.
    pub async fn latest_inactive_for_patient(
        &self,
        patient_id: Uuid,
    ) -> Result<Option<Appointment>, AppointmentError> {
        let query = format!(
            "patient_id=eq.{}&is_active=is.false&order=appointment_date.desc",
            patient_id
        );
        let appointment: Option<Appointment> = self.db.select_one(APPOINTMENT_TABLE, &query).await?;
        debug!("Latest inactive appointment for patient {}: {:?}", patient_id, appointment);
        Ok(appointment)
    }
}
