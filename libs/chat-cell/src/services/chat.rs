use std::sync::Arc;

use chrono::Local;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use appointment_cell::{AppointmentError, AppointmentService, BookAppointmentRequest};
use doctor_cell::{Doctor, DoctorService, DoctorSummary, TimeSlotService};
use notification_cell::NotificationHub;
use prescription_cell::PrescriptionService;
use shared_config::AppConfig;
use shared_database::DbClient;

use crate::conversation::{Conversation, PendingPrescription, Stage};
use crate::models::{ChatError, ChatResponse};
use crate::replies::{self, is_one_of, AFFIRMATIVE, EXIT_WORDS, NEGATIVE, RESET_WORDS};
use crate::services::triage::Triage;
use crate::times::{format_24h, parse_reminder_times};

/// Drives one patient's conversation a message at a time.
pub struct ChatService {
    triage: Arc<dyn Triage>,
    doctors: DoctorService,
    slots: TimeSlotService,
    appointments: AppointmentService,
    prescriptions: PrescriptionService,
}

impl ChatService {
    pub fn new(config: &AppConfig, triage: Arc<dyn Triage>, hub: NotificationHub) -> Self {
        Self::with_client(DbClient::new(config), triage, hub)
    }

    pub fn with_client(db: DbClient, triage: Arc<dyn Triage>, hub: NotificationHub) -> Self {
        Self {
            triage,
            doctors: DoctorService::with_client(db.clone()),
            slots: TimeSlotService::with_client(db.clone()),
            appointments: AppointmentService::with_client(db.clone(), hub),
            prescriptions: PrescriptionService::with_client(db),
        }
    }

    #[instrument(skip(self, conversation, raw_message))]
    pub async fn handle(
        &self,
        patient_id: Uuid,
        conversation: &mut Conversation,
        raw_message: &str,
    ) -> Result<ChatResponse, ChatError> {
        let message = raw_message.trim().to_lowercase();
        info!("Received message: {}", message);

        if is_one_of(&message, RESET_WORDS) {
            conversation.reset();
            return Ok(ChatResponse::text(replies::NEW_CONVERSATION));
        }

        debug!("Conversation stage: {:?}", conversation.stage);
        match conversation.stage {
            Stage::General => self.general(patient_id, conversation, &message).await,
            Stage::AwaitingDoctorSelection => self.select_doctor(conversation, &message).await,
            Stage::AwaitingSlotSelection => self.select_slot(patient_id, conversation, &message).await,
            Stage::CheckPrescriptions => self.check_prescriptions(patient_id, conversation).await,
            Stage::WaitingForExit => Ok(Self::exit(conversation, &message)),
            Stage::ActivateReminders => Ok(self.activate_reminders(conversation, &message).await),
            Stage::UpdateReminderPrompt => Ok(Self::update_prompt(conversation, &message)),
            Stage::CollectReminderTimes => Ok(self.collect_times(conversation, &message).await),
        }
    }

    async fn general(
        &self,
        patient_id: Uuid,
        conversation: &mut Conversation,
        message: &str,
    ) -> Result<ChatResponse, ChatError> {
        let reply = self.triage.triage(message).await.map_err(ChatError::Triage)?;

        if reply.suggest_doctor {
            let specialization = reply.specialization.unwrap_or_default();
            let doctors = match self.doctors.by_specialization(&specialization).await {
                Ok(doctors) => doctors,
                Err(e) => {
                    warn!("Error fetching doctors: {}", e);
                    return Ok(ChatResponse::text(replies::doctors_unavailable(&reply.response)));
                }
            };

            if doctors.is_empty() {
                return Ok(ChatResponse::text(replies::no_doctors_for(
                    &reply.response,
                    &specialization,
                )));
            }

            let doctor_list = doctors
                .iter()
                .map(|d| {
                    format!(
                        "Dr. {} ({}) | Experience: {} years | Fees: Rs.{}",
                        d.full_name(),
                        d.specialization,
                        d.years_of_experience,
                        d.consultation_fee
                    )
                })
                .collect::<Vec<_>>()
                .join("\n");

            let summaries = doctors.iter().map(DoctorSummary::from).collect();
            conversation.stage = Stage::AwaitingDoctorSelection;
            conversation.doctors = doctors;

            return Ok(ChatResponse {
                response: replies::doctors_found(&reply.response, &doctor_list),
                doctors: Some(summaries),
            });
        }

        if reply.check_prescriptions {
            conversation.stage = Stage::CheckPrescriptions;
            return self.check_prescriptions(patient_id, conversation).await;
        }

        Ok(ChatResponse::text(replies::plain(&reply.response)))
    }

    async fn select_doctor(
        &self,
        conversation: &mut Conversation,
        message: &str,
    ) -> Result<ChatResponse, ChatError> {
        let wanted = message
            .strip_prefix("dr.")
            .or_else(|| message.strip_prefix("dr "))
            .unwrap_or(message)
            .trim();

        let Some(doctor) = conversation
            .doctors
            .iter()
            .find(|d| d.full_name().to_lowercase() == wanted)
            .cloned()
        else {
            return Ok(ChatResponse::text(replies::DOCTOR_NOT_FOUND));
        };

        let slots = self.slots.available_for_doctor(doctor.user_id).await?;
        if slots.is_empty() {
            let mut others: Vec<&Doctor> = Vec::new();
            for other in conversation.doctors.iter().filter(|d| d.user_id != doctor.user_id) {
                if !self.slots.available_for_doctor(other.user_id).await?.is_empty() {
                    others.push(other);
                }
            }

            let apology = replies::no_available_slots(&doctor.full_name());
            let follow_up = if others.is_empty() {
                replies::NO_OTHER_DOCTORS.to_string()
            } else {
                let list = others
                    .iter()
                    .map(|d| format!("Dr. {}", d.full_name()))
                    .collect::<Vec<_>>()
                    .join("\n");
                replies::other_doctors_available(&list)
            };
            return Ok(ChatResponse::text(format!("{}\n\n{}", apology, follow_up)));
        }

        let slots_list = slots
            .iter()
            .enumerate()
            .map(|(i, slot)| format!("{}. {}", i + 1, slot.display_range()))
            .collect::<Vec<_>>()
            .join("\n");

        conversation.stage = Stage::AwaitingSlotSelection;
        let response = replies::available_slots(&doctor.full_name(), &slots_list);
        conversation.selected_doctor = Some(doctor);
        Ok(ChatResponse::text(response))
    }

    async fn select_slot(
        &self,
        patient_id: Uuid,
        conversation: &mut Conversation,
        message: &str,
    ) -> Result<ChatResponse, ChatError> {
        let Ok(choice) = message.parse::<usize>() else {
            return Ok(ChatResponse::text(replies::INVALID_INPUT));
        };

        let Some(doctor) = conversation.selected_doctor.clone() else {
            warn!("Slot selection without a selected doctor, resetting");
            conversation.reset();
            return Ok(ChatResponse::text(replies::NEW_CONVERSATION));
        };

        let slots = self.slots.available_for_doctor(doctor.user_id).await?;
        let Some(slot) = choice.checked_sub(1).and_then(|i| slots.get(i)) else {
            return Ok(ChatResponse::text(replies::INVALID_SLOT_SELECTION));
        };

        let request = BookAppointmentRequest {
            appointment_date: Local::now().date_naive(),
            patient_id,
            doctor_id: doctor.user_id,
            time_slot_id: slot.time_slot_id,
            is_active: true,
        };
        match self.appointments.book(request).await {
            Ok(_) => {}
            Err(AppointmentError::SlotUnavailable | AppointmentError::SlotNotFound(_)) => {
                return Ok(ChatResponse::text(replies::INVALID_SLOT_SELECTION));
            }
            Err(e) => return Err(e.into()),
        }

        let response = replies::appointment_booked(
            &doctor.full_name(),
            &slot.start_time.format("%I:%M %p").to_string(),
            &slot.end_time.format("%I:%M %p").to_string(),
            &doctor.email,
        );
        conversation.reset();
        Ok(ChatResponse::text(response))
    }

    async fn check_prescriptions(
        &self,
        patient_id: Uuid,
        conversation: &mut Conversation,
    ) -> Result<ChatResponse, ChatError> {
        conversation.stage = Stage::WaitingForExit;

        let Some(appointment) = self.appointments.latest_inactive_for_patient(patient_id).await? else {
            return Ok(ChatResponse::text(replies::NO_PRESCRIPTIONS));
        };

        let prescriptions = self
            .prescriptions
            .for_appointment(appointment.patient_id, appointment.doctor_id)
            .await?;
        if prescriptions.is_empty() {
            return Ok(ChatResponse::text(replies::NO_NEW_PRESCRIPTIONS));
        }

        let pending = self.prescriptions.without_active_reminders(prescriptions).await?;
        if pending.is_empty() {
            return Ok(ChatResponse::text(replies::ACTIVE_PRESCRIPTIONS_HAVE_REMINDERS));
        }

        let list = pending
            .iter()
            .enumerate()
            .map(|(i, p)| format!("{}. {}", i + 1, p.medication_name))
            .collect::<Vec<_>>()
            .join("\n");

        conversation.stage = Stage::ActivateReminders;
        conversation.pending = pending
            .into_iter()
            .map(|p| PendingPrescription {
                prescription_id: p.prescription_id,
                medication_name: p.medication_name,
            })
            .collect();

        Ok(ChatResponse::text(replies::prescriptions_found(&list)))
    }

    fn exit(conversation: &mut Conversation, message: &str) -> ChatResponse {
        if is_one_of(message, EXIT_WORDS) {
            conversation.reset();
            ChatResponse::text(replies::CONFIRM_EXIT)
        } else {
            ChatResponse::text(replies::EXIT_UNRECOGNIZED)
        }
    }

    async fn activate_reminders(&self, conversation: &mut Conversation, message: &str) -> ChatResponse {
        if is_one_of(message, NEGATIVE) {
            conversation.reset();
            return ChatResponse::text(replies::NO_REMINDERS_ACTIVATED);
        }
        if !is_one_of(message, AFFIRMATIVE) {
            return ChatResponse::text(replies::YES_NO_UNRECOGNIZED);
        }

        let Some(current) = conversation.pending.pop_front() else {
            conversation.reset();
            return ChatResponse::text(replies::ALL_REMINDERS_ACTIVE);
        };
        debug!(
            "Activating reminders for prescription: {}, medication: {}",
            current.prescription_id, current.medication_name
        );

        let activated = match self.prescriptions.activate_reminders(current.prescription_id).await {
            Ok(activated) => activated,
            Err(e) => {
                warn!("Activation failed for prescription {}: {}", current.prescription_id, e);
                conversation.reset();
                return ChatResponse::text(replies::issue_activating(
                    &current.medication_name,
                    &e.to_string(),
                ));
            }
        };

        let mut times: Vec<String> = Vec::new();
        for reminder in &activated {
            let formatted = reminder.reminder_time.format("%I:%M %p").to_string();
            if !times.contains(&formatted) {
                times.push(formatted);
            }
        }

        if let Err(e) = self.prescriptions.mark_inactive(current.prescription_id).await {
            warn!("Failed to mark prescription {} as inactive: {}", current.prescription_id, e);
        }

        conversation.stage = Stage::UpdateReminderPrompt;
        conversation.prescription_id = Some(current.prescription_id);
        ChatResponse::text(replies::reminders_activated(
            &current.medication_name,
            &times.join(", "),
        ))
    }

    fn update_prompt(conversation: &mut Conversation, message: &str) -> ChatResponse {
        if is_one_of(message, AFFIRMATIVE) {
            conversation.stage = Stage::CollectReminderTimes;
            return ChatResponse::text(replies::REQUEST_NEW_TIMES);
        }
        if !is_one_of(message, NEGATIVE) {
            return ChatResponse::text(replies::YES_NO_UNRECOGNIZED);
        }
        Self::advance(conversation, None)
    }

    async fn collect_times(&self, conversation: &mut Conversation, message: &str) -> ChatResponse {
        let times = match parse_reminder_times(message) {
            Ok(times) => times,
            Err(e) => {
                warn!("Error parsing new reminder times: {}", e);
                return ChatResponse::text(replies::PROCESSING_ERROR);
            }
        };

        let Some(prescription_id) = conversation.prescription_id else {
            conversation.reset();
            return ChatResponse::text(replies::FINDING_PRESCRIPTION_ERROR);
        };

        if let Err(e) = self
            .prescriptions
            .update_reminder_times(prescription_id, &times)
            .await
        {
            warn!("Error updating reminders for prescription {}: {}", prescription_id, e);
            return ChatResponse::text(replies::PROCESSING_ERROR);
        }

        Self::advance(conversation, Some(&format_24h(&times)))
    }

    /// Offers the next pending prescription or wraps up.
    fn advance(conversation: &mut Conversation, updated_times: Option<&str>) -> ChatResponse {
        if let Some(next) = conversation.pending.front() {
            let response = match updated_times {
                Some(times) => replies::times_updated(times, &next.medication_name),
                None => replies::next_prescription(&next.medication_name),
            };
            conversation.stage = Stage::ActivateReminders;
            return ChatResponse::text(response);
        }

        conversation.reset();
        match updated_times {
            Some(times) => ChatResponse::text(replies::times_updated_all_done(times)),
            None => ChatResponse::text(replies::ALL_PRESCRIPTIONS_DONE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(name: &str) -> PendingPrescription {
        PendingPrescription {
            prescription_id: Uuid::new_v4(),
            medication_name: name.to_string(),
        }
    }

    #[test]
    fn exit_accepts_closing_words_only() {
        let mut conversation = Conversation {
            stage: Stage::WaitingForExit,
            ..Default::default()
        };

        let reply = ChatService::exit(&mut conversation, "maybe");
        assert_eq!(reply.response, replies::EXIT_UNRECOGNIZED);
        assert_eq!(conversation.stage, Stage::WaitingForExit);

        let reply = ChatService::exit(&mut conversation, "thanks");
        assert_eq!(reply.response, replies::CONFIRM_EXIT);
        assert_eq!(conversation.stage, Stage::General);
    }

    #[test]
    fn declining_an_update_moves_to_the_next_prescription() {
        let mut conversation = Conversation {
            stage: Stage::UpdateReminderPrompt,
            pending: [pending("Insulin")].into_iter().collect(),
            ..Default::default()
        };

        let reply = ChatService::update_prompt(&mut conversation, "nope");
        assert_eq!(reply.response, replies::next_prescription("Insulin"));
        assert_eq!(conversation.stage, Stage::ActivateReminders);
    }

    #[test]
    fn declining_the_last_update_finishes() {
        let mut conversation = Conversation {
            stage: Stage::UpdateReminderPrompt,
            ..Default::default()
        };

        let reply = ChatService::update_prompt(&mut conversation, "no");
        assert_eq!(reply.response, replies::ALL_PRESCRIPTIONS_DONE);
        assert_eq!(conversation.stage, Stage::General);
    }

    #[test]
    fn update_prompt_asks_again_on_unclear_answers() {
        let mut conversation = Conversation {
            stage: Stage::UpdateReminderPrompt,
            ..Default::default()
        };

        let reply = ChatService::update_prompt(&mut conversation, "hmm");
        assert_eq!(reply.response, replies::YES_NO_UNRECOGNIZED);
        assert_eq!(conversation.stage, Stage::UpdateReminderPrompt);

        let reply = ChatService::update_prompt(&mut conversation, "sure");
        assert_eq!(reply.response, replies::REQUEST_NEW_TIMES);
        assert_eq!(conversation.stage, Stage::CollectReminderTimes);
    }
}
