//! User-facing chatbot texts.

pub const NEW_CONVERSATION: &str =
    "The conversation has been reset. You can start by asking a new question.";
pub const DOCTOR_NOT_FOUND: &str = "I couldn't find the doctor you mentioned. Please enter the full name of the doctor you want to select, or type 'reset' to ask another question.";
pub const NO_OTHER_DOCTORS: &str = "Unfortunately, there are no other doctors available at the moment. You can type 'reset' or 'start over' at any time to begin a new conversation.";
pub const INVALID_SLOT_SELECTION: &str = "The selected time slot is not available. Please enter a valid number corresponding to the slot, or type 'reset' to start over.";
pub const INVALID_INPUT: &str = "Invalid input. Please enter a valid number corresponding to the time slot, or type 'reset' to start over.";
pub const ACTIVE_PRESCRIPTIONS_HAVE_REMINDERS: &str =
    "All your active prescriptions already have active reminders.";
pub const NO_NEW_PRESCRIPTIONS: &str =
    "It appears that your doctor hasn't entered any new prescriptions for you at the moment.";
pub const NO_PRESCRIPTIONS: &str =
    "It appears that your doctor hasn't entered any prescriptions for you at the moment.";
pub const CONFIRM_EXIT: &str = "Understood. Is there anything else I can help you with?";
pub const ALL_REMINDERS_ACTIVE: &str = "All reminders have already been activated.";
pub const NO_REMINDERS_ACTIVATED: &str = "No reminders have been activated.";
pub const REQUEST_NEW_TIMES: &str = "Please provide the new times for your reminders. You can specify them in the format 'HH:MM AM/PM', separated by commas. For example: '09:00 AM, 01:00 PM, 06:00 PM'.";
pub const YES_NO_UNRECOGNIZED: &str = "I didn't understand that. Please answer with 'Yes' or 'No'.";
pub const EXIT_UNRECOGNIZED: &str = "I didn't understand that. Please answer with 'ok' or 'exit'.";
pub const ALL_PRESCRIPTIONS_DONE: &str = "All prescriptions have been processed.";
pub const FINDING_PRESCRIPTION_ERROR: &str = "Sorry, there was an issue finding your prescription.";
pub const PROCESSING_ERROR: &str =
    "There was an error processing the new times. Please try again using the format 'HH:MM AM/PM'.";

const RESET_HINT: &str = "You can type 'reset' or 'start over' to begin a new conversation.";

pub const AFFIRMATIVE: &[&str] = &["yes", "yeah", "yup", "sure", "ok", "alright", "go ahead"];
pub const NEGATIVE: &[&str] = &["no", "nope", "not now", "nah", "never mind"];
pub const EXIT_WORDS: &[&str] = &["ok", "okay", "fine", "thanks", "exit", "no"];
pub const RESET_WORDS: &[&str] = &["reset", "start over"];

pub fn is_one_of(message: &str, words: &[&str]) -> bool {
    words.contains(&message)
}

pub fn plain(triage_response: &str) -> String {
    format!("{} {}", triage_response, RESET_HINT)
}

pub fn no_doctors_for(triage_response: &str, specialization: &str) -> String {
    format!(
        "{} However, no doctors were found for the specialization: {}. {}",
        triage_response, specialization, RESET_HINT
    )
}

pub fn doctors_unavailable(triage_response: &str) -> String {
    format!(
        "{} Unfortunately, no doctors are available at the moment for your concerns. Please consult a healthcare professional if needed.",
        triage_response
    )
}

pub fn doctors_found(triage_response: &str, doctor_list: &str) -> String {
    format!(
        "{}\n\nHere are the available doctors:\n{}\n\nPlease enter the full name of the doctor you want to select, or type 'reset' to start a new conversation.",
        triage_response, doctor_list
    )
}

pub fn no_available_slots(doctor_name: &str) -> String {
    format!(
        "Unfortunately, there are no available time slots for Dr. {} at the moment. Let me find other doctors for you.",
        doctor_name
    )
}

pub fn other_doctors_available(doctor_list: &str) -> String {
    format!(
        "Here are other doctors you can choose from:\n{}\n\nPlease enter the full name of the doctor you would like to select, or type 'reset' to start over.",
        doctor_list
    )
}

pub fn available_slots(doctor_name: &str, slots_list: &str) -> String {
    format!(
        "Here are the available time slots for Dr. {}:\n\n{}\n\nPlease enter the number corresponding to the slot you would like to book. You can also type 'reset' or 'start over' at any time to begin a new conversation.",
        doctor_name, slots_list
    )
}

pub fn appointment_booked(doctor_name: &str, start: &str, end: &str, email: &str) -> String {
    format!(
        "Your appointment with Dr. {} has been successfully booked for {} - {}. \n\nYou can ask any time about your prescription. If prescriptions are available, I can help you activate medication reminders. If no prescriptions are entered yet, I'll let you know.\nFor furthur queries you can contact here {}.\nYou can type 'reset' or 'start over' at any time to begin a new conversation.",
        doctor_name, start, end, email
    )
}

pub fn prescriptions_found(prescription_list: &str) -> String {
    format!(
        "I found the following prescriptions:\n{}\nWould you like to activate reminders for any of them? (Yes/No)",
        prescription_list
    )
}

pub fn reminders_activated(medication_name: &str, reminder_times: &str) -> String {
    format!(
        "Reminders for {} have been activated for: {}.\nWould you like to update the reminder times? (Yes/No)",
        medication_name, reminder_times
    )
}

pub fn issue_activating(medication_name: &str, detail: &str) -> String {
    format!(
        "I'm sorry, there was an issue activating your reminders for {}: {}",
        medication_name, detail
    )
}

pub fn next_prescription(medication_name: &str) -> String {
    format!(
        "Next prescription: {}. Would you like to activate reminders for this prescription? (Yes/No)",
        medication_name
    )
}

pub fn times_updated(formatted_times: &str, next_medication: &str) -> String {
    format!(
        "Reminder times have been updated to: {} (24-hour format).\n\n{}",
        formatted_times,
        next_prescription(next_medication)
    )
}

pub fn times_updated_all_done(formatted_times: &str) -> String {
    format!(
        "Reminder times have been updated to: {}.\n{}",
        formatted_times, ALL_PRESCRIPTIONS_DONE
    )
}
