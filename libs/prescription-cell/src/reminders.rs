//! Reminder scheduling rules, kept free of I/O.

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::error;
use uuid::Uuid;

use crate::models::{
    NewReminderRow, Prescription, PrescriptionError, Reminder, ReminderStatus,
};

fn at(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Times of day used for a fresh prescription.
pub fn default_reminder_times(frequency: i32) -> Result<Vec<NaiveTime>, PrescriptionError> {
    match frequency {
        1 => Ok(vec![at(9)]),
        2 => Ok(vec![at(9), at(18)]),
        3 => Ok(vec![at(9), at(13), at(18)]),
        other => Err(PrescriptionError::UnsupportedFrequency(other)),
    }
}

/// `frequency * duration` inactive, undated reminders.
pub fn build_reminders(prescription: &Prescription) -> Result<Vec<NewReminderRow>, PrescriptionError> {
    let times = default_reminder_times(prescription.frequency)?;
    let days = prescription.duration.max(0) as usize;

    Ok((0..days)
        .flat_map(|_| times.iter().copied())
        .map(|reminder_time| NewReminderRow {
            prescription_id: prescription.prescription_id,
            reminder_time,
            reminder_date: None,
            status: ReminderStatus::Inactive,
        })
        .collect())
}

/// Dates for each reminder, starting at `first_day`. Every day of the
/// course gets one reminder per time of day.
pub fn plan_activation(
    reminders: &[Reminder],
    prescription: &Prescription,
    first_day: NaiveDate,
) -> Vec<(Uuid, NaiveDate)> {
    let needed = (prescription.frequency.max(0) * prescription.duration.max(0)) as usize;
    if reminders.len() != needed {
        error!(
            "Mismatch: {} reminders for prescription requiring {}.",
            reminders.len(),
            needed
        );
    }

    let duration = prescription.duration.max(1) as u64;
    let mut ordered: Vec<&Reminder> = reminders.iter().collect();
    ordered.sort_by_key(|r| (r.reminder_time, r.reminder_id));

    ordered
        .into_iter()
        .take(needed)
        .enumerate()
        .filter_map(|(i, reminder)| {
            first_day
                .checked_add_days(Days::new(i as u64 % duration))
                .map(|date| (reminder.reminder_id, date))
        })
        .collect()
}

/// Cycles `new_times` over the reminders ordered by date, then time.
pub fn assign_times(reminders: &[Reminder], new_times: &[NaiveTime]) -> Vec<(Uuid, NaiveTime)> {
    if new_times.is_empty() {
        return Vec::new();
    }

    let mut ordered: Vec<&Reminder> = reminders.iter().collect();
    ordered.sort_by_key(|r| (r.reminder_date, r.reminder_time, r.reminder_id));

    ordered
        .into_iter()
        .enumerate()
        .map(|(i, reminder)| (reminder.reminder_id, new_times[i % new_times.len()]))
        .collect()
}

/// Active and dated either before today, or today no later than now.
pub fn is_due(reminder: &Reminder, now: NaiveDateTime) -> bool {
    if reminder.status != ReminderStatus::Active {
        return false;
    }
    match reminder.reminder_date {
        Some(date) if date < now.date() => true,
        Some(date) if date == now.date() => reminder.reminder_time <= now.time(),
        _ => false,
    }
}
