pub mod doctor;
pub mod specialization;
pub mod timeslot;
