pub mod chat;
pub mod triage;
