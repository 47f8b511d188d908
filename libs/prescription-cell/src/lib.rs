pub mod handlers;
pub mod models;
pub mod reminders;
pub mod router;
pub mod services;

pub use models::*;
pub use router::PrescriptionState;
pub use services::inbox::ReminderInbox;
pub use services::prescription::PrescriptionService;
pub use services::scheduler::ReminderScheduler;
