pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::*;
pub use services::doctor::DoctorService;
pub use services::specialization::SpecializationMapper;
pub use services::timeslot::TimeSlotService;
