pub mod inbox;
pub mod prescription;
pub mod scheduler;
