pub mod handlers;
pub mod hub;
pub mod router;

pub use hub::{Notification, NotificationHub};
