pub mod handlers;
pub mod router;
pub mod services;

pub use services::auth::{Account, AuthService};
pub use services::password::PasswordService;
