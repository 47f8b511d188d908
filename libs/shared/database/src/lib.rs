pub mod client;
pub mod error;

pub use client::{encode, ilike, DbClient};
pub use error::DbError;
