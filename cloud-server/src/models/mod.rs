//! Data models

pub mod prediction_log;
pub mod user;

pub use prediction_log::*;
pub use user::*;
