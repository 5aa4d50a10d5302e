pub mod activity;
pub mod error;
pub mod log_event;

pub use error::ApiError;
