pub mod client;
pub mod config;
pub mod error;
pub mod reporter;
pub mod simulation;
pub mod source;

pub use client::ActivityClient;
pub use config::{DEFAULT_REPORT_INTERVAL, ReporterConfig};
pub use error::ReporterError;
pub use reporter::ActivityReporter;
pub use source::{PlayerSample, PlayerStateSource};
