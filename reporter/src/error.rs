use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReporterError {
    #[error("invalid endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("report interval must be greater than zero")]
    InvalidInterval,

    /// The update never got a response: refused, reset, timed out.
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("service rejected update with {status}: {reason}")]
    Rejected { status: u16, reason: String },
}
