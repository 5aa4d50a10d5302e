use std::time::Duration;
use url::Url;

use crate::error::ReporterError;

pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(60);

/// Deployment-time settings of the reporter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReporterConfig {
    /// Full URL of the service's update endpoint
    pub endpoint: Url,
    /// Time between two periodic reports of the same player
    pub interval: Duration,
    /// Log every report and the payload of failed ones
    pub debug: bool,
}

impl ReporterConfig {
    pub fn new(endpoint: &str) -> Result<Self, ReporterError> {
        let invalid = |reason: String| ReporterError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason,
        };

        let url = Url::parse(endpoint.trim()).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {}", url.scheme())));
        }

        Ok(Self {
            endpoint: url,
            interval: DEFAULT_REPORT_INTERVAL,
            debug: false,
        })
    }

    pub fn with_interval(mut self, interval: Duration) -> Result<Self, ReporterError> {
        if interval.is_zero() {
            return Err(ReporterError::InvalidInterval);
        }
        self.interval = interval;
        Ok(self)
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}
