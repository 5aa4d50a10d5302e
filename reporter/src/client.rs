use common::{ActivityUpdate, StatusResponse};
use reqwest::Client;
use std::time::Duration;
use url::Url;

use crate::error::ReporterError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Posts activity updates to the service's update endpoint.
#[derive(Clone)]
pub struct ActivityClient {
    http: Client,
    endpoint: Url,
}

impl ActivityClient {
    pub fn new(endpoint: Url) -> Result<Self, ReporterError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_client(http, endpoint))
    }

    pub fn with_client(http: Client, endpoint: Url) -> Self {
        Self { http, endpoint }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub async fn send(&self, update: &ActivityUpdate) -> Result<(), ReporterError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(update)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        // Prefer the service's own reason; fall back to the status line.
        let reason = match response.json::<StatusResponse>().await {
            Ok(body) => body.reason.unwrap_or_else(|| status.to_string()),
            Err(_) => status.to_string(),
        };
        Err(ReporterError::Rejected {
            status: status.as_u16(),
            reason,
        })
    }
}
