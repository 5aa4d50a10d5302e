use anyhow::{Context, Result};
use redis::Client;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use std::time::Duration;

/// Creates the process-wide ConnectionManager used by the activity store.
///
/// The manager is cheap to clone and multiplexes every clone over one
/// connection, reconnecting on its own when the link drops. Requests that
/// arrive while it is reconnecting fail fast and surface as a 503.
pub async fn create_connection_manager(client: Client) -> Result<ConnectionManager> {
    let config = ConnectionManagerConfig::new()
        .set_connection_timeout(Duration::from_secs(5))
        .set_response_timeout(Duration::from_secs(5))
        .set_number_of_retries(3)
        .set_exponent_base(2)
        .set_factor(500)
        .set_max_delay(10000);

    ConnectionManager::new_with_config(client, config)
        .await
        .context("Failed to create Redis connection manager with config")
}
