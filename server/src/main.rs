use anyhow::{Context, Result};
use server::config::{ServiceConfig, StoreBackend};
use server::db::{ActivityStore, MemoryActivityStore, RedisActivityStore};
use server::http_server::run_http_server;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if exists
    dotenv::dotenv().ok();

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = ServiceConfig::from_env()?;
    info!("Starting activity service: {:?}", config);

    // Store connection, shared by every request for the life of the process
    let store: Arc<dyn ActivityStore> = match &config.store {
        StoreBackend::Redis { url } => {
            let store = RedisActivityStore::connect(url).await?;
            store.ping().await.context("Redis activity store is not reachable")?;
            Arc::new(store)
        }
        StoreBackend::Memory => {
            warn!("Using in-memory activity store; records are lost on restart");
            Arc::new(MemoryActivityStore::new())
        }
    };

    let cancellation_token = CancellationToken::new();
    let addr = config.listen_addr();
    let server_token = cancellation_token.clone();
    let mut server =
        tokio::spawn(async move { run_http_server(&addr, store, server_token).await });

    // Wait for shutdown signal
    tokio::select! {
        result = &mut server => {
            return result.context("HTTP server task panicked")?;
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for shutdown signal")?;
            info!("Received shutdown signal. Shutting down gracefully...");
        }
    }

    cancellation_token.cancel();
    server.await.context("HTTP server task panicked")??;

    info!("Server shut down successfully");
    Ok(())
}
