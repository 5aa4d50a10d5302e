use anyhow::{Context, Result, bail};
use std::env;
use std::fmt;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;

/// Where activity records are persisted
#[derive(Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Redis { url: String },
    /// Process-local store, lost on restart. For local development.
    Memory,
}

// The connection string may carry credentials.
impl fmt::Debug for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Redis { .. } => f.write_str("Redis { url: <redacted> }"),
            StoreBackend::Memory => f.write_str("Memory"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub bind_addr: String,
    pub port: u16,
    pub store: StoreBackend,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration through `lookup` instead of the process env.
    ///
    /// - `ACTIVITY_STORE`: `redis` (default) or `memory`
    /// - `ACTIVITY_REDIS_URL`, falling back to `REDIS_URL`
    /// - `ACTIVITY_BIND_ADDR` (default `0.0.0.0`)
    /// - `PORT` (default 5000)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("ACTIVITY_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let port = match lookup("PORT") {
            Some(port) => port
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT must be a valid port number, got {:?}", port))?,
            None => DEFAULT_PORT,
        };

        let backend = lookup("ACTIVITY_STORE").unwrap_or_else(|| "redis".to_string());
        let store = match backend.trim().to_ascii_lowercase().as_str() {
            "redis" => {
                let url = lookup("ACTIVITY_REDIS_URL")
                    .or_else(|| lookup("REDIS_URL"))
                    .filter(|url| !url.trim().is_empty())
                    .context("ACTIVITY_REDIS_URL must be set in environment or .env file")?;
                StoreBackend::Redis { url }
            }
            "memory" => StoreBackend::Memory,
            other => bail!("ACTIVITY_STORE must be 'redis' or 'memory', got {:?}", other),
        };

        Ok(Self {
            bind_addr,
            port,
            store,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}
