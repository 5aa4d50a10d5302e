use anyhow::Result;
use server::db::{ActivityStore, MemoryActivityStore};
use server::http_server::serve_with_listener;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// An activity API served on an ephemeral localhost port
pub struct TestServer {
    pub addr: String,
    cancellation_token: CancellationToken,
    handle: JoinHandle<Result<()>>,
}

impl TestServer {
    /// Start a server over a fresh in-memory store
    pub async fn start_in_memory() -> Result<(Self, Arc<MemoryActivityStore>)> {
        let store = Arc::new(MemoryActivityStore::new());
        let server = Self::start(store.clone()).await?;
        Ok((server, store))
    }

    pub async fn start(store: Arc<dyn ActivityStore>) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?.to_string();
        let cancellation_token = CancellationToken::new();

        let token = cancellation_token.clone();
        let handle = tokio::spawn(async move { serve_with_listener(listener, store, token).await });

        Ok(Self {
            addr,
            cancellation_token,
            handle,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn shutdown(self) -> Result<()> {
        self.cancellation_token.cancel();
        self.handle.await??;
        Ok(())
    }
}
