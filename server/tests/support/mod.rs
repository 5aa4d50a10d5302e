#![allow(dead_code)]

pub mod failing_store;
pub mod test_server;

pub use failing_store::FailingStore;
pub use test_server::TestServer;

/// Macro to wrap test functions with a timeout to prevent hanging tests
#[macro_export]
macro_rules! timeout_test {
    ($duration:expr, $body:expr) => {
        tokio::time::timeout($duration, $body)
            .await
            .map_err(|_| anyhow::anyhow!("Test timed out after {:?}", $duration))?
    };
}
