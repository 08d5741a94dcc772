//! Shared helpers for the shutter integration tests

use std::sync::Once;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Reason type used across tests
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TestError(pub String);

impl TestError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Route shutter log events to the test harness output
///
/// Filter with `RUST_LOG`, e.g. `RUST_LOG=shutter_core=trace cargo test`.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("shutter_core=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_test_writer()
            .try_init();
    });
}
