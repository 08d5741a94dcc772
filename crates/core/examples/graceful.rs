//! Graceful Shutdown Example
//!
//! Workers stop on `terminating`, resources registered through `locked_init`
//! are released by callbacks, and main waits on `terminated` with a timeout.
//!
//! # Usage
//!
//! ```bash
//! SHUTTER_LOG_FORMAT=json RUST_LOG=shutter_core=trace,graceful=info \
//!     cargo run --example graceful
//! ```
//!
//! Press Ctrl+C to shut down.

use anyhow::Result;
use shutter_core::{Shutter, ShutterConfig};
use std::future::IntoFuture;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const WORKERS: usize = 3;
const TERMINATED_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging
    let log_format = std::env::var("SHUTTER_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("shutter_core=debug,graceful=info"))?;

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }

    // 2. Load configuration
    let name = std::env::var("SHUTTER_NAME").unwrap_or_else(|_| "graceful".to_string());
    let shutter = Shutter::with_config(ShutterConfig::named(name));

    // 3. Register resources; each one is released by a callback
    for resource in ["database", "cache"] {
        shutter.locked_init(|| {
            info!(resource, "Resource opened");
            shutter.on_shutdown(move |reason| {
                info!(resource, clean = reason.is_none(), "Resource released");
            });
            Ok::<_, anyhow::Error>(())
        })?;
    }

    // 4. Start workers
    let mut handles = Vec::with_capacity(WORKERS);
    for id in 0..WORKERS {
        let shutter = shutter.clone();
        handles.push(tokio::spawn(async move {
            let mut ticks = 0u64;
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(Duration::from_millis(500)) => ticks += 1,
                    _ = shutter.terminating().into_future() => break,
                }
            }
            info!(worker = id, ticks, "Worker stopped");
        }));
    }

    info!("Press Ctrl+C to shutdown");

    // 5. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    shutter.shutdown(None);
    if tokio::time::timeout(TERMINATED_TIMEOUT, shutter.terminated().into_future())
        .await
        .is_err()
    {
        anyhow::bail!("shutdown callbacks did not finish within {:?}", TERMINATED_TIMEOUT);
    }
    for handle in handles {
        handle.await?;
    }

    info!("Shutdown complete.");

    Ok(())
}
