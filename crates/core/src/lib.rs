//! Shutter - one-shot shutdown coordination
//!
//! A [`Shutter`] answers "has this unit of work been told to stop, and why":
//!
//! - `terminating()` / `terminated()` are awaitable phase signals,
//! - `err()` returns the recorded reason,
//! - `on_shutdown()` callbacks run once, in registration order,
//! - `locked_init()` runs setup code that shutdown cannot interleave with.
//!
//! # Example
//!
//! ```no_run
//! use shutter_core::Shutter;
//!
//! #[tokio::main]
//! async fn main() {
//!     let shutter = Shutter::with_callback(|reason| {
//!         println!("closing, reason: {:?}", reason.map(|r| r.to_string()));
//!     });
//!
//!     let worker = shutter.clone();
//!     let handle = tokio::spawn(async move {
//!         worker.terminating().await;
//!         // stop accepting work
//!     });
//!
//!     shutter.shutdown(None);
//!     shutter.terminated().await;
//!     handle.await.unwrap();
//! }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod port;
pub mod shutter;

pub use config::ShutterConfig;
pub use error::{Reason, Result, ShutterError};
pub use port::Shutdownable;
pub use shutter::{Callback, Shutter, Signal};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
