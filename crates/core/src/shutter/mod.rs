// Shutter - one-shot shutdown signal with ordered callback fan-out

mod fanout;
mod signal;

pub use fanout::Callback;
pub use signal::Signal;

use crate::config::ShutterConfig;
use crate::error::{Reason, ShutterError};
use fanout::{CallbackOutcome, FanOut};
use signal::Latch;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::Instant;
use tracing::{debug, warn};

/// One-shot shutdown signal shared by every part of a unit of work
///
/// Lifecycle: `UNSTARTED -> TERMINATING -> TERMINATED`, never reversed.
///
/// - `shutdown()` records the reason, signals `terminating`, runs the
///   registered callbacks in order, then signals `terminated`.
/// - Only the first `shutdown()` call has any effect. Later calls return at
///   once, even while the first one is still running callbacks.
/// - `locked_init()` runs a closure that shutdown cannot start during.
///
/// `Shutter` is a cheap handle: clones share the same state.
#[derive(Clone)]
pub struct Shutter {
    inner: Arc<Inner>,
}

struct Inner {
    config: ShutterConfig,
    /// Single-execution gate for `shutdown()`, independent of `state`
    started: AtomicBool,
    /// Serializes `locked_init` against recording the reason
    state: Mutex<()>,
    /// Written once under `state`, before `terminating` opens
    reason: OnceLock<Option<Reason>>,
    /// Callbacks not yet run; drained when `terminating` opens
    callbacks: Mutex<Vec<Callback>>,
    /// Every registration ever made, drained or not
    registered: AtomicUsize,
    terminating: Latch,
    terminated: Latch,
}

impl Shutter {
    /// Create an open shutter with default config
    pub fn new() -> Self {
        Self::with_config(ShutterConfig::default())
    }

    /// Create an open shutter with a single shutdown callback
    pub fn with_callback<F>(f: F) -> Self
    where
        F: FnOnce(Option<&Reason>) + Send + 'static,
    {
        let shutter = Self::new();
        shutter.on_shutdown(f);
        shutter
    }

    pub fn with_config(config: ShutterConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                started: AtomicBool::new(false),
                state: Mutex::new(()),
                reason: OnceLock::new(),
                callbacks: Mutex::new(Vec::new()),
                registered: AtomicUsize::new(0),
                terminating: Latch::new(),
                terminated: Latch::new(),
            }),
        }
    }

    /// Name from the config, as it appears in log events
    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    /// Register a handler to run on shutdown
    ///
    /// Handlers run sequentially in registration order, on the thread that
    /// won the `shutdown()` call. A handler registered after shutdown began is
    /// kept but never runs.
    pub fn on_shutdown<F>(&self, f: F)
    where
        F: FnOnce(Option<&Reason>) + Send + 'static,
    {
        if self.is_terminating() {
            warn!(
                shutter = %self.name(),
                "Shutdown callback registered after shutdown began, it will never run"
            );
        }
        lock(&self.inner.callbacks).push(Box::new(f));
        self.inner.registered.fetch_add(1, Ordering::AcqRel);
    }

    /// Number of registered callbacks, including ones registered too late to run
    pub fn callback_count(&self) -> usize {
        self.inner.registered.load(Ordering::Acquire)
    }

    /// Close the shutter
    ///
    /// `None` means a clean shutdown. Only the first call records its reason
    /// and runs callbacks; every other call returns immediately.
    ///
    /// Callbacks run on the calling thread without the state lock held, so they
    /// may call `err()`, `is_terminating()` or shut down *other* shutters.
    /// Calling `shutdown()` on this same shutter from a callback is a contract
    /// violation; here it is a no-op.
    pub fn shutdown(&self, reason: Option<Reason>) {
        if self
            .inner
            .started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        let callbacks = {
            let _guard = lock(&self.inner.state);
            debug!(
                shutter = %self.name(),
                clean = reason.is_none(),
                reason = ?reason.as_ref().map(|r| r.to_string()),
                "Shutdown started"
            );
            // The gate guarantees a single writer
            let _ = self.inner.reason.set(reason);
            // Callbacks registered from here on are late and never run
            let callbacks = std::mem::take(&mut *lock(&self.inner.callbacks));
            let opened = self.inner.terminating.open();
            debug_assert!(opened, "terminating opened twice");
            callbacks
        };

        let started = Instant::now();
        let count = callbacks.len();
        let config = &self.inner.config;
        let outcomes = FanOut {
            name: &config.name,
            slow_threshold: config.slow_callback_threshold,
            catch_panics: config.catch_callback_panics,
        }
        .run(callbacks, self.recorded_reason());
        let panicked = outcomes
            .iter()
            .filter(|o| matches!(o, CallbackOutcome::Panicked(_)))
            .count();

        let _guard = lock(&self.inner.state);
        let opened = self.inner.terminated.open();
        debug_assert!(opened, "terminated opened twice");
        debug!(
            shutter = %self.name(),
            callbacks = count,
            panicked,
            elapsed_ms = %started.elapsed().as_millis(),
            "Shutdown complete"
        );
    }

    /// Close the shutter with an error as the reason
    pub fn shutdown_with<E>(&self, err: E)
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.shutdown(Some(Arc::new(err)));
    }

    /// Completes once shutdown has been requested, before any callback runs
    pub fn terminating(&self) -> Signal {
        self.inner.terminating.signal()
    }

    pub fn is_terminating(&self) -> bool {
        self.inner.terminating.is_open()
    }

    /// Completes once every callback has returned
    pub fn terminated(&self) -> Signal {
        self.inner.terminated.signal()
    }

    pub fn is_terminated(&self) -> bool {
        self.inner.terminated.is_open()
    }

    /// Reason passed to the winning `shutdown()` call
    ///
    /// `None` before shutdown and after a clean shutdown. Never blocks, so it is
    /// safe from callbacks and from inside `locked_init`.
    pub fn err(&self) -> Option<Reason> {
        self.recorded_reason().cloned()
    }

    /// Run `f` only if shutdown has not begun, and keep it from beginning until `f` returns
    ///
    /// Returns `ShutterError::AlreadyShutDown` (converted into `E`) without
    /// running `f` once `terminating` is signaled.
    ///
    /// `f` must be short and must not call `shutdown()` on this shutter: that
    /// waits for the lock `f` is running under and never returns.
    ///
    /// # Example
    /// ```text
    /// shutter.locked_init(|| {
    ///     let conn = pool.open()?;
    ///     shutter.on_shutdown(move |_| conn.close());
    ///     Ok::<_, anyhow::Error>(())
    /// })?;
    /// ```
    pub fn locked_init<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<ShutterError>,
    {
        let _guard = lock(&self.inner.state);
        if self.is_terminating() {
            debug!(shutter = %self.name(), "Locked init rejected, shutter already down");
            return Err(ShutterError::AlreadyShutDown.into());
        }
        f()
    }

    fn recorded_reason(&self) -> Option<&Reason> {
        self.inner.reason.get().and_then(Option::as_ref)
    }
}

impl Default for Shutter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Shutter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shutter")
            .field("name", &self.name())
            .field("terminating", &self.is_terminating())
            .field("terminated", &self.is_terminated())
            .field("err", &self.err().map(|r| r.to_string()))
            .finish()
    }
}

// Neither lock protects data a panic could leave half-written.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
