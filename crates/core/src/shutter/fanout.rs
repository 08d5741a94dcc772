// Callback fan-out with panic isolation
use crate::error::Reason;
use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};
use std::time::{Duration, Instant};
use tracing::{error, trace, warn};

/// Shutdown handler, invoked at most once with the recorded reason
pub type Callback = Box<dyn FnOnce(Option<&Reason>) + Send + 'static>;

/// How a single callback finished
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum CallbackOutcome {
    /// Callback returned normally
    Completed,
    /// Callback panicked; the panic was caught
    Panicked(String),
}

/// Fan-out settings, taken from `ShutterConfig`
pub(crate) struct FanOut<'a> {
    pub(crate) name: &'a str,
    pub(crate) slow_threshold: Option<Duration>,
    pub(crate) catch_panics: bool,
}

impl FanOut<'_> {
    /// Run every callback in order, handing each the same reason
    ///
    /// With `catch_panics` a panicking callback is logged and skipped over.
    /// Without it the panic propagates and the remaining callbacks never run.
    pub(crate) fn run(&self, callbacks: Vec<Callback>, reason: Option<&Reason>) -> Vec<CallbackOutcome> {
        let mut outcomes = Vec::with_capacity(callbacks.len());

        for (index, callback) in callbacks.into_iter().enumerate() {
            trace!(shutter = %self.name, index, "Running shutdown callback");
            let started = Instant::now();

            let outcome = match catch_unwind(AssertUnwindSafe(|| callback(reason))) {
                Ok(()) => CallbackOutcome::Completed,
                Err(panic_info) if !self.catch_panics => resume_unwind(panic_info),
                Err(panic_info) => {
                    let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                        s.to_string()
                    } else if let Some(s) = panic_info.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "Unknown panic".to_string()
                    };

                    error!(
                        shutter = %self.name,
                        index,
                        panic_msg = %panic_msg,
                        "Shutdown callback panicked, continuing with the next one"
                    );
                    CallbackOutcome::Panicked(panic_msg)
                }
            };

            let elapsed = started.elapsed();
            if let Some(threshold) = self.slow_threshold {
                if elapsed > threshold {
                    warn!(
                        shutter = %self.name,
                        index,
                        elapsed_ms = %elapsed.as_millis(),
                        threshold_ms = %threshold.as_millis(),
                        "Slow shutdown callback"
                    );
                }
            }

            outcomes.push(outcome);
        }

        outcomes
    }
}
