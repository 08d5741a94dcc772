// Broadcast latches behind terminating() / terminated()

use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::watch;

/// Write side of a one-shot latch, owned by the shutter.
///
/// Built on `watch` so any number of readers can check or await it without
/// consuming anything.
#[derive(Debug)]
pub(crate) struct Latch {
    tx: Arc<watch::Sender<bool>>,
}

impl Latch {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Open the latch. Returns false if it was already open.
    pub(crate) fn open(&self) -> bool {
        !self.tx.send_replace(true)
    }

    pub(crate) fn is_open(&self) -> bool {
        *self.tx.borrow()
    }

    pub(crate) fn signal(&self) -> Signal {
        Signal {
            tx: Arc::clone(&self.tx),
        }
    }
}

/// Wait handle for one shutdown phase
///
/// Awaiting a `Signal` completes once the phase is reached, immediately if it
/// already was. Handles are independent: waiting on one never affects another.
///
/// # Example
/// ```text
/// let terminated = shutter.terminated();
/// tokio::spawn(async move { shutter.shutdown(None) });
/// terminated.await;
/// ```
#[derive(Debug, Clone)]
pub struct Signal {
    // Holding the sender keeps a pending wait pending even if every Shutter
    // handle is dropped before shutdown.
    tx: Arc<watch::Sender<bool>>,
}

impl Signal {
    /// Point-in-time check, never blocks
    pub fn is_signaled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait until the phase is reached
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // Err only when the sender is gone, and we hold it
        let _ = rx.wait_for(|open| *open).await;
    }

    /// Block the current thread until the phase is reached
    ///
    /// For plain threads only. Inside an async runtime use `.await` instead,
    /// this would park a runtime worker.
    pub fn wait_blocking(&self) {
        futures::executor::block_on(self.wait());
    }
}

impl IntoFuture for Signal {
    type Output = ();
    type IntoFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move { self.wait().await })
    }
}
