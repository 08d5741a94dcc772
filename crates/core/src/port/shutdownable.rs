// Shutdownable port (shutter embedded in a larger object)

use crate::error::{Reason, ShutterError};
use crate::shutter::{Shutter, Signal};

/// Types that own a [`Shutter`] and expose its lifecycle as their own
///
/// Only `shutter()` is required; every other method forwards to it.
///
/// # Example
/// ```text
/// struct Connection {
///     shutter: Shutter,
/// }
///
/// impl Shutdownable for Connection {
///     fn shutter(&self) -> &Shutter {
///         &self.shutter
///     }
/// }
///
/// conn.shutdown(None);
/// conn.terminated().await;
/// ```
pub trait Shutdownable {
    fn shutter(&self) -> &Shutter;

    fn shutdown(&self, reason: Option<Reason>) {
        self.shutter().shutdown(reason)
    }

    fn on_shutdown<F>(&self, f: F)
    where
        F: FnOnce(Option<&Reason>) + Send + 'static,
        Self: Sized,
    {
        self.shutter().on_shutdown(f)
    }

    fn terminating(&self) -> Signal {
        self.shutter().terminating()
    }

    fn is_terminating(&self) -> bool {
        self.shutter().is_terminating()
    }

    fn terminated(&self) -> Signal {
        self.shutter().terminated()
    }

    fn is_terminated(&self) -> bool {
        self.shutter().is_terminated()
    }

    fn err(&self) -> Option<Reason> {
        self.shutter().err()
    }

    fn locked_init<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<ShutterError>,
        Self: Sized,
    {
        self.shutter().locked_init(f)
    }
}

impl Shutdownable for Shutter {
    fn shutter(&self) -> &Shutter {
        self
    }
}
