// Central Error Type for the Shutter

use std::sync::Arc;
use thiserror::Error;

/// Why a shutter was closed.
///
/// Opaque to the shutter: stored once and handed back verbatim (the same `Arc`)
/// to every callback and every `err()` caller.
pub type Reason = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Errors originated by the shutter itself
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutterError {
    /// `locked_init` was called after shutdown had already begun
    #[error("shutter was already down")]
    AlreadyShutDown,
}

/// Result type alias using ShutterError
pub type Result<T> = std::result::Result<T, ShutterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_shut_down_display() {
        assert_eq!(
            ShutterError::AlreadyShutDown.to_string(),
            "shutter was already down"
        );
    }

    #[test]
    fn test_reason_from_io_error() {
        let reason: Reason = Arc::new(std::io::Error::other("disk gone"));
        assert_eq!(reason.to_string(), "disk gone");
    }
}
