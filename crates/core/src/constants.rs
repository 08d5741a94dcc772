// Shutter constants (no magic values)
use std::time::Duration;

/// Name used in log events when none is configured
pub const DEFAULT_SHUTTER_NAME: &str = "shutter";

/// Callbacks running longer than this are reported at warn level (1s)
/// Callbacks block the path to `terminated`, so they are expected to be short
pub const DEFAULT_SLOW_CALLBACK_THRESHOLD: Duration = Duration::from_secs(1);
