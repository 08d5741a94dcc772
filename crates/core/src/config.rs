// Shutter configuration

use crate::constants::{DEFAULT_SHUTTER_NAME, DEFAULT_SLOW_CALLBACK_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Shutter configuration
///
/// Every field has a default, so a config file only needs to name what it changes:
///
/// ```text
/// { "name": "ingest", "slow_callback_threshold": null }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShutterConfig {
    /// Label attached to every log event of this instance
    pub name: String,

    /// Callbacks that run longer than this are logged at warn level (`None` disables)
    pub slow_callback_threshold: Option<Duration>,

    /// Isolate panicking callbacks so the rest of the fan-out still runs.
    ///
    /// When `false`, a callback panic unwinds out of `shutdown()`, the remaining
    /// callbacks are skipped and `terminated` is never signaled.
    pub catch_callback_panics: bool,
}

impl ShutterConfig {
    /// Default config with a custom name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl Default for ShutterConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SHUTTER_NAME.to_string(),
            slow_callback_threshold: Some(DEFAULT_SLOW_CALLBACK_THRESHOLD),
            catch_callback_panics: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ShutterConfig::default();
        assert_eq!(config.name, "shutter");
        assert_eq!(config.slow_callback_threshold, Some(Duration::from_secs(1)));
        assert!(config.catch_callback_panics);
    }

    #[test]
    fn test_named_keeps_other_defaults() {
        let config = ShutterConfig::named("ingest");
        assert_eq!(config.name, "ingest");
        assert_eq!(
            config.slow_callback_threshold,
            ShutterConfig::default().slow_callback_threshold
        );
    }

    #[test]
    fn test_partial_config_from_json() {
        let config: ShutterConfig =
            serde_json::from_str(r#"{"name": "rpc", "slow_callback_threshold": null}"#).unwrap();

        assert_eq!(config.name, "rpc");
        assert_eq!(config.slow_callback_threshold, None);
        assert!(config.catch_callback_panics, "Missing fields should fall back to defaults");
    }
}
