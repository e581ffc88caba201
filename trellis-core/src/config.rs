//! Engine Configuration
//!
//! Every knob has a default matching the classic `v-` directive syntax, so
//! `EngineConfig::default()` is what most callers want. Configuration can
//! also be loaded from JSON; missing fields fall back to their defaults.

use serde::{Deserialize, Serialize};

use crate::error::{BindError, Result};

/// Tunables for directive syntax and change propagation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Attribute prefix that marks a directive (`v-text`, `v-model`, ...).
    pub directive_prefix: String,

    /// Directive name prefix for event bindings (`v-on:click`).
    pub event_marker: String,

    /// Opening delimiter of a text interpolation.
    pub interpolation_open: String,

    /// Closing delimiter of a text interpolation.
    pub interpolation_close: String,

    /// Maximum nesting of write-triggered notifications before the cascade
    /// is cut off with [`BindError::PropagationDepthExceeded`].
    pub max_propagation_depth: usize,

    /// Skip registering a subscriber twice on the same property.
    ///
    /// Turning this off keeps one entry per read when a single resolution
    /// reads the same property more than once. Later re-resolutions never
    /// add entries for registries the subscriber already joined.
    pub dedup_subscribers: bool,

    /// Log and continue when one subscriber fails during notification,
    /// instead of aborting the remaining sequence.
    pub isolate_failures: bool,

    /// Fail resolution on a missing intermediate segment instead of
    /// resolving to `Undefined`.
    pub strict_paths: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            directive_prefix: "v-".to_string(),
            event_marker: "on".to_string(),
            interpolation_open: "{{".to_string(),
            interpolation_close: "}}".to_string(),
            max_propagation_depth: 64,
            dedup_subscribers: true,
            isolate_failures: true,
            strict_paths: false,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON. Absent fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(BindError::Config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_v_prefix() {
        let config = EngineConfig::default();
        assert_eq!(config.directive_prefix, "v-");
        assert_eq!(config.event_marker, "on");
        assert_eq!(config.max_propagation_depth, 64);
        assert!(config.dedup_subscribers);
        assert!(config.isolate_failures);
        assert!(!config.strict_paths);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            EngineConfig::from_json(r#"{ "strict_paths": true, "max_propagation_depth": 8 }"#)
                .unwrap();
        assert!(config.strict_paths);
        assert_eq!(config.max_propagation_depth, 8);
        assert_eq!(config.interpolation_open, "{{");
    }

    #[test]
    fn malformed_json_is_config_error() {
        let err = EngineConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, BindError::Config(_)));
    }
}
