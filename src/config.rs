//! Configuration.
//!
//! `SimulationConfig` can be built in code or loaded from JSON. Every field
//! has a default, so an empty object is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::assets::DEFAULT_GRID_SIZE;
use crate::channel::DEBUG_TOOLS_TOPIC;
use crate::controller::ControllerConfig;
use crate::error::{ConfigError, ConfigResult};
use crate::registry::StylesheetRegistry;

/// Largest accepted grid cell size, in CSS pixels.
pub const MAX_GRID_SIZE: u32 = 512;

/// What selecting an unregistered simulation id does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownSimulationPolicy {
    /// Treat it like "disable": the active simulation is cleared.
    #[default]
    Clear,
    /// Refuse it: nothing changes and the transition reports an error.
    Reject,
}

/// Settings for wiring controllers to a selection topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Selection channel topic the controllers listen on.
    pub topic: String,
    /// Cell size of the grid simulation, in CSS pixels.
    pub grid_size: u32,
    /// How controllers treat ids missing from the registry.
    pub unknown_policy: UnknownSimulationPolicy,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            topic: DEBUG_TOOLS_TOPIC.to_string(),
            grid_size: DEFAULT_GRID_SIZE,
            unknown_policy: UnknownSimulationPolicy::default(),
        }
    }
}

impl SimulationConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Check field ranges.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.topic.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "topic".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.grid_size == 0 || self.grid_size > MAX_GRID_SIZE {
            return Err(ConfigError::Invalid {
                field: "grid_size".to_string(),
                reason: format!("must be within 1..={MAX_GRID_SIZE}, got {}", self.grid_size),
            });
        }
        Ok(())
    }

    /// Controller settings derived from this configuration.
    #[must_use]
    pub const fn controller(&self) -> ControllerConfig {
        ControllerConfig {
            unknown_policy: self.unknown_policy,
        }
    }

    /// Built-in registry with the configured grid size.
    #[must_use]
    pub fn registry(&self) -> StylesheetRegistry {
        StylesheetRegistry::builtin(self.grid_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let cfg = SimulationConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg, SimulationConfig::default());
        assert_eq!(cfg.topic, "debug-tools");
        assert_eq!(cfg.grid_size, 15);
        assert_eq!(cfg.unknown_policy, UnknownSimulationPolicy::Clear);
    }

    #[test]
    fn test_parse_reject_policy() {
        let cfg = SimulationConfig::from_json_str(r#"{"unknown_policy": "reject", "grid_size": 8}"#).unwrap();
        assert_eq!(cfg.controller().unknown_policy, UnknownSimulationPolicy::Reject);
        assert!(cfg.registry().lookup("grid").unwrap().css_text().contains("8px 8px"));
    }

    #[test]
    fn test_zero_grid_size_rejected() {
        let err = SimulationConfig::from_json_str(r#"{"grid_size": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref field, .. } if field == "grid_size"));
    }

    #[test]
    fn test_blank_topic_rejected() {
        let err = SimulationConfig::from_json_str(r#"{"topic": "  "}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref field, .. } if field == "topic"));
    }

    #[test]
    fn test_unknown_field_is_parse_error() {
        let err = SimulationConfig::from_json_str(r#"{"persist": true}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
