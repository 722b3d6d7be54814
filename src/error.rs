//! Error types for webview-sim.
//!
//! All errors are strongly typed using thiserror. Surface implementations
//! report `SurfaceError`; the controller wraps those into `InjectionError`
//! and absorbs them at its boundary (see `controller::Transition`).

use std::path::PathBuf;

use thiserror::Error;

use crate::simulation::SimulationId;

/// Errors reported by a renderable surface.
#[derive(Debug, Clone, Error)]
pub enum SurfaceError {
    /// The surface refused or failed the call.
    #[error("Surface rejected {operation}: {message}")]
    Rejected {
        /// The refused call.
        operation: SurfaceOperation,
        /// Surface-specific reason.
        message: String,
    },

    /// The surface has been torn down.
    #[error("Surface is detached")]
    Detached,
}

impl SurfaceError {
    /// Creates a rejection for the given operation.
    #[must_use]
    pub fn rejected(operation: SurfaceOperation, message: impl Into<String>) -> Self {
        Self::Rejected {
            operation,
            message: message.into(),
        }
    }
}

/// The surface call that was in flight when an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceOperation {
    /// `Surface::insert_css`.
    InsertCss,
    /// `Surface::remove_inserted_css`.
    RemoveInsertedCss,
    /// `Surface::execute_javascript`.
    ExecuteJavaScript,
    /// `Surface::reload`.
    Reload,
}

impl std::fmt::Display for SurfaceOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::InsertCss => "insert_css",
            Self::RemoveInsertedCss => "remove_inserted_css",
            Self::ExecuteJavaScript => "execute_javascript",
            Self::Reload => "reload",
        };
        f.write_str(name)
    }
}

/// Errors that occur while injecting a simulation.
#[derive(Debug, Clone, Error)]
pub enum InjectionError {
    /// No surface is bound to the controller.
    #[error("No surface is bound")]
    SurfaceUnavailable,

    /// A surface call failed while injecting.
    #[error("Injecting '{simulation}' failed during {stage}: {source}")]
    InjectionFailed {
        /// The simulation being injected.
        simulation: SimulationId,
        /// The surface call that failed.
        stage: SurfaceOperation,
        /// The surface's error.
        #[source]
        source: SurfaceError,
    },

    /// The id is not in the registry.
    #[error("Unknown simulation id: {id}")]
    UnknownSimulationId {
        /// The rejected id.
        id: String,
    },
}

impl InjectionError {
    /// Returns true if re-selecting the same simulation may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::InjectionFailed { .. })
    }

    /// The simulation the failed operation was about, when known.
    #[must_use]
    pub fn simulation(&self) -> Option<&SimulationId> {
        match self {
            Self::InjectionFailed { simulation, .. } => Some(simulation),
            Self::SurfaceUnavailable | Self::UnknownSimulationId { .. } => None,
        }
    }
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// Path of the config file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config is not valid JSON for `SimulationConfig`.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field holds an unusable value.
    #[error("Invalid config field '{field}': {reason}")]
    Invalid {
        /// Name of the offending field.
        field: String,
        /// Why the value was refused.
        reason: String,
    },
}

/// Result type alias for surface calls.
pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// Result type alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_error_rejected() {
        let err = SurfaceError::rejected(SurfaceOperation::InsertCss, "document gone");
        let msg = format!("{err}");
        assert!(msg.contains("insert_css"));
        assert!(msg.contains("document gone"));
    }

    #[test]
    fn test_injection_failed_is_retryable() {
        let err = InjectionError::InjectionFailed {
            simulation: SimulationId::new("grid"),
            stage: SurfaceOperation::ExecuteJavaScript,
            source: SurfaceError::Detached,
        };
        assert!(err.is_retryable());
        assert_eq!(err.simulation().map(SimulationId::as_str), Some("grid"));
        let msg = format!("{err}");
        assert!(msg.contains("'grid'"));
        assert!(msg.contains("execute_javascript"));
    }

    #[test]
    fn test_unknown_simulation_not_retryable() {
        let err = InjectionError::UnknownSimulationId {
            id: "chaos".to_string(),
        };
        assert!(!err.is_retryable());
        assert!(err.simulation().is_none());
        assert!(format!("{err}").contains("chaos"));
    }

    #[test]
    fn test_config_error_invalid() {
        let err = ConfigError::Invalid {
            field: "grid_size".to_string(),
            reason: "must be positive".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("grid_size"));
        assert!(msg.contains("must be positive"));
    }

    #[test]
    fn test_config_error_from_serde() {
        let serde_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: ConfigError = serde_err.into();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
