//! Renderable surface capability.
//!
//! A surface is the embedded web-content viewer the controller injects into.
//! The trait is the minimal capability set the controller needs; embedders
//! implement it over their actual viewer. `InMemorySurface` is a recording
//! implementation for tests and headless use.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::SurfaceResult;

pub mod memory;

pub use memory::{InMemorySurface, SurfaceCall};

/// Opaque token identifying one CSS insertion.
///
/// Only the surface that minted a handle can interpret it. A handle is
/// invalid once removed and once the surface has navigated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InjectionHandle(String);

impl InjectionHandle {
    /// Wrap a surface-specific key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The surface-specific key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InjectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Events emitted by a surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SurfaceEvent {
    /// A main-frame navigation finished; previously inserted CSS and executed
    /// scripts are gone.
    DidNavigate {
        /// URL of the new document.
        url: String,
        /// When the navigation finished.
        at: DateTime<Utc>,
    },
}

/// Capability surface consumed by the injection controller.
#[async_trait]
pub trait Surface: Send + Sync {
    /// Insert a stylesheet into the current document.
    async fn insert_css(&self, css: &str) -> SurfaceResult<InjectionHandle>;

    /// Remove the insertion identified by `handle`.
    async fn remove_inserted_css(&self, handle: &InjectionHandle) -> SurfaceResult<()>;

    /// Execute a script in the current document.
    async fn execute_javascript(&self, js: &str) -> SurfaceResult<()>;

    /// Reload the current document.
    ///
    /// Resolves once the new document has loaded, so insertions made after
    /// it land in the new document. A successful reload emits exactly one
    /// `DidNavigate`.
    async fn reload(&self) -> SurfaceResult<()>;

    /// Subscribe to navigation events.
    fn subscribe_events(&self) -> broadcast::Receiver<SurfaceEvent>;
}
