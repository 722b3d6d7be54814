//! Injection state and transition reports.

use chrono::{DateTime, Utc};

use crate::error::InjectionError;
use crate::registry::StylesheetEntry;
use crate::simulation::SimulationId;
use crate::surface::InjectionHandle;

/// The simulation currently injected into a surface.
#[derive(Debug, Clone)]
pub struct InjectionState {
    pub(crate) handle: InjectionHandle,
    pub(crate) entry: StylesheetEntry,
    pub(crate) simulation_id: SimulationId,
    pub(crate) applied_at: DateTime<Utc>,
}

impl InjectionState {
    /// Handle of the live CSS insertion.
    #[must_use]
    pub fn handle(&self) -> &InjectionHandle {
        &self.handle
    }

    /// The active simulation.
    #[must_use]
    pub fn simulation_id(&self) -> &SimulationId {
        &self.simulation_id
    }

    /// CSS that was inserted.
    #[must_use]
    pub fn css(&self) -> &str {
        self.entry.css_text()
    }

    /// Companion script that ran after the insertion, if any.
    #[must_use]
    pub fn js(&self) -> Option<&str> {
        self.entry.js_text()
    }

    /// When the current insertion was made (initial apply or last re-apply).
    #[must_use]
    pub fn applied_at(&self) -> DateTime<Utc> {
        self.applied_at
    }
}

/// Outcome of a controller operation.
///
/// Controller operations never return errors; failures are logged and
/// reported here.
#[derive(Debug, Clone)]
pub enum Transition {
    /// Nothing changed (no surface, already active, already idle, ignored id,
    /// navigation caused by the controller's own reload).
    Unchanged,
    /// The simulation is now active.
    Applied(SimulationId),
    /// The simulation was removed; the controller is idle.
    Cleared(SimulationId),
    /// The active simulation was injected again after a navigation.
    Reapplied(SimulationId),
    /// The operation failed; the controller is left idle unless the id was
    /// rejected before any surface call.
    Failed(InjectionError),
}

impl Transition {
    /// True for `Transition::Unchanged`.
    #[must_use]
    pub const fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }

    /// True for `Transition::Failed`.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// The error behind a failed transition.
    #[must_use]
    pub const fn error(&self) -> Option<&InjectionError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}
