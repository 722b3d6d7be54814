//! Injection controller.
//!
//! Owns the "currently injected" state for one surface and moves it through
//! IDLE / ACTIVE(id) transitions. Every operation holds the controller's
//! async lock for the whole transition, so a second selection can never run
//! between "remove old" and "insert new" of the first.
//!
//! Failures never reach the caller as errors. They are logged and reported
//! as `Transition::Failed`, and the controller is left idle so no stale
//! handle is ever referenced.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

use crate::config::UnknownSimulationPolicy;
use crate::error::{InjectionError, SurfaceOperation};
use crate::registry::{StylesheetEntry, StylesheetRegistry};
use crate::simulation::SimulationId;
use crate::surface::{InjectionHandle, Surface};

pub mod driver;
mod state;

pub use driver::{attach, Attachment};
pub use state::{InjectionState, Transition};

/// Controller behaviour knobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerConfig {
    /// What selecting an unregistered id does.
    pub unknown_policy: UnknownSimulationPolicy,
}

struct Inner {
    surface: Option<Arc<dyn Surface>>,
    state: Option<InjectionState>,
    // Navigations still to come from reloads this controller issued.
    reloads_pending: usize,
}

/// Applies and clears simulations on one surface.
pub struct InjectionController {
    registry: Arc<StylesheetRegistry>,
    config: ControllerConfig,
    inner: Mutex<Inner>,
    active_tx: watch::Sender<Option<SimulationId>>,
}

impl std::fmt::Debug for InjectionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InjectionController")
            .field("config", &self.config)
            .field("active", &*self.active_tx.borrow())
            .finish_non_exhaustive()
    }
}

impl InjectionController {
    /// Create an unbound controller.
    #[must_use]
    pub fn new(registry: Arc<StylesheetRegistry>, config: ControllerConfig) -> Self {
        let (active_tx, _) = watch::channel(None);
        Self {
            registry,
            config,
            inner: Mutex::new(Inner {
                surface: None,
                state: None,
                reloads_pending: 0,
            }),
            active_tx,
        }
    }

    /// Controller over the process-wide built-in registry.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(Arc::new(StylesheetRegistry::global().clone()), ControllerConfig::default())
    }

    /// The registry simulations are resolved against.
    #[must_use]
    pub fn registry(&self) -> &StylesheetRegistry {
        &self.registry
    }

    /// The behaviour knobs this controller was built with.
    #[must_use]
    pub const fn config(&self) -> ControllerConfig {
        self.config
    }

    /// The active simulation, if any.
    #[must_use]
    pub fn active(&self) -> Option<SimulationId> {
        self.active_tx.borrow().clone()
    }

    /// Observe changes of the active simulation.
    #[must_use]
    pub fn watch_active(&self) -> watch::Receiver<Option<SimulationId>> {
        self.active_tx.subscribe()
    }

    /// Snapshot of the injection state.
    pub async fn state(&self) -> Option<InjectionState> {
        self.inner.lock().await.state.clone()
    }

    /// True while a surface is bound.
    pub async fn is_bound(&self) -> bool {
        self.inner.lock().await.surface.is_some()
    }

    /// Bind a surface. State of a previously bound surface is dropped
    /// without attempting removal.
    pub async fn bind(&self, surface: Arc<dyn Surface>) {
        let mut inner = self.inner.lock().await;
        if let Some(stale) = inner.state.take() {
            debug!(simulation = %stale.simulation_id, "dropping injection of previous surface");
        }
        inner.surface = Some(surface);
        inner.reloads_pending = 0;
        self.publish_active(&inner);
    }

    /// Unbind the surface. The injection state is discarded; the surface is
    /// assumed gone, so no removal is attempted.
    pub async fn detach(&self) {
        let mut inner = self.inner.lock().await;
        inner.surface = None;
        inner.reloads_pending = 0;
        if let Some(stale) = inner.state.take() {
            debug!(simulation = %stale.simulation_id, "surface detached; injection dropped");
        }
        self.publish_active(&inner);
    }

    /// Make `id` the active simulation.
    pub async fn apply(&self, id: &str) -> Transition {
        let mut inner = self.inner.lock().await;
        let transition = self.apply_locked(&mut inner, id).await;
        self.publish_active(&inner);
        transition
    }

    /// Remove the active simulation.
    pub async fn clear(&self) -> Transition {
        let mut inner = self.inner.lock().await;
        let transition = Self::clear_locked(&mut inner).await;
        self.publish_active(&inner);
        transition
    }

    /// Translate a user choice into `apply` or `clear`.
    ///
    /// `None` clears. A registered id is applied. An unregistered id clears
    /// under `UnknownSimulationPolicy::Clear` and is rejected without any
    /// state change under `UnknownSimulationPolicy::Reject`.
    pub async fn select(&self, choice: Option<&str>) -> Transition {
        let mut inner = self.inner.lock().await;
        let transition = match choice {
            Some(id) if self.registry.contains(id) => self.apply_locked(&mut inner, id).await,
            Some(id) => match self.config.unknown_policy {
                UnknownSimulationPolicy::Reject => self.apply_locked(&mut inner, id).await,
                UnknownSimulationPolicy::Clear => {
                    debug!(simulation = id, "unknown simulation selected; clearing");
                    Self::clear_locked(&mut inner).await
                }
            },
            None => Self::clear_locked(&mut inner).await,
        };
        self.publish_active(&inner);
        transition
    }

    /// Re-inject the active simulation into a freshly navigated document.
    ///
    /// A navigation caused by a reload this controller issued while switching
    /// or clearing is consumed without re-injecting: the insertion made after
    /// that reload already lives in the new document.
    pub async fn on_navigate(&self) -> Transition {
        let mut inner = self.inner.lock().await;
        let transition = Self::reapply_locked(&mut inner).await;
        self.publish_active(&inner);
        transition
    }

    /// Recover after navigation events were missed.
    ///
    /// Which of the missed events were caused by this controller's reloads is
    /// unknown, so pending reloads are forgotten, the current handle is
    /// removed (a no-op if it died with an earlier document) and the active
    /// simulation is injected again.
    pub async fn resync(&self) -> Transition {
        let mut inner = self.inner.lock().await;
        inner.reloads_pending = 0;
        if let (Some(surface), Some(current)) = (inner.surface.clone(), inner.state.as_ref()) {
            if let Err(err) = surface.remove_inserted_css(&current.handle).await {
                debug!(simulation = %current.simulation_id, error = %err, "stale handle not removed during resync");
            }
        }
        let transition = Self::reapply_locked(&mut inner).await;
        self.publish_active(&inner);
        transition
    }

    async fn apply_locked(&self, inner: &mut Inner, id: &str) -> Transition {
        let Some(surface) = inner.surface.clone() else {
            debug!(simulation = id, "no surface bound; apply ignored");
            return Transition::Unchanged;
        };

        let Some((simulation, entry)) = self.registry.resolve(id) else {
            return match self.config.unknown_policy {
                UnknownSimulationPolicy::Clear => {
                    warn!(simulation = id, "unknown simulation; apply ignored");
                    Transition::Unchanged
                }
                UnknownSimulationPolicy::Reject => {
                    warn!(simulation = id, "unknown simulation rejected");
                    Transition::Failed(InjectionError::UnknownSimulationId { id: id.to_string() })
                }
            };
        };
        let simulation = simulation.clone();
        let entry = entry.clone();

        if inner
            .state
            .as_ref()
            .is_some_and(|current| current.simulation_id == simulation)
        {
            return Transition::Unchanged;
        }

        if let Some(previous) = inner.state.take() {
            if remove_injection(surface.as_ref(), &previous).await {
                inner.reloads_pending += 1;
            }
        }

        match inject(surface.as_ref(), &simulation, &entry).await {
            Ok(handle) => {
                info!(simulation = %simulation, handle = %handle, "simulation applied");
                inner.state = Some(InjectionState {
                    handle,
                    entry,
                    simulation_id: simulation.clone(),
                    applied_at: Utc::now(),
                });
                Transition::Applied(simulation)
            }
            Err(err) => {
                error!(simulation = %simulation, error = %err, "error inserting simulation");
                Transition::Failed(err)
            }
        }
    }

    async fn clear_locked(inner: &mut Inner) -> Transition {
        let Some(surface) = inner.surface.clone() else {
            return Transition::Unchanged;
        };
        let Some(previous) = inner.state.take() else {
            return Transition::Unchanged;
        };
        if remove_injection(surface.as_ref(), &previous).await {
            inner.reloads_pending += 1;
        }
        info!(simulation = %previous.simulation_id, "simulation cleared");
        Transition::Cleared(previous.simulation_id)
    }

    async fn reapply_locked(inner: &mut Inner) -> Transition {
        if inner.reloads_pending > 0 {
            inner.reloads_pending -= 1;
            debug!(pending = inner.reloads_pending, "navigation from own reload; nothing to re-apply");
            return Transition::Unchanged;
        }
        let Some(surface) = inner.surface.clone() else {
            return Transition::Unchanged;
        };
        let Some(current) = inner.state.as_mut() else {
            return Transition::Unchanged;
        };

        // The old handle died with the previous document; never remove it.
        match inject(surface.as_ref(), &current.simulation_id, &current.entry).await {
            Ok(handle) => {
                debug!(simulation = %current.simulation_id, handle = %handle, "simulation re-applied after navigation");
                current.handle = handle;
                current.applied_at = Utc::now();
                Transition::Reapplied(current.simulation_id.clone())
            }
            Err(err) => {
                error!(simulation = %current.simulation_id, error = %err, "error re-applying simulation");
                inner.state = None;
                Transition::Failed(err)
            }
        }
    }

    fn publish_active(&self, inner: &Inner) {
        let next = inner.state.as_ref().map(|s| s.simulation_id.clone());
        self.active_tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}

/// Insert `entry` and run its script. On a script failure the insertion is
/// rolled back so no orphaned stylesheet stays behind.
async fn inject(
    surface: &dyn Surface,
    simulation: &SimulationId,
    entry: &StylesheetEntry,
) -> Result<InjectionHandle, InjectionError> {
    let handle = surface
        .insert_css(entry.css_text())
        .await
        .map_err(|source| InjectionError::InjectionFailed {
            simulation: simulation.clone(),
            stage: SurfaceOperation::InsertCss,
            source,
        })?;

    if let Some(js) = entry.js_text() {
        if let Err(source) = surface.execute_javascript(js).await {
            if let Err(err) = surface.remove_inserted_css(&handle).await {
                warn!(simulation = %simulation, error = %err, "failed to roll back stylesheet");
            }
            return Err(InjectionError::InjectionFailed {
                simulation: simulation.clone(),
                stage: SurfaceOperation::ExecuteJavaScript,
                source,
            });
        }
    }

    Ok(handle)
}

/// Undo an injection. Scripts cannot be un-executed, so a scripted entry
/// reloads the surface first.
///
/// Returns true when a reload was issued and succeeded, i.e. one
/// `DidNavigate` caused by this call is on its way.
async fn remove_injection(surface: &dyn Surface, previous: &InjectionState) -> bool {
    let mut reloaded = false;
    if previous.entry.has_script() {
        match surface.reload().await {
            Ok(()) => reloaded = true,
            Err(err) => {
                warn!(simulation = %previous.simulation_id, error = %err, "reload before removal failed");
            }
        }
    }
    if let Err(err) = surface.remove_inserted_css(&previous.handle).await {
        warn!(simulation = %previous.simulation_id, error = %err, "failed to remove stylesheet");
    }
    reloaded
}
