//! # webview-sim - Debug and accessibility simulations for embedded web views
//!
//! webview-sim injects one "simulation" stylesheet at a time (layout
//! outlines, a baseline grid, a11y lint rules, ...) into an embedded web
//! page viewer, removes it cleanly when the user picks another one, and
//! re-applies it whenever the viewer navigates.
//!
//! ## Core Concepts
//!
//! - **StylesheetRegistry**: maps a simulation id to its CSS and optional script
//! - **Surface**: the async capability of the viewer (insert/remove CSS, run JS, reload)
//! - **InjectionController**: the IDLE / ACTIVE(id) state machine over one surface
//! - **SelectionBus**: typed publish/subscribe channel carrying the user's choice
//! - **SelectorMenu**: the dropdown model with its checked indicator
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use webview_sim::{attach, InjectionController, InMemorySurface, SelectionBus, SelectorControl};
//! use webview_sim::{SimulationConfig, SimulationId};
//!
//! let config = SimulationConfig::default();
//! let bus = SelectionBus::new();
//! let controller = Arc::new(InjectionController::new(Arc::new(config.registry()), config.controller()));
//!
//! let surface = Arc::new(InMemorySurface::new("https://example.com/"));
//! let attachment = attach(controller.clone(), &bus, &config.topic, surface).await;
//!
//! let mut control = SelectorControl::new(bus.clone(), config.topic.clone());
//! control.choose(Some(SimulationId::new("grid")));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod assets;
pub mod channel;
pub mod config;
pub mod controller;
pub mod error;
pub mod registry;
pub mod selector;
pub mod simulation;
pub mod surface;

// Re-export primary types at crate root for convenience
pub use channel::{EventBus, SelectionBus, SelectionMessage, Subscription, SubscriptionId, DEBUG_TOOLS_TOPIC};
pub use config::{SimulationConfig, UnknownSimulationPolicy};
pub use controller::{attach, Attachment, ControllerConfig, InjectionController, InjectionState, Transition};
pub use error::{ConfigError, InjectionError, SurfaceError, SurfaceOperation};
pub use registry::{StylesheetEntry, StylesheetRegistry};
pub use selector::{MenuEntry, SelectorControl, SelectorMenu};
pub use simulation::{Category, SimulationId};
pub use surface::{InMemorySurface, InjectionHandle, Surface, SurfaceCall, SurfaceEvent};
