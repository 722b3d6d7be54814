//! Selector model.
//!
//! The data behind the simulation dropdown: which rows it shows, which one
//! carries the checked indicator, and the control that publishes the user's
//! choice on the selection channel. Rendering is left to the embedder.

use tracing::debug;

use crate::channel::{SelectionBus, SelectionMessage};
use crate::registry::StylesheetRegistry;
use crate::simulation::{Category, SimulationId};

const NO_DEFICIENCY: &str = "No deficiency";
const DISABLE_LABEL: &str = "Disable debugtools";

/// One row of the dropdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    /// Non-selectable section heading.
    Header {
        /// Category name.
        label: String,
    },
    /// Selectable row. `choice` is what selecting it publishes.
    Item {
        /// Row text.
        label: String,
        /// Simulation to select; `None` for the disable row.
        choice: Option<SimulationId>,
        /// True for the row matching the current choice.
        active: bool,
    },
}

impl MenuEntry {
    /// Text shown for the row.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Header { label } | Self::Item { label, .. } => label,
        }
    }

    /// True for the highlighted item.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Item { active: true, .. })
    }
}

/// Dropdown model for a given active simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorMenu {
    entries: Vec<MenuEntry>,
    highlighted: bool,
}

impl SelectorMenu {
    /// Build the menu: a disable row, then one section per category.
    #[must_use]
    pub fn build(registry: &StylesheetRegistry, active: Option<&SimulationId>) -> Self {
        let mut entries = vec![
            MenuEntry::Header {
                label: NO_DEFICIENCY.to_string(),
            },
            MenuEntry::Item {
                label: DISABLE_LABEL.to_string(),
                choice: None,
                active: active.is_none(),
            },
        ];

        for category in Category::ALL {
            entries.push(MenuEntry::Header {
                label: category.label().to_string(),
            });
            entries.extend(registry.in_category(category).map(|(id, _)| MenuEntry::Item {
                label: id.to_string(),
                choice: Some(id.clone()),
                active: active == Some(id),
            }));
        }

        Self {
            entries,
            highlighted: active.is_some(),
        }
    }

    /// All rows, top to bottom.
    #[must_use]
    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    /// True while some simulation is active.
    #[must_use]
    pub const fn highlighted(&self) -> bool {
        self.highlighted
    }

    /// Selectable rows only.
    pub fn items(&self) -> impl Iterator<Item = &MenuEntry> {
        self.entries.iter().filter(|e| matches!(e, MenuEntry::Item { .. }))
    }
}

/// Publishes the user's choice on the selection channel.
#[derive(Debug)]
pub struct SelectorControl {
    bus: SelectionBus,
    topic: String,
    current: Option<SimulationId>,
}

impl SelectorControl {
    /// Create the control and publish the initial "disabled" choice.
    #[must_use]
    pub fn new(bus: SelectionBus, topic: impl Into<String>) -> Self {
        let control = Self {
            bus,
            topic: topic.into(),
            current: None,
        };
        control.publish();
        control
    }

    /// The last published choice.
    #[must_use]
    pub fn current(&self) -> Option<&SimulationId> {
        self.current.as_ref()
    }

    /// Record a new choice. Publishes only if it differs from the current one.
    /// Returns whether anything was published.
    pub fn choose(&mut self, choice: Option<SimulationId>) -> bool {
        if self.current == choice {
            return false;
        }
        self.current = choice;
        self.publish();
        true
    }

    /// Menu reflecting this control's choice.
    #[must_use]
    pub fn menu(&self, registry: &StylesheetRegistry) -> SelectorMenu {
        SelectorMenu::build(registry, self.current.as_ref())
    }

    fn publish(&self) {
        let delivered = self
            .bus
            .publish(&self.topic, &SelectionMessage::from(self.current.as_ref()));
        debug!(topic = %self.topic, choice = ?self.current, delivered, "selection published");
    }
}
