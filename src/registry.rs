//! Stylesheet registry.
//!
//! Maps a `SimulationId` to the CSS (and optional companion script) that the
//! controller injects. A registry is built once and is read-only afterwards;
//! `StylesheetRegistry::global()` holds the process-wide built-in set.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use crate::assets;
use crate::simulation::{Category, SimulationId};

/// CSS text plus an optional script injected alongside it.
///
/// Text is reference counted, so cloning an entry is cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylesheetEntry {
    css: Arc<str>,
    js: Option<Arc<str>>,
}

impl StylesheetEntry {
    /// Entry with CSS only.
    #[must_use]
    pub fn css(css: impl AsRef<str>) -> Self {
        Self {
            css: Arc::from(css.as_ref()),
            js: None,
        }
    }

    /// Entry with CSS and a companion script.
    #[must_use]
    pub fn with_script(css: impl AsRef<str>, js: impl AsRef<str>) -> Self {
        Self {
            css: Arc::from(css.as_ref()),
            js: Some(Arc::from(js.as_ref())),
        }
    }

    /// The stylesheet text.
    #[must_use]
    pub fn css_text(&self) -> &str {
        &self.css
    }

    /// The companion script, if any.
    #[must_use]
    pub fn js_text(&self) -> Option<&str> {
        self.js.as_deref()
    }

    /// True when injecting this entry executes a script.
    #[must_use]
    pub fn has_script(&self) -> bool {
        self.js.is_some()
    }
}

#[derive(Debug, Clone)]
struct Registered {
    id: SimulationId,
    category: Category,
    entry: StylesheetEntry,
}

/// Read-only lookup table of simulations.
#[derive(Debug, Clone, Default)]
pub struct StylesheetRegistry {
    entries: Vec<Registered>,
    index: HashMap<SimulationId, usize>,
}

impl StylesheetRegistry {
    /// Start building a registry.
    #[must_use]
    pub fn builder() -> StylesheetRegistryBuilder {
        StylesheetRegistryBuilder::default()
    }

    /// The built-in simulations, with the grid generated for `grid_size`.
    #[must_use]
    pub fn builtin(grid_size: u32) -> Self {
        Self::builder()
            .register(SimulationId::LAYOUT, Category::Layout, StylesheetEntry::css(assets::LAYOUT))
            .register(SimulationId::GRID, Category::Layout, StylesheetEntry::css(assets::grid(grid_size)))
            .register(SimulationId::HOSTILE, Category::Layout, StylesheetEntry::css(assets::HOSTILE))
            .register(SimulationId::A11YCSS, Category::Accessibility, StylesheetEntry::css(assets::A11YCSS))
            .build()
    }

    /// Process-wide built-in registry (default grid size).
    #[must_use]
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<StylesheetRegistry> = OnceLock::new();
        GLOBAL.get_or_init(|| Self::builtin(assets::DEFAULT_GRID_SIZE))
    }

    /// Look up the entry for `id`.
    #[must_use]
    pub fn lookup(&self, id: &str) -> Option<&StylesheetEntry> {
        self.index.get(id).map(|&i| &self.entries[i].entry)
    }

    /// Resolve a raw id to the registered `SimulationId` and its entry.
    #[must_use]
    pub fn resolve(&self, id: &str) -> Option<(&SimulationId, &StylesheetEntry)> {
        self.index.get(id).map(|&i| {
            let r = &self.entries[i];
            (&r.id, &r.entry)
        })
    }

    /// True if `id` is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Category of a registered simulation.
    #[must_use]
    pub fn category(&self, id: &str) -> Option<Category> {
        self.index.get(id).map(|&i| self.entries[i].category)
    }

    /// Registered ids, in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &SimulationId> {
        self.entries.iter().map(|r| &r.id)
    }

    /// Simulations of one category, in registration order.
    pub fn in_category(&self, category: Category) -> impl Iterator<Item = (&SimulationId, &StylesheetEntry)> {
        self.entries
            .iter()
            .filter(move |r| r.category == category)
            .map(|r| (&r.id, &r.entry))
    }

    /// Number of registered simulations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builder for `StylesheetRegistry`.
#[derive(Debug, Default)]
pub struct StylesheetRegistryBuilder {
    inner: StylesheetRegistry,
}

impl StylesheetRegistryBuilder {
    /// Register a simulation. Re-registering an id replaces its entry in place.
    #[must_use]
    pub fn register(mut self, id: impl Into<SimulationId>, category: Category, entry: StylesheetEntry) -> Self {
        let id = id.into();
        let existing = self.inner.index.get(&id).copied();
        match existing {
            Some(i) => {
                let slot = &mut self.inner.entries[i];
                slot.category = category;
                slot.entry = entry;
            }
            None => {
                self.inner.index.insert(id.clone(), self.inner.entries.len());
                self.inner.entries.push(Registered { id, category, entry });
            }
        }
        self
    }

    /// Finish the registry.
    #[must_use]
    pub fn build(self) -> StylesheetRegistry {
        self.inner
    }
}
