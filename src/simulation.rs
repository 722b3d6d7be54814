//! Simulation identifiers and categories.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Identifier of a registered simulation (e.g. `"grid"`).
///
/// Identifiers are compared case-sensitively; the built-in ids are all
/// lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimulationId(Arc<str>);

impl SimulationId {
    /// Layout outlines for every element.
    pub const LAYOUT: &'static str = "layout";
    /// Baseline grid overlay.
    pub const GRID: &'static str = "grid";
    /// Stress styles that surface fragile layouts.
    pub const HOSTILE: &'static str = "hostile";
    /// Accessibility lint stylesheet.
    pub const A11YCSS: &'static str = "a11ycss";

    /// Create an id from any string.
    #[must_use]
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SimulationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SimulationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for SimulationId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SimulationId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SimulationId {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl PartialEq<str> for SimulationId {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for SimulationId {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

/// Menu grouping of a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Layout and component debugging.
    Layout,
    /// Accessibility and ARIA checks.
    Accessibility,
}

impl Category {
    /// All categories in menu order.
    pub const ALL: [Self; 2] = [Self::Layout, Self::Accessibility];

    /// Heading shown above the category's entries.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Layout => "Layout & components",
            Self::Accessibility => "Accessibility & ARIA",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulation_id_serializes_as_string() {
        let id = SimulationId::new(SimulationId::GRID);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"grid\"");
        let back: SimulationId = serde_json::from_str("\"a11ycss\"").unwrap();
        assert_eq!(back, "a11ycss");
    }

    #[test]
    fn test_simulation_id_is_case_sensitive() {
        assert_ne!(SimulationId::new("Grid"), SimulationId::new("grid"));
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(Category::Layout.label(), "Layout & components");
        assert_eq!(Category::Accessibility.label(), "Accessibility & ARIA");
        assert_eq!(Category::ALL[0], Category::Layout);
    }
}
