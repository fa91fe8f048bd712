//! # Indicator Tracker
//! The seam to the component that enumerates system indicators.
//!
//! Discovery itself lives outside this crate; the search only needs a flat
//! list of descriptors. The default implementation serves a fixed list from
//! configuration.

use serde::Deserialize;

/// One indicator menu publisher, as supplied by the discovery component.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IndicatorDescriptor {
    /// Bus name the indicator's menu is published under.
    pub bus_name: String,
    /// Object path of the menu on that bus name.
    pub object_path: String,
    /// Name shown to the user alongside matches from this indicator.
    pub display_name: String,
    /// Ancestry prefix prepended to every match from this indicator.
    #[serde(default)]
    pub label_prefix: String,
}

/// Supplies the indicators searched alongside the focused application.
pub trait IndicatorTracker: Send + Sync {
    fn indicators(&self) -> Vec<IndicatorDescriptor>;
}

/// A fixed descriptor list, typically from `[[indicators]]` in `hud.toml`.
#[derive(Debug, Default)]
pub struct StaticTracker {
    indicators: Vec<IndicatorDescriptor>,
}

impl StaticTracker {
    pub fn new(indicators: Vec<IndicatorDescriptor>) -> Self {
        Self { indicators }
    }
}

impl IndicatorTracker for StaticTracker {
    fn indicators(&self) -> Vec<IndicatorDescriptor> {
        self.indicators.clone()
    }
}
