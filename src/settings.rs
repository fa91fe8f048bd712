//! # Settings
//!
//! Process-wide tunables for the search core, loaded once at startup.
//!
//! - `[penalties]` feeds the distance scorer and the indicator re-weighting.
//! - `[target]` optionally names the focused application's menu publisher.
//! - `[[indicators]]` seeds the static indicator tracker.
//!
//! Loads from TOML with compiled-in defaults for every field; a missing or
//! malformed file falls back to the defaults rather than failing startup.
//! After [`Settings::init`] the global is read-only.

use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::{fs, path::Path};
use tracing::{info, warn};

use crate::tracker::IndicatorDescriptor;

pub const DEFAULT_CONFIG_PATH: &str = "hud.toml";

static GLOBAL: OnceCell<Settings> = OnceCell::new();

/// Penalty weights consumed by the distance scorer, plus the indicator
/// multiplier consumed by the search orchestrator. All unsigned.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Adding a query character with no haystack left to match it.
    pub add_penalty: u32,
    /// Skipping a haystack character before the query has started matching.
    pub add_penalty_pre: u32,
    /// Dropping a query character mid-alignment.
    pub drop_penalty: u32,
    /// Dropping a query character past the end of the haystack.
    pub drop_penalty_end: u32,
    /// Swapping two adjacent characters.
    pub transpose_penalty: u32,
    /// Substituting one character for another.
    pub swap_penalty: u32,
    /// Substituting a character for its other-case form.
    pub swap_penalty_case: u32,
    /// Percentage added to results that came from an indicator's menu.
    pub indicator_penalty: u32,
    /// Reserved cutoff; parsed and carried but not yet applied to results.
    pub max_distance: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            add_penalty: 10,
            add_penalty_pre: 1,
            drop_penalty: 10,
            drop_penalty_end: 10,
            transpose_penalty: 10,
            swap_penalty: 10,
            swap_penalty_case: 1,
            indicator_penalty: 50,
            max_distance: 30,
        }
    }
}

impl Settings {
    /// Install `self` as the process-wide settings. First caller wins;
    /// later calls are ignored with a warning.
    pub fn init(self) {
        if GLOBAL.set(self).is_err() {
            warn!("settings already initialized; keeping the first value");
        }
    }

    /// The process-wide settings, or the defaults if `init` never ran.
    pub fn global() -> &'static Settings {
        GLOBAL.get_or_init(Settings::default)
    }
}

/// Optional `(peer, path)` of the focused application's menu publisher.
/// Without it the application half of a search is an ordinary cache miss.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TargetConfig {
    pub peer: Option<String>,
    pub path: Option<String>,
}

/// Everything `hud.toml` can carry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub penalties: Settings,
    pub target: TargetConfig,
    pub indicators: Vec<IndicatorDescriptor>,
}

impl Config {
    /// Load configuration from a TOML file.
    /// Falls back to the defaults on any error.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(raw) => match toml::from_str(&raw) {
                Ok(cfg) => {
                    info!(path = %path.display(), "loaded configuration");
                    cfg
                }
                Err(err) => {
                    warn!(path = %path.display(), %err, "bad configuration; using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_tuned_values() {
        let s = Settings::default();
        assert_eq!(s.add_penalty, 10);
        assert_eq!(s.add_penalty_pre, 1);
        assert_eq!(s.swap_penalty_case, 1);
        assert_eq!(s.indicator_penalty, 50);
    }

    #[test]
    fn partial_toml_keeps_defaults_for_the_rest() {
        let cfg: Config = toml::from_str(
            r#"
            [penalties]
            swap_penalty = 20

            [target]
            peer = ":1.42"
            path = "/com/canonical/menu/1"

            [[indicators]]
            bus_name = "org.ayatana.indicator.sound"
            object_path = "/org/ayatana/indicator/sound/menu"
            display_name = "Sound"
            label_prefix = "Sound"
            "#,
        )
        .expect("valid inline config");

        assert_eq!(cfg.penalties.swap_penalty, 20);
        assert_eq!(cfg.penalties.add_penalty, 10);
        assert_eq!(cfg.target.peer.as_deref(), Some(":1.42"));
        assert_eq!(cfg.indicators.len(), 1);
        assert_eq!(cfg.indicators[0].display_name, "Sound");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = Config::load_from_file("definitely/not/here.toml");
        assert_eq!(cfg.penalties, Settings::default());
        assert!(cfg.indicators.is_empty());
    }
}
