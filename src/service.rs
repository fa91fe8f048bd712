//! # Bus Service Facade
//! The service object other desktop components talk to: `GetSuggestions`
//! returns a headline plus ranked display strings, `ExecuteQuery` activates
//! the top match of a fresh search.
//!
//! Queries are never logged raw; log events carry a short anonymized hash.

use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::collector::{Collector, Found};
use crate::menu::MenuKey;

/// Well-known name the service claims on the session bus.
pub const BUS_NAME: &str = "com.canonical.hud";
/// Object path the service object lives at.
pub const OBJECT_PATH: &str = "/com/canonical/hud";

/// How many display strings a query returns.
const SUGGESTION_COUNT: usize = 5;

pub struct HudService {
    collector: Arc<Collector>,
    target: Option<MenuKey>,
}

impl HudService {
    /// `target` names the focused application's menu publisher; without it
    /// only indicator menus can contribute results.
    pub fn new(collector: Arc<Collector>, target: Option<MenuKey>) -> Self {
        Self { collector, target }
    }

    fn run_search(&self, query: &str) -> Vec<Found> {
        match &self.target {
            Some(target) => self.collector.search(query, &target.peer, &target.path),
            None => self.collector.search(query, "", ""),
        }
    }

    /// Headline plus the top display strings for `query`.
    pub fn suggestions(&self, query: &str) -> (String, Vec<String>) {
        let results = self.run_search(query);
        info!(
            query = %anon_hash(query),
            results = results.len(),
            "suggestions served"
        );

        let headline = results
            .first()
            .map(|found| found.display().to_owned())
            .unwrap_or_default();
        let suggestions = results
            .iter()
            .take(SUGGESTION_COUNT)
            .map(|found| found.display().to_owned())
            .collect();
        (headline, suggestions)
    }

    /// Activate the top-ranked result of a fresh search for `query`.
    pub async fn execute(&self, query: &str) {
        let results = self.run_search(query);
        match results.first() {
            Some(top) => self.collector.activate(top).await,
            None => debug!(query = %anon_hash(query), "nothing to execute"),
        }
    }
}

#[zbus::interface(name = "com.canonical.hud")]
impl HudService {
    async fn get_suggestions(&self, query: &str) -> (String, Vec<String>) {
        self.suggestions(query)
    }

    async fn execute_query(&self, query: &str) {
        self.execute(query).await;
    }
}

/// Short, stable, anonymized id for a query string. Never log raw queries.
pub(crate) fn anon_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();

    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}
