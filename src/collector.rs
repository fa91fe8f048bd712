//! # Menu Collector
//! The search core: cache of mirrored menus, candidate extraction, ranking,
//! and activation.
//!
//! - The cache maps [`MenuKey`] to a live [`MenuModel`], fed by layout-update
//!   notifications; entries are created on first sight and never evicted.
//! - A search walks the focused application's tree, then every indicator
//!   tree, scores each labeled item against the query, re-weights indicator
//!   results, and returns one ascending-sorted candidate list.
//! - Activation goes back out through the [`EventDispatcher`] seam; a stale
//!   item is logged and ignored, never retried.
//!
//! Everything here is synchronous and bus-free, so the whole pipeline is
//! testable against in-memory menu trees.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::distance;
use crate::menu::{strip_accelerators, MenuItem, MenuKey, MenuModel};
use crate::settings::Settings;
use crate::tracker::IndicatorTracker;

/// Delivers an activation event to a menu item on its publisher.
#[async_trait]
pub trait EventDispatcher: Send + Sync {
    async fn dispatch(&self, key: &MenuKey, item_id: i32) -> anyhow::Result<()>;
}

/// One ranked candidate, immutable once it leaves the search.
///
/// Carries enough to display the match, rank it, and later re-locate and
/// activate the item; the held [`MenuItem`] reference keeps the node alive
/// even if its tree is replaced between search and activation.
#[derive(Debug, Clone)]
pub struct Found {
    peer: String,
    path: String,
    item_id: i32,
    display: String,
    distance: u32,
    indicator: Option<String>,
    item: Arc<MenuItem>,
}

impl Found {
    fn new(
        key: &MenuKey,
        item: &Arc<MenuItem>,
        display: String,
        distance: u32,
        indicator: Option<&str>,
    ) -> Self {
        Self {
            peer: key.peer.clone(),
            path: key.path.clone(),
            item_id: item.id,
            display,
            distance,
            indicator: indicator.map(str::to_owned),
            item: Arc::clone(item),
        }
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn item_id(&self) -> i32 {
        self.item_id
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn distance(&self) -> u32 {
        self.distance
    }

    /// Set iff the item came from an indicator's tree.
    pub fn indicator(&self) -> Option<&str> {
        self.indicator.as_deref()
    }

    fn apply_indicator_penalty(&mut self, settings: &Settings) {
        let boost = self.distance as u64 * settings.indicator_penalty as u64 / 100;
        self.distance += boost as u32;
    }
}

/// Cache, walker, and orchestrator in one place.
pub struct Collector {
    cache: Mutex<HashMap<MenuKey, Arc<MenuModel>>>,
    tracker: Box<dyn IndicatorTracker>,
    dispatcher: Arc<dyn EventDispatcher>,
}

impl Collector {
    pub fn new(tracker: Box<dyn IndicatorTracker>, dispatcher: Arc<dyn EventDispatcher>) -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
            tracker,
            dispatcher,
        }
    }

    /// Record a layout-update notification from `(peer, path)`.
    ///
    /// Returns the cache entry plus whether it was just created. Existing
    /// entries are handed back untouched; the bus client refreshes them.
    pub fn note_layout_updated(&self, peer: &str, path: &str) -> (Arc<MenuModel>, bool) {
        let key = MenuKey::new(peer, path);
        let mut cache = self.cache.lock().expect("menu cache lock poisoned");

        if let Some(model) = cache.get(&key) {
            return (Arc::clone(model), false);
        }

        debug!(peer, path, "mirroring new menu publisher");
        let model = Arc::new(MenuModel::new(key.clone()));
        cache.insert(key, Arc::clone(&model));
        (model, true)
    }

    pub fn lookup(&self, key: &MenuKey) -> Option<Arc<MenuModel>> {
        self.cache
            .lock()
            .expect("menu cache lock poisoned")
            .get(key)
            .cloned()
    }

    /// Insert a ready-made model, replacing any entry under the same key.
    pub fn insert(&self, model: Arc<MenuModel>) {
        self.cache
            .lock()
            .expect("menu cache lock poisoned")
            .insert(model.key().clone(), model);
    }

    pub fn len(&self) -> usize {
        self.cache.lock().expect("menu cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run a query against the application at `(peer, path)` plus every
    /// known indicator, and return candidates sorted ascending by distance.
    ///
    /// The sort is stable, so equal distances keep discovery order: the
    /// application's items first, then indicators in tracker order.
    pub fn search(&self, query: &str, peer: &str, path: &str) -> Vec<Found> {
        let settings = Settings::global();

        let mut results =
            self.collect_from(&MenuKey::new(peer, path), query, "", None, settings);

        // The empty query belongs to the application alone; indicators only
        // join in once there is something to match.
        if !query.is_empty() {
            for indicator in self.tracker.indicators() {
                let key = MenuKey::new(&indicator.bus_name, &indicator.object_path);
                let mut items = self.collect_from(
                    &key,
                    query,
                    &indicator.label_prefix,
                    Some(&indicator.display_name),
                    settings,
                );
                for found in &mut items {
                    found.apply_indicator_penalty(settings);
                }
                results.append(&mut items);
            }
        }

        results.sort_by_key(Found::distance);
        results
    }

    fn collect_from(
        &self,
        key: &MenuKey,
        query: &str,
        prefix: &str,
        indicator: Option<&str>,
        settings: &Settings,
    ) -> Vec<Found> {
        // A publisher we have never heard from is not an error; it simply
        // contributes nothing.
        let Some(model) = self.lookup(key) else {
            return Vec::new();
        };
        let Some(root) = model.snapshot() else {
            return Vec::new();
        };

        let mut results = Vec::new();
        if query.is_empty() {
            top_level_candidates(&mut results, key, &root, indicator, settings);
        } else {
            walk(&mut results, key, &root, true, query, prefix, indicator, settings);
        }
        results
    }

    /// Dispatch an activation to a previously returned candidate.
    pub async fn activate(&self, found: &Found) {
        debug!(
            item = found.item_id,
            label = found.item.label.as_deref().unwrap_or_default(),
            "activating menu item"
        );

        let key = MenuKey::new(&found.peer, &found.path);
        if let Err(err) = self.dispatcher.dispatch(&key, found.item_id).await {
            warn!(%err, item = found.item_id, "activation failed; item may be gone");
        }
    }
}

/// Pre-order traversal emitting a candidate for every labeled, reachable,
/// non-root item, with ancestry joined as `"A > B > C"`.
#[allow(clippy::too_many_arguments)]
fn walk(
    results: &mut Vec<Found>,
    key: &MenuKey,
    item: &Arc<MenuItem>,
    is_root: bool,
    query: &str,
    prefix: &str,
    indicator: Option<&str>,
    settings: &Settings,
) {
    // A disabled or hidden item takes its whole subtree out of play.
    if !item.enabled || !item.visible {
        return;
    }

    let local_label = item.search_label();
    let path_string = match &local_label {
        Some(label) if !prefix.is_empty() => format!("{prefix} > {label}"),
        Some(label) => label.clone(),
        None => prefix.to_owned(),
    };

    if !is_root && local_label.is_some() {
        let d = distance::score(Some(query), Some(&[path_string.as_str()]), settings);
        results.push(Found::new(key, item, path_string.clone(), d, indicator));
    }

    for child in &item.children {
        walk(results, key, child, false, query, &path_string, indicator, settings);
    }
}

/// Empty-query shortcut: the root's labeled direct children only, priced by
/// label length so the ordering is stable but meaningful.
fn top_level_candidates(
    results: &mut Vec<Found>,
    key: &MenuKey,
    root: &Arc<MenuItem>,
    indicator: Option<&str>,
    settings: &Settings,
) {
    for child in &root.children {
        if !child.enabled || !child.visible {
            continue;
        }
        let Some(raw) = &child.label else {
            continue;
        };

        let label = strip_accelerators(raw);
        let d = distance::score(Some(label.as_str()), None, settings);
        results.push(Found::new(key, child, label, d, indicator));
    }
}
