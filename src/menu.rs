//! # Menu Model
//! Plain records mirroring a publisher's menu tree.
//!
//! - [`MenuKey`] addresses a publisher: bus peer plus object path. Two keys
//!   are equal only when *both* fields are equal.
//! - [`MenuItem`] is an immutable node with the four properties the search
//!   consults (`label`, `type`, `enabled`, `visible`) and its children.
//! - [`MenuModel`] is the cache entry: the key plus a swappable root
//!   snapshot that the bus client refreshes on layout updates.

use std::sync::{Arc, RwLock};

/// Stable identifier of a live menu publisher on the bus.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MenuKey {
    pub peer: String,
    pub path: String,
}

impl MenuKey {
    pub fn new(peer: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            peer: peer.into(),
            path: path.into(),
        }
    }
}

/// One node of a mirrored menu tree, immutable after construction.
#[derive(Debug, Clone)]
pub struct MenuItem {
    pub id: i32,
    pub label: Option<String>,
    /// Present on separators and other non-activatable specials.
    pub item_type: Option<String>,
    pub enabled: bool,
    pub visible: bool,
    pub children: Vec<Arc<MenuItem>>,
}

impl MenuItem {
    /// An enabled, visible item carrying a label.
    pub fn labeled(id: i32, label: impl Into<String>) -> Self {
        Self {
            id,
            label: Some(label.into()),
            item_type: None,
            enabled: true,
            visible: true,
            children: Vec::new(),
        }
    }

    /// A container node with no label of its own (menu roots).
    pub fn container(id: i32, children: Vec<Arc<MenuItem>>) -> Self {
        Self {
            id,
            label: None,
            item_type: None,
            enabled: true,
            visible: true,
            children,
        }
    }

    /// A separator: labeled or not, it never becomes a candidate.
    pub fn separator(id: i32) -> Self {
        Self {
            id,
            label: None,
            item_type: Some("separator".into()),
            enabled: true,
            visible: true,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Arc<MenuItem>>) -> Self {
        self.children = children;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// The label as the search sees it: accelerator markers removed, and
    /// only for items without a `type` property.
    pub fn search_label(&self) -> Option<String> {
        match (&self.label, &self.item_type) {
            (Some(label), None) => Some(strip_accelerators(label)),
            _ => None,
        }
    }
}

/// Remove accelerator underscores from a menu label.
pub fn strip_accelerators(label: &str) -> String {
    label.chars().filter(|c| *c != '_').collect()
}

/// A cached menu publisher: its key and the latest root snapshot.
///
/// The root starts empty and is replaced whole by the bus client; searches
/// take a snapshot and never observe a half-built tree.
#[derive(Debug)]
pub struct MenuModel {
    key: MenuKey,
    root: RwLock<Option<Arc<MenuItem>>>,
}

impl MenuModel {
    pub fn new(key: MenuKey) -> Self {
        Self {
            key,
            root: RwLock::new(None),
        }
    }

    pub fn with_root(key: MenuKey, root: Arc<MenuItem>) -> Self {
        Self {
            key,
            root: RwLock::new(Some(root)),
        }
    }

    pub fn key(&self) -> &MenuKey {
        &self.key
    }

    pub fn snapshot(&self) -> Option<Arc<MenuItem>> {
        self.root.read().expect("menu root lock poisoned").clone()
    }

    pub fn replace_root(&self, root: Arc<MenuItem>) {
        *self.root.write().expect("menu root lock poisoned") = Some(root);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_require_both_fields_to_match() {
        let a = MenuKey::new(":1.10", "/com/canonical/menu/1");
        let same_path = MenuKey::new(":1.11", "/com/canonical/menu/1");
        let same_peer = MenuKey::new(":1.10", "/com/canonical/menu/2");
        let equal = MenuKey::new(":1.10", "/com/canonical/menu/1");

        assert_ne!(a, same_path);
        assert_ne!(a, same_peer);
        assert_eq!(a, equal);
    }

    #[test]
    fn search_label_strips_accelerators() {
        let item = MenuItem::labeled(1, "_Save As…");
        assert_eq!(item.search_label().as_deref(), Some("Save As…"));
    }

    #[test]
    fn typed_items_have_no_search_label() {
        let mut sep = MenuItem::separator(2);
        sep.label = Some("———".into());
        assert_eq!(sep.search_label(), None);
    }

    #[test]
    fn model_snapshot_follows_replacement() {
        let model = MenuModel::new(MenuKey::new(":1.1", "/menu"));
        assert!(model.snapshot().is_none());

        model.replace_root(Arc::new(MenuItem::container(0, Vec::new())));
        assert!(model.snapshot().is_some());
    }
}
