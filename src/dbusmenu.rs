//! # Menu Client Plumbing
//! The bus-facing half of the collector: a proxy for the
//! `com.canonical.dbusmenu` interface, layout parsing into [`MenuItem`]
//! trees, the layout-update observer loop, and the activation dispatcher.
//!
//! Publishers expose their tree as `(ia{sv}av)` structures; only the four
//! properties the search consults are requested and mirrored.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::TryStreamExt;
use tracing::{debug, info, warn};
use zbus::names::BusName;
use zbus::zvariant::{OwnedValue, Value};
use zbus::{message, Connection, MatchRule, MessageStream};

use crate::collector::{Collector, EventDispatcher};
use crate::menu::{MenuItem, MenuKey, MenuModel};

pub const DBUSMENU_INTERFACE: &str = "com.canonical.dbusmenu";

/// Menu item properties the search consults.
const MIRRORED_PROPERTIES: &[&str] = &["label", "type", "enabled", "visible"];

/// Layout node as it comes off the wire: id, properties, children variants.
#[derive(Debug, serde::Deserialize, zbus::zvariant::Type)]
pub struct RawLayout(pub i32, pub HashMap<String, OwnedValue>, pub Vec<OwnedValue>);

#[zbus::proxy(interface = "com.canonical.dbusmenu", assume_defaults = false)]
trait DbusMenu {
    fn get_layout(
        &self,
        parent_id: i32,
        recursion_depth: i32,
        property_names: &[&str],
    ) -> zbus::Result<(u32, RawLayout)>;

    fn event(
        &self,
        id: i32,
        event_id: &str,
        data: &Value<'_>,
        timestamp: u32,
    ) -> zbus::Result<()>;
}

/// Fetches layouts and keeps cached models fresh.
#[derive(Clone)]
pub struct MenuClient {
    conn: Connection,
}

impl MenuClient {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    async fn proxy_for(&self, key: &MenuKey) -> zbus::Result<DbusMenuProxy<'static>> {
        DbusMenuProxy::builder(&self.conn)
            .destination(key.peer.clone())?
            .path(key.path.clone())?
            .build()
            .await
    }

    /// Re-fetch the full layout for `model` and swap in the new snapshot.
    pub async fn refresh(&self, model: &MenuModel) -> anyhow::Result<()> {
        let proxy = self.proxy_for(model.key()).await?;
        let (_revision, layout) = proxy.get_layout(0, -1, MIRRORED_PROPERTIES).await?;
        model.replace_root(Arc::new(item_from_layout(&layout)));
        Ok(())
    }
}

/// Sends `Event(id, "clicked", 0, 0)` to the item's publisher.
pub struct BusDispatcher {
    client: MenuClient,
}

impl BusDispatcher {
    pub fn new(conn: Connection) -> Self {
        Self {
            client: MenuClient::new(conn),
        }
    }
}

#[async_trait]
impl EventDispatcher for BusDispatcher {
    async fn dispatch(&self, key: &MenuKey, item_id: i32) -> anyhow::Result<()> {
        let proxy = self.client.proxy_for(key).await?;
        proxy.event(item_id, "clicked", &Value::I32(0), 0).await?;
        Ok(())
    }
}

/// Ask every publisher on the bus to announce itself. Best effort: a failed
/// broadcast only delays discovery until the next layout update.
pub async fn broadcast_find_servers(conn: &Connection) {
    let sent = conn
        .emit_signal(
            None::<BusName>,
            "/",
            DBUSMENU_INTERFACE,
            "FindServers",
            &(),
        )
        .await;

    if let Err(err) = sent {
        warn!(%err, "unable to emit FindServers");
    }
}

/// Watch `LayoutUpdated` from all publishers and keep the collector's cache
/// mirrored. Runs until the stream ends or the task is aborted.
pub async fn run_observer(conn: Connection, collector: Arc<Collector>) -> anyhow::Result<()> {
    let rule = MatchRule::builder()
        .msg_type(message::Type::Signal)
        .interface(DBUSMENU_INTERFACE)?
        .member("LayoutUpdated")?
        .build();
    let mut stream = MessageStream::for_match_rule(rule, &conn, Some(64)).await?;

    broadcast_find_servers(&conn).await;
    info!("watching for menu layout updates");

    let client = MenuClient::new(conn);
    while let Some(msg) = stream.try_next().await? {
        let header = msg.header();
        let (Some(sender), Some(path)) = (header.sender(), header.path()) else {
            continue;
        };

        let (model, created) = collector.note_layout_updated(sender.as_str(), path.as_str());
        if created {
            debug!(peer = sender.as_str(), path = path.as_str(), "new menu publisher");
        }

        // Refresh off the stream so one slow publisher cannot stall the rest.
        let client = client.clone();
        tokio::spawn(async move {
            if let Err(err) = client.refresh(&model).await {
                debug!(%err, peer = %model.key().peer, "could not refresh menu layout");
            }
        });
    }

    Ok(())
}

fn item_from_layout(layout: &RawLayout) -> MenuItem {
    MenuItem {
        id: layout.0,
        label: prop_string(&layout.1, "label"),
        item_type: prop_string(&layout.1, "type"),
        enabled: prop_bool(&layout.1, "enabled", true),
        visible: prop_bool(&layout.1, "visible", true),
        children: layout
            .2
            .iter()
            .filter_map(|child| item_from_value(child).map(Arc::new))
            .collect(),
    }
}

/// Parse one `(ia{sv}av)` node, possibly wrapped in a variant.
fn item_from_value(value: &Value<'_>) -> Option<MenuItem> {
    let value = match value {
        Value::Value(inner) => inner.as_ref(),
        other => other,
    };
    let Value::Structure(structure) = value else {
        return None;
    };
    let fields = structure.fields();

    let Some(Value::I32(id)) = fields.first() else {
        return None;
    };
    let props: HashMap<String, OwnedValue> = match fields.get(1) {
        Some(Value::Dict(dict)) => dict
            .try_clone()
            .map(|d| d.try_into().unwrap_or_default())
            .unwrap_or_default(),
        _ => HashMap::new(),
    };
    let children = match fields.get(2) {
        Some(Value::Array(children)) => children
            .iter()
            .filter_map(|child| item_from_value(child).map(Arc::new))
            .collect(),
        _ => Vec::new(),
    };

    Some(MenuItem {
        id: *id,
        label: prop_string(&props, "label"),
        item_type: prop_string(&props, "type"),
        enabled: prop_bool(&props, "enabled", true),
        visible: prop_bool(&props, "visible", true),
        children,
    })
}

fn prop_string(props: &HashMap<String, OwnedValue>, name: &str) -> Option<String> {
    props
        .get(name)
        .and_then(|v| v.downcast_ref::<&str>().ok())
        .map(str::to_owned)
}

fn prop_bool(props: &HashMap<String, OwnedValue>, name: &str, default: bool) -> bool {
    props
        .get(name)
        .and_then(|v| v.downcast_ref::<bool>().ok())
        .unwrap_or(default)
}
