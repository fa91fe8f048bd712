//! # Menu Heads-Up Search — Binary Entrypoint
//! Boots the session-bus service, wiring the menu collector, the layout
//! observer, and the suggestion interface.
//!
//! ## Bus surface
//! - `GetSuggestions(query)` — headline plus ranked menu entries
//! - `ExecuteQuery(query)` — activate the best match for a query
//! - listens for `com.canonical.dbusmenu.LayoutUpdated` from all peers
//! - broadcasts `FindServers` once at startup
//!
//! Configuration comes from `hud.toml` next to the binary; every field has
//! a sensible default. See `DESIGN.md` for architecture notes.

use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use hud_search::collector::Collector;
use hud_search::dbusmenu::{self, BusDispatcher};
use hud_search::menu::MenuKey;
use hud_search::service::{HudService, BUS_NAME, OBJECT_PATH};
use hud_search::settings::{Config, DEFAULT_CONFIG_PATH};
use hud_search::tracker::StaticTracker;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::load_from_file(DEFAULT_CONFIG_PATH);
    let target = match (&config.target.peer, &config.target.path) {
        (Some(peer), Some(path)) => Some(MenuKey::new(peer, path)),
        _ => None,
    };
    config.penalties.clone().init();

    let conn = match zbus::Connection::session().await {
        Ok(conn) => conn,
        Err(err) => {
            error!(%err, "unable to get session bus; not serving");
            return Err(err.into());
        }
    };

    let collector = Arc::new(Collector::new(
        Box::new(StaticTracker::new(config.indicators)),
        Arc::new(BusDispatcher::new(conn.clone())),
    ));

    let observer = tokio::spawn(dbusmenu::run_observer(conn.clone(), Arc::clone(&collector)));

    let service = HudService::new(Arc::clone(&collector), target);
    conn.object_server()
        .at(OBJECT_PATH, service)
        .await
        .context("register service object")?;
    conn.request_name(BUS_NAME)
        .await
        .context("claim bus name")?;
    info!(name = BUS_NAME, path = OBJECT_PATH, "service registered");

    tokio::signal::ctrl_c()
        .await
        .context("wait for shutdown signal")?;
    info!("shutting down");

    // Teardown mirrors startup in reverse: service object, observer, cache.
    let _ = conn
        .object_server()
        .remove::<HudService, _>(OBJECT_PATH)
        .await;
    observer.abort();
    drop(collector);

    Ok(())
}
