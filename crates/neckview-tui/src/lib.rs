//! Full-screen session dashboard.

pub mod common;
pub mod effects;
pub mod events;
pub mod features;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, stdout};
use std::sync::Arc;

use anyhow::Result;
pub use features::{header, statusline, table, tip, uptime};
use neckview_core::config::Config;
use neckview_core::source::HttpSessionSource;
use neckview_core::store::LiveStore;
pub use runtime::TuiRuntime;
use tracing::info;
use url::Url;

/// Runs the live dashboard against `server` until the user quits.
pub async fn run_dashboard(config: &Config, server: Url) -> Result<()> {
    if !stdout().is_terminal() {
        anyhow::bail!(
            "The dashboard requires a terminal.\n\
             Use `neckview list` for non-interactive output."
        );
    }

    let source = HttpSessionSource::new(&server)?;
    let store = LiveStore::new(Arc::new(source), config.sync_options());

    // Subscribe before starting so the first snapshot reaches the table.
    let mut runtime = TuiRuntime::new(store.clone(), server.as_str(), uptime::DEFAULT_TICK)?;
    let handle = store.start();
    info!(%server, "dashboard started");

    let result = tokio::task::block_in_place(|| runtime.run());

    drop(runtime);
    handle.shutdown().await;
    info!("dashboard stopped");
    result
}
