//! Interactive dashboard command.

use anyhow::{Context, Result};
use neckview_core::config::{self, Config};
use neckview_core::logging;

pub async fn run(config: &Config, server: Option<&str>, verbose: u8) -> Result<()> {
    let url = config.server_url(server).context("resolve server URL")?;

    let level = logging::default_level(verbose, config.log_level.as_deref());
    // The terminal belongs to the dashboard, so logs go to a file.
    let _guard = logging::init_file(&config::paths::logs_dir(), &level)?;

    neckview_tui::run_dashboard(config, url).await
}
