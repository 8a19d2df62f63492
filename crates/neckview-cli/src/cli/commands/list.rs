//! One-shot session listing.

use anyhow::{Context, Result};
use comfy_table::{ContentArrangement, Table};
use neckview_core::config::Config;
use neckview_core::logging;
use neckview_core::model::{SessionRecord, count_by_state};
use neckview_core::source::{HttpSessionSource, SessionSource};
use neckview_tui::common::Clock;
use neckview_tui::table::columns::TITLES;
use neckview_tui::uptime::{DEFAULT_TICK, LiveTime};
use tracing::debug;

pub async fn run(config: &Config, server: Option<&str>, json: bool, verbose: u8) -> Result<()> {
    logging::init_stderr(&logging::default_level(verbose, config.log_level.as_deref()))?;

    let url = config.server_url(server).context("resolve server URL")?;
    let source = HttpSessionSource::new(&url)?;
    let records = source
        .fetch_sessions()
        .await
        .with_context(|| format!("fetch sessions from {url}"))?;
    debug!(count = records.len(), "sessions fetched");

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&records).context("serialize sessions")?
        );
        return Ok(());
    }

    if records.is_empty() {
        println!("No active sessions.");
        return Ok(());
    }
    println!("{}", render_table(&records, Clock::now()));
    println!("{}", count_by_state(&records).summary());
    Ok(())
}

fn render_table(records: &[SessionRecord], now: Clock) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(TITLES);
    for record in records {
        let uptime = LiveTime::new(record.started_at, 0, DEFAULT_TICK, now);
        table.add_row(vec![
            record.id.to_string(),
            record.protocol.clone(),
            record.state.label().to_string(),
            record.host.clone(),
            record.origin.clone(),
            uptime.text(),
        ]);
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use neckview_core::model::{SessionId, SessionState};

    use super::*;

    #[test]
    fn test_render_table_has_one_line_per_session() {
        let now = Clock {
            instant: Instant::now(),
            wall_ms: 1_700_000_100_000,
        };
        let records = vec![SessionRecord {
            id: SessionId::from(9),
            protocol: "socks5".into(),
            state: SessionState::Connecting,
            host: "example.net:22".into(),
            origin: "10.0.0.5:41000".into(),
            started_at: 1_700_000_000_000,
        }];

        let out = render_table(&records, now);

        assert!(out.contains("Uptime"));
        assert!(out.contains("Connecting"));
        assert!(out.contains("example.net:22"));
        assert!(out.contains("100"));
    }
}
