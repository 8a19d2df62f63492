//! Tracing subscriber setup.
//!
//! The dashboard owns the terminal, so it logs to a daily-rolling file;
//! one-shot commands log to stderr. `NECKVIEW_LOG` (an `EnvFilter` directive)
//! always wins over the level picked from `-v` flags or the config file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "NECKVIEW_LOG";

const LOG_FILE_PREFIX: &str = "neckview.log";

/// Picks the default level: `-v` count first, then the configured level, then `warn`.
pub fn default_level(verbose: u8, configured: Option<&str>) -> String {
    match verbose {
        0 => configured.unwrap_or("warn").to_string(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level))
}

/// Logs to stderr.
pub fn init_stderr(level: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!("Failed to install log subscriber: {err}"))
}

/// Logs to `<dir>/neckview.log.<date>`. Keep the guard alive until exit so
/// buffered lines are flushed.
pub fn init_file(dir: &Path, level: &str) -> Result<WorkerGuard> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow!("Failed to install log subscriber: {err}"))?;
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_beats_configured_level() {
        assert_eq!(default_level(0, None), "warn");
        assert_eq!(default_level(0, Some("info")), "info");
        assert_eq!(default_level(1, Some("error")), "info");
        assert_eq!(default_level(2, None), "debug");
        assert_eq!(default_level(5, None), "trace");
    }
}
