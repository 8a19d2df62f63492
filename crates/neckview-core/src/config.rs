//! Configuration management for neckview.
//!
//! Loads configuration from ${NECKVIEW_HOME}/config.toml with sensible defaults.
//! Sync backoff and the uptime tick are fixed constants, not settings.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::store::{FetchFailurePolicy, SyncOptions};

/// Environment variable that overrides the configured server.
pub const SERVER_ENV: &str = "NECKVIEW_SERVER";

const DEFAULT_SERVER: &str = "http://127.0.0.1:8080/";

/// The default configuration template, embedded at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for neckview configuration and log directories.
    //!
    //! NECKVIEW_HOME resolution order:
    //! 1. NECKVIEW_HOME environment variable (if set)
    //! 2. ~/.config/neckview (default)

    use std::path::PathBuf;

    /// Returns the neckview home directory.
    ///
    /// Falls back to `./.neckview` when no home directory can be determined.
    pub fn neckview_home() -> PathBuf {
        if let Ok(home) = std::env::var("NECKVIEW_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".neckview"),
            |h| h.join(".config").join("neckview"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        neckview_home().join("config.toml")
    }

    /// Returns the directory the dashboard writes its log files to.
    pub fn logs_dir() -> PathBuf {
        neckview_home().join("logs")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the neck server.
    pub server: String,
    pub on_fetch_error: FetchFailurePolicy,
    /// Fallback log level when neither NECKVIEW_LOG nor `-v` is given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            on_fetch_error: FetchFailurePolicy::default(),
            log_level: None,
        }
    }
}

impl Config {
    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Resolves the server base URL.
    ///
    /// `override_url` is the value from the command line or NECKVIEW_SERVER
    /// and wins over the config file.
    pub fn server_url(&self, override_url: Option<&str>) -> Result<Url> {
        let raw = override_url
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.server);
        parse_server_url(raw)
    }

    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            on_fetch_error: self.on_fetch_error,
            ..SyncOptions::default()
        }
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

/// Parses and checks a server base URL. Only http and https are accepted.
pub fn parse_server_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("Invalid server URL '{raw}'"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => bail!(
            "Unsupported scheme '{other}' in server URL '{raw}' (expected http or https)"
        ),
    }
}
