/// Service configuration: where to listen, which API to call, which buildings to search
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::schedule::{parse_minutes, LayoutOptions};
use crate::search::DEFAULT_SESSION_TTL;
use crate::upstream::{QuietRoomConfig, QUIETROOM_BASE_URL};

/// Building list shipped with the service.
const BUILDINGS_JSON: &str = include_str!("../../../config/buildings.json");

/// Config file read when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "config/quietroom.json";

/// Top-level service configuration.
///
/// Every field has a default, so a partial (or missing) file is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub address: String,
    pub port: u16,
    /// `trace`, `debug`, `info`, `warn` or `error`
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// How long an idle session's last search is kept
    pub session_ttl_secs: u64,
    /// Buildings queried by the free-room search, in display order
    pub buildings: Vec<String>,
    pub grid: GridConfig,
}

/// Week grid geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub column_width: f64,
    pub minute_height: f64,
    /// `HHMM`, axis start for a room with no meetings
    pub default_start: String,
    /// `HHMM`, axis end for a room with no meetings
    pub default_end: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: QUIETROOM_BASE_URL.to_string(),
            address: "127.0.0.1".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            session_ttl_secs: DEFAULT_SESSION_TTL.as_secs(),
            buildings: default_buildings(),
            grid: GridConfig::default(),
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            column_width: 100.0,
            minute_height: 1.0,
            default_start: "0800".to_string(),
            default_end: "2200".to_string(),
        }
    }
}

impl Config {
    /// Loads the configuration.
    ///
    /// # Arguments
    /// * `path` - Explicit config file; it must exist. Without one,
    ///   [`DEFAULT_CONFIG_PATH`] is read if present.
    ///
    /// # Returns
    /// * `Ok(Config)` - File values (or defaults) with environment overrides applied
    /// * `Err` - If the file can't be read or parsed, or an override is invalid
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::load_from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => {
                warn!("No config file found; using defaults");
                Self::default()
            }
        };

        config.apply_overrides(std::env::vars())?;
        Ok(config)
    }

    /// Reads a JSON config file.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;

        info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Applies `QUIETROOM_*` overrides from the given variables.
    pub fn apply_overrides<I>(&mut self, vars: I) -> anyhow::Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            match key.as_str() {
                "QUIETROOM_API_URL" => self.api_base_url = value,
                "QUIETROOM_ADDRESS" => self.address = value,
                "QUIETROOM_PORT" => {
                    self.port = value
                        .parse()
                        .with_context(|| format!("invalid QUIETROOM_PORT: {value}"))?;
                }
                "QUIETROOM_LOG" => self.log_level = value,
                _ => continue,
            }
            info!(key = %key, "Applied environment override");
        }
        Ok(())
    }

    /// `address:port` to bind the server to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }

    /// Settings for the QuietRoom API client.
    pub fn client_config(&self) -> QuietRoomConfig {
        QuietRoomConfig {
            base_url: self.api_base_url.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            ..QuietRoomConfig::default()
        }
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    /// Week grid settings. Unreadable default times fall back to 08:00-22:00.
    pub fn layout_options(&self) -> LayoutOptions {
        let defaults = LayoutOptions::default();
        let minutes = |raw: &str, fallback: i32| {
            parse_minutes(raw).unwrap_or_else(|| {
                warn!(value = %raw, "Invalid grid time in config; using default");
                fallback
            })
        };

        LayoutOptions {
            column_width: self.grid.column_width,
            minute_height: self.grid.minute_height,
            default_start: minutes(&self.grid.default_start, defaults.default_start),
            default_end: minutes(&self.grid.default_end, defaults.default_end),
        }
    }

    pub fn tracing_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }
}

/// Buildings from the bundled `config/buildings.json`.
pub fn default_buildings() -> Vec<String> {
    serde_json::from_str(BUILDINGS_JSON).unwrap_or_default()
}
