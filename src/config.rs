use crate::error::{ExporterError, Result};
use anyhow::Context;
use serde::{Deserialize, Deserializer};
use std::time::Duration;
use tracing::warn;

/// Scrape timeout used when none is configured or the configured one is unusable
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub tasmota: TasmotaConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TasmotaConfig {
    /// Device addresses (`host:port`), scraped in this order
    #[serde(default)]
    pub targets: Vec<String>,
    /// Per-device timeout, written as a human-readable duration ("5s", "750ms")
    #[serde(
        default = "default_scrape_timeout",
        deserialize_with = "deserialize_timeout"
    )]
    pub scrape_timeout: Duration,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_scrape_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn deserialize_timeout<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(parse_timeout(&raw))
}

fn default_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9184
}

impl Default for TasmotaConfig {
    fn default() -> Self {
        Self {
            targets: Vec::new(),
            scrape_timeout: default_scrape_timeout(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            port: default_port(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        // Load environment variables from .env if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("TASMOTA_EXPORTER")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("tasmota.targets"),
            )
            .build()
            .context("Failed to build configuration")?;

        let mut config: Config = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.tasmota.targets = config
            .tasmota
            .targets
            .iter()
            .flat_map(|t| parse_targets(t))
            .collect();

        Ok(config)
    }

    /// Reject configurations the exporter cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.tasmota.targets.is_empty() {
            return Err(ExporterError::Config(
                "no targets configured; set TASMOTA_TARGETS to a comma-separated list of host:port addresses"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

impl ServerConfig {
    /// Parse a `[host]:port` listen address; an empty host binds all interfaces
    pub fn from_listen_address(raw: &str) -> Result<Self> {
        let (host, port) = raw.trim().rsplit_once(':').ok_or_else(|| {
            ExporterError::Config(format!("listen address {:?} must be [host]:port", raw))
        })?;

        let port = port.parse::<u16>().map_err(|e| {
            ExporterError::Config(format!("invalid port in listen address {:?}: {}", raw, e))
        })?;

        let addr = if host.is_empty() {
            default_addr()
        } else {
            host.to_string()
        };

        Ok(Self { addr, port })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.addr, self.port)
    }
}

/// Split a comma-separated target list, dropping blank entries
pub fn parse_targets(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Parse a scrape timeout, falling back to [`DEFAULT_TIMEOUT`]
pub fn parse_timeout(raw: &str) -> Duration {
    match humantime::parse_duration(raw.trim()) {
        Ok(timeout) if !timeout.is_zero() => timeout,
        Ok(_) => {
            warn!("Scrape timeout {:?} is zero, using default {:?}", raw, DEFAULT_TIMEOUT);
            DEFAULT_TIMEOUT
        }
        Err(e) => {
            warn!(
                "Invalid scrape timeout {:?} ({}), using default {:?}",
                raw, e, DEFAULT_TIMEOUT
            );
            DEFAULT_TIMEOUT
        }
    }
}
