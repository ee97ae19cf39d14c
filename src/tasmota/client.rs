//! Tasmota HTTP Client
//!
//! Fetches device status through the Tasmota web command interface.
//!
//! # Protocol
//!
//! - **Request**: `GET http://{address}/cm?cmnd=Status%200`
//! - **Authentication**: none
//! - **Response**: a single JSON document containing every status section
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use tasmota_exporter::tasmota::TasmotaClient;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = TasmotaClient::new()?;
//! let status = client
//!     .fetch_status("192.168.1.50:80", Duration::from_secs(5))
//!     .await?;
//! println!("{} draws {} W", status.display_name(), status.status_sns.energy.power);
//! # Ok(())
//! # }
//! ```

use crate::error::{ExporterError, Result};
use crate::tasmota::types::Status;
use reqwest::{Client, Url};
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// Path and command of the full status query, already URL-encoded
const STATUS_COMMAND: &str = "cm?cmnd=Status%200";

/// Client for the Tasmota web command interface
///
/// Holds only a connection pool; each call is independent, so one client is shared
/// across all targets and all concurrent scrapes.
#[derive(Debug, Clone)]
pub struct TasmotaClient {
    http: Client,
}

impl TasmotaClient {
    pub fn new() -> anyhow::Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("tasmota-exporter/", env!("CARGO_PKG_VERSION")))
            // Plugs live on the local network
            .no_proxy()
            .build()?;
        Ok(Self { http })
    }

    /// Fetch and parse the full status of one device
    ///
    /// `timeout_after` bounds the whole exchange, from connecting to reading the
    /// last byte of the body.
    ///
    /// # Errors
    ///
    /// - [`ExporterError::InvalidAddress`] if no URL can be built from `address`
    /// - [`ExporterError::Http`] on connection or transport failures
    /// - [`ExporterError::UnexpectedStatus`] on any non-2xx response
    /// - [`ExporterError::Timeout`] if the deadline passes
    /// - [`ExporterError::Json`] if the body is not a valid status document
    pub async fn fetch_status(&self, address: &str, timeout_after: Duration) -> Result<Status> {
        let url = status_url(address)?;

        match timeout(timeout_after, self.execute(url)).await {
            Ok(result) => result,
            Err(_) => Err(ExporterError::Timeout(timeout_after)),
        }
    }

    async fn execute(&self, url: Url) -> Result<Status> {
        debug!("Requesting {}", url);

        let response = self.http.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExporterError::UnexpectedStatus(status.as_u16()));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Build the status URL for a `host:port` address
pub fn status_url(address: &str) -> Result<Url> {
    let invalid = |reason: String| ExporterError::InvalidAddress {
        address: address.to_string(),
        reason,
    };

    if address.is_empty() || address.contains(['/', '?', '#', '@']) {
        return Err(invalid("expected host or host:port".to_string()));
    }

    Url::parse(&format!("http://{}/{}", address, STATUS_COMMAND)).map_err(|e| invalid(e.to_string()))
}
