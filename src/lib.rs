//! Tasmota Prometheus Exporter
//!
//! A Prometheus metrics exporter for Tasmota smart plugs with energy monitoring.
//!
//! # Overview
//!
//! On every scrape the exporter polls each configured plug over HTTP with the
//! `Status 0` command, in parallel, and translates the responses into a fixed set of
//! metrics labelled by device address and name. Nothing is cached between scrapes.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐    HTTP (parallel)   ┌──────────────┐
//! │  Tasmota    │ ◄─────────────────►  │   Exporter   │
//! │   plugs     │  /cm?cmnd=Status 0   │              │
//! └─────────────┘                      │  ┌────────┐  │      HTTP      ┌────────────┐
//!                                      │  │Collect │  │ ◄────────────► │ Prometheus │
//!                                      │  └────────┘  │   /metrics     └────────────┘
//!                                      │  ┌────────┐  │
//!                                      │  │Metrics │  │
//!                                      │  └────────┘  │
//!                                      └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`tasmota`] - HTTP client and status type definitions
//! - [`metrics`] - Metric catalog and per-scrape Prometheus registry
//! - [`collector`] - Parallel collection cycle
//! - [`server`] - HTTP server
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//!
//! # Quick Start
//!
//! ```no_run
//! use tasmota_exporter::{config::Config, server};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut config = Config::load("config/Default.toml")?;
//!     config.tasmota.targets = vec!["192.168.1.50".to_string()];
//!     config.validate()?;
//!     server::start(config).await?;
//!     Ok(())
//! }
//! ```

pub mod collector;
pub mod config;
pub mod error;
pub mod metrics;
pub mod server;
pub mod tasmota;
