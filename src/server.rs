//! HTTP Server
//!
//! This module implements the Prometheus exporter HTTP server.
//!
//! # Architecture
//!
//! - **HTTP Server**: Axum-based server exposing `/metrics`, `/health`, and `/` endpoints
//! - **On-demand Collection**: every `/metrics` request runs exactly one collection cycle
//! - **State Management**: read-only shared state (targets, timeout, client) behind `Arc`
//!
//! # Endpoints
//!
//! - `GET /` - HTML landing page with links to metrics and health
//! - `GET /metrics` - Prometheus metrics in text format
//! - `GET /health` - Liveness check, never contacts a device
//!
//! # Concurrency
//!
//! Overlapping `/metrics` requests run independent cycles. Each one renders from its
//! own [`ScrapeMetrics`] registry, so nothing is shared between them except the
//! read-only state.

use crate::collector;
use crate::config::Config;
use crate::metrics::ScrapeMetrics;
use crate::tasmota::TasmotaClient;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Content type of the Prometheus text exposition format
const TEXT_FORMAT: &str = "text/plain; version=0.0.4; charset=utf-8";

#[derive(Clone)]
pub struct AppState {
    targets: Arc<[String]>,
    timeout: Duration,
    client: Arc<TasmotaClient>,
}

impl AppState {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            targets: config.tasmota.targets.clone().into(),
            timeout: config.tasmota.scrape_timeout,
            client: Arc::new(TasmotaClient::new()?),
        })
    }
}

pub async fn start(config: Config) -> anyhow::Result<()> {
    let state = AppState::new(&config)?;
    let app = router(state);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Metrics server listening on {}", addr);
    info!("Metrics available at http://{}/metrics", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the exporter router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Run one collection cycle and render it
pub async fn scrape(state: &AppState) -> anyhow::Result<String> {
    let samples =
        collector::collect(&state.targets, Arc::clone(&state.client), state.timeout).await;

    let metrics = ScrapeMetrics::new()?;
    metrics.record_all(&samples)?;
    metrics.render()
}

async fn root_handler() -> impl IntoResponse {
    Html(
        r#"<html>
<head><title>Tasmota Exporter</title></head>
<body>
<h1>Tasmota Exporter</h1>
<p><a href="/metrics">Metrics</a></p>
<p><a href="/health">Health</a></p>
</body>
</html>"#,
    )
}

async fn metrics_handler(State(state): State<AppState>) -> Response {
    match scrape(&state).await {
        Ok(metrics) => ([(header::CONTENT_TYPE, TEXT_FORMAT)], metrics).into_response(),
        Err(e) => {
            error!("Failed to render metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error rendering metrics: {}", e),
            )
                .into_response()
        }
    }
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK\n")
}
