//! Shared test helpers
//!
//! Fake Tasmota devices are real axum servers bound to an ephemeral port.

#![allow(dead_code)]

use axum::{extract::Query, http::StatusCode, routing::get, Router};
use std::collections::HashMap;
use std::time::Duration;

/// `Status 0` response of a plug named "Test Plug"
pub const FIXTURE: &str = r#"{
  "Status": {
    "DeviceName": "Tasmota",
    "FriendlyName": ["Test Plug"],
    "Power": "1"
  },
  "StatusSNS": {
    "Time": "2026-01-07T17:25:17",
    "ENERGY": {
      "Total": 100.5,
      "Yesterday": 2.0,
      "Today": 1.5,
      "Power": 50,
      "ApparentPower": 55,
      "ReactivePower": 15,
      "Factor": 0.91,
      "Voltage": 235,
      "Current": 0.213
    }
  },
  "StatusSTS": {
    "Uptime": "0T01:00:00",
    "UptimeSec": 3600,
    "POWER": "ON",
    "Wifi": {
      "RSSI": 80,
      "Signal": -60
    }
  }
}"#;

/// Address nothing listens on
pub const UNREACHABLE: &str = "127.0.0.1:1";

#[derive(Clone)]
pub struct FakeDevice {
    pub status: StatusCode,
    pub body: String,
    pub delay: Duration,
}

impl FakeDevice {
    pub fn ok(body: &str) -> Self {
        Self {
            status: StatusCode::OK,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn failing(status: StatusCode) -> Self {
        Self {
            status,
            body: String::new(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Start a fake device and return its `host:port` address
pub async fn spawn_device(device: FakeDevice) -> String {
    let app = Router::new().route(
        "/cm",
        get(move |Query(params): Query<HashMap<String, String>>| {
            let device = device.clone();
            async move {
                tokio::time::sleep(device.delay).await;
                if params.get("cmnd").map(String::as_str) != Some("Status 0") {
                    return (StatusCode::BAD_REQUEST, "unknown command".to_string());
                }
                (device.status, device.body)
            }
        }),
    );

    serve(app).await
}

/// Serve a router on an ephemeral local port and return its address
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener
        .local_addr()
        .expect("Failed to read local address")
        .to_string();

    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    addr
}
