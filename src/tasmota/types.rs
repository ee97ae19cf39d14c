//! Tasmota Status Type Definitions
//!
//! Rust struct definitions for the `Status 0` response of the Tasmota firmware.
//! A single `Status 0` call returns every status section at once; the exporter
//! only reads three of them.
//!
//! # Sections Covered
//!
//! - `Status` → [`DeviceStatus`] (identity and the numeric power flag)
//! - `StatusSNS` → [`SensorStatus`], [`EnergyStatus`] (energy monitoring readings)
//! - `StatusSTS` → [`StateStatus`], [`WifiStatus`] (runtime state)
//!
//! # Design Notes
//!
//! - **Serde Defaults**: every section and field uses `#[serde(default)]`. Plugs without
//!   energy monitoring omit `ENERGY`, and older firmware omits `FriendlyName`.
//! - **Derived Fields**: [`Status::display_name`] and [`Status::relay_state`] are computed
//!   on demand from the parsed record and never stored.

use serde::{Deserialize, Deserializer};

/// Full response of the `Status 0` command
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Status {
    #[serde(rename = "Status", default)]
    pub status: DeviceStatus,
    #[serde(rename = "StatusSNS", default)]
    pub status_sns: SensorStatus,
    #[serde(rename = "StatusSTS", default)]
    pub status_sts: StateStatus,
}

/// Device identity section
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DeviceStatus {
    #[serde(rename = "DeviceName", default)]
    pub device_name: String,
    #[serde(rename = "FriendlyName", default)]
    pub friendly_name: Vec<String>,
    /// "0" or "1"
    #[serde(rename = "Power", default, deserialize_with = "string_or_number")]
    pub power: String,
}

/// Sensor section, carrying the energy readings
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SensorStatus {
    #[serde(rename = "Time", default)]
    pub time: String,
    #[serde(rename = "ENERGY", default)]
    pub energy: EnergyStatus,
}

/// Energy monitoring readings
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct EnergyStatus {
    /// Lifetime cumulative energy (kWh)
    pub total: f64,
    pub yesterday: f64,
    pub today: f64,
    /// Active power (W)
    pub power: f64,
    /// VA
    pub apparent_power: f64,
    /// VAR
    pub reactive_power: f64,
    pub factor: f64,
    pub voltage: f64,
    pub current: f64,
}

/// Runtime state section
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StateStatus {
    #[serde(rename = "Uptime", default)]
    pub uptime: String,
    #[serde(rename = "UptimeSec", default)]
    pub uptime_sec: i64,
    /// "ON" or "OFF"
    #[serde(rename = "POWER", default)]
    pub power: String,
    #[serde(rename = "Wifi", default)]
    pub wifi: WifiStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WifiStatus {
    /// Relative signal quality (0-100)
    #[serde(rename = "RSSI")]
    pub rssi: i64,
    /// Absolute signal strength (dBm)
    #[serde(rename = "Signal")]
    pub signal: i64,
}

impl Status {
    /// Name used for the `device` label.
    ///
    /// Prefers the first non-empty friendly name, falling back to the internal
    /// device name when the list is absent or holds only empty strings.
    pub fn display_name(&self) -> &str {
        self.status
            .friendly_name
            .iter()
            .find(|name| !name.is_empty())
            .map(String::as_str)
            .unwrap_or(self.status.device_name.as_str())
    }

    /// Relay state as a metric value (1 = on, 0 = off).
    ///
    /// Either power flag reporting "on" wins.
    pub fn relay_state(&self) -> f64 {
        if self.status_sts.power == "ON" || self.status.power == "1" {
            1.0
        } else {
            0.0
        }
    }
}

// Some firmware builds send `"Power": 1` instead of `"Power": "1"`.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}
