//! Prometheus Metrics Definitions
//!
//! This module defines every metric exposed by the Tasmota exporter.
//!
//! # Metric Catalog
//!
//! The catalog is a fixed table of [`MetricDescriptor`]s. Both the metadata listing
//! ([`descriptors`]) and the sample emission path in [`crate::collector`] reference the
//! same statics, so the two cannot drift apart.
//!
//! ## Reachability
//! - `tasmota_up` - 1 if the device answered, 0 otherwise (labels: address)
//!
//! ## Electrical Readings
//! - Power, voltage, current, power factor, apparent and reactive power
//!
//! ## Energy
//! - `tasmota_energy_total_kwh` is the only counter
//! - `today`/`yesterday` reset daily, so they are gauges
//!
//! ## Device State
//! - Relay state, uptime and WiFi quality
//!
//! All reading metrics carry the `address` and `device` labels.
//!
//! # Scrape Registries
//!
//! Readings are not kept between scrapes. Every scrape builds its own
//! [`ScrapeMetrics`], records the samples of that cycle and renders them.

use prometheus::core::Collector;
use prometheus::{CounterVec, Encoder, GaugeVec, Opts, Registry, TextEncoder};
use std::collections::HashMap;

/// Prefix applied to every metric name
pub const NAMESPACE: &str = "tasmota";

const ADDRESS_LABELS: &[&str] = &["address"];
const DEVICE_LABELS: &[&str] = &["address", "device"];

/// Prometheus metric type of a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Gauge,
    /// Monotonic counter
    Counter,
}

/// Static definition of one exported metric
#[derive(Debug, PartialEq, Eq)]
pub struct MetricDescriptor {
    /// Name without the namespace prefix
    pub name: &'static str,
    pub help: &'static str,
    pub kind: MetricKind,
    /// Ordered label names
    pub labels: &'static [&'static str],
}

impl MetricDescriptor {
    /// Fully qualified name as exposed to Prometheus (e.g. `tasmota_up`)
    pub fn fq_name(&self) -> String {
        format!("{}_{}", NAMESPACE, self.name)
    }
}

const fn gauge(name: &'static str, help: &'static str) -> MetricDescriptor {
    MetricDescriptor {
        name,
        help,
        kind: MetricKind::Gauge,
        labels: DEVICE_LABELS,
    }
}

pub static UP: MetricDescriptor = MetricDescriptor {
    name: "up",
    help: "Whether the Tasmota device is reachable",
    kind: MetricKind::Gauge,
    labels: ADDRESS_LABELS,
};

pub static POWER_WATTS: MetricDescriptor =
    gauge("power_watts", "Current power consumption in watts");
pub static VOLTAGE_VOLTS: MetricDescriptor = gauge("voltage_volts", "Current voltage in volts");
pub static CURRENT_AMPS: MetricDescriptor = gauge("current_amps", "Current in amperes");

pub static ENERGY_TOTAL_KWH: MetricDescriptor = MetricDescriptor {
    name: "energy_total_kwh",
    help: "Total energy consumed in kWh",
    kind: MetricKind::Counter,
    labels: DEVICE_LABELS,
};

// Reset at midnight by the firmware, hence gauges.
pub static ENERGY_TODAY_KWH: MetricDescriptor =
    gauge("energy_today_kwh", "Energy consumed today in kWh");
pub static ENERGY_YESTERDAY_KWH: MetricDescriptor =
    gauge("energy_yesterday_kwh", "Energy consumed yesterday in kWh");

pub static POWER_FACTOR: MetricDescriptor = gauge("power_factor", "Power factor (0-1)");
pub static APPARENT_POWER_VA: MetricDescriptor =
    gauge("apparent_power_va", "Apparent power in VA");
pub static REACTIVE_POWER_VAR: MetricDescriptor =
    gauge("reactive_power_var", "Reactive power in VAR");
pub static RELAY_STATE: MetricDescriptor = gauge("relay_state", "Relay state (1=on, 0=off)");
pub static UPTIME_SECONDS: MetricDescriptor = gauge("uptime_seconds", "Device uptime in seconds");
pub static WIFI_RSSI_PERCENT: MetricDescriptor =
    gauge("wifi_rssi_percent", "WiFi RSSI as percentage");
pub static WIFI_SIGNAL_DBM: MetricDescriptor =
    gauge("wifi_signal_dbm", "WiFi signal strength in dBm");

static DESCRIPTORS: [&MetricDescriptor; 14] = [
    &UP,
    &POWER_WATTS,
    &VOLTAGE_VOLTS,
    &CURRENT_AMPS,
    &ENERGY_TOTAL_KWH,
    &ENERGY_TODAY_KWH,
    &ENERGY_YESTERDAY_KWH,
    &POWER_FACTOR,
    &APPARENT_POWER_VA,
    &REACTIVE_POWER_VAR,
    &RELAY_STATE,
    &UPTIME_SECONDS,
    &WIFI_RSSI_PERCENT,
    &WIFI_SIGNAL_DBM,
];

/// All metric descriptors, available without contacting any device
pub fn descriptors() -> &'static [&'static MetricDescriptor] {
    &DESCRIPTORS
}

/// One metric value produced by a scrape
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub descriptor: &'static MetricDescriptor,
    pub value: f64,
    /// Label values, in the order of `descriptor.labels`
    pub labels: Vec<String>,
}

impl Sample {
    pub fn new(descriptor: &'static MetricDescriptor, value: f64, labels: Vec<String>) -> Self {
        Self {
            descriptor,
            value,
            labels,
        }
    }

    pub fn name(&self) -> &'static str {
        self.descriptor.name
    }

    pub fn kind(&self) -> MetricKind {
        self.descriptor.kind
    }
}

enum MetricFamily {
    Gauge(GaugeVec),
    Counter(CounterVec),
}

/// Prometheus registry holding the samples of a single scrape
pub struct ScrapeMetrics {
    registry: Registry,
    families: HashMap<&'static str, MetricFamily>,
}

impl ScrapeMetrics {
    /// Build a registry with every descriptor of the catalog registered
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();
        let mut families = HashMap::with_capacity(DESCRIPTORS.len());

        for descriptor in descriptors() {
            let opts = Opts::new(descriptor.name, descriptor.help).namespace(NAMESPACE);
            let family = match descriptor.kind {
                MetricKind::Gauge => {
                    let vec = GaugeVec::new(opts, descriptor.labels)?;
                    registry.register(Box::new(vec.clone()))?;
                    MetricFamily::Gauge(vec)
                }
                MetricKind::Counter => {
                    let vec = CounterVec::new(opts, descriptor.labels)?;
                    registry.register(Box::new(vec.clone()))?;
                    MetricFamily::Counter(vec)
                }
            };
            families.insert(descriptor.name, family);
        }

        Ok(Self { registry, families })
    }

    /// Fully qualified names of every registered metric
    pub fn describe(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .families
            .values()
            .flat_map(|family| match family {
                MetricFamily::Gauge(vec) => vec.desc(),
                MetricFamily::Counter(vec) => vec.desc(),
            })
            .map(|desc| desc.fq_name.clone())
            .collect();
        names.sort();
        names
    }

    /// Record one sample
    pub fn record(&self, sample: &Sample) -> anyhow::Result<()> {
        let family = self
            .families
            .get(sample.name())
            .ok_or_else(|| anyhow::anyhow!("Unknown metric {}", sample.descriptor.fq_name()))?;
        let labels: Vec<&str> = sample.labels.iter().map(String::as_str).collect();

        match family {
            MetricFamily::Gauge(vec) => {
                vec.get_metric_with_label_values(labels.as_slice())?.set(sample.value);
            }
            MetricFamily::Counter(vec) => {
                // The device reports the absolute total.
                let counter = vec.get_metric_with_label_values(labels.as_slice())?;
                counter.reset();
                counter.inc_by(sample.value.max(0.0));
            }
        }
        Ok(())
    }

    pub fn record_all<'a>(
        &self,
        samples: impl IntoIterator<Item = &'a Sample>,
    ) -> anyhow::Result<()> {
        for sample in samples {
            self.record(sample)?;
        }
        Ok(())
    }

    /// Render metrics in Prometheus text format
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
