//! Collection Orchestrator
//!
//! Runs one collection cycle across every configured device.
//!
//! # Cycle
//!
//! 1. One tokio task is spawned per target; all fetches run concurrently
//! 2. Each fetch carries its own deadline, so a slow device only delays itself
//! 3. Every task builds its samples privately; they are concatenated once all tasks finish
//!
//! # Error Handling
//!
//! A failed device never fails the cycle. It contributes a single `tasmota_up 0`
//! sample and a warning in the log; none of its other metrics are emitted.

use crate::error::Result;
use crate::metrics::{self, Sample};
use crate::tasmota::{Status, TasmotaClient};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

/// Outcome of fetching one target
pub type FetchResult = Result<Status>;

/// Run one collection cycle and return the samples of every target
///
/// Returns only after every fetch has completed, failed or timed out. Samples are
/// grouped per target in the order of `targets`; within a target `up` comes first.
pub async fn collect(
    targets: &[String],
    client: Arc<TasmotaClient>,
    timeout: Duration,
) -> Vec<Sample> {
    let started = Instant::now();

    let handles: Vec<_> = targets
        .iter()
        .map(|address| {
            let client = Arc::clone(&client);
            let address = address.clone();
            tokio::spawn(async move {
                let result = client.fetch_status(&address, timeout).await;
                target_samples(&address, result)
            })
        })
        .collect();

    let mut samples = Vec::with_capacity(targets.len() * metrics::descriptors().len());
    let mut reachable = 0;

    for (address, handle) in targets.iter().zip(handles) {
        let target = match handle.await {
            Ok(target) => target,
            Err(e) => {
                error!("Collection task for {} aborted: {}", address, e);
                vec![up_sample(address, false)]
            }
        };
        if target.len() > 1 {
            reachable += 1;
        }
        samples.extend(target);
    }

    debug!(
        targets = targets.len(),
        reachable,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Collection cycle finished"
    );

    samples
}

/// Translate the outcome of one fetch into samples
///
/// On success: `up=1` followed by the 13 readings, labelled with the address and
/// the device's display name. On failure: only `up=0`.
pub fn target_samples(address: &str, result: FetchResult) -> Vec<Sample> {
    let status = match result {
        Ok(status) => status,
        Err(e) => {
            warn!(
                address = %address,
                cause = e.kind(),
                "Error fetching status from {}: {}",
                address,
                e
            );
            return vec![up_sample(address, false)];
        }
    };

    let labels = vec![address.to_string(), status.display_name().to_string()];
    let energy = &status.status_sns.energy;
    let state = &status.status_sts;

    let readings = [
        (&metrics::POWER_WATTS, energy.power),
        (&metrics::VOLTAGE_VOLTS, energy.voltage),
        (&metrics::CURRENT_AMPS, energy.current),
        (&metrics::ENERGY_TOTAL_KWH, energy.total),
        (&metrics::ENERGY_TODAY_KWH, energy.today),
        (&metrics::ENERGY_YESTERDAY_KWH, energy.yesterday),
        (&metrics::POWER_FACTOR, energy.factor),
        (&metrics::APPARENT_POWER_VA, energy.apparent_power),
        (&metrics::REACTIVE_POWER_VAR, energy.reactive_power),
        (&metrics::RELAY_STATE, status.relay_state()),
        (&metrics::UPTIME_SECONDS, state.uptime_sec as f64),
        (&metrics::WIFI_RSSI_PERCENT, state.wifi.rssi as f64),
        (&metrics::WIFI_SIGNAL_DBM, state.wifi.signal as f64),
    ];

    let mut samples = Vec::with_capacity(readings.len() + 1);
    samples.push(up_sample(address, true));
    samples.extend(
        readings
            .into_iter()
            .map(|(descriptor, value)| Sample::new(descriptor, value, labels.clone())),
    );
    samples
}

fn up_sample(address: &str, up: bool) -> Sample {
    Sample::new(
        &metrics::UP,
        if up { 1.0 } else { 0.0 },
        vec![address.to_string()],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExporterError;
    use crate::metrics::MetricKind;

    #[test]
    fn test_failure_emits_only_up() {
        let samples = target_samples("10.0.0.9:80", Err(ExporterError::UnexpectedStatus(500)));
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].name(), "up");
        assert_eq!(samples[0].value, 0.0);
        assert_eq!(samples[0].labels, vec!["10.0.0.9:80".to_string()]);
    }

    #[test]
    fn test_success_emits_up_first() {
        let samples = target_samples("10.0.0.9:80", Ok(Status::default()));
        assert_eq!(samples.len(), 14);
        assert_eq!(samples[0].name(), "up");
        assert_eq!(samples[0].value, 1.0);
        assert!(samples[1..].iter().all(|s| s.labels.len() == 2));
    }

    #[test]
    fn test_energy_total_is_counter() {
        let samples = target_samples("10.0.0.9:80", Ok(Status::default()));
        for sample in samples {
            let expected = if sample.name() == "energy_total_kwh" {
                MetricKind::Counter
            } else {
                MetricKind::Gauge
            };
            assert_eq!(sample.kind(), expected, "{}", sample.name());
        }
    }

    #[tokio::test]
    async fn test_collect_without_targets_is_empty() {
        let client = Arc::new(TasmotaClient::new().unwrap());
        let samples = collect(&[], client, Duration::from_millis(100)).await;
        assert!(samples.is_empty());
    }
}
