use tasmota_exporter::collector::target_samples;
use tasmota_exporter::metrics::{self, descriptors, MetricKind, Sample, ScrapeMetrics};
use tasmota_exporter::tasmota::Status;

fn fixture_status() -> Status {
    serde_json::from_str(
        r#"{
            "Status": {"DeviceName": "Tasmota", "FriendlyName": ["Desk"], "Power": "0"},
            "StatusSNS": {"ENERGY": {"Total": 100.5, "Today": 1.5, "Power": 50}},
            "StatusSTS": {"POWER": "ON", "UptimeSec": 3600}
        }"#,
    )
    .expect("Failed to parse fixture")
}

#[test]
fn test_catalog_has_fourteen_descriptors() {
    // Metadata is available without any device
    assert_eq!(descriptors().len(), 14);
}

#[test]
fn test_catalog_kinds() {
    let counters: Vec<_> = descriptors()
        .iter()
        .filter(|d| d.kind == MetricKind::Counter)
        .map(|d| d.name)
        .collect();
    assert_eq!(counters, vec!["energy_total_kwh"]);

    assert_eq!(metrics::ENERGY_TODAY_KWH.kind, MetricKind::Gauge);
    assert_eq!(metrics::ENERGY_YESTERDAY_KWH.kind, MetricKind::Gauge);
}

#[test]
fn test_fq_names_use_namespace() {
    assert_eq!(metrics::UP.fq_name(), "tasmota_up");
    assert_eq!(metrics::WIFI_SIGNAL_DBM.fq_name(), "tasmota_wifi_signal_dbm");
}

#[test]
fn test_metrics_registration() {
    // Verify that all metrics can be created and registered without panicking
    let scrape = ScrapeMetrics::new().expect("Failed to create scrape metrics");

    let described = scrape.describe();
    assert_eq!(described.len(), 14);
    assert!(described.contains(&"tasmota_up".to_string()));
    assert!(described.contains(&"tasmota_energy_total_kwh".to_string()));
}

#[test]
fn test_render_types_and_labels() {
    // Given: The samples of one reachable device
    let scrape = ScrapeMetrics::new().expect("Failed to create scrape metrics");
    let samples = target_samples("10.0.0.5:80", Ok(fixture_status()));
    scrape.record_all(&samples).expect("Failed to record samples");

    // When: Rendering
    let rendered = scrape.render().expect("Failed to render");

    // Then: Types and values are in Prometheus text format
    assert!(rendered.contains("# HELP tasmota_up Whether the Tasmota device is reachable"));
    assert!(rendered.contains("# TYPE tasmota_up gauge"));
    assert!(rendered.contains("# TYPE tasmota_energy_total_kwh counter"));
    assert!(rendered.contains("# TYPE tasmota_energy_today_kwh gauge"));
    assert!(rendered.contains("# TYPE tasmota_energy_yesterday_kwh gauge"));
    assert!(rendered.contains("tasmota_up{address=\"10.0.0.5:80\"} 1"));
    assert!(rendered.contains("tasmota_power_watts{address=\"10.0.0.5:80\",device=\"Desk\"} 50"));
    assert!(rendered
        .contains("tasmota_energy_total_kwh{address=\"10.0.0.5:80\",device=\"Desk\"} 100.5"));
    assert!(rendered.contains("tasmota_relay_state{address=\"10.0.0.5:80\",device=\"Desk\"} 1"));
    assert!(rendered
        .contains("tasmota_uptime_seconds{address=\"10.0.0.5:80\",device=\"Desk\"} 3600"));
}

#[test]
fn test_render_down_device_has_only_up() {
    let scrape = ScrapeMetrics::new().expect("Failed to create scrape metrics");
    let samples = vec![Sample::new(&metrics::UP, 0.0, vec!["10.0.0.6:80".to_string()])];
    scrape.record_all(&samples).expect("Failed to record samples");

    let rendered = scrape.render().expect("Failed to render");

    assert!(rendered.contains("tasmota_up{address=\"10.0.0.6:80\"} 0"));
    assert!(!rendered.contains("tasmota_power_watts"));
    assert!(!rendered.contains("device="));
}

#[test]
fn test_fresh_registries_do_not_share_state() {
    let first = ScrapeMetrics::new().expect("Failed to create scrape metrics");
    first
        .record_all(&target_samples("10.0.0.5:80", Ok(fixture_status())))
        .expect("Failed to record samples");

    let second = ScrapeMetrics::new().expect("Failed to create scrape metrics");
    let rendered = second.render().expect("Failed to render");

    assert!(!rendered.contains("10.0.0.5:80"));
}

#[test]
fn test_counter_records_absolute_value() {
    let scrape = ScrapeMetrics::new().expect("Failed to create scrape metrics");
    let labels = vec!["10.0.0.5:80".to_string(), "Desk".to_string()];

    // Recording the same series twice keeps the latest reading, not the sum
    scrape
        .record(&Sample::new(&metrics::ENERGY_TOTAL_KWH, 10.0, labels.clone()))
        .unwrap();
    scrape
        .record(&Sample::new(&metrics::ENERGY_TOTAL_KWH, 12.5, labels))
        .unwrap();

    let rendered = scrape.render().unwrap();
    assert!(rendered
        .contains("tasmota_energy_total_kwh{address=\"10.0.0.5:80\",device=\"Desk\"} 12.5"));
}
