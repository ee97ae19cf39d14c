use anyhow::Result;
use clap::Parser;
use tasmota_exporter::config::{self, Config, ServerConfig};
use tasmota_exporter::server;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/Default.toml")]
    config: String,

    /// Comma-separated device addresses, e.g. 192.168.1.50,192.168.1.51:8080 (overrides config)
    #[arg(short, long, env = "TASMOTA_TARGETS")]
    targets: Option<String>,

    /// Per-device scrape timeout, e.g. 5s or 500ms (overrides config)
    #[arg(long, env = "SCRAPE_TIMEOUT")]
    scrape_timeout: Option<String>,

    /// Address to listen on, e.g. :9184 or 127.0.0.1:9184 (overrides config)
    #[arg(short, long, env = "LISTEN_ADDRESS")]
    listen_address: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Tasmota Prometheus Exporter v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(&args.config)?;

    // Override with CLI arguments if provided
    if let Some(targets) = args.targets {
        config.tasmota.targets = config::parse_targets(&targets);
    }
    if let Some(timeout) = args.scrape_timeout {
        config.tasmota.scrape_timeout = config::parse_timeout(&timeout);
    }
    if let Some(listen_address) = args.listen_address {
        config.server = ServerConfig::from_listen_address(&listen_address)?;
    }

    if let Err(e) = config.validate() {
        error!("{}", e);
        std::process::exit(1);
    }

    info!("Configuration loaded successfully");
    info!("Monitoring targets: {:?}", config.tasmota.targets);
    info!("Scrape timeout: {:?}", config.tasmota.scrape_timeout);
    info!(
        "Metrics endpoint: http://{}/metrics",
        config.server.bind_address()
    );

    // Start the metrics server
    if let Err(e) = server::start(config).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
