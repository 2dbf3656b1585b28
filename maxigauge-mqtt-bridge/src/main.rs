//! MQTT bridge for Pfeiffer MaxiGauge vacuum gauge controllers.
//!
//! Polls the controller every `interval` seconds and publishes readbacks
//! until Ctrl+C or SIGTERM.

use anyhow::{Context, Result};
use maxigauge_bridge_framework::{
    BridgeArgs, BridgeConfig, BridgeRunner, init_tracing, stop_on_signal,
};
use maxigauge_mqtt_bridge::{MaxiGaugeBridgeConfig, MaxiGaugePoller};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let args = BridgeArgs::parse();

    // Load configuration
    let config = MaxiGaugeBridgeConfig::load(&args.config)
        .with_context(|| format!("Failed to load config from {:?}", args.config))?;

    // Initialize logging
    init_tracing(&config.logging).context("Failed to init tracing")?;

    info!("Starting maxigauge-mqtt");
    info!("Loaded configuration from {:?}", args.config);

    let poller = MaxiGaugePoller::open(&config)
        .await
        .context("Failed to connect to MaxiGauge")?;

    let runner = BridgeRunner::connect("maxigauge", &config)
        .context("Failed to create MQTT client")?;
    stop_on_signal(runner.stop_handle());

    runner.run(poller).await?;

    info!("MaxiGauge bridge stopped");
    Ok(())
}
