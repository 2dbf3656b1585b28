//! MaxiGauge Common Library
//!
//! This crate provides shared types and utilities for the MaxiGauge MQTT bridge:
//!
//! - [`readings`] - Gauge data model (`ChannelStatus`, `Units`, `GaugeReading`, `Readback`)
//! - [`config`] - Configuration primitives and YAML loading
//! - [`presence`] - Online/offline presence payloads
//! - [`session`] - MQTT client options with last will
//! - [`topics`] - Topic builder
//! - [`error`] - Error types

pub mod config;
pub mod error;
pub mod presence;
pub mod readings;
pub mod session;
pub mod topics;

// Re-export commonly used types at the crate root
pub use config::{
    LogFormat, LoggingConfig, MqttConfig, PresenceFormat, TopicConfig, parse_config,
};
pub use error::{Error, Result};
pub use presence::Presence;
pub use readings::{
    ChannelStatus, GaugeReading, Readback, SensorReadback, Units, current_timestamp_secs,
    decode_channel_status, decode_units, default_channel_name,
};
pub use session::mqtt_options;
pub use topics::TopicBuilder;

/// Initialize tracing with the given configuration.
///
/// Supports two output formats:
/// - `LogFormat::Text` (default): Human-readable text format
/// - `LogFormat::Json`: Structured JSON format for log aggregation systems
///
/// `RUST_LOG` takes precedence over the configured level.
///
/// # Example
///
/// ```ignore
/// use maxigauge_common::{LoggingConfig, LogFormat, init_tracing};
///
/// let config = LoggingConfig {
///     level: "info".to_string(),
///     format: LogFormat::Json,
/// };
/// init_tracing(&config)?;
/// ```
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
    }

    Ok(())
}
