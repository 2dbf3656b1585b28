//! Configuration for the MaxiGauge bridge.

use std::time::Duration;

use maxigauge_bridge_framework::{
    BridgeConfig, BridgeError, LoggingConfig, MqttConfig, PresenceFormat, TopicConfig,
};
use serde::{Deserialize, Serialize};

use crate::transport::InstrumentAddress;

/// Complete bridge configuration.
///
/// The file is flat YAML:
///
/// ```yaml
/// topic_base: lab/vacuum
/// device_name: maxigauge
/// client_id: maxigauge-bridge
/// mqtt_broker: localhost
/// mqtt_port: 1883
/// maxigauge_address: "TCPIP::192.168.1.101::8000::SOCKET"
/// interval: 10
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaxiGaugeBridgeConfig {
    /// MQTT connection settings
    #[serde(flatten)]
    pub mqtt: MqttConfig,

    /// Topic namespace
    #[serde(flatten)]
    pub topics: TopicConfig,

    /// Instrument address (VISA resource, `host:port`, or serial device)
    pub maxigauge_address: String,

    /// Poll interval in seconds
    pub interval: f64,

    /// Serial baud rate (serial addresses only)
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// TCP connect timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Presence payload format
    #[serde(default)]
    pub presence_format: PresenceFormat,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_baud_rate() -> u32 {
    9600
}

fn default_connect_timeout_secs() -> u64 {
    5
}

impl MaxiGaugeBridgeConfig {
    /// Parsed instrument address.
    pub fn instrument_address(&self) -> Result<InstrumentAddress, BridgeError> {
        self.maxigauge_address
            .parse()
            .map_err(|e| BridgeError::validation(format!("maxigauge_address: {}", e)))
    }

    /// TCP connect timeout.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl BridgeConfig for MaxiGaugeBridgeConfig {
    fn mqtt(&self) -> &MqttConfig {
        &self.mqtt
    }

    fn topics(&self) -> &TopicConfig {
        &self.topics
    }

    fn logging(&self) -> &LoggingConfig {
        &self.logging
    }

    fn interval_secs(&self) -> f64 {
        self.interval
    }

    fn presence_format(&self) -> PresenceFormat {
        self.presence_format
    }

    fn validate(&self) -> Result<(), BridgeError> {
        self.instrument_address()?;

        if self.baud_rate == 0 {
            return Err(BridgeError::validation("baud_rate must be positive"));
        }

        if self.connect_timeout_secs == 0 {
            return Err(BridgeError::validation(
                "connect_timeout_secs must be positive",
            ));
        }

        Ok(())
    }
}
