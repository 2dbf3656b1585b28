use serde::{Deserialize, Serialize};

use crate::error::Result;

/// MQTT broker connection settings.
///
/// Field names match the flat keys of the bridge configuration file, so the
/// struct is meant to be `#[serde(flatten)]`-ed into a bridge config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MqttConfig {
    /// Client identifier presented to the broker.
    pub client_id: String,

    /// Broker host name or IP address.
    pub mqtt_broker: String,

    /// Broker TCP port.
    #[serde(default = "default_mqtt_port")]
    pub mqtt_port: u16,

    /// Keep-alive interval in seconds.
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,

    /// Ask the broker to discard session state on connect.
    #[serde(default)]
    pub clean_session: bool,
}

fn default_mqtt_port() -> u16 {
    1883
}

fn default_keep_alive_secs() -> u64 {
    30
}

/// Topic namespace of a bridged device: `<topic_base>/<device_name>/...`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicConfig {
    /// Base path shared by all devices.
    pub topic_base: String,

    /// Name of this device inside the base path.
    pub device_name: String,
}

/// Payload format of presence messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceFormat {
    /// Bare `online` / `offline` strings (default).
    #[default]
    Plain,
    /// `{"value":"online"}` / `{"value":"offline"}` JSON objects.
    Json,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format (default).
    #[default]
    Text,
    /// Structured JSON format.
    Json,
}

/// Common logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format: "text" or "json".
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Parse a configuration from a YAML string.
pub fn parse_config<T: for<'de> Deserialize<'de>>(content: &str) -> Result<T> {
    Ok(serde_yaml::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(flatten)]
        mqtt: MqttConfig,
        #[serde(flatten)]
        topics: TopicConfig,
        #[serde(default)]
        logging: LoggingConfig,
        #[serde(default)]
        presence_format: PresenceFormat,
    }

    #[test]
    fn test_parse_flat_config() {
        let yaml = r#"
topic_base: lab/vacuum
device_name: maxigauge
client_id: maxigauge-bridge
mqtt_broker: broker.local
mqtt_port: 1884
logging:
  level: debug
"#;

        let config: Sample = parse_config(yaml).unwrap();

        assert_eq!(config.mqtt.client_id, "maxigauge-bridge");
        assert_eq!(config.mqtt.mqtt_broker, "broker.local");
        assert_eq!(config.mqtt.mqtt_port, 1884);
        assert_eq!(config.topics.topic_base, "lab/vacuum");
        assert_eq!(config.topics.device_name, "maxigauge");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_defaults() {
        let yaml = r#"
topic_base: lab
device_name: gauge
client_id: c
mqtt_broker: localhost
"#;

        let config: Sample = parse_config(yaml).unwrap();

        assert_eq!(config.mqtt.mqtt_port, 1883);
        assert_eq!(config.mqtt.keep_alive_secs, 30);
        assert!(!config.mqtt.clean_session);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Text);
        assert_eq!(config.presence_format, PresenceFormat::Plain);
    }

    #[test]
    fn test_json_formats() {
        let yaml = r#"
topic_base: lab
device_name: gauge
client_id: c
mqtt_broker: localhost
presence_format: json
logging:
  format: json
"#;

        let config: Sample = parse_config(yaml).unwrap();

        assert_eq!(config.presence_format, PresenceFormat::Json);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_missing_required_field() {
        let yaml = "topic_base: lab\n";
        let result: Result<Sample> = parse_config(yaml);
        assert!(matches!(result, Err(Error::Yaml(_))));
    }
}
