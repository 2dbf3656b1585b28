//! Configuration traits and utilities.

use std::path::Path;
use std::time::Duration;

use maxigauge_common::parse_config;
use serde::de::DeserializeOwned;

use crate::error::{BridgeError, Result};
use crate::{LoggingConfig, MqttConfig, PresenceFormat, TopicConfig};

/// Longest accepted poll interval, in seconds (one week).
pub const MAX_INTERVAL_SECS: f64 = 7.0 * 24.0 * 3600.0;

/// Trait for bridge configuration types.
///
/// Implement this trait for your bridge's configuration struct to get
/// automatic loading, validation, and access to common config fields.
///
/// # Example
///
/// ```ignore
/// use serde::Deserialize;
/// use maxigauge_bridge_framework::{BridgeConfig, LoggingConfig, MqttConfig, TopicConfig};
///
/// #[derive(Debug, Deserialize)]
/// pub struct MyBridgeConfig {
///     #[serde(flatten)]
///     pub mqtt: MqttConfig,
///     #[serde(flatten)]
///     pub topics: TopicConfig,
///     #[serde(default)]
///     pub logging: LoggingConfig,
///     pub interval: f64,
/// }
///
/// impl BridgeConfig for MyBridgeConfig {
///     fn mqtt(&self) -> &MqttConfig { &self.mqtt }
///     fn topics(&self) -> &TopicConfig { &self.topics }
///     fn logging(&self) -> &LoggingConfig { &self.logging }
///     fn interval_secs(&self) -> f64 { self.interval }
/// }
/// ```
pub trait BridgeConfig: Sized + DeserializeOwned {
    /// Get the MQTT broker configuration.
    fn mqtt(&self) -> &MqttConfig;

    /// Get the topic namespace of the bridged device.
    fn topics(&self) -> &TopicConfig;

    /// Get the logging configuration.
    fn logging(&self) -> &LoggingConfig;

    /// Poll interval in seconds.
    fn interval_secs(&self) -> f64;

    /// Payload format of presence messages.
    fn presence_format(&self) -> PresenceFormat {
        PresenceFormat::default()
    }

    /// Poll interval as a duration.
    ///
    /// Only meaningful once [`validate`](Self::validate) has accepted the interval.
    fn poll_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.interval_secs().min(MAX_INTERVAL_SECS))
            .unwrap_or(Duration::from_secs(1))
    }

    /// Validate the fields shared by every bridge.
    ///
    /// Called automatically after loading, before [`validate`](Self::validate).
    fn validate_common(&self) -> Result<()> {
        let interval = self.interval_secs();
        if !interval.is_finite() || interval <= 0.0 || interval > MAX_INTERVAL_SECS {
            return Err(BridgeError::validation(format!(
                "interval must be a positive number of seconds up to {}, got {}",
                MAX_INTERVAL_SECS, interval
            )));
        }

        if self.topics().device_name.is_empty() {
            return Err(BridgeError::validation("device_name cannot be empty"));
        }

        if self.topics().device_name.contains(['/', '+', '#']) {
            return Err(BridgeError::validation(format!(
                "device_name '{}' must not contain '/', '+' or '#'",
                self.topics().device_name
            )));
        }

        if self.topics().topic_base.contains(['+', '#']) {
            return Err(BridgeError::validation(format!(
                "topic_base '{}' must not contain MQTT wildcards",
                self.topics().topic_base
            )));
        }

        if self.mqtt().client_id.trim().is_empty() {
            return Err(BridgeError::validation("client_id cannot be empty"));
        }

        if self.mqtt().mqtt_broker.is_empty() {
            return Err(BridgeError::validation("mqtt_broker cannot be empty"));
        }

        Ok(())
    }

    /// Validate the configuration.
    ///
    /// Override to add bridge-specific validation.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Load configuration from a file path.
    ///
    /// Supports YAML format. Calls [`validate`](Self::validate) after loading.
    fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(BridgeError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = parse_config(&content)?;

        config.validate_common()?;
        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;

    #[derive(Debug, Deserialize)]
    struct TestConfig {
        #[serde(flatten)]
        mqtt: MqttConfig,
        #[serde(flatten)]
        topics: TopicConfig,
        #[serde(default)]
        logging: LoggingConfig,
        interval: f64,
    }

    impl BridgeConfig for TestConfig {
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
    }

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    const VALID: &str = r#"
topic_base: lab
device_name: maxigauge
client_id: bridge
mqtt_broker: localhost
mqtt_port: 1883
interval: 2.5
"#;

    #[test]
    fn test_config_not_found() {
        let result = TestConfig::load("/nonexistent/path.yaml");
        assert!(matches!(result, Err(BridgeError::ConfigNotFound { .. })));
    }

    #[test]
    fn test_load_valid() {
        let file = write_config(VALID);
        let config = TestConfig::load(file.path()).unwrap();

        assert_eq!(config.topics.device_name, "maxigauge");
        assert_eq!(config.poll_interval(), Duration::from_millis(2500));
        assert_eq!(config.presence_format(), PresenceFormat::Plain);
    }

    #[test]
    fn test_load_parse_error() {
        let file = write_config("topic_base: [unterminated");
        let result = TestConfig::load(file.path());
        assert!(matches!(result, Err(BridgeError::ConfigParse(_))));
    }

    #[test]
    fn test_reject_bad_interval() {
        for interval in ["0", "-1", ".nan", ".inf", "1.0e+30", "604801"] {
            let file = write_config(&VALID.replace("2.5", interval));
            let result = TestConfig::load(file.path());
            assert!(
                matches!(result, Err(BridgeError::ConfigValidation(_))),
                "interval {interval}"
            );
        }
    }

    #[test]
    fn test_longest_interval() {
        let file = write_config(&VALID.replace("2.5", "604800"));
        let config = TestConfig::load(file.path()).unwrap();
        assert_eq!(config.poll_interval(), Duration::from_secs(604_800));
    }

    #[test]
    fn test_reject_wildcard_device() {
        let file = write_config(&VALID.replace("device_name: maxigauge", "device_name: gauge/#"));
        let result = TestConfig::load(file.path());
        assert!(matches!(result, Err(BridgeError::ConfigValidation(_))));
    }
}
