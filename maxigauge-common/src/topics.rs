use crate::config::TopicConfig;

/// Topic suffix for retained presence messages.
pub const STATUS_SUFFIX: &str = "status";

/// Topic suffix for reading cycles.
pub const READBACKS_SUFFIX: &str = "readbacks";

/// Builder for the MQTT topics of a bridged device.
///
/// Topics follow the pattern:
/// `<topic_base>/<device_name>/<suffix>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicBuilder {
    prefix: String,
}

impl TopicBuilder {
    /// Create a builder from a base path and device name.
    ///
    /// Leading and trailing slashes of the base path are ignored.
    pub fn new(topic_base: &str, device_name: &str) -> Self {
        let base = topic_base.trim_matches('/');
        let prefix = if base.is_empty() {
            device_name.to_string()
        } else {
            format!("{}/{}", base, device_name)
        };
        Self { prefix }
    }

    /// Create a builder from a topic configuration.
    pub fn from_config(config: &TopicConfig) -> Self {
        Self::new(&config.topic_base, &config.device_name)
    }

    /// The `<topic_base>/<device_name>` prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Build a topic for an arbitrary suffix.
    ///
    /// # Example
    /// ```
    /// use maxigauge_common::TopicBuilder;
    ///
    /// let topics = TopicBuilder::new("lab/vacuum", "maxigauge");
    /// assert_eq!(topics.build("custom"), "lab/vacuum/maxigauge/custom");
    /// ```
    pub fn build(&self, suffix: &str) -> String {
        format!("{}/{}", self.prefix, suffix)
    }

    /// Build the presence topic.
    ///
    /// # Example
    /// ```
    /// use maxigauge_common::TopicBuilder;
    ///
    /// let topics = TopicBuilder::new("lab", "maxigauge");
    /// assert_eq!(topics.status(), "lab/maxigauge/status");
    /// ```
    pub fn status(&self) -> String {
        self.build(STATUS_SUFFIX)
    }

    /// Build the readbacks topic.
    ///
    /// # Example
    /// ```
    /// use maxigauge_common::TopicBuilder;
    ///
    /// let topics = TopicBuilder::new("lab", "maxigauge");
    /// assert_eq!(topics.readbacks(), "lab/maxigauge/readbacks");
    /// ```
    pub fn readbacks(&self) -> String {
        self.build(READBACKS_SUFFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slashes_in_base() {
        let topics = TopicBuilder::new("/lab/vacuum/", "gauge1");
        assert_eq!(topics.status(), "lab/vacuum/gauge1/status");
    }

    #[test]
    fn test_empty_base() {
        let topics = TopicBuilder::new("", "gauge1");
        assert_eq!(topics.readbacks(), "gauge1/readbacks");
    }

    #[test]
    fn test_from_config() {
        let config = TopicConfig {
            topic_base: "site".to_string(),
            device_name: "mg".to_string(),
        };
        assert_eq!(TopicBuilder::from_config(&config).prefix(), "site/mg");
    }
}
