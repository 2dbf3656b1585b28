use std::time::Duration;

use rumqttc::{LastWill, MqttOptions, QoS};

use crate::config::{MqttConfig, PresenceFormat};
use crate::error::{Error, Result};
use crate::presence::Presence;

/// Build MQTT client options with an "offline" last will on `status_topic`.
///
/// The will is retained and delivered at-least-once, so subscribers see the
/// device go offline even when the bridge dies without a clean disconnect.
pub fn mqtt_options(
    config: &MqttConfig,
    status_topic: &str,
    presence_format: PresenceFormat,
) -> Result<MqttOptions> {
    if config.client_id.is_empty() || config.client_id.starts_with(char::is_whitespace) {
        return Err(Error::Config(format!(
            "Invalid MQTT client_id '{}'",
            config.client_id
        )));
    }
    if config.mqtt_broker.is_empty() {
        return Err(Error::Config("MQTT broker address cannot be empty".to_string()));
    }

    let mut options = MqttOptions::new(
        config.client_id.clone(),
        config.mqtt_broker.clone(),
        config.mqtt_port,
    );
    options.set_keep_alive(Duration::from_secs(config.keep_alive_secs));
    options.set_clean_session(config.clean_session);
    options.set_last_will(LastWill::new(
        status_topic,
        Presence::Offline.payload(presence_format),
        QoS::AtLeastOnce,
        true,
    ));

    tracing::info!(
        broker = %config.mqtt_broker,
        port = config.mqtt_port,
        client_id = %config.client_id,
        will_topic = %status_topic,
        "Configured MQTT client"
    );

    Ok(options)
}
