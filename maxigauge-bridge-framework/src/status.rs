//! Presence reporting on the device status topic.

use rumqttc::QoS;

use crate::Result;
use crate::publisher::{MessageSink, Publisher};
use crate::{Presence, PresenceFormat};

/// Publishes retained, at-least-once presence messages.
///
/// The broker-side last will carries the same "offline" payload, see
/// [`maxigauge_common::mqtt_options`].
pub struct StatusPublisher<S> {
    publisher: Publisher<S>,
    topic: String,
    format: PresenceFormat,
}

impl<S: MessageSink> StatusPublisher<S> {
    /// Create a new status publisher.
    pub fn new(publisher: Publisher<S>, topic: impl Into<String>, format: PresenceFormat) -> Self {
        Self {
            publisher,
            topic: topic.into(),
            format,
        }
    }

    /// Publish a presence state.
    pub async fn publish(&self, presence: Presence) -> Result<()> {
        tracing::debug!(topic = %self.topic, presence = presence.as_str(), "Publishing presence");
        self.publisher
            .publish_raw(
                &self.topic,
                presence.payload(self.format),
                QoS::AtLeastOnce,
                true,
            )
            .await
    }

    /// Publish "online" status.
    pub async fn publish_online(&self) -> Result<()> {
        self.publish(Presence::Online).await
    }

    /// Publish "offline" status.
    pub async fn publish_offline(&self) -> Result<()> {
        self.publish(Presence::Offline).await
    }
}
