//! Message publishing to the broker.

use std::future::Future;
use std::sync::Arc;

use rumqttc::{AsyncClient, ClientError, QoS};
use serde::Serialize;

use crate::error::{BridgeError, Result};

/// The broker-facing half of a messaging client.
///
/// Implemented for [`rumqttc::AsyncClient`]; tests substitute recording sinks.
pub trait MessageSink: Send + Sync + 'static {
    /// Queue a message for delivery.
    fn publish(
        &self,
        topic: &str,
        payload: Vec<u8>,
        qos: QoS,
        retain: bool,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Request a clean disconnect from the broker.
    fn disconnect(&self) -> impl Future<Output = Result<()>> + Send;
}

/// Requests are queued without waiting. While the broker is unreachable the
/// event loop stops draining the request queue; once it is full, new
/// messages are dropped with a warning instead of blocking the poll loop.
impl MessageSink for AsyncClient {
    async fn publish(&self, topic: &str, payload: Vec<u8>, qos: QoS, retain: bool) -> Result<()> {
        match AsyncClient::try_publish(self, topic, qos, retain, payload) {
            Ok(()) => Ok(()),
            Err(ClientError::TryRequest(_)) => {
                tracing::warn!(topic = %topic, "MQTT request queue full, dropping message");
                Ok(())
            }
            Err(e) => Err(BridgeError::Publish {
                topic: topic.to_string(),
                message: e.to_string(),
            }),
        }
    }

    async fn disconnect(&self) -> Result<()> {
        match AsyncClient::try_disconnect(self) {
            Ok(()) => Ok(()),
            Err(ClientError::TryRequest(_)) => {
                tracing::debug!("MQTT request queue full, skipping disconnect request");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Publisher for sending bridge messages to MQTT.
///
/// Wraps a [`MessageSink`] and provides convenient methods for publishing
/// serializable values.
#[derive(Debug)]
pub struct Publisher<S> {
    sink: Arc<S>,
}

impl<S> Clone for Publisher<S> {
    fn clone(&self) -> Self {
        Self {
            sink: self.sink.clone(),
        }
    }
}

impl<S: MessageSink> Publisher<S> {
    /// Create a new publisher.
    pub fn new(sink: Arc<S>) -> Self {
        Self { sink }
    }

    /// Publish raw bytes to a topic.
    pub async fn publish_raw(
        &self,
        topic: &str,
        payload: Vec<u8>,
        qos: QoS,
        retain: bool,
    ) -> Result<()> {
        tracing::trace!(topic = %topic, bytes = payload.len(), retain, "Publishing");
        self.sink.publish(topic, payload, qos, retain).await
    }

    /// Publish a value as JSON, at-least-once and not retained.
    pub async fn publish_json<T: Serialize>(&self, topic: &str, value: &T) -> Result<()> {
        let payload = serde_json::to_vec(value)?;
        self.publish_raw(topic, payload, QoS::AtLeastOnce, false)
            .await
    }

    /// Request a clean disconnect from the broker.
    pub async fn disconnect(&self) -> Result<()> {
        self.sink.disconnect().await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// A message captured by [`RecordingSink`].
    #[derive(Debug, Clone, PartialEq)]
    pub struct Recorded {
        pub topic: String,
        pub payload: Vec<u8>,
        pub qos: QoS,
        pub retain: bool,
    }

    /// Sink that records every call, in order.
    #[derive(Debug, Default)]
    pub struct RecordingSink {
        pub messages: Mutex<Vec<Recorded>>,
        pub events: Mutex<Vec<String>>,
        pub fail_publish: bool,
    }

    impl RecordingSink {
        pub fn messages(&self) -> Vec<Recorded> {
            self.messages.lock().unwrap().clone()
        }

        pub fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }

        pub fn record_event(&self, event: impl Into<String>) {
            self.events.lock().unwrap().push(event.into());
        }
    }

    impl MessageSink for RecordingSink {
        async fn publish(
            &self,
            topic: &str,
            payload: Vec<u8>,
            qos: QoS,
            retain: bool,
        ) -> Result<()> {
            self.record_event(format!(
                "publish {} {}",
                topic,
                String::from_utf8_lossy(&payload)
            ));
            if self.fail_publish {
                return Err(BridgeError::Publish {
                    topic: topic.to_string(),
                    message: "broker unavailable".to_string(),
                });
            }
            self.messages.lock().unwrap().push(Recorded {
                topic: topic.to_string(),
                payload,
                qos,
                retain,
            });
            Ok(())
        }

        async fn disconnect(&self) -> Result<()> {
            self.record_event("disconnect");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingSink;
    use super::*;

    #[tokio::test]
    async fn test_publish_json_not_retained() {
        let sink = Arc::new(RecordingSink::default());
        let publisher = Publisher::new(sink.clone());

        publisher
            .publish_json("lab/mg/readbacks", &serde_json::json!({ "units": "mbar" }))
            .await
            .unwrap();

        let messages = sink.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].topic, "lab/mg/readbacks");
        assert_eq!(messages[0].payload, br#"{"units":"mbar"}"#.to_vec());
        assert_eq!(messages[0].qos, QoS::AtLeastOnce);
        assert!(!messages[0].retain);
    }

    #[tokio::test]
    async fn test_publish_error_carries_topic() {
        let sink = Arc::new(RecordingSink {
            fail_publish: true,
            ..Default::default()
        });
        let publisher = Publisher::new(sink);

        let err = publisher
            .publish_raw("a/b", b"x".to_vec(), QoS::AtMostOnce, false)
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Publish { ref topic, .. } if topic == "a/b"));
    }
}
