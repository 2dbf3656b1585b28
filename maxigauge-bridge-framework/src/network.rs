//! Background MQTT network handling.

use std::time::Duration;

use rumqttc::{Event, EventLoop, Outgoing, Packet};
use tokio::task::JoinHandle;

/// Delay before polling the event loop again after a connection error.
///
/// The event loop reconnects on the next poll.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Drives a [`rumqttc::EventLoop`] on its own task.
///
/// Handles connects, reconnects, keepalives and acknowledgements while the
/// poll loop runs. The task ends once the client's disconnect request has
/// been written to the broker.
#[derive(Debug)]
pub struct NetworkTask {
    handle: JoinHandle<()>,
}

impl NetworkTask {
    /// Start driving `eventloop`.
    pub fn spawn(mut eventloop: EventLoop) -> Self {
        let handle = tokio::spawn(async move {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                        tracing::info!(
                            code = ?ack.code,
                            session_present = ack.session_present,
                            "Connected to MQTT broker"
                        );
                    }
                    Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                        tracing::debug!("Disconnect sent to MQTT broker");
                        break;
                    }
                    Ok(event) => {
                        tracing::trace!(?event, "MQTT event");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "MQTT connection error, reconnecting");
                        tokio::time::sleep(RECONNECT_DELAY).await;
                    }
                }
            }
        });

        Self { handle }
    }

    /// Whether the task has ended.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait up to `grace` for the task to end on its own, then abort it.
    pub async fn stop(mut self, grace: Duration) {
        match tokio::time::timeout(grace, &mut self.handle).await {
            Ok(Ok(())) => tracing::debug!("MQTT network task finished"),
            Ok(Err(e)) => tracing::debug!(error = %e, "MQTT network task ended abnormally"),
            Err(_) => {
                tracing::debug!("MQTT network task did not finish in time, aborting");
                self.handle.abort();
            }
        }
    }
}
