//! Bridge runner for lifecycle management.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rumqttc::AsyncClient;

use maxigauge_common::{TopicBuilder, mqtt_options};

use crate::config::BridgeConfig;
use crate::error::Result;
use crate::network::NetworkTask;
use crate::publisher::{MessageSink, Publisher};
use crate::shutdown::StopHandle;
use crate::status::StatusPublisher;
use crate::PresenceFormat;

/// Capacity of the MQTT client's request queue.
pub const REQUEST_QUEUE_CAPACITY: usize = 16;

/// Upper bound for each cleanup step during shutdown.
pub const CLEANUP_TIMEOUT: Duration = Duration::from_secs(5);

/// What a single poll cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A complete cycle with this many channels was published.
    Published { channels: usize },
    /// Nothing was published this cycle.
    Skipped,
}

/// Protocol-specific part of a bridge, driven by [`BridgeRunner::run`].
pub trait Worker<S: MessageSink> {
    /// Read the instrument once and publish the result.
    ///
    /// An error is fatal to the bridge: the runner shuts down and returns it.
    fn poll_once(
        &mut self,
        publisher: &Publisher<S>,
        topics: &TopicBuilder,
    ) -> impl Future<Output = Result<CycleOutcome>>;

    /// Release the instrument connection. Must be idempotent and must not fail.
    fn close(&mut self) -> impl Future<Output = ()>;
}

/// Bridge runner that manages the lifecycle of a polling bridge.
///
/// Handles:
/// - MQTT client creation with an "offline" last will
/// - Background network task
/// - Presence publishing ("online" on start, "offline" on shutdown)
/// - The interruptible poll loop
/// - Ordered cleanup on stop or error
///
/// # Example
///
/// ```ignore
/// use maxigauge_bridge_framework::{BridgeArgs, BridgeConfig, BridgeRunner, stop_on_signal};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let args = BridgeArgs::parse();
///     let config = MyBridgeConfig::load(&args.config)?;
///
///     let runner = BridgeRunner::connect("mybridge", &config)?;
///     stop_on_signal(runner.stop_handle());
///
///     runner.run(MyWorker::open(&config).await?).await?;
///     Ok(())
/// }
/// ```
pub struct BridgeRunner<S: MessageSink> {
    /// Bridge name for logging.
    name: String,
    /// Bridge version.
    version: String,
    /// Topics of the bridged device.
    topics: TopicBuilder,
    /// Publisher for readings.
    publisher: Publisher<S>,
    /// Presence publisher.
    status: StatusPublisher<S>,
    /// Time between poll cycles.
    interval: Duration,
    /// Stop request, settable from outside the loop.
    stop: StopHandle,
    /// MQTT network task, absent when the sink has no event loop.
    network: Option<NetworkTask>,
}

impl BridgeRunner<AsyncClient> {
    /// Create an MQTT client for `config` and start its network task.
    ///
    /// The broker registers the "offline" last will when the connection is
    /// established by the network task.
    pub fn connect<C: BridgeConfig>(name: impl Into<String>, config: &C) -> Result<Self> {
        let topics = TopicBuilder::from_config(config.topics());
        let options = mqtt_options(config.mqtt(), &topics.status(), config.presence_format())?;

        let (client, eventloop) = AsyncClient::new(options, REQUEST_QUEUE_CAPACITY);
        let network = NetworkTask::spawn(eventloop);

        let mut runner = Self::new(
            name,
            Arc::new(client),
            topics,
            config.presence_format(),
            config.poll_interval(),
        );
        runner.network = Some(network);
        Ok(runner)
    }
}

impl<S: MessageSink> BridgeRunner<S> {
    /// Create a runner over an existing sink.
    pub fn new(
        name: impl Into<String>,
        sink: Arc<S>,
        topics: TopicBuilder,
        presence_format: PresenceFormat,
        interval: Duration,
    ) -> Self {
        let publisher = Publisher::new(sink);
        let status = StatusPublisher::new(publisher.clone(), topics.status(), presence_format);

        Self {
            name: name.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            topics,
            publisher,
            status,
            interval,
            stop: StopHandle::new(),
            network: None,
        }
    }

    /// Get a handle that stops [`run`](Self::run) from any task or thread.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Run the bridge until stopped or until the worker fails.
    ///
    /// This will:
    /// 1. Publish "online" presence
    /// 2. Poll the worker every interval, waiting interruptibly in between
    /// 3. Publish "offline" presence
    /// 4. Close the worker
    /// 5. Disconnect from the broker and stop the network task
    ///
    /// Steps 3–5 run whether the loop ended by a stop request or by an
    /// error; their own failures are logged and never replace the error
    /// returned from the loop.
    pub async fn run<W: Worker<S>>(mut self, mut worker: W) -> Result<()> {
        tracing::info!(
            bridge = %self.name,
            version = %self.version,
            topics = %self.topics.prefix(),
            interval_secs = self.interval.as_secs_f64(),
            "Starting bridge"
        );

        let result = self.poll_loop(&mut worker).await;

        match &result {
            Ok(()) => tracing::info!(bridge = %self.name, "Bridge stopping"),
            Err(e) => tracing::error!(bridge = %self.name, error = %e, "Error in poll loop"),
        }

        self.shutdown(&mut worker).await;

        result
    }

    async fn poll_loop<W: Worker<S>>(&self, worker: &mut W) -> Result<()> {
        let mut stop = self.stop.signal();

        self.status.publish_online().await?;

        while !stop.is_stopped() {
            match worker.poll_once(&self.publisher, &self.topics).await? {
                CycleOutcome::Published { channels } => {
                    tracing::debug!(channels, "Published readback");
                }
                CycleOutcome::Skipped => {
                    tracing::debug!("Cycle skipped");
                }
            }

            if stop.wait(self.interval).await {
                break;
            }
        }

        Ok(())
    }

    async fn shutdown<W: Worker<S>>(&mut self, worker: &mut W) {
        match tokio::time::timeout(CLEANUP_TIMEOUT, self.status.publish_offline()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "Failed to publish offline status"),
            Err(_) => tracing::warn!("Timed out publishing offline status"),
        }

        if tokio::time::timeout(CLEANUP_TIMEOUT, worker.close())
            .await
            .is_err()
        {
            tracing::warn!("Timed out closing instrument connection");
        }

        match tokio::time::timeout(CLEANUP_TIMEOUT, self.publisher.disconnect()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::debug!(error = %e, "Error disconnecting from broker"),
            Err(_) => tracing::debug!("Timed out disconnecting from broker"),
        }

        if let Some(network) = self.network.take() {
            network.stop(CLEANUP_TIMEOUT).await;
        }

        tracing::info!(bridge = %self.name, "Goodbye!");
    }
}
