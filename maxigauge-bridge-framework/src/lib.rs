//! MaxiGauge Bridge Framework
//!
//! Common abstractions for building polling bridges that publish to MQTT.
//!
//! # Overview
//!
//! This framework provides:
//! - [`BridgeConfig`] trait for configuration loading and validation
//! - [`BridgeRunner`] for managing bridge lifecycle (presence, poll loop, ordered shutdown)
//! - [`Worker`] trait for the protocol-specific poll step
//! - [`Publisher`] over a [`MessageSink`] for publishing serializable payloads
//! - [`StopHandle`] / [`StopSignal`] for cooperative, interruptible stopping
//! - [`BridgeArgs`] for common CLI argument parsing
//!
//! # Example
//!
//! ```ignore
//! use maxigauge_bridge_framework::{BridgeArgs, BridgeConfig, BridgeRunner, stop_on_signal};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = BridgeArgs::parse();
//!     let config = MyBridgeConfig::load(&args.config)?;
//!
//!     let runner = BridgeRunner::connect("mybridge", &config)?;
//!     stop_on_signal(runner.stop_handle());
//!
//!     // Poll until Ctrl+C
//!     runner.run(my_worker).await?;
//!     Ok(())
//! }
//! ```

mod args;
mod config;
mod error;
mod network;
mod publisher;
mod runner;
mod shutdown;
mod status;

pub use args::{BridgeArgs, DEFAULT_CONFIG};
pub use config::{BridgeConfig, MAX_INTERVAL_SECS};
pub use error::{BridgeError, Result};
pub use network::NetworkTask;
pub use publisher::{MessageSink, Publisher};
pub use runner::{BridgeRunner, CLEANUP_TIMEOUT, CycleOutcome, Worker};
pub use shutdown::{StopHandle, StopSignal, stop_on_signal};
pub use status::StatusPublisher;

// Re-export commonly used types from maxigauge-common
pub use maxigauge_common::{
    LogFormat, LoggingConfig, MqttConfig, Presence, PresenceFormat, TopicBuilder, TopicConfig,
    init_tracing,
};

// Re-export the MQTT types that appear in the public API
pub use rumqttc::{AsyncClient, QoS};
