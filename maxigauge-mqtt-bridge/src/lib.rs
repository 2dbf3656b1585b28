//! MQTT bridge for Pfeiffer MaxiGauge vacuum gauge controllers.
//!
//! This bridge polls a MaxiGauge over TCP or a serial line and publishes
//! one readback per poll cycle to an MQTT broker.
//!
//! # Topics
//!
//! ```text
//! <topic_base>/<device_name>/status      online | offline (retained, also the last will)
//! <topic_base>/<device_name>/readbacks   {"timestamp": .., "units": .., "sensors": [..]}
//! ```
//!
//! Each sensor entry carries `name`, `status` and `value` (`null` when the
//! controller sent no number).

pub mod config;
pub mod driver;
pub mod poller;
pub mod transport;

pub use config::MaxiGaugeBridgeConfig;
pub use driver::{DriverError, MaxiGauge, PressureReply, parse_prx_response};
pub use poller::MaxiGaugePoller;
pub use transport::{InstrumentAddress, Transport, TransportError};
