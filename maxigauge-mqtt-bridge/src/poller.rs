//! MaxiGauge polling and readback publishing.

use maxigauge_bridge_framework::{
    BridgeError, CycleOutcome, MessageSink, Publisher, Result, TopicBuilder, Worker,
};
use maxigauge_common::{Readback, current_timestamp_secs};
use tracing::{debug, info, warn};

use crate::config::MaxiGaugeBridgeConfig;
use crate::driver::{DriverError, MaxiGauge};
use crate::transport::Transport;

/// Polls one controller and publishes a readback per cycle.
///
/// Each cycle reads units, channel names and pressures, in that order.
/// A rejected units or pressure read skips the cycle; rejected channel
/// names fall back to `CH1`..`CHn`. Transport failures end the bridge.
pub struct MaxiGaugePoller<T> {
    driver: MaxiGauge<T>,
    cycles: u64,
}

impl MaxiGaugePoller<Box<dyn Transport>> {
    /// Connect to the controller named in `config`.
    pub async fn open(config: &MaxiGaugeBridgeConfig) -> Result<Self> {
        let address = config.instrument_address()?;
        info!(address = %address, "Connecting to MaxiGauge");

        let transport = address
            .open(config.baud_rate, config.connect_timeout())
            .await
            .map_err(|e| BridgeError::with_context(format!("Failed to open {}", address), e))?;

        Ok(Self::new(MaxiGauge::new(transport)))
    }
}

impl<T: Transport> MaxiGaugePoller<T> {
    /// Create a poller over a driver.
    pub fn new(driver: MaxiGauge<T>) -> Self {
        Self { driver, cycles: 0 }
    }

    /// Read the controller once. `None` means a read was rejected.
    pub async fn read_readback(&mut self) -> Result<Option<Readback>> {
        let Some(units) = self.driver.read_units().await.map_err(fatal("UNI"))? else {
            warn!("MaxiGauge rejected units request, skipping cycle");
            return Ok(None);
        };

        let names = match self
            .driver
            .read_channel_names()
            .await
            .map_err(fatal("CID"))?
        {
            Some(names) => names,
            None => {
                debug!("MaxiGauge rejected channel name request, using defaults");
                Vec::new()
            }
        };

        let Some(pressures) = self.driver.read_pressures().await.map_err(fatal("PRX"))? else {
            warn!("MaxiGauge rejected pressure request, skipping cycle");
            return Ok(None);
        };

        Ok(Some(Readback::new(
            current_timestamp_secs(),
            units,
            &pressures.readings(),
            &names,
        )))
    }
}

fn fatal(mnemonic: &'static str) -> impl FnOnce(DriverError) -> BridgeError {
    move |e| BridgeError::with_context(format!("MaxiGauge {} request failed", mnemonic), e)
}

impl<T: Transport, S: MessageSink> Worker<S> for MaxiGaugePoller<T> {
    async fn poll_once(
        &mut self,
        publisher: &Publisher<S>,
        topics: &TopicBuilder,
    ) -> Result<CycleOutcome> {
        self.cycles += 1;

        let Some(readback) = self.read_readback().await? else {
            return Ok(CycleOutcome::Skipped);
        };

        publisher.publish_json(&topics.readbacks(), &readback).await?;

        debug!(
            cycle = self.cycles,
            units = readback.units.label(),
            channels = readback.sensors.len(),
            "Published readback"
        );

        Ok(CycleOutcome::Published {
            channels: readback.sensors.len(),
        })
    }

    async fn close(&mut self) {
        self.driver.close().await;
    }
}
