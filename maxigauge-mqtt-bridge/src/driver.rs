//! Pfeiffer MaxiGauge controller driver.
//!
//! Protocol Overview:
//! - Host sends an ASCII mnemonic terminated by CR (`\r`)
//! - Controller answers one line, ACK (`0x06`) or NAK (`0x15`), terminated by CR LF
//! - After an ACK the host sends a bare ENQ byte (`0x05`) and the controller
//!   transmits the requested data as one CR LF terminated line
//!
//! # Mnemonics used
//!
//! | Mnemonic | Reply |
//! |---|---|
//! | `PRX` | `status,pressure,status,pressure,...`, one pair per channel |
//! | `UNI` | single units digit |
//! | `CID` | comma-separated channel identifiers |
//!
//! A NAK degrades the read to `None`; only transport problems are errors.
//! There is no timeout on replies: a controller that never answers stalls
//! the caller.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use maxigauge_common::{ChannelStatus, GaugeReading, Units};

use crate::transport::Transport;

/// Command accepted.
pub const ACK: &str = "\x06";
/// Command rejected.
pub const NAK: &str = "\x15";
/// Enquiry: request the data of the last accepted command.
pub const ENQ: u8 = 0x05;

const WRITE_TERMINATOR: &str = "\r";

/// Error type for driver operations.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Connection to MaxiGauge is closed")]
    Closed,
    #[error("Connection closed by instrument")]
    ConnectionLost,
    #[error("Malformed reply: {0:?}")]
    MalformedReply(Vec<u8>),
}

/// Parsed `PRX` reply, one entry per channel in reply order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PressureReply {
    /// Raw status codes.
    pub statuses: Vec<String>,
    /// Pressures; NaN where the field was not a number.
    pub pressures: Vec<f64>,
}

impl PressureReply {
    /// Number of channels in the reply.
    pub fn channel_count(&self) -> usize {
        self.statuses.len()
    }

    /// Decode into typed readings.
    pub fn readings(&self) -> Vec<GaugeReading> {
        self.statuses
            .iter()
            .zip(&self.pressures)
            .enumerate()
            .map(|(channel, (status, pressure))| GaugeReading {
                channel,
                status: ChannelStatus::from_code(status),
                pressure: *pressure,
            })
            .collect()
    }
}

/// Parse a `PRX` reply: `status1,pressure1,status2,pressure2,...`
///
/// A pressure that does not parse becomes NaN; a trailing status without a
/// pressure field gets NaN as well. An empty reply has no channels.
pub fn parse_prx_response(response: &str) -> PressureReply {
    let response = response.trim();
    tracing::debug!(response = %response, "Parsing PRX response");

    let mut reply = PressureReply::default();
    if response.is_empty() {
        return reply;
    }

    let fields: Vec<&str> = response.split(',').collect();
    for pair in fields.chunks(2) {
        reply.statuses.push(pair[0].trim().to_string());
        reply.pressures.push(
            pair.get(1)
                .and_then(|field| field.trim().parse::<f64>().ok())
                .unwrap_or(f64::NAN),
        );
    }

    reply
}

/// Parse a `CID` reply into channel identifiers.
pub fn parse_cid_response(response: &str) -> Vec<String> {
    let response = response.trim();
    if response.is_empty() {
        return Vec::new();
    }
    response
        .split(',')
        .map(|name| name.trim().to_string())
        .collect()
}

/// Driver for a MaxiGauge controller over any byte stream.
///
/// Owns the transport exclusively. Call [`close`](Self::close) to release
/// it; after that every operation fails with [`DriverError::Closed`].
pub struct MaxiGauge<T> {
    stream: Option<BufReader<T>>,
}

impl<T: Transport> MaxiGauge<T> {
    /// Wrap an open transport.
    pub fn new(transport: T) -> Self {
        Self {
            stream: Some(BufReader::new(transport)),
        }
    }

    /// Whether the transport is still held.
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Send a mnemonic and wait for the acknowledgement.
    ///
    /// Returns `true` only when the reply is exactly ACK. No retry.
    pub async fn send_command(&mut self, mnemonic: &str) -> Result<bool, DriverError> {
        tracing::debug!(mnemonic, "Sending command");
        self.write(format!("{}{}", mnemonic, WRITE_TERMINATOR).as_bytes())
            .await?;

        let response = self.read_line().await?;
        if response == ACK {
            tracing::debug!(mnemonic, "Received ACK");
            Ok(true)
        } else {
            tracing::debug!(
                mnemonic,
                nak = response == NAK,
                response = %response.escape_default(),
                "ACK not received"
            );
            Ok(false)
        }
    }

    /// Request the data of the last acknowledged command with ENQ.
    pub async fn request_data(&mut self) -> Result<String, DriverError> {
        self.write(&[ENQ]).await?;
        let response = self.read_line().await?;
        tracing::debug!(response = %response.escape_default(), "Received data");
        Ok(response)
    }

    /// Read the pressures of all channels.
    ///
    /// `None` if the controller rejected `PRX`.
    pub async fn read_pressures(&mut self) -> Result<Option<PressureReply>, DriverError> {
        if !self.send_command("PRX").await? {
            return Ok(None);
        }
        let response = self.request_data().await?;
        Ok(Some(parse_prx_response(&response)))
    }

    /// Read the pressure unit.
    ///
    /// `None` if the controller rejected `UNI`.
    pub async fn read_units(&mut self) -> Result<Option<Units>, DriverError> {
        if !self.send_command("UNI").await? {
            return Ok(None);
        }
        let response = self.request_data().await?;
        tracing::debug!(response = %response.trim(), "Decoding units");
        Ok(Some(Units::from_code(&response)))
    }

    /// Read the channel identifiers.
    ///
    /// `None` if the controller rejected `CID`.
    pub async fn read_channel_names(&mut self) -> Result<Option<Vec<String>>, DriverError> {
        if !self.send_command("CID").await? {
            return Ok(None);
        }
        let response = self.request_data().await?;
        Ok(Some(parse_cid_response(&response)))
    }

    /// Release the transport. Idempotent; shutdown errors are ignored.
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.get_mut().shutdown().await {
                tracing::debug!(error = %e, "Ignoring error while closing MaxiGauge connection");
            }
            tracing::debug!("MaxiGauge connection closed");
        }
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<(), DriverError> {
        let stream = self.stream.as_mut().ok_or(DriverError::Closed)?;
        let writer = stream.get_mut();
        writer.write_all(bytes).await?;
        writer.flush().await?;
        Ok(())
    }

    /// Read one CR LF terminated line, without the terminator.
    async fn read_line(&mut self) -> Result<String, DriverError> {
        let stream = self.stream.as_mut().ok_or(DriverError::Closed)?;

        let mut buf = Vec::new();
        stream.read_until(b'\n', &mut buf).await?;
        if buf.last() != Some(&b'\n') {
            return Err(DriverError::ConnectionLost);
        }

        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }

        String::from_utf8(buf).map_err(|e| DriverError::MalformedReply(e.into_bytes()))
    }
}
