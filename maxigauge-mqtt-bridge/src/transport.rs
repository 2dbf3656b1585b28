//! Byte-stream transports to the controller.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

/// Error type for opening a transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Invalid instrument address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },
    #[error("TCP connect to {address} failed: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Serial open of {path} failed: {source}")]
    Serial {
        path: String,
        #[source]
        source: tokio_serial::Error,
    },
    #[error("TCP connect to {address} timed out")]
    Timeout { address: String },
}

/// Any bidirectional byte stream the driver can talk through.
pub trait Transport: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> Transport for T {}

/// Where the controller is reachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstrumentAddress {
    /// Raw TCP socket, e.g. behind a serial-to-Ethernet converter.
    Tcp { host: String, port: u16 },
    /// Local serial line.
    Serial { path: String },
}

impl InstrumentAddress {
    /// Open a connection to the controller.
    ///
    /// `timeout` bounds the TCP connect only; serial lines open immediately.
    pub async fn open(
        &self,
        baud_rate: u32,
        timeout: Duration,
    ) -> Result<Box<dyn Transport>, TransportError> {
        match self {
            InstrumentAddress::Tcp { host, port } => {
                let address = format!("{}:{}", host, port);
                let stream = tokio::time::timeout(timeout, TcpStream::connect(&address))
                    .await
                    .map_err(|_| TransportError::Timeout {
                        address: address.clone(),
                    })?
                    .map_err(|source| TransportError::Connect {
                        address: address.clone(),
                        source,
                    })?;

                if let Err(e) = stream.set_nodelay(true) {
                    tracing::debug!(error = %e, "Failed to set TCP_NODELAY");
                }

                tracing::info!(address = %address, "Connected to MaxiGauge over TCP");
                Ok(Box::new(stream))
            }
            InstrumentAddress::Serial { path } => {
                let builder = tokio_serial::new(path, baud_rate)
                    .data_bits(tokio_serial::DataBits::Eight)
                    .parity(tokio_serial::Parity::None)
                    .stop_bits(tokio_serial::StopBits::One)
                    .flow_control(tokio_serial::FlowControl::None);

                let serial = tokio_serial::SerialStream::open(&builder).map_err(|source| {
                    TransportError::Serial {
                        path: path.clone(),
                        source,
                    }
                })?;

                tracing::info!(path = %path, baud_rate, "Opened MaxiGauge serial line");
                Ok(Box::new(serial))
            }
        }
    }
}

impl fmt::Display for InstrumentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstrumentAddress::Tcp { host, port } => write!(f, "tcp://{}:{}", host, port),
            InstrumentAddress::Serial { path } => write!(f, "serial://{}", path),
        }
    }
}

impl FromStr for InstrumentAddress {
    type Err = TransportError;

    /// Accepted forms:
    ///
    /// - `TCPIP::<host>::<port>::SOCKET` (also `TCPIP0::...`)
    /// - `ASRL<path>::INSTR`, where a bare number `n` means `COM<n>`
    /// - `tcp://<host>:<port>` or `<host>:<port>`
    /// - `serial://<path>`, or a path starting with `/` or `COM`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| TransportError::InvalidAddress {
            address: s.to_string(),
            reason: reason.to_string(),
        };

        let address = s.trim();
        if address.is_empty() {
            return Err(invalid("empty address"));
        }

        if address.contains("::") && !address.starts_with('[') {
            return parse_visa(address).ok_or_else(|| invalid("unsupported VISA resource"));
        }

        if let Some(path) = address.strip_prefix("serial://") {
            if path.is_empty() {
                return Err(invalid("missing serial device"));
            }
            return Ok(InstrumentAddress::Serial {
                path: path.to_string(),
            });
        }

        if address.starts_with('/') || is_com_port(address) {
            return Ok(InstrumentAddress::Serial {
                path: address.to_string(),
            });
        }

        let host_port = address.strip_prefix("tcp://").unwrap_or(address);
        let (host, port) = host_port
            .rsplit_once(':')
            .ok_or_else(|| invalid("expected <host>:<port>"))?;
        if host.is_empty() {
            return Err(invalid("missing host"));
        }
        let port = port.parse().map_err(|_| invalid("invalid port"))?;

        Ok(InstrumentAddress::Tcp {
            host: host.to_string(),
            port,
        })
    }
}

fn is_com_port(address: &str) -> bool {
    match address.get(..3) {
        Some(prefix) if prefix.eq_ignore_ascii_case("COM") => {
            address.len() > 3 && address[3..].chars().all(|c| c.is_ascii_digit())
        }
        _ => false,
    }
}

fn parse_visa(resource: &str) -> Option<InstrumentAddress> {
    let parts: Vec<&str> = resource.split("::").collect();
    let interface = parts.first()?.to_ascii_uppercase();

    if let Some(board) = interface.strip_prefix("TCPIP") {
        if !board.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        return match parts.as_slice() {
            [_, host, port, kind] if kind.eq_ignore_ascii_case("SOCKET") && !host.is_empty() => {
                Some(InstrumentAddress::Tcp {
                    host: host.to_string(),
                    port: port.parse().ok()?,
                })
            }
            _ => None,
        };
    }

    if interface.starts_with("ASRL") {
        return match parts.as_slice() {
            [head, kind] if kind.eq_ignore_ascii_case("INSTR") => {
                let path = &head[4..];
                if path.is_empty() {
                    None
                } else if path.chars().all(|c| c.is_ascii_digit()) {
                    Some(InstrumentAddress::Serial {
                        path: format!("COM{}", path),
                    })
                } else {
                    Some(InstrumentAddress::Serial {
                        path: path.to_string(),
                    })
                }
            }
            _ => None,
        };
    }

    None
}
