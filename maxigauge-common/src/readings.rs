//! Gauge reading data model.
//!
//! Status and units codes come off the wire as single ASCII digits and are
//! decoded through fixed lookup tables indexed by the digit.

use serde::{Serialize, Serializer};

/// Status of a single gauge channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelStatus {
    Ok,
    Underrange,
    Overrange,
    SensorError,
    SensorOff,
    NoSensor,
    IdentificationError,
    Unknown,
}

const STATUS_TABLE: [ChannelStatus; 7] = [
    ChannelStatus::Ok,
    ChannelStatus::Underrange,
    ChannelStatus::Overrange,
    ChannelStatus::SensorError,
    ChannelStatus::SensorOff,
    ChannelStatus::NoSensor,
    ChannelStatus::IdentificationError,
];

impl ChannelStatus {
    /// Decode a status code as sent by the controller.
    pub fn from_code(code: &str) -> Self {
        lookup(&STATUS_TABLE, code).unwrap_or(ChannelStatus::Unknown)
    }

    /// Human-readable label used in published payloads.
    pub fn label(&self) -> &'static str {
        match self {
            ChannelStatus::Ok => "OK",
            ChannelStatus::Underrange => "Underrange",
            ChannelStatus::Overrange => "Overrange",
            ChannelStatus::SensorError => "Sensor Error",
            ChannelStatus::SensorOff => "Sensor Off",
            ChannelStatus::NoSensor => "No Sensor",
            ChannelStatus::IdentificationError => "Identification Error",
            ChannelStatus::Unknown => "Unknown Status",
        }
    }
}

impl Serialize for ChannelStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Pressure unit reported by the controller for all channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Units {
    Mbar,
    Torr,
    Pascal,
    Micron,
    HectoPascal,
    Volt,
    Unknown,
}

const UNITS_TABLE: [Units; 6] = [
    Units::Mbar,
    Units::Torr,
    Units::Pascal,
    Units::Micron,
    Units::HectoPascal,
    Units::Volt,
];

impl Units {
    /// Decode a units code as sent by the controller.
    pub fn from_code(code: &str) -> Self {
        lookup(&UNITS_TABLE, code).unwrap_or(Units::Unknown)
    }

    /// Label used in published payloads.
    pub fn label(&self) -> &'static str {
        match self {
            Units::Mbar => "mbar",
            Units::Torr => "Torr",
            Units::Pascal => "Pa",
            Units::Micron => "Micron",
            Units::HectoPascal => "hPascal",
            Units::Volt => "Volt",
            Units::Unknown => "Unknown Units",
        }
    }
}

impl Serialize for Units {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Only a single ASCII digit is a valid code; `"01"` or `"+1"` are not.
fn lookup<T: Copy>(table: &[T], code: &str) -> Option<T> {
    match code.trim().as_bytes() {
        [digit @ b'0'..=b'9'] => table.get(usize::from(digit - b'0')).copied(),
        _ => None,
    }
}

/// Decode a channel status code into its label.
///
/// # Example
/// ```
/// use maxigauge_common::decode_channel_status;
///
/// assert_eq!(decode_channel_status("3"), "Sensor Error");
/// assert_eq!(decode_channel_status("9"), "Unknown Status");
/// ```
pub fn decode_channel_status(code: &str) -> &'static str {
    ChannelStatus::from_code(code).label()
}

/// Decode a units code into its label.
///
/// # Example
/// ```
/// use maxigauge_common::decode_units;
///
/// assert_eq!(decode_units("1"), "Torr");
/// assert_eq!(decode_units("x"), "Unknown Units");
/// ```
pub fn decode_units(code: &str) -> &'static str {
    Units::from_code(code).label()
}

/// One channel of a pressure snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaugeReading {
    /// Zero-based channel index, in reply order.
    pub channel: usize,
    pub status: ChannelStatus,
    /// Pressure in the cycle's units; NaN when the controller sent no number.
    pub pressure: f64,
}

/// A sensor entry of a published readback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorReadback {
    pub name: String,
    pub status: ChannelStatus,
    /// Serialized as `null` when NaN.
    pub value: f64,
}

/// Payload published on the readbacks topic once per poll cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Readback {
    /// Wall-clock seconds since the Unix epoch.
    pub timestamp: f64,
    pub units: Units,
    pub sensors: Vec<SensorReadback>,
}

impl Readback {
    /// Assemble a readback from a complete snapshot.
    ///
    /// `names` are matched to readings by channel index; channels without a
    /// name are called `CH<n>` (1-based).
    pub fn new(timestamp: f64, units: Units, readings: &[GaugeReading], names: &[String]) -> Self {
        let sensors = readings
            .iter()
            .map(|reading| SensorReadback {
                name: names
                    .get(reading.channel)
                    .filter(|name| !name.is_empty())
                    .cloned()
                    .unwrap_or_else(|| default_channel_name(reading.channel)),
                status: reading.status,
                value: reading.pressure,
            })
            .collect();

        Self {
            timestamp,
            units,
            sensors,
        }
    }
}

/// Fallback name of a channel without an identifier.
pub fn default_channel_name(channel: usize) -> String {
    format!("CH{}", channel + 1)
}

/// Get the current time as fractional Unix epoch seconds.
pub fn current_timestamp_secs() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_table() {
        let expected = [
            ("0", "OK"),
            ("1", "Underrange"),
            ("2", "Overrange"),
            ("3", "Sensor Error"),
            ("4", "Sensor Off"),
            ("5", "No Sensor"),
            ("6", "Identification Error"),
        ];
        for (code, label) in expected {
            assert_eq!(decode_channel_status(code), label);
        }
    }

    #[test]
    fn test_unknown_status() {
        for code in ["7", "10", "-1", "", "OK", "0x1", "01", "+1", "+5", "00"] {
            assert_eq!(decode_channel_status(code), "Unknown Status", "code {code:?}");
        }
    }

    #[test]
    fn test_units_table() {
        let expected = [
            ("0", "mbar"),
            ("1", "Torr"),
            ("2", "Pa"),
            ("3", "Micron"),
            ("4", "hPascal"),
            ("5", "Volt"),
        ];
        for (code, label) in expected {
            assert_eq!(decode_units(code), label);
        }
        assert_eq!(decode_units(" 2\r\n"), "Pa");
    }

    #[test]
    fn test_unknown_units() {
        for code in ["6", "42", "", "mbar", "01", "+1", "00"] {
            assert_eq!(decode_units(code), "Unknown Units", "code {code:?}");
        }
    }

    #[test]
    fn test_readback_names_and_fallback() {
        let readings = [
            GaugeReading {
                channel: 0,
                status: ChannelStatus::Ok,
                pressure: 1.5e-3,
            },
            GaugeReading {
                channel: 1,
                status: ChannelStatus::NoSensor,
                pressure: f64::NAN,
            },
        ];
        let names = vec!["Load".to_string()];

        let readback = Readback::new(1700000000.5, Units::Mbar, &readings, &names);

        assert_eq!(readback.sensors.len(), 2);
        assert_eq!(readback.sensors[0].name, "Load");
        assert_eq!(readback.sensors[1].name, "CH2");
    }

    #[test]
    fn test_readback_serialization() {
        let readings = [
            GaugeReading {
                channel: 0,
                status: ChannelStatus::Ok,
                pressure: 2.5,
            },
            GaugeReading {
                channel: 1,
                status: ChannelStatus::SensorOff,
                pressure: f64::NAN,
            },
        ];

        let readback = Readback::new(12.0, Units::Torr, &readings, &[]);
        let json: serde_json::Value = serde_json::to_value(&readback).unwrap();

        assert_eq!(json["timestamp"], 12.0);
        assert_eq!(json["units"], "Torr");
        assert_eq!(json["sensors"][0]["name"], "CH1");
        assert_eq!(json["sensors"][0]["status"], "OK");
        assert_eq!(json["sensors"][0]["value"], 2.5);
        assert_eq!(json["sensors"][1]["status"], "Sensor Off");
        assert!(json["sensors"][1]["value"].is_null());
    }
}
