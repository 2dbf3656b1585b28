//! Integration tests for maxigauge-common library.

use maxigauge_common::{
    ChannelStatus, GaugeReading, Presence, PresenceFormat, Readback, TopicBuilder, Units,
    current_timestamp_secs,
};

#[test]
fn test_full_readback_workflow() {
    // Build a snapshot the way the poller does
    let codes = ["0", "1", "5"];
    let pressures = [1.0e-6, f64::NAN, 3.2e2];

    let readings: Vec<GaugeReading> = codes
        .iter()
        .zip(pressures)
        .enumerate()
        .map(|(channel, (code, pressure))| GaugeReading {
            channel,
            status: ChannelStatus::from_code(code),
            pressure,
        })
        .collect();

    let names = vec!["Chamber".to_string(), "Foreline".to_string()];
    let timestamp = current_timestamp_secs();
    let readback = Readback::new(timestamp, Units::from_code("0"), &readings, &names);

    let bytes = serde_json::to_vec(&readback).expect("JSON encode failed");
    let json: serde_json::Value = serde_json::from_slice(&bytes).expect("JSON decode failed");

    assert_eq!(json["units"], "mbar");
    assert!(json["timestamp"].as_f64().unwrap() > 1.6e9);

    let sensors = json["sensors"].as_array().unwrap();
    assert_eq!(sensors.len(), readings.len());

    assert_eq!(sensors[0]["name"], "Chamber");
    assert_eq!(sensors[0]["status"], "OK");
    assert_eq!(sensors[0]["value"], 1.0e-6);

    assert_eq!(sensors[1]["name"], "Foreline");
    assert_eq!(sensors[1]["status"], "Underrange");
    assert!(sensors[1]["value"].is_null());

    assert_eq!(sensors[2]["name"], "CH3");
    assert_eq!(sensors[2]["status"], "No Sensor");
}

#[test]
fn test_topics_and_presence() {
    let topics = TopicBuilder::new("lab/vacuum", "maxigauge");

    assert_eq!(topics.status(), "lab/vacuum/maxigauge/status");
    assert_eq!(topics.readbacks(), "lab/vacuum/maxigauge/readbacks");

    assert_eq!(Presence::Online.payload(PresenceFormat::Plain), b"online");
    assert_eq!(
        Presence::Offline.payload(PresenceFormat::Json),
        br#"{"value":"offline"}"#.to_vec()
    );
}
