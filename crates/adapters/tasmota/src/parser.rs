//! Pure parsers for Tasmota command payloads.
//!
//! Kept free of IO so they can be tested against recorded payloads. The
//! device reports naive local timestamps (no offset); they are taken as
//! UTC, which is consistent as long as the plug and the host agree on a
//! timezone.

use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::Value;

use plugwatch_domain::telemetry::TelemetryReading;

use crate::error::TasmotaError;

/// `{"DeviceName":"..."}` from `cmnd=DeviceName`.
#[derive(Debug, Deserialize)]
struct DeviceNameResponse {
    #[serde(rename = "DeviceName")]
    device_name: String,
}

/// `{"StatusSNS":{...}}` from `cmnd=Status 8`.
#[derive(Debug, Deserialize)]
struct StatusResponse {
    #[serde(rename = "StatusSNS")]
    status_sns: StatusSns,
}

#[derive(Debug, Deserialize)]
struct StatusSns {
    #[serde(rename = "Time")]
    time: String,
    #[serde(rename = "ANALOG")]
    analog: Option<Analog>,
    #[serde(rename = "ENERGY")]
    energy: Energy,
}

#[derive(Debug, Deserialize)]
struct Analog {
    #[serde(rename = "Temperature1", default)]
    temperature1: f64,
}

#[derive(Debug, Deserialize)]
struct Energy {
    #[serde(rename = "TotalStartTime", default)]
    total_start_time: String,
    #[serde(rename = "Total")]
    total: f64,
    #[serde(rename = "Yesterday", default)]
    yesterday: f64,
    #[serde(rename = "Today", default)]
    today: f64,
    #[serde(rename = "Power")]
    power: f64,
    #[serde(rename = "ApparentPower", default)]
    apparent_power: f64,
    #[serde(rename = "ReactivePower", default)]
    reactive_power: f64,
    #[serde(rename = "Factor", default)]
    factor: f64,
    #[serde(rename = "Voltage", default)]
    voltage: f64,
    #[serde(rename = "Current", default)]
    current: f64,
}

/// Parse the device name response.
///
/// # Errors
///
/// Returns [`TasmotaError::Payload`] when the JSON shape is wrong.
pub fn parse_device_name(payload: &Value) -> Result<String, TasmotaError> {
    let response: DeviceNameResponse = serde_json::from_value(payload.clone())?;
    Ok(response.device_name)
}

/// Parse the relay state from a `cmnd=Power1` response.
///
/// Single-relay devices answer `{"POWER":"ON"}`; multi-relay firmware uses
/// `{"POWER1":"ON"}`.
///
/// # Errors
///
/// Returns [`TasmotaError::MissingField`] when neither key is present.
pub fn parse_relay_state(payload: &Value) -> Result<String, TasmotaError> {
    payload
        .get("POWER")
        .or_else(|| payload.get("POWER1"))
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or(TasmotaError::MissingField("POWER"))
}

/// Merge a `Status 8` payload and a relay probe into one unified record.
///
/// # Errors
///
/// Returns [`TasmotaError`] when the payload shape, a required field, or
/// the timestamp is invalid.
pub fn parse_telemetry(status: &Value, relay: &str) -> Result<TelemetryReading, TasmotaError> {
    let response: StatusResponse = serde_json::from_value(status.clone())?;
    let sns = response.status_sns;

    let time = NaiveDateTime::parse_from_str(&sns.time, "%Y-%m-%dT%H:%M:%S")?.and_utc();

    Ok(TelemetryReading {
        time,
        voltage: sns.energy.voltage,
        current: sns.energy.current,
        power: sns.energy.power,
        apparent_power: sns.energy.apparent_power,
        reactive_power: sns.energy.reactive_power,
        factor: sns.energy.factor,
        today: sns.energy.today,
        yesterday: sns.energy.yesterday,
        total: sns.energy.total,
        temperature1: sns.analog.map(|a| a.temperature1).unwrap_or_default(),
        total_start_time: sns.energy.total_start_time,
        power1: relay.to_string(),
    })
}
