//! # plugwatch-adapter-tasmota
//!
//! Implements the [`DeviceClient`] port against a Tasmota smart plug's
//! HTTP command interface (`/cm?cmnd=…`).
//!
//! Three commands are used per tick:
//!
//! - `DeviceName` — the plug's configured name
//! - `Status 8` — sensor status: energy telemetry plus the analog
//!   temperature channel
//! - `Power1` — the relay on/off probe merged into the unified record

use std::time::Duration;

use serde_json::Value;

use plugwatch_app::ports::DeviceClient;
use plugwatch_domain::error::PlugwatchError;
use plugwatch_domain::telemetry::TelemetryReading;

pub mod error;
pub mod parser;

use error::TasmotaError;

/// Per-request timeout. Polling is paced in tens of seconds, so a slow
/// device is treated as unreachable rather than waited for.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client bound to one plug.
pub struct TasmotaClient {
    http: reqwest::Client,
    base: String,
}

impl TasmotaClient {
    /// Create a client for `host` (IP address or hostname, no scheme).
    ///
    /// # Errors
    ///
    /// Returns [`TasmotaError::Http`] if the underlying client cannot be
    /// constructed.
    pub fn new(host: &str) -> Result<Self, TasmotaError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base: format!("http://{host}/cm"),
        })
    }

    /// Issue one `cmnd` and parse the JSON response.
    async fn command(&self, cmnd: &str) -> Result<Value, TasmotaError> {
        let value = self
            .http
            .get(&self.base)
            .query(&[("cmnd", cmnd)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(value)
    }
}

impl DeviceClient for TasmotaClient {
    async fn name(&self) -> Result<String, PlugwatchError> {
        let payload = self.command("DeviceName").await?;
        Ok(parser::parse_device_name(&payload)?)
    }

    async fn telemetry(&self) -> Result<TelemetryReading, PlugwatchError> {
        let status = self.command("Status 8").await?;
        let relay_payload = self.command("Power1").await?;
        let relay = parser::parse_relay_state(&relay_payload)?;
        let reading = parser::parse_telemetry(&status, &relay)?;
        tracing::debug!(power = reading.power, total = reading.total, "polled device");
        Ok(reading)
    }
}
