//! Device port — polling a power-metering smart plug.

use std::future::Future;

use plugwatch_domain::error::PlugwatchError;
use plugwatch_domain::telemetry::TelemetryReading;

/// Client bound to a single plug.
///
/// Both operations fail with [`PlugwatchError::Unreachable`] on network
/// errors or timeouts; the poll loop skips the device's cycle and moves on.
pub trait DeviceClient: Send + Sync {
    /// The device's self-reported name, used for file naming and as the
    /// fallback display name.
    fn name(&self) -> impl Future<Output = Result<String, PlugwatchError>> + Send;

    /// One merged monitoring record: energy-sensor fields plus the relay
    /// on/off probe.
    fn telemetry(&self) -> impl Future<Output = Result<TelemetryReading, PlugwatchError>> + Send;
}
