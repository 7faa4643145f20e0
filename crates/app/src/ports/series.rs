//! Series port — the append-only historical sample store.

use std::future::Future;

use plugwatch_domain::error::PlugwatchError;
use plugwatch_domain::sample::Sample;
use plugwatch_domain::telemetry::TelemetryReading;

/// Append-only time series for a single device.
pub trait SeriesStore: Send + Sync {
    /// Append one full telemetry row.
    fn append(
        &self,
        reading: &TelemetryReading,
    ) -> impl Future<Output = Result<(), PlugwatchError>> + Send;

    /// Read the whole series as classifier samples, oldest first.
    fn read_all(&self) -> impl Future<Output = Result<Vec<Sample>, PlugwatchError>> + Send;
}
