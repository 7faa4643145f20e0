//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`PlugwatchError`] at the port boundary. Adapters keep their own enums
//! with `#[source]` chains and provide an `into_domain` conversion.

/// Boxed source error carried across port boundaries.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error for a single device evaluation.
///
/// None of these may escape the per-device cycle boundary: the poll loop
/// logs them and moves on to the next device.
#[derive(Debug, thiserror::Error)]
pub enum PlugwatchError {
    /// The sample series has no rows yet; nothing to classify.
    #[error("sample series is empty")]
    EmptySeries,

    /// The sample series contains out-of-order timestamps.
    #[error("sample series is out of order")]
    MalformedSeries(#[from] MalformedSeriesError),

    /// The device did not answer (network error or timeout).
    #[error("device unreachable")]
    Unreachable(#[source] BoxedError),

    /// Reading or writing the series file or the persisted document failed.
    #[error("storage error")]
    Storage(#[source] BoxedError),

    /// The notification transport reported a failure.
    #[error("notification delivery failed")]
    Delivery(#[source] BoxedError),
}

/// Detail for [`PlugwatchError::MalformedSeries`].
#[derive(Debug, thiserror::Error)]
#[error("timestamp at row {index} ({found}) precedes its successor ({expected_at_least})")]
pub struct MalformedSeriesError {
    /// Index (from the start of the series) of the offending sample.
    pub index: usize,
    /// The timestamp found there.
    pub found: crate::time::Timestamp,
    /// The timestamp it must not exceed.
    pub expected_at_least: crate::time::Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_empty_series_error() {
        assert_eq!(
            PlugwatchError::EmptySeries.to_string(),
            "sample series is empty"
        );
    }

    #[test]
    fn should_carry_malformed_series_detail() {
        let ts = crate::time::now();
        let err = PlugwatchError::from(MalformedSeriesError {
            index: 3,
            found: ts,
            expected_at_least: ts,
        });
        assert!(matches!(err, PlugwatchError::MalformedSeries(_)));
    }
}
