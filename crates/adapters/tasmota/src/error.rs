//! Tasmota adapter error types.

use plugwatch_domain::error::PlugwatchError;

/// Errors specific to the Tasmota adapter.
#[derive(Debug, thiserror::Error)]
pub enum TasmotaError {
    /// The HTTP request failed or timed out.
    #[error("HTTP request to device failed")]
    Http(#[from] reqwest::Error),

    /// The command response was not the expected JSON.
    #[error("failed to parse device payload")]
    Payload(#[from] serde_json::Error),

    /// A required field was missing from the payload.
    #[error("device payload missing field `{0}`")]
    MissingField(&'static str),

    /// The device-reported timestamp could not be parsed.
    #[error("failed to parse device timestamp")]
    Time(#[from] chrono::ParseError),
}

impl TasmotaError {
    /// Convert into [`PlugwatchError::Unreachable`]: any of these means the
    /// device's cycle is skipped, whether the network or the payload was at
    /// fault.
    #[must_use]
    pub fn into_domain(self) -> PlugwatchError {
        PlugwatchError::Unreachable(Box::new(self))
    }
}

impl From<TasmotaError> for PlugwatchError {
    fn from(err: TasmotaError) -> Self {
        err.into_domain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_missing_field_to_unreachable() {
        let err: PlugwatchError = TasmotaError::MissingField("POWER").into();
        assert!(matches!(err, PlugwatchError::Unreachable(_)));
    }

    #[test]
    fn should_display_missing_field_name() {
        let err = TasmotaError::MissingField("StatusSNS");
        assert_eq!(err.to_string(), "device payload missing field `StatusSNS`");
    }
}
