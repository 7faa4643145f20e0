//! Telegram adapter error types.

use plugwatch_domain::error::PlugwatchError;

/// Errors specific to the Telegram transport.
#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    /// Building the client or talking to the API failed.
    #[error("telegram request failed")]
    Http(#[from] reqwest::Error),
}

impl TelegramError {
    /// Convert into [`PlugwatchError::Delivery`] for propagation across the
    /// port boundary.
    #[must_use]
    pub fn into_domain(self) -> PlugwatchError {
        PlugwatchError::Delivery(Box::new(self))
    }
}

impl From<TelegramError> for PlugwatchError {
    fn from(err: TelegramError) -> Self {
        err.into_domain()
    }
}
