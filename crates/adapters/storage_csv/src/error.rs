//! CSV store error types.

use plugwatch_domain::error::PlugwatchError;

/// Errors specific to the CSV series store.
#[derive(Debug, thiserror::Error)]
pub enum CsvStoreError {
    /// File could not be opened, created, or appended to.
    #[error("failed to access series file")]
    Io(#[from] std::io::Error),

    /// Writing or reading a CSV row failed.
    #[error("failed to encode or decode CSV row")]
    Csv(#[from] csv::Error),
}

impl CsvStoreError {
    /// Convert into [`PlugwatchError::Storage`] for propagation across the
    /// port boundary.
    #[must_use]
    pub fn into_domain(self) -> PlugwatchError {
        PlugwatchError::Storage(Box::new(self))
    }
}

impl From<CsvStoreError> for PlugwatchError {
    fn from(err: CsvStoreError) -> Self {
        err.into_domain()
    }
}
