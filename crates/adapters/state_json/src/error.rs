//! JSON state store error types.

use plugwatch_domain::error::PlugwatchError;

/// Errors specific to the JSON state store.
///
/// A *malformed* document is deliberately not in this list: it is handled
/// inside `load` by falling back to defaults, never surfaced as an error.
#[derive(Debug, thiserror::Error)]
pub enum StateStoreError {
    /// Reading or writing the document file failed.
    #[error("failed to access state document")]
    Io(#[from] std::io::Error),

    /// Serializing the document failed.
    #[error("failed to serialize state document")]
    Serialize(#[from] serde_json::Error),

    /// The atomic rename of the temp file failed.
    #[error("failed to commit state document")]
    Persist(#[from] tempfile::PersistError),
}

impl StateStoreError {
    /// Convert into [`PlugwatchError::Storage`] for propagation across the
    /// port boundary.
    #[must_use]
    pub fn into_domain(self) -> PlugwatchError {
        PlugwatchError::Storage(Box::new(self))
    }
}

impl From<StateStoreError> for PlugwatchError {
    fn from(err: StateStoreError) -> Self {
        err.into_domain()
    }
}
