//! State port — durable persistence of the device document.

use std::future::Future;

use plugwatch_domain::error::PlugwatchError;
use plugwatch_domain::state::DeviceDocument;

/// Load/save of one device's persisted document.
///
/// `load` merges with defaults (a missing or unreadable document yields the
/// default document, never an error). `save` must be an all-or-nothing
/// whole-document replace: a crash mid-save never leaves a torn file.
pub trait StateStore: Send + Sync {
    /// Load the document, falling back to defaults when absent or
    /// malformed.
    fn load(&self) -> impl Future<Output = Result<DeviceDocument, PlugwatchError>> + Send;

    /// Atomically overwrite the document.
    fn save(
        &self,
        document: &DeviceDocument,
    ) -> impl Future<Output = Result<(), PlugwatchError>> + Send;
}
