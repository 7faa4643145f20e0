//! Notifier port — delivering one notification to one target.

use std::future::Future;

use plugwatch_domain::error::PlugwatchError;

/// Delivery acknowledgment from the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryAck {
    /// Whether the target confirmed delivery.
    pub ok: bool,
}

/// Notification transport.
///
/// A transport error and a negative acknowledgment are treated the same by
/// the caller: the transition is not marked as sent and retries next tick.
pub trait Notifier: Send + Sync {
    /// Send `text` to `target`; `muted` suppresses the audible alert.
    fn send(
        &self,
        text: &str,
        target: &str,
        muted: bool,
    ) -> impl Future<Output = Result<DeliveryAck, PlugwatchError>> + Send;
}
