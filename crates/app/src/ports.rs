//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside
//! world. Each port instance is bound to **one** device's resources (its
//! HTTP endpoint, its CSV file, its JSON document), so a tick for one
//! device can never touch another device's state.

pub mod device;
pub mod notifier;
pub mod series;
pub mod state_store;

pub use device::DeviceClient;
pub use notifier::{DeliveryAck, Notifier};
pub use series::SeriesStore;
pub use state_store::StateStore;
