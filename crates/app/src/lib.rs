//! # plugwatch-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `DeviceClient` — poll a plug for its name and telemetry
//!   - `SeriesStore` — append-only historical sample series
//!   - `StateStore` — load/save of the persisted device document
//!   - `Notifier` — deliver one notification to one target
//! - Own the **notification policy**: the transition state machine that
//!   decides which regime change to announce, de-duplicates announcements,
//!   and schedules Done re-reminders
//! - Orchestrate one evaluation tick per device (`MonitorService`)
//! - Provide the offline **replay** harness used as a regression tool
//!
//! ## Dependency rule
//! Depends on `plugwatch-domain` only. Never imports adapter crates.
//! Adapters depend on *this* crate, not the reverse.

pub mod monitor;
pub mod policy;
pub mod ports;
pub mod replay;
