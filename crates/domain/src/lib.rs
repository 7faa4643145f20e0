//! # plugwatch-domain
//!
//! Pure domain model for the plugwatch smart-plug monitor.
//!
//! ## Responsibilities
//! - Foundational types: timestamps, error conventions
//! - Define **Samples** (one power reading from the series) and the full
//!   **TelemetryReading** a Tasmota plug reports
//! - Extract the recent **SampleWindow** the classifier looks at
//! - Classify a window into an operating **Regime**
//! - Define the persisted **DeviceDocument** (tunables + per-regime
//!   transition records) that the notification policy reads and writes
//! - The re-remind **backoff** schedule
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod backoff;
pub mod error;
pub mod format;
pub mod regime;
pub mod sample;
pub mod state;
pub mod telemetry;
pub mod time;
pub mod window;
