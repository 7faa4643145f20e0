//! Sample — one power reading from the historical series.

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// A single reading: when it was taken, instantaneous power draw, and the
/// meter's lifetime energy counter at that moment.
///
/// The series is append-only and assumed monotonic in `time`; the window
/// extractor rejects out-of-order input rather than working around it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// When the reading was taken.
    pub time: Timestamp,
    /// Instantaneous power draw in watts.
    pub power: f64,
    /// Lifetime cumulative energy in kWh (`Total` on the meter).
    pub energy_total: f64,
}

impl Sample {
    /// Convenience constructor.
    #[must_use]
    pub fn new(time: Timestamp, power: f64, energy_total: f64) -> Self {
        Self {
            time,
            power,
            energy_total,
        }
    }
}
