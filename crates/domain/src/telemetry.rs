//! The full telemetry record a Tasmota power plug reports.
//!
//! One record merges the energy-sensor fields from `Status 8` with the
//! relay on/off probe (`power1`). The field order doubles as the fixed CSV
//! header of the series store.

use serde::{Deserialize, Serialize};

use crate::sample::Sample;
use crate::time::Timestamp;

/// Fixed CSV header of the series store, in column order.
pub const CSV_HEADER: [&str; 13] = [
    "Time",
    "Voltage",
    "Current",
    "Power",
    "ApparentPower",
    "ReactivePower",
    "Factor",
    "Today",
    "Yesterday",
    "Total",
    "Temperature1",
    "TotalStartTime",
    "power1",
];

/// One merged monitoring record from a plug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryReading {
    /// Device-local timestamp of the reading.
    #[serde(rename = "Time")]
    pub time: Timestamp,
    /// Mains voltage in V.
    #[serde(rename = "Voltage")]
    pub voltage: f64,
    /// Current in A.
    #[serde(rename = "Current")]
    pub current: f64,
    /// Active power in W.
    #[serde(rename = "Power")]
    pub power: f64,
    /// Apparent power in VA.
    #[serde(rename = "ApparentPower")]
    pub apparent_power: f64,
    /// Reactive power in VAr.
    #[serde(rename = "ReactivePower")]
    pub reactive_power: f64,
    /// Power factor (0–1).
    #[serde(rename = "Factor")]
    pub factor: f64,
    /// Energy today in kWh.
    #[serde(rename = "Today")]
    pub today: f64,
    /// Energy yesterday in kWh.
    #[serde(rename = "Yesterday")]
    pub yesterday: f64,
    /// Lifetime energy in kWh.
    #[serde(rename = "Total")]
    pub total: f64,
    /// Internal temperature sensor in °C.
    #[serde(rename = "Temperature1")]
    pub temperature1: f64,
    /// When the lifetime counter started.
    #[serde(rename = "TotalStartTime")]
    pub total_start_time: String,
    /// Relay state from the secondary on/off probe (`"ON"` / `"OFF"`).
    #[serde(rename = "power1")]
    pub power1: String,
}

impl TelemetryReading {
    /// Project the reading down to the [`Sample`] the classifier needs.
    #[must_use]
    pub fn to_sample(&self) -> Sample {
        Sample::new(self.time, self.power, self.total)
    }

    /// Whether the relay probe reported the output as switched on.
    #[must_use]
    pub fn relay_on(&self) -> bool {
        self.power1.eq_ignore_ascii_case("on")
    }
}
