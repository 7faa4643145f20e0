//! Regime — the classified operating state of the monitored appliance.

use std::fmt;

use crate::window::SampleWindow;

/// Operating regime derived fresh from a window every tick.
///
/// Classification is stateless; all memory lives in the persisted
/// [`DeviceDocument`](crate::state::DeviceDocument).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Regime {
    /// Quiet window with a single fresh sample above the off threshold:
    /// the appliance just turned on.
    Starting,
    /// Every sample in the window is at or above the idle ceiling.
    Running,
    /// Median power is at or below the off threshold.
    Off,
    /// Median power sits between the thresholds: finished but still drawing
    /// standby power.
    Done,
    /// None of the rules matched. Reported as a diagnostic, never escalated.
    Ambiguous,
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Starting => write!(f, "starting"),
            Self::Running => write!(f, "running"),
            Self::Off => write!(f, "off"),
            Self::Done => write!(f, "done"),
            Self::Ambiguous => write!(f, "ambiguous"),
        }
    }
}

/// Classify a window. Rules are evaluated in priority order; first match
/// wins.
///
/// The `Starting` rule is a leading-edge detector: after a quiet window a
/// single fresh sample above `off_threshold` is enough to declare a start,
/// so "turned on" reacts within one poll. Leaving for `Off` or `Done` goes
/// through the window-wide median instead, so those exits are slow and
/// debounced. `Starting` needs at least two samples; a lone all-high sample
/// is `Running`.
#[must_use]
pub fn classify(window: &SampleWindow, off_threshold: f64, idle_ceiling: f64) -> Regime {
    let samples = window.samples();

    if samples.len() >= 2 {
        let (last, head) = samples.split_last().unwrap_or((&samples[0], &[]));
        if head.iter().all(|s| s.power <= off_threshold) && last.power > off_threshold {
            return Regime::Starting;
        }
    }

    if samples.iter().all(|s| s.power >= idle_ceiling) {
        return Regime::Running;
    }

    let median = window.median_power();
    if median <= off_threshold {
        return Regime::Off;
    }
    if median <= idle_ceiling {
        return Regime::Done;
    }

    Regime::Ambiguous
}
