//! Sample window — the recent, time-bounded slice the classifier looks at.

use chrono::Duration;

use crate::error::{MalformedSeriesError, PlugwatchError};
use crate::sample::Sample;
use crate::time::Timestamp;

/// A contiguous suffix of the sample series, in chronological order.
///
/// Extraction walks the series from the most recent sample backward,
/// accumulating until **both** the elapsed span and the sample count are
/// satisfied (or the series is exhausted), so a slow poller still gets
/// enough samples and a fast poller still covers enough wall-clock time.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleWindow {
    samples: Vec<Sample>,
    earliest: Timestamp,
    latest: Timestamp,
}

impl SampleWindow {
    /// Extract the trailing window from `series`.
    ///
    /// # Errors
    ///
    /// Returns [`PlugwatchError::EmptySeries`] when `series` has no samples
    /// and [`PlugwatchError::MalformedSeries`] when timestamps regress
    /// within the walked suffix.
    pub fn extract(
        series: &[Sample],
        min_span: Duration,
        min_count: usize,
    ) -> Result<Self, PlugwatchError> {
        let newest = series.last().ok_or(PlugwatchError::EmptySeries)?;
        let latest = newest.time;

        let mut collected: Vec<Sample> = Vec::new();
        let mut earliest = latest;

        for (index, sample) in series.iter().enumerate().rev() {
            if sample.time > earliest {
                return Err(MalformedSeriesError {
                    index,
                    found: sample.time,
                    expected_at_least: earliest,
                }
                .into());
            }
            earliest = sample.time;
            collected.push(*sample);

            let span = latest - earliest;
            if collected.len() >= min_count && span >= min_span {
                break;
            }
        }

        collected.reverse();
        Ok(Self {
            samples: collected,
            earliest,
            latest,
        })
    }

    /// The samples, oldest first. Never empty.
    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Timestamp of the oldest sample in the window.
    #[must_use]
    pub fn earliest(&self) -> Timestamp {
        self.earliest
    }

    /// Timestamp of the newest sample in the window.
    #[must_use]
    pub fn latest(&self) -> Timestamp {
        self.latest
    }

    /// Lifetime energy counter at the newest sample.
    #[must_use]
    pub fn latest_energy(&self) -> f64 {
        self.samples
            .last()
            .map(|s| s.energy_total)
            .unwrap_or_default()
    }

    /// Median power over the window.
    ///
    /// The median rather than the mean, so a single spike or dropout in a
    /// noisy series cannot flip the classification.
    #[must_use]
    pub fn median_power(&self) -> f64 {
        let mut powers: Vec<f64> = self.samples.iter().map(|s| s.power).collect();
        powers.sort_by(f64::total_cmp);
        let mid = powers.len() / 2;
        if powers.len() % 2 == 1 {
            powers[mid]
        } else {
            f64::midpoint(powers[mid - 1], powers[mid])
        }
    }
}
