//! Offline replay — re-evaluate the classifier and policy over history.
//!
//! For every historical offset, the replay extracts the window the live
//! loop would have seen, classifies it, and runs the policy against a
//! working copy of the document with a transport that always acknowledges.
//! The output is one CSV row per offset, which makes classifier or
//! threshold changes easy to diff against a recorded series. No real
//! notification is ever sent.

use std::fmt::Write as _;

use plugwatch_domain::error::PlugwatchError;
use plugwatch_domain::regime::classify;
use plugwatch_domain::sample::Sample;
use plugwatch_domain::state::DeviceDocument;
use plugwatch_domain::window::SampleWindow;

use crate::monitor::MIN_WINDOW_SAMPLES;
use crate::policy;

/// Header of the replay output.
pub const REPLAY_HEADER: &str = "offset,time,power,median,regime,fired";

/// Replay the policy over every offset of `samples`, starting from `doc`.
///
/// The simulated clock is each offset's newest sample time, so debounce
/// guards behave exactly as they would have live.
///
/// # Errors
///
/// Returns [`PlugwatchError::EmptySeries`] for an empty series and
/// [`PlugwatchError::MalformedSeries`] when timestamps regress.
pub fn replay(
    samples: &[Sample],
    mut doc: DeviceDocument,
    name: &str,
) -> Result<String, PlugwatchError> {
    if samples.is_empty() {
        return Err(PlugwatchError::EmptySeries);
    }

    let mut out = String::new();
    out.push_str(REPLAY_HEADER);
    out.push('\n');

    for offset in 1..=samples.len() {
        let prefix = &samples[..offset];
        let window = SampleWindow::extract(prefix, doc.min_data_window(), MIN_WINDOW_SAMPLES)?;
        let regime = classify(&window, doc.off_power_threshold, doc.idle_power_ceiling);

        let now = window.latest();
        let planned = policy::evaluate(&mut doc, regime, &window, name, now);
        let fired = match &planned {
            Some(planned) => {
                // Pretend every target acked so dedup plays out over the
                // rest of the replay.
                policy::commit(&mut doc, planned, now);
                planned.event.label()
            }
            None => String::new(),
        };

        let newest = prefix[offset - 1];
        let _ = writeln!(
            out,
            "{offset},{},{},{},{regime},{fired}",
            newest.time.to_rfc3339(),
            newest.power,
            window.median_power(),
        );
    }

    Ok(out)
}
