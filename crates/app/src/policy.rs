//! The transition/notification policy — the core state machine.
//!
//! Given the freshly classified regime and the persisted transition
//! records, decide whether anything should be announced this tick. The
//! policy is split in two pure steps so delivery failures keep their
//! retry semantics:
//!
//! - [`evaluate`] applies the guards, updates entry times, and returns the
//!   notification that *would* go out;
//! - [`commit`] advances the last-sent markers and the re-remind counter,
//!   and is called only after **every** attempted target acknowledged.
//!
//! If the process dies between the two, the worst case on restart is a
//! duplicate evaluation of the same tick, never a lost document.

use plugwatch_domain::backoff::re_remind_wait;
use plugwatch_domain::format::human_duration;
use plugwatch_domain::regime::Regime;
use plugwatch_domain::state::{DeviceDocument, RecordKind};
use plugwatch_domain::time::{Timestamp, latest, or_min};
use plugwatch_domain::window::SampleWindow;

/// Which transition fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionEvent {
    /// The appliance turned on.
    On,
    /// The appliance went fully off.
    Off,
    /// The appliance finished (first announcement, reports energy and
    /// runtime).
    Done,
    /// Repeat announcement for a still-done appliance; `ordinal` is 1 for
    /// the first reminder.
    DoneReminder {
        /// 1-based reminder number.
        ordinal: u32,
    },
}

impl TransitionEvent {
    /// Short name for logs and replay output.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::On => "on".to_string(),
            Self::Off => "off".to_string(),
            Self::Done => "done".to_string(),
            Self::DoneReminder { ordinal } => format!("done-reminder-{ordinal}"),
        }
    }
}

/// A notification the policy decided to send this tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedNotification {
    /// The transition that fired.
    pub event: TransitionEvent,
    /// Whose record carries the fan-out targets and the last-sent marker.
    pub record: RecordKind,
    /// Message text, ready for the transport.
    pub text: String,
}

/// Evaluate one tick: update transition records for `regime` and return
/// the notification to attempt, if any.
///
/// Entry times (`time`, `power_total`) are updated here regardless of
/// delivery outcome; last-sent markers are not touched until [`commit`].
pub fn evaluate(
    doc: &mut DeviceDocument,
    regime: Regime,
    window: &SampleWindow,
    name: &str,
    now: Timestamp,
) -> Option<PlannedNotification> {
    match regime {
        Regime::Starting => plan_on(doc, window, name, now),
        Regime::Running => {
            // If the On entry predates both Off and Done, the leading edge
            // was missed (e.g. the process was down); synthesize it now.
            let on = or_min(doc.stats.on.time);
            let missed_on = on < or_min(doc.stats.done.time) && on < or_min(doc.stats.off.time);
            let planned = if missed_on {
                plan_on(doc, window, name, now)
            } else {
                None
            };

            doc.stats.running.note_entry(now, window.latest_energy());
            doc.re_remind_counter = 0;
            planned
        }
        Regime::Off => plan_off(doc, window, name, now),
        Regime::Done => plan_done(doc, window, name, now),
        Regime::Ambiguous => {
            tracing::debug!(
                median = window.median_power(),
                samples = window.samples().len(),
                "ambiguous window, no transition"
            );
            None
        }
    }
}

/// Mark `planned` as delivered: advance the last-sent marker and adjust
/// the re-remind counter.
///
/// Must only be called when every attempted target returned a positive
/// acknowledgment; partial delivery leaves the document untouched so the
/// next tick retries.
pub fn commit(doc: &mut DeviceDocument, planned: &PlannedNotification, now: Timestamp) {
    doc.record_mut(planned.record).mark_sent(now);
    match planned.event {
        TransitionEvent::DoneReminder { .. } => doc.re_remind_counter += 1,
        TransitionEvent::On | TransitionEvent::Off | TransitionEvent::Done => {
            doc.re_remind_counter = 0;
        }
    }
}

fn plan_on(
    doc: &mut DeviceDocument,
    window: &SampleWindow,
    name: &str,
    now: Timestamp,
) -> Option<PlannedNotification> {
    // Re-announce only after an intervening Off or Done; the very first
    // announcement has no marker and always passes.
    let allowed = match doc.stats.on.last_sent {
        None => true,
        Some(sent) => {
            sent < now
                && latest(doc.stats.off.time, doc.stats.done.time).is_some_and(|t| t > sent)
        }
    };
    if !allowed {
        tracing::debug!("on transition already announced, suppressing");
        return None;
    }

    doc.stats.on.note_entry(now, window.latest_energy());
    Some(PlannedNotification {
        event: TransitionEvent::On,
        record: RecordKind::On,
        text: format!("{name} started"),
    })
}

fn plan_off(
    doc: &mut DeviceDocument,
    window: &SampleWindow,
    name: &str,
    now: Timestamp,
) -> Option<PlannedNotification> {
    let run_entry = latest(doc.stats.on.time, doc.stats.done.time);
    if !guards_pass(doc, run_entry, now, "off") {
        return None;
    }

    // A new run must have started since the last Off announcement.
    if !run_entry.is_some_and(|t| t > or_min(doc.stats.off.last_sent)) {
        return None;
    }

    doc.stats.off.note_entry(window.earliest(), window.latest_energy());
    Some(PlannedNotification {
        event: TransitionEvent::Off,
        record: RecordKind::Off,
        text: format!("{name} off"),
    })
}

fn plan_done(
    doc: &mut DeviceDocument,
    window: &SampleWindow,
    name: &str,
    now: Timestamp,
) -> Option<PlannedNotification> {
    let run_entry = latest(doc.stats.on.time, doc.stats.off.time);
    if !guards_pass(doc, run_entry, now, "done") {
        return None;
    }

    if run_entry.is_some_and(|t| t > or_min(doc.stats.done.last_sent)) {
        // First announcement for this episode: record the entry and report
        // energy and runtime.
        doc.stats.done.note_entry(window.earliest(), window.latest_energy());

        let start_energy = doc.stats.on.power_total.unwrap_or(0.0);
        let used = (window.latest_energy() - start_energy).max(0.0);
        let ran_for = match (doc.stats.on.time, doc.stats.done.time) {
            (Some(on), Some(done)) => done - on,
            _ => chrono::Duration::zero(),
        };
        return Some(PlannedNotification {
            event: TransitionEvent::Done,
            record: RecordKind::Done,
            text: format!(
                "{name} done: {used:.3} kWh in {}",
                human_duration(ran_for)
            ),
        });
    }

    if !doc.re_remind_enabled {
        return None;
    }

    // Already announced; re-remind on the backoff schedule. Entry time and
    // energy stay put.
    let announced = matches!(
        (doc.stats.done.last_sent, doc.stats.done.time),
        (Some(sent), Some(entered)) if sent >= entered
    );
    let due = now - or_min(doc.stats.done.last_sent) >= re_remind_wait(doc.re_remind_counter);
    if !(announced && due) {
        return None;
    }

    let ordinal = doc.re_remind_counter + 1;
    let since_done = now - or_min(doc.stats.done.time);
    Some(PlannedNotification {
        event: TransitionEvent::DoneReminder { ordinal },
        record: RecordKind::Done,
        text: format!(
            "{name} still done for {} (reminder {ordinal})",
            human_duration(since_done)
        ),
    })
}

/// Debounce guards shared by Off and Done: the run must have lasted at
/// least `min_runtime`, and at least `min_data_window` must have passed
/// since the last Running observation.
fn guards_pass(
    doc: &DeviceDocument,
    run_entry: Option<Timestamp>,
    now: Timestamp,
    target: &str,
) -> bool {
    if now - or_min(run_entry) < doc.min_runtime() {
        tracing::debug!(target_regime = target, "run shorter than min runtime, suppressing");
        return false;
    }
    if now - or_min(doc.stats.running.time) < doc.min_data_window() {
        tracing::debug!(
            target_regime = target,
            "observation window since last running sample too short, suppressing"
        );
        return false;
    }
    true
}
