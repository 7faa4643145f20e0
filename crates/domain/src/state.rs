//! The persisted per-device document: user-tunable thresholds plus the
//! transition records the notification policy reads and writes.
//!
//! The document is hand-editable JSON. Loading merges with defaults the
//! serde way: every field has a default, and unknown keys are captured in
//! `#[serde(flatten)]` bags so a manually added field survives load/save
//! round trips. Keys on the deprecated list are stripped before every save
//! so superseded schema fields age out.

use std::collections::BTreeMap;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::time::{Timestamp, or_min};

/// Top-level and nested keys from superseded document schemas, removed on
/// every save. These are the count-based classifier tunables replaced by
/// the median rules.
pub const DEPRECATED_KEYS: [&str; 5] = [
    "off_power",
    "max_idle_power",
    "min_idle_minutes",
    "min_idle_count",
    "min_done_count",
];

/// Per-target notification urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Urgency {
    /// Target is configured but suppressed.
    Skip,
    /// Sent without an audible alert.
    Muted,
    /// Sent with an alert.
    Alert,
}

impl From<Urgency> for u8 {
    fn from(value: Urgency) -> Self {
        match value {
            Urgency::Skip => 0,
            Urgency::Muted => 1,
            Urgency::Alert => 2,
        }
    }
}

impl TryFrom<u8> for Urgency {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Skip),
            1 => Ok(Self::Muted),
            2 => Ok(Self::Alert),
            other => Err(format!("urgency out of range: {other}")),
        }
    }
}

/// Persisted memory of one regime: when it was last entered, when it was
/// last announced, and the energy counter at entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionRecord {
    /// When this regime was last entered. Only advances on a *new* entry,
    /// never rewritten backward.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<Timestamp>,
    /// When this regime was last successfully announced. Monotonically
    /// non-decreasing across saves.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sent: Option<Timestamp>,
    /// Lifetime energy counter (kWh) at entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_total: Option<f64>,
    /// Notification fan-out: target id to urgency.
    pub notification: BTreeMap<String, Urgency>,
    /// Unknown keys, preserved across round trips.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TransitionRecord {
    /// Record a new entry into this regime.
    pub fn note_entry(&mut self, time: Timestamp, energy_total: f64) {
        self.time = Some(time);
        self.power_total = Some(energy_total);
    }

    /// Advance the last-sent marker, never moving it backward.
    pub fn mark_sent(&mut self, now: Timestamp) {
        self.last_sent = Some(or_min(self.last_sent).max(now));
    }
}

/// Which transition record an operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// The appliance turned on.
    On,
    /// The appliance went fully off.
    Off,
    /// The appliance finished but still draws standby power.
    Done,
    /// The appliance is actively running.
    Running,
}

/// One transition record per regime class.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimeStats {
    pub on: TransitionRecord,
    pub off: TransitionRecord,
    pub done: TransitionRecord,
    pub running: TransitionRecord,
    /// Unknown keys, preserved across round trips.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The whole persisted document for one monitored device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceDocument {
    /// Display name for notification texts; typically added by hand.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    /// Power at or below this is "off" (W).
    pub off_power_threshold: f64,
    /// Power at or below this (but above the off threshold) is standby (W).
    pub idle_power_ceiling: f64,
    /// Minimum run duration before an Off/Done transition is believed (s).
    pub min_runtime_secs: u64,
    /// Minimum observation span since the last Running sample before an
    /// Off/Done transition is believed (s).
    pub min_data_window_secs: u64,
    /// Whether Done re-reminders are sent at all.
    pub re_remind_enabled: bool,
    /// How many Done re-reminders have gone out for the current episode.
    pub re_remind_counter: u32,
    /// Per-regime transition records.
    pub stats: RegimeStats,
    /// Unknown keys, preserved across round trips.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for DeviceDocument {
    fn default() -> Self {
        Self {
            device_name: None,
            off_power_threshold: 0.0,
            idle_power_ceiling: 5.0,
            min_runtime_secs: 1200,
            min_data_window_secs: 60,
            re_remind_enabled: true,
            re_remind_counter: 0,
            stats: RegimeStats::default(),
            extra: Map::new(),
        }
    }
}

impl DeviceDocument {
    /// Borrow the record for `kind`.
    #[must_use]
    pub fn record(&self, kind: RecordKind) -> &TransitionRecord {
        match kind {
            RecordKind::On => &self.stats.on,
            RecordKind::Off => &self.stats.off,
            RecordKind::Done => &self.stats.done,
            RecordKind::Running => &self.stats.running,
        }
    }

    /// Mutably borrow the record for `kind`.
    pub fn record_mut(&mut self, kind: RecordKind) -> &mut TransitionRecord {
        match kind {
            RecordKind::On => &mut self.stats.on,
            RecordKind::Off => &mut self.stats.off,
            RecordKind::Done => &mut self.stats.done,
            RecordKind::Running => &mut self.stats.running,
        }
    }

    /// Minimum believable run duration.
    #[must_use]
    pub fn min_runtime(&self) -> Duration {
        Duration::seconds(i64::try_from(self.min_runtime_secs).unwrap_or(i64::MAX))
    }

    /// Minimum observation span since the last Running sample.
    #[must_use]
    pub fn min_data_window(&self) -> Duration {
        Duration::seconds(i64::try_from(self.min_data_window_secs).unwrap_or(i64::MAX))
    }

    /// Name used in notification texts.
    #[must_use]
    pub fn display_name<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.device_name.as_deref().unwrap_or(fallback)
    }

    /// Remove keys from superseded schemas so they age out over saves.
    pub fn strip_deprecated(&mut self) {
        strip_keys(&mut self.extra);
        strip_keys(&mut self.stats.extra);
        for record in [
            &mut self.stats.on,
            &mut self.stats.off,
            &mut self.stats.done,
            &mut self.stats.running,
        ] {
            strip_keys(&mut record.extra);
        }
    }
}

fn strip_keys(extra: &mut Map<String, Value>) {
    for key in DEPRECATED_KEYS {
        extra.remove(key);
    }
}
