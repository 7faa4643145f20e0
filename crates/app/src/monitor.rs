//! Monitor service — one evaluation tick for one device.

use plugwatch_domain::error::PlugwatchError;
use plugwatch_domain::regime::{Regime, classify};
use plugwatch_domain::state::{DeviceDocument, Urgency};
use plugwatch_domain::time::now;
use plugwatch_domain::window::SampleWindow;

use crate::policy::{self, PlannedNotification, TransitionEvent};
use crate::ports::{DeviceClient, Notifier, SeriesStore, StateStore};

/// Minimum number of samples the classifier window must contain.
///
/// Fixed rather than persisted: the corresponding document key belongs to
/// the superseded count-based classifier and is on the removal list.
pub const MIN_WINDOW_SAMPLES: usize = 5;

/// What one tick did, for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// The regime classified this tick.
    pub regime: Regime,
    /// The transition announced this tick, if delivery fully succeeded.
    pub notified: Option<TransitionEvent>,
}

/// Orchestrates a single device: poll, record, classify, decide, notify,
/// persist. One instance per device; instances share nothing.
pub struct MonitorService<D, S, P, N> {
    device: D,
    series: S,
    state: P,
    notifier: N,
}

impl<D, S, P, N> MonitorService<D, S, P, N>
where
    D: DeviceClient,
    S: SeriesStore,
    P: StateStore,
    N: Notifier,
{
    /// Wire a service from its four ports.
    pub fn new(device: D, series: S, state: P, notifier: N) -> Self {
        Self {
            device,
            series,
            state,
            notifier,
        }
    }

    /// Run one evaluation tick.
    ///
    /// The document is loaded at the start, mutated in memory, and written
    /// back atomically at the end, even when no transition fired.
    ///
    /// # Errors
    ///
    /// Any [`PlugwatchError`]; the caller logs it and skips this device's
    /// cycle. A delivery failure is *not* an error here — it only
    /// suppresses the last-sent advance so the next tick retries.
    pub async fn tick(&self) -> Result<TickReport, PlugwatchError> {
        let fallback_name = self.device.name().await?;
        let reading = self.device.telemetry().await?;
        self.series.append(&reading).await?;

        let samples = self.series.read_all().await?;
        let mut doc = self.state.load().await?;

        let window = SampleWindow::extract(&samples, doc.min_data_window(), MIN_WINDOW_SAMPLES)?;
        let regime = classify(&window, doc.off_power_threshold, doc.idle_power_ceiling);
        tracing::debug!(%regime, median = window.median_power(), "classified window");

        let name = doc.display_name(&fallback_name).to_string();
        let planned = policy::evaluate(&mut doc, regime, &window, &name, now());

        let notified = match planned {
            Some(planned) => {
                if self.dispatch(&planned, &doc).await {
                    policy::commit(&mut doc, &planned, now());
                    tracing::info!(event = %planned.event.label(), device = %name, "notified");
                    Some(planned.event)
                } else {
                    tracing::warn!(
                        event = %planned.event.label(),
                        device = %name,
                        "delivery incomplete, will retry next tick"
                    );
                    None
                }
            }
            None => None,
        };

        self.state.save(&doc).await?;
        Ok(TickReport { regime, notified })
    }

    /// Fan the notification out to every configured target.
    ///
    /// Returns `true` only when every *attempted* target acknowledged;
    /// targets at urgency [`Urgency::Skip`] are not attempted.
    async fn dispatch(&self, planned: &PlannedNotification, doc: &DeviceDocument) -> bool {
        let mut all_ok = true;
        for (target, urgency) in &doc.record(planned.record).notification {
            let muted = match urgency {
                Urgency::Skip => continue,
                Urgency::Muted => true,
                Urgency::Alert => false,
            };
            match self.notifier.send(&planned.text, target, muted).await {
                Ok(ack) if ack.ok => {}
                Ok(_) => {
                    tracing::warn!(%target, "target rejected notification");
                    all_ok = false;
                }
                Err(err) => {
                    tracing::warn!(%target, error = %err, "notification send failed");
                    all_ok = false;
                }
            }
        }
        all_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::DeliveryAck;
    use chrono::{Duration, Utc};
    use plugwatch_domain::sample::Sample;
    use plugwatch_domain::state::RecordKind;
    use plugwatch_domain::telemetry::TelemetryReading;
    use std::future::Future;
    use std::sync::Mutex;

    // ── In-memory ports ────────────────────────────────────────────

    struct FakeDevice {
        readings: Mutex<Vec<TelemetryReading>>,
    }

    impl FakeDevice {
        fn with(readings: Vec<TelemetryReading>) -> Self {
            Self {
                readings: Mutex::new(readings),
            }
        }
    }

    impl DeviceClient for FakeDevice {
        fn name(&self) -> impl Future<Output = Result<String, PlugwatchError>> + Send {
            async { Ok("Washer".to_string()) }
        }

        fn telemetry(
            &self,
        ) -> impl Future<Output = Result<TelemetryReading, PlugwatchError>> + Send {
            let mut readings = self.readings.lock().unwrap();
            let next = readings.first().cloned();
            if readings.len() > 1 {
                readings.remove(0);
            }
            async move {
                next.ok_or_else(|| {
                    PlugwatchError::Unreachable("no reading scripted".to_string().into())
                })
            }
        }
    }

    #[derive(Default)]
    struct InMemorySeries {
        samples: Mutex<Vec<Sample>>,
    }

    impl InMemorySeries {
        fn with(samples: Vec<Sample>) -> Self {
            Self {
                samples: Mutex::new(samples),
            }
        }
    }

    impl SeriesStore for InMemorySeries {
        fn append(
            &self,
            reading: &TelemetryReading,
        ) -> impl Future<Output = Result<(), PlugwatchError>> + Send {
            self.samples.lock().unwrap().push(reading.to_sample());
            async { Ok(()) }
        }

        fn read_all(&self) -> impl Future<Output = Result<Vec<Sample>, PlugwatchError>> + Send {
            let samples = self.samples.lock().unwrap().clone();
            async move { Ok(samples) }
        }
    }

    struct InMemoryState {
        doc: Mutex<DeviceDocument>,
    }

    impl InMemoryState {
        fn with(doc: DeviceDocument) -> Self {
            Self {
                doc: Mutex::new(doc),
            }
        }

        fn snapshot(&self) -> DeviceDocument {
            self.doc.lock().unwrap().clone()
        }
    }

    impl StateStore for &InMemoryState {
        fn load(&self) -> impl Future<Output = Result<DeviceDocument, PlugwatchError>> + Send {
            let doc = self.doc.lock().unwrap().clone();
            async move { Ok(doc) }
        }

        fn save(
            &self,
            document: &DeviceDocument,
        ) -> impl Future<Output = Result<(), PlugwatchError>> + Send {
            *self.doc.lock().unwrap() = document.clone();
            async { Ok(()) }
        }
    }

    /// Scripted notifier: per-target outcomes, records every attempt.
    struct ScriptedNotifier {
        failing_targets: Vec<String>,
        sent: Mutex<Vec<(String, String, bool)>>,
    }

    impl ScriptedNotifier {
        fn reliable() -> Self {
            Self {
                failing_targets: Vec::new(),
                sent: Mutex::new(Vec::new()),
            }
        }

        fn failing(targets: &[&str]) -> Self {
            Self {
                failing_targets: targets.iter().map(ToString::to_string).collect(),
                sent: Mutex::new(Vec::new()),
            }
        }

        fn attempts(&self) -> Vec<(String, String, bool)> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Notifier for &ScriptedNotifier {
        fn send(
            &self,
            text: &str,
            target: &str,
            muted: bool,
        ) -> impl Future<Output = Result<DeliveryAck, PlugwatchError>> + Send {
            self.sent
                .lock()
                .unwrap()
                .push((text.to_string(), target.to_string(), muted));
            let ok = !self.failing_targets.iter().any(|t| t == target);
            async move { Ok(DeliveryAck { ok }) }
        }
    }

    // ── Fixtures ───────────────────────────────────────────────────

    fn reading(power: f64, total: f64) -> TelemetryReading {
        TelemetryReading {
            time: Utc::now(),
            voltage: 230.0,
            current: power / 230.0,
            power,
            apparent_power: power,
            reactive_power: 0.0,
            factor: 1.0,
            today: 0.0,
            yesterday: 0.0,
            total,
            temperature1: 30.0,
            total_start_time: String::new(),
            power1: if power > 0.0 { "ON" } else { "OFF" }.to_string(),
        }
    }

    /// First 10 samples 0 W, the incoming reading 800 W: the tick sees a
    /// quiet window with a fresh leading edge.
    fn startup_series() -> Vec<Sample> {
        let start = Utc::now() - Duration::seconds(110);
        (0..10)
            .map(|i| Sample::new(start + Duration::seconds(10 * i), 0.0, 10.0))
            .collect()
    }

    fn doc_with_targets(targets: &[(&str, Urgency)]) -> DeviceDocument {
        let mut doc = DeviceDocument::default();
        for record in [
            RecordKind::On,
            RecordKind::Off,
            RecordKind::Done,
            RecordKind::Running,
        ] {
            for (target, urgency) in targets {
                doc.record_mut(record)
                    .notification
                    .insert((*target).to_string(), *urgency);
            }
        }
        doc
    }

    // ── Tests ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn should_fire_on_notification_exactly_once() {
        let state = InMemoryState::with(doc_with_targets(&[("chat-1", Urgency::Muted)]));
        let notifier = ScriptedNotifier::reliable();
        let series = InMemorySeries::with(startup_series());
        let device = FakeDevice::with(vec![reading(800.0, 10.0)]);
        let service = MonitorService::new(device, series, &state, &notifier);

        let report = service.tick().await.unwrap();
        assert_eq!(report.regime, Regime::Starting);
        assert_eq!(report.notified, Some(TransitionEvent::On));
        assert!(state.snapshot().stats.on.last_sent.is_some());

        // Identical regime next tick: no duplicate announcement.
        let report = service.tick().await.unwrap();
        assert_eq!(report.notified, None);
        assert_eq!(notifier.attempts().len(), 1);
    }

    #[tokio::test]
    async fn should_retry_when_one_of_two_targets_fails() {
        // An appliance that ran for 40 minutes and now sits in standby:
        // every tick classifies Done until the announcement succeeds.
        let mut doc = doc_with_targets(&[("chat-1", Urgency::Muted), ("chat-2", Urgency::Alert)]);
        doc.stats
            .on
            .note_entry(Utc::now() - Duration::minutes(40), 10.0);
        let state = InMemoryState::with(doc);
        let notifier = ScriptedNotifier::failing(&["chat-2"]);

        let start = Utc::now() - Duration::seconds(110);
        let standby: Vec<Sample> = (0..10)
            .map(|i| Sample::new(start + Duration::seconds(10 * i), 3.0, 11.25))
            .collect();
        let series = InMemorySeries::with(standby);
        let device = FakeDevice::with(vec![reading(3.0, 11.25)]);
        let service = MonitorService::new(device, series, &state, &notifier);

        let report = service.tick().await.unwrap();
        assert_eq!(report.regime, Regime::Done);
        assert_eq!(report.notified, None);
        assert!(state.snapshot().stats.done.last_sent.is_none());

        // Identical regime next tick: both targets are retried.
        service.tick().await.unwrap();
        let attempts = notifier.attempts();
        assert_eq!(attempts.len(), 4);
        assert_eq!(attempts.iter().filter(|(_, t, _)| t == "chat-2").count(), 2);
    }

    #[tokio::test]
    async fn should_skip_suppressed_targets_and_respect_urgency() {
        let state = InMemoryState::with(doc_with_targets(&[
            ("chat-alert", Urgency::Alert),
            ("chat-muted", Urgency::Muted),
            ("chat-skip", Urgency::Skip),
        ]));
        let notifier = ScriptedNotifier::reliable();
        let series = InMemorySeries::with(startup_series());
        let device = FakeDevice::with(vec![reading(800.0, 10.0)]);
        let service = MonitorService::new(device, series, &state, &notifier);

        service.tick().await.unwrap();
        let attempts = notifier.attempts();
        assert_eq!(attempts.len(), 2);
        assert!(attempts.iter().any(|(_, t, muted)| t == "chat-alert" && !muted));
        assert!(attempts.iter().any(|(_, t, muted)| t == "chat-muted" && *muted));
        assert!(attempts.iter().all(|(_, t, _)| t != "chat-skip"));
    }

    #[tokio::test]
    async fn should_persist_document_even_without_transition() {
        let mut doc = DeviceDocument::default();
        doc.extra
            .insert("note".to_string(), serde_json::json!("hand-edited"));
        let state = InMemoryState::with(doc);
        let notifier = ScriptedNotifier::reliable();
        let series = InMemorySeries::default();
        let device = FakeDevice::with(vec![reading(0.0, 10.0)]);
        let service = MonitorService::new(device, series, &state, &notifier);

        let report = service.tick().await.unwrap();
        assert_eq!(report.regime, Regime::Off);
        assert_eq!(report.notified, None);
        // Hand-edited keys survive the cycle.
        assert_eq!(
            state.snapshot().extra.get("note"),
            Some(&serde_json::json!("hand-edited"))
        );
    }

    #[tokio::test]
    async fn should_propagate_unreachable_device() {
        let state = InMemoryState::with(DeviceDocument::default());
        let notifier = ScriptedNotifier::reliable();
        let series = InMemorySeries::default();
        let device = FakeDevice::with(Vec::new());
        let service = MonitorService::new(device, series, &state, &notifier);

        let result = service.tick().await;
        assert!(matches!(result, Err(PlugwatchError::Unreachable(_))));
    }

    #[tokio::test]
    async fn should_use_document_display_name_over_device_name() {
        let mut doc = doc_with_targets(&[("chat-1", Urgency::Muted)]);
        doc.device_name = Some("Kitchen Washer".to_string());
        let state = InMemoryState::with(doc);
        let notifier = ScriptedNotifier::reliable();
        let series = InMemorySeries::with(startup_series());
        let device = FakeDevice::with(vec![reading(800.0, 10.0)]);
        let service = MonitorService::new(device, series, &state, &notifier);

        service.tick().await.unwrap();
        let attempts = notifier.attempts();
        assert!(attempts[0].0.contains("Kitchen Washer"));
    }
}
