//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp used for sample times, transition entries, and send times.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Sentinel for "never happened" when comparing optional timestamps.
///
/// A missing entry or send time compares as older than any real timestamp,
/// which is exactly what the transition guards need.
#[must_use]
pub fn or_min(ts: Option<Timestamp>) -> Timestamp {
    ts.unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// The later of two optional timestamps; `None` only when both are `None`.
#[must_use]
pub fn latest(a: Option<Timestamp>, b: Option<Timestamp>) -> Option<Timestamp> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (Some(t), None) | (None, Some(t)) => Some(t),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_return_current_utc_time() {
        let before = Utc::now();
        let ts = now();
        let after = Utc::now();
        assert!(ts >= before);
        assert!(ts <= after);
    }

    #[test]
    fn should_treat_none_as_older_than_any_timestamp() {
        assert!(or_min(None) < now());
        let ts = now();
        assert_eq!(or_min(Some(ts)), ts);
    }

    #[test]
    fn should_pick_latest_of_two_timestamps() {
        let a = now();
        let b = a + chrono::Duration::seconds(10);
        assert_eq!(latest(Some(a), Some(b)), Some(b));
        assert_eq!(latest(None, Some(a)), Some(a));
        assert_eq!(latest(Some(a), None), Some(a));
        assert_eq!(latest(None, None), None);
    }
}
