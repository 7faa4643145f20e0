//! Human-readable formatting for notification texts.

use chrono::Duration;

/// Format a duration as `"2h 05m"` / `"14m"` / `"45s"`.
///
/// Negative durations (clock skew between device and host) render as zero.
#[must_use]
pub fn human_duration(duration: Duration) -> String {
    let total_secs = duration.num_seconds().max(0);
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{hours}h {minutes:02}m")
    } else if minutes > 0 {
        format!("{minutes}m")
    } else {
        format!("{seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_format_hours_and_minutes() {
        assert_eq!(human_duration(Duration::seconds(2 * 3600 + 5 * 60)), "2h 05m");
    }

    #[test]
    fn should_format_minutes_only() {
        assert_eq!(human_duration(Duration::seconds(14 * 60 + 59)), "14m");
    }

    #[test]
    fn should_format_seconds_only() {
        assert_eq!(human_duration(Duration::seconds(45)), "45s");
    }

    #[test]
    fn should_clamp_negative_durations_to_zero() {
        assert_eq!(human_duration(Duration::seconds(-30)), "0s");
    }
}
