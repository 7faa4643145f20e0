//! Re-remind backoff schedule.
//!
//! Once an appliance is done, reminders go out on a growing Fibonacci
//! schedule until a state change acknowledges them. The wait never drops
//! below five minutes, so the first few reminders are evenly paced and
//! later ones spread out.

use chrono::Duration;

/// Minimum wait between reminders, in seconds.
pub const MIN_REMIND_SECS: i64 = 300;

/// The standard Fibonacci sequence, 1-based: `fib(0) = fib(1) = 1`.
///
/// Saturates instead of overflowing; the schedule only ever needs small `n`.
#[must_use]
pub fn fib(n: u32) -> u64 {
    let (mut a, mut b) = (1_u64, 1_u64);
    for _ in 0..n {
        let next = a.saturating_add(b);
        a = b;
        b = next;
    }
    a
}

/// Wait before reminder number `counter + 1`: `fib(counter)` seconds,
/// floored at [`MIN_REMIND_SECS`].
#[must_use]
pub fn re_remind_wait(counter: u32) -> Duration {
    let secs = i64::try_from(fib(counter)).unwrap_or(i64::MAX);
    Duration::seconds(secs.max(MIN_REMIND_SECS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_match_standard_fibonacci_sequence() {
        let expected = [1, 1, 2, 3, 5, 8, 13, 21, 34, 55];
        for (n, want) in expected.into_iter().enumerate() {
            assert_eq!(fib(u32::try_from(n).unwrap()), want, "fib({n})");
        }
    }

    #[test]
    fn should_saturate_for_large_n() {
        assert_eq!(fib(1000), u64::MAX);
    }

    #[test]
    fn should_floor_wait_at_five_minutes() {
        for counter in 0..=12 {
            assert_eq!(re_remind_wait(counter), Duration::seconds(300));
        }
        // fib(13) = 377 > 300
        assert_eq!(re_remind_wait(13), Duration::seconds(377));
    }

    #[test]
    fn should_produce_non_decreasing_waits() {
        let mut previous = Duration::zero();
        for counter in 0..20 {
            let wait = re_remind_wait(counter);
            assert!(wait >= previous);
            assert!(wait >= Duration::seconds(MIN_REMIND_SECS));
            previous = wait;
        }
    }
}
