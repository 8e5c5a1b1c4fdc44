//! Backoff delay computation between polls.

use std::time::Duration;

use rand::Rng;

/// Computes the delay before poll `attempt + 1`.
///
/// The delay doubles from `min_delay` on every attempt until it would pass
/// `max_delay`, is jittered uniformly between `min_delay` and that value, and
/// never leaves less than `min_delay` of the remaining budget.
///
/// `attempt` starts at 1. Callers guarantee `remaining > min_delay`.
pub fn compute_delay(
    attempt: u32,
    min_delay: Duration,
    max_delay: Duration,
    remaining: Duration,
) -> Duration {
    let ceiling = attempt_ceiling(min_delay, max_delay);
    let mut delay = if attempt > ceiling {
        max_delay
    } else {
        // attempt <= ceiling keeps the shift well inside u32
        min_delay
            .saturating_mul(1u32 << attempt.saturating_sub(1))
            .min(max_delay)
    };

    if delay > min_delay {
        delay = jitter(min_delay, delay);
    }

    if remaining.saturating_sub(delay) <= min_delay {
        delay = remaining.saturating_sub(min_delay);
    }
    delay
}

/// Number of attempts after which the exponential growth reaches `max_delay`.
fn attempt_ceiling(min_delay: Duration, max_delay: Duration) -> u32 {
    if min_delay.is_zero() {
        return 0;
    }
    let ratio = max_delay.as_secs_f64() / min_delay.as_secs_f64();
    (ratio.log2().max(0.0) as u32).saturating_add(1).min(31)
}

fn jitter(low: Duration, high: Duration) -> Duration {
    let low_ms = low.as_millis() as u64;
    let high_ms = high.as_millis() as u64;
    if high_ms <= low_ms {
        return low;
    }
    Duration::from_millis(rand::rng().random_range(low_ms..=high_ms))
}
