//! Exponential backoff with jitter.

use std::time::Duration;

use rand::Rng;

/// Default base delay between attempts.
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_secs(5);

/// Default upper bound on a delay.
pub const DEFAULT_BACKOFF_MAX: Duration = Duration::from_secs(15 * 60);

/// Jittered exponential retry timer.
///
/// Every failed attempt doubles the sampling window, bounded by `max`;
/// the actual delay is drawn uniformly from the window to spread
/// reconnecting clients out:
/// <https://www.awsarchitectureblog.com/2015/03/backoff.html>
#[derive(Debug, Clone)]
pub struct Backoff {
    attempts: u32,
    base: Duration,
    max: Duration,
}

impl Backoff {
    /// Create a backoff timer with the given base and bound.
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            attempts: 0,
            base,
            max,
        }
    }

    /// Record a failed attempt and sample the delay before the next one.
    pub fn next(&mut self) -> Duration {
        self.attempts = self.attempts.saturating_add(1);

        let max_ms = self.max.as_millis() as u64;
        let base_ms = self.base.as_millis() as u64;
        // bit-shift overflow clamps straight to the bound
        let bound_ms = 1u64
            .checked_shl(self.attempts)
            .and_then(|factor| base_ms.checked_mul(factor))
            .map_or(max_ms, |ms| ms.min(max_ms));

        if bound_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..bound_ms))
    }

    /// Forget accumulated attempts after a successful connection.
    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    /// Number of consecutive failed attempts recorded so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(DEFAULT_BACKOFF_BASE, DEFAULT_BACKOFF_MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_double_per_attempt() {
        let mut backoff = Backoff::new(Duration::from_secs(5), Duration::from_secs(900));
        for expected_bound in [10u64, 20, 40] {
            let delay = backoff.next();
            assert!(
                delay < Duration::from_secs(expected_bound),
                "{delay:?} outside [0, {expected_bound}s)"
            );
        }
        assert_eq!(backoff.attempts(), 3);
    }

    #[test]
    fn window_is_clamped_to_max() {
        let mut backoff = Backoff::new(Duration::from_secs(5), Duration::from_secs(30));
        for _ in 0..10 {
            let delay = backoff.next();
            assert!(delay < Duration::from_secs(30));
        }
    }

    #[test]
    fn shift_overflow_clamps_to_max() {
        let mut backoff = Backoff::new(Duration::from_secs(5), Duration::from_secs(30));
        for _ in 0..100 {
            backoff.next();
        }
        // attempts far beyond the shiftable range still sample below max
        let delay = backoff.next();
        assert!(delay < Duration::from_secs(30));
    }

    #[test]
    fn reset_zeroes_attempts() {
        let mut backoff = Backoff::default();
        backoff.next();
        backoff.next();
        assert_eq!(backoff.attempts(), 2);
        backoff.reset();
        assert_eq!(backoff.attempts(), 0);
        // window restarts at the first doubling
        let delay = backoff.next();
        assert!(delay < Duration::from_secs(10));
    }

    #[test]
    fn zero_base_yields_zero_delay() {
        let mut backoff = Backoff::new(Duration::ZERO, Duration::from_secs(30));
        assert_eq!(backoff.next(), Duration::ZERO);
    }
}
