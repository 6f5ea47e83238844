//! Bounded exponential reconnect delay.

use std::time::Duration;

use crate::config::ReconnectConfig;

/// Reconnect delay generator.
///
/// [`next_delay`](Backoff::next_delay) returns the current delay and grows it
/// for the next call, capped at the configured maximum.
/// [`reset`](Backoff::reset) goes back to the initial delay after a
/// successful connect.
#[derive(Debug, Clone)]
pub struct Backoff {
    config: ReconnectConfig,
    current: Duration,
    failures: u32,
}

impl Backoff {
    pub fn new(config: ReconnectConfig) -> Self {
        let current = config.initial_delay.min(config.max_delay);
        Self {
            config,
            current,
            failures: 0,
        }
    }

    /// Delay the next call to [`next_delay`](Backoff::next_delay) will return.
    pub fn current(&self) -> Duration {
        self.current
    }

    /// Number of delays handed out since the last reset.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = self.grow(delay);
        self.failures = self.failures.saturating_add(1);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.config.initial_delay.min(self.config.max_delay);
        self.failures = 0;
    }

    fn grow(&self, delay: Duration) -> Duration {
        let max = self.config.max_delay;
        let multiplier = self.config.multiplier.max(1.0);
        let nanos = (delay.as_nanos() as f64 * multiplier).round();

        if !nanos.is_finite() || nanos >= max.as_nanos() as f64 {
            max
        } else {
            Duration::from_nanos(nanos as u64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(initial_ms: u64, max_ms: u64, multiplier: f64) -> ReconnectConfig {
        ReconnectConfig {
            initial_delay: Duration::from_millis(initial_ms),
            max_delay: Duration::from_millis(max_ms),
            multiplier,
        }
    }

    #[test]
    fn test_backoff_doubles_until_capped() {
        let mut backoff = Backoff::new(config(1000, 30_000, 2.0));
        let delays: Vec<u64> = (0..7)
            .map(|_| backoff.next_delay().as_millis() as u64)
            .collect();

        assert_eq!(delays, vec![1000, 2000, 4000, 8000, 16_000, 30_000, 30_000]);
        assert_eq!(backoff.failures(), 7);
    }

    #[test]
    fn test_backoff_is_non_decreasing_and_bounded() {
        let mut backoff = Backoff::new(config(70, 1000, 1.7));
        let mut previous = Duration::ZERO;
        for _ in 0..50 {
            let delay = backoff.next_delay();
            assert!(delay >= previous);
            assert!(delay <= Duration::from_millis(1000));
            previous = delay;
        }
        assert_eq!(previous, Duration::from_millis(1000));
    }

    #[test]
    fn test_backoff_reset_returns_to_initial() {
        let mut backoff = Backoff::new(config(100, 1000, 2.0));
        backoff.next_delay();
        backoff.next_delay();
        assert_eq!(backoff.current(), Duration::from_millis(400));

        backoff.reset();
        assert_eq!(backoff.current(), Duration::from_millis(100));
        assert_eq!(backoff.failures(), 0);
        assert_eq!(backoff.next_delay(), Duration::from_millis(100));
    }

    #[test]
    fn test_multiplier_below_one_keeps_delay_constant() {
        let mut backoff = Backoff::new(config(250, 1000, 0.5));
        assert_eq!(backoff.next_delay(), Duration::from_millis(250));
        assert_eq!(backoff.next_delay(), Duration::from_millis(250));
    }

    #[test]
    fn test_initial_delay_above_max_is_clamped() {
        let mut backoff = Backoff::new(config(5000, 1000, 2.0));
        assert_eq!(backoff.next_delay(), Duration::from_millis(1000));
    }

    #[test]
    fn test_huge_multiplier_saturates_at_max() {
        let mut backoff = Backoff::new(config(1, 60_000, f64::MAX));
        backoff.next_delay();
        assert_eq!(backoff.next_delay(), Duration::from_millis(60_000));
    }
}
