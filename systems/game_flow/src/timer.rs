//! Round countdown driven by fixed ticks.

use std::time::Duration;

/// Outcome of feeding elapsed time into a [`Countdown`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CountdownProgress {
    /// Whole ticks consumed.
    pub ticks: u32,
    /// Whether the countdown reached zero during this call.
    pub expired: bool,
}

/// Countdown that decreases by a fixed interval per tick.
#[derive(Clone, Debug)]
pub struct Countdown {
    duration: Duration,
    interval: Duration,
    remaining: Duration,
    accumulator: Duration,
    running: bool,
}

impl Countdown {
    /// Creates a stopped countdown.
    #[must_use]
    pub const fn new(duration: Duration, interval: Duration) -> Self {
        Self {
            duration,
            interval,
            remaining: duration,
            accumulator: Duration::ZERO,
            running: false,
        }
    }

    /// Restores the starting value and starts counting.
    pub fn reset(&mut self) {
        self.remaining = self.duration;
        self.accumulator = Duration::ZERO;
        self.running = true;
    }

    /// Snaps the countdown to zero and stops it.
    pub fn stop(&mut self) {
        self.remaining = Duration::ZERO;
        self.accumulator = Duration::ZERO;
        self.running = false;
    }

    /// Time left on the countdown.
    #[must_use]
    pub const fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Reports whether the countdown is still running.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Applies a single tick. Returns `true` when the tick exhausted the countdown.
    ///
    /// Once less than one interval remains the countdown stops at zero.
    pub fn update(&mut self) -> bool {
        if !self.running {
            return false;
        }

        self.remaining = self.remaining.saturating_sub(self.interval);
        if self.remaining < self.interval {
            self.stop();
            return true;
        }

        false
    }

    /// Converts elapsed time into whole ticks.
    ///
    /// Leftover time below one interval is carried into the next call.
    pub fn advance(&mut self, dt: Duration) -> CountdownProgress {
        let mut progress = CountdownProgress::default();
        if !self.running || self.interval.is_zero() {
            return progress;
        }

        self.accumulator = self.accumulator.saturating_add(dt);
        while self.accumulator >= self.interval {
            self.accumulator -= self.interval;
            progress.ticks = progress.ticks.saturating_add(1);
            if self.update() {
                progress.expired = true;
                break;
            }
        }

        progress
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(100);

    #[test]
    fn expires_after_duration_worth_of_ticks() {
        let mut countdown = Countdown::new(Duration::from_secs(1), TICK);
        countdown.reset();

        let expirations: Vec<bool> = (0..10).map(|_| countdown.update()).collect();
        assert!(expirations[..9].iter().all(|expired| !expired));
        assert!(expirations[9]);
        assert_eq!(countdown.remaining(), Duration::ZERO);
        assert!(!countdown.is_running());
    }

    #[test]
    fn partial_ticks_carry_over() {
        let mut countdown = Countdown::new(Duration::from_secs(1), TICK);
        countdown.reset();

        assert_eq!(countdown.advance(Duration::from_millis(150)).ticks, 1);
        assert_eq!(countdown.advance(Duration::from_millis(50)).ticks, 1);
        assert_eq!(countdown.remaining(), Duration::from_millis(800));
    }

    #[test]
    fn large_step_stops_at_expiry() {
        let mut countdown = Countdown::new(Duration::from_millis(550), TICK);
        countdown.reset();

        let progress = countdown.advance(Duration::from_secs(5));
        assert!(progress.expired);
        assert_eq!(progress.ticks, 5);
        assert_eq!(countdown.advance(Duration::from_secs(1)), CountdownProgress::default());
    }

    #[test]
    fn stopped_countdown_ignores_time() {
        let mut countdown = Countdown::new(Duration::from_secs(1), TICK);
        assert!(!countdown.update());
        assert_eq!(countdown.advance(TICK).ticks, 0);
    }
}
