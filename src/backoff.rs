//! Exponential-delay helper used by the coordinator when it has nothing to
//! do. Mirrors the spin/yield/sleep progression this crate's lineage uses
//! elsewhere (compare `simple_latch`'s spin-yield wait path in the scheduler
//! library this codebase grew out of), but adds the sleep-doubling-to-a-cap
//! behavior the coordinator needs when polling an otherwise-empty queue.

use std::time::Duration;

/// The cap used throughout the coordinator.
pub const DEFAULT_CAP: Duration = Duration::from_millis(10);

/// An exponential backoff with a hard cap and a running total for
/// diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    current: Duration,
    cap: Duration,
    total_wait: Duration,
}

impl Backoff {
    /// A fresh backoff seeded at zero delay.
    pub fn new(cap: Duration) -> Self {
        Self {
            current: Duration::ZERO,
            cap,
            total_wait: Duration::ZERO,
        }
    }

    pub fn cap(&self) -> Duration {
        self.cap
    }

    pub fn total_wait(&self) -> Duration {
        self.total_wait
    }

    /// Perform one step. The first call (after construction, or after a
    /// reset) just yields the thread; every call after that sleeps the
    /// current delay and doubles it, up to `cap`.
    pub fn step(mut self) -> Self {
        if self.current.is_zero() {
            std::thread::yield_now();
            self.current = Duration::from_millis(1);
        } else {
            std::thread::sleep(self.current);
            self.total_wait += self.current;
            self.current = std::cmp::min(self.cap, self.current * 2);
        }
        self
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(DEFAULT_CAP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_step_does_not_sleep_and_sets_current_to_one_ms() {
        let b = Backoff::new(DEFAULT_CAP);
        assert_eq!(b.total_wait(), Duration::ZERO);
        let b = b.step();
        // first step never contributes to total_wait
        assert_eq!(b.total_wait(), Duration::ZERO);
    }

    #[test]
    fn current_doubles_up_to_cap() {
        let cap = Duration::from_millis(4);
        let mut b = Backoff::new(cap);
        b = b.step(); // current: 0 -> 1ms, no sleep
        b = b.step(); // sleeps 1ms, current -> 2ms
        b = b.step(); // sleeps 2ms, current -> 4ms (== cap)
        b = b.step(); // sleeps 4ms, current stays capped at 4ms
        assert_eq!(b.total_wait(), Duration::from_millis(1 + 2 + 4));
    }

    #[test]
    fn reset_forgets_accumulated_delay_but_keeps_cap() {
        let mut b = Backoff::new(Duration::from_millis(10));
        b = b.step();
        b = b.step();
        let cap = b.cap();
        let reset = Backoff::new(cap);
        assert_eq!(reset.total_wait(), Duration::ZERO);
        assert_eq!(reset.cap(), cap);
    }
}
