use std::cell::Cell;
use std::time::{Duration, Instant};

/// Monotonic time source polled by the search loop between simulations.
pub trait Clock {
    /// Time since an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self { Self { origin: Instant::now() } }
}

impl Default for SystemClock {
    fn default() -> Self { Self::new() }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration { self.origin.elapsed() }
}

/// Deterministic clock: every reading returns the current time and then
/// advances it by `tick`.
///
/// The search reads the clock once when it starts and once before each
/// simulation, so a budget of `(k + 1) * tick` runs exactly `k` simulations.
#[derive(Debug, Clone)]
pub struct StepClock {
    tick: Duration,
    now: Cell<Duration>,
}

impl StepClock {
    pub fn new(tick: Duration) -> Self { Self { tick, now: Cell::new(Duration::ZERO) } }

    /// Clock and budget that allow exactly `simulations` simulations per search.
    pub fn for_simulations(simulations: u32) -> (Self, Duration) {
        let tick = Duration::from_millis(1);
        (Self::new(tick), tick * (simulations + 1))
    }

    pub fn tick(&self) -> Duration { self.tick }
}

impl Clock for StepClock {
    fn now(&self) -> Duration {
        let t = self.now.get();
        self.now.set(t + self.tick);
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_clock_advances_per_reading() {
        let clock = StepClock::new(Duration::from_millis(5));
        assert_eq!(clock.now(), Duration::ZERO);
        assert_eq!(clock.now(), Duration::from_millis(5));
        assert_eq!(clock.now(), Duration::from_millis(10));
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
