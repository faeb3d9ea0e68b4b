//! Monotonic time sources
//!
//! Every timestamp in a trial (sample stamps, window start, decision time,
//! tracker ticks) must come from the same clock. `MonotonicClock` shares a
//! single process epoch, so any two instances agree.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

/// Process-wide epoch, fixed on first use
static EPOCH: OnceLock<Instant> = OnceLock::new();

/// A monotonic seconds clock that can also suspend the caller
pub trait Clock {
    /// Seconds since the clock's epoch
    fn now(&self) -> f64;

    /// Suspend for `dur` (simulated clocks just advance)
    fn sleep(&self, dur: Duration);
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> f64 {
        (**self).now()
    }

    fn sleep(&self, dur: Duration) {
        (**self).sleep(dur)
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> f64 {
        (**self).now()
    }

    fn sleep(&self, dur: Duration) {
        (**self).sleep(dur)
    }
}

/// Real clock backed by `Instant`
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl MonotonicClock {
    pub fn new() -> Self {
        Self
    }

    /// Seconds since the process epoch
    pub fn seconds() -> f64 {
        EPOCH.get_or_init(Instant::now).elapsed().as_secs_f64()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> f64 {
        Self::seconds()
    }

    fn sleep(&self, dur: Duration) {
        std::thread::sleep(dur);
    }
}

/// Deterministic clock: time only moves when someone sleeps or advances it.
/// Thread-safe so a producer thread can stamp samples against it.
#[derive(Debug, Default)]
pub struct SimulatedClock {
    nanos: AtomicU64,
}

impl SimulatedClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start at an arbitrary time (seconds)
    pub fn starting_at(secs: f64) -> Self {
        let clock = Self::new();
        clock.set(secs);
        clock
    }

    pub fn set(&self, secs: f64) {
        self.nanos
            .store((secs.max(0.0) * 1e9).round() as u64, Ordering::SeqCst);
    }

    pub fn advance(&self, dur: Duration) {
        self.nanos
            .fetch_add(dur.as_nanos() as u64, Ordering::SeqCst);
    }
}

impl Clock for SimulatedClock {
    fn now(&self) -> f64 {
        self.nanos.load(Ordering::SeqCst) as f64 / 1e9
    }

    fn sleep(&self, dur: Duration) {
        self.advance(dur);
    }
}
