use std::thread;
use std::time::{Duration, Instant};

/// Monotonic tick source for every cadence decision in the pedal loop.
///
/// - now(): monotonic Instant
/// - sleep(): blocking delay (settle waits, bursts, loop pacing); test clocks
///   advance virtual time instead
/// - ms_since(): elapsed milliseconds from an epoch Instant
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, d: Duration);

    /// Milliseconds elapsed since `epoch`, saturating at 0 on underflow.
    fn ms_since(&self, epoch: Instant) -> u64 {
        let ms = self.now().saturating_duration_since(epoch).as_millis();
        u64::try_from(ms).unwrap_or(u64::MAX)
    }
}

/// Real-time clock backed by `std::time::Instant`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    #[inline]
    fn sleep(&self, d: Duration) {
        if d.is_zero() {
            return;
        }
        thread::sleep(d);
    }
}

#[cfg(any(test, feature = "test-clock"))]
pub mod test_clock {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default)]
    struct State {
        offset: Duration,
        sleeps: Vec<Duration>,
    }

    /// Deterministic clock whose time only moves when told to.
    ///
    /// now() = origin + offset. sleep(d) advances the offset by d and records d,
    /// so tests can assert on the exact delay sequence a component issued.
    /// Clones share the same timeline.
    #[derive(Debug, Clone)]
    pub struct TestClock {
        origin: Instant,
        state: Arc<Mutex<State>>,
    }

    impl Default for TestClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TestClock {
        pub fn new() -> Self {
            Self {
                origin: Instant::now(),
                state: Arc::new(Mutex::new(State::default())),
            }
        }

        /// Advance the clock without recording a sleep.
        pub fn advance(&self, d: Duration) {
            if let Ok(mut s) = self.state.lock() {
                s.offset = s.offset.saturating_add(d);
            }
        }

        /// Milliseconds of virtual time elapsed since construction.
        pub fn elapsed_ms(&self) -> u64 {
            self.state
                .lock()
                .map(|s| s.offset.as_millis() as u64)
                .unwrap_or(0)
        }

        /// Every duration passed to `sleep`, oldest first.
        pub fn sleeps(&self) -> Vec<Duration> {
            self.state.lock().map(|s| s.sleeps.clone()).unwrap_or_default()
        }

        pub fn clear_sleeps(&self) {
            if let Ok(mut s) = self.state.lock() {
                s.sleeps.clear();
            }
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> Instant {
            let off = self.state.lock().map(|s| s.offset).unwrap_or(Duration::ZERO);
            self.origin + off
        }

        fn sleep(&self, d: Duration) {
            if let Ok(mut s) = self.state.lock() {
                s.offset = s.offset.saturating_add(d);
                s.sleeps.push(d);
            }
        }
    }
}
