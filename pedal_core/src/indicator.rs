//! Status Indicator: a diagnostic blink whose rate tells the machine state.
//!
//! It reads the state but never feeds anything back into the data path.
//! Toggle failures are counted and otherwise ignored.

use std::time::Duration;

use pedal_traits::{Clock, StatusLed};
use tracing::trace;

use crate::calibration::SystemState;
use crate::config::StatusCfg;

#[derive(Debug, Clone)]
pub struct StatusIndicator {
    cfg: StatusCfg,
    last_toggle_ms: u64,
    failures: u64,
}

impl StatusIndicator {
    pub fn new(cfg: StatusCfg) -> Self {
        Self {
            cfg,
            last_toggle_ms: 0,
            failures: 0,
        }
    }

    pub fn cfg(&self) -> &StatusCfg {
        &self.cfg
    }

    pub fn reset(&mut self) {
        self.last_toggle_ms = 0;
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }

    pub fn period_ms(&self, state: SystemState) -> u64 {
        match state {
            SystemState::Calibrating => self.cfg.calibrating_period_ms,
            SystemState::Running => self.cfg.running_period_ms,
        }
    }

    /// Toggle if the state's period has elapsed since the last steady-state toggle.
    pub fn tick<L: StatusLed>(&mut self, now_ms: u64, state: SystemState, led: &mut L) -> bool {
        if now_ms.saturating_sub(self.last_toggle_ms) < self.period_ms(state) {
            return false;
        }
        self.last_toggle_ms = now_ms;
        self.toggle(led);
        true
    }

    /// Blocking burst: `burst_toggles` toggles, `interval_ms` after each.
    /// Does not touch the steady-state cadence.
    pub fn burst<L: StatusLed>(&mut self, led: &mut L, clock: &dyn Clock, interval_ms: u64) {
        let interval = Duration::from_millis(interval_ms);
        for _ in 0..self.cfg.burst_toggles {
            self.toggle(led);
            clock.sleep(interval);
        }
    }

    pub fn startup_burst<L: StatusLed>(&mut self, led: &mut L, clock: &dyn Clock) {
        self.burst(led, clock, self.cfg.startup_burst_interval_ms);
    }

    pub fn transition_burst<L: StatusLed>(&mut self, led: &mut L, clock: &dyn Clock) {
        self.burst(led, clock, self.cfg.transition_burst_interval_ms);
    }

    fn toggle<L: StatusLed>(&mut self, led: &mut L) {
        if let Err(e) = led.toggle() {
            self.failures = self.failures.saturating_add(1);
            trace!(error = %e, "status led toggle failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::CountingLed;
    use pedal_traits::clock::test_clock::TestClock;

    #[test]
    fn cadence_follows_state() {
        let mut ind = StatusIndicator::new(StatusCfg::default());
        let mut led = CountingLed::new();
        assert!(!ind.tick(99, SystemState::Calibrating, &mut led));
        assert!(ind.tick(100, SystemState::Calibrating, &mut led));
        assert!(ind.tick(200, SystemState::Calibrating, &mut led));
        assert!(!ind.tick(1100, SystemState::Running, &mut led));
        assert!(ind.tick(1200, SystemState::Running, &mut led));
        assert!(!ind.tick(2199, SystemState::Running, &mut led));
        assert_eq!(led.handle().toggles(), 3);
    }

    #[test]
    fn burst_toggles_and_sleeps_fixed_count() {
        let mut ind = StatusIndicator::new(StatusCfg::default());
        let mut led = CountingLed::new();
        let clock = TestClock::new();
        ind.startup_burst(&mut led, &clock);
        assert_eq!(led.handle().toggles(), 6);
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(80); 6]);
        assert_eq!(clock.elapsed_ms(), 480);
    }

    #[test]
    fn toggle_failures_are_counted() {
        let mut ind = StatusIndicator::new(StatusCfg::default());
        let mut led = CountingLed::failing();
        assert!(ind.tick(100, SystemState::Calibrating, &mut led));
        assert_eq!(ind.failures(), 1);
    }
}
