//! Two-phase calibration state machine.
//!
//! Calibrating: every cycle widens each channel's min/max with its filtered
//! value. The first cycle whose elapsed time exceeds the window switches to
//! Running and decides, once, which channels travelled far enough to be used.
//! Running is terminal: extrema are frozen from then on.

use crate::channel::{CHANNELS, PedalChannel};
use crate::config::CalibrationCfg;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SystemState {
    #[default]
    Calibrating,
    Running,
}

impl SystemState {
    pub const fn name(self) -> &'static str {
        match self {
            SystemState::Calibrating => "calibrating",
            SystemState::Running => "running",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CalibrationEngine {
    cfg: CalibrationCfg,
    state: SystemState,
}

impl CalibrationEngine {
    pub fn new(cfg: CalibrationCfg) -> Self {
        Self {
            cfg,
            state: SystemState::Calibrating,
        }
    }

    pub fn state(&self) -> SystemState {
        self.state
    }

    pub fn cfg(&self) -> &CalibrationCfg {
        &self.cfg
    }

    /// Back to the initial state for a new session (channels are reset by the owner).
    pub fn reset(&mut self) {
        self.state = SystemState::Calibrating;
    }

    /// Run one cycle of the engine.
    ///
    /// Returns `Some(calibrated flags)` on the single cycle that performs the
    /// Calibrating → Running transition, `None` otherwise.
    pub fn update(
        &mut self,
        channels: &mut [PedalChannel; CHANNELS],
        elapsed_ms: u64,
    ) -> Option<[bool; CHANNELS]> {
        if self.state == SystemState::Running {
            return None;
        }
        for ch in channels.iter_mut() {
            observe(ch);
        }
        if elapsed_ms > self.cfg.window_ms {
            self.state = SystemState::Running;
            let min_travel = self.cfg.min_travel;
            let flags = channels.each_mut().map(|ch| {
                ch.calibrated = ch.travel() > min_travel;
                ch.calibrated
            });
            return Some(flags);
        }
        None
    }
}

/// Widen the channel's extrema with its current filtered value.
#[inline]
pub fn observe(ch: &mut PedalChannel) {
    ch.min = ch.min.min(ch.filtered);
    ch.max = ch.max.max(ch.filtered);
}
