//! Per-iteration status and session counters.

use crate::channel::CHANNELS;
use crate::report::Emission;

/// What one pass of the loop did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// Still learning travel; nothing mapped or reported.
    Calibrating,
    /// This pass closed the calibration window. Mapping and reporting already
    /// ran for it, so `emission` is usually a sent report.
    Calibrated {
        calibrated: [bool; CHANNELS],
        emission: Emission,
    },
    /// Steady state.
    Running { emission: Emission },
}

impl StepStatus {
    pub fn emission(&self) -> Emission {
        match self {
            StepStatus::Calibrating => Emission::Idle,
            StepStatus::Calibrated { emission, .. } | StepStatus::Running { emission } => *emission,
        }
    }
}

/// Diagnostic counters for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoopStats {
    pub iterations: u64,
    pub reports_sent: u64,
    pub reports_dropped: u64,
    pub conversion_failures: u64,
    pub led_failures: u64,
}
