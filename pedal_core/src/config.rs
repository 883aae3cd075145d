//! Runtime configuration for the pedal pipeline.
//!
//! These are the structs `PedalCore` consumes. They are separate from the
//! TOML-deserialized config in `pedal_config`; see `conversions` for the bridge.
//! Every `Default` is the stock firmware value.

use std::time::Duration;

use crate::channel::CHANNELS;

/// Integer EMA weights.
///
/// `filtered' = (filtered * history_weight + raw * sample_weight) / (history_weight + sample_weight)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterCfg {
    pub history_weight: u32,
    pub sample_weight: u32,
}

impl Default for FilterCfg {
    fn default() -> Self {
        Self {
            history_weight: 3,
            sample_weight: 1,
        }
    }
}

/// Channel Reader timings and input wiring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquisitionCfg {
    /// Front-end input number per pedal (Gas, Brake, Clutch).
    pub inputs: [u8; CHANNELS],
    /// Sample-and-hold charge time after reconfiguring the input.
    pub settle_ms: u64,
    /// Upper bound on one conversion; exceeding it yields a zero sample.
    pub conversion_timeout_ms: u64,
    /// Extra multiplexer settle time between consecutive channels.
    pub inter_channel_pause_ms: u64,
}

impl Default for AcquisitionCfg {
    fn default() -> Self {
        Self {
            inputs: [1, 4, 5],
            settle_ms: 1,
            conversion_timeout_ms: 10,
            inter_channel_pause_ms: 2,
        }
    }
}

impl AcquisitionCfg {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
    pub fn conversion_timeout(&self) -> Duration {
        Duration::from_millis(self.conversion_timeout_ms)
    }
    pub fn inter_channel_pause(&self) -> Duration {
        Duration::from_millis(self.inter_channel_pause_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationCfg {
    /// Travel is learned until elapsed time exceeds this.
    pub window_ms: u64,
    /// Usable only if `max - min` is strictly greater than this.
    pub min_travel: u16,
}

impl Default for CalibrationCfg {
    fn default() -> Self {
        Self {
            window_ms: 10_000,
            min_travel: 100,
        }
    }
}

/// Mapped values below `low` collapse to 0, above `high` to 255.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadzoneCfg {
    pub low: u8,
    pub high: u8,
}

impl Default for DeadzoneCfg {
    fn default() -> Self {
        Self { low: 5, high: 250 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportCfg {
    /// Minimum spacing between reports (~30 Hz by default).
    pub interval_ms: u64,
}

impl Default for ReportCfg {
    fn default() -> Self {
        Self { interval_ms: 33 }
    }
}

/// Status indicator cadences and bursts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCfg {
    pub calibrating_period_ms: u64,
    pub running_period_ms: u64,
    pub burst_toggles: u8,
    pub startup_burst_interval_ms: u64,
    pub transition_burst_interval_ms: u64,
    pub fault_blink_ms: u64,
}

impl Default for StatusCfg {
    fn default() -> Self {
        Self {
            calibrating_period_ms: 100,
            running_period_ms: 1000,
            burst_toggles: 6,
            startup_burst_interval_ms: 80,
            transition_burst_interval_ms: 50,
            fault_blink_ms: 50,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopCfg {
    /// End-of-iteration pacing delay; caps the loop near 20 Hz.
    pub pace_ms: u64,
}

impl Default for LoopCfg {
    fn default() -> Self {
        Self { pace_ms: 15 }
    }
}

/// Fixed per-channel wiring polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelCfg {
    pub inverted: [bool; CHANNELS],
}

impl Default for ChannelCfg {
    fn default() -> Self {
        Self {
            inverted: [true; CHANNELS],
        }
    }
}
