//! `From` implementations bridging `pedal_config` types to `pedal_core` types.
//!
//! These keep the CLI free of field-by-field mapping.

use crate::builder::PipelineCfg;
use crate::config::{
    AcquisitionCfg, CalibrationCfg, ChannelCfg, DeadzoneCfg, FilterCfg, LoopCfg, ReportCfg,
    StatusCfg,
};

// ── FilterCfg ────────────────────────────────────────────────────────────────

impl From<&pedal_config::FilterCfg> for FilterCfg {
    fn from(c: &pedal_config::FilterCfg) -> Self {
        Self {
            history_weight: c.history_weight,
            sample_weight: c.sample_weight,
        }
    }
}

// ── AcquisitionCfg ───────────────────────────────────────────────────────────

/// Input wiring lives under `[pins]`, timings under `[acquisition]`.
impl From<&pedal_config::Config> for AcquisitionCfg {
    fn from(c: &pedal_config::Config) -> Self {
        Self {
            inputs: c.pins.adc_channels,
            settle_ms: c.acquisition.settle_ms,
            conversion_timeout_ms: c.acquisition.conversion_timeout_ms,
            inter_channel_pause_ms: c.acquisition.inter_channel_pause_ms,
        }
    }
}

// ── CalibrationCfg / DeadzoneCfg ─────────────────────────────────────────────

impl From<&pedal_config::CalibrationCfg> for CalibrationCfg {
    fn from(c: &pedal_config::CalibrationCfg) -> Self {
        Self {
            window_ms: c.window_ms,
            min_travel: c.min_travel,
        }
    }
}

impl From<&pedal_config::DeadzoneCfg> for DeadzoneCfg {
    fn from(c: &pedal_config::DeadzoneCfg) -> Self {
        Self {
            low: c.low,
            high: c.high,
        }
    }
}

// ── ReportCfg / StatusCfg / LoopCfg ──────────────────────────────────────────

impl From<&pedal_config::ReportCfg> for ReportCfg {
    fn from(c: &pedal_config::ReportCfg) -> Self {
        Self {
            interval_ms: c.interval_ms,
        }
    }
}

impl From<&pedal_config::StatusCfg> for StatusCfg {
    fn from(c: &pedal_config::StatusCfg) -> Self {
        Self {
            calibrating_period_ms: c.calibrating_period_ms,
            running_period_ms: c.running_period_ms,
            burst_toggles: c.burst_toggles,
            startup_burst_interval_ms: c.startup_burst_interval_ms,
            transition_burst_interval_ms: c.transition_burst_interval_ms,
            fault_blink_ms: c.fault_blink_ms,
        }
    }
}

impl From<&pedal_config::LoopCfg> for LoopCfg {
    fn from(c: &pedal_config::LoopCfg) -> Self {
        Self { pace_ms: c.pace_ms }
    }
}

impl From<&pedal_config::Channels> for ChannelCfg {
    fn from(c: &pedal_config::Channels) -> Self {
        Self {
            inverted: c.inverted,
        }
    }
}

// ── PipelineCfg ──────────────────────────────────────────────────────────────

impl From<&pedal_config::Config> for PipelineCfg {
    fn from(c: &pedal_config::Config) -> Self {
        Self {
            filter: FilterCfg::from(&c.filter),
            acquisition: AcquisitionCfg::from(c),
            calibration: CalibrationCfg::from(&c.calibration),
            deadzone: DeadzoneCfg::from(&c.deadzone),
            report: ReportCfg::from(&c.report),
            status: StatusCfg::from(&c.status),
            pacing: LoopCfg::from(&c.pacing),
            channels: ChannelCfg::from(&c.channels),
        }
    }
}
