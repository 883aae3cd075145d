#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the pedal box.
//!
//! Every section is optional; an empty file yields the stock firmware timings
//! (10 s calibration window, 33 ms reports, 15 ms loop pacing). `Config::validate`
//! rejects combinations the pipeline cannot run with.
use serde::Deserialize;
use std::path::Path;

/// Number of pedal channels (Gas, Brake, Clutch). Fixed by the report layout.
pub const CHANNELS: usize = 3;

/// Largest 12-bit ADC reading.
pub const RAW_MAX: u16 = 4095;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Pins {
    /// Status LED GPIO (BCM numbering)
    pub led: u8,
    pub spi_bus: u8,
    pub spi_cs: u8,
    pub spi_clock_hz: u32,
    /// ADC input for each pedal, in Gas, Brake, Clutch order
    pub adc_channels: [u8; CHANNELS],
}

impl Default for Pins {
    fn default() -> Self {
        Self {
            led: 17,
            spi_bus: 0,
            spi_cs: 0,
            spi_clock_hz: 1_000_000,
            adc_channels: [1, 4, 5],
        }
    }
}

/// Integer EMA weights: filtered' = (filtered * history + raw * sample) / (history + sample).
#[derive(Debug, Deserialize)]
#[serde(default)]
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

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Acquisition {
    /// Wait after reconfiguring the input before starting a conversion
    pub settle_ms: u64,
    /// Max wait for one conversion; a timeout yields a zero sample
    pub conversion_timeout_ms: u64,
    /// Pause between consecutive channels of one acquisition
    pub inter_channel_pause_ms: u64,
}

impl Default for Acquisition {
    fn default() -> Self {
        Self {
            settle_ms: 1,
            conversion_timeout_ms: 10,
            inter_channel_pause_ms: 2,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CalibrationCfg {
    pub window_ms: u64,
    /// A channel is usable only if max - min exceeds this many raw counts
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

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DeadzoneCfg {
    pub low: u8,
    pub high: u8,
}

impl Default for DeadzoneCfg {
    fn default() -> Self {
        Self { low: 5, high: 250 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ReportCfg {
    pub interval_ms: u64,
    /// HID gadget device used by the hardware backend
    pub device: String,
}

impl Default for ReportCfg {
    fn default() -> Self {
        Self {
            interval_ms: 33,
            device: "/dev/hidg0".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StatusCfg {
    pub calibrating_period_ms: u64,
    pub running_period_ms: u64,
    /// Toggles in each of the startup and transition bursts
    pub burst_toggles: u8,
    pub startup_burst_interval_ms: u64,
    pub transition_burst_interval_ms: u64,
    /// Blink period of the fail-stop loop
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

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoopCfg {
    /// End-of-iteration delay
    pub pace_ms: u64,
}

impl Default for LoopCfg {
    fn default() -> Self {
        Self { pace_ms: 15 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Channels {
    /// Complement the mapped byte, per pedal in Gas, Brake, Clutch order
    pub inverted: [bool; CHANNELS],
}

impl Default for Channels {
    fn default() -> Self {
        Self {
            inverted: [true; CHANNELS],
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub pins: Pins,
    pub filter: FilterCfg,
    pub acquisition: Acquisition,
    pub calibration: CalibrationCfg,
    pub deadzone: DeadzoneCfg,
    pub report: ReportCfg,
    pub status: StatusCfg,
    #[serde(rename = "loop")]
    pub pacing: LoopCfg,
    pub channels: Channels,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse and validate a config file.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {}: {}", path.display(), e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("parse config {}: {}", path.display(), e))?;
    cfg.validate()?;
    Ok(cfg)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Filter
        if self.filter.sample_weight == 0 {
            eyre::bail!("filter.sample_weight must be >= 1");
        }
        // Keeps (filtered * history + raw * sample) well inside u32 for 12-bit inputs
        let weight_sum = self.filter.history_weight.saturating_add(self.filter.sample_weight);
        if weight_sum > 1024 {
            eyre::bail!("filter weights must sum to <= 1024, got {weight_sum}");
        }

        // Acquisition
        if self.acquisition.conversion_timeout_ms == 0 {
            eyre::bail!("acquisition.conversion_timeout_ms must be >= 1");
        }
        if self.acquisition.settle_ms > 1000 || self.acquisition.inter_channel_pause_ms > 1000 {
            eyre::bail!("acquisition delays are unreasonably large (>1s)");
        }

        // Calibration
        if self.calibration.min_travel >= RAW_MAX {
            eyre::bail!("calibration.min_travel must be < {RAW_MAX}");
        }
        if self.calibration.window_ms > 10 * 60 * 1000 {
            eyre::bail!("calibration.window_ms is unreasonably large (>10min)");
        }

        // Deadzone
        if self.deadzone.low >= self.deadzone.high {
            eyre::bail!(
                "deadzone.low ({}) must be < deadzone.high ({})",
                self.deadzone.low,
                self.deadzone.high
            );
        }

        // Report
        if self.report.interval_ms == 0 {
            eyre::bail!("report.interval_ms must be >= 1");
        }

        // Status
        if self.status.calibrating_period_ms == 0 || self.status.running_period_ms == 0 {
            eyre::bail!("status periods must be >= 1 ms");
        }
        if self.status.fault_blink_ms == 0 {
            eyre::bail!("status.fault_blink_ms must be >= 1");
        }

        // Loop
        if self.pacing.pace_ms == 0 {
            eyre::bail!("loop.pace_ms must be >= 1");
        }

        // Pins
        for (i, ch) in self.pins.adc_channels.iter().enumerate() {
            if *ch > 7 {
                eyre::bail!("pins.adc_channels[{i}] = {ch} is out of range (0..=7)");
            }
            if self.pins.adc_channels[..i].contains(ch) {
                eyre::bail!("pins.adc_channels has duplicate input {ch}");
            }
        }
        if self.pins.spi_clock_hz == 0 {
            eyre::bail!("pins.spi_clock_hz must be > 0");
        }

        // Logging
        if let Some(r) = self.logging.rotation.as_deref()
            && !matches!(r, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {r:?}");
        }

        Ok(())
    }
}
