//! Pedal hardware backends.
//!
//! The simulated backend is always available and is what the default CLI build
//! runs. The `hardware` feature adds the Raspberry Pi class implementations:
//! an MCP3208 SPI ADC front-end and a GPIO status LED. The HID gadget sink is
//! plain file I/O and is always built.
pub mod error;
pub mod hidg;
pub mod util;

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod mcp3208;

use std::time::Duration;

use pedal_traits::{AnalogFrontEnd, BoxError, ReportSink, SamplingTime, StatusLed};
use tracing::{debug, trace};

use crate::error::HwError;
use crate::util::{MAX_CHANNEL, SAMPLE_MASK};

/// Triangle-wave travel of one simulated potentiometer.
#[derive(Debug, Clone, Copy)]
pub struct SweepProfile {
    pub lo: u16,
    pub hi: u16,
    /// Conversions for one full lo → hi → lo cycle.
    pub period: u32,
}

impl SweepProfile {
    pub const fn new(lo: u16, hi: u16, period: u32) -> Self {
        Self { lo, hi, period }
    }

    /// A pedal that never moves.
    pub const fn fixed(value: u16) -> Self {
        Self {
            lo: value,
            hi: value,
            period: 1,
        }
    }

    fn sample(&self, n: u32) -> u16 {
        let period = self.period.max(2);
        let half = period / 2;
        let phase = n % period;
        let pos = if phase <= half { phase } else { period - phase };
        let span = u32::from(self.hi.saturating_sub(self.lo));
        let v = u32::from(self.lo) + span * pos / half;
        (v as u16) & SAMPLE_MASK
    }
}

/// Simulated 8-input ADC; every input sweeps its own profile.
///
/// `timeout_every` injects a conversion timeout on every n-th conversion to
/// exercise the zero-sample path.
pub struct SimulatedFrontEnd {
    profiles: [SweepProfile; (MAX_CHANNEL as usize) + 1],
    counts: [u32; (MAX_CHANNEL as usize) + 1],
    selected: Option<u8>,
    started: bool,
    conversions: u64,
    timeout_every: Option<u64>,
}

impl Default for SimulatedFrontEnd {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedFrontEnd {
    /// Default wiring matches the stock pedal set on inputs 1, 4 and 5.
    pub fn new() -> Self {
        let mut profiles = [SweepProfile::fixed(2048); (MAX_CHANNEL as usize) + 1];
        profiles[1] = SweepProfile::new(820, 3310, 120);
        profiles[4] = SweepProfile::new(640, 3480, 90);
        profiles[5] = SweepProfile::new(910, 2990, 150);
        Self {
            profiles,
            counts: [0; (MAX_CHANNEL as usize) + 1],
            selected: None,
            started: false,
            conversions: 0,
            timeout_every: None,
        }
    }

    pub fn with_profile(mut self, channel: u8, profile: SweepProfile) -> Self {
        self.profiles[usize::from(channel & MAX_CHANNEL)] = profile;
        self
    }

    pub fn with_timeout_every(mut self, n: u64) -> Self {
        self.timeout_every = (n > 0).then_some(n);
        self
    }

    pub fn conversions(&self) -> u64 {
        self.conversions
    }
}

impl AnalogFrontEnd for SimulatedFrontEnd {
    fn configure(&mut self, channel: u8, sampling_time: SamplingTime) -> Result<(), BoxError> {
        if channel > MAX_CHANNEL {
            return Err(Box::new(HwError::Spi(format!(
                "adc input {channel} out of range (0..={MAX_CHANNEL})"
            ))));
        }
        trace!(channel, ?sampling_time, "sim adc configure");
        self.selected = Some(channel);
        Ok(())
    }

    fn start(&mut self) -> Result<(), BoxError> {
        if self.selected.is_none() {
            return Err(Box::new(HwError::ConversionNotStarted));
        }
        self.started = true;
        Ok(())
    }

    fn poll(&mut self, _timeout: Duration) -> Result<u16, BoxError> {
        let ch = match (self.started, self.selected) {
            (true, Some(ch)) => usize::from(ch),
            _ => return Err(Box::new(HwError::ConversionNotStarted)),
        };
        self.started = false;
        self.conversions += 1;
        if let Some(n) = self.timeout_every
            && self.conversions % n == 0
        {
            debug!(channel = ch, "sim adc injected timeout");
            return Err(Box::new(HwError::Timeout));
        }
        let v = self.profiles[ch].sample(self.counts[ch]);
        self.counts[ch] = self.counts[ch].wrapping_add(1);
        Ok(v)
    }

    fn stop(&mut self) -> Result<(), BoxError> {
        self.started = false;
        Ok(())
    }
}

/// Simulated status LED; tracks level and toggle count.
#[derive(Debug, Default)]
pub struct SimulatedLed {
    on: bool,
    toggles: u64,
}

impl SimulatedLed {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn is_on(&self) -> bool {
        self.on
    }
    pub fn toggles(&self) -> u64 {
        self.toggles
    }
}

impl StatusLed for SimulatedLed {
    fn toggle(&mut self) -> Result<(), BoxError> {
        self.on = !self.on;
        self.toggles += 1;
        trace!(on = self.on, "sim led toggle");
        Ok(())
    }
}

/// Simulated transport: logs each report and keeps the most recent one.
#[derive(Debug, Default)]
pub struct SimulatedSink {
    sent: u64,
    last: Option<[u8; hidg::REPORT_LEN]>,
}

impl SimulatedSink {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn sent(&self) -> u64 {
        self.sent
    }
    pub fn last(&self) -> Option<[u8; hidg::REPORT_LEN]> {
        self.last
    }
}

impl ReportSink for SimulatedSink {
    fn send(&mut self, report: &[u8]) -> Result<(), BoxError> {
        let bytes: [u8; hidg::REPORT_LEN] = report.try_into().map_err(|_| {
            Box::new(HwError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "report length mismatch",
            ))) as BoxError
        })?;
        self.sent += 1;
        self.last = Some(bytes);
        debug!(gas = bytes[0], brake = bytes[1], clutch = bytes[2], "report (simulated)");
        Ok(())
    }
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub use hardware::{GpioLed, HardwareFrontEnd};

#[cfg(all(feature = "hardware", target_os = "linux"))]
mod hardware {
    use pedal_traits::{BoxError, StatusLed};
    use rppal::gpio::{Gpio, OutputPin};

    use crate::error::{HwError, Result};

    pub use crate::mcp3208::Mcp3208 as HardwareFrontEnd;

    /// Status LED on a GPIO output (BCM numbering).
    pub struct GpioLed {
        pin: OutputPin,
    }

    impl GpioLed {
        pub fn new(bcm_pin: u8) -> Result<Self> {
            let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
            let mut pin = gpio
                .get(bcm_pin)
                .map_err(|e| HwError::Gpio(format!("open led pin {bcm_pin}: {e}")))?
                .into_output();
            pin.set_low();
            Ok(Self { pin })
        }
    }

    impl StatusLed for GpioLed {
        fn toggle(&mut self) -> std::result::Result<(), BoxError> {
            self.pin.toggle();
            Ok(())
        }
    }
}
