use std::time::Duration;

use pedal_traits::{AnalogFrontEnd, BoxError, SamplingTime};
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
use tracing::trace;

use crate::error::{HwError, Result};
use crate::util::{MAX_CHANNEL, command_frame, decode_frame};

/// MCP3208 12-bit SPI ADC.
///
/// The converter samples during the clock edges that follow the channel bits,
/// so a "long" sampling window is a slower SCK for that transfer.
pub struct Mcp3208 {
    spi: Spi,
    fast_hz: u32,
    slow_hz: u32,
    channel: Option<u8>,
    result: Option<u16>,
}

fn bus(n: u8) -> Result<Bus> {
    Ok(match n {
        0 => Bus::Spi0,
        1 => Bus::Spi1,
        2 => Bus::Spi2,
        3 => Bus::Spi3,
        4 => Bus::Spi4,
        5 => Bus::Spi5,
        6 => Bus::Spi6,
        other => return Err(HwError::Spi(format!("unknown spi bus {other}"))),
    })
}

fn slave_select(n: u8) -> Result<SlaveSelect> {
    Ok(match n {
        0 => SlaveSelect::Ss0,
        1 => SlaveSelect::Ss1,
        2 => SlaveSelect::Ss2,
        other => return Err(HwError::Spi(format!("unsupported chip select {other}"))),
    })
}

impl Mcp3208 {
    pub fn new(spi_bus: u8, chip_select: u8, clock_hz: u32) -> Result<Self> {
        let spi = Spi::new(bus(spi_bus)?, slave_select(chip_select)?, clock_hz, Mode::Mode0)
            .map_err(|e| HwError::Spi(format!("open spi{spi_bus}.{chip_select}: {e}")))?;
        Ok(Self {
            spi,
            fast_hz: clock_hz,
            slow_hz: (clock_hz / 4).max(100_000),
            channel: None,
            result: None,
        })
    }
}

impl AnalogFrontEnd for Mcp3208 {
    fn configure(&mut self, channel: u8, sampling_time: SamplingTime) -> std::result::Result<(), BoxError> {
        if channel > MAX_CHANNEL {
            return Err(Box::new(HwError::Spi(format!("adc input {channel} out of range"))));
        }
        let hz = match sampling_time {
            SamplingTime::Short => self.fast_hz,
            SamplingTime::Long => self.slow_hz,
        };
        self.spi
            .set_clock_speed(hz)
            .map_err(|e| Box::new(HwError::Spi(e.to_string())) as BoxError)?;
        self.channel = Some(channel);
        Ok(())
    }

    fn start(&mut self) -> std::result::Result<(), BoxError> {
        let channel = self.channel.ok_or(HwError::ConversionNotStarted)?;
        let tx = command_frame(channel);
        let mut rx = [0u8; 3];
        self.spi
            .transfer(&mut rx, &tx)
            .map_err(|e| Box::new(HwError::Spi(e.to_string())) as BoxError)?;
        let raw = decode_frame(&rx);
        trace!(channel, raw, "mcp3208 conversion");
        self.result = Some(raw);
        Ok(())
    }

    fn poll(&mut self, _timeout: Duration) -> std::result::Result<u16, BoxError> {
        // The transfer in start() is synchronous; nothing to wait for here.
        self.result.take().ok_or_else(|| Box::new(HwError::Timeout) as BoxError)
    }

    fn stop(&mut self) -> std::result::Result<(), BoxError> {
        self.result = None;
        Ok(())
    }
}
