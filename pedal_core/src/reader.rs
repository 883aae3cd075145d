//! Channel Reader: one settled single-channel conversion at a time.
//!
//! No simultaneous-sample hardware is assumed, so every read reconfigures the
//! front-end for its input and lets the sample-and-hold charge before starting.
//! The reader holds the front-end by value and every conversion takes
//! `&mut self`, so no other conversion can interleave with a reconfiguration.

use std::sync::Arc;

use pedal_traits::{AnalogFrontEnd, BoxError, Clock, SamplingTime};
use tracing::{debug, trace, warn};

use crate::channel::{CHANNELS, ChannelId};
use crate::config::AcquisitionCfg;
use crate::error::PedalError;
use crate::hw_error::map_hw_error;

const SAMPLE_MASK: u16 = 0x0FFF;

pub struct ChannelReader<F: AnalogFrontEnd> {
    front_end: F,
    clock: Arc<dyn Clock + Send + Sync>,
    cfg: AcquisitionCfg,
    failures: u64,
}

impl<F: AnalogFrontEnd> ChannelReader<F> {
    pub fn new(front_end: F, clock: Arc<dyn Clock + Send + Sync>, cfg: AcquisitionCfg) -> Self {
        Self {
            front_end,
            clock,
            cfg,
            failures: 0,
        }
    }

    pub fn cfg(&self) -> &AcquisitionCfg {
        &self.cfg
    }

    /// Conversions that produced no value (timeouts and faults).
    pub fn failures(&self) -> u64 {
        self.failures
    }

    pub fn front_end(&self) -> &F {
        &self.front_end
    }

    /// Read one pedal. Any failure is absorbed and reads as 0.
    pub fn read(&mut self, id: ChannelId) -> u16 {
        let input = self.cfg.inputs[id.index()];
        match self.convert(input) {
            Ok(raw) => {
                let raw = raw & SAMPLE_MASK;
                trace!(channel = %id, input, raw, "conversion");
                raw
            }
            Err(e) => {
                self.failures = self.failures.saturating_add(1);
                match map_hw_error(&*e) {
                    PedalError::Timeout => debug!(channel = %id, input, "conversion timeout; using 0"),
                    other => warn!(channel = %id, input, error = %other, "conversion failed; using 0"),
                }
                0
            }
        }
    }

    /// Read every pedal in report order, pausing between consecutive channels.
    pub fn read_all(&mut self) -> [u16; CHANNELS] {
        let mut out = [0u16; CHANNELS];
        for (i, id) in ChannelId::ALL.into_iter().enumerate() {
            if i > 0 {
                self.clock.sleep(self.cfg.inter_channel_pause());
            }
            out[i] = self.read(id);
        }
        out
    }

    fn convert(&mut self, input: u8) -> Result<u16, BoxError> {
        if let Err(e) = self.front_end.stop() {
            trace!(error = %e, "stop before reconfigure failed");
        }
        self.front_end.configure(input, SamplingTime::Long)?;
        self.clock.sleep(self.cfg.settle());
        self.front_end.start()?;
        let result = self.front_end.poll(self.cfg.conversion_timeout());
        if let Err(e) = self.front_end.stop() {
            trace!(error = %e, "stop after conversion failed");
        }
        result
    }
}
