//! Deadzone-aware linear remap from filtered raw counts to an output byte.
//!
//! All arithmetic is unsigned with truncating division. The resulting curve has
//! ≤1 LSB quantization steps near the range edges; those steps are part of the
//! device's observable behavior and must not be "fixed" with rounding.

use crate::channel::PedalChannel;
use crate::config::{CalibrationCfg, DeadzoneCfg};

pub const OUTPUT_MAX: u8 = u8::MAX;

#[derive(Debug, Clone, Copy)]
pub struct DeadzoneMapper {
    min_travel: u16,
    deadzone: DeadzoneCfg,
}

impl Default for DeadzoneMapper {
    fn default() -> Self {
        Self::new(&CalibrationCfg::default(), DeadzoneCfg::default())
    }
}

impl DeadzoneMapper {
    pub fn new(calibration: &CalibrationCfg, deadzone: DeadzoneCfg) -> Self {
        Self {
            min_travel: calibration.min_travel,
            deadzone,
        }
    }

    /// Clamp-and-scale `filtered` into 0..=255 over `[min, max]`.
    ///
    /// `None` when the range does not exceed the travel threshold.
    #[inline]
    pub fn scale(&self, min: u16, max: u16, filtered: u16) -> Option<u8> {
        let range = max.saturating_sub(min);
        if range <= self.min_travel {
            return None;
        }
        let v = if filtered <= min {
            0
        } else if filtered >= max {
            u32::from(OUTPUT_MAX)
        } else {
            u32::from(OUTPUT_MAX) * u32::from(filtered - min) / u32::from(range)
        };
        Some(v as u8)
    }

    /// Collapse the deadzones and stretch the interior back over 0..=255.
    #[inline]
    pub fn compress(&self, mapped: u8) -> u8 {
        let DeadzoneCfg { low, high } = self.deadzone;
        if mapped < low {
            0
        } else if mapped > high {
            OUTPUT_MAX
        } else {
            let span = u32::from(high - low);
            (u32::from(mapped - low) * u32::from(OUTPUT_MAX) / span) as u8
        }
    }

    /// Full pipeline: scale, compress, then complement when `inverted`.
    #[inline]
    pub fn map(&self, min: u16, max: u16, filtered: u16, inverted: bool) -> Option<u8> {
        let v = self.compress(self.scale(min, max, filtered)?);
        Some(if inverted { OUTPUT_MAX - v } else { v })
    }

    /// Recompute `ch.output` from its frozen extrema.
    ///
    /// Uncalibrated channels are left untouched. Returns whether `output` was written.
    pub fn apply(&self, ch: &mut PedalChannel) -> bool {
        if !ch.calibrated {
            return false;
        }
        match self.map(ch.min, ch.max, ch.filtered, ch.inverted) {
            Some(v) => {
                ch.output = v;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compress_edges() {
        let m = DeadzoneMapper::default();
        assert_eq!(m.compress(0), 0);
        assert_eq!(m.compress(4), 0);
        assert_eq!(m.compress(5), 0);
        assert_eq!(m.compress(6), 1);
        assert_eq!(m.compress(250), 255);
        assert_eq!(m.compress(251), 255);
        assert_eq!(m.compress(255), 255);
    }

    #[test]
    fn scale_rejects_short_travel() {
        let m = DeadzoneMapper::default();
        assert_eq!(m.scale(1000, 1100, 1050), None);
        assert!(m.scale(1000, 1101, 1050).is_some());
        // inverted extrema from an unobserved channel
        assert_eq!(m.scale(4095, 0, 2048), None);
    }

    #[test]
    fn apply_skips_uncalibrated() {
        let m = DeadzoneMapper::default();
        let mut ch = PedalChannel::new(true);
        ch.min = 1000;
        ch.max = 3000;
        ch.filtered = 2000;
        assert!(!m.apply(&mut ch));
        assert_eq!(ch.output, 0);
        ch.calibrated = true;
        assert!(m.apply(&mut ch));
        assert_eq!(ch.output, 129);
    }
}
