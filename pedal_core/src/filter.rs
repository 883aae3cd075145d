//! Single-pole integer EMA.

use crate::config::FilterCfg;

/// One smoothing step with truncating integer division.
///
/// With the default 3:1 weights this is `(filtered * 3 + raw) >> 2`.
#[inline]
pub fn smooth(cfg: &FilterCfg, filtered: u16, raw: u16) -> u16 {
    let h = cfg.history_weight;
    let s = cfg.sample_weight;
    let den = h.saturating_add(s).max(1);
    let num = u32::from(filtered) * h + u32::from(raw) * s;
    // Weighted mean of two u16 values never exceeds the larger one
    (num / den) as u16
}
