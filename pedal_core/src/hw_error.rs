//! Maps `Box<dyn Error>` from trait boundaries to typed `PedalError`.
//!
//! The traits in `pedal_traits` use boxed errors so any backend can plug in;
//! this module classifies them for logging and counters, with an optional
//! feature-gated path for `pedal_hardware::HwError` downcasting.

use crate::error::PedalError;

/// Map a trait-boundary error to a typed `PedalError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> PedalError {
    #[cfg(feature = "hardware-errors")]
    {
        use pedal_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::Timeout => PedalError::Timeout,
                HwError::Io(io) => PedalError::Io(io.to_string()),
                other => PedalError::HardwareFault(other.to_string()),
            };
        }
    }

    if let Some(io) = e.downcast_ref::<std::io::Error>() {
        return PedalError::Io(io.to_string());
    }

    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        PedalError::Timeout
    } else {
        PedalError::Hardware(s)
    }
}

/// Classify a failed report hand-off. The transport's own reason is kept as text.
pub fn map_transport_error(e: &(dyn std::error::Error + 'static)) -> PedalError {
    PedalError::Transport(e.to_string())
}
