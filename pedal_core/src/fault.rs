//! Fail-stop signalling for unrecoverable bring-up failures.

use std::time::Duration;

use pedal_traits::{Clock, StatusLed};

/// Blink `led` forever with `period_ms` between toggles. Never returns.
///
/// Used when peripheral bring-up fails on real hardware: the pipeline cannot
/// run, so the only remaining output is a fast blink until power is cycled.
pub fn fail_stop<L: StatusLed + ?Sized>(led: &mut L, clock: &dyn Clock, period_ms: u64) -> ! {
    tracing::error!(period_ms, "fail-stop: halting pipeline");
    let period = Duration::from_millis(period_ms.max(1));
    loop {
        let _ = led.toggle();
        clock.sleep(period);
    }
}
