//! The pedal control loop (`PedalCore`).
//!
//! Owns every piece of pipeline state: the three channels, the calibration
//! state machine, the report and status cadences. One `step()` is one pass of
//! the firmware loop:
//!
//! acquire → smooth → calibrate (Calibrating) → map (Running) → report → blink → pace

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use pedal_traits::{AnalogFrontEnd, Clock, ReportSink, StatusLed};
use tracing::{info, warn};

use crate::calibration::{CalibrationEngine, SystemState};
use crate::channel::{CHANNELS, ChannelId, PedalChannel, channels};
use crate::config::{ChannelCfg, FilterCfg, LoopCfg};
use crate::filter::smooth;
use crate::indicator::StatusIndicator;
use crate::mapping::DeadzoneMapper;
use crate::reader::ChannelReader;
use crate::report::{Emission, ReportScheduler};
use crate::status::{LoopStats, StepStatus};

pub struct PedalCore<F: AnalogFrontEnd, R: ReportSink, L: StatusLed> {
    pub(crate) reader: ChannelReader<F>,
    pub(crate) sink: R,
    pub(crate) led: L,
    pub(crate) channel_cfg: ChannelCfg,
    pub(crate) channels: [PedalChannel; CHANNELS],
    pub(crate) filter: FilterCfg,
    pub(crate) engine: CalibrationEngine,
    pub(crate) mapper: DeadzoneMapper,
    pub(crate) scheduler: ReportScheduler,
    pub(crate) indicator: StatusIndicator,
    pub(crate) pacing: LoopCfg,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) epoch: Instant,
    pub(crate) iterations: u64,
    pub(crate) reports_sent: u64,
    pub(crate) reports_dropped: u64,
}

impl<F: AnalogFrontEnd, R: ReportSink, L: StatusLed> core::fmt::Debug for PedalCore<F, R, L> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PedalCore")
            .field("state", &self.engine.state())
            .field("channels", &self.channels)
            .field("iterations", &self.iterations)
            .finish()
    }
}

impl<F: AnalogFrontEnd, R: ReportSink, L: StatusLed> PedalCore<F, R, L> {
    pub fn state(&self) -> SystemState {
        self.engine.state()
    }

    pub fn channels(&self) -> &[PedalChannel; CHANNELS] {
        &self.channels
    }

    pub fn channel(&self, id: ChannelId) -> &PedalChannel {
        &self.channels[id.index()]
    }

    /// Current output bytes in report order.
    pub fn outputs(&self) -> [u8; CHANNELS] {
        self.channels.map(|c| c.output)
    }

    /// Milliseconds since the session started (`begin`).
    pub fn elapsed_ms(&self) -> u64 {
        self.clock.ms_since(self.epoch)
    }

    pub fn stats(&self) -> LoopStats {
        LoopStats {
            iterations: self.iterations,
            reports_sent: self.reports_sent,
            reports_dropped: self.reports_dropped,
            conversion_failures: self.reader.failures(),
            led_failures: self.indicator.failures(),
        }
    }

    pub fn front_end(&self) -> &F {
        self.reader.front_end()
    }

    pub fn sink(&self) -> &R {
        &self.sink
    }

    pub fn led(&self) -> &L {
        &self.led
    }

    /// Start a new session: fresh channels, Calibrating, and the startup burst.
    ///
    /// The calibration window is measured from here, so the burst counts against it.
    pub fn begin(&mut self) {
        self.epoch = self.clock.now();
        self.channels = channels(self.channel_cfg.inverted);
        self.engine.reset();
        self.scheduler.reset();
        self.indicator.reset();
        self.iterations = 0;
        info!(
            window_ms = self.engine.cfg().window_ms,
            min_travel = self.engine.cfg().min_travel,
            "calibration started; move every pedal through its full travel"
        );
        self.indicator.startup_burst(&mut self.led, &*self.clock);
    }

    /// One pass of the loop, including the trailing pacing delay.
    pub fn step(&mut self) -> StepStatus {
        let raws = self.reader.read_all();
        for (ch, raw) in self.channels.iter_mut().zip(raws) {
            ch.filtered = smooth(&self.filter, ch.filtered, raw);
        }

        let mut transition = None;
        if self.engine.state() == SystemState::Calibrating {
            let elapsed = self.elapsed_ms();
            if let Some(flags) = self.engine.update(&mut self.channels, elapsed) {
                self.log_calibration(elapsed);
                self.indicator.transition_burst(&mut self.led, &*self.clock);
                transition = Some(flags);
            }
        }

        let mut emission = Emission::Idle;
        if self.engine.state() == SystemState::Running {
            for ch in self.channels.iter_mut() {
                self.mapper.apply(ch);
            }
            let now = self.elapsed_ms();
            emission = self
                .scheduler
                .poll(now, SystemState::Running, &self.channels, &mut self.sink);
            match emission {
                Emission::Sent(_) => self.reports_sent += 1,
                Emission::Dropped(_) => self.reports_dropped += 1,
                Emission::Idle => {}
            }
        }

        let now = self.elapsed_ms();
        let state = self.engine.state();
        self.indicator.tick(now, state, &mut self.led);

        self.iterations += 1;
        self.clock.sleep(Duration::from_millis(self.pacing.pace_ms));

        match (state, transition) {
            (_, Some(calibrated)) => StepStatus::Calibrated {
                calibrated,
                emission,
            },
            (SystemState::Calibrating, None) => StepStatus::Calibrating,
            (SystemState::Running, None) => StepStatus::Running { emission },
        }
    }

    /// `begin`, then step until `shutdown` is set or `max_loops` passes have run.
    ///
    /// On the device the loop never ends; both exits exist for hosted runs and tests.
    pub fn run(&mut self, shutdown: &AtomicBool, max_loops: Option<u64>) -> LoopStats {
        self.begin();
        loop {
            if shutdown.load(Ordering::Relaxed) {
                info!(iterations = self.iterations, "shutdown requested");
                break;
            }
            if max_loops.is_some_and(|m| self.iterations >= m) {
                break;
            }
            self.step();
        }
        let stats = self.stats();
        info!(
            iterations = stats.iterations,
            reports_sent = stats.reports_sent,
            reports_dropped = stats.reports_dropped,
            conversion_failures = stats.conversion_failures,
            led_failures = stats.led_failures,
            "loop stopped"
        );
        stats
    }

    fn log_calibration(&self, elapsed_ms: u64) {
        for id in ChannelId::ALL {
            let ch = &self.channels[id.index()];
            if ch.calibrated {
                info!(channel = %id, min = ch.min, max = ch.max, travel = ch.travel(), "channel calibrated");
            } else {
                warn!(
                    channel = %id,
                    min = ch.min,
                    max = ch.max,
                    travel = ch.travel(),
                    min_travel = self.engine.cfg().min_travel,
                    "channel did not travel far enough; output stays at 0 for this session"
                );
            }
        }
        info!(elapsed_ms, "calibration finished; running");
    }
}
