//! Type-state builder for `Pedalbox` and generic `build_pedalbox` constructor.
//!
//! The builder enforces at compile time that a front-end, a report sink and a
//! status LED are provided before `build()` is available. `try_build()` is
//! always available for dynamic checks.

use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use pedal_traits::clock::{Clock, MonotonicClock};
use pedal_traits::{AnalogFrontEnd, ReportSink, StatusLed};

use crate::calibration::{CalibrationEngine, SystemState};
use crate::channel::{CHANNELS, ChannelId, PedalChannel, RAW_MAX, channels};
use crate::config::*;
use crate::core::PedalCore;
use crate::error::{BuildError, Result};
use crate::indicator::StatusIndicator;
use crate::mapping::DeadzoneMapper;
use crate::reader::ChannelReader;
use crate::report::ReportScheduler;
use crate::status::{LoopStats, StepStatus};

type DynCore = PedalCore<Box<dyn AnalogFrontEnd>, Box<dyn ReportSink>, Box<dyn StatusLed>>;

/// Dynamic (boxed) pedal controller, the form the CLI drives.
pub struct Pedalbox {
    pub(crate) inner: DynCore,
}

impl core::fmt::Debug for Pedalbox {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Pedalbox")
            .field("state", &self.inner.state())
            .field("outputs", &self.inner.outputs())
            .finish()
    }
}

impl Pedalbox {
    /// Start building a Pedalbox.
    pub fn builder() -> PedalboxBuilder<Missing, Missing, Missing> {
        PedalboxBuilder::default()
    }

    pub fn state(&self) -> SystemState {
        self.inner.state()
    }

    pub fn channels(&self) -> &[PedalChannel; CHANNELS] {
        self.inner.channels()
    }

    pub fn channel(&self, id: ChannelId) -> &PedalChannel {
        self.inner.channel(id)
    }

    pub fn outputs(&self) -> [u8; CHANNELS] {
        self.inner.outputs()
    }

    pub fn stats(&self) -> LoopStats {
        self.inner.stats()
    }

    /// Start a new session (startup burst, Calibrating).
    pub fn begin(&mut self) {
        self.inner.begin();
    }

    /// One pass of the loop.
    pub fn step(&mut self) -> StepStatus {
        self.inner.step()
    }

    /// Take one acquisition without touching session state.
    pub fn sample_raw(&mut self) -> [u16; CHANNELS] {
        self.inner.reader.read_all()
    }

    pub fn run(&mut self, shutdown: &AtomicBool, max_loops: Option<u64>) -> LoopStats {
        self.inner.run(shutdown, max_loops)
    }
}

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

/// Builder for `Pedalbox`. All fields are validated on `build()`.
pub struct PedalboxBuilder<F, R, L> {
    front_end: Option<Box<dyn AnalogFrontEnd>>,
    sink: Option<Box<dyn ReportSink>>,
    led: Option<Box<dyn StatusLed>>,
    filter: Option<FilterCfg>,
    acquisition: Option<AcquisitionCfg>,
    calibration: Option<CalibrationCfg>,
    deadzone: Option<DeadzoneCfg>,
    report: Option<ReportCfg>,
    status: Option<StatusCfg>,
    pacing: Option<LoopCfg>,
    channels: Option<ChannelCfg>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
    _f: PhantomData<F>,
    _r: PhantomData<R>,
    _l: PhantomData<L>,
}

impl Default for PedalboxBuilder<Missing, Missing, Missing> {
    fn default() -> Self {
        Self {
            front_end: None,
            sink: None,
            led: None,
            filter: None,
            acquisition: None,
            calibration: None,
            deadzone: None,
            report: None,
            status: None,
            pacing: None,
            channels: None,
            clock: None,
            _f: PhantomData,
            _r: PhantomData,
            _l: PhantomData,
        }
    }
}

/// Every setting of a controller, grouped for `validate_and_build`.
#[derive(Debug, Clone, Default)]
pub struct PipelineCfg {
    pub filter: FilterCfg,
    pub acquisition: AcquisitionCfg,
    pub calibration: CalibrationCfg,
    pub deadzone: DeadzoneCfg,
    pub report: ReportCfg,
    pub status: StatusCfg,
    pub pacing: LoopCfg,
    pub channels: ChannelCfg,
}

fn invalid(msg: &'static str) -> eyre::Report {
    eyre::Report::new(BuildError::InvalidConfig(msg))
}

/// Validate configuration and construct a `PedalCore`.
///
/// This is the single source of truth for validation and construction,
/// used by both `PedalboxBuilder::try_build()` and `build_pedalbox()`.
fn validate_and_build<F: AnalogFrontEnd, R: ReportSink, L: StatusLed>(
    front_end: F,
    sink: R,
    led: L,
    cfg: PipelineCfg,
    clock: Option<Box<dyn Clock + Send + Sync>>,
) -> Result<PedalCore<F, R, L>> {
    // ── Validation ───────────────────────────────────────────────────────────
    if cfg.filter.sample_weight == 0 {
        return Err(invalid("filter sample_weight must be > 0"));
    }
    if cfg.filter.history_weight.saturating_add(cfg.filter.sample_weight) > 1024 {
        return Err(invalid("filter weights must sum to <= 1024"));
    }
    if cfg.acquisition.conversion_timeout_ms == 0 {
        return Err(invalid("conversion_timeout_ms must be >= 1"));
    }
    if cfg.acquisition.inputs.iter().any(|&i| i > 7) {
        return Err(invalid("adc input out of range (0..=7)"));
    }
    if cfg.calibration.min_travel >= RAW_MAX {
        return Err(invalid("min_travel must be < 4095"));
    }
    if cfg.deadzone.low >= cfg.deadzone.high {
        return Err(invalid("deadzone low must be < high"));
    }
    if cfg.report.interval_ms == 0 {
        return Err(invalid("report interval_ms must be >= 1"));
    }
    if cfg.status.calibrating_period_ms == 0 || cfg.status.running_period_ms == 0 {
        return Err(invalid("status periods must be >= 1"));
    }
    if cfg.pacing.pace_ms == 0 {
        return Err(invalid("loop pace_ms must be >= 1"));
    }

    let clock: Arc<dyn Clock + Send + Sync> = match clock {
        Some(b) => Arc::from(b),
        None => Arc::new(MonotonicClock::new()),
    };
    let epoch = clock.now();

    Ok(PedalCore {
        reader: ChannelReader::new(front_end, clock.clone(), cfg.acquisition),
        sink,
        led,
        channel_cfg: cfg.channels,
        channels: channels(cfg.channels.inverted),
        filter: cfg.filter,
        engine: CalibrationEngine::new(cfg.calibration),
        mapper: DeadzoneMapper::new(&cfg.calibration, cfg.deadzone),
        scheduler: ReportScheduler::new(cfg.report),
        indicator: StatusIndicator::new(cfg.status),
        pacing: cfg.pacing,
        clock,
        epoch,
        iterations: 0,
        reports_sent: 0,
        reports_dropped: 0,
    })
}

impl<F, R, L> PedalboxBuilder<F, R, L> {
    /// Fallible build available in any type-state; returns detailed error for missing pieces.
    pub fn try_build(self) -> Result<Pedalbox> {
        let front_end = self
            .front_end
            .ok_or_else(|| eyre::Report::new(BuildError::MissingFrontEnd))?;
        let sink = self
            .sink
            .ok_or_else(|| eyre::Report::new(BuildError::MissingReportSink))?;
        let led = self
            .led
            .ok_or_else(|| eyre::Report::new(BuildError::MissingStatusLed))?;

        let cfg = PipelineCfg {
            filter: self.filter.unwrap_or_default(),
            acquisition: self.acquisition.unwrap_or_default(),
            calibration: self.calibration.unwrap_or_default(),
            deadzone: self.deadzone.unwrap_or_default(),
            report: self.report.unwrap_or_default(),
            status: self.status.unwrap_or_default(),
            pacing: self.pacing.unwrap_or_default(),
            channels: self.channels.unwrap_or_default(),
        };
        let inner = validate_and_build(front_end, sink, led, cfg, self.clock)?;
        Ok(Pedalbox { inner })
    }

    fn retype<F2, R2, L2>(self) -> PedalboxBuilder<F2, R2, L2> {
        PedalboxBuilder {
            front_end: self.front_end,
            sink: self.sink,
            led: self.led,
            filter: self.filter,
            acquisition: self.acquisition,
            calibration: self.calibration,
            deadzone: self.deadzone,
            report: self.report,
            status: self.status,
            pacing: self.pacing,
            channels: self.channels,
            clock: self.clock,
            _f: PhantomData,
            _r: PhantomData,
            _l: PhantomData,
        }
    }
}

/// Chainable setters that do not affect type-state.
impl<F, R, L> PedalboxBuilder<F, R, L> {
    pub fn with_filter(mut self, filter: FilterCfg) -> Self {
        self.filter = Some(filter);
        self
    }
    pub fn with_acquisition(mut self, acquisition: AcquisitionCfg) -> Self {
        self.acquisition = Some(acquisition);
        self
    }
    pub fn with_calibration(mut self, calibration: CalibrationCfg) -> Self {
        self.calibration = Some(calibration);
        self
    }
    pub fn with_deadzone(mut self, deadzone: DeadzoneCfg) -> Self {
        self.deadzone = Some(deadzone);
        self
    }
    pub fn with_report(mut self, report: ReportCfg) -> Self {
        self.report = Some(report);
        self
    }
    pub fn with_status(mut self, status: StatusCfg) -> Self {
        self.status = Some(status);
        self
    }
    pub fn with_pacing(mut self, pacing: LoopCfg) -> Self {
        self.pacing = Some(pacing);
        self
    }
    pub fn with_channels(mut self, channels: ChannelCfg) -> Self {
        self.channels = Some(channels);
        self
    }
    /// Apply every section of a grouped config at once.
    pub fn with_pipeline(self, cfg: PipelineCfg) -> Self {
        self.with_filter(cfg.filter)
            .with_acquisition(cfg.acquisition)
            .with_calibration(cfg.calibration)
            .with_deadzone(cfg.deadzone)
            .with_report(cfg.report)
            .with_status(cfg.status)
            .with_pacing(cfg.pacing)
            .with_channels(cfg.channels)
    }
    /// Provide a custom clock implementation; defaults to `MonotonicClock` when not provided.
    pub fn with_clock(mut self, clock: Box<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }
}

// Setters that advance type-state
impl<R, L> PedalboxBuilder<Missing, R, L> {
    pub fn with_front_end(
        mut self,
        front_end: impl AnalogFrontEnd + 'static,
    ) -> PedalboxBuilder<Set, R, L> {
        self.front_end = Some(Box::new(front_end));
        self.retype()
    }
}

impl<F, L> PedalboxBuilder<F, Missing, L> {
    pub fn with_report_sink(
        mut self,
        sink: impl ReportSink + 'static,
    ) -> PedalboxBuilder<F, Set, L> {
        self.sink = Some(Box::new(sink));
        self.retype()
    }
}

impl<F, R> PedalboxBuilder<F, R, Missing> {
    pub fn with_status_led(mut self, led: impl StatusLed + 'static) -> PedalboxBuilder<F, R, Set> {
        self.led = Some(Box::new(led));
        self.retype()
    }
}

impl PedalboxBuilder<Set, Set, Set> {
    /// Validate and build. Only available when front-end, sink and LED are set.
    pub fn build(self) -> Result<Pedalbox> {
        self.try_build()
    }
}

/// Generic, statically-dispatched alias using the unified core.
pub type PedalboxG<F, R, L> = PedalCore<F, R, L>;

/// Build a generic, statically-dispatched `PedalboxG` from concrete parts.
///
/// Delegates to the shared `validate_and_build`.
pub fn build_pedalbox<F, R, L>(
    front_end: F,
    sink: R,
    led: L,
    cfg: PipelineCfg,
    clock: Option<Box<dyn Clock + Send + Sync>>,
) -> Result<PedalboxG<F, R, L>>
where
    F: AnalogFrontEnd,
    R: ReportSink,
    L: StatusLed,
{
    validate_and_build(front_end, sink, led, cfg, clock)
}
