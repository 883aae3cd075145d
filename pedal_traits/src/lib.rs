//! Hardware seams for the pedal pipeline.
//!
//! Everything the core touches outside of plain arithmetic goes through one of
//! these traits: the analog front-end, the report transport, the status output
//! and the monotonic clock.
pub mod clock;

pub use clock::{Clock, MonotonicClock};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Sampling window requested from the analog front-end.
///
/// `Long` is what the pedal reader always asks for: potentiometer wipers are
/// high-impedance sources and need the sample-and-hold capacitor to charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SamplingTime {
    Short,
    #[default]
    Long,
}

/// Single-conversion analog front-end.
///
/// A reader drives it as `stop` → `configure` → (settle) → `start` → `poll` → `stop`.
pub trait AnalogFrontEnd {
    fn configure(&mut self, channel: u8, sampling_time: SamplingTime) -> Result<(), BoxError>;
    fn start(&mut self) -> Result<(), BoxError>;
    /// Wait at most `timeout` for the started conversion and return its raw value.
    fn poll(&mut self, timeout: std::time::Duration) -> Result<u16, BoxError>;
    fn stop(&mut self) -> Result<(), BoxError>;
}

/// Fire-and-forget transport for fixed-size input reports.
pub trait ReportSink {
    fn send(&mut self, report: &[u8]) -> Result<(), BoxError>;
}

/// Binary status output with no readback.
pub trait StatusLed {
    fn toggle(&mut self) -> Result<(), BoxError>;
}

impl<T: AnalogFrontEnd + ?Sized> AnalogFrontEnd for Box<T> {
    fn configure(&mut self, channel: u8, sampling_time: SamplingTime) -> Result<(), BoxError> {
        (**self).configure(channel, sampling_time)
    }
    fn start(&mut self) -> Result<(), BoxError> {
        (**self).start()
    }
    fn poll(&mut self, timeout: std::time::Duration) -> Result<u16, BoxError> {
        (**self).poll(timeout)
    }
    fn stop(&mut self) -> Result<(), BoxError> {
        (**self).stop()
    }
}

impl<T: ReportSink + ?Sized> ReportSink for Box<T> {
    fn send(&mut self, report: &[u8]) -> Result<(), BoxError> {
        (**self).send(report)
    }
}

impl<T: StatusLed + ?Sized> StatusLed for Box<T> {
    fn toggle(&mut self) -> Result<(), BoxError> {
        (**self).toggle()
    }
}
