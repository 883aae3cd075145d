//! Test and helper mocks for pedal_core.
//!
//! Each mock hands out a cloneable handle so a test can keep observing (or
//! steering) it after the mock itself has been moved into a controller.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pedal_traits::{AnalogFrontEnd, BoxError, ReportSink, SamplingTime, StatusLed};

const INPUTS: usize = 8;

/// One call made on a `ScriptedFrontEnd`, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontEndCall {
    Stop,
    Configure(u8, SamplingTime),
    Start,
    Poll(Duration),
}

#[derive(Debug, Default)]
struct FrontEndState {
    values: [u16; INPUTS],
    timeouts: [bool; INPUTS],
    selected: Option<u8>,
    calls: Vec<FrontEndCall>,
}

/// Front-end whose per-input values are set from the test.
#[derive(Debug, Clone, Default)]
pub struct ScriptedFrontEnd {
    state: Arc<Mutex<FrontEndState>>,
}

/// Steering handle for a `ScriptedFrontEnd`.
#[derive(Debug, Clone)]
pub struct FrontEndHandle {
    state: Arc<Mutex<FrontEndState>>,
}

impl ScriptedFrontEnd {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> FrontEndHandle {
        FrontEndHandle {
            state: self.state.clone(),
        }
    }
}

impl FrontEndHandle {
    /// Value returned by every subsequent conversion of `input`.
    pub fn set(&self, input: u8, value: u16) {
        if let Ok(mut s) = self.state.lock() {
            s.values[usize::from(input) % INPUTS] = value;
        }
    }

    /// Make conversions of `input` time out (or stop timing out).
    pub fn set_timeout(&self, input: u8, timeout: bool) {
        if let Ok(mut s) = self.state.lock() {
            s.timeouts[usize::from(input) % INPUTS] = timeout;
        }
    }

    pub fn calls(&self) -> Vec<FrontEndCall> {
        self.state.lock().map(|s| s.calls.clone()).unwrap_or_default()
    }

    pub fn clear_calls(&self) {
        if let Ok(mut s) = self.state.lock() {
            s.calls.clear();
        }
    }
}

#[derive(Debug)]
struct MockTimeout;

impl std::fmt::Display for MockTimeout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("mock conversion timeout")
    }
}

impl std::error::Error for MockTimeout {}

impl AnalogFrontEnd for ScriptedFrontEnd {
    fn configure(&mut self, channel: u8, sampling_time: SamplingTime) -> Result<(), BoxError> {
        let mut s = self.state.lock().map_err(|e| e.to_string())?;
        s.calls.push(FrontEndCall::Configure(channel, sampling_time));
        s.selected = Some(channel);
        Ok(())
    }

    fn start(&mut self) -> Result<(), BoxError> {
        let mut s = self.state.lock().map_err(|e| e.to_string())?;
        s.calls.push(FrontEndCall::Start);
        Ok(())
    }

    fn poll(&mut self, timeout: Duration) -> Result<u16, BoxError> {
        let mut s = self.state.lock().map_err(|e| e.to_string())?;
        s.calls.push(FrontEndCall::Poll(timeout));
        let ch = usize::from(s.selected.unwrap_or(0)) % INPUTS;
        if s.timeouts[ch] {
            return Err(Box::new(MockTimeout));
        }
        Ok(s.values[ch])
    }

    fn stop(&mut self) -> Result<(), BoxError> {
        let mut s = self.state.lock().map_err(|e| e.to_string())?;
        s.calls.push(FrontEndCall::Stop);
        Ok(())
    }
}

/// Report sink that records every payload it is handed.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    reports: Arc<Mutex<Vec<Vec<u8>>>>,
    fail: bool,
}

#[derive(Debug, Clone)]
pub struct SinkHandle {
    reports: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records payloads but reports every send as failed.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn handle(&self) -> SinkHandle {
        SinkHandle {
            reports: self.reports.clone(),
        }
    }
}

impl SinkHandle {
    pub fn reports(&self) -> Vec<Vec<u8>> {
        self.reports.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl ReportSink for RecordingSink {
    fn send(&mut self, report: &[u8]) -> Result<(), BoxError> {
        if let Ok(mut r) = self.reports.lock() {
            r.push(report.to_vec());
        }
        if self.fail {
            return Err(Box::new(std::io::Error::other("mock transport busy")));
        }
        Ok(())
    }
}

/// Status LED that counts toggles.
#[derive(Debug, Clone, Default)]
pub struct CountingLed {
    toggles: Arc<Mutex<u64>>,
    fail: bool,
}

#[derive(Debug, Clone)]
pub struct LedHandle {
    toggles: Arc<Mutex<u64>>,
}

impl CountingLed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts toggles but reports every one as failed.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn handle(&self) -> LedHandle {
        LedHandle {
            toggles: self.toggles.clone(),
        }
    }
}

impl LedHandle {
    pub fn toggles(&self) -> u64 {
        self.toggles.lock().map(|t| *t).unwrap_or(0)
    }
}

impl StatusLed for CountingLed {
    fn toggle(&mut self) -> Result<(), BoxError> {
        if let Ok(mut t) = self.toggles.lock() {
            *t += 1;
        }
        if self.fail {
            return Err(Box::new(std::io::Error::other("mock gpio fault")));
        }
        Ok(())
    }
}
