//! Report Scheduler: at most one input report per interval, Running only.

use pedal_traits::ReportSink;
use tracing::{debug, trace};

use crate::calibration::SystemState;
use crate::channel::{CHANNELS, PedalChannel};
use crate::config::ReportCfg;
use crate::hw_error::map_transport_error;

/// Three output bytes in Gas, Brake, Clutch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PedalReport(pub [u8; CHANNELS]);

impl PedalReport {
    pub fn from_channels(channels: &[PedalChannel; CHANNELS]) -> Self {
        Self(channels.map(|c| c.output))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Outcome of one scheduler check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emission {
    /// Not due, or not Running.
    Idle,
    /// Handed to the transport successfully.
    Sent(PedalReport),
    /// Handed to the transport, which reported a failure. Not retried.
    Dropped(PedalReport),
}

#[derive(Debug, Clone)]
pub struct ReportScheduler {
    cfg: ReportCfg,
    last_emit_ms: Option<u64>,
}

impl ReportScheduler {
    pub fn new(cfg: ReportCfg) -> Self {
        Self {
            cfg,
            last_emit_ms: None,
        }
    }

    pub fn reset(&mut self) {
        self.last_emit_ms = None;
    }

    pub fn last_emit_ms(&self) -> Option<u64> {
        self.last_emit_ms
    }

    /// Whether a report is due at `now_ms`; the first check after start is always due.
    #[inline]
    pub fn due(&self, now_ms: u64) -> bool {
        self.last_emit_ms
            .is_none_or(|last| now_ms.saturating_sub(last) >= self.cfg.interval_ms)
    }

    /// Emit the current outputs if Running and due.
    ///
    /// The timestamp advances whether or not the transport accepted the report,
    /// so a slow or failing transport never builds a backlog.
    pub fn poll<R: ReportSink>(
        &mut self,
        now_ms: u64,
        state: SystemState,
        channels: &[PedalChannel; CHANNELS],
        sink: &mut R,
    ) -> Emission {
        if state != SystemState::Running || !self.due(now_ms) {
            return Emission::Idle;
        }
        let report = PedalReport::from_channels(channels);
        self.last_emit_ms = Some(now_ms);
        match sink.send(report.as_bytes()) {
            Ok(()) => {
                trace!(now_ms, report = ?report.0, "report sent");
                Emission::Sent(report)
            }
            Err(e) => {
                debug!(now_ms, error = %map_transport_error(&*e), "report dropped");
                Emission::Dropped(report)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::channels;
    use crate::mocks::RecordingSink;

    #[test]
    fn idle_while_calibrating() {
        let mut s = ReportScheduler::new(ReportCfg::default());
        let mut sink = RecordingSink::new();
        let chs = channels([true; CHANNELS]);
        assert_eq!(s.poll(50_000, SystemState::Calibrating, &chs, &mut sink), Emission::Idle);
        assert!(sink.handle().reports().is_empty());
    }

    #[test]
    fn spacing_is_at_least_interval() {
        let mut s = ReportScheduler::new(ReportCfg { interval_ms: 33 });
        let mut sink = RecordingSink::new();
        let chs = channels([true; CHANNELS]);
        assert!(matches!(s.poll(100, SystemState::Running, &chs, &mut sink), Emission::Sent(_)));
        assert_eq!(s.poll(132, SystemState::Running, &chs, &mut sink), Emission::Idle);
        assert!(matches!(s.poll(133, SystemState::Running, &chs, &mut sink), Emission::Sent(_)));
        assert_eq!(s.last_emit_ms(), Some(133));
    }

    #[test]
    fn failed_send_still_advances_timestamp() {
        let mut s = ReportScheduler::new(ReportCfg::default());
        let mut sink = RecordingSink::failing();
        let chs = channels([true; CHANNELS]);
        assert!(matches!(s.poll(10, SystemState::Running, &chs, &mut sink), Emission::Dropped(_)));
        assert_eq!(s.poll(20, SystemState::Running, &chs, &mut sink), Emission::Idle);
    }
}
