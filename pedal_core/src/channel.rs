//! Per-pedal data model.

/// Number of pedals; fixed by the report layout.
pub const CHANNELS: usize = 3;
/// Largest 12-bit raw sample.
pub const RAW_MAX: u16 = 4095;
/// Smallest raw sample.
pub const RAW_MIN: u16 = 0;
/// Filter seed so the first samples pull from mid-scale.
pub const RAW_MID: u16 = 2048;

/// Physical pedal, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelId {
    Gas,
    Brake,
    Clutch,
}

impl ChannelId {
    /// Acquisition and report order.
    pub const ALL: [ChannelId; CHANNELS] = [ChannelId::Gas, ChannelId::Brake, ChannelId::Clutch];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            ChannelId::Gas => 0,
            ChannelId::Brake => 1,
            ChannelId::Clutch => 2,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ChannelId::Gas => "gas",
            ChannelId::Brake => "brake",
            ChannelId::Clutch => "clutch",
        }
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// State of one pedal.
///
/// `min`/`max` start inverted (4095/0) so the first observation always widens
/// the range. Once calibration has finished with `calibrated == false`,
/// `output` is never written again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PedalChannel {
    pub min: u16,
    pub max: u16,
    pub filtered: u16,
    pub output: u8,
    pub calibrated: bool,
    pub inverted: bool,
}

impl PedalChannel {
    pub const fn new(inverted: bool) -> Self {
        Self {
            min: RAW_MAX,
            max: RAW_MIN,
            filtered: RAW_MID,
            output: 0,
            calibrated: false,
            inverted,
        }
    }

    /// Observed travel; 0 while nothing has been observed.
    #[inline]
    pub fn travel(&self) -> u16 {
        self.max.saturating_sub(self.min)
    }
}

/// Fresh channels for a session, in report order.
pub fn channels(inverted: [bool; CHANNELS]) -> [PedalChannel; CHANNELS] {
    inverted.map(PedalChannel::new)
}
