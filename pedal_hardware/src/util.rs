//! MCP3208 SPI framing.
//!
//! A single-ended conversion is a 3-byte full-duplex transfer:
//!
//! ```text
//! tx: 0000 01 1 D2 | D1 D0 xx xxxx | xxxx xxxx
//! rx: xxxx xxxx    | xxx 0 B11..B8 | B7 .. B0
//! ```

/// Highest input index on the MCP3208.
pub const MAX_CHANNEL: u8 = 7;

/// Mask for a 12-bit conversion result.
pub const SAMPLE_MASK: u16 = 0x0FFF;

/// Build the command frame for a single-ended read of `channel` (0..=7).
#[inline]
pub fn command_frame(channel: u8) -> [u8; 3] {
    let ch = channel & MAX_CHANNEL;
    [0x06 | (ch >> 2), (ch & 0x03) << 6, 0x00]
}

/// Extract the 12-bit sample from the bytes clocked back during `command_frame`.
#[inline]
pub fn decode_frame(rx: &[u8; 3]) -> u16 {
    ((u16::from(rx[1]) << 8) | u16::from(rx[2])) & SAMPLE_MASK
}
