//! Linux USB HID gadget transport (`/dev/hidgN`).
//!
//! The gadget function must be created through configfs with
//! `report_length = 3` and `REPORT_DESCRIPTOR` as its `report_desc`.
//! Writes are non-blocking: when the host has not drained the previous report
//! the write fails with `WouldBlock` and the report is dropped.
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use pedal_traits::{BoxError, ReportSink};
use tracing::trace;

use crate::error::{HwError, Result};

/// Bytes per input report: Gas, Brake, Clutch.
pub const REPORT_LEN: usize = 3;

/// Joystick with three absolute 8-bit axes (X = gas, Y = brake, Z = clutch).
pub const REPORT_DESCRIPTOR: [u8; 29] = [
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x04, // Usage (Joystick)
    0xA1, 0x01, // Collection (Application)
    0x09, 0x01, //   Usage (Pointer)
    0xA1, 0x00, //   Collection (Physical)
    0x09, 0x30, //     Usage (X)
    0x09, 0x31, //     Usage (Y)
    0x09, 0x32, //     Usage (Z)
    0x15, 0x00, //     Logical Minimum (0)
    0x26, 0xFF, 0x00, //     Logical Maximum (255)
    0x75, 0x08, //     Report Size (8)
    0x95, 0x03, //     Report Count (3)
    0x81, 0x02, //     Input (Data, Var, Abs)
    0xC0, //   End Collection
    0xC0, // End Collection
];

pub struct HidGadget {
    file: File,
    path: PathBuf,
}

impl HidGadget {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut opts = OpenOptions::new();
        opts.write(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            opts.custom_flags(libc::O_NONBLOCK);
        }
        let file = opts.open(&path)?;
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_report(&mut self, report: &[u8]) -> Result<()> {
        if report.len() != REPORT_LEN {
            return Err(HwError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("report must be {REPORT_LEN} bytes, got {}", report.len()),
            )));
        }
        self.file.write_all(report)?;
        trace!(path = %self.path.display(), ?report, "hid report written");
        Ok(())
    }
}

impl ReportSink for HidGadget {
    fn send(&mut self, report: &[u8]) -> std::result::Result<(), BoxError> {
        self.write_report(report).map_err(|e| Box::new(e) as BoxError)
    }
}
