#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core pedal pipeline (hardware-agnostic).
//!
//! This crate turns three potentiometer readings into a 3-byte HID report. All
//! hardware interactions go through the `pedal_traits::AnalogFrontEnd`,
//! `ReportSink` and `StatusLed` traits.
//!
//! ## Architecture
//!
//! - **Acquisition**: settled single-channel conversions (`reader` module)
//! - **Filtering**: integer EMA per channel (`filter` module)
//! - **Calibration**: min/max learning over a fixed window, then a one-way
//!   switch to Running (`calibration` module)
//! - **Mapping**: scale, deadzone and inversion to one byte (`mapping` module)
//! - **Reporting**: rate-limited fire-and-forget reports (`report` module)
//! - **Status**: state-dependent blink cadence and bursts (`indicator` module)
//!
//! ## Integer Arithmetic
//!
//! Every stage works on unsigned integers with truncating division, so a given
//! raw input sequence always produces the same report bytes.

pub mod builder;
pub mod calibration;
pub mod channel;
pub mod config;
pub mod conversions;
pub mod core;
pub mod error;
pub mod fault;
pub mod filter;
pub mod hw_error;
pub mod indicator;
pub mod mapping;
pub mod mocks;
pub mod reader;
pub mod report;
pub mod status;

pub use crate::builder::{
    Missing, Pedalbox, PedalboxBuilder, PedalboxG, PipelineCfg, Set, build_pedalbox,
};
pub use crate::calibration::{CalibrationEngine, SystemState};
pub use crate::channel::{CHANNELS, ChannelId, PedalChannel, RAW_MAX};
pub use crate::config::{
    AcquisitionCfg, CalibrationCfg, ChannelCfg, DeadzoneCfg, FilterCfg, LoopCfg, ReportCfg,
    StatusCfg,
};
pub use crate::core::PedalCore;
pub use crate::error::{BuildError, PedalError, Result};
pub use crate::fault::fail_stop;
pub use crate::filter::smooth;
pub use crate::mapping::DeadzoneMapper;
pub use crate::report::{Emission, PedalReport, ReportScheduler};
pub use crate::status::{LoopStats, StepStatus};
