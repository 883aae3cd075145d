//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "pedalbox", version, about = "USB pedal box controller")]
pub struct Cli {
    /// Path to config TOML; a missing file means stock settings
    #[arg(long, value_name = "FILE", default_value = "etc/pedalbox.toml")]
    pub config: PathBuf,

    /// Log as JSON lines instead of pretty; reports and results go to stdout as JSON
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Log level (error|warn|info|debug|trace); overrides `[logging] level`, default info
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Memory locking mode for real-time operation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum RtLock {
    /// Do not lock memory
    None,
    /// Lock currently resident pages
    Current,
    /// Lock current and future pages
    All,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Calibrate, then stream pedal reports until interrupted
    Run {
        /// Stop after this many loop passes (runs until Ctrl-C otherwise)
        #[arg(long, value_name = "N")]
        max_loops: Option<u64>,
        /// Print loop latency and report counters on exit
        #[arg(long, action = ArgAction::SetTrue)]
        stats: bool,
        /// Enable real-time mode (SCHED_FIFO, mlockall)
        #[arg(
            long,
            action = ArgAction::SetTrue,
            long_help = "Enable real-time mode (Linux, requires the `rt` feature).\n\nAttempts SCHED_FIFO priority and mlockall to keep the report cadence steady. Needs CAP_SYS_NICE / CAP_IPC_LOCK or root; failures are logged and the loop runs anyway."
        )]
        rt: bool,
        /// Real-time priority for SCHED_FIFO (1..=max)
        #[arg(long, value_name = "PRIO")]
        rt_prio: Option<i32>,
        /// Memory locking mode for --rt: none, current, or all
        #[arg(long, value_enum, value_name = "MODE", default_value = "current")]
        rt_lock: RtLock,
    },
    /// Bring up the backend and print one raw acquisition
    SelfCheck,
    /// Print the HID report descriptor (for gadget configfs setup)
    Descriptor {
        /// Write to FILE instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
        /// Write raw bytes instead of hex (configfs `report_desc` wants raw)
        #[arg(long, action = ArgAction::SetTrue, requires = "out")]
        raw: bool,
    },
}
