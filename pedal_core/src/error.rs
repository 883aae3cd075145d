use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PedalError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("timeout waiting for conversion")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("io error: {0}")]
    Io(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("missing analog front-end")]
    MissingFrontEnd,
    #[error("missing report sink")]
    MissingReportSink,
    #[error("missing status led")]
    MissingStatusLed,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
