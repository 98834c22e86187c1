// Error types for the teleop node
use std::io;
use std::path::PathBuf;

/// Everything in here is fatal: main reports it and exits.
#[derive(Debug, thiserror::Error)]
pub enum TeleopError {
    #[error("Terminal unavailable: {0}")]
    DeviceUnavailable(#[source] io::Error),

    #[error("Failed to read key: {0}")]
    InputReadError(#[source] io::Error),

    #[error("Motion-command channel fault: {0}")]
    Channel(#[source] zenoh::Error),

    #[error("Failed to encode command: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to load parameters from {}: {reason}", path.display())]
    ParamFile { path: PathBuf, reason: String },

    #[error("Failed to install interrupt handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

pub type Result<T> = std::result::Result<T, TeleopError>;
