//! Error types for Linux GPIO controllers

use std::path::PathBuf;
use thiserror::Error;

/// Linux GPIO specific errors
#[derive(Debug, Error)]
pub enum LinuxGpioError {
    /// Failed to open GPIO chip
    #[error("Failed to open GPIO chip '{}': {source}", path.display())]
    ChipOpenFailed {
        path: PathBuf,
        #[source]
        source: gpiocdev::Error,
    },

    /// Failed to request a GPIO line
    #[error("Failed to request line {offset}: {source}")]
    LineRequestFailed {
        offset: u32,
        #[source]
        source: gpiocdev::Error,
    },

    /// Failed to reconfigure a requested line
    #[error("Failed to reconfigure line {offset}: {source}")]
    ReconfigureFailed {
        offset: u32,
        #[source]
        source: gpiocdev::Error,
    },

    /// Failed to set GPIO line value
    #[error("Failed to set GPIO line value: {0}")]
    SetValueFailed(#[source] gpiocdev::Error),

    /// Failed to get GPIO line value
    #[error("Failed to get GPIO line value: {0}")]
    GetValueFailed(#[source] gpiocdev::Error),

    /// Could not list /dev for GPIO chips
    #[error("Failed to scan for GPIO chips: {0}")]
    ScanFailed(#[source] std::io::Error),

    /// No GPIO chip found or specified
    #[error("No GPIO chip found. Use dev=/dev/gpiochipN or gpiochip=N")]
    NoChips,
}

/// Result type for Linux GPIO operations
pub type Result<T> = std::result::Result<T, LinuxGpioError>;
