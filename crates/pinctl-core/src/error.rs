//! Error types for pinctl-core
//!
//! This module provides a no_std compatible error type shared by the pin
//! adapter and the GPIO drivers.

use core::fmt;

/// Reason a pin could not be bound or configured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidPin {
    /// Controller name lookup returned nothing
    UnknownController,
    /// The driver refused the requested configuration
    Rejected {
        /// Line the configuration was requested for
        line: u32,
    },
    /// Mode value does not match any known direction encoding
    BadMode(u32),
    /// Pull value does not match any known pull encoding
    BadPull(u32),
}

/// Core error type - no_std compatible, Copy for cheap propagation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Controller lookup or configure failed
    InvalidPin(InvalidPin),
    /// Call/value dispatch received too many arguments
    Arity {
        /// Maximum number of arguments accepted
        max: usize,
        /// Number of arguments supplied
        given: usize,
    },
    /// Driver failed to read the line level
    ReadFailed {
        /// Line being read
        line: u32,
    },
    /// Driver failed to drive the line
    WriteFailed {
        /// Line being written
        line: u32,
    },
    /// Line index is beyond what the controller provides
    LineOutOfRange {
        /// Offending line index
        line: u32,
    },
}

impl fmt::Display for InvalidPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownController => write!(f, "no such GPIO controller"),
            Self::Rejected { line } => {
                write!(f, "configuration rejected for line {}", line)
            }
            Self::BadMode(mode) => write!(f, "unknown mode 0x{:X}", mode),
            Self::BadPull(pull) => write!(f, "unknown pull 0x{:X}", pull),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPin(reason) => write!(f, "invalid pin: {}", reason),
            Self::Arity { max, given } => write!(
                f,
                "function takes at most {} argument{} ({} given)",
                max,
                if *max == 1 { "" } else { "s" },
                given
            ),
            Self::ReadFailed { line } => write!(f, "failed to read line {}", line),
            Self::WriteFailed { line } => write!(f, "failed to write line {}", line),
            Self::LineOutOfRange { line } => write!(f, "line {} out of range", line),
        }
    }
}

impl From<InvalidPin> for Error {
    fn from(reason: InvalidPin) -> Self {
        Self::InvalidPin(reason)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
