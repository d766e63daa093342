//! Error types for the REPL

use thiserror::Error;

/// Errors that can occur in the REPL
#[derive(Error, Debug)]
pub enum ReplError {
    /// I/O error (reading the script, terminal setup)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Line editor failure
    #[error("Line editor error: {0}")]
    Editor(#[from] rustyline::error::ReadlineError),

    /// Steel evaluation error
    #[error("Scheme error: {0}")]
    SteelError(String),
}
