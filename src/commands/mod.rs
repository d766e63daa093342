//! CLI command implementations
//!
//! ## Pin commands
//!
//! `read`, `write` and `init` bind a single [`Pin`](pinctl_core::Pin) on the
//! selected backend and perform one operation on it.
//!
//! ## Listing
//!
//! `list-backends` needs no hardware; `list-controllers` opens the backend.

mod list;
mod pin;
#[cfg(feature = "repl")]
mod repl;

pub use list::{list_backends, list_controllers};
pub use pin::{cmd_init, cmd_read, cmd_write};
#[cfg(feature = "repl")]
pub use repl::cmd_repl;
