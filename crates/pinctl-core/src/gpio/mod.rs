//! GPIO driver abstractions
//!
//! This module contains the traits a board-support driver implements, the
//! flag encoding passed to it, and (with `alloc`) a simple registry that
//! resolves controller names to driver instances.

pub mod flags;
#[cfg(feature = "alloc")]
mod registry;
mod traits;

pub use flags::{Direction, PinFlags, Pull};
#[cfg(feature = "alloc")]
pub use registry::{BoxedController, ControllerSet};
pub use traits::{ControllerRegistry, GpioController};
