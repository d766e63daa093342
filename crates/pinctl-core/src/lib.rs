//! pinctl-core - Core library for driving GPIO lines through a pin object
//!
//! This crate provides the driver-facing traits (`GpioController`,
//! `ControllerRegistry`), the configuration flag encoding shared with the
//! drivers, and the `Pin` adapter that scripting front-ends expose to users.
//! It is designed to be `no_std` compatible so the same adapter can sit on
//! top of a board-support driver.
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc`)
//! - `alloc` - Enable `ControllerSet`, a heap-backed controller registry
//!
//! # Example
//!
//! ```ignore
//! use pinctl_core::pin::{Pin, PinConfig};
//! use pinctl_core::gpio::Direction;
//!
//! fn blink(registry: &impl pinctl_core::gpio::ControllerRegistry) -> pinctl_core::Result<()> {
//!     let led = Pin::with_config(registry, "GPIO_0", 13, &PinConfig::new(Direction::Out))?;
//!     led.high()?;
//!     led.low()?;
//!     Ok(())
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod error;
pub mod gpio;
pub mod pin;

pub use error::{Error, InvalidPin, Result};
pub use pin::{Pin, PinConfig};
