//! pinctl-linux-gpio - Linux GPIO character device controllers
//!
//! This crate exposes the chips behind `/dev/gpiochipN` as pinctl
//! controllers, using the gpiocdev crate which implements the GPIO
//! character device interface in pure Rust.
//!
//! # Example
//!
//! ```no_run
//! use pinctl_core::{Pin, PinConfig};
//! use pinctl_linux_gpio::{open_controllers, LinuxGpioConfig};
//!
//! let controllers = open_controllers(&LinuxGpioConfig::new(["/dev/gpiochip0"]))?;
//!
//! let led = Pin::with_config(&controllers, "gpiochip0", 17, &PinConfig::output())?;
//! led.high()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Usage with the pinctl CLI
//!
//! ```bash
//! # All chips found in /dev
//! pinctl -b linux_gpio read gpiochip0 4
//!
//! # A single chip by number
//! pinctl -b linux_gpio:gpiochip=0 write gpiochip0 17 high
//! ```
//!
//! # System Requirements
//!
//! - Linux kernel 4.8+ with GPIO character device support (kernel 5.5+ for v2 API)
//! - Access to `/dev/gpiochipN` devices (may require root or udev rules)

pub mod device;
pub mod error;

pub use device::{open_controllers, parse_options, scan_chips, LinuxGpioConfig, LinuxGpioController};
pub use error::{LinuxGpioError, Result};

use pinctl_core::gpio::ControllerSet;

/// Open Linux GPIO controllers from backend options
pub fn open_linux_gpio(
    options: &[(&str, &str)],
) -> std::result::Result<ControllerSet, Box<dyn std::error::Error>> {
    let config = parse_options(options)?;
    Ok(open_controllers(&config)?)
}
