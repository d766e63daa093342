//! The pin adapter
//!
//! A [`Pin`] binds a controller (looked up by name) and a line index. It
//! holds no state of its own: every operation is a direct call into the
//! controller's `configure`, `read` or `write`.
//!
//! ## Call forms
//!
//! Scripting front-ends expose a pin both through named methods
//! (`init`, `value`, `low`, `high`) and as a callable object. [`Pin::call`]
//! implements the callable form: no argument reads the line, one argument
//! writes it, anything more is an arity error.

mod config;

pub use config::PinConfig;

use crate::error::{Error, InvalidPin, Result};
use crate::gpio::flags::{GPIO_DIR_IN, GPIO_DIR_OUT, GPIO_PUD_PULL_DOWN, GPIO_PUD_PULL_UP};
use crate::gpio::{ControllerRegistry, GpioController};
use core::fmt;

/// A GPIO line on a named controller
///
/// The controller is borrowed from the registry and never released by the
/// pin; dropping a `Pin` leaves the hardware as it is.
#[derive(Clone, Copy)]
pub struct Pin<'a> {
    controller: &'a dyn GpioController,
    line: u32,
}

impl<'a> Pin<'a> {
    /// Input direction encoding
    pub const IN: u32 = GPIO_DIR_IN;
    /// Output direction encoding
    pub const OUT: u32 = GPIO_DIR_OUT;
    /// Pull-up encoding
    pub const PULL_UP: u32 = GPIO_PUD_PULL_UP;
    /// Pull-down encoding
    pub const PULL_DOWN: u32 = GPIO_PUD_PULL_DOWN;

    /// Bind a line on the controller registered as `name`
    ///
    /// The line is not touched; use [`with_config`](Self::with_config) to
    /// configure it in the same step.
    pub fn new<R>(registry: &'a R, name: &str, line: u32) -> Result<Self>
    where
        R: ControllerRegistry + ?Sized,
    {
        let controller = registry.lookup(name).ok_or_else(|| {
            log::debug!("pin: no controller named '{}'", name);
            Error::InvalidPin(InvalidPin::UnknownController)
        })?;

        Ok(Self::from_controller(controller, line))
    }

    /// Bind a line and configure it immediately
    ///
    /// If the configuration is rejected no pin is returned, although the
    /// driver may already have been called.
    pub fn with_config<R>(registry: &'a R, name: &str, line: u32, config: &PinConfig) -> Result<Self>
    where
        R: ControllerRegistry + ?Sized,
    {
        let pin = Self::new(registry, name, line)?;
        pin.init(config)?;
        Ok(pin)
    }

    /// Wrap an already resolved controller handle
    pub fn from_controller(controller: &'a dyn GpioController, line: u32) -> Self {
        Self { controller, line }
    }

    /// Controller this pin lives on
    pub fn controller(&self) -> &'a dyn GpioController {
        self.controller
    }

    /// Line index on the controller
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Configure direction and pull, then apply the initial value if any
    ///
    /// The initial value is only written once the driver accepted the
    /// configuration, and a failing write is reported.
    pub fn init(&self, config: &PinConfig) -> Result<()> {
        let flags = config.flags();
        log::trace!("{}: configure flags=0x{:X}", self, flags.bits());

        if let Err(e) = self.controller.configure(self.line, flags) {
            log::debug!("{}: configure rejected: {}", self, e);
            return Err(Error::InvalidPin(InvalidPin::Rejected { line: self.line }));
        }

        if let Some(value) = config.value {
            self.write(value)?;
        }

        Ok(())
    }

    /// Read the raw line level as reported by the driver
    pub fn read(&self) -> Result<u32> {
        let level = self.controller.read(self.line)?;
        log::trace!("{}: read {}", self, level);
        Ok(level)
    }

    /// Drive the line
    pub fn write(&self, level: bool) -> Result<()> {
        log::trace!("{}: write {}", self, level as u8);
        self.controller.write(self.line, level)
    }

    /// Drive the line low
    pub fn low(&self) -> Result<()> {
        self.write(false)
    }

    /// Drive the line high
    pub fn high(&self) -> Result<()> {
        self.write(true)
    }

    /// Read (`None`) or write (`Some(level)`) the line
    ///
    /// Returns the level for a read and `None` for a write.
    pub fn value(&self, level: Option<bool>) -> Result<Option<u32>> {
        match level {
            None => self.read().map(Some),
            Some(level) => self.write(level).map(|()| None),
        }
    }

    /// Callable-object dispatch over already truthiness-converted arguments
    pub fn call(&self, args: &[bool]) -> Result<Option<u32>> {
        match args {
            [] => self.value(None),
            [level] => self.value(Some(*level)),
            _ => Err(Error::Arity {
                max: 1,
                given: args.len(),
            }),
        }
    }
}

impl fmt::Display for Pin<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pin({}@{})", self.controller.name(), self.line)
    }
}

impl fmt::Debug for Pin<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pin")
            .field("controller", &self.controller.name())
            .field("line", &self.line)
            .finish()
    }
}
