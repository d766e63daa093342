//! Driver trait definitions

use super::flags::PinFlags;
use crate::error::Result;

/// A GPIO controller (one hardware block owning a set of lines)
///
/// All methods take `&self`: a controller is a shared, process-wide resource
/// and implementations provide their own interior synchronisation. The
/// adapter never coordinates concurrent users of the same line.
pub trait GpioController: Send + Sync {
    /// Name the controller is registered under (e.g. `GPIO_0`)
    fn name(&self) -> &str;

    /// Number of lines, if the driver knows it
    fn num_lines(&self) -> Option<u32> {
        None
    }

    /// Set direction and pull mode of a line
    ///
    /// `flags` is the OR of a direction and a pull encoding. Drivers return
    /// an error for combinations they cannot apply.
    fn configure(&self, line: u32, flags: PinFlags) -> Result<()>;

    /// Read the raw level of a line
    ///
    /// Typically 0 or 1, but drivers may report wider status bits which are
    /// passed through unmasked.
    fn read(&self, line: u32) -> Result<u32>;

    /// Drive a line high (`true`) or low (`false`)
    fn write(&self, line: u32, level: bool) -> Result<()>;
}

/// Resolves controller names to controller handles
pub trait ControllerRegistry: Send + Sync {
    /// Look up a controller by name
    fn lookup(&self, name: &str) -> Option<&dyn GpioController>;
}

impl<R: ControllerRegistry + ?Sized> ControllerRegistry for &R {
    fn lookup(&self, name: &str) -> Option<&dyn GpioController> {
        (**self).lookup(name)
    }
}
