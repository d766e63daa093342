//! GPIO configuration flag encoding
//!
//! The numeric values are those understood by the driver layer: direction
//! occupies bit 0 and the pull resistor selection sits at `GPIO_PUD_POS`.
//! They are re-exported as class-level constants on [`Pin`](crate::pin::Pin)
//! so script code can pass them straight back as `mode`/`pull` arguments.

use crate::error::{InvalidPin, Result};
use bitflags::bitflags;

/// Line is an input
pub const GPIO_DIR_IN: u32 = 0;
/// Line is an output
pub const GPIO_DIR_OUT: u32 = 1 << 0;
/// Mask of the direction field
pub const GPIO_DIR_MASK: u32 = 0x1;

/// Bit position of the pull field
pub const GPIO_PUD_POS: u32 = 8;
/// No pull resistor ("normal")
pub const GPIO_PUD_NORMAL: u32 = 0 << GPIO_PUD_POS;
/// Pull-up resistor enabled
pub const GPIO_PUD_PULL_UP: u32 = 1 << GPIO_PUD_POS;
/// Pull-down resistor enabled
pub const GPIO_PUD_PULL_DOWN: u32 = 2 << GPIO_PUD_POS;
/// Mask of the pull field
pub const GPIO_PUD_MASK: u32 = 3 << GPIO_PUD_POS;

bitflags! {
    /// Flag word handed to [`GpioController::configure`](super::GpioController::configure)
    ///
    /// Input direction and "normal" pull are the all-zero encodings, so an
    /// empty flag word means "input, no pull".
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PinFlags: u32 {
        /// Drive the line as an output
        const OUTPUT    = GPIO_DIR_OUT;
        /// Enable the pull-up resistor
        const PULL_UP   = GPIO_PUD_PULL_UP;
        /// Enable the pull-down resistor
        const PULL_DOWN = GPIO_PUD_PULL_DOWN;
    }
}

impl Default for PinFlags {
    fn default() -> Self {
        PinFlags::empty()
    }
}

impl PinFlags {
    /// Direction encoded in this flag word
    pub fn direction(&self) -> Direction {
        if self.contains(PinFlags::OUTPUT) {
            Direction::Out
        } else {
            Direction::In
        }
    }

    /// Pull mode encoded in this flag word
    ///
    /// Returns `None` when both pull bits are set, which no driver accepts.
    pub fn pull(&self) -> Option<Pull> {
        match self.bits() & GPIO_PUD_MASK {
            GPIO_PUD_NORMAL => Some(Pull::None),
            GPIO_PUD_PULL_UP => Some(Pull::Up),
            GPIO_PUD_PULL_DOWN => Some(Pull::Down),
            _ => None,
        }
    }
}

/// Line direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Input (`GPIO_DIR_IN`)
    #[default]
    In,
    /// Output (`GPIO_DIR_OUT`)
    Out,
}

impl Direction {
    /// Parse a raw driver encoding
    pub fn from_raw(raw: u32) -> Result<Self> {
        match raw {
            GPIO_DIR_IN => Ok(Self::In),
            GPIO_DIR_OUT => Ok(Self::Out),
            other => Err(InvalidPin::BadMode(other).into()),
        }
    }

    /// Raw driver encoding
    pub const fn raw(self) -> u32 {
        match self {
            Self::In => GPIO_DIR_IN,
            Self::Out => GPIO_DIR_OUT,
        }
    }

    /// Flag word contribution
    pub fn flags(self) -> PinFlags {
        PinFlags::from_bits_retain(self.raw())
    }
}

/// Pull resistor selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Pull {
    /// No pull resistor (`GPIO_PUD_NORMAL`)
    #[default]
    None,
    /// Pull-up (`GPIO_PUD_PULL_UP`)
    Up,
    /// Pull-down (`GPIO_PUD_PULL_DOWN`)
    Down,
}

impl Pull {
    /// Parse a raw driver encoding
    pub fn from_raw(raw: u32) -> Result<Self> {
        match raw {
            GPIO_PUD_NORMAL => Ok(Self::None),
            GPIO_PUD_PULL_UP => Ok(Self::Up),
            GPIO_PUD_PULL_DOWN => Ok(Self::Down),
            other => Err(InvalidPin::BadPull(other).into()),
        }
    }

    /// Raw driver encoding
    pub const fn raw(self) -> u32 {
        match self {
            Self::None => GPIO_PUD_NORMAL,
            Self::Up => GPIO_PUD_PULL_UP,
            Self::Down => GPIO_PUD_PULL_DOWN,
        }
    }

    /// Flag word contribution
    pub fn flags(self) -> PinFlags {
        PinFlags::from_bits_retain(self.raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_flag_word_combines_direction_and_pull() {
        let flags = Direction::Out.flags() | Pull::Up.flags();
        assert_eq!(flags.bits(), GPIO_DIR_OUT | GPIO_PUD_PULL_UP);
        assert_eq!(flags.direction(), Direction::Out);
        assert_eq!(flags.pull(), Some(Pull::Up));
    }

    #[test]
    fn test_input_no_pull_is_empty() {
        let flags = Direction::In.flags() | Pull::None.flags();
        assert!(flags.is_empty());
        assert_eq!(flags.direction(), Direction::In);
        assert_eq!(flags.pull(), Some(Pull::None));
    }

    #[test]
    fn test_conflicting_pull_bits() {
        let flags = PinFlags::PULL_UP | PinFlags::PULL_DOWN;
        assert_eq!(flags.pull(), None);
    }

    #[test]
    fn test_from_raw_rejects_unknown() {
        assert_eq!(Direction::from_raw(1), Ok(Direction::Out));
        assert_eq!(
            Direction::from_raw(7),
            Err(Error::InvalidPin(InvalidPin::BadMode(7)))
        );
        assert_eq!(Pull::from_raw(GPIO_PUD_PULL_DOWN), Ok(Pull::Down));
        assert_eq!(
            Pull::from_raw(GPIO_PUD_MASK),
            Err(Error::InvalidPin(InvalidPin::BadPull(GPIO_PUD_MASK)))
        );
    }
}
