//! Pin configuration builder

use crate::gpio::flags::{Direction, PinFlags, Pull};

/// Configuration applied by [`Pin::init`](super::Pin::init)
///
/// `mode` is required; `pull` defaults to [`Pull::None`] and the initial
/// output level is optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PinConfig {
    /// Line direction
    pub mode: Direction,
    /// Pull resistor selection
    pub pull: Pull,
    /// Level written right after a successful configure
    pub value: Option<bool>,
}

impl PinConfig {
    /// Create a configuration with the given direction and no pull
    pub fn new(mode: Direction) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Shorthand for an input configuration
    pub fn input() -> Self {
        Self::new(Direction::In)
    }

    /// Shorthand for an output configuration
    pub fn output() -> Self {
        Self::new(Direction::Out)
    }

    /// Set the pull resistor
    pub fn with_pull(mut self, pull: Pull) -> Self {
        self.pull = pull;
        self
    }

    /// Set the pull resistor, `None` meaning no pull
    pub fn with_optional_pull(mut self, pull: Option<Pull>) -> Self {
        self.pull = pull.unwrap_or_default();
        self
    }

    /// Set the initial output level
    pub fn with_value(mut self, value: bool) -> Self {
        self.value = Some(value);
        self
    }

    /// Flag word for the driver's configure call
    pub fn flags(&self) -> PinFlags {
        self.mode.flags() | self.pull.flags()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpio::flags::{GPIO_DIR_OUT, GPIO_PUD_PULL_DOWN};

    #[test]
    fn test_defaults() {
        let config = PinConfig::output();
        assert_eq!(config.pull, Pull::None);
        assert_eq!(config.value, None);
        assert_eq!(config.flags(), PinFlags::OUTPUT);
    }

    #[test]
    fn test_builder() {
        let config = PinConfig::output()
            .with_pull(Pull::Down)
            .with_value(true);
        assert_eq!(config.flags().bits(), GPIO_DIR_OUT | GPIO_PUD_PULL_DOWN);
        assert_eq!(config.value, Some(true));

        let config = config.with_optional_pull(None);
        assert_eq!(config.pull, Pull::None);
    }
}
