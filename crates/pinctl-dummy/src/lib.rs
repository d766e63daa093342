//! pinctl-dummy - In-memory GPIO controller emulator
//!
//! This crate provides a dummy GPIO controller that keeps line state in
//! memory and records every driver call it receives. It's useful for testing
//! scripts and the pin adapter without real hardware.
//!
//! Line behaviour:
//!
//! - a line that was never configured reads back the last level written to it
//! - an output reads back its output latch
//! - an input reads the level applied with [`DummyController::set_input`],
//!   or its pull resistor when nothing drives it (pull-up reads 1, pull-down
//!   and no pull read 0)

use std::sync::{Mutex, MutexGuard};

use pinctl_core::error::{Error, InvalidPin, Result};
use pinctl_core::gpio::{
    ControllerRegistry, ControllerSet, Direction, GpioController, PinFlags, Pull,
};

/// Default controller names
const DEFAULT_CONTROLLERS: &[&str] = &["GPIO_0", "GPIO_1"];

/// Default number of lines per controller
const DEFAULT_NUM_LINES: u32 = 32;

/// Largest `lines=` value accepted from a backend string
const MAX_NUM_LINES: u32 = 1024;

/// Configuration for the dummy controllers
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Controller names to register
    pub controllers: Vec<String>,
    /// Lines per controller
    pub num_lines: u32,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            controllers: DEFAULT_CONTROLLERS.iter().map(|s| s.to_string()).collect(),
            num_lines: DEFAULT_NUM_LINES,
        }
    }
}

/// A driver call as seen by the emulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverCall {
    /// `configure(line, flags)`
    Configure {
        /// Line index
        line: u32,
        /// Flag word received
        flags: PinFlags,
    },
    /// `read(line)`
    Read {
        /// Line index
        line: u32,
    },
    /// `write(line, level)`
    Write {
        /// Line index
        line: u32,
        /// Level received
        level: bool,
    },
}

/// Driver operation to fail on purpose
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Reject every configure call
    Configure,
    /// Fail every read
    Read,
    /// Fail every write
    Write,
}

#[derive(Debug, Clone, Copy, Default)]
struct LineState {
    /// `None` until the line is configured
    direction: Option<Direction>,
    pull: Pull,
    latch: bool,
    /// Level applied from outside, for inputs
    external: Option<bool>,
}

impl LineState {
    fn level(&self) -> bool {
        match self.direction {
            None | Some(Direction::Out) => self.latch,
            Some(Direction::In) => self.external.unwrap_or(self.pull == Pull::Up),
        }
    }
}

struct DummyState {
    lines: Vec<LineState>,
    calls: Vec<DriverCall>,
    fault: Option<Fault>,
}

/// Dummy GPIO controller
///
/// Emulates a bank of GPIO lines in memory for testing purposes.
pub struct DummyController {
    name: String,
    num_lines: u32,
    state: Mutex<DummyState>,
}

impl DummyController {
    /// Create a controller with `num_lines` lines, all unconfigured and low
    pub fn new(name: impl Into<String>, num_lines: u32) -> Self {
        Self {
            name: name.into(),
            num_lines,
            state: Mutex::new(DummyState {
                lines: vec![LineState::default(); num_lines as usize],
                calls: Vec::new(),
                fault: None,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, DummyState> {
        // A panic while holding the lock leaves plain data behind; keep going
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_line(&self, line: u32) -> Result<()> {
        if line >= self.num_lines {
            return Err(Error::LineOutOfRange { line });
        }
        Ok(())
    }

    /// All driver calls received so far, oldest first
    pub fn calls(&self) -> Vec<DriverCall> {
        self.state().calls.clone()
    }

    /// Forget the recorded calls
    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// Apply an external level to a line (`None` lets the pull decide)
    pub fn set_input(&self, line: u32, level: Option<bool>) {
        if let Some(state) = self.state().lines.get_mut(line as usize) {
            state.external = level;
        }
    }

    /// Make a driver operation fail until cleared with `None`
    pub fn inject_fault(&self, fault: Option<Fault>) {
        self.state().fault = fault;
    }

    /// Direction and pull of a configured line
    pub fn line_config(&self, line: u32) -> Option<(Direction, Pull)> {
        let state = self.state();
        let line = state.lines.get(line as usize)?;
        line.direction.map(|dir| (dir, line.pull))
    }

    /// Current output latch of a line
    pub fn latch(&self, line: u32) -> Option<bool> {
        self.state().lines.get(line as usize).map(|l| l.latch)
    }
}

impl GpioController for DummyController {
    fn name(&self) -> &str {
        &self.name
    }

    fn num_lines(&self) -> Option<u32> {
        Some(self.num_lines)
    }

    fn configure(&self, line: u32, flags: PinFlags) -> Result<()> {
        let mut state = self.state();
        state.calls.push(DriverCall::Configure { line, flags });
        self.check_line(line)?;

        if state.fault == Some(Fault::Configure) {
            return Err(Error::InvalidPin(InvalidPin::Rejected { line }));
        }
        if !PinFlags::all().contains(flags) {
            log::warn!("{}: unknown flag bits 0x{:X}", self.name, flags.bits());
            return Err(Error::InvalidPin(InvalidPin::Rejected { line }));
        }
        let Some(pull) = flags.pull() else {
            log::warn!("{}: line {} cannot pull up and down at once", self.name, line);
            return Err(Error::InvalidPin(InvalidPin::Rejected { line }));
        };

        let entry = &mut state.lines[line as usize];
        entry.direction = Some(flags.direction());
        entry.pull = pull;
        log::trace!(
            "{}: line {} configured {:?} pull={:?}",
            self.name,
            line,
            flags.direction(),
            pull
        );
        Ok(())
    }

    fn read(&self, line: u32) -> Result<u32> {
        let mut state = self.state();
        state.calls.push(DriverCall::Read { line });
        self.check_line(line)?;

        if state.fault == Some(Fault::Read) {
            return Err(Error::ReadFailed { line });
        }
        Ok(state.lines[line as usize].level() as u32)
    }

    fn write(&self, line: u32, level: bool) -> Result<()> {
        let mut state = self.state();
        state.calls.push(DriverCall::Write { line, level });
        self.check_line(line)?;

        if state.fault == Some(Fault::Write) {
            return Err(Error::WriteFailed { line });
        }
        state.lines[line as usize].latch = level;
        Ok(())
    }
}

/// A lone controller answers lookups for its own name
impl ControllerRegistry for DummyController {
    fn lookup(&self, name: &str) -> Option<&dyn GpioController> {
        (name == self.name).then_some(self as &dyn GpioController)
    }
}

/// Build a controller set from the configuration
pub fn dummy_controllers(config: &DummyConfig) -> ControllerSet {
    let mut set = ControllerSet::new();
    for name in &config.controllers {
        set.add(Box::new(DummyController::new(name.clone(), config.num_lines)));
    }
    log::info!(
        "dummy: {} controller(s) with {} lines each",
        set.len(),
        config.num_lines
    );
    set
}

/// Parse backend options from a list of key-value pairs
///
/// # Supported Options
///
/// - `controllers=A+B` - Controller names, `+` separated (default `GPIO_0+GPIO_1`)
/// - `lines=N` - Lines per controller (default 32, at most 1024)
pub fn parse_options(options: &[(&str, &str)]) -> std::result::Result<DummyConfig, String> {
    let mut config = DummyConfig::default();

    for (key, value) in options {
        match *key {
            "controllers" => {
                config.controllers = value
                    .split('+')
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
                if config.controllers.is_empty() {
                    return Err("controllers must name at least one controller".to_string());
                }
            }
            "lines" => {
                config.num_lines = value
                    .parse()
                    .map_err(|_| format!("Invalid lines value: {}", value))?;
                if config.num_lines > MAX_NUM_LINES {
                    return Err(format!(
                        "lines must be at most {} (got {})",
                        MAX_NUM_LINES, config.num_lines
                    ));
                }
            }
            _ => {
                log::warn!("dummy: Unknown option: {}={}", key, value);
            }
        }
    }

    Ok(config)
}

/// Open the dummy backend and return its controllers
pub fn open_dummy(
    options: &[(&str, &str)],
) -> std::result::Result<ControllerSet, Box<dyn std::error::Error>> {
    let config = parse_options(options)?;
    Ok(dummy_controllers(&config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinctl_core::{Pin, PinConfig};

    fn gpio0() -> DummyController {
        DummyController::new("GPIO_0", 8)
    }

    #[test]
    fn test_bind_read_write_without_configure() {
        let ctrl = gpio0();
        let pin = Pin::new(&ctrl, "GPIO_0", 3).unwrap();
        pin.write(true).unwrap();
        assert_eq!(pin.read(), Ok(1));
        assert_eq!(
            ctrl.calls(),
            [
                DriverCall::Write {
                    line: 3,
                    level: true
                },
                DriverCall::Read { line: 3 }
            ]
        );
        assert_eq!(ctrl.line_config(3), None);
    }

    #[test]
    fn test_nonexistent_controller() {
        let set = dummy_controllers(&DummyConfig::default());
        let err = Pin::new(&set, "nonexistent", 0).unwrap_err();
        assert_eq!(err, Error::InvalidPin(InvalidPin::UnknownController));
    }

    #[test]
    fn test_configure_is_idempotent() {
        let ctrl = gpio0();
        let pin = Pin::new(&ctrl, "GPIO_0", 1).unwrap();
        pin.init(&PinConfig::output()).unwrap();
        assert_eq!(ctrl.line_config(1), Some((Direction::Out, Pull::None)));
        pin.init(&PinConfig::output()).unwrap();
        assert_eq!(ctrl.line_config(1), Some((Direction::Out, Pull::None)));
    }

    #[test]
    fn test_high_low_round_trip() {
        let ctrl = gpio0();
        let pin = Pin::new(&ctrl, "GPIO_0", 2).unwrap();
        pin.init(&PinConfig::output()).unwrap();
        pin.high().unwrap();
        assert_eq!(pin.value(None), Ok(Some(1)));
        pin.low().unwrap();
        assert_eq!(pin.value(None), Ok(Some(0)));
    }

    #[test]
    fn test_initial_value_follows_configure() {
        let ctrl = gpio0();
        let config = PinConfig::output().with_value(true);
        let pin = Pin::with_config(&ctrl, "GPIO_0", 5, &config).unwrap();
        assert_eq!(
            ctrl.calls(),
            [
                DriverCall::Configure {
                    line: 5,
                    flags: PinFlags::OUTPUT
                },
                DriverCall::Write {
                    line: 5,
                    level: true
                }
            ]
        );
        assert_eq!(ctrl.latch(5), Some(true));
        assert_eq!(pin.read(), Ok(1));
    }

    #[test]
    fn test_rejected_configure_writes_nothing() {
        let ctrl = gpio0();
        ctrl.inject_fault(Some(Fault::Configure));
        let config = PinConfig::output().with_value(true);
        let err = Pin::with_config(&ctrl, "GPIO_0", 5, &config).unwrap_err();
        assert_eq!(err, Error::InvalidPin(InvalidPin::Rejected { line: 5 }));
        assert_eq!(ctrl.calls().len(), 1);
        assert_eq!(ctrl.latch(5), Some(false));
    }

    #[test]
    fn test_conflicting_pulls_rejected() {
        let ctrl = gpio0();
        let err = ctrl
            .configure(0, PinFlags::PULL_UP | PinFlags::PULL_DOWN)
            .unwrap_err();
        assert_eq!(err, Error::InvalidPin(InvalidPin::Rejected { line: 0 }));
    }

    #[test]
    fn test_line_out_of_range() {
        let ctrl = gpio0();
        let pin = Pin::new(&ctrl, "GPIO_0", 8).unwrap();
        assert_eq!(pin.read(), Err(Error::LineOutOfRange { line: 8 }));
        assert_eq!(
            pin.init(&PinConfig::input()),
            Err(Error::InvalidPin(InvalidPin::Rejected { line: 8 }))
        );
    }

    #[test]
    fn test_io_faults_propagate() {
        let ctrl = gpio0();
        let pin = Pin::new(&ctrl, "GPIO_0", 0).unwrap();
        ctrl.inject_fault(Some(Fault::Read));
        assert_eq!(pin.value(None), Err(Error::ReadFailed { line: 0 }));
        ctrl.inject_fault(Some(Fault::Write));
        assert_eq!(pin.high(), Err(Error::WriteFailed { line: 0 }));
        ctrl.inject_fault(None);
        assert_eq!(pin.high(), Ok(()));
    }

    #[test]
    fn test_input_levels() {
        let ctrl = gpio0();
        let pin = Pin::new(&ctrl, "GPIO_0", 4).unwrap();
        pin.init(&PinConfig::input().with_pull(Pull::Up)).unwrap();
        assert_eq!(pin.read(), Ok(1));
        ctrl.set_input(4, Some(false));
        assert_eq!(pin.read(), Ok(0));

        pin.init(&PinConfig::input().with_pull(Pull::Down)).unwrap();
        ctrl.set_input(4, None);
        assert_eq!(pin.read(), Ok(0));

        // Writing an input only moves the latch
        pin.high().unwrap();
        assert_eq!(pin.read(), Ok(0));
    }

    #[test]
    fn test_call_arity() {
        let ctrl = gpio0();
        let pin = Pin::new(&ctrl, "GPIO_0", 0).unwrap();
        assert_eq!(
            pin.call(&[true, true]),
            Err(Error::Arity { max: 1, given: 2 })
        );
        assert!(ctrl.calls().is_empty());
    }

    #[test]
    fn test_parse_options() {
        let config = parse_options(&[("controllers", "gpioa+gpiob+gpioc"), ("lines", "16")]).unwrap();
        assert_eq!(config.controllers, ["gpioa", "gpiob", "gpioc"]);
        assert_eq!(config.num_lines, 16);

        assert!(parse_options(&[("lines", "many")]).is_err());
        assert!(parse_options(&[("lines", "4294967295")]).is_err());
        assert!(parse_options(&[("lines", "1025")]).is_err());
        assert_eq!(parse_options(&[("lines", "1024")]).unwrap().num_lines, 1024);
        assert!(parse_options(&[("controllers", "")]).is_err());

        let set = dummy_controllers(&config);
        assert_eq!(set.names().collect::<Vec<_>>(), ["gpioa", "gpiob", "gpioc"]);
        assert_eq!(set.lookup("gpiob").and_then(|c| c.num_lines()), Some(16));
    }
}
