//! Linux GPIO character device controller
//!
//! Each `/dev/gpiochipN` becomes one controller named after its device node
//! (`gpiochip0`, ...). Lines are requested from the kernel on first use and
//! kept for the lifetime of the controller; later configure calls reconfigure
//! the existing request.
//!
//! A line that is read before it was ever configured is requested as an
//! input; a line that is written first is requested as an output driving the
//! written level.

use crate::error::{LinuxGpioError, Result};

use gpiocdev::chip::Chip;
use gpiocdev::line::{Bias, Offset, Value};
use gpiocdev::request::{Config, Request};

use pinctl_core::error::{Error as CoreError, InvalidPin, Result as CoreResult};
use pinctl_core::gpio::{ControllerSet, Direction, GpioController, PinFlags, Pull};

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Consumer label shown by the kernel for lines we hold
const CONSUMER: &str = "pinctl";

/// Device directory scanned when no chip is given
const DEV_DIR: &str = "/dev";

fn to_value(level: bool) -> Value {
    if level {
        Value::Active
    } else {
        Value::Inactive
    }
}

fn to_bias(pull: Pull) -> Bias {
    match pull {
        Pull::None => Bias::Disabled,
        Pull::Up => Bias::PullUp,
        Pull::Down => Bias::PullDown,
    }
}

/// Configuration for opening Linux GPIO controllers
#[derive(Debug, Clone, Default)]
pub struct LinuxGpioConfig {
    /// Chip device paths; empty means scan `/dev`
    pub chips: Vec<PathBuf>,
}

impl LinuxGpioConfig {
    /// Create a configuration for the given chip paths
    pub fn new<P: Into<PathBuf>>(chips: impl IntoIterator<Item = P>) -> Self {
        Self {
            chips: chips.into_iter().map(Into::into).collect(),
        }
    }
}

/// Lines held by a controller
///
/// `driven` is the last level written to each line. Reconfiguring a line as
/// an output drives that level, never a level read back from an input.
#[derive(Default)]
struct Lines {
    requests: HashMap<Offset, Request>,
    driven: HashMap<Offset, bool>,
}

impl Lines {
    fn output_level(&self, offset: Offset) -> bool {
        self.driven.get(&offset).copied().unwrap_or(false)
    }

    fn record(&mut self, offset: Offset, level: bool) {
        self.driven.insert(offset, level);
    }
}

/// One GPIO chip exposed as a controller
pub struct LinuxGpioController {
    name: String,
    path: PathBuf,
    num_lines: u32,
    lines: Mutex<Lines>,
}

impl LinuxGpioController {
    /// Open the chip at `path`
    ///
    /// The chip is only queried for its line count here; no line is
    /// requested until it is used.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let chip_err = |source| LinuxGpioError::ChipOpenFailed {
            path: path.clone(),
            source,
        };

        let chip = Chip::from_path(&path).map_err(chip_err)?;
        let info = chip.info().map_err(chip_err)?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        log::info!(
            "linux_gpio: Opened {} ({} lines, label '{}')",
            path.display(),
            info.num_lines,
            info.label
        );

        Ok(Self {
            name,
            path,
            num_lines: info.num_lines,
            lines: Mutex::new(Lines::default()),
        })
    }

    /// Device node backing this controller
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lines(&self) -> MutexGuard<'_, Lines> {
        self.lines.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn line_config(offset: Offset, flags: PinFlags, pull: Pull, level: bool) -> Config {
        let mut cfg = Config::default();
        match flags.direction() {
            Direction::Out => cfg.with_line(offset).as_output(to_value(level)),
            Direction::In => cfg.with_line(offset).as_input(),
        };
        cfg.with_bias(to_bias(pull));
        cfg
    }

    fn request(&self, offset: Offset, cfg: Config) -> Result<Request> {
        Request::from_config(cfg)
            .on_chip(&self.path)
            .with_consumer(CONSUMER)
            .request()
            .map_err(|source| LinuxGpioError::LineRequestFailed { offset, source })
    }

    fn do_configure(&self, offset: Offset, flags: PinFlags, pull: Pull) -> Result<()> {
        let mut lines = self.lines();
        let cfg = Self::line_config(offset, flags, pull, lines.output_level(offset));

        if let Some(req) = lines.requests.get(&offset) {
            req.reconfigure(&cfg)
                .map_err(|source| LinuxGpioError::ReconfigureFailed { offset, source })?;
        } else {
            let req = self.request(offset, cfg)?;
            lines.requests.insert(offset, req);
        }
        Ok(())
    }

    fn do_read(&self, offset: Offset) -> Result<u32> {
        let mut lines = self.lines();
        if !lines.requests.contains_key(&offset) {
            let mut cfg = Config::default();
            cfg.with_line(offset).as_input();
            let req = self.request(offset, cfg)?;
            lines.requests.insert(offset, req);
        }

        let value = lines.requests[&offset]
            .value(offset)
            .map_err(LinuxGpioError::GetValueFailed)?;
        Ok(matches!(value, Value::Active) as u32)
    }

    fn do_write(&self, offset: Offset, level: bool) -> Result<()> {
        let mut lines = self.lines();
        match lines.requests.get(&offset) {
            Some(req) => {
                req.set_value(offset, to_value(level))
                    .map_err(LinuxGpioError::SetValueFailed)?;
            }
            None => {
                let mut cfg = Config::default();
                cfg.with_line(offset).as_output(to_value(level));
                let req = self.request(offset, cfg)?;
                lines.requests.insert(offset, req);
            }
        }
        lines.record(offset, level);
        Ok(())
    }

    fn check_line(&self, line: u32) -> CoreResult<()> {
        if line >= self.num_lines {
            return Err(CoreError::LineOutOfRange { line });
        }
        Ok(())
    }
}

impl GpioController for LinuxGpioController {
    fn name(&self) -> &str {
        &self.name
    }

    fn num_lines(&self) -> Option<u32> {
        Some(self.num_lines)
    }

    fn configure(&self, line: u32, flags: PinFlags) -> CoreResult<()> {
        self.check_line(line)?;
        let Some(pull) = flags.pull() else {
            log::error!("{}: conflicting pull flags for line {}", self.name, line);
            return Err(InvalidPin::Rejected { line }.into());
        };

        self.do_configure(line, flags, pull).map_err(|e| {
            log::error!("{}: {}", self.name, e);
            CoreError::InvalidPin(InvalidPin::Rejected { line })
        })
    }

    fn read(&self, line: u32) -> CoreResult<u32> {
        self.check_line(line)?;
        self.do_read(line).map_err(|e| {
            log::error!("{}: {}", self.name, e);
            CoreError::ReadFailed { line }
        })
    }

    fn write(&self, line: u32, level: bool) -> CoreResult<()> {
        self.check_line(line)?;
        self.do_write(line, level).map_err(|e| {
            log::error!("{}: {}", self.name, e);
            CoreError::WriteFailed { line }
        })
    }
}

/// List `/dev/gpiochip*` device nodes, sorted by name
pub fn scan_chips() -> Result<Vec<PathBuf>> {
    let mut chips: Vec<PathBuf> = std::fs::read_dir(DEV_DIR)
        .map_err(LinuxGpioError::ScanFailed)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("gpiochip"))
        })
        .collect();
    chips.sort();
    Ok(chips)
}

/// Open every chip in the configuration (or every chip found) as a controller set
pub fn open_controllers(config: &LinuxGpioConfig) -> Result<ControllerSet> {
    let chips = if config.chips.is_empty() {
        scan_chips()?
    } else {
        config.chips.clone()
    };

    if chips.is_empty() {
        return Err(LinuxGpioError::NoChips);
    }

    let mut set = ControllerSet::new();
    for path in &chips {
        set.add(Box::new(LinuxGpioController::open(path)?));
    }
    Ok(set)
}

/// Parse backend options from a list of key-value pairs
///
/// # Supported Options
///
/// - `dev=/dev/gpiochipN` - GPIO chip device path, `+` separated for several
/// - `gpiochip=N` - GPIO chip number (alternative to dev)
///
/// Without either option every `/dev/gpiochip*` is used.
pub fn parse_options(options: &[(&str, &str)]) -> std::result::Result<LinuxGpioConfig, String> {
    let mut config = LinuxGpioConfig::default();
    let mut gpiochip: Option<u32> = None;

    for (key, value) in options {
        match *key {
            "dev" => {
                config
                    .chips
                    .extend(value.split('+').filter(|s| !s.is_empty()).map(PathBuf::from));
            }
            "gpiochip" => {
                gpiochip = Some(
                    value
                        .parse()
                        .map_err(|_| format!("Invalid gpiochip value: {}", value))?,
                );
            }
            _ => {
                log::warn!("linux_gpio: Unknown option: {}={}", key, value);
            }
        }
    }

    if let Some(n) = gpiochip {
        if !config.chips.is_empty() {
            return Err("Only one of 'dev' or 'gpiochip' can be specified".to_string());
        }
        config.chips.push(PathBuf::from(format!("{}/gpiochip{}", DEV_DIR, n)));
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dev_list() {
        let config = parse_options(&[("dev", "/dev/gpiochip0+/dev/gpiochip2")]).unwrap();
        assert_eq!(
            config.chips,
            [
                PathBuf::from("/dev/gpiochip0"),
                PathBuf::from("/dev/gpiochip2")
            ]
        );
    }

    #[test]
    fn test_parse_gpiochip_number() {
        let config = parse_options(&[("gpiochip", "3")]).unwrap();
        assert_eq!(config.chips, [PathBuf::from("/dev/gpiochip3")]);
        assert!(parse_options(&[("gpiochip", "x")]).is_err());
    }

    #[test]
    fn test_parse_dev_and_gpiochip_conflict() {
        let err = parse_options(&[("dev", "/dev/gpiochip0"), ("gpiochip", "1")]).unwrap_err();
        assert!(err.contains("Only one"));
    }

    #[test]
    fn test_parse_empty_means_scan() {
        let config = parse_options(&[]).unwrap();
        assert!(config.chips.is_empty());
    }

    #[test]
    fn test_output_level_follows_writes_only() {
        let mut lines = Lines::default();
        assert!(!lines.output_level(4));

        lines.record(4, true);
        assert!(lines.output_level(4));
        assert!(!lines.output_level(5));

        lines.record(4, false);
        assert!(!lines.output_level(4));
    }

    #[test]
    fn test_bias_mapping() {
        assert_eq!(to_bias(Pull::Up), Bias::PullUp);
        assert_eq!(to_bias(Pull::Down), Bias::PullDown);
        assert_eq!(to_bias(Pull::None), Bias::Disabled);
    }
}
