//! Single-pin commands

use crate::cli::{ModeArg, PinArgs, PullArg};
use pinctl_core::gpio::{ControllerSet, Direction, Pull};
use pinctl_core::{Pin, PinConfig};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

impl From<ModeArg> for Direction {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::In => Direction::In,
            ModeArg::Out => Direction::Out,
        }
    }
}

impl From<PullArg> for Pull {
    fn from(pull: PullArg) -> Self {
        match pull {
            PullArg::None => Pull::None,
            PullArg::Up => Pull::Up,
            PullArg::Down => Pull::Down,
        }
    }
}

fn pin_config(mode: ModeArg, pull: Option<PullArg>, value: Option<bool>) -> PinConfig {
    let config = PinConfig::new(mode.into()).with_optional_pull(pull.map(Pull::from));
    match value {
        Some(value) => config.with_value(value),
        None => config,
    }
}

fn bind<'a>(
    controllers: &'a ControllerSet,
    args: &PinArgs,
) -> Result<Pin<'a>, Box<dyn std::error::Error>> {
    Pin::new(controllers, &args.controller, args.line).map_err(|e| {
        format!(
            "{} (controller '{}', available: {})",
            e,
            args.controller,
            controllers.names().collect::<Vec<_>>().join(", ")
        )
        .into()
    })
}

/// Read a line, optionally configuring it first
pub fn cmd_read(
    controllers: &ControllerSet,
    args: &PinArgs,
    mode: Option<ModeArg>,
    pull: Option<PullArg>,
) -> CmdResult {
    let pin = bind(controllers, args)?;
    if let Some(mode) = mode {
        pin.init(&pin_config(mode, pull, None))?;
    }

    let level = pin.read()?;
    log::debug!("{}: level {}", pin, level);
    println!("{}", level);
    Ok(())
}

/// Drive a line, configuring it as output with a pull first if requested
pub fn cmd_write(
    controllers: &ControllerSet,
    args: &PinArgs,
    level: bool,
    pull: Option<PullArg>,
) -> CmdResult {
    let pin = bind(controllers, args)?;
    match pull {
        Some(pull) => pin.init(&pin_config(ModeArg::Out, Some(pull), Some(level)))?,
        None => pin.write(level)?,
    }

    log::info!("{}: driven {}", pin, if level { "high" } else { "low" });
    Ok(())
}

/// Configure a line
pub fn cmd_init(
    controllers: &ControllerSet,
    args: &PinArgs,
    mode: ModeArg,
    pull: Option<PullArg>,
    value: Option<bool>,
) -> CmdResult {
    let config = pin_config(mode, pull, value);
    let pin = Pin::with_config(controllers, &args.controller, args.line, &config)?;
    log::info!(
        "{}: configured {:?}, pull {:?}{}",
        pin,
        config.mode,
        config.pull,
        match config.value {
            Some(v) => format!(", value {}", v as u8),
            None => String::new(),
        }
    );
    Ok(())
}

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use super::*;
    use pinctl_dummy::{dummy_controllers, DummyConfig};

    fn controllers() -> ControllerSet {
        dummy_controllers(&DummyConfig::default())
    }

    fn args(controller: &str, line: u32) -> PinArgs {
        PinArgs {
            controller: controller.to_string(),
            line,
        }
    }

    #[test]
    fn test_pin_config_mapping() {
        let config = pin_config(ModeArg::Out, Some(PullArg::Down), Some(true));
        assert_eq!(
            config,
            PinConfig::output().with_pull(Pull::Down).with_value(true)
        );
        assert_eq!(pin_config(ModeArg::In, None, None), PinConfig::input());
    }

    #[test]
    fn test_init_then_read() {
        let set = controllers();
        cmd_init(&set, &args("GPIO_0", 4), ModeArg::Out, None, Some(true)).unwrap();
        cmd_write(&set, &args("GPIO_0", 4), false, None).unwrap();

        let pin = Pin::new(&set, "GPIO_0", 4).unwrap();
        assert_eq!(pin.read(), Ok(0));
    }

    #[test]
    fn test_write_with_pull_configures_output() {
        let set = controllers();
        cmd_write(&set, &args("GPIO_1", 2), true, Some(PullArg::Up)).unwrap();
        let pin = Pin::new(&set, "GPIO_1", 2).unwrap();
        assert_eq!(pin.read(), Ok(1));
    }

    #[test]
    fn test_unknown_controller_lists_available() {
        let set = controllers();
        let err = cmd_read(&set, &args("GPIO_7", 0), None, None).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("invalid pin"));
        assert!(msg.contains("GPIO_0, GPIO_1"));
    }
}
