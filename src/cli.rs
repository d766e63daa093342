//! CLI argument parsing

use crate::backends;
use clap::{Parser, Subcommand, ValueEnum};
#[cfg(feature = "repl")]
use std::path::PathBuf;

/// Generate dynamic help text for the backend argument
fn backend_help() -> String {
    format!(
        "GPIO backend, optionally with parameters (name:key=value,...) [available: {}]",
        backends::backend_names_short()
    )
}

/// Parse a line level: high/low, on/off, 1/0
fn parse_level(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "high" | "on" | "1" | "true" => Ok(true),
        "low" | "off" | "0" | "false" => Ok(false),
        _ => Err(format!("Invalid level '{}' (expected high or low)", s)),
    }
}

#[derive(Parser)]
#[command(name = "pinctl")]
#[command(author, version, about = "GPIO pin control", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short, long, global = true, default_value = "dummy", help = backend_help())]
    pub backend: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Line direction as given on the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeArg {
    /// Input
    In,
    /// Output
    Out,
}

/// Pull resistor as given on the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PullArg {
    /// No pull resistor
    None,
    /// Pull-up
    Up,
    /// Pull-down
    Down,
}

/// Identifies one line on one controller
#[derive(clap::Args, Debug, Clone)]
pub struct PinArgs {
    /// Controller name (see list-controllers)
    pub controller: String,

    /// Line index on the controller
    pub line: u32,
}

impl Cli {
    /// Default log filter for the requested verbosity
    ///
    /// `RUST_LOG` still overrides it.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read a line level
    Read {
        #[command(flatten)]
        pin: PinArgs,

        /// Configure the line before reading
        #[arg(short, long, value_enum)]
        mode: Option<ModeArg>,

        /// Pull resistor (requires --mode)
        #[arg(short, long, value_enum, requires = "mode")]
        pull: Option<PullArg>,
    },

    /// Drive a line
    Write {
        #[command(flatten)]
        pin: PinArgs,

        /// Level to drive: high or low (also 1/0, on/off)
        #[arg(value_parser = parse_level, action = clap::ArgAction::Set)]
        level: bool,

        /// Configure the line as output first, with this pull resistor
        #[arg(short, long, value_enum)]
        pull: Option<PullArg>,
    },

    /// Configure a line
    Init {
        #[command(flatten)]
        pin: PinArgs,

        /// Line direction
        #[arg(short, long, value_enum)]
        mode: ModeArg,

        /// Pull resistor
        #[arg(short, long, value_enum)]
        pull: Option<PullArg>,

        /// Level written after configuring (high or low)
        #[arg(long, value_parser = parse_level)]
        value: Option<bool>,
    },

    /// List backends compiled into this binary
    ListBackends,

    /// List the controllers of the selected backend
    ListControllers,

    /// Start an interactive Scheme REPL for scripting pins
    #[cfg(feature = "repl")]
    Repl {
        /// Run a script file instead of the interactive REPL
        #[arg(short, long)]
        script: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("HIGH"), Ok(true));
        assert_eq!(parse_level("0"), Ok(false));
        assert!(parse_level("maybe").is_err());
    }

    #[test]
    fn test_parse_init() {
        let cli = Cli::try_parse_from([
            "pinctl", "-vv", "-b", "dummy:lines=8", "init", "GPIO_0", "4", "--mode", "out",
            "--pull", "up", "--value", "high",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.backend, "dummy:lines=8");
        match cli.command {
            Commands::Init {
                pin,
                mode,
                pull,
                value,
            } => {
                assert_eq!(pin.controller, "GPIO_0");
                assert_eq!(pin.line, 4);
                assert_eq!(mode, ModeArg::Out);
                assert_eq!(pull, Some(PullArg::Up));
                assert_eq!(value, Some(true));
            }
            _ => panic!("expected init"),
        }
    }

    #[test]
    fn test_log_filter_follows_verbosity() {
        let filter = |args: &[&str]| Cli::try_parse_from(args).unwrap().log_filter();
        assert_eq!(filter(&["pinctl", "list-backends"]), "info");
        assert_eq!(filter(&["pinctl", "-v", "list-backends"]), "debug");
        assert_eq!(filter(&["pinctl", "list-backends", "-vv"]), "trace");
        assert_eq!(filter(&["pinctl", "-vvv", "list-backends"]), "trace");
    }

    #[test]
    fn test_read_pull_requires_mode() {
        assert!(Cli::try_parse_from(["pinctl", "read", "GPIO_0", "1", "--pull", "up"]).is_err());
    }

    #[test]
    fn test_default_backend() {
        let cli = Cli::try_parse_from(["pinctl", "write", "GPIO_1", "2", "low"]).unwrap();
        assert_eq!(cli.backend, "dummy");
        assert!(matches!(cli.command, Commands::Write { level: false, .. }));
    }
}
