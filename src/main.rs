//! pinctl - GPIO pin control from the command line and from Scheme scripts
//!
//! # Architecture
//!
//! A backend (see [`backends`]) opens a set of named GPIO controllers. Every
//! command binds a [`Pin`](pinctl_core::Pin) on one of them by controller
//! name and line index, so the same code drives the in-memory emulator and
//! real Linux GPIO chips.

mod backends;
mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .init();

    match cli.command {
        Commands::ListBackends => {
            commands::list_backends();
            Ok(())
        }
        Commands::ListControllers => {
            let controllers = backends::open_backend(&cli.backend)?;
            commands::list_controllers(&controllers);
            Ok(())
        }
        Commands::Read { pin, mode, pull } => {
            let controllers = backends::open_backend(&cli.backend)?;
            commands::cmd_read(&controllers, &pin, mode, pull)
        }
        Commands::Write { pin, level, pull } => {
            let controllers = backends::open_backend(&cli.backend)?;
            commands::cmd_write(&controllers, &pin, level, pull)
        }
        Commands::Init {
            pin,
            mode,
            pull,
            value,
        } => {
            let controllers = backends::open_backend(&cli.backend)?;
            commands::cmd_init(&controllers, &pin, mode, pull, value)
        }
        #[cfg(feature = "repl")]
        Commands::Repl { script } => {
            let controllers = backends::open_backend(&cli.backend)?;
            commands::cmd_repl(controllers, script.as_deref())
        }
    }
}
