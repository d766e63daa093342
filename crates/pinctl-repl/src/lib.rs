//! Steel Scheme REPL for scripting GPIO pins
//!
//! This crate provides a Scheme REPL (Read-Eval-Print Loop) that exposes the
//! pin adapter to interactive sessions and scripts.
//!
//! # Features
//!
//! - Pin construction with positional and keyword options
//! - Read/write through `pin-value`, `pin-call`, `pin-low` and `pin-high`
//! - `IN`, `OUT`, `PULL_UP` and `PULL_DOWN` constants
//! - Syntax highlighting and multi-line input
//! - Command history with arrow key navigation
//! - Tab completion for known functions
//!
//! # Example Session
//!
//! ```scheme
//! λ > (gpio-controllers)
//! => ("GPIO_0" "GPIO_1")
//!
//! λ > (define led (pin "GPIO_0" 4 OUT 'value #t))
//! λ > (pin-value led)
//! => 1
//!
//! λ > (pin->string led)
//! => "Pin(GPIO_0@4)"
//! ```

mod error;
pub mod gpio_module;
pub mod highlight;

pub use error::ReplError;
pub use gpio_module::{create_constants_module, create_gpio_module, PinTable};

use crate::gpio_module::{Controllers, SharedPins, PRELUDE, VOCABULARY};
use crate::highlight::ReplHelper;
use colored::Colorize;
use directories::ProjectDirs;
use pinctl_core::gpio::ControllerSet;
use rustyline::config::Configurer;
use rustyline::error::ReadlineError;
use rustyline::history::FileHistory;
use rustyline::Editor;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use steel::rvals::SteelVal;
use steel::steel_vm::engine::Engine;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn get_banner() -> String {
    format!(
        r#"
         _            _   _
   _ __ (_)_ __   ___| |_| |
  | '_ \| | '_ \ / __| __| |    Version {}
  | |_) | | | | | (__| |_| |    :? for help
  | .__/|_|_| |_|\___|\__|_|
  |_|
"#,
        VERSION
    )
    .bright_yellow()
    .bold()
    .to_string()
}

fn get_history_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "pinctl") {
        let mut path = proj_dirs.data_dir().to_path_buf();
        std::fs::create_dir_all(&path).ok();
        path.push("repl_history");
        path
    } else {
        PathBuf::from(".pinctl_history")
    }
}

/// Keep the controllers alive for the rest of the process
///
/// Pins handed to Scheme code borrow from the set and the engine may hold
/// on to them indefinitely.
fn leak_controllers(controllers: ControllerSet) -> Controllers {
    log::debug!(
        "repl: session controllers: {}",
        controllers.names().collect::<Vec<_>>().join(", ")
    );
    Box::leak(Box::new(controllers))
}

/// Build an engine with the GPIO modules registered and the prelude loaded
fn create_engine(controllers: Controllers) -> Result<Engine, ReplError> {
    let mut engine = Engine::new();

    let pins: SharedPins = Arc::new(Mutex::new(PinTable::new()));
    engine.register_module(create_gpio_module(controllers, pins));
    engine.register_module(create_constants_module());

    engine
        .run(PRELUDE)
        .map_err(|e| ReplError::SteelError(format!("{}", e)))?;

    Ok(engine)
}

fn print_results(results: impl IntoIterator<Item = SteelVal>) {
    for result in results {
        if !matches!(result, SteelVal::Void) {
            print!("{} ", "=>".bright_blue().bold());
            println!("{}", result);
        }
    }
}

/// Run the Steel REPL over the given controllers
pub fn run_repl(controllers: ControllerSet) -> Result<(), ReplError> {
    let mut engine = create_engine(leak_controllers(controllers))?;

    let helper = ReplHelper::new(VOCABULARY.iter().copied());
    let mut rl = Editor::<ReplHelper, FileHistory>::new()?;
    rl.set_helper(Some(helper));
    rl.set_check_cursor_position(true);

    let history_path = get_history_path();
    if rl.load_history(&history_path).is_err() {
        log::debug!("repl: no history at {}", history_path.display());
    }

    println!("{}", get_banner());
    println!(
        "Type {} for available commands, {} or {} to exit.",
        "(pinctl-help)".bright_cyan(),
        "(quit)".bright_cyan(),
        "(exit)".bright_cyan()
    );
    println!();

    let prompt = format!("{} ", "λ >".bright_green().bold());

    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(&line);

                match input {
                    "(quit)" | "(exit)" | ":q" | ":quit" => {
                        println!("Goodbye!");
                        break;
                    }
                    ":?" | ":help" => {
                        print_help();
                        continue;
                    }
                    _ => {}
                }

                match engine.run(line.clone()) {
                    Ok(results) => print_results(results),
                    Err(e) => eprintln!("{}: {}", "Error".bright_red().bold(), e),
                }

                let _ = std::io::stdout().flush();
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                eprintln!("{}: {:?}", "Error".bright_red().bold(), err);
                break;
            }
        }
    }

    if let Err(e) = rl.save_history(&history_path) {
        eprintln!(
            "{}: Failed to save history: {}",
            "Warning".bright_yellow(),
            e
        );
    }

    Ok(())
}

fn print_help() {
    println!(
        "
    {} -- displays help dialog
    {}    -- exits the REPL

    {}    -- show pinctl GPIO commands
    ",
        ":? | :help".bright_cyan(),
        ":q | :quit".bright_cyan(),
        "(pinctl-help)".bright_cyan(),
    );
}

/// Run a Steel script over the given controllers
pub fn run_script(controllers: ControllerSet, script: String) -> Result<(), ReplError> {
    let mut engine = create_engine(leak_controllers(controllers))?;

    let results = engine
        .run(script)
        .map_err(|e| ReplError::SteelError(format!("{}", e)))?;
    print_results(results);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinctl_dummy::{dummy_controllers, DummyConfig};

    fn engine() -> Engine {
        create_engine(leak_controllers(dummy_controllers(&DummyConfig::default()))).unwrap()
    }

    fn eval(engine: &mut Engine, src: &'static str) -> SteelVal {
        engine.run(src).unwrap().pop().unwrap()
    }

    #[test]
    fn test_script_pin_lifecycle() {
        let mut engine = engine();

        engine
            .run("(define led (pin \"GPIO_0\" 4 OUT 'value #t))")
            .unwrap();
        assert!(matches!(eval(&mut engine, "(pin-value led)"), SteelVal::IntV(1)));

        engine.run("(pin-call led 0)").unwrap();
        assert!(matches!(eval(&mut engine, "(pin-value led)"), SteelVal::IntV(0)));

        engine.run("(pin-high led)").unwrap();
        assert!(matches!(eval(&mut engine, "(pin-call led)"), SteelVal::IntV(1)));

        engine.run("(pin-init led IN PULL_UP)").unwrap();
        assert!(matches!(eval(&mut engine, "(pin-value led)"), SteelVal::IntV(1)));
        engine.run("(pin-init led 'mode IN 'pull PULL_DOWN)").unwrap();
        assert!(matches!(eval(&mut engine, "(pin-value led)"), SteelVal::IntV(0)));

        let printed = eval(&mut engine, "(pin->string led)");
        assert!(matches!(&printed, SteelVal::StringV(s) if s.to_string() == "Pin(GPIO_0@4)"));
        assert!(matches!(eval(&mut engine, "(pin-line led)"), SteelVal::IntV(4)));
    }

    #[test]
    fn test_script_errors() {
        let mut engine = engine();
        engine.run("(define led (pin \"GPIO_0\" 4))").unwrap();

        let err = engine.run("(pin-value led 1 2)").unwrap_err();
        assert!(err.to_string().contains("at most 1 argument"));

        let err = engine.run("(pin \"nope\" 0)").unwrap_err();
        assert!(err.to_string().contains("invalid pin"));

        assert!(engine.run("(pin \"GPIO_0\" 1 'value #t)").is_err());
        assert!(engine.run("(pin \"GPIO_0\" 1 OUT 'speed 3)").is_err());
    }

    #[test]
    fn test_script_rebinding_same_line() {
        let mut engine = engine();
        engine.run("(define a (pin \"GPIO_1\" 3 OUT))").unwrap();
        assert!(matches!(
            eval(&mut engine, "(= a (pin \"GPIO_1\" 3))"),
            SteelVal::BoolV(true)
        ));
        assert!(matches!(
            eval(&mut engine, "(= a (pin \"GPIO_1\" 2))"),
            SteelVal::BoolV(false)
        ));
    }
}
