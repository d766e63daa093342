//! REPL command implementation

use pinctl_core::gpio::ControllerSet;
use std::path::Path;

/// Run the Scheme REPL or execute a script
pub fn cmd_repl(
    controllers: ControllerSet,
    script: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(script_path) = script {
        let script_content = std::fs::read_to_string(script_path)?;
        pinctl_repl::run_script(controllers, script_content)?;
    } else {
        pinctl_repl::run_repl(controllers)?;
    }

    Ok(())
}
