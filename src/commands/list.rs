//! List commands implementation

use crate::backends::available_backends;
use pinctl_core::gpio::{ControllerSet, GpioController};

/// List all backends compiled into this binary
pub fn list_backends() {
    let backends = available_backends();
    if backends.is_empty() {
        println!("No backends available (recompile with backend features enabled)");
        return;
    }

    println!("Available backends:");
    println!();
    for b in &backends {
        let aliases = if b.aliases.is_empty() {
            String::new()
        } else {
            format!(" (aliases: {})", b.aliases.join(", "))
        };
        println!("  {:12} - {}{}", b.name, b.description, aliases);
    }
}

/// List the controllers of an opened backend
pub fn list_controllers(controllers: &ControllerSet) {
    if controllers.is_empty() {
        println!("No controllers found.");
        return;
    }

    println!("{:<16} {:>6}", "Controller", "Lines");
    println!("{}", "-".repeat(23));
    for controller in controllers.iter() {
        println!("{}", controller_row(controller));
    }
}

fn controller_row(controller: &dyn GpioController) -> String {
    let lines = controller
        .num_lines()
        .map(|n| n.to_string())
        .unwrap_or_else(|| "?".to_string());
    format!("{:<16} {:>6}", controller.name(), lines)
}

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use super::*;
    use pinctl_dummy::DummyController;

    #[test]
    fn test_controller_row() {
        let ctrl = DummyController::new("GPIO_0", 32);
        let row = controller_row(&ctrl);
        assert!(row.starts_with("GPIO_0 "));
        assert!(row.ends_with(" 32"));
        assert_eq!(row.len(), 23);
    }
}
