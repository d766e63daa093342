//! Heap-backed controller registry

use super::traits::{ControllerRegistry, GpioController};
use alloc::boxed::Box;
use alloc::vec::Vec;

/// Boxed controller type for dynamic dispatch
pub type BoxedController = Box<dyn GpioController>;

/// An owned set of controllers, looked up by name
///
/// Backends build one of these at startup; pins borrow controllers out of it
/// for as long as the set lives.
#[derive(Default)]
pub struct ControllerSet {
    controllers: Vec<BoxedController>,
}

impl ControllerSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a controller
    ///
    /// Lookups return the first controller registered under a name.
    pub fn add(&mut self, controller: BoxedController) {
        if self.lookup(controller.name()).is_some() {
            log::warn!(
                "controller '{}' registered twice, later entry is unreachable",
                controller.name()
            );
        }
        self.controllers.push(controller);
    }

    /// Builder-style [`add`](Self::add)
    pub fn with(mut self, controller: BoxedController) -> Self {
        self.add(controller);
        self
    }

    /// Names of all registered controllers, in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.controllers.iter().map(|c| c.name())
    }

    /// Iterate over the controllers
    pub fn iter(&self) -> impl Iterator<Item = &dyn GpioController> {
        self.controllers.iter().map(|c| &**c)
    }

    /// Number of controllers
    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    /// True if no controller is registered
    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}

impl ControllerRegistry for ControllerSet {
    fn lookup(&self, name: &str) -> Option<&dyn GpioController> {
        self.controllers
            .iter()
            .find(|c| c.name() == name)
            .map(|c| &**c)
    }
}
