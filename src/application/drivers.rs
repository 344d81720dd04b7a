//! Registry of explicitly owned driver handles.
//!
//! The implicit global driver is never stored here; an empty registry at
//! teardown means "disconnect the implicit driver".

use crate::domain::DriverHandle;

#[derive(Debug, Default)]
pub struct DriverRegistry {
    drivers: Vec<DriverHandle>,
}

impl DriverRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, driver: DriverHandle) {
        self.drivers.push(driver);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DriverHandle> {
        self.drivers.iter()
    }

    /// Remove and return every handle in registration order.
    pub fn take_all(&mut self) -> Vec<DriverHandle> {
        std::mem::take(&mut self.drivers)
    }
}
