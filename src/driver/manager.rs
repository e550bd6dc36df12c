use std::sync::Arc;

use log::debug;
use parking_lot::RwLock;

use super::{Adapter, Driver, Filter, Info};

lazy_static! {
    static ref GLOBAL_MANAGER: Arc<Manager> = Arc::new(Manager::new());
}

/// Manager is the registry of every known capture driver. Drivers are kept
/// in registration order, and every query returns them in that order.
#[derive(Default)]
pub struct Manager {
    drivers: RwLock<Vec<Arc<Driver>>>,
}

impl Manager {
    pub fn new() -> Self {
        Manager {
            drivers: RwLock::new(vec![]),
        }
    }

    /// global returns the process-wide manager backends register with.
    pub fn global() -> Arc<Manager> {
        Arc::clone(&GLOBAL_MANAGER)
    }

    /// register wraps the adapter in a closed driver and appends it to the
    /// registry.
    pub fn register(&self, adapter: Box<dyn Adapter>, info: Info) -> Arc<Driver> {
        let driver = Arc::new(Driver::new(adapter, info));
        debug!(
            "registered driver {} ({}, {})",
            driver.id(),
            driver.info().label,
            driver.info().device_type
        );
        self.drivers.write().push(Arc::clone(&driver));
        driver
    }

    /// query returns every driver the filter matches.
    pub fn query(&self, filter: &Filter) -> Vec<Arc<Driver>> {
        self.drivers
            .read()
            .iter()
            .filter(|d| filter(d))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.drivers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.read().is_empty()
    }
}
