use sqlbench_driver::{Connection, Driver, Result};
use std::fmt::Debug;
use std::sync::Arc;
use tracing::instrument;

/// Manages available drivers
#[derive(Debug)]
pub struct DriverManager {}

impl DriverManager {
    /// Add a new driver to the list of available drivers
    ///
    /// # Errors
    /// * If a lock for drivers cannot be acquired
    pub fn add(driver: Arc<dyn Driver>) -> Result<()> {
        sqlbench_driver::DriverManager::add(driver)
    }

    /// Get a drivers by name
    ///
    /// # Errors
    /// * If a lock for drivers cannot be acquired
    pub fn get<S: AsRef<str>>(identifier: S) -> Result<Option<Arc<dyn Driver>>> {
        sqlbench_driver::DriverManager::get(identifier)
    }

    /// Get all drivers
    ///
    /// # Errors
    /// * If a lock for drivers cannot be acquired
    pub fn drivers() -> Result<Vec<Arc<dyn Driver>>> {
        sqlbench_driver::DriverManager::drivers()
    }

    /// Connect to a database
    ///
    /// # Errors
    /// * If the URL is invalid, no driver is registered for its scheme or the driver fails
    ///   to connect
    #[instrument(name = "connect", level = "info", skip(url))]
    pub async fn connect<S: AsRef<str>>(url: S) -> Result<Box<dyn Connection>> {
        sqlbench_driver::DriverManager::connect(url).await
    }

    /// Initialize known drivers based on enabled features
    ///
    /// # Errors
    /// * If a lock for drivers cannot be acquired
    pub fn initialize() -> Result<()> {
        #[cfg(feature = "driver-mariadb")]
        Self::add(Arc::new(sqlbench_driver_mariadb::Driver))?;
        #[cfg(feature = "driver-mysql")]
        Self::add(Arc::new(sqlbench_driver_mysql::Driver))?;
        #[cfg(feature = "driver-postgresql")]
        Self::add(Arc::new(sqlbench_driver_postgresql::Driver))?;
        Ok(())
    }
}
