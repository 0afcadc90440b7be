use crate::Error::{DriverNotFound, InvalidUrl, IoError};
use crate::error::Result;
use crate::{Connection, Driver};
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::{Arc, LazyLock, RwLock};
use tracing::instrument;
use url::Url;

type DriverMap = BTreeMap<&'static str, Arc<dyn Driver>>;

static DRIVERS: LazyLock<Arc<RwLock<DriverMap>>> =
    LazyLock::new(|| Arc::new(RwLock::new(BTreeMap::new())));

/// Manages available drivers
#[derive(Debug)]
pub struct DriverManager {}

impl DriverManager {
    /// Add a new driver to the list of available drivers
    ///
    /// # Errors
    /// * If a lock for drivers cannot be acquired
    pub fn add(driver: Arc<dyn Driver>) -> Result<()> {
        let identifier = driver.identifier();
        let mut drivers = DRIVERS
            .write()
            .map_err(|error| IoError(error.to_string()))?;
        let _ = drivers.insert(identifier, driver);
        Ok(())
    }

    /// Get a drivers by name
    ///
    /// # Errors
    /// * If a lock for drivers cannot be acquired
    pub fn get<S: AsRef<str>>(identifier: S) -> Result<Option<Arc<dyn Driver>>> {
        let identifier = identifier.as_ref();
        let drivers = DRIVERS.read().map_err(|error| IoError(error.to_string()))?;
        let Some(driver) = drivers.get(identifier) else {
            return Ok(None);
        };
        Ok(Some(driver.clone()))
    }

    /// Get all drivers
    ///
    /// # Errors
    /// * If a lock for drivers cannot be acquired
    pub fn drivers() -> Result<Vec<Arc<dyn Driver>>> {
        let drivers = DRIVERS.read().map_err(|error| IoError(error.to_string()))?;
        Ok(drivers.values().cloned().collect())
    }

    /// Connect to a database; the URL scheme selects the driver
    ///
    /// # Errors
    /// * If the URL is invalid, no driver is registered for its scheme or the driver fails
    ///   to connect
    #[instrument(name = "connect", level = "info", skip(url))]
    pub async fn connect<S: AsRef<str>>(url: S) -> Result<Box<dyn Connection>> {
        let url = url.as_ref();
        let parsed_url = Url::parse(url).map_err(|error| InvalidUrl(error.to_string()))?;
        let scheme = parsed_url.scheme();

        match Self::get(scheme)? {
            Some(driver) => driver.connect(url).await,
            None => Err(DriverNotFound(scheme.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MockConnection, MockDriver};

    const IDENTIFIER: &str = "test";

    fn add_mock_driver() -> Result<()> {
        let mut mock_driver = MockDriver::new();
        mock_driver.expect_identifier().returning(|| IDENTIFIER);
        mock_driver
            .expect_connect()
            .returning(|url| Ok(Box::new(MockConnection::new().with_url(url))));
        DriverManager::add(Arc::new(mock_driver))?;
        Ok(())
    }

    #[test]
    fn test_add() -> Result<()> {
        add_mock_driver()?;

        let drivers = DriverManager::drivers()?;
        assert!(
            drivers
                .iter()
                .any(|driver| driver.identifier() == IDENTIFIER)
        );
        let result = DriverManager::get(IDENTIFIER)?;
        assert!(result.is_some());
        assert!(DriverManager::get("unknown")?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_connect() -> Result<()> {
        add_mock_driver()?;
        let url = format!("{IDENTIFIER}://user:password@localhost/testdb");
        let connection = DriverManager::connect(url.as_str()).await?;
        assert_eq!(connection.url(), &url);
        Ok(())
    }

    #[tokio::test]
    async fn test_connect_without_colon() -> Result<()> {
        add_mock_driver()?;
        let result = DriverManager::connect(IDENTIFIER).await;
        assert!(matches!(result, Err(InvalidUrl(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_connect_driver_not_found() {
        let result = DriverManager::connect("oracle://localhost/testdb").await;
        assert!(matches!(result, Err(DriverNotFound(scheme)) if scheme == "oracle"));
    }
}
