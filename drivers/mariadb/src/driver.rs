use async_trait::async_trait;
use sqlbench_driver::Result;

/// MariaDB speaks the MySQL protocol; connections are served by the MySQL driver.
#[derive(Debug)]
pub struct Driver;

#[async_trait]
impl sqlbench_driver::Driver for Driver {
    fn identifier(&self) -> &'static str {
        "mariadb"
    }

    async fn connect(&self, url: &str) -> Result<Box<dyn sqlbench_driver::Connection>> {
        sqlbench_driver::Driver::connect(&sqlbench_driver_mysql::Driver, url).await
    }
}
