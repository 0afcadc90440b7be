#[cfg(target_os = "linux")]
use sqlbench_driver::{Dialect, Driver, Value};
#[cfg(target_os = "linux")]
use testcontainers::runners::AsyncRunner;

#[cfg(target_os = "linux")]
#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn test_mariadb_driver() -> anyhow::Result<()> {
    let image =
        testcontainers::ContainerRequest::from(testcontainers_modules::mariadb::Mariadb::default());
    let container = image.start().await?;
    let port = container.get_host_port_ipv4(3306).await?;

    let database_url = format!("mariadb://root@127.0.0.1:{port}/test");
    let mut connection = sqlbench_driver_mariadb::Driver
        .connect(database_url.as_str())
        .await?;
    assert_eq!(database_url, connection.url().as_str());
    assert_eq!(connection.dialect(), Dialect::MySql);

    let _ = connection
        .execute("CREATE TABLE users (id INT PRIMARY KEY, status VARCHAR(20))", &[])
        .await?;
    let _ = connection
        .execute(
            "INSERT INTO users (id, status) VALUES (?, ?)",
            &[&1i32, &"active"],
        )
        .await?;
    let mut query_result = connection
        .query("SELECT status FROM users", &[])
        .await?;
    assert_eq!(
        query_result.next().await.cloned(),
        Some(vec![Value::String("active".to_string())])
    );

    connection.close().await?;
    container.stop().await?;
    container.rm().await?;
    Ok(())
}
