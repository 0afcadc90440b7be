use crate::results::PostgreSqlQueryResult;
use async_trait::async_trait;
use postgresql_embedded::{PostgreSQL, Settings, Status, VersionReq};
use sqlbench_driver::Error::{InvalidUrl, IoError};
use sqlbench_driver::{Dialect, QueryResult, Result, ToSql, Value};
use sqlbench_driver::convert_to_numbered_placeholders;
use sqlx::postgres::{PgArguments, PgConnectOptions, PgPoolOptions};
use sqlx::{Column, PgPool, Postgres, Row};
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::string::ToString;
use tracing::debug;
use url::Url;

const POSTGRESQL_EMBEDDED_VERSION: &str = "=17.2.0";
const EMBEDDED_DATABASE: &str = "testdb";

#[derive(Debug)]
pub struct Driver;

#[async_trait]
impl sqlbench_driver::Driver for Driver {
    fn identifier(&self) -> &'static str {
        "postgresql"
    }

    async fn connect(&self, url: &str) -> Result<Box<dyn sqlbench_driver::Connection>> {
        let parsed_url = Url::parse(url).map_err(|error| InvalidUrl(error.to_string()))?;
        let password = parsed_url.password().map(ToString::to_string);
        let connection = Connection::new(url, password).await?;
        Ok(Box::new(connection))
    }
}

#[derive(Debug)]
pub struct Connection {
    url: String,
    postgresql: Option<PostgreSQL>,
    pool: PgPool,
}

impl Connection {
    /// Creates a new connection to the `PostgreSQL` database.  When the URL carries the
    /// `embedded=true` query parameter an embedded server is installed and started first.
    ///
    /// # Errors
    /// if the connection to the database fails.
    pub async fn new(url: &str, password: Option<String>) -> Result<Connection> {
        let parsed_url = Url::parse(url)?;
        let query_parameters: HashMap<String, String> =
            parsed_url.query_pairs().into_owned().collect();
        let embedded = query_parameters
            .get("embedded")
            .is_some_and(|value| value == "true");
        let mut database_url = url.to_string();

        let postgresql = if embedded {
            let mut settings =
                Settings::from_url(url).map_err(|error| IoError(error.to_string()))?;

            if !query_parameters.contains_key("version") {
                let version = VersionReq::from_str(POSTGRESQL_EMBEDDED_VERSION)
                    .map_err(|error| IoError(error.to_string()))?;
                settings.version = version;
            }
            if let Some(installation_dir) = query_parameters.get("installation_dir") {
                settings.installation_dir = PathBuf::from(installation_dir);
            }
            if let Some(password) = password {
                settings.password = password;
            }

            let mut postgresql = PostgreSQL::new(settings);
            postgresql
                .setup()
                .await
                .map_err(|error| IoError(error.to_string()))?;
            let version = postgresql.settings().version.clone();
            debug!("Starting embedded PostgreSQL {version} server");
            postgresql
                .start()
                .await
                .map_err(|error| IoError(error.to_string()))?;

            if !postgresql
                .database_exists(EMBEDDED_DATABASE)
                .await
                .map_err(|error| IoError(error.to_string()))?
            {
                postgresql
                    .create_database(EMBEDDED_DATABASE)
                    .await
                    .map_err(|error| IoError(error.to_string()))?;
            }
            database_url = postgresql.settings().url(EMBEDDED_DATABASE);
            Some(postgresql)
        } else {
            None
        };

        let options = PgConnectOptions::from_str(database_url.as_str())
            .map_err(|error| IoError(error.to_string()))?;
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|error| IoError(error.to_string()))?;
        let connection = Connection {
            url: url.to_string(),
            postgresql,
            pool,
        };

        Ok(connection)
    }
}

#[async_trait]
impl sqlbench_driver::Connection for Connection {
    fn url(&self) -> &String {
        &self.url
    }

    fn dialect(&self) -> Dialect {
        Dialect::PostgreSql
    }

    async fn execute(&mut self, sql: &str, params: &[&dyn ToSql]) -> Result<u64> {
        let sql = convert_to_numbered_placeholders(sql);
        let values = sqlbench_driver::to_values(params);
        let mut query = sqlx::query(&sql);
        for value in &values {
            query = bind_pg_value(query, value);
        }
        let rows = query
            .execute(&self.pool)
            .await
            .map_err(|error| IoError(error.to_string()))?
            .rows_affected();
        Ok(rows)
    }

    async fn query(&mut self, sql: &str, params: &[&dyn ToSql]) -> Result<Box<dyn QueryResult>> {
        let sql = convert_to_numbered_placeholders(sql);
        let values = sqlbench_driver::to_values(params);
        let mut query = sqlx::query(&sql);
        for value in &values {
            query = bind_pg_value(query, value);
        }
        let query_rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|error| IoError(error.to_string()))?;
        let columns: Vec<String> = query_rows
            .first()
            .map(|row| {
                row.columns()
                    .iter()
                    .map(|column| column.name().to_string())
                    .collect()
            })
            .unwrap_or_default();

        let query_result = PostgreSqlQueryResult::new(columns, query_rows);
        Ok(Box::new(query_result))
    }

    async fn close(&mut self) -> Result<()> {
        self.pool.close().await;

        if let Some(postgresql) = &self.postgresql
            && postgresql.status() == Status::Started
            && let Err(error) = postgresql.stop().await
        {
            return Err(IoError(error.to_string()));
        }

        Ok(())
    }
}

fn bind_pg_value<'q>(
    query: sqlx::query::Query<'q, Postgres, PgArguments>,
    value: &'q Value,
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(v) => query.bind(*v),
        Value::I16(v) => query.bind(*v),
        Value::I32(v) => query.bind(*v),
        Value::I64(v) => query.bind(*v),
        Value::U64(v) => query.bind(i64::try_from(*v).unwrap_or(i64::MAX)),
        Value::F32(v) => query.bind(*v),
        Value::F64(v) => query.bind(*v),
        Value::Decimal(v) => query.bind(*v),
        Value::String(v) => query.bind(v.as_str()),
        Value::Bytes(v) => query.bind(v.as_slice()),
        _ => query.bind(value.to_string()),
    }
}
