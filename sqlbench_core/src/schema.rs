use anyhow::{Result, bail};
use serde::Serialize;
use sqlbench_drivers::{Connection, Dialect, Value};
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// An index created on the `users` table.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Index {
    pub name: &'static str,
    pub column: &'static str,
}

impl Index {
    #[must_use]
    pub fn sql(&self) -> String {
        format!("CREATE INDEX {} ON users({})", self.name, self.column)
    }
}

pub const INDEXES: [Index; 3] = [
    Index {
        name: "idx_users_email",
        column: "email",
    },
    Index {
        name: "idx_users_status",
        column: "status",
    },
    Index {
        name: "idx_users_balance",
        column: "balance",
    },
];

/// Statements that drop the benchmark tables, `orders` first.
#[must_use]
pub fn drop_statements(dialect: Dialect) -> [&'static str; 2] {
    match dialect {
        Dialect::PostgreSql => [
            "DROP TABLE IF EXISTS orders CASCADE",
            "DROP TABLE IF EXISTS users CASCADE",
        ],
        Dialect::MySql => ["DROP TABLE IF EXISTS orders", "DROP TABLE IF EXISTS users"],
    }
}

/// Statements that create the `users` and `orders` tables.
#[must_use]
pub fn create_statements(dialect: Dialect) -> [&'static str; 2] {
    match dialect {
        Dialect::PostgreSql => [
            "CREATE TABLE users (\
                id SERIAL PRIMARY KEY, \
                username VARCHAR(50) NOT NULL, \
                email VARCHAR(100) NOT NULL, \
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP, \
                status VARCHAR(20), \
                balance DECIMAL(10,2))",
            "CREATE TABLE orders (\
                id SERIAL PRIMARY KEY, \
                user_id INTEGER REFERENCES users(id), \
                order_date TIMESTAMP DEFAULT CURRENT_TIMESTAMP, \
                total_amount DECIMAL(10,2), \
                status VARCHAR(20))",
        ],
        Dialect::MySql => [
            "CREATE TABLE users (\
                id INT AUTO_INCREMENT PRIMARY KEY, \
                username VARCHAR(50) NOT NULL, \
                email VARCHAR(100) NOT NULL, \
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP, \
                status VARCHAR(20), \
                balance DECIMAL(10,2)) ENGINE=InnoDB",
            "CREATE TABLE orders (\
                id INT AUTO_INCREMENT PRIMARY KEY, \
                user_id INT, \
                order_date TIMESTAMP DEFAULT CURRENT_TIMESTAMP, \
                total_amount DECIMAL(10,2), \
                status VARCHAR(20), \
                FOREIGN KEY (user_id) REFERENCES users(id)) ENGINE=InnoDB",
        ],
    }
}

/// Statement that refreshes planner statistics after loading and indexing.
#[must_use]
pub fn maintenance_statement(dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::PostgreSql => "ANALYZE users",
        Dialect::MySql => "OPTIMIZE TABLE users",
    }
}

fn table_sizes_sql(dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::PostgreSql => {
            "SELECT table_name::text, \
                pg_total_relation_size(quote_ident(table_name)::regclass) \
            FROM information_schema.tables \
            WHERE table_schema = current_schema() AND table_name IN ('users', 'orders') \
            ORDER BY table_name"
        }
        Dialect::MySql => {
            "SELECT table_name, CAST(data_length + index_length AS SIGNED) \
            FROM information_schema.tables \
            WHERE table_schema = DATABASE() AND table_name IN ('users', 'orders') \
            ORDER BY table_name"
        }
    }
}

/// Drop and create the benchmark tables.
///
/// # Errors
/// * If a statement fails
#[instrument(level = "info", skip(connection))]
pub async fn recreate(connection: &mut dyn Connection) -> Result<()> {
    let dialect = connection.dialect();
    for sql in drop_statements(dialect)
        .into_iter()
        .chain(create_statements(dialect))
    {
        debug!("{sql}");
        let _ = connection.execute(sql, &[]).await?;
    }
    Ok(())
}

/// The outcome of creating a single index.
#[derive(Debug)]
pub struct IndexOutcome {
    pub index: Index,
    pub result: Result<Duration>,
}

/// Create each index, timing it.  A failing index is reported in its outcome and the
/// remaining indexes are still created.
#[instrument(level = "info", skip(connection))]
pub async fn create_indexes(connection: &mut dyn Connection) -> Vec<IndexOutcome> {
    let mut outcomes = Vec::with_capacity(INDEXES.len());
    for index in INDEXES {
        let start = Instant::now();
        let result: Result<Duration> = match connection.execute(&index.sql(), &[]).await {
            Ok(_) => Ok(start.elapsed()),
            Err(error) => {
                warn!("Failed to create {}: {error}", index.name);
                Err(error.into())
            }
        };
        outcomes.push(IndexOutcome { index, result });
    }
    outcomes
}

/// Run the dialect's maintenance statement.  `OPTIMIZE TABLE` returns a status result set
/// which is read to completion.
///
/// # Errors
/// * If the statement fails
#[instrument(level = "info", skip(connection))]
pub async fn maintain(connection: &mut dyn Connection) -> Result<&'static str> {
    let dialect = connection.dialect();
    let sql = maintenance_statement(dialect);
    match dialect {
        Dialect::PostgreSql => {
            let _ = connection.execute(sql, &[]).await?;
        }
        Dialect::MySql => {
            let mut result = connection.query(sql, &[]).await?;
            let _ = result.drain().await;
        }
    }
    Ok(sql)
}

/// On-disk size of a benchmark table, including its indexes.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableSize {
    pub table: String,
    pub bytes: i64,
}

impl TableSize {
    #[must_use]
    pub fn megabytes(&self) -> f64 {
        self.bytes as f64 / 1024.0 / 1024.0
    }
}

/// Query the size of the `users` and `orders` tables.
///
/// # Errors
/// * If the query fails or returns unexpected values
#[instrument(level = "info", skip(connection))]
pub async fn table_sizes(connection: &mut dyn Connection) -> Result<Vec<TableSize>> {
    let sql = table_sizes_sql(connection.dialect());
    let mut result = connection.query(sql, &[]).await?;
    let mut sizes = Vec::new();
    while let Some(row) = result.next().await {
        let (Some(table), Some(bytes)) = (row.first(), row.get(1)) else {
            bail!("Unexpected table size row: {row:?}");
        };
        let table = match table {
            Value::String(table) => table.clone(),
            Value::Bytes(name) => String::from_utf8_lossy(name).to_string(),
            value => bail!("Unexpected table name: {value}"),
        };
        let bytes = if bytes.is_null() {
            0
        } else {
            let Some(bytes) = bytes.as_i64() else {
                bail!("Unexpected size for {table}: {bytes}");
            };
            bytes
        };
        sizes.push(TableSize { table, bytes });
    }
    Ok(sizes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlbench_drivers::{MemoryQueryResult, MockConnection};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_index_sql() {
        let statements: Vec<String> = INDEXES.iter().map(Index::sql).collect();
        assert_eq!(
            statements,
            vec![
                "CREATE INDEX idx_users_email ON users(email)",
                "CREATE INDEX idx_users_status ON users(status)",
                "CREATE INDEX idx_users_balance ON users(balance)",
            ]
        );
    }

    #[test]
    fn test_dialect_statements() {
        assert!(drop_statements(Dialect::PostgreSql)[0].ends_with("CASCADE"));
        assert_eq!(drop_statements(Dialect::MySql)[0], "DROP TABLE IF EXISTS orders");
        assert!(create_statements(Dialect::PostgreSql)[0].contains("id SERIAL PRIMARY KEY"));
        assert!(create_statements(Dialect::MySql)[0].contains("INT AUTO_INCREMENT"));
        assert!(create_statements(Dialect::MySql)[1].ends_with("ENGINE=InnoDB"));
        assert!(create_statements(Dialect::MySql)[1].contains("FOREIGN KEY (user_id)"));
        assert_eq!(maintenance_statement(Dialect::PostgreSql), "ANALYZE users");
        assert_eq!(maintenance_statement(Dialect::MySql), "OPTIMIZE TABLE users");
    }

    #[tokio::test]
    async fn test_recreate() -> Result<()> {
        let statements = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&statements);
        let mut connection = MockConnection::new().with_dialect(Dialect::MySql);
        connection.expect_execute().returning(move |sql, _| {
            recorded.lock().expect("lock").push(sql.to_string());
            Ok(0)
        });

        recreate(&mut connection).await?;

        let statements = statements.lock().expect("lock");
        assert_eq!(statements.len(), 4);
        assert_eq!(statements[0], "DROP TABLE IF EXISTS orders");
        assert_eq!(statements[1], "DROP TABLE IF EXISTS users");
        assert!(statements[2].starts_with("CREATE TABLE users"));
        assert!(statements[3].starts_with("CREATE TABLE orders"));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_indexes_continues_after_failure() {
        let mut connection = MockConnection::new();
        connection.expect_execute().returning(|sql, _| {
            if sql.contains("idx_users_status") {
                Err(sqlbench_drivers::Error::IoError(
                    "relation already exists".to_string(),
                ))
            } else {
                Ok(0)
            }
        });

        let outcomes = create_indexes(&mut connection).await;

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].result.is_ok());
        assert!(outcomes[1].result.is_err());
        assert!(outcomes[2].result.is_ok());
        assert_eq!(outcomes[2].index.name, "idx_users_balance");
    }

    #[tokio::test]
    async fn test_maintain_postgresql() -> Result<()> {
        let mut connection = MockConnection::new().with_dialect(Dialect::PostgreSql);
        connection.expect_execute().returning(|sql, _| {
            assert_eq!(sql, "ANALYZE users");
            Ok(0)
        });

        assert_eq!(maintain(&mut connection).await?, "ANALYZE users");
        Ok(())
    }

    #[tokio::test]
    async fn test_maintain_mysql() -> Result<()> {
        let mut connection = MockConnection::new().with_dialect(Dialect::MySql);
        connection.expect_query().returning(|sql, _| {
            assert_eq!(sql, "OPTIMIZE TABLE users");
            let columns = vec!["Table".to_string(), "Msg_text".to_string()];
            let rows = vec![vec![Value::from("testdb.users"), Value::from("OK")]];
            Ok(Box::new(MemoryQueryResult::new(columns, rows)))
        });

        assert_eq!(maintain(&mut connection).await?, "OPTIMIZE TABLE users");
        Ok(())
    }

    #[tokio::test]
    async fn test_table_sizes() -> Result<()> {
        let mut connection = MockConnection::new().with_dialect(Dialect::MySql);
        connection.expect_query().returning(|sql, _| {
            assert!(sql.contains("DATABASE()"));
            let columns = vec!["table_name".to_string(), "size".to_string()];
            let rows = vec![
                vec![Value::from("orders"), Value::I64(16_384)],
                vec![Value::Bytes(b"users".to_vec()), Value::I64(8_388_608)],
            ];
            Ok(Box::new(MemoryQueryResult::new(columns, rows)))
        });

        let sizes = table_sizes(&mut connection).await?;

        assert_eq!(sizes.len(), 2);
        assert_eq!(sizes[0].table, "orders");
        assert_eq!(sizes[1].table, "users");
        assert!((sizes[1].megabytes() - 8.0).abs() < f64::EPSILON);
        Ok(())
    }

    #[tokio::test]
    async fn test_table_sizes_unexpected_row() {
        let mut connection = MockConnection::new();
        connection.expect_query().returning(|_, _| {
            let columns = vec!["table_name".to_string()];
            let rows = vec![vec![Value::from("users")]];
            Ok(Box::new(MemoryQueryResult::new(columns, rows)))
        });

        assert!(table_sizes(&mut connection).await.is_err());
    }
}
