use crate::error::Result;
use crate::{Dialect, ToSql, Value};
use async_trait::async_trait;
use std::fmt::Debug;

/// A single row of a query result
pub type Row = Vec<Value>;

/// Convert `?` placeholders to numbered `$1, $2, ...` placeholders.
/// Used by PostgreSQL-family drivers.
#[must_use]
pub fn convert_to_numbered_placeholders(sql: &str) -> String {
    let mut result = String::with_capacity(sql.len());
    let mut param_index = 0u32;
    let mut chars = sql.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\'' | '"' => {
                result.push(ch);
                for quoted in chars.by_ref() {
                    result.push(quoted);
                    if quoted == ch {
                        break;
                    }
                }
            }
            '?' => {
                param_index += 1;
                result.push('$');
                result.push_str(&param_index.to_string());
            }
            _ => result.push(ch),
        }
    }
    result
}

/// Results from a query
#[async_trait]
pub trait QueryResult: Debug + Send + Sync {
    fn columns(&self) -> &[String];
    async fn next(&mut self) -> Option<&Row>;

    /// Consume the remaining rows, returning how many were read.
    async fn drain(&mut self) -> usize {
        let mut rows = 0;
        while self.next().await.is_some() {
            rows += 1;
        }
        rows
    }
}

/// In-memory query result
#[derive(Clone, Debug, Default)]
pub struct MemoryQueryResult {
    columns: Vec<String>,
    row_index: usize,
    rows: Vec<Row>,
}

impl MemoryQueryResult {
    #[must_use]
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            columns,
            row_index: 0,
            rows,
        }
    }
}

#[async_trait]
impl QueryResult for MemoryQueryResult {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    async fn next(&mut self) -> Option<&Row> {
        if self.row_index >= self.rows.len() {
            return None;
        }
        let row = &self.rows[self.row_index];
        self.row_index += 1;
        Some(row)
    }
}

/// Connection to a database
#[async_trait]
pub trait Connection: Debug + Send + Sync {
    fn url(&self) -> &String;
    fn dialect(&self) -> Dialect;
    async fn execute(&mut self, sql: &str, params: &[&dyn ToSql]) -> Result<u64>;
    async fn query(&mut self, sql: &str, params: &[&dyn ToSql]) -> Result<Box<dyn QueryResult>>;

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

type MockExecuteFn = Box<dyn FnMut(&str, &[Value]) -> Result<u64> + Send + Sync>;
type MockQueryFn = Box<dyn FnMut(&str, &[Value]) -> Result<Box<dyn QueryResult>> + Send + Sync>;
type MockCloseFn = Box<dyn FnMut() -> Result<()> + Send + Sync>;

/// A mock implementation of [`Connection`] for testing.
///
/// Supports setting expectations via `expect_*` methods with `.returning()` closures.
pub struct MockConnection {
    url: String,
    dialect: Dialect,
    execute_fn: Option<MockExecuteFn>,
    query_fn: Option<MockQueryFn>,
    close_fn: Option<MockCloseFn>,
}

impl Debug for MockConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockConnection")
            .field("url", &self.url)
            .field("dialect", &self.dialect)
            .finish()
    }
}

/// Builder for setting an execute expectation on [`MockConnection`].
pub struct MockExecuteExpectation<'a> {
    mock: &'a mut MockConnection,
}

impl MockExecuteExpectation<'_> {
    /// Set the closure to call when the expectation is matched.
    pub fn returning<F>(self, f: F)
    where
        F: FnMut(&str, &[Value]) -> Result<u64> + Send + Sync + 'static,
    {
        self.mock.execute_fn = Some(Box::new(f));
    }
}

/// Builder for setting a query expectation on [`MockConnection`].
pub struct MockQueryExpectation<'a> {
    mock: &'a mut MockConnection,
}

impl MockQueryExpectation<'_> {
    /// Set the closure to call when the expectation is matched.
    pub fn returning<F>(self, f: F)
    where
        F: FnMut(&str, &[Value]) -> Result<Box<dyn QueryResult>> + Send + Sync + 'static,
    {
        self.mock.query_fn = Some(Box::new(f));
    }
}

/// Builder for setting a close expectation on [`MockConnection`].
pub struct MockCloseExpectation<'a> {
    mock: &'a mut MockConnection,
}

impl MockCloseExpectation<'_> {
    /// Set the closure to call when the expectation is matched.
    pub fn returning<F>(self, f: F)
    where
        F: FnMut() -> Result<()> + Send + Sync + 'static,
    {
        self.mock.close_fn = Some(Box::new(f));
    }
}

impl MockConnection {
    /// Create a new mock with no expectations set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            url: String::new(),
            dialect: Dialect::PostgreSql,
            execute_fn: None,
            query_fn: None,
            close_fn: None,
        }
    }

    /// Set the URL reported by [`Connection::url`].
    #[must_use]
    pub fn with_url<S: Into<String>>(mut self, url: S) -> Self {
        self.url = url.into();
        self
    }

    /// Set the dialect reported by [`Connection::dialect`].
    #[must_use]
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Set an expectation for [`Connection::execute`].
    pub fn expect_execute(&mut self) -> MockExecuteExpectation<'_> {
        MockExecuteExpectation { mock: self }
    }

    /// Set an expectation for [`Connection::query`].
    pub fn expect_query(&mut self) -> MockQueryExpectation<'_> {
        MockQueryExpectation { mock: self }
    }

    /// Set an expectation for [`Connection::close`].
    pub fn expect_close(&mut self) -> MockCloseExpectation<'_> {
        MockCloseExpectation { mock: self }
    }
}

impl Default for MockConnection {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connection for MockConnection {
    fn url(&self) -> &String {
        &self.url
    }

    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn execute(&mut self, sql: &str, params: &[&dyn ToSql]) -> Result<u64> {
        let values: Vec<Value> = params.iter().map(|p| p.to_value()).collect();
        let f = self
            .execute_fn
            .as_mut()
            .expect("MockConnection: execute called without expectation");
        f(sql, &values)
    }

    async fn query(&mut self, sql: &str, params: &[&dyn ToSql]) -> Result<Box<dyn QueryResult>> {
        let values: Vec<Value> = params.iter().map(|p| p.to_value()).collect();
        let f = self
            .query_fn
            .as_mut()
            .expect("MockConnection: query called without expectation");
        f(sql, &values)
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(f) = self.close_fn.as_mut() {
            f()
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Value;

    #[tokio::test]
    async fn test_memory_query_result_new() {
        let columns = vec!["a".to_string()];
        let rows = vec![vec![Value::String("foo".to_string())]];

        let mut result = MemoryQueryResult::new(columns, rows);

        let columns = result.columns();
        let column = columns.first().expect("no column");
        assert_eq!(column, &"a".to_string());

        let row = result.next().await.expect("no row");
        let value = row.first().expect("no value");
        assert_eq!(value, &Value::String("foo".to_string()));
    }

    #[tokio::test]
    async fn test_drain() {
        let columns = vec!["id".to_string()];
        let rows = vec![
            vec![Value::I64(1)],
            vec![Value::I64(2)],
            vec![Value::I64(3)],
        ];
        let mut result = MemoryQueryResult::new(columns, rows);
        let _ = result.next().await;

        assert_eq!(result.drain().await, 2);
        assert!(result.next().await.is_none());
    }

    #[tokio::test]
    async fn test_mock_connection() -> Result<()> {
        let mut connection = MockConnection::new()
            .with_url("mysql://localhost/testdb")
            .with_dialect(Dialect::MySql);
        connection
            .expect_execute()
            .returning(|sql, values| {
                assert_eq!(sql, "DELETE FROM users WHERE id = ?");
                assert_eq!(values, &[Value::I64(1)]);
                Ok(1)
            });
        connection.expect_query().returning(|_, _| {
            Ok(Box::new(MemoryQueryResult::new(
                vec!["count".to_string()],
                vec![vec![Value::I64(42)]],
            )))
        });

        assert_eq!(connection.url(), "mysql://localhost/testdb");
        assert_eq!(connection.dialect(), Dialect::MySql);
        let rows = connection
            .execute("DELETE FROM users WHERE id = ?", &[&1i64])
            .await?;
        assert_eq!(rows, 1);
        let mut result = connection.query("SELECT COUNT(*) FROM users", &[]).await?;
        assert_eq!(result.columns(), ["count".to_string()]);
        assert_eq!(result.drain().await, 1);
        connection.close().await?;
        Ok(())
    }

    #[test]
    fn test_convert_to_numbered_placeholders() {
        assert_eq!(
            convert_to_numbered_placeholders(
                "INSERT INTO users (username, email) VALUES (?, ?), (?, ?)"
            ),
            "INSERT INTO users (username, email) VALUES ($1, $2), ($3, $4)"
        );
    }

    #[test]
    fn test_convert_to_numbered_placeholders_no_params() {
        assert_eq!(
            convert_to_numbered_placeholders("SELECT * FROM users"),
            "SELECT * FROM users"
        );
    }

    #[test]
    fn test_convert_to_numbered_placeholders_in_string_literal() {
        assert_eq!(
            convert_to_numbered_placeholders("SELECT * FROM users WHERE email LIKE '%?%' AND id = ?"),
            "SELECT * FROM users WHERE email LIKE '%?%' AND id = $1"
        );
    }

    #[test]
    fn test_convert_to_numbered_placeholders_in_quoted_identifier() {
        assert_eq!(
            convert_to_numbered_placeholders(r#"SELECT * FROM "table?" WHERE id = ?"#),
            r#"SELECT * FROM "table?" WHERE id = $1"#
        );
    }
}
