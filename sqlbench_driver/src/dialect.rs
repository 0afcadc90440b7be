use std::fmt;

/// SQL family spoken by a connection.
///
/// The benchmark schema, index maintenance and size queries differ between the
/// PostgreSQL and MySQL families; everything else is shared.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Dialect {
    MySql,
    PostgreSql,
}

impl Dialect {
    /// Get the dialect for a URL scheme (e.g. `mariadb` is a [`Dialect::MySql`]).
    #[must_use]
    pub fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme.to_lowercase().as_str() {
            "mariadb" | "mysql" => Some(Dialect::MySql),
            "postgresql" => Some(Dialect::PostgreSql),
            _ => None,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::MySql => write!(f, "MySQL"),
            Dialect::PostgreSql => write!(f, "PostgreSQL"),
        }
    }
}
