//! # sqlbench driver
//!
//! The sqlbench driver library provides the interfaces used to connect to the database
//! servers being benchmarked and to execute SQL statements against them.

#![forbid(unsafe_code)]
#![forbid(clippy::allow_attributes)]
#![deny(clippy::pedantic)]

mod connection;
mod dialect;
mod driver;
mod driver_manager;
mod error;
mod to_sql;
mod value;

pub use connection::{
    Connection, MemoryQueryResult, MockConnection, QueryResult, Row,
    convert_to_numbered_placeholders,
};
pub use dialect::Dialect;
pub use driver::{Driver, MockDriver};
pub use driver_manager::DriverManager;
pub use error::{Error, Result};
pub use to_sql::{ToSql, to_values};
pub use value::Value;
