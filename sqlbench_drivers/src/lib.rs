#![forbid(unsafe_code)]
#![forbid(clippy::allow_attributes)]
#![deny(clippy::pedantic)]

mod driver_manager;

pub use driver_manager::DriverManager;
pub use sqlbench_driver::{
    Connection, Dialect, Driver, Error, MemoryQueryResult, MockConnection, MockDriver,
    QueryResult, Result, Row, ToSql, Value,
};
