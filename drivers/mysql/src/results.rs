use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use sqlbench_driver::Error::{IoError, UnsupportedColumnType};
use sqlbench_driver::{QueryResult, Result, Value};
use sqlx::mysql::{MySql, MySqlColumn, MySqlRow};
use sqlx::{Column, Decode, Row, Type, TypeInfo};
use tracing::warn;

/// Query result that converts MySQL rows to values on demand
pub(crate) struct MySqlQueryResult {
    columns: Vec<String>,
    rows: Vec<MySqlRow>,
    row_index: usize,
    row_buffer: sqlbench_driver::Row,
}

impl std::fmt::Debug for MySqlQueryResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlQueryResult")
            .field("columns", &self.columns)
            .field("row_index", &self.row_index)
            .field("row_count", &self.rows.len())
            .finish()
    }
}

impl MySqlQueryResult {
    pub(crate) fn new(columns: Vec<String>, rows: Vec<MySqlRow>) -> Self {
        Self {
            columns,
            rows,
            row_index: 0,
            row_buffer: Vec::new(),
        }
    }

    fn convert_row(row: &MySqlRow, buffer: &mut Vec<Value>) -> Result<()> {
        buffer.clear();
        for column in row.columns() {
            let value = convert_to_value(row, column)?;
            buffer.push(value);
        }
        Ok(())
    }
}

#[async_trait]
impl QueryResult for MySqlQueryResult {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    async fn next(&mut self) -> Option<&sqlbench_driver::Row> {
        if self.row_index >= self.rows.len() {
            return None;
        }
        let row = &self.rows[self.row_index];
        self.row_index += 1;
        if let Err(error) = Self::convert_row(row, &mut self.row_buffer) {
            warn!("Failed to convert row {}: {error}", self.row_index);
            return None;
        }
        Some(&self.row_buffer)
    }
}

fn convert_to_value(row: &MySqlRow, column: &MySqlColumn) -> Result<Value> {
    let column_name = column.name();
    let column_type = column.type_info().name();

    let value = match column_type {
        "NULL" => Value::Null,
        "BOOLEAN" => get_value(row, column_name, |v: bool| Value::Bool(v))?,
        "TINYINT" => get_value(row, column_name, |v: i8| Value::I16(i16::from(v)))?,
        "SMALLINT" => get_value(row, column_name, |v: i16| Value::I16(v))?,
        "MEDIUMINT" | "INT" => get_value(row, column_name, |v: i32| Value::I32(v))?,
        "BIGINT" => get_value(row, column_name, |v: i64| Value::I64(v))?,
        "TINYINT UNSIGNED" => get_value(row, column_name, |v: u8| Value::I16(i16::from(v)))?,
        "SMALLINT UNSIGNED" => {
            get_value(row, column_name, |v: u16| Value::I32(i32::from(v)))?
        }
        "MEDIUMINT UNSIGNED" | "INT UNSIGNED" => {
            get_value(row, column_name, |v: u32| Value::I64(i64::from(v)))?
        }
        "BIGINT UNSIGNED" => get_value(row, column_name, |v: u64| Value::U64(v))?,
        "FLOAT" => get_value(row, column_name, |v: f32| Value::F32(v))?,
        "DOUBLE" => get_value(row, column_name, |v: f64| Value::F64(v))?,
        "DECIMAL" => get_value(row, column_name, |v: rust_decimal::Decimal| {
            Value::Decimal(v)
        })?,
        "CHAR" | "VARCHAR" | "TINYTEXT" | "TEXT" | "MEDIUMTEXT" | "LONGTEXT" | "ENUM"
        | "SET" => get_value(row, column_name, |v: String| Value::String(v))?,
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => {
            get_value(row, column_name, |v: Vec<u8>| Value::Bytes(v))?
        }
        "DATE" => match row
            .try_get::<Option<NaiveDate>, &str>(column_name)
            .map_err(|error| IoError(error.to_string()))?
        {
            Some(v) => Value::Date(civil_date(v)?),
            None => Value::Null,
        },
        "TIME" => match row
            .try_get::<Option<NaiveTime>, &str>(column_name)
            .map_err(|error| IoError(error.to_string()))?
        {
            Some(v) => Value::Time(civil_time(v)?),
            None => Value::Null,
        },
        "DATETIME" | "TIMESTAMP" => match row
            .try_get::<Option<NaiveDateTime>, &str>(column_name)
            .map_err(|error| IoError(error.to_string()))?
        {
            Some(v) => {
                let date = civil_date(v.date())?;
                let time = civil_time(v.time())?;
                Value::DateTime(jiff::civil::DateTime::from_parts(date, time))
            }
            None => Value::Null,
        },
        _ => {
            return Err(UnsupportedColumnType {
                column_name: column_name.to_string(),
                column_type: column_type.to_string(),
            });
        }
    };

    Ok(value)
}

fn get_value<'r, T>(
    row: &'r MySqlRow,
    column_name: &str,
    to_value: impl Fn(T) -> Value,
) -> Result<Value>
where
    T: Decode<'r, MySql> + Type<MySql>,
{
    let value = row
        .try_get::<Option<T>, &str>(column_name)
        .map_err(|error| IoError(error.to_string()))?;
    Ok(value.map_or(Value::Null, to_value))
}

fn civil_date(date: NaiveDate) -> Result<jiff::civil::Date> {
    let year = i16::try_from(date.year())?;
    let month = i8::try_from(date.month())?;
    let day = i8::try_from(date.day())?;
    Ok(jiff::civil::Date::new(year, month, day)?)
}

fn civil_time(time: NaiveTime) -> Result<jiff::civil::Time> {
    let hour = i8::try_from(time.hour())?;
    let minute = i8::try_from(time.minute())?;
    let second = i8::try_from(time.second())?;
    let nanosecond = i32::try_from(time.nanosecond())?;
    Ok(jiff::civil::Time::new(hour, minute, second, nanosecond)?)
}
