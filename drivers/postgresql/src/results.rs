use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use jiff::civil::{Date, DateTime, Time};
use sqlbench_driver::Error::{IoError, UnsupportedColumnType};
use sqlbench_driver::{QueryResult, Result, Value};
use sqlx::postgres::types::Oid;
use sqlx::postgres::{PgColumn, PgRow};
use sqlx::{Column, ColumnIndex, Decode, Row, Type};
use tracing::warn;

/// Query result that converts PostgreSQL rows to values on demand
pub(crate) struct PostgreSqlQueryResult {
    columns: Vec<String>,
    rows: Vec<PgRow>,
    row_index: usize,
    row_buffer: sqlbench_driver::Row,
}

impl std::fmt::Debug for PostgreSqlQueryResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgreSqlQueryResult")
            .field("columns", &self.columns)
            .field("row_index", &self.row_index)
            .field("row_count", &self.rows.len())
            .finish()
    }
}

impl PostgreSqlQueryResult {
    pub(crate) fn new(columns: Vec<String>, rows: Vec<PgRow>) -> Self {
        Self {
            columns,
            rows,
            row_index: 0,
            row_buffer: Vec::new(),
        }
    }

    fn convert_row(row: &PgRow, buffer: &mut Vec<Value>) -> Result<()> {
        buffer.clear();
        for column in row.columns() {
            let value = convert_to_value(row, column)?;
            buffer.push(value);
        }
        Ok(())
    }
}

#[async_trait]
impl QueryResult for PostgreSqlQueryResult {
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

pub(crate) fn convert_to_value(row: &PgRow, column: &PgColumn) -> Result<Value> {
    let column_type = column.type_info();
    let postgresql_type = &**column_type;
    let column_type = format!("{postgresql_type:?}");
    let column_name = column.name();
    let Some(column_type_name) = column_type.split('(').next() else {
        return Err(UnsupportedColumnType {
            column_name: column_name.to_string(),
            column_type,
        });
    };

    let value = match column_type_name {
        "Bool" => get_value(row, column_name, |v: bool| Value::Bool(v))?,
        "Bpchar" | "Char" | "Name" | "Text" | "Varchar" => {
            get_value(row, column_name, |v: String| Value::String(v))?
        }
        "Bytea" => get_value(row, column_name, |v: Vec<u8>| Value::Bytes(v))?,
        "Int2" => get_value(row, column_name, |v: i16| Value::I16(v))?,
        "Int4" => get_value(row, column_name, |v: i32| Value::I32(v))?,
        "Int8" => get_value(row, column_name, |v: i64| Value::I64(v))?,
        "Oid" => get_value(row, column_name, |v: Oid| Value::I64(i64::from(v.0)))?,
        "Float4" => get_value(row, column_name, |v: f32| Value::F32(v))?,
        "Float8" => get_value(row, column_name, |v: f64| Value::F64(v))?,
        "Numeric" => get_value(row, column_name, |v: rust_decimal::Decimal| {
            Value::Decimal(v)
        })?,
        "Date" => get_value(row, column_name, naive_date_to_value)?,
        "Time" | "Timetz" => get_value(row, column_name, naive_time_to_value)?,
        "Timestamp" => get_value(row, column_name, naive_date_time_to_value)?,
        "Timestamptz" => get_value(row, column_name, |v: chrono::DateTime<Utc>| {
            naive_date_time_to_value(v.naive_utc())
        })?,
        "Void" => Value::Null,
        _ => {
            return Err(UnsupportedColumnType {
                column_name: column_name.to_string(),
                column_type: column_type.clone(),
            });
        }
    };

    Ok(value)
}

fn get_value<'r, T, I>(row: &'r PgRow, index: I, to_value: impl Fn(T) -> Value) -> Result<Value>
where
    T: Decode<'r, <PgRow as Row>::Database> + Type<<PgRow as Row>::Database>,
    I: ColumnIndex<PgRow>,
{
    match row
        .try_get::<Option<T>, I>(index)
        .map_err(|error| IoError(error.to_string()))?
        .map(to_value)
    {
        Some(value) => Ok(value),
        None => Ok(Value::Null),
    }
}

fn civil_date(date: NaiveDate) -> Option<Date> {
    let year = i16::try_from(date.year()).ok()?;
    let month = i8::try_from(date.month()).ok()?;
    let day = i8::try_from(date.day()).ok()?;
    Date::new(year, month, day).ok()
}

fn civil_time(time: NaiveTime) -> Option<Time> {
    let hour = i8::try_from(time.hour()).ok()?;
    let minute = i8::try_from(time.minute()).ok()?;
    let second = i8::try_from(time.second()).ok()?;
    let nanosecond = i32::try_from(time.nanosecond()).ok()?;
    Time::new(hour, minute, second, nanosecond).ok()
}

fn naive_date_to_value(date: NaiveDate) -> Value {
    civil_date(date).map_or(Value::Null, Value::Date)
}

fn naive_time_to_value(time: NaiveTime) -> Value {
    civil_time(time).map_or(Value::Null, Value::Time)
}

fn naive_date_time_to_value(date_time: NaiveDateTime) -> Value {
    match (civil_date(date_time.date()), civil_time(date_time.time())) {
        (Some(date), Some(time)) => Value::DateTime(DateTime::from_parts(date, time)),
        _ => Value::Null,
    }
}
