use crate::Value;
use rust_decimal::Decimal;

/// Trait for types that can be converted to a SQL parameter value.
pub trait ToSql: Send + Sync {
    /// Convert this value to a [`Value`] for use as a SQL parameter.
    fn to_value(&self) -> Value;
}

/// Convert a slice of [`ToSql`] references into a [`Vec<Value>`] for use with
/// [`Connection::execute`](crate::Connection::execute) and
/// [`Connection::query`](crate::Connection::query).
pub fn to_values(params: &[&dyn ToSql]) -> Vec<Value> {
    params.iter().map(|p| p.to_value()).collect()
}

impl ToSql for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl ToSql for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl ToSql for i16 {
    fn to_value(&self) -> Value {
        Value::I16(*self)
    }
}

impl ToSql for i32 {
    fn to_value(&self) -> Value {
        Value::I32(*self)
    }
}

impl ToSql for i64 {
    fn to_value(&self) -> Value {
        Value::I64(*self)
    }
}

impl ToSql for u64 {
    fn to_value(&self) -> Value {
        Value::U64(*self)
    }
}

impl ToSql for f32 {
    fn to_value(&self) -> Value {
        Value::F32(*self)
    }
}

impl ToSql for f64 {
    fn to_value(&self) -> Value {
        Value::F64(*self)
    }
}

impl ToSql for Decimal {
    fn to_value(&self) -> Value {
        Value::Decimal(*self)
    }
}

impl ToSql for str {
    fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl ToSql for String {
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl ToSql for &str {
    fn to_value(&self) -> Value {
        Value::String((*self).to_string())
    }
}

impl ToSql for [u8] {
    fn to_value(&self) -> Value {
        Value::Bytes(self.to_vec())
    }
}

impl ToSql for Vec<u8> {
    fn to_value(&self) -> Value {
        Value::Bytes(self.clone())
    }
}

impl<T: ToSql> ToSql for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(value) => value.to_value(),
            None => Value::Null,
        }
    }
}
