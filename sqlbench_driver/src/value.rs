use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Bytes(Vec<u8>),
    I16(i16),
    I32(i32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Decimal(Decimal),
    String(String),
    Date(jiff::civil::Date),
    Time(jiff::civil::Time),
    DateTime(jiff::civil::DateTime),
}

impl Value {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Value::I16(_)
                | Value::I32(_)
                | Value::I64(_)
                | Value::U64(_)
                | Value::F32(_)
                | Value::F64(_)
                | Value::Decimal(_)
        )
    }

    /// Get the value as an `i64` if it is an integral number that fits.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I16(value) => Some(i64::from(*value)),
            Value::I32(value) => Some(i64::from(*value)),
            Value::I64(value) => Some(*value),
            Value::U64(value) => i64::try_from(*value).ok(),
            Value::Decimal(value) if value.fract().is_zero() => value.to_i64(),
            Value::String(value) => value.parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(value) => write!(f, "{value}"),
            Value::Bytes(bytes) => write!(f, "{}", String::from_utf8_lossy(bytes)),
            Value::I16(value) => write!(f, "{value}"),
            Value::I32(value) => write!(f, "{value}"),
            Value::I64(value) => write!(f, "{value}"),
            Value::U64(value) => write!(f, "{value}"),
            Value::F32(value) => write!(f, "{value}"),
            Value::F64(value) => write!(f, "{value}"),
            Value::Decimal(value) => write!(f, "{value}"),
            Value::String(value) => write!(f, "{value}"),
            Value::Date(value) => write!(f, "{value}"),
            Value::Time(value) => write!(f, "{value}"),
            Value::DateTime(value) => write!(f, "{value}"),
        }
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Value::Decimal(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::I64(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_null() {
        assert!(Value::Null.is_null());
        assert!(!Value::I32(0).is_null());
    }

    #[test]
    fn test_is_numeric() {
        assert!(Value::I16(1).is_numeric());
        assert!(Value::U64(1).is_numeric());
        assert!(Value::F64(1.5).is_numeric());
        assert!(Value::Decimal(Decimal::new(1234, 2)).is_numeric());
        assert!(!Value::String("1".to_string()).is_numeric());
        assert!(!Value::Null.is_numeric());
    }

    #[test]
    fn test_as_i64() {
        assert_eq!(Value::I16(42).as_i64(), Some(42));
        assert_eq!(Value::I32(42).as_i64(), Some(42));
        assert_eq!(Value::I64(42).as_i64(), Some(42));
        assert_eq!(Value::U64(42).as_i64(), Some(42));
        assert_eq!(Value::U64(u64::MAX).as_i64(), None);
        assert_eq!(Value::Decimal(Decimal::new(4200, 2)).as_i64(), Some(42));
        assert_eq!(Value::Decimal(Decimal::new(4201, 2)).as_i64(), None);
        assert_eq!(Value::String("8192".to_string()).as_i64(), Some(8192));
        assert_eq!(Value::Null.as_i64(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Bytes(b"foo".to_vec()).to_string(), "foo");
        assert_eq!(Value::I64(5000).to_string(), "5000");
        assert_eq!(Value::Decimal(Decimal::new(123_456, 2)).to_string(), "1234.56");
        assert_eq!(Value::String("active".to_string()).to_string(), "active");
        assert_eq!(
            Value::Date(jiff::civil::date(2024, 1, 31)).to_string(),
            "2024-01-31"
        );
        assert_eq!(
            Value::DateTime(jiff::civil::datetime(2024, 1, 31, 14, 30, 0, 0)).to_string(),
            "2024-01-31T14:30:00"
        );
    }

    #[test]
    fn test_from() {
        assert_eq!(Value::from(7i64), Value::I64(7));
        assert_eq!(Value::from("a"), Value::String("a".to_string()));
        assert_eq!(
            Value::from("b".to_string()),
            Value::String("b".to_string())
        );
        assert_eq!(
            Value::from(Decimal::new(1, 2)),
            Value::Decimal(Decimal::new(1, 2))
        );
    }
}
