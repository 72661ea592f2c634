//! Result rows returned by the backends.

use chrono::NaiveDateTime;
use sqlshift_core::ShiftError;

use crate::value::Value;

/// Timestamp layouts accepted when a backend hands a datetime back as text.
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d"];

/// A single row: column names paired with values.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Creates a row from column names and values of equal length.
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        debug_assert_eq!(
            columns.len(),
            values.len(),
            "Row column count must match value count"
        );
        Self { columns, values }
    }

    /// Returns the column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the values in column order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Gets a typed value by column name. Column names match case-insensitively.
    pub fn get<T: FromValue>(&self, column: &str) -> Result<T, ShiftError> {
        let value = self.get_value(column).ok_or_else(|| {
            ShiftError::Database(format!("Column '{column}' not found in row"))
        })?;
        T::from_value(value)
    }

    /// Gets a typed value by column index.
    pub fn get_by_index<T: FromValue>(&self, idx: usize) -> Result<T, ShiftError> {
        let value = self.values.get(idx).ok_or_else(|| {
            ShiftError::Database(format!(
                "Column index {idx} out of bounds (row has {} columns)",
                self.values.len()
            ))
        })?;
        T::from_value(value)
    }

    /// Returns the raw value of a column, if present.
    pub fn get_value(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(column))
            .and_then(|idx| self.values.get(idx))
    }
}

/// Conversion from a [`Value`] into a concrete Rust type.
pub trait FromValue: Sized {
    /// Attempts to convert a value reference to this type.
    fn from_value(value: &Value) -> Result<Self, ShiftError>;
}

fn mismatch(expected: &str, value: &Value) -> ShiftError {
    ShiftError::Database(format!("Expected {expected}, got {value:?}"))
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, ShiftError> {
        Ok(value.clone())
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, ShiftError> {
        match value {
            Value::Int(i) => Ok(*i),
            Value::Bool(b) => Ok(Self::from(*b)),
            Value::String(s) => s.trim().parse().map_err(|_| mismatch("Int", value)),
            _ => Err(mismatch("Int", value)),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, ShiftError> {
        match value {
            Value::Bool(b) => Ok(*b),
            Value::Int(i) => Ok(*i != 0),
            _ => Err(mismatch("Bool", value)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, ShiftError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::Bytes(b) => Self::from_utf8(b.clone()).map_err(|_| mismatch("String", value)),
            Value::Null => Err(mismatch("String", value)),
            other => Ok(other.to_string()),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: &Value) -> Result<Self, ShiftError> {
        match value {
            Value::DateTime(dt) => Ok(*dt),
            Value::String(s) => parse_datetime(s).ok_or_else(|| mismatch("DateTime", value)),
            _ => Err(mismatch("DateTime", value)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, ShiftError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    DATETIME_FORMATS.iter().find_map(|fmt| {
        NaiveDateTime::parse_from_str(s, fmt).ok().or_else(|| {
            chrono::NaiveDate::parse_from_str(s, fmt)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Row {
        Row::new(
            vec!["version".into(), "status".into(), "applied_at".into(), "n".into()],
            vec![
                Value::from("v1.sql"),
                Value::from("up"),
                Value::from("2025-11-05 10:24:30.250000"),
                Value::Int(1),
            ],
        )
    }

    #[test]
    fn test_get_typed() {
        let r = row();
        assert_eq!(r.get::<String>("version").unwrap(), "v1.sql");
        assert_eq!(r.get::<i64>("n").unwrap(), 1);
        assert!(r.get::<bool>("n").unwrap());
    }

    #[test]
    fn test_get_is_case_insensitive() {
        assert_eq!(row().get::<String>("STATUS").unwrap(), "up");
    }

    #[test]
    fn test_datetime_from_text() {
        let dt: NaiveDateTime = row().get("applied_at").unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M:%S%.3f").to_string(), "2025-11-05 10:24:30.250");

        let iso = NaiveDateTime::from_value(&Value::from("2025-11-05T10:24:30")).unwrap();
        assert_eq!(iso.format("%H:%M:%S").to_string(), "10:24:30");
    }

    #[test]
    fn test_missing_column_and_index() {
        let r = row();
        assert!(r.get::<String>("nope").is_err());
        assert!(r.get_by_index::<String>(10).is_err());
        assert_eq!(r.get_by_index::<String>(0).unwrap(), "v1.sql");
    }

    #[test]
    fn test_option_handles_null() {
        let r = Row::new(vec!["x".into()], vec![Value::Null]);
        assert_eq!(r.get::<Option<NaiveDateTime>>("x").unwrap(), None);
        assert!(r.get::<String>("x").is_err());
    }
}
