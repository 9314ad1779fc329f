//! SQL value and row types for the relational sink boundary.

use serde_json::Value;

/// Scalar value bound as an insert parameter.
///
/// Documents only ever produce these shapes after encoding: JSON scalars
/// pass through, everything non-scalar is either dropped or serialized to
/// `Text` by the substructure codec.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    I64(i64),
    F64(f64),
    Text(String),
}

impl SqlValue {
    /// Convert a scalar JSON value. Returns `None` for arrays and objects.
    pub fn from_scalar(value: &Value) -> Option<SqlValue> {
        match value {
            Value::Null => Some(SqlValue::Null),
            Value::Bool(b) => Some(SqlValue::Bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(SqlValue::I64(i))
                } else {
                    n.as_f64().map(SqlValue::F64)
                }
            }
            Value::String(s) => Some(SqlValue::Text(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// SQL cast suffix for the string-typed parameter carrying this value.
    pub fn sql_cast(&self) -> &'static str {
        match self {
            // NULL text casts cleanly to any destination column type.
            SqlValue::Null | SqlValue::Text(_) => "::text",
            SqlValue::Bool(_) => "::boolean",
            SqlValue::I64(_) => "::bigint",
            SqlValue::F64(_) => "::double precision",
        }
    }

    /// String form bound as the parameter; `None` encodes SQL NULL.
    pub fn to_param(&self) -> Option<String> {
        match self {
            SqlValue::Null => None,
            SqlValue::Bool(b) => Some(if *b { "t".to_string() } else { "f".to_string() }),
            SqlValue::I64(n) => Some(n.to_string()),
            SqlValue::F64(n) => Some(n.to_string()),
            SqlValue::Text(s) => Some(s.clone()),
        }
    }
}

/// An ordered set of column/value pairs forming one insert.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlRow {
    fields: Vec<(String, SqlValue)>,
}

impl SqlRow {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column value.
    pub fn push(&mut self, column: impl Into<String>, value: SqlValue) {
        self.fields.push((column.into(), value));
    }

    /// Get a column's value, if present.
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.fields
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    /// Iterate over column/value pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &(String, SqlValue)> {
        self.fields.iter()
    }

    /// Column names in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(c, _)| c.as_str())
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_scalar() {
        assert_eq!(SqlValue::from_scalar(&json!(null)), Some(SqlValue::Null));
        assert_eq!(SqlValue::from_scalar(&json!(true)), Some(SqlValue::Bool(true)));
        assert_eq!(SqlValue::from_scalar(&json!(42)), Some(SqlValue::I64(42)));
        assert_eq!(SqlValue::from_scalar(&json!(1.5)), Some(SqlValue::F64(1.5)));
        assert_eq!(
            SqlValue::from_scalar(&json!("hi")),
            Some(SqlValue::Text("hi".to_string()))
        );
        assert_eq!(SqlValue::from_scalar(&json!([1])), None);
        assert_eq!(SqlValue::from_scalar(&json!({"a": 1})), None);
    }

    #[test]
    fn test_param_encoding() {
        assert_eq!(SqlValue::Null.to_param(), None);
        assert_eq!(SqlValue::Bool(true).to_param().as_deref(), Some("t"));
        assert_eq!(SqlValue::I64(-3).to_param().as_deref(), Some("-3"));
        assert_eq!(SqlValue::I64(7).sql_cast(), "::bigint");
    }

    #[test]
    fn test_row_ordering() {
        let mut row = SqlRow::new();
        row.push("b", SqlValue::I64(2));
        row.push("a", SqlValue::I64(1));
        let cols: Vec<_> = row.columns().collect();
        assert_eq!(cols, vec!["b", "a"]);
        assert_eq!(row.get("a"), Some(&SqlValue::I64(1)));
        assert_eq!(row.len(), 2);
    }
}
