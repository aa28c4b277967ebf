//! Scalar cell values shared by raw records and datasets.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// One API-returned feature: field name to scalar. Keys iterate sorted.
pub type RawRecord = BTreeMap<String, Value>;

/// A scalar cell.
///
/// Integers deserialize as [`Value::Int`]; anything with a fractional part or
/// outside the `i64` range becomes [`Value::Float`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// JSON `null`.
    Null,
    /// JSON boolean.
    Bool(bool),
    /// Integer that fits in `i64`.
    Int(i64),
    /// Any other JSON number.
    Float(f64),
    /// JSON string.
    Text(String),
}

/// Hashable form of a value used to match rows across datasets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JoinKey {
    /// Integral numeric key.
    Int(i64),
    /// Text key, compared exactly.
    Text(String),
}

impl Value {
    /// Whether the value is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value. Booleans are not numbers here.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Integer view: ints, and floats without a fractional part.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Some(*f as i64),
            _ => None,
        }
    }

    /// Text view of the value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Short type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
        }
    }

    /// Key for equality joins. `1` and `1.0` share a key; nulls have none.
    pub fn join_key(&self) -> Option<JoinKey> {
        match self {
            Value::Text(s) => Some(JoinKey::Text(s.clone())),
            other => other.as_i64().map(JoinKey::Int),
        }
    }

    /// Ordering used by `sort_by`, for two non-null values.
    ///
    /// Numbers compare numerically, text lexicographically; across types
    /// booleans sort before numbers and numbers before text.
    pub(crate) fn cmp_non_null(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                _ => a.type_rank().cmp(&b.type_rank()),
            },
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            Value::Bool(_) => 0,
            Value::Int(_) | Value::Float(_) => 1,
            Value::Text(_) => 2,
            Value::Null => 3,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_deserialization() {
        let record: RawRecord = serde_json::from_str(
            r#"{"a": null, "b": 3, "c": 2.5, "d": "x", "e": true, "f": 12345678901234567890}"#,
        )
        .unwrap();
        assert_eq!(record["a"], Value::Null);
        assert_eq!(record["b"], Value::Int(3));
        assert_eq!(record["c"], Value::Float(2.5));
        assert_eq!(record["d"], Value::Text("x".into()));
        assert_eq!(record["e"], Value::Bool(true));
        assert!(matches!(record["f"], Value::Float(_)));
        assert_eq!(
            record.keys().collect::<Vec<_>>(),
            vec!["a", "b", "c", "d", "e", "f"]
        );
    }

    #[test]
    fn test_join_key_unifies_integral_floats() {
        assert_eq!(Value::Int(16).join_key(), Value::Float(16.0).join_key());
        assert_eq!(Value::Float(16.5).join_key(), None);
        assert_eq!(Value::Null.join_key(), None);
        assert_eq!(
            Value::from("A00-A04").join_key(),
            Some(JoinKey::Text("A00-A04".into()))
        );
    }

    #[test]
    fn test_mixed_numeric_ordering() {
        assert_eq!(Value::Int(2).cmp_non_null(&Value::Float(2.5)), Ordering::Less);
        assert_eq!(Value::Float(3.0).cmp_non_null(&Value::Int(3)), Ordering::Equal);
        assert_eq!(Value::Int(100).cmp_non_null(&Value::from("1")), Ordering::Less);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Int(7).to_string(), "7");
        assert_eq!(Value::Float(7.25).to_string(), "7.25");
        assert_eq!(Value::from("Hamburg").to_string(), "Hamburg");
        assert_eq!(Value::Null.to_string(), "");
    }
}
