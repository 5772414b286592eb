//! Lenient accessors over dynamic JSON values.
//!
//! Vendor responses are loosely typed: numbers arrive as strings, flags as
//! integers, and optional fields are frequently absent. [`ValueExt`] reads a
//! [`serde_json::Value`] tree the forgiving way, returning a default instead
//! of failing when a key is missing or a scalar has an unexpected type.
//!
//! # Example
//!
//! ```
//! use bilirq_core::value::ValueExt;
//! use serde_json::json;
//!
//! let body = json!({"code": "0", "data": {"list": [{"title": "a"}]}});
//! assert_eq!(body.field("code").int_value(), 0);
//! assert_eq!(body.field("data").field("list").at(0).field("title").string_value(), "a");
//! assert!(body.field("missing").field("deeper").is_null());
//! ```

use serde_json::Value;

static NULL: Value = Value::Null;

/// Forgiving read access to a JSON value.
pub trait ValueExt {
    /// Returns the member `key` of an object, or `null` if absent.
    fn field(&self, key: &str) -> &Value;

    /// Returns the element at `index` of an array, or `null` if absent.
    fn at(&self, index: usize) -> &Value;

    /// Returns the value as an integer if it can be read as one.
    ///
    /// Accepts integers, floats (truncated), numeric strings and booleans.
    fn int(&self) -> Option<i64>;

    /// Returns the value as an integer, defaulting to `0`.
    fn int_value(&self) -> i64 {
        self.int().unwrap_or(0)
    }

    /// Returns the value as a float if it can be read as one.
    fn float(&self) -> Option<f64>;

    /// Returns the value as a float, defaulting to `0.0`.
    fn float_value(&self) -> f64 {
        self.float().unwrap_or(0.0)
    }

    /// Returns the value as a string if it is a string, number or boolean.
    fn string(&self) -> Option<String>;

    /// Returns the value as a string, defaulting to the empty string.
    fn string_value(&self) -> String {
        self.string().unwrap_or_default()
    }

    /// Returns the value as a boolean, defaulting to `false`.
    ///
    /// Non-zero numbers and the strings `"true"`, `"yes"`, `"1"` read as true.
    fn bool_value(&self) -> bool;

    /// Returns the elements of an array, or an empty slice.
    fn array_value(&self) -> &[Value];
}

impl ValueExt for Value {
    fn field(&self, key: &str) -> &Value {
        self.get(key).unwrap_or(&NULL)
    }

    fn at(&self, index: usize) -> &Value {
        self.get(index).unwrap_or(&NULL)
    }

    fn int(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_u64().and_then(|v| i64::try_from(v).ok()))
                .or_else(|| n.as_f64().map(|v| v as i64)),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().map(|v| v as i64))
            }
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    fn float(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    fn string(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    fn bool_value(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
            Value::String(s) => matches!(s.to_ascii_lowercase().as_str(), "true" | "yes" | "1"),
            _ => false,
        }
    }

    fn array_value(&self) -> &[Value] {
        match self {
            Value::Array(items) => items,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_paths_are_null() {
        let value = json!({"a": 1});
        assert!(value.field("b").is_null());
        assert!(value.field("b").field("c").at(3).is_null());
        assert!(json!(42).field("a").is_null());
    }

    #[test]
    fn test_int_value_coercions() {
        assert_eq!(json!(7).int_value(), 7);
        assert_eq!(json!("-101").int_value(), -101);
        assert_eq!(json!(3.9).int_value(), 3);
        assert_eq!(json!(true).int_value(), 1);
        assert_eq!(json!("abc").int_value(), 0);
        assert_eq!(Value::Null.int_value(), 0);
        assert_eq!(Value::Null.int(), None);
    }

    #[test]
    fn test_string_value_coercions() {
        assert_eq!(json!("hi").string_value(), "hi");
        assert_eq!(json!(12).string_value(), "12");
        assert_eq!(json!(false).string_value(), "false");
        assert_eq!(json!({"a": 1}).string_value(), "");
    }

    #[test]
    fn test_bool_value() {
        assert!(json!(1).bool_value());
        assert!(json!("true").bool_value());
        assert!(!json!(0).bool_value());
        assert!(!Value::Null.bool_value());
    }

    #[test]
    fn test_array_value() {
        let value = json!({"list": [1, 2, 3]});
        assert_eq!(value.field("list").array_value().len(), 3);
        assert_eq!(value.field("list").at(1).int_value(), 2);
        assert!(value.field("other").array_value().is_empty());
    }

    #[test]
    fn test_float_value() {
        assert!((json!("1.5").float_value() - 1.5).abs() < f64::EPSILON);
        assert!((json!(2).float_value() - 2.0).abs() < f64::EPSILON);
    }
}
