//! # Value Shapes
//!
//! Classifies a document value by its runtime kind and produces the short
//! "got ..." descriptions used in violation messages.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// Longest string literal quoted verbatim in a description.
const MAX_QUOTED_LEN: usize = 40;

/// Runtime kind of a document value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// `null`.
    Null,
    /// `true` or `false`.
    Boolean,
    /// A number with no fractional part.
    Integer,
    /// Any other number.
    Number,
    /// A string.
    String,
    /// A sequence.
    Array,
    /// A mapping.
    Object,
}

impl Shape {
    /// Classify a value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Shape::Null,
            Value::Bool(_) => Shape::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => Shape::Integer,
            Value::Number(_) => Shape::Number,
            Value::String(_) => Shape::String,
            Value::Array(_) => Shape::Array,
            Value::Object(_) => Shape::Object,
        }
    }

    /// Lowercase name of the shape.
    pub fn name(self) -> &'static str {
        match self {
            Shape::Null => "null",
            Shape::Boolean => "boolean",
            Shape::Integer => "integer",
            Shape::Number => "number",
            Shape::String => "string",
            Shape::Array => "array",
            Shape::Object => "object",
        }
    }

    /// True for arrays and objects.
    pub fn is_container(self) -> bool {
        matches!(self, Shape::Array | Shape::Object)
    }

    /// Describe a concrete value for a violation message.
    ///
    /// Scalars include their literal (`string "put"`, `integer 3`);
    /// containers include their size (`array of 2 elements`).
    pub fn describe(value: &Value) -> String {
        match value {
            Value::Null => "null".to_string(),
            Value::Bool(b) => format!("boolean {b}"),
            Value::Number(n) => format!("{} {n}", Shape::of(value).name()),
            Value::String(s) if s.chars().count() <= MAX_QUOTED_LEN => format!("string {s:?}"),
            Value::String(s) => {
                let head: String = s.chars().take(MAX_QUOTED_LEN).collect();
                format!("string {:?}", format!("{head}..."))
            }
            Value::Array(items) => match items.len() {
                1 => "array of 1 element".to_string(),
                n => format!("array of {n} elements"),
            },
            Value::Object(map) => match map.len() {
                0 => "empty object".to_string(),
                1 => "object with 1 key".to_string(),
                n => format!("object with {n} keys"),
            },
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classifies_every_kind() {
        assert_eq!(Shape::of(&json!(null)), Shape::Null);
        assert_eq!(Shape::of(&json!(true)), Shape::Boolean);
        assert_eq!(Shape::of(&json!(3)), Shape::Integer);
        assert_eq!(Shape::of(&json!(-3)), Shape::Integer);
        assert_eq!(Shape::of(&json!(1.5)), Shape::Number);
        assert_eq!(Shape::of(&json!("x")), Shape::String);
        assert_eq!(Shape::of(&json!([])), Shape::Array);
        assert_eq!(Shape::of(&json!({})), Shape::Object);
    }

    #[test]
    fn describes_scalars_with_literal() {
        assert_eq!(Shape::describe(&json!("put")), r#"string "put""#);
        assert_eq!(Shape::describe(&json!(100)), "integer 100");
        assert_eq!(Shape::describe(&json!(false)), "boolean false");
    }

    #[test]
    fn truncates_long_strings() {
        let long = "a".repeat(100);
        let described = Shape::describe(&json!(long));
        assert!(described.ends_with(r#"...""#), "{described}");
        assert!(described.len() < 60);
    }

    #[test]
    fn describes_containers_by_size() {
        assert_eq!(Shape::describe(&json!([1])), "array of 1 element");
        assert_eq!(Shape::describe(&json!([1, 2])), "array of 2 elements");
        assert_eq!(Shape::describe(&json!({})), "empty object");
        assert_eq!(Shape::describe(&json!({"a": 1, "b": 2})), "object with 2 keys");
    }
}
