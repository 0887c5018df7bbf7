//! # Field Constraints
//!
//! Rules relating sibling fields of one object, beyond their individual
//! shapes. A field is *present* when its key exists and its value is not
//! `null`.
//!
//! Constraints run only after every declared field of the object has
//! type-checked, and they see the object after defaults were filled in.
//! Violations are reported at the object's own path.

use std::fmt;

use serde::Deserialize;
use serde_json::{Map, Value};

/// A rule over sibling fields.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldConstraint {
    /// Exactly one of the fields is present.
    ExactlyOneOf(Vec<String>),
    /// At most one of the fields is present.
    MutuallyExclusive(Vec<String>),
    /// At least one of the fields is present.
    AtLeastOneOf(Vec<String>),
    /// `field` is present whenever `when` equals `equals`.
    RequiredIf {
        /// The conditionally required field.
        field: String,
        /// The field whose value triggers the requirement.
        when: String,
        /// The triggering value.
        equals: Value,
    },
    /// When `field` is present, every field in `requires` is present too.
    Requires {
        /// The field whose presence triggers the requirement.
        field: String,
        /// Fields that must accompany it.
        requires: Vec<String>,
    },
}

fn owned<I, S>(fields: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    fields.into_iter().map(Into::into).collect()
}

fn is_present(object: &Map<String, Value>, field: &str) -> bool {
    object.get(field).is_some_and(|v| !v.is_null())
}

impl FieldConstraint {
    /// Exactly one of `fields` must be present.
    pub fn exactly_one_of<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldConstraint::ExactlyOneOf(owned(fields))
    }

    /// At most one of `fields` may be present.
    pub fn mutually_exclusive<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldConstraint::MutuallyExclusive(owned(fields))
    }

    /// At least one of `fields` must be present.
    pub fn at_least_one_of<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldConstraint::AtLeastOneOf(owned(fields))
    }

    /// `field` is required when `when` equals `equals`.
    pub fn required_if(
        field: impl Into<String>,
        when: impl Into<String>,
        equals: impl Into<Value>,
    ) -> Self {
        FieldConstraint::RequiredIf {
            field: field.into(),
            when: when.into(),
            equals: equals.into(),
        }
    }

    /// Presence of `field` requires presence of each of `requires`.
    pub fn requires<I, S>(field: impl Into<String>, requires: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldConstraint::Requires {
            field: field.into(),
            requires: owned(requires),
        }
    }

    /// Every field name the constraint mentions.
    pub fn referenced_fields(&self) -> Vec<&str> {
        match self {
            FieldConstraint::ExactlyOneOf(fields)
            | FieldConstraint::MutuallyExclusive(fields)
            | FieldConstraint::AtLeastOneOf(fields) => fields.iter().map(String::as_str).collect(),
            FieldConstraint::RequiredIf { field, when, .. } => vec![field.as_str(), when.as_str()],
            FieldConstraint::Requires { field, requires } => std::iter::once(field.as_str())
                .chain(requires.iter().map(String::as_str))
                .collect(),
        }
    }

    /// Fields whose presence the constraint counts. A default on any of
    /// these would make the constraint trivially true or false.
    pub fn presence_counted_fields(&self) -> Vec<&str> {
        match self {
            FieldConstraint::ExactlyOneOf(fields)
            | FieldConstraint::MutuallyExclusive(fields)
            | FieldConstraint::AtLeastOneOf(fields) => fields.iter().map(String::as_str).collect(),
            FieldConstraint::RequiredIf { field, .. } => vec![field.as_str()],
            FieldConstraint::Requires { requires, .. } => {
                requires.iter().map(String::as_str).collect()
            }
        }
    }

    /// The field set of a set constraint, `None` for the others.
    pub(crate) fn field_set(&self) -> Option<&[String]> {
        match self {
            FieldConstraint::ExactlyOneOf(fields)
            | FieldConstraint::MutuallyExclusive(fields)
            | FieldConstraint::AtLeastOneOf(fields) => Some(fields),
            _ => None,
        }
    }

    /// Evaluate against an object. Returns a description of what was found
    /// when the constraint does not hold.
    pub fn check(&self, object: &Map<String, Value>) -> Option<String> {
        match self {
            FieldConstraint::ExactlyOneOf(fields) => {
                let present = present_fields(object, fields);
                match present.len() {
                    1 => None,
                    0 => Some("none of them".to_string()),
                    _ => Some(found(&present)),
                }
            }
            FieldConstraint::MutuallyExclusive(fields) => {
                let present = present_fields(object, fields);
                (present.len() > 1).then(|| found(&present))
            }
            FieldConstraint::AtLeastOneOf(fields) => {
                let present = present_fields(object, fields);
                present.is_empty().then(|| "none of them".to_string())
            }
            FieldConstraint::RequiredIf {
                field,
                when,
                equals,
            } => {
                let triggered = object.get(when) == Some(equals);
                (triggered && !is_present(object, field))
                    .then(|| format!("'{field}' not provided while '{when}' is {equals}"))
            }
            FieldConstraint::Requires { field, requires } => {
                if !is_present(object, field) {
                    return None;
                }
                let missing: Vec<&str> = requires
                    .iter()
                    .map(String::as_str)
                    .filter(|r| !is_present(object, r))
                    .collect();
                (!missing.is_empty())
                    .then(|| format!("'{field}' provided without {}", missing.join(", ")))
            }
        }
    }
}

fn present_fields<'a>(object: &Map<String, Value>, fields: &'a [String]) -> Vec<&'a str> {
    fields
        .iter()
        .map(String::as_str)
        .filter(|f| is_present(object, f))
        .collect()
}

fn found(present: &[&str]) -> String {
    format!("{} of them ({})", present.len(), present.join(", "))
}

impl fmt::Display for FieldConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldConstraint::ExactlyOneOf(fields) => {
                write!(f, "exactly one of [{}]", fields.join(", "))
            }
            FieldConstraint::MutuallyExclusive(fields) => {
                write!(f, "at most one of [{}]", fields.join(", "))
            }
            FieldConstraint::AtLeastOneOf(fields) => {
                write!(f, "at least one of [{}]", fields.join(", "))
            }
            FieldConstraint::RequiredIf {
                field,
                when,
                equals,
            } => write!(f, "'{field}' required when '{when}' is {equals}"),
            FieldConstraint::Requires { field, requires } => {
                write!(f, "'{field}' requires [{}]", requires.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn exactly_one_of() {
        let c = FieldConstraint::exactly_one_of(["name", "arn"]);
        assert_eq!(c.check(&object(json!({"name": "a"}))), None);
        assert_eq!(c.check(&object(json!({"arn": "a"}))), None);
        assert_eq!(
            c.check(&object(json!({}))).as_deref(),
            Some("none of them")
        );
        assert_eq!(
            c.check(&object(json!({"name": "a", "arn": "b"}))).as_deref(),
            Some("2 of them (name, arn)")
        );
    }

    #[test]
    fn null_counts_as_absent() {
        let c = FieldConstraint::exactly_one_of(["name", "arn"]);
        assert_eq!(c.check(&object(json!({"name": "a", "arn": null}))), None);
        assert!(c.check(&object(json!({"name": null}))).is_some());
    }

    #[test]
    fn mutually_exclusive_allows_none() {
        let c = FieldConstraint::mutually_exclusive(["include", "patterns"]);
        assert_eq!(c.check(&object(json!({}))), None);
        assert_eq!(c.check(&object(json!({"include": []}))), None);
        assert!(c.check(&object(json!({"include": [], "patterns": []}))).is_some());
    }

    #[test]
    fn at_least_one_of() {
        let c = FieldConstraint::at_least_one_of(["prefix", "suffix"]);
        assert!(c.check(&object(json!({}))).is_some());
        assert_eq!(c.check(&object(json!({"suffix": ".jpg"}))), None);
    }

    #[test]
    fn required_if_triggers_on_exact_value() {
        let c = FieldConstraint::required_if("userPoolArn", "type", "cognito");
        assert!(c.check(&object(json!({"type": "cognito"}))).is_some());
        assert_eq!(c.check(&object(json!({"type": "oidc"}))), None);
        assert_eq!(
            c.check(&object(json!({"type": "cognito", "userPoolArn": "arn"}))),
            None
        );
    }

    #[test]
    fn requires_lists_missing_companions() {
        let c = FieldConstraint::requires("sseCustomerKey", ["sseCustomerAlgorithim", "sseCustomerKeyMD5"]);
        assert_eq!(c.check(&object(json!({}))), None);
        assert_eq!(
            c.check(&object(json!({"sseCustomerKey": "k", "sseCustomerKeyMD5": "m"})))
                .as_deref(),
            Some("'sseCustomerKey' provided without sseCustomerAlgorithim")
        );
    }

    #[test]
    fn display_forms() {
        assert_eq!(
            FieldConstraint::exactly_one_of(["name", "arn"]).to_string(),
            "exactly one of [name, arn]"
        );
        assert_eq!(
            FieldConstraint::required_if("b", "a", "v").to_string(),
            r#"'b' required when 'a' is "v""#
        );
    }

    #[test]
    fn presence_counted_fields_exclude_triggers() {
        let c = FieldConstraint::required_if("b", "a", true);
        assert_eq!(c.presence_counted_fields(), ["b"]);
        assert_eq!(c.referenced_fields(), ["b", "a"]);
        let c = FieldConstraint::requires("a", ["b", "c"]);
        assert_eq!(c.presence_counted_fields(), ["b", "c"]);
    }

    #[test]
    fn deserialize_from_description() {
        let c: FieldConstraint = serde_json::from_value(json!({"exactly_one_of": ["name", "arn"]})).unwrap();
        assert_eq!(c, FieldConstraint::exactly_one_of(["name", "arn"]));
        let c: FieldConstraint = serde_json::from_value(
            json!({"required_if": {"field": "b", "when": "a", "equals": 1}}),
        )
        .unwrap();
        assert_eq!(c, FieldConstraint::required_if("b", "a", 1));
    }
}
