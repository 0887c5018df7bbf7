//! # Document Validation
//!
//! Checks a document (a `serde_json::Value` tree) against a compiled
//! [`Schema`] and produces a [`ValidationResult`].
//!
//! ## Contract
//!
//! Validation is a pure function of the document, the schema and the
//! [`ValidatorOptions`]. It never mutates the document, never panics on
//! malformed input and never returns an error: a document that does not
//! conform is *data*, reported as [`ValidationResult::Rejected`] with every
//! violation found in one pass.
//!
//! ## Traversal Rules
//!
//! - Violations are collected across siblings; the walk does not stop at
//!   the first bad field.
//! - A wrong container kind (object expected, array found) yields exactly
//!   one violation at that path and the walk does not descend into it.
//! - Object constraints run only when every declared field of that object
//!   checked cleanly.
//! - Union alternatives are tried in declaration order. The first clean
//!   match supplies the normalized value; if none match, one
//!   `UnionExhausted` violation carries every attempt.
//!
//! ## Normalization
//!
//! Optional fields that are absent or `null` receive their declared
//! default. Defaults were validated and normalized when the schema was
//! compiled, so the output of an accepted document validates again to
//! itself.

use std::collections::HashMap;
use std::fmt;

use dshape_core::{FieldPath, Shape};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::compile::Schema;
use crate::node::{ArraySchema, ObjectSchema, SchemaNode, TupleSchema, UnionSchema, UnknownFields};

/// Validator-wide treatment of undeclared object keys, used by objects
/// whose own policy is [`UnknownFields::Inherit`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownFieldPolicy {
    /// Keep undeclared keys unchecked.
    #[default]
    Ignore,
    /// Report undeclared keys as violations (strict mode).
    Reject,
}

/// Options for one validation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorOptions {
    /// Treatment of undeclared keys in objects that inherit it.
    pub unknown_fields: UnknownFieldPolicy,
    /// Fill declared defaults into the accepted document.
    pub fill_defaults: bool,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            unknown_fields: UnknownFieldPolicy::Ignore,
            fill_defaults: true,
        }
    }
}

impl ValidatorOptions {
    /// Default options with undeclared keys rejected.
    pub fn strict() -> Self {
        Self {
            unknown_fields: UnknownFieldPolicy::Reject,
            ..Self::default()
        }
    }
}

/// Category of a [`Violation`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViolationKind {
    /// The value's container kind does not match (object vs array vs scalar).
    StructuralMismatch,
    /// A scalar of the wrong type (string where a number was expected).
    TypeMismatch,
    /// A required field is absent, or present as `null`.
    MissingRequiredField {
        /// True when the key exists with a `null` value.
        null: bool,
    },
    /// A key the object does not declare (strict mode or `deny` objects).
    UnknownField,
    /// A scalar outside the allowed literals.
    EnumMismatch,
    /// An array or tuple with too few or too many elements.
    LengthMismatch,
    /// A rule over sibling fields does not hold.
    ConstraintViolation {
        /// The constraint, as text.
        constraint: String,
    },
    /// No union alternative matched.
    UnionExhausted {
        /// Every alternative tried, in order.
        attempts: Vec<UnionAttempt>,
    },
}

impl ViolationKind {
    /// Short name of the kind.
    pub fn name(&self) -> &'static str {
        match self {
            ViolationKind::StructuralMismatch => "structural_mismatch",
            ViolationKind::TypeMismatch => "type_mismatch",
            ViolationKind::MissingRequiredField { .. } => "missing_required_field",
            ViolationKind::UnknownField => "unknown_field",
            ViolationKind::EnumMismatch => "enum_mismatch",
            ViolationKind::LengthMismatch => "length_mismatch",
            ViolationKind::ConstraintViolation { .. } => "constraint_violation",
            ViolationKind::UnionExhausted { .. } => "union_exhausted",
        }
    }
}

/// One failed union alternative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnionAttempt {
    /// Position of the alternative in the union.
    pub alternative: usize,
    /// What the alternative expects.
    pub expected: String,
    /// Why it did not match.
    pub violations: Vec<Violation>,
}

/// One discrepancy between a document and its schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// Location of the offending value.
    pub path: FieldPath,
    /// Category, with kind-specific detail.
    #[serde(flatten)]
    pub kind: ViolationKind,
    /// What the schema expects at this path.
    pub expected: String,
    /// What the document holds at this path.
    pub actual: String,
}

impl Violation {
    fn new(path: &FieldPath, kind: ViolationKind, expected: String, actual: String) -> Self {
        Self {
            path: path.clone(),
            kind,
            expected,
            actual,
        }
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "    ".repeat(depth);
        write!(
            f,
            "{indent}at {}: expected {}, got {}",
            self.path, self.expected, self.actual
        )?;
        if let ViolationKind::UnionExhausted { attempts } = &self.kind {
            for attempt in attempts {
                write!(
                    f,
                    "\n{indent}  alternative {} ({}):",
                    attempt.alternative, attempt.expected
                )?;
                for violation in &attempt.violations {
                    writeln!(f)?;
                    violation.write_indented(f, depth + 1)?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

/// Outcome of validating one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationResult {
    /// The document conforms; holds the normalized document.
    Accepted(Value),
    /// The document does not conform; holds every violation, in traversal order.
    Rejected(Vec<Violation>),
}

impl ValidationResult {
    /// True if the document was accepted.
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationResult::Accepted(_))
    }

    /// The normalized document, if accepted.
    pub fn document(&self) -> Option<&Value> {
        match self {
            ValidationResult::Accepted(document) => Some(document),
            ValidationResult::Rejected(_) => None,
        }
    }

    /// The violations; empty if accepted.
    pub fn violations(&self) -> &[Violation] {
        match self {
            ValidationResult::Accepted(_) => &[],
            ValidationResult::Rejected(violations) => violations,
        }
    }

    /// Convert into a `Result`.
    pub fn into_result(self) -> Result<Value, Vec<Violation>> {
        match self {
            ValidationResult::Accepted(document) => Ok(document),
            ValidationResult::Rejected(violations) => Err(violations),
        }
    }
}

/// Validate `document` against `schema` with default options.
pub fn validate(document: &Value, schema: &Schema) -> ValidationResult {
    validate_with(document, schema, &ValidatorOptions::default())
}

/// Validate `document` against `schema` with explicit options.
pub fn validate_with(
    document: &Value,
    schema: &Schema,
    options: &ValidatorOptions,
) -> ValidationResult {
    let (normalized, violations) = check_value(schema.root(), document, options);
    if violations.is_empty() {
        ValidationResult::Accepted(normalized)
    } else {
        ValidationResult::Rejected(violations)
    }
}

/// Run the walk without the compile-time guarantees of [`Schema`]. Used by
/// the compiler to check defaults.
pub(crate) fn check_value(
    node: &SchemaNode,
    value: &Value,
    options: &ValidatorOptions,
) -> (Value, Vec<Violation>) {
    let walker = Walker { options };
    let mut violations = Vec::new();
    let normalized = walker.check(node, value, &FieldPath::root(), &mut violations);
    (normalized, violations)
}

struct Walker<'o> {
    options: &'o ValidatorOptions,
}

impl Walker<'_> {
    /// Check `value` against `node`, appending violations to `out`, and
    /// return the normalized value. The return value is only meaningful
    /// when nothing was appended.
    fn check(
        &self,
        node: &SchemaNode,
        value: &Value,
        path: &FieldPath,
        out: &mut Vec<Violation>,
    ) -> Value {
        match node {
            SchemaNode::Any => value.clone(),
            SchemaNode::String
            | SchemaNode::Number
            | SchemaNode::Integer
            | SchemaNode::Boolean => {
                if !primitive_matches(node, value) {
                    out.push(kind_mismatch(node, value, path));
                }
                value.clone()
            }
            SchemaNode::Enum { values } => {
                if Shape::of(value).is_container() {
                    out.push(kind_mismatch(node, value, path));
                } else if !values.contains(value) {
                    out.push(Violation::new(
                        path,
                        ViolationKind::EnumMismatch,
                        node.describe(),
                        Shape::describe(value),
                    ));
                }
                value.clone()
            }
            SchemaNode::Object(object) => self.check_object(node, object, value, path, out),
            SchemaNode::Array(array) => self.check_array(node, array, value, path, out),
            SchemaNode::Tuple(tuple) => self.check_tuple(node, tuple, value, path, out),
            SchemaNode::Union(union) => self.check_union(node, union, value, path, out),
        }
    }

    fn check_object(
        &self,
        node: &SchemaNode,
        object: &ObjectSchema,
        value: &Value,
        path: &FieldPath,
        out: &mut Vec<Violation>,
    ) -> Value {
        let Value::Object(map) = value else {
            out.push(kind_mismatch(node, value, path));
            return value.clone();
        };
        let start = out.len();

        // Declared fields, in declaration order.
        let mut checked: HashMap<&str, Value> = HashMap::new();
        let mut defaults: Vec<(&str, &Value)> = Vec::new();
        for field in &object.fields {
            let child = path.child(field.name.as_str());
            match map.get(&field.name) {
                Some(Value::Null) | None if field.required => {
                    let null = map.contains_key(&field.name);
                    out.push(Violation::new(
                        &child,
                        ViolationKind::MissingRequiredField { null },
                        field.node.describe(),
                        if null { "null" } else { "absent" }.to_string(),
                    ));
                }
                Some(Value::Null) => {
                    let filled = match (&field.default, self.options.fill_defaults) {
                        (Some(default), true) => default.clone(),
                        _ => Value::Null,
                    };
                    checked.insert(field.name.as_str(), filled);
                }
                None => {
                    if let (Some(default), true) = (&field.default, self.options.fill_defaults) {
                        defaults.push((field.name.as_str(), default));
                    }
                }
                Some(present) => {
                    let normalized = self.check(&field.node, present, &child, out);
                    checked.insert(field.name.as_str(), normalized);
                }
            }
        }

        // Rebuild in document order, handling undeclared keys on the way.
        let mut normalized = Map::new();
        for (key, present) in map {
            if let Some(value) = checked.remove(key.as_str()) {
                normalized.insert(key.clone(), value);
                continue;
            }
            if object.get(key).is_some() {
                // A required field reported above.
                normalized.insert(key.clone(), present.clone());
                continue;
            }
            let child = path.child(key.as_str());
            match &object.unknown_fields {
                UnknownFields::Values(values) => {
                    let value = self.check(values, present, &child, out);
                    normalized.insert(key.clone(), value);
                }
                UnknownFields::Deny => out.push(unknown_field(&child, present)),
                UnknownFields::Inherit
                    if self.options.unknown_fields == UnknownFieldPolicy::Reject =>
                {
                    out.push(unknown_field(&child, present));
                }
                UnknownFields::Inherit | UnknownFields::Ignore => {
                    normalized.insert(key.clone(), present.clone());
                }
            }
        }
        for (name, default) in defaults {
            normalized.insert(name.to_string(), default.clone());
        }

        if out.len() == start {
            for constraint in &object.constraints {
                if let Some(actual) = constraint.check(&normalized) {
                    let text = constraint.to_string();
                    out.push(Violation::new(
                        path,
                        ViolationKind::ConstraintViolation {
                            constraint: text.clone(),
                        },
                        text,
                        actual,
                    ));
                }
            }
        }

        Value::Object(normalized)
    }

    fn check_array(
        &self,
        node: &SchemaNode,
        array: &ArraySchema,
        value: &Value,
        path: &FieldPath,
        out: &mut Vec<Violation>,
    ) -> Value {
        let Value::Array(items) = value else {
            out.push(kind_mismatch(node, value, path));
            return value.clone();
        };

        let too_short = array.min_len.is_some_and(|min| items.len() < min);
        let too_long = array.max_len.is_some_and(|max| items.len() > max);
        if too_short || too_long {
            out.push(Violation::new(
                path,
                ViolationKind::LengthMismatch,
                format!("{} with {}", node.describe(), bounds(array.min_len, array.max_len)),
                Shape::describe(value),
            ));
        }

        let normalized = items
            .iter()
            .enumerate()
            .map(|(i, item)| self.check(&array.items, item, &path.child(i), out))
            .collect();
        Value::Array(normalized)
    }

    fn check_tuple(
        &self,
        node: &SchemaNode,
        tuple: &TupleSchema,
        value: &Value,
        path: &FieldPath,
        out: &mut Vec<Violation>,
    ) -> Value {
        let Value::Array(items) = value else {
            out.push(kind_mismatch(node, value, path));
            return value.clone();
        };

        let min = tuple.min_length();
        let max = tuple.max_length();
        if items.len() < min || max.is_some_and(|max| items.len() > max) {
            out.push(Violation::new(
                path,
                ViolationKind::LengthMismatch,
                format!("{} with {}", node.describe(), bounds(Some(min), max)),
                Shape::describe(value),
            ));
        }

        let mut normalized = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let element = match (tuple.prefix.get(i), &tuple.rest) {
                (Some(position), _) => position,
                (None, Some(rest)) => rest,
                // Reported as a length mismatch above.
                (None, None) => break,
            };
            normalized.push(self.check(element, item, &path.child(i), out));
        }
        Value::Array(normalized)
    }

    fn check_union(
        &self,
        node: &SchemaNode,
        union: &UnionSchema,
        value: &Value,
        path: &FieldPath,
        out: &mut Vec<Violation>,
    ) -> Value {
        let mut attempts = Vec::with_capacity(union.alternatives.len());
        for (i, alternative) in union.alternatives.iter().enumerate() {
            let mut scratch = Vec::new();
            let normalized = self.check(alternative, value, path, &mut scratch);
            if scratch.is_empty() {
                tracing::trace!(path = %path, alternative = i, "union alternative selected");
                return normalized;
            }
            attempts.push(UnionAttempt {
                alternative: i,
                expected: alternative.describe(),
                violations: scratch,
            });
        }
        out.push(Violation::new(
            path,
            ViolationKind::UnionExhausted { attempts },
            node.describe(),
            Shape::describe(value),
        ));
        value.clone()
    }
}

fn primitive_matches(node: &SchemaNode, value: &Value) -> bool {
    match (node, value) {
        (SchemaNode::String, Value::String(_)) => true,
        (SchemaNode::Number, Value::Number(_)) => true,
        (SchemaNode::Integer, Value::Number(n)) => {
            n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
        }
        (SchemaNode::Boolean, Value::Bool(_)) => true,
        _ => false,
    }
}

/// A wrong container kind is structural; a wrong scalar type is not.
fn kind_mismatch(node: &SchemaNode, value: &Value, path: &FieldPath) -> Violation {
    let structural = node.is_container() || Shape::of(value).is_container();
    let kind = if structural {
        ViolationKind::StructuralMismatch
    } else {
        ViolationKind::TypeMismatch
    };
    Violation::new(path, kind, node.describe(), Shape::describe(value))
}

fn unknown_field(path: &FieldPath, value: &Value) -> Violation {
    Violation::new(
        path,
        ViolationKind::UnknownField,
        "no such field".to_string(),
        Shape::describe(value),
    )
}

fn bounds(min: Option<usize>, max: Option<usize>) -> String {
    match (min, max) {
        (Some(min), Some(max)) if min == max => format!("exactly {min} elements"),
        (Some(min), Some(max)) => format!("{min} to {max} elements"),
        (Some(min), None) => format!("at least {min} elements"),
        (None, Some(max)) => format!("at most {max} elements"),
        (None, None) => "any number of elements".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::FieldConstraint;
    use crate::node::{Field, TupleSchema};
    use serde_json::json;

    fn compile(node: impl Into<SchemaNode>) -> Schema {
        Schema::compile(node.into()).unwrap()
    }

    fn http_event() -> Schema {
        compile(
            ObjectSchema::new()
                .required("method", SchemaNode::enumeration(["get", "post"]))
                .required("path", SchemaNode::string()),
        )
    }

    fn only(result: &ValidationResult) -> &Violation {
        let violations = result.violations();
        assert_eq!(violations.len(), 1, "expected one violation, got: {violations:#?}");
        &violations[0]
    }

    #[test]
    fn accepts_conforming_document_unchanged() {
        let doc = json!({"method": "get", "path": "myPath"});
        let result = validate(&doc, &http_event());
        assert_eq!(result, ValidationResult::Accepted(doc));
    }

    #[test]
    fn enum_mismatch_at_field_path() {
        let result = validate(&json!({"method": "put", "path": "myPath"}), &http_event());
        let v = only(&result);
        assert_eq!(v.kind, ViolationKind::EnumMismatch);
        assert_eq!(v.path.to_string(), ".method");
        assert_eq!(v.actual, r#"string "put""#);
    }

    #[test]
    fn missing_field_distinguishes_absent_and_null() {
        let result = validate(&json!({"path": "myPath"}), &http_event());
        let v = only(&result);
        assert_eq!(v.kind, ViolationKind::MissingRequiredField { null: false });
        assert_eq!(v.path.to_string(), ".method");
        assert_eq!(v.actual, "absent");

        let result = validate(&json!({"method": null, "path": "myPath"}), &http_event());
        let v = only(&result);
        assert_eq!(v.kind, ViolationKind::MissingRequiredField { null: true });
        assert_eq!(v.actual, "null");
    }

    #[test]
    fn collects_sibling_violations() {
        let result = validate(&json!({"method": "put", "path": 3}), &http_event());
        let kinds: Vec<&str> = result.violations().iter().map(|v| v.kind.name()).collect();
        assert_eq!(kinds, ["enum_mismatch", "type_mismatch"]);
    }

    #[test]
    fn wrong_container_is_one_structural_violation() {
        let result = validate(&json!([{"method": "put"}]), &http_event());
        let v = only(&result);
        assert_eq!(v.kind, ViolationKind::StructuralMismatch);
        assert!(v.path.is_root());
        assert_eq!(v.actual, "array of 1 element");
    }

    #[test]
    fn numbers_are_not_coerced_from_strings() {
        let schema = compile(ObjectSchema::new().required("timeout", SchemaNode::integer()));
        let result = validate(&json!({"timeout": "6"}), &schema);
        assert_eq!(only(&result).kind, ViolationKind::TypeMismatch);
        assert!(validate(&json!({"timeout": 6}), &schema).is_accepted());
        assert!(validate(&json!({"timeout": 6.0}), &schema).is_accepted());
        assert!(!validate(&json!({"timeout": 6.5}), &schema).is_accepted());
    }

    #[test]
    fn enum_uses_strict_equality() {
        let schema = compile(SchemaNode::enumeration([json!(1), json!("1")]));
        assert!(validate(&json!(1), &schema).is_accepted());
        assert!(validate(&json!("1"), &schema).is_accepted());
        assert_eq!(only(&validate(&json!(true), &schema)).kind, ViolationKind::EnumMismatch);
        assert_eq!(
            only(&validate(&json!({}), &schema)).kind,
            ViolationKind::StructuralMismatch
        );
    }

    #[test]
    fn optional_null_is_accepted_and_kept() {
        let schema = compile(ObjectSchema::new().optional("role", SchemaNode::string()));
        let doc = json!({"role": null});
        assert_eq!(validate(&doc, &schema), ValidationResult::Accepted(doc));
    }

    #[test]
    fn defaults_fill_absent_and_null_fields() {
        let schema = compile(
            ObjectSchema::new()
                .required("name", SchemaNode::string())
                .defaulted("stage", SchemaNode::string(), "dev")
                .defaulted("memorySize", SchemaNode::integer(), 1024),
        );
        let result = validate(&json!({"name": "aws", "stage": null}), &schema);
        assert_eq!(
            result,
            ValidationResult::Accepted(json!({"name": "aws", "stage": "dev", "memorySize": 1024}))
        );

        let options = ValidatorOptions {
            fill_defaults: false,
            ..ValidatorOptions::default()
        };
        let result = validate_with(&json!({"name": "aws"}), &schema, &options);
        assert_eq!(result, ValidationResult::Accepted(json!({"name": "aws"})));
    }

    #[test]
    fn unknown_fields_follow_policy() {
        let lenient = compile(ObjectSchema::new().required("a", SchemaNode::string()));
        let doc = json!({"a": "x", "b": 1});
        assert_eq!(validate(&doc, &lenient), ValidationResult::Accepted(doc.clone()));

        let result = validate_with(&doc, &lenient, &ValidatorOptions::strict());
        let v = only(&result);
        assert_eq!(v.kind, ViolationKind::UnknownField);
        assert_eq!(v.path.to_string(), ".b");

        let explicit_ignore = compile(
            ObjectSchema::new()
                .required("a", SchemaNode::string())
                .unknown_fields(UnknownFields::Ignore),
        );
        assert!(validate_with(&doc, &explicit_ignore, &ValidatorOptions::strict()).is_accepted());

        let deny = compile(
            ObjectSchema::new()
                .required("a", SchemaNode::string())
                .unknown_fields(UnknownFields::Deny),
        );
        assert_eq!(only(&validate(&doc, &deny)).kind, ViolationKind::UnknownField);
    }

    #[test]
    fn map_values_are_checked_per_key() {
        let schema = compile(SchemaNode::map(SchemaNode::string()));
        assert!(validate(&json!({"team": "core", "env": "prod"}), &schema).is_accepted());
        let result = validate(&json!({"team": "core", "cost": 12}), &schema);
        assert_eq!(only(&result).path.to_string(), ".cost");
    }

    #[test]
    fn array_elements_and_bounds() {
        let schema = compile(ArraySchema::of(SchemaNode::string()).min_len(1));
        assert!(validate(&json!(["a"]), &schema).is_accepted());
        assert_eq!(only(&validate(&json!([]), &schema)).kind, ViolationKind::LengthMismatch);

        let result = validate(&json!(["a", 1, "c", false]), &schema);
        let paths: Vec<String> = result.violations().iter().map(|v| v.path.to_string()).collect();
        assert_eq!(paths, ["[1]", "[3]"]);

        let unbounded = compile(SchemaNode::array(SchemaNode::string()));
        assert!(validate(&json!([]), &unbounded).is_accepted());
    }

    #[test]
    fn numeric_filter_tuple() {
        let schema = compile(
            TupleSchema::new([SchemaNode::enumeration(["=", "<", ">", "<=", ">="])])
                .rest(SchemaNode::number())
                .min_len(2),
        );
        assert!(validate(&json!(["=", 100]), &schema).is_accepted());
        assert!(validate(&json!([">", 0, 5.5]), &schema).is_accepted());

        let result = validate(&json!(["=="]), &schema);
        let kinds: Vec<&str> = result.violations().iter().map(|v| v.kind.name()).collect();
        assert_eq!(kinds, ["length_mismatch", "enum_mismatch"]);

        let result = validate(&json!(["=", "100"]), &schema);
        assert_eq!(only(&result).path.to_string(), "[1]");
    }

    #[test]
    fn closed_tuple_rejects_extra_elements() {
        let schema = compile(TupleSchema::new([SchemaNode::string(), SchemaNode::integer()]));
        assert!(validate(&json!(["a", 1]), &schema).is_accepted());
        assert_eq!(
            only(&validate(&json!(["a", 1, 2]), &schema)).kind,
            ViolationKind::LengthMismatch
        );
    }

    #[test]
    fn union_first_match_wins() {
        let with_default = ObjectSchema::new()
            .required("kind", SchemaNode::enumeration(["b"]))
            .defaulted("flag", SchemaNode::boolean(), true);
        let schema = compile(SchemaNode::union([
            SchemaNode::string(),
            ObjectSchema::new()
                .required("kind", SchemaNode::enumeration(["a"]))
                .into(),
            with_default.into(),
        ]));
        let result = validate(&json!({"kind": "b"}), &schema);
        // Only the third alternative fills `flag`.
        assert_eq!(result, ValidationResult::Accepted(json!({"kind": "b", "flag": true})));
    }

    #[test]
    fn union_exhausted_lists_every_attempt() {
        let schema = compile(SchemaNode::union([
            SchemaNode::string(),
            ObjectSchema::new()
                .required("path", SchemaNode::string())
                .required("method", SchemaNode::string())
                .into(),
        ]));
        let result = validate(&json!({"path": "p"}), &schema);
        let v = only(&result);
        let ViolationKind::UnionExhausted { attempts } = &v.kind else {
            panic!("expected UnionExhausted, got {:?}", v.kind);
        };
        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0].violations[0].kind, ViolationKind::StructuralMismatch);
        assert_eq!(
            attempts[1].violations[0].kind,
            ViolationKind::MissingRequiredField { null: false }
        );
        let rendered = v.to_string();
        assert!(rendered.contains("alternative 0 (string)"), "{rendered}");
        assert!(rendered.contains("alternative 1 (object)"), "{rendered}");
        assert!(rendered.contains("at .method: expected string, got absent"), "{rendered}");
    }

    #[test]
    fn constraints_report_at_object_path() {
        let authorizer = ObjectSchema::new()
            .optional("name", SchemaNode::string())
            .optional("arn", SchemaNode::string())
            .constraint(FieldConstraint::exactly_one_of(["name", "arn"]));
        let schema = compile(ObjectSchema::new().required("authorizer", authorizer.into()));

        let result = validate(&json!({"authorizer": {"name": "a", "arn": "b"}}), &schema);
        let v = only(&result);
        assert_eq!(v.path.to_string(), ".authorizer");
        assert!(matches!(v.kind, ViolationKind::ConstraintViolation { .. }));

        let result = validate(&json!({"authorizer": {}}), &schema);
        assert_eq!(only(&result).actual, "none of them");

        assert!(validate(&json!({"authorizer": {"arn": "b"}}), &schema).is_accepted());
    }

    #[test]
    fn constraints_skipped_when_fields_fail() {
        let schema = compile(
            ObjectSchema::new()
                .optional("name", SchemaNode::string())
                .optional("arn", SchemaNode::string())
                .constraint(FieldConstraint::exactly_one_of(["name", "arn"])),
        );
        let result = validate(&json!({"name": 1, "arn": "b"}), &schema);
        assert_eq!(only(&result).kind, ViolationKind::TypeMismatch);
    }

    #[test]
    fn required_if_sees_filled_defaults() {
        let schema = compile(
            ObjectSchema::new()
                .defaulted("type", SchemaNode::enumeration(["token", "request"]), "token")
                .optional("identitySource", SchemaNode::string())
                .constraint(FieldConstraint::required_if("identitySource", "type", "token")),
        );
        let result = validate(&json!({}), &schema);
        assert!(matches!(only(&result).kind, ViolationKind::ConstraintViolation { .. }));
        assert!(validate(&json!({"type": "request"}), &schema).is_accepted());
    }

    #[test]
    fn normalized_output_keeps_document_order() {
        let schema = compile(
            ObjectSchema::new()
                .required("a", SchemaNode::string())
                .required("b", SchemaNode::string())
                .field(Field::optional("c", SchemaNode::string()).with_default("z")),
        );
        let result = validate(&json!({"b": "1", "extra": true, "a": "2"}), &schema);
        let document = result.document().unwrap();
        let keys: Vec<&str> = document.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["b", "extra", "a", "c"]);
    }

    #[test]
    fn result_serializes_with_kind_tags() {
        let result = validate(&json!({"path": "myPath"}), &http_event());
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["rejected"][0]["kind"], "missing_required_field");
        assert_eq!(value["rejected"][0]["null"], false);
        assert_eq!(value["rejected"][0]["path"], ".method");
    }

    #[test]
    fn into_result_splits_outcomes() {
        assert!(validate(&json!({"method": "get", "path": "/"}), &http_event())
            .into_result()
            .is_ok());
        assert_eq!(
            validate(&json!({}), &http_event()).into_result().unwrap_err().len(),
            2
        );
    }
}
