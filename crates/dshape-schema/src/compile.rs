//! # Schema Compilation
//!
//! Turns a [`SchemaNode`] tree into a [`Schema`]: an immutable, checked
//! description that documents can be validated against.
//!
//! Compilation is the only place dshape fails fatally. A schema that
//! contradicts itself (a required field with a default, a constraint over
//! a field that does not exist) or whose union alternatives cannot be told
//! apart is rejected with a [`SchemaDefinitionError`].
//!
//! ## Union Distinguishability
//!
//! Nested unions are flattened first. Then every pair of alternatives
//! `(earlier, later)` is checked:
//!
//! - Alternatives accepting disjoint value kinds (object, array, string,
//!   number, boolean, null) are always distinguishable.
//! - `any` is only allowed as the last alternative.
//! - Scalars are ambiguous when the later alternative can never be reached
//!   (`number` then `integer`, `string` then a string enum) or when two
//!   enums share a literal.
//! - Objects need a discriminant: a field required by both whose scalar
//!   shapes are disjoint (typically two enums), or a field one alternative
//!   requires and the other neither declares nor admits (`unknown_fields:
//!   deny`).
//! - Array-shaped alternatives are distinguishable only as tuples whose
//!   first elements are disjoint scalars.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::node::{ObjectSchema, SchemaNode, UnionSchema, UnknownFields};
use crate::validate::{check_value, ValidatorOptions};

/// A schema that contradicts itself or is ambiguous.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaDefinitionError {
    /// An enum with no literals accepts nothing.
    #[error("{path}: enum declares no values")]
    EmptyEnum {
        /// Schema location.
        path: String,
    },

    /// Enum literals must be scalars.
    #[error("{path}: enum literal {literal} is not a scalar")]
    NonScalarLiteral {
        /// Schema location.
        path: String,
        /// The offending literal.
        literal: String,
    },

    /// The same literal listed twice.
    #[error("{path}: enum literal {literal} is listed more than once")]
    DuplicateLiteral {
        /// Schema location.
        path: String,
        /// The repeated literal.
        literal: String,
    },

    /// Two fields with the same key.
    #[error("{path}: field '{field}' is declared more than once")]
    DuplicateField {
        /// Schema location of the object.
        path: String,
        /// The repeated key.
        field: String,
    },

    /// A default on a required field can never apply.
    #[error("{path}: required field '{field}' declares a default")]
    RequiredWithDefault {
        /// Schema location of the object.
        path: String,
        /// The field.
        field: String,
    },

    /// A default that its own field would reject.
    #[error("{path}: default for field '{field}' does not match its schema: {reason}")]
    InvalidDefault {
        /// Schema location of the object.
        path: String,
        /// The field.
        field: String,
        /// First violation found in the default.
        reason: String,
    },

    /// A constraint over a field the object does not declare.
    #[error("{path}: constraint `{constraint}` names undeclared field '{field}'")]
    UndeclaredConstraintField {
        /// Schema location of the object.
        path: String,
        /// The constraint, as text.
        constraint: String,
        /// The missing field.
        field: String,
    },

    /// A set constraint over fewer than two distinct fields.
    #[error("{path}: constraint `{constraint}` needs at least two distinct fields")]
    DegenerateConstraint {
        /// Schema location of the object.
        path: String,
        /// The constraint, as text.
        constraint: String,
    },

    /// A default on a field whose presence a constraint counts.
    #[error("{path}: field '{field}' has a default, but constraint `{constraint}` counts its presence")]
    DefaultedConstrainedField {
        /// Schema location of the object.
        path: String,
        /// The field.
        field: String,
        /// The constraint, as text.
        constraint: String,
    },

    /// Length bounds no sequence can satisfy.
    #[error("{path}: {reason}")]
    InvalidLength {
        /// Schema location.
        path: String,
        /// What is wrong with the bounds.
        reason: String,
    },

    /// A union with no alternatives accepts nothing.
    #[error("{path}: union declares no alternatives")]
    EmptyUnion {
        /// Schema location.
        path: String,
    },

    /// Two union alternatives that cannot be told apart.
    #[error("{path}: union alternatives {first} and {second} are indistinguishable: {reason}")]
    AmbiguousUnion {
        /// Schema location of the union.
        path: String,
        /// Index of the earlier alternative.
        first: usize,
        /// Index of the later alternative.
        second: usize,
        /// Why they overlap.
        reason: String,
    },
}

/// A compiled, immutable schema.
///
/// Cloning is cheap; the node tree is shared. `Schema` is `Send + Sync`
/// and can validate documents from any number of threads at once.
#[derive(Debug, Clone)]
pub struct Schema {
    root: Arc<SchemaNode>,
}

impl Schema {
    /// Check and freeze a node tree.
    ///
    /// Nested unions are flattened and defaults are replaced by their
    /// normalized form.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaDefinitionError`] found, in depth-first
    /// declaration order.
    pub fn compile(node: SchemaNode) -> Result<Self, SchemaDefinitionError> {
        let mut node = node;
        let mut stats = CompileStats::default();
        compile_node(&mut node, "$", &mut stats)?;
        tracing::debug!(
            objects = stats.objects,
            unions = stats.unions,
            constraints = stats.constraints,
            "schema compiled"
        );
        Ok(Self {
            root: Arc::new(node),
        })
    }

    /// The root node.
    pub fn root(&self) -> &SchemaNode {
        &self.root
    }

    /// Validate `document` with default options.
    pub fn validate(&self, document: &Value) -> crate::ValidationResult {
        crate::validate::validate(document, self)
    }

    /// Validate `document` with explicit options.
    pub fn validate_with(
        &self,
        document: &Value,
        options: &ValidatorOptions,
    ) -> crate::ValidationResult {
        crate::validate::validate_with(document, self, options)
    }
}

#[derive(Default)]
struct CompileStats {
    objects: usize,
    unions: usize,
    constraints: usize,
}

fn compile_node(
    node: &mut SchemaNode,
    path: &str,
    stats: &mut CompileStats,
) -> Result<(), SchemaDefinitionError> {
    match node {
        SchemaNode::String
        | SchemaNode::Number
        | SchemaNode::Integer
        | SchemaNode::Boolean
        | SchemaNode::Any => Ok(()),
        SchemaNode::Enum { values } => check_enum(values, path),
        SchemaNode::Object(object) => {
            stats.objects += 1;
            stats.constraints += object.constraints.len();
            compile_object(object, path, stats)
        }
        SchemaNode::Array(array) => {
            if let (Some(min), Some(max)) = (array.min_len, array.max_len) {
                if min > max {
                    return Err(SchemaDefinitionError::InvalidLength {
                        path: path.to_string(),
                        reason: format!("min_len {min} exceeds max_len {max}"),
                    });
                }
            }
            compile_node(&mut array.items, &format!("{path}[]"), stats)
        }
        SchemaNode::Tuple(tuple) => {
            if let Some(min) = tuple.min_len {
                if tuple.rest.is_none() && min > tuple.prefix.len() {
                    return Err(SchemaDefinitionError::InvalidLength {
                        path: path.to_string(),
                        reason: format!(
                            "min_len {min} exceeds the {} prefix elements of a tuple without rest",
                            tuple.prefix.len()
                        ),
                    });
                }
            }
            for (i, element) in tuple.prefix.iter_mut().enumerate() {
                compile_node(element, &format!("{path}[{i}]"), stats)?;
            }
            if let Some(rest) = tuple.rest.as_mut() {
                compile_node(rest, &format!("{path}[..]"), stats)?;
            }
            Ok(())
        }
        SchemaNode::Union(union) => {
            stats.unions += 1;
            flatten_union(union);
            if union.alternatives.is_empty() {
                return Err(SchemaDefinitionError::EmptyUnion {
                    path: path.to_string(),
                });
            }
            for (i, alternative) in union.alternatives.iter_mut().enumerate() {
                compile_node(alternative, &format!("{path}<{i}>"), stats)?;
            }
            check_distinguishable(union, path)
        }
    }
}

fn check_enum(values: &[Value], path: &str) -> Result<(), SchemaDefinitionError> {
    if values.is_empty() {
        return Err(SchemaDefinitionError::EmptyEnum {
            path: path.to_string(),
        });
    }
    for (i, literal) in values.iter().enumerate() {
        if literal.is_array() || literal.is_object() {
            return Err(SchemaDefinitionError::NonScalarLiteral {
                path: path.to_string(),
                literal: literal.to_string(),
            });
        }
        if values[..i].contains(literal) {
            return Err(SchemaDefinitionError::DuplicateLiteral {
                path: path.to_string(),
                literal: literal.to_string(),
            });
        }
    }
    Ok(())
}

fn compile_object(
    object: &mut ObjectSchema,
    path: &str,
    stats: &mut CompileStats,
) -> Result<(), SchemaDefinitionError> {
    for (i, field) in object.fields.iter().enumerate() {
        if object.fields[..i].iter().any(|f| f.name == field.name) {
            return Err(SchemaDefinitionError::DuplicateField {
                path: path.to_string(),
                field: field.name.clone(),
            });
        }
        if field.required && field.default.is_some() {
            return Err(SchemaDefinitionError::RequiredWithDefault {
                path: path.to_string(),
                field: field.name.clone(),
            });
        }
    }

    for constraint in &object.constraints {
        for name in constraint.referenced_fields() {
            if object.get(name).is_none() {
                return Err(SchemaDefinitionError::UndeclaredConstraintField {
                    path: path.to_string(),
                    constraint: constraint.to_string(),
                    field: name.to_string(),
                });
            }
        }
        if let Some(fields) = constraint.field_set() {
            let distinct = fields
                .iter()
                .enumerate()
                .filter(|(i, f)| !fields[..*i].contains(f))
                .count();
            if distinct < 2 {
                return Err(SchemaDefinitionError::DegenerateConstraint {
                    path: path.to_string(),
                    constraint: constraint.to_string(),
                });
            }
        }
        for name in constraint.presence_counted_fields() {
            if object.get(name).is_some_and(|f| f.default.is_some()) {
                return Err(SchemaDefinitionError::DefaultedConstrainedField {
                    path: path.to_string(),
                    field: name.to_string(),
                    constraint: constraint.to_string(),
                });
            }
        }
    }

    for field in object.fields.iter_mut() {
        let field_path = format!("{path}.{}", field.name);
        compile_node(&mut field.node, &field_path, stats)?;
        if let Some(default) = field.default.take() {
            let (normalized, violations) =
                check_value(&field.node, &default, &ValidatorOptions::default());
            if let Some(first) = violations.first() {
                return Err(SchemaDefinitionError::InvalidDefault {
                    path: path.to_string(),
                    field: field.name.clone(),
                    reason: first.to_string(),
                });
            }
            field.default = Some(normalized);
        }
    }

    if let UnknownFields::Values(values) = &mut object.unknown_fields {
        compile_node(values, &format!("{path}.*"), stats)?;
    }
    Ok(())
}

/// Replace nested unions by their alternatives, in order.
fn flatten_union(union: &mut UnionSchema) {
    if !union
        .alternatives
        .iter()
        .any(|a| matches!(a, SchemaNode::Union(_)))
    {
        return;
    }
    let mut flat = Vec::with_capacity(union.alternatives.len());
    for alternative in union.alternatives.drain(..) {
        match alternative {
            SchemaNode::Union(mut inner) => {
                flatten_union(&mut inner);
                flat.extend(inner.alternatives);
            }
            other => flat.push(other),
        }
    }
    union.alternatives = flat;
}

/// Value kinds an alternative can accept, as a bit set.
mod kinds {
    pub const NULL: u8 = 1;
    pub const BOOLEAN: u8 = 1 << 1;
    pub const NUMBER: u8 = 1 << 2;
    pub const STRING: u8 = 1 << 3;
    pub const ARRAY: u8 = 1 << 4;
    pub const OBJECT: u8 = 1 << 5;
    pub const ALL: u8 = NULL | BOOLEAN | NUMBER | STRING | ARRAY | OBJECT;
}

fn literal_kind(literal: &Value) -> u8 {
    match literal {
        Value::Null => kinds::NULL,
        Value::Bool(_) => kinds::BOOLEAN,
        Value::Number(_) => kinds::NUMBER,
        Value::String(_) => kinds::STRING,
        Value::Array(_) => kinds::ARRAY,
        Value::Object(_) => kinds::OBJECT,
    }
}

fn accepted_kinds(node: &SchemaNode) -> u8 {
    match node {
        SchemaNode::String => kinds::STRING,
        SchemaNode::Number | SchemaNode::Integer => kinds::NUMBER,
        SchemaNode::Boolean => kinds::BOOLEAN,
        SchemaNode::Any => kinds::ALL,
        SchemaNode::Enum { values } => values.iter().fold(0, |acc, v| acc | literal_kind(v)),
        SchemaNode::Object(_) => kinds::OBJECT,
        SchemaNode::Array(_) | SchemaNode::Tuple(_) => kinds::ARRAY,
        SchemaNode::Union(union) => union
            .alternatives
            .iter()
            .fold(0, |acc, a| acc | accepted_kinds(a)),
    }
}

/// True if no value is accepted by both scalar nodes.
fn scalars_disjoint(a: &SchemaNode, b: &SchemaNode) -> bool {
    if accepted_kinds(a) & accepted_kinds(b) == 0 {
        return true;
    }
    match (a, b) {
        (SchemaNode::Enum { values: left }, SchemaNode::Enum { values: right }) => {
            !left.iter().any(|v| right.contains(v))
        }
        (SchemaNode::Enum { values }, primitive) | (primitive, SchemaNode::Enum { values })
            if primitive.is_scalar() =>
        {
            !values.iter().any(|v| primitive_accepts(primitive, v))
        }
        _ => false,
    }
}

fn primitive_accepts(primitive: &SchemaNode, literal: &Value) -> bool {
    match (primitive, literal) {
        (SchemaNode::String, Value::String(_)) => true,
        (SchemaNode::Boolean, Value::Bool(_)) => true,
        (SchemaNode::Number, Value::Number(_)) => true,
        (SchemaNode::Integer, Value::Number(n)) => {
            n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
        }
        _ => false,
    }
}

fn check_distinguishable(union: &UnionSchema, path: &str) -> Result<(), SchemaDefinitionError> {
    let alternatives = &union.alternatives;
    for (i, earlier) in alternatives.iter().enumerate() {
        for (j, later) in alternatives.iter().enumerate().skip(i + 1) {
            if let Some(reason) = overlap(earlier, later) {
                return Err(SchemaDefinitionError::AmbiguousUnion {
                    path: path.to_string(),
                    first: i,
                    second: j,
                    reason,
                });
            }
        }
    }
    Ok(())
}

/// Why `later` cannot be told apart from `earlier`, if it cannot.
fn overlap(earlier: &SchemaNode, later: &SchemaNode) -> Option<String> {
    if matches!(earlier, SchemaNode::Any) {
        return Some("an earlier `any` alternative accepts every value".to_string());
    }
    if accepted_kinds(earlier) & accepted_kinds(later) == 0 || matches!(later, SchemaNode::Any) {
        return None;
    }
    match (earlier, later) {
        (SchemaNode::Object(a), SchemaNode::Object(b)) => {
            if has_discriminant(a, b) {
                None
            } else {
                Some("no required field discriminates the two objects".to_string())
            }
        }
        (SchemaNode::Tuple(a), SchemaNode::Tuple(b)) => match (a.prefix.first(), b.prefix.first()) {
            (Some(x), Some(y)) if x.is_scalar() && y.is_scalar() && scalars_disjoint(x, y) => None,
            _ => Some("tuples do not differ in their first element".to_string()),
        },
        (a, b) if a.is_container() && b.is_container() => {
            Some("both alternatives accept arrays".to_string())
        }
        (SchemaNode::Enum { .. }, SchemaNode::Enum { .. }) => {
            (!scalars_disjoint(earlier, later)).then(|| "the enums share a literal".to_string())
        }
        (SchemaNode::Enum { .. }, _) => None,
        (_, SchemaNode::Enum { values }) => {
            let covered = values.iter().all(|v| primitive_accepts(earlier, v));
            covered.then(|| format!("every literal of the later enum is a {}", earlier.kind_name()))
        }
        (SchemaNode::Integer, SchemaNode::Number) => None,
        _ => Some(format!(
            "the later {} is unreachable after {}",
            later.kind_name(),
            earlier.kind_name()
        )),
    }
}

/// A field required by both with disjoint scalar shapes, or a field required
/// by one that the other does not declare and rejects as unknown.
fn has_discriminant(a: &ObjectSchema, b: &ObjectSchema) -> bool {
    let by_value = a.fields.iter().filter(|f| f.required).any(|fa| {
        b.get(&fa.name).is_some_and(|fb| {
            fb.required && fa.node.is_scalar() && fb.node.is_scalar() && scalars_disjoint(&fa.node, &fb.node)
        })
    });
    by_value || requires_unshared(a, b) || requires_unshared(b, a)
}

/// An `other` that ignores unknown keys accepts documents carrying `owner`'s
/// required field, and may do so once `owner`'s defaults are filled in.
fn requires_unshared(owner: &ObjectSchema, other: &ObjectSchema) -> bool {
    if other.unknown_fields != UnknownFields::Deny {
        return false;
    }
    owner
        .fields
        .iter()
        .any(|f| f.required && other.get(&f.name).is_none())
}
