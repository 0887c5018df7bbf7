//! # Schema Nodes
//!
//! A [`SchemaNode`] is an immutable description of an expected document
//! shape. Nodes are built either with the constructors in this module or
//! by deserializing a description file (see [`crate::description`]).
//!
//! ## Composition
//!
//! Variant records ("the base shape, minus these fields, plus those") are
//! built by composition: [`ObjectSchema::extend`] merges a base object with
//! an override object, replacing same-named fields in place and appending
//! new ones.
//!
//! A node is only a description. Before it can validate anything it must be
//! compiled into a [`crate::Schema`], which rejects contradictory and
//! ambiguous definitions.

use std::fmt;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;

use crate::constraint::FieldConstraint;

/// Description of an expected document shape.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchemaNode {
    /// A string.
    String,
    /// Any number.
    Number,
    /// A number with no fractional part.
    Integer,
    /// `true` or `false`.
    Boolean,
    /// Any value, including `null`.
    Any,
    /// One of a fixed set of scalar literals, compared by strict equality.
    Enum {
        /// The allowed literals.
        values: Vec<Value>,
    },
    /// A mapping with declared fields.
    Object(ObjectSchema),
    /// A homogeneous sequence.
    Array(ArraySchema),
    /// A positional sequence.
    Tuple(TupleSchema),
    /// Ordered alternatives; the first one that matches is used.
    Union(UnionSchema),
}

impl SchemaNode {
    /// A string node.
    pub fn string() -> Self {
        SchemaNode::String
    }

    /// A number node.
    pub fn number() -> Self {
        SchemaNode::Number
    }

    /// An integer node.
    pub fn integer() -> Self {
        SchemaNode::Integer
    }

    /// A boolean node.
    pub fn boolean() -> Self {
        SchemaNode::Boolean
    }

    /// A node accepting any value.
    pub fn any() -> Self {
        SchemaNode::Any
    }

    /// A literal enum over the given values.
    pub fn enumeration<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        SchemaNode::Enum {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// An array whose elements all conform to `items`.
    pub fn array(items: SchemaNode) -> Self {
        SchemaNode::Array(ArraySchema::of(items))
    }

    /// A string-keyed dictionary whose values all conform to `values`.
    pub fn map(values: SchemaNode) -> Self {
        SchemaNode::Object(ObjectSchema::new().unknown_fields(UnknownFields::Values(Box::new(values))))
    }

    /// A union of the given alternatives, tried in order.
    pub fn union<I>(alternatives: I) -> Self
    where
        I: IntoIterator<Item = SchemaNode>,
    {
        SchemaNode::Union(UnionSchema {
            alternatives: alternatives.into_iter().collect(),
        })
    }

    /// Short name of the node's tag.
    pub fn kind_name(&self) -> &'static str {
        match self {
            SchemaNode::String => "string",
            SchemaNode::Number => "number",
            SchemaNode::Integer => "integer",
            SchemaNode::Boolean => "boolean",
            SchemaNode::Any => "any",
            SchemaNode::Enum { .. } => "enum",
            SchemaNode::Object(_) => "object",
            SchemaNode::Array(_) => "array",
            SchemaNode::Tuple(_) => "tuple",
            SchemaNode::Union(_) => "union",
        }
    }

    /// True if this node only accepts scalar values.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            SchemaNode::String
                | SchemaNode::Number
                | SchemaNode::Integer
                | SchemaNode::Boolean
                | SchemaNode::Enum { .. }
        )
    }

    /// True if this node expects a container (object, array or tuple).
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            SchemaNode::Object(_) | SchemaNode::Array(_) | SchemaNode::Tuple(_)
        )
    }

    /// Human-readable description of what this node expects, one level deep.
    pub fn describe(&self) -> String {
        match self {
            SchemaNode::Any => "any value".to_string(),
            SchemaNode::Enum { values } => format!("one of {}", join_literals(values)),
            SchemaNode::Object(object) if object.is_map() => match &object.unknown_fields {
                UnknownFields::Values(values) => format!("map of {}", values.summary()),
                _ => "object".to_string(),
            },
            SchemaNode::Array(array) => format!("array of {}", array.items.summary()),
            SchemaNode::Tuple(tuple) => {
                let mut parts: Vec<String> = tuple.prefix.iter().map(|n| n.summary()).collect();
                if let Some(rest) = &tuple.rest {
                    parts.push(format!("...{}", rest.summary()));
                }
                format!("tuple ({})", parts.join(", "))
            }
            SchemaNode::Union(union) => union
                .alternatives
                .iter()
                .map(|n| n.summary())
                .collect::<Vec<_>>()
                .join(" | "),
            other => other.kind_name().to_string(),
        }
    }

    /// Like [`describe`](Self::describe), but containers collapse to their
    /// kind name so nested descriptions stay short.
    fn summary(&self) -> String {
        match self {
            SchemaNode::Enum { .. } => self.describe(),
            SchemaNode::Union(_) => format!("({})", self.describe()),
            other => other.kind_name().to_string(),
        }
    }
}

impl fmt::Display for SchemaNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

fn join_literals(values: &[Value]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// How an object treats keys it does not declare.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownFields {
    /// Follow the validator's configured strictness.
    #[default]
    Inherit,
    /// Keep undeclared keys without checking them.
    Ignore,
    /// Reject undeclared keys.
    Deny,
    /// Check every undeclared key's value against this node.
    Values(Box<SchemaNode>),
}

/// One declared field of an object.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Key of the field.
    pub name: String,
    /// Shape of the field's value.
    pub node: SchemaNode,
    /// Whether the field must be present and non-null.
    pub required: bool,
    /// Value filled in during normalization when the field is not provided.
    pub default: Option<Value>,
    /// Free-form documentation.
    pub description: Option<String>,
}

impl Field {
    /// A required field.
    pub fn required(name: impl Into<String>, node: SchemaNode) -> Self {
        Self {
            name: name.into(),
            node,
            required: true,
            default: None,
            description: None,
        }
    }

    /// An optional field.
    pub fn optional(name: impl Into<String>, node: SchemaNode) -> Self {
        Self {
            required: false,
            ..Self::required(name, node)
        }
    }

    /// Attach a default value.
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Attach documentation.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A field as written in a description file: the node's own keys plus
/// `optional`, `default` and `description`.
#[derive(Deserialize)]
struct FieldSpec {
    #[serde(flatten)]
    node: SchemaNode,
    #[serde(default)]
    optional: bool,
    #[serde(default)]
    default: Option<Value>,
    #[serde(default)]
    description: Option<String>,
}

impl FieldSpec {
    fn into_field(self, name: String) -> Field {
        Field {
            name,
            node: self.node,
            required: !self.optional,
            default: self.default,
            description: self.description,
        }
    }
}

/// Deserialize a `name -> field` map into a list, keeping document order.
fn deserialize_fields<'de, D>(deserializer: D) -> Result<Vec<Field>, D::Error>
where
    D: Deserializer<'de>,
{
    struct FieldsVisitor;

    impl<'de> Visitor<'de> for FieldsVisitor {
        type Value = Vec<Field>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of field name to field schema")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut fields = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((name, spec)) = map.next_entry::<String, FieldSpec>()? {
                fields.push(spec.into_field(name));
            }
            Ok(fields)
        }
    }

    deserializer.deserialize_map(FieldsVisitor)
}

/// A mapping with declared fields, sibling constraints and a policy for
/// undeclared keys.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ObjectSchema {
    /// Declared fields, in declaration order.
    #[serde(default, deserialize_with = "deserialize_fields")]
    pub fields: Vec<Field>,
    /// Rules relating sibling fields.
    #[serde(default)]
    pub constraints: Vec<FieldConstraint>,
    /// Treatment of undeclared keys.
    #[serde(default)]
    pub unknown_fields: UnknownFields,
}

impl ObjectSchema {
    /// An object with no declared fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field.
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Declare a required field.
    pub fn required(self, name: impl Into<String>, node: SchemaNode) -> Self {
        self.field(Field::required(name, node))
    }

    /// Declare an optional field.
    pub fn optional(self, name: impl Into<String>, node: SchemaNode) -> Self {
        self.field(Field::optional(name, node))
    }

    /// Declare an optional field with a default.
    pub fn defaulted(
        self,
        name: impl Into<String>,
        node: SchemaNode,
        default: impl Into<Value>,
    ) -> Self {
        self.field(Field::optional(name, node).with_default(default))
    }

    /// Add a sibling constraint.
    pub fn constraint(mut self, constraint: FieldConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Set the undeclared-key policy.
    pub fn unknown_fields(mut self, policy: UnknownFields) -> Self {
        self.unknown_fields = policy;
        self
    }

    /// Look up a declared field.
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// True if the object declares no fields and validates every key
    /// against a value node.
    pub fn is_map(&self) -> bool {
        self.fields.is_empty() && matches!(self.unknown_fields, UnknownFields::Values(_))
    }

    /// Merge `overrides` into this object.
    ///
    /// Fields of `overrides` replace same-named fields in place; new fields
    /// are appended. Constraints are concatenated. The override's unknown
    /// field policy wins unless it is `Inherit`.
    pub fn extend(mut self, overrides: ObjectSchema) -> Self {
        for field in overrides.fields {
            match self.fields.iter_mut().find(|f| f.name == field.name) {
                Some(existing) => *existing = field,
                None => self.fields.push(field),
            }
        }
        self.constraints.extend(overrides.constraints);
        if overrides.unknown_fields != UnknownFields::Inherit {
            self.unknown_fields = overrides.unknown_fields;
        }
        self
    }
}

impl From<ObjectSchema> for SchemaNode {
    fn from(object: ObjectSchema) -> Self {
        SchemaNode::Object(object)
    }
}

/// A homogeneous sequence with optional length bounds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArraySchema {
    /// Shape of every element.
    pub items: Box<SchemaNode>,
    /// Minimum number of elements.
    #[serde(default)]
    pub min_len: Option<usize>,
    /// Maximum number of elements.
    #[serde(default)]
    pub max_len: Option<usize>,
}

impl ArraySchema {
    /// An unbounded array of `items`.
    pub fn of(items: SchemaNode) -> Self {
        Self {
            items: Box::new(items),
            min_len: None,
            max_len: None,
        }
    }

    /// Require at least `n` elements.
    pub fn min_len(mut self, n: usize) -> Self {
        self.min_len = Some(n);
        self
    }

    /// Allow at most `n` elements.
    pub fn max_len(mut self, n: usize) -> Self {
        self.max_len = Some(n);
        self
    }
}

impl From<ArraySchema> for SchemaNode {
    fn from(array: ArraySchema) -> Self {
        SchemaNode::Array(array)
    }
}

/// A positional sequence: fixed prefix elements, then optionally any number
/// of elements conforming to `rest`.
///
/// Without `min_len`, every prefix position is mandatory.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TupleSchema {
    /// Shapes of the leading elements, by position.
    pub prefix: Vec<SchemaNode>,
    /// Shape of every element after the prefix. `None` forbids extra elements.
    #[serde(default)]
    pub rest: Option<Box<SchemaNode>>,
    /// Minimum total length.
    #[serde(default)]
    pub min_len: Option<usize>,
}

impl TupleSchema {
    /// A tuple with the given prefix and no trailing elements.
    pub fn new<I>(prefix: I) -> Self
    where
        I: IntoIterator<Item = SchemaNode>,
    {
        Self {
            prefix: prefix.into_iter().collect(),
            rest: None,
            min_len: None,
        }
    }

    /// Allow trailing elements conforming to `rest`.
    pub fn rest(mut self, rest: SchemaNode) -> Self {
        self.rest = Some(Box::new(rest));
        self
    }

    /// Require at least `n` elements in total.
    pub fn min_len(mut self, n: usize) -> Self {
        self.min_len = Some(n);
        self
    }

    /// Smallest accepted length.
    pub fn min_length(&self) -> usize {
        self.min_len.unwrap_or(self.prefix.len())
    }

    /// Largest accepted length, if bounded.
    pub fn max_length(&self) -> Option<usize> {
        match self.rest {
            Some(_) => None,
            None => Some(self.prefix.len()),
        }
    }
}

impl From<TupleSchema> for SchemaNode {
    fn from(tuple: TupleSchema) -> Self {
        SchemaNode::Tuple(tuple)
    }
}

/// Ordered alternatives.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UnionSchema {
    /// Alternatives, tried in order.
    pub alternatives: Vec<SchemaNode>,
}
