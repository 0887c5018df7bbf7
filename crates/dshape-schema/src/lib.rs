//! # dshape-schema: Document Shape Validation
//!
//! Declares the shape a configuration document is expected to have and
//! checks documents against it.
//!
//! ## Schema Model (`node`, `constraint`)
//!
//! A [`SchemaNode`] is a tree of primitives, literal enums, objects,
//! arrays, tuples and ordered unions. Objects carry declared [`Field`]s,
//! sibling [`FieldConstraint`]s and a policy for undeclared keys.
//!
//! ## Compilation (`compile`)
//!
//! [`Schema::compile`] rejects contradictory or ambiguous node trees with a
//! [`SchemaDefinitionError`]. It is the only fatal error in the crate: once
//! a schema compiles, validating any document always yields a result.
//!
//! ## Validation (`validate`)
//!
//! [`validate`] returns either the normalized document (defaults filled,
//! undeclared keys kept or rejected per policy) or every [`Violation`]
//! found, each with its path, the expected shape and what was found.
//!
//! ## Description Files (`description`)
//!
//! [`DescriptionLoader`] reads schemas written as YAML or JSON, checks them
//! against an embedded JSON Schema meta-schema, then compiles them.
//!
//! ## Crate Policy
//!
//! - Depends only on `dshape-core` internally.
//! - Validation is pure: no IO, no shared mutable state. A [`Schema`] is
//!   `Send + Sync` and may be used from many threads at once.
//! - A document that does not conform is a result, never an `Err`.

pub mod compile;
pub mod constraint;
pub mod description;
pub mod node;
pub mod validate;

pub use compile::{Schema, SchemaDefinitionError};
pub use constraint::FieldConstraint;
pub use description::{DescriptionLoader, MetaViolation, MetaViolations, SchemaLoadError};
pub use node::{ArraySchema, Field, ObjectSchema, SchemaNode, TupleSchema, UnionSchema, UnknownFields};
pub use validate::{
    validate, validate_with, UnionAttempt, UnknownFieldPolicy, ValidationResult, ValidatorOptions,
    Violation, ViolationKind,
};
