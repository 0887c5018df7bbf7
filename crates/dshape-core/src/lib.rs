//! # dshape-core: Foundational Types for Shape Validation
//!
//! The leaf crate of the dshape workspace. It defines the vocabulary every
//! other crate uses to talk about documents: where a value sits inside a
//! document, what shape a value has, and how a document file becomes a
//! value tree.
//!
//! ## Key Design Principles
//!
//! 1. **Documents are `serde_json::Value` trees.** JSON and YAML inputs are
//!    both converted into the same tree before any validation happens, so
//!    validation never depends on the original serialization.
//!
//! 2. **Paths are structured.** A [`FieldPath`] is a sequence of key and
//!    index steps, not a preformatted string. Rendering (`.a.b[0]` or JSON
//!    Pointer) happens at the edges.
//!
//! 3. **Shapes describe, they do not judge.** [`Shape`] reports what a value
//!    *is*; deciding whether that is acceptable is the validator's job.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `dshape-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod document;
pub mod error;
pub mod path;
pub mod shape;

// Re-export primary types for ergonomic imports.
pub use document::{load_document, parse_document, yaml_to_json_value, DocumentFormat};
pub use error::{DocumentError, DshapeError};
pub use path::{FieldPath, PathSegment};
pub use shape::Shape;
