//! # Error Types: Structured Error Hierarchy
//!
//! Defines the error types shared across dshape. All errors use `thiserror`
//! for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Document problems (unreadable file, unparseable content) are errors.
//!   A document that parses but does not conform to its schema is *not* an
//!   error: it is a rejected validation result.
//! - Schema definition errors carry the schema path where the contradiction
//!   was found and the reason.

use thiserror::Error;

/// Top-level error type for dshape.
#[derive(Error, Debug)]
pub enum DshapeError {
    /// A document could not be loaded.
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// A schema is self-contradictory or ambiguous.
    #[error("schema definition error: {0}")]
    SchemaDefinition(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error while reading or parsing a document file.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The file could not be read.
    #[error("cannot read '{path}': {source}")]
    Read {
        /// Path of the document.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The content is not valid in its declared format.
    #[error("invalid {format} in '{path}': {reason}")]
    Parse {
        /// Path (or label) of the document.
        path: String,
        /// Format the content was parsed as.
        format: &'static str,
        /// Parser message.
        reason: String,
    },

    /// YAML content uses features with no JSON equivalent.
    #[error("'{path}' cannot be represented as a JSON value tree: {reason}")]
    Conversion {
        /// Path (or label) of the document.
        path: String,
        /// Reason the conversion failed.
        reason: String,
    },
}
