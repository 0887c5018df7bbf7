//! # dshape-descriptor: Built-in Descriptor Schemas
//!
//! Ships the schemas dshape knows without a description file:
//!
//! - [`deployment`]: the serverless deployment descriptor
//!   (`serverless.yml`), including every function event source.
//! - [`plugin`]: the command declarations of a framework plugin.
//!
//! Both are built with the `dshape-schema` builder API and compiled on
//! request. [`BuiltinSchema`] names them for the CLI (`builtin:deployment`,
//! `builtin:plugin`).
//!
//! ## Crate Policy
//!
//! - Built-in schemas must always compile; a `SchemaDefinitionError` from
//!   this crate is a bug, and every schema has a test compiling it.
//! - Shapes are reconstructed from real descriptors. Where the framework
//!   accepts a variable reference in place of an object, the schema
//!   accepts a string first.

pub mod deployment;
pub mod events;
pub mod plugin;
mod shapes;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use dshape_core::{load_document, DshapeError};
use dshape_schema::{Schema, SchemaDefinitionError, ValidationResult, ValidatorOptions};

pub use deployment::deployment_schema;
pub use plugin::plugin_schema;

/// Prefix marking a built-in schema reference, as in `builtin:deployment`.
pub const BUILTIN_PREFIX: &str = "builtin:";

/// A schema shipped with dshape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinSchema {
    /// The deployment descriptor.
    Deployment,
    /// Plugin command declarations.
    Plugin,
}

impl BuiltinSchema {
    /// Every built-in schema.
    pub const ALL: [BuiltinSchema; 2] = [BuiltinSchema::Deployment, BuiltinSchema::Plugin];

    /// Short name, as used after [`BUILTIN_PREFIX`].
    pub fn name(self) -> &'static str {
        match self {
            BuiltinSchema::Deployment => "deployment",
            BuiltinSchema::Plugin => "plugin",
        }
    }

    /// Parse a `builtin:<name>` reference. Returns `None` for anything
    /// without the prefix, so callers can fall back to a file path.
    pub fn from_reference(reference: &str) -> Option<Result<Self, UnknownBuiltin>> {
        reference
            .strip_prefix(BUILTIN_PREFIX)
            .map(|name| name.parse())
    }

    /// Compile the schema.
    pub fn compile(self) -> Result<Schema, SchemaDefinitionError> {
        match self {
            BuiltinSchema::Deployment => deployment_schema(),
            BuiltinSchema::Plugin => plugin_schema(),
        }
    }
}

impl fmt::Display for BuiltinSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{BUILTIN_PREFIX}{}", self.name())
    }
}

/// A `builtin:` reference naming no built-in schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown built-in schema '{name}' (available: deployment, plugin)")]
pub struct UnknownBuiltin {
    /// The name that was asked for.
    pub name: String,
}

impl FromStr for BuiltinSchema {
    type Err = UnknownBuiltin;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BuiltinSchema::ALL
            .into_iter()
            .find(|b| b.name() == s)
            .ok_or_else(|| UnknownBuiltin {
                name: s.to_string(),
            })
    }
}

/// Load a deployment descriptor file and validate it.
///
/// # Errors
///
/// Returns `DshapeError::Document` if the file cannot be read or parsed.
/// A descriptor that loads but does not conform is returned as
/// [`ValidationResult::Rejected`], not as an error.
pub fn validate_descriptor_file(
    path: &Path,
    options: &ValidatorOptions,
) -> Result<ValidationResult, DshapeError> {
    let schema =
        deployment_schema().map_err(|e| DshapeError::SchemaDefinition(e.to_string()))?;
    let document = load_document(path)?;
    let result = schema.validate_with(&document, options);
    tracing::info!(
        path = %path.display(),
        accepted = result.is_accepted(),
        violations = result.violations().len(),
        "descriptor validated"
    );
    Ok(result)
}
