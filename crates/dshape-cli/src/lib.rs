//! # dshape-cli: Command-Line Interface
//!
//! The `dshape` binary: checks configuration documents against a schema,
//! prints their normalized form, and checks schema description files.
//!
//! ## Subcommands
//!
//! - `validate`: Validate documents, report every violation
//! - `normalize`: Print a document with schema defaults filled in
//! - `check-schema`: Load and compile schema description files
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs` and the `*Args` structs; the
//!   handlers delegate to `dshape-schema` and `dshape-descriptor`.
//! - Handlers return the process exit code: 0 when every input passes,
//!   1 when an input is rejected. Operational failures (unreadable file,
//!   invalid schema) are errors and exit with 2.

pub mod check;
pub mod config;
pub mod normalize;
pub mod validate;

use std::path::Path;

use anyhow::{bail, Context, Result};

use dshape_descriptor::BuiltinSchema;
use dshape_schema::{DescriptionLoader, Schema, ValidatorOptions};

use crate::config::CliConfig;

/// Compile the schema named by `reference`.
///
/// `builtin:<name>` selects a schema shipped with dshape; anything else is
/// a path to a schema description file (YAML or JSON).
pub fn load_schema(reference: &str) -> Result<Schema> {
    if let Some(builtin) = BuiltinSchema::from_reference(reference) {
        let builtin = builtin?;
        tracing::debug!(schema = %builtin, "compiling built-in schema");
        return builtin
            .compile()
            .with_context(|| format!("built-in schema {builtin} does not compile"));
    }
    let loader = DescriptionLoader::new()?;
    let schema = loader
        .load(Path::new(reference))
        .with_context(|| format!("failed to load schema description {reference}"))?;
    tracing::debug!(schema = reference, "schema description loaded");
    Ok(schema)
}

/// Pick the schema reference: the command-line flag wins over the config file.
pub fn schema_reference<'a>(flag: Option<&'a str>, config: &'a CliConfig) -> Result<&'a str> {
    match flag.or(config.schema.as_deref()) {
        Some(reference) => Ok(reference),
        None => bail!(
            "no schema given: pass --schema or set `schema` in {}",
            config::DEFAULT_CONFIG_FILE
        ),
    }
}

/// Validator options from the `--strict` flag and the config file.
pub fn validator_options(strict_flag: bool, config: &CliConfig) -> ValidatorOptions {
    if strict_flag || config.strict {
        ValidatorOptions::strict()
    } else {
        ValidatorOptions::default()
    }
}
