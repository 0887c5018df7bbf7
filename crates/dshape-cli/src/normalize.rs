//! # Normalize Subcommand
//!
//! Validates a single document and prints its normalized form: declared
//! defaults filled in, everything else exactly as written.
//!
//! ## Usage
//!
//! ```bash
//! dshape normalize --schema builtin:deployment serverless.yml
//! dshape normalize --schema builtin:plugin --output-format yaml plugin.json
//! ```
//!
//! A rejected document prints its violations instead and exits with 1.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use serde_json::Value;

use dshape_core::load_document;
use dshape_schema::ValidationResult;

use crate::config::CliConfig;
use crate::validate::{render_text, DocumentReport};
use crate::{load_schema, schema_reference, validator_options};

/// Arguments for the normalize subcommand.
#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Schema: a description file, `builtin:deployment` or `builtin:plugin`.
    #[arg(long)]
    pub schema: Option<String>,

    /// Reject keys the schema does not declare.
    #[arg(long)]
    pub strict: bool,

    /// Serialization of the normalized document.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub output_format: OutputFormat,

    /// Document to normalize.
    pub document: PathBuf,
}

/// Serialization of a normalized document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON.
    Json,
    /// YAML.
    Yaml,
}

/// Execute the normalize subcommand.
pub fn run_normalize(args: &NormalizeArgs, config: &CliConfig) -> Result<u8> {
    let reference = schema_reference(args.schema.as_deref(), config)?;
    let schema = load_schema(reference)?;
    let options = validator_options(args.strict, config);
    let document = load_document(&args.document)?;

    match schema.validate_with(&document, &options) {
        ValidationResult::Accepted(normalized) => {
            print!("{}", render_document(&normalized, args.output_format)?);
            Ok(0)
        }
        rejected @ ValidationResult::Rejected(_) => {
            let report = DocumentReport::new(args.document.display().to_string(), &rejected);
            print!("{}", render_text(&report));
            Ok(1)
        }
    }
}

/// Serialize a document, newline-terminated.
pub fn render_document(document: &Value, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(document)?;
            out.push('\n');
            Ok(out)
        }
        OutputFormat::Yaml => Ok(serde_yaml::to_string(document)?),
    }
}
