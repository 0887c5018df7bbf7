//! # Check-Schema Subcommand
//!
//! Loads schema description files and compiles them, reporting meta-schema
//! violations and contradictory or ambiguous definitions.
//!
//! ## Usage
//!
//! ```bash
//! dshape check-schema schemas/http.yml schemas/stream.json
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use dshape_schema::{DescriptionLoader, SchemaLoadError};

/// Arguments for the check-schema subcommand.
#[derive(Args, Debug)]
pub struct CheckSchemaArgs {
    /// Schema description files (YAML or JSON).
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Execute the check-schema subcommand.
///
/// A description that loads but is malformed or contradictory is a failed
/// check (exit 1). A file that cannot be read or parsed is an error.
pub fn run_check_schema(args: &CheckSchemaArgs) -> Result<u8> {
    let loader = DescriptionLoader::new()?;
    let mut failed = 0usize;
    for path in &args.files {
        match loader.load(path) {
            Ok(_) => println!("{}: ok", path.display()),
            Err(SchemaLoadError::Document(e)) => {
                return Err(e).with_context(|| {
                    format!("failed to load schema description {}", path.display())
                });
            }
            Err(e) => {
                failed += 1;
                println!("{}: {e}", path.display());
            }
        }
    }
    tracing::info!(checked = args.files.len(), failed, "schema descriptions checked");
    Ok(if failed == 0 { 0 } else { 1 })
}
