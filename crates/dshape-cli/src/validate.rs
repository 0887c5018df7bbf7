//! # Validate Subcommand
//!
//! Validates one or more documents against a schema and reports every
//! violation found.
//!
//! ## Usage
//!
//! ```bash
//! # Check a deployment descriptor with the built-in schema:
//! dshape validate --schema builtin:deployment serverless.yml
//!
//! # Reject undeclared keys, machine-readable report:
//! dshape validate --schema schemas/http.yml --strict --format json a.yml b.json
//! ```
//!
//! Exit code 0 when every document is accepted, 1 when any is rejected.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};

use dshape_core::load_document;
use dshape_schema::{ValidationResult, Violation};

use crate::config::CliConfig;
use crate::{load_schema, schema_reference, validator_options};

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Schema: a description file, `builtin:deployment` or `builtin:plugin`.
    #[arg(long)]
    pub schema: Option<String>,

    /// Reject keys the schema does not declare.
    #[arg(long)]
    pub strict: bool,

    /// Report format.
    #[arg(long, value_enum)]
    pub format: Option<ReportFormat>,

    /// Documents to validate (JSON or YAML, chosen by extension).
    #[arg(required = true)]
    pub documents: Vec<PathBuf>,
}

/// How validation results are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// One line per document, violations indented below.
    #[default]
    Text,
    /// A JSON array with one report per document.
    Json,
}

/// Validation outcome for one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentReport {
    /// Path of the document, as given.
    pub document: String,
    /// Whether the document conforms.
    pub accepted: bool,
    /// Every violation, in traversal order.
    pub violations: Vec<Violation>,
}

impl DocumentReport {
    /// Build a report from a validation result.
    pub fn new(document: impl Into<String>, result: &ValidationResult) -> Self {
        Self {
            document: document.into(),
            accepted: result.is_accepted(),
            violations: result.violations().to_vec(),
        }
    }
}

/// Execute the validate subcommand.
pub fn run_validate(args: &ValidateArgs, config: &CliConfig) -> Result<u8> {
    let reference = schema_reference(args.schema.as_deref(), config)?;
    let schema = load_schema(reference)?;
    let options = validator_options(args.strict, config);
    let format = args.format.or(config.format).unwrap_or_default();

    let mut reports = Vec::with_capacity(args.documents.len());
    for path in &args.documents {
        let document = load_document(path)?;
        let result = schema.validate_with(&document, &options);
        tracing::info!(
            document = %path.display(),
            accepted = result.is_accepted(),
            violations = result.violations().len(),
            "validated"
        );
        reports.push(DocumentReport::new(path.display().to_string(), &result));
    }

    match format {
        ReportFormat::Text => {
            for report in &reports {
                print!("{}", render_text(report));
            }
        }
        ReportFormat::Json => println!("{}", render_json(&reports)?),
    }

    Ok(exit_code(&reports))
}

/// 0 if every report is accepted, 1 otherwise.
pub fn exit_code(reports: &[DocumentReport]) -> u8 {
    if reports.iter().all(|r| r.accepted) {
        0
    } else {
        1
    }
}

/// Text rendering of one report, newline-terminated.
pub fn render_text(report: &DocumentReport) -> String {
    if report.accepted {
        return format!("{}: ok\n", report.document);
    }
    let count = report.violations.len();
    let noun = if count == 1 { "violation" } else { "violations" };
    let mut out = format!("{}: {count} {noun}\n", report.document);
    for violation in &report.violations {
        for line in violation.to_string().lines() {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

/// JSON rendering of all reports.
pub fn render_json(reports: &[DocumentReport]) -> Result<String> {
    Ok(serde_json::to_string_pretty(reports)?)
}
