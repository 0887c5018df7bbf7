//! # dshape CLI entry point
//!
//! Parses command-line arguments, loads the optional config file, and
//! dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dshape_cli::check::{run_check_schema, CheckSchemaArgs};
use dshape_cli::config::CliConfig;
use dshape_cli::normalize::{run_normalize, NormalizeArgs};
use dshape_cli::validate::{run_validate, ValidateArgs};

/// Exit code for operational failures (unreadable input, invalid schema).
const EXIT_ERROR: u8 = 2;

/// dshape: shape checking for configuration documents
///
/// Validates YAML and JSON documents against a schema, reporting every
/// violation with its path, and prints normalized documents with schema
/// defaults filled in.
#[derive(Parser, Debug)]
#[command(name = "dshape", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file (default: ./dshape.yaml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit log lines as JSON on stderr.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate documents against a schema.
    Validate(ValidateArgs),

    /// Print a document with schema defaults filled in.
    Normalize(NormalizeArgs),

    /// Load and compile schema description files.
    #[command(name = "check-schema")]
    CheckSchema(CheckSchemaArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    tracing::debug!("dshape CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let result = load_config(cli.config.as_deref()).and_then(|config| match &cli.command {
        Commands::Validate(args) => run_validate(args, &config),
        Commands::Normalize(args) => run_normalize(args, &config),
        Commands::CheckSchema(args) => run_check_schema(args),
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn load_config(explicit: Option<&std::path::Path>) -> anyhow::Result<CliConfig> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    CliConfig::discover(explicit, &cwd)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dshape_cli::normalize::OutputFormat;
    use dshape_cli::validate::ReportFormat;

    #[test]
    fn cli_parse_validate() {
        let cli = Cli::try_parse_from([
            "dshape",
            "validate",
            "--schema",
            "builtin:deployment",
            "serverless.yml",
        ])
        .unwrap();
        if let Commands::Validate(args) = cli.command {
            assert_eq!(args.schema.as_deref(), Some("builtin:deployment"));
            assert!(!args.strict);
            assert!(args.format.is_none());
            assert_eq!(args.documents, vec![PathBuf::from("serverless.yml")]);
        } else {
            panic!("expected validate");
        }
    }

    #[test]
    fn cli_parse_validate_all_flags() {
        let cli = Cli::try_parse_from([
            "dshape",
            "-vv",
            "validate",
            "--schema",
            "schemas/http.yml",
            "--strict",
            "--format",
            "json",
            "a.yml",
            "b.json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        if let Commands::Validate(args) = cli.command {
            assert!(args.strict);
            assert_eq!(args.format, Some(ReportFormat::Json));
            assert_eq!(args.documents.len(), 2);
        } else {
            panic!("expected validate");
        }
    }

    #[test]
    fn cli_parse_validate_requires_document() {
        assert!(Cli::try_parse_from(["dshape", "validate", "--schema", "builtin:plugin"]).is_err());
    }

    #[test]
    fn cli_parse_validate_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["dshape", "validate", "--format", "xml", "a.yml"]).is_err());
    }

    #[test]
    fn cli_parse_normalize() {
        let cli = Cli::try_parse_from([
            "dshape",
            "normalize",
            "--schema",
            "builtin:plugin",
            "--output-format",
            "yaml",
            "plugin.yml",
        ])
        .unwrap();
        if let Commands::Normalize(args) = cli.command {
            assert_eq!(args.output_format, OutputFormat::Yaml);
            assert_eq!(args.document, PathBuf::from("plugin.yml"));
        } else {
            panic!("expected normalize");
        }
    }

    #[test]
    fn cli_parse_normalize_default_output() {
        let cli = Cli::try_parse_from(["dshape", "normalize", "serverless.yml"]).unwrap();
        if let Commands::Normalize(args) = cli.command {
            assert_eq!(args.output_format, OutputFormat::Json);
            assert!(args.schema.is_none());
        } else {
            panic!("expected normalize");
        }
    }

    #[test]
    fn cli_parse_check_schema() {
        let cli =
            Cli::try_parse_from(["dshape", "check-schema", "a.yml", "b.json", "--log-json"])
                .unwrap();
        assert!(cli.log_json);
        if let Commands::CheckSchema(args) = cli.command {
            assert_eq!(args.files.len(), 2);
        } else {
            panic!("expected check-schema");
        }
    }

    #[test]
    fn cli_parse_global_config() {
        let cli = Cli::try_parse_from([
            "dshape",
            "validate",
            "a.yml",
            "--config",
            "ci/dshape.yaml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("ci/dshape.yaml")));
    }
}
