//! # CLI Configuration
//!
//! Optional YAML file holding defaults for the command-line flags:
//!
//! ```yaml
//! schema: builtin:deployment
//! strict: true
//! format: json
//! ```
//!
//! Read from `--config <FILE>` when given, otherwise from `dshape.yaml` in
//! the working directory if one exists. Flags given on the command line
//! always win over file values.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::validate::ReportFormat;

/// Name of the config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "dshape.yaml";

/// Defaults for `validate` and `normalize`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Reject undeclared keys.
    pub strict: bool,
    /// Report format for `validate`.
    pub format: Option<ReportFormat>,
    /// Schema reference: a description file or `builtin:<name>`.
    pub schema: Option<String>,
}

impl CliConfig {
    /// Read a config file. An empty file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Find the config in effect.
    ///
    /// An explicit path must exist. Without one, `dshape.yaml` in `cwd` is
    /// used if present; otherwise the defaults apply.
    pub fn discover(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            tracing::debug!(path = %path.display(), "loading config");
            return Self::load(path);
        }
        let implicit = cwd.join(DEFAULT_CONFIG_FILE);
        if implicit.is_file() {
            tracing::debug!(path = %implicit.display(), "loading config");
            Self::load(&implicit)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig::discover(None, dir.path()).unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn test_discover_working_directory_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "schema: builtin:deployment\nstrict: true\nformat: json\n",
        )
        .unwrap();
        let config = CliConfig::discover(None, dir.path()).unwrap();
        assert!(config.strict);
        assert_eq!(config.format, Some(ReportFormat::Json));
        assert_eq!(config.schema.as_deref(), Some("builtin:deployment"));
    }

    #[test]
    fn test_explicit_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "strict: true\n").unwrap();
        let explicit = dir.path().join("ci.yaml");
        std::fs::write(&explicit, "schema: builtin:plugin\n").unwrap();
        let config = CliConfig::discover(Some(&explicit), dir.path()).unwrap();
        assert!(!config.strict);
        assert_eq!(config.schema.as_deref(), Some("builtin:plugin"));
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.yaml");
        assert!(CliConfig::discover(Some(&missing), dir.path()).is_err());
    }

    #[test]
    fn test_empty_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, "\n").unwrap();
        assert_eq!(CliConfig::load(&path).unwrap(), CliConfig::default());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, "strictness: high\n").unwrap();
        let err = CliConfig::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse config file"));
    }
}
