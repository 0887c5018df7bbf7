//! # Document Loading
//!
//! Reads JSON or YAML files into `serde_json::Value` trees. The format is
//! chosen from the file extension: `.yaml`/`.yml` are YAML, everything else
//! is JSON.
//!
//! YAML is parsed into `serde_yaml::Value` first and then converted, so
//! YAML-only constructs (tags, non-string keys) are handled explicitly
//! instead of failing inside serde.

use std::path::Path;

use serde_json::Value;

use crate::error::DocumentError;

/// Serialization format of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// JSON text.
    Json,
    /// YAML text (the JSON-compatible subset).
    Yaml,
}

impl DocumentFormat {
    /// Determine the format from a file extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => DocumentFormat::Yaml,
            _ => DocumentFormat::Json,
        }
    }

    /// Human-readable name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            DocumentFormat::Json => "JSON",
            DocumentFormat::Yaml => "YAML",
        }
    }
}

/// Load a document file into a JSON value tree.
///
/// # Errors
///
/// Returns `DocumentError::Read` if the file cannot be read, and
/// `DocumentError::Parse`/`DocumentError::Conversion` if its content is not
/// a valid document in the format implied by its extension.
pub fn load_document(path: &Path) -> Result<Value, DocumentError> {
    let content = std::fs::read_to_string(path).map_err(|source| DocumentError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_document(&content, DocumentFormat::from_path(path), &path.display().to_string())
}

/// Parse document text in the given format. `label` names the document in
/// error messages.
pub fn parse_document(
    content: &str,
    format: DocumentFormat,
    label: &str,
) -> Result<Value, DocumentError> {
    match format {
        DocumentFormat::Json => serde_json::from_str(content).map_err(|e| DocumentError::Parse {
            path: label.to_string(),
            format: format.name(),
            reason: e.to_string(),
        }),
        DocumentFormat::Yaml => {
            let yaml: serde_yaml::Value =
                serde_yaml::from_str(content).map_err(|e| DocumentError::Parse {
                    path: label.to_string(),
                    format: format.name(),
                    reason: e.to_string(),
                })?;
            yaml_to_json_value(&yaml).map_err(|reason| DocumentError::Conversion {
                path: label.to_string(),
                reason,
            })
        }
    }
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Numeric and boolean mapping keys are stringified. Tags are dropped and
/// their inner value converted. Non-finite floats and composite keys have
/// no JSON form and are rejected.
pub fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(serde_json::Number::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(serde_json::Number::from(u)))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => {
            let items: Result<Vec<Value>, String> = seq.iter().map(yaml_to_json_value).collect();
            Ok(Value::Array(items?))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key type: {other:?}")),
                };
                json_map.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(json_map))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn format_from_extension() {
        assert_eq!(DocumentFormat::from_path(Path::new("a.yaml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("a.yml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("a.json")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("serverless")), DocumentFormat::Json);
    }

    #[test]
    fn yaml_to_json_conversion() {
        let yaml_str = r#"
service: my-service
frameworkVersion: "3"
provider:
  name: aws
  memorySize: 1024
  versionFunctions: true
plugins:
  - serverless-offline
"#;
        let value = parse_document(yaml_str, DocumentFormat::Yaml, "inline").unwrap();
        assert_eq!(value["service"], "my-service");
        assert_eq!(value["frameworkVersion"], "3");
        assert_eq!(value["provider"]["memorySize"], 1024);
        assert_eq!(value["provider"]["versionFunctions"], true);
        assert_eq!(value["plugins"][0], "serverless-offline");
    }

    #[test]
    fn yaml_numeric_keys_are_stringified() {
        let value = parse_document("200: ok\ntrue: yes\n", DocumentFormat::Yaml, "inline").unwrap();
        assert_eq!(value["200"], "ok");
        assert_eq!(value["true"], "yes");
    }

    #[test]
    fn yaml_tags_are_dropped() {
        let value = parse_document("ref: !Ref MyBucket\n", DocumentFormat::Yaml, "inline").unwrap();
        assert_eq!(value["ref"], "MyBucket");
    }

    #[test]
    fn yaml_composite_key_is_rejected() {
        let err = parse_document("? [a, b]\n: value\n", DocumentFormat::Yaml, "inline").unwrap_err();
        assert!(matches!(err, DocumentError::Conversion { .. }), "{err}");
    }

    #[test]
    fn invalid_json_reports_label() {
        let err = parse_document("{not json", DocumentFormat::Json, "broken.json").unwrap_err();
        match err {
            DocumentError::Parse { path, format, .. } => {
                assert_eq!(path, "broken.json");
                assert_eq!(format, "JSON");
            }
            other => panic!("Expected Parse, got: {other}"),
        }
    }

    #[test]
    fn load_document_from_file() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(file, "http:\n  path: myPath\n  method: get").unwrap();
        let value = load_document(file.path()).unwrap();
        assert_eq!(value["http"]["method"], "get");
    }

    #[test]
    fn load_missing_file_is_read_error() {
        let err = load_document(Path::new("/nonexistent/dshape/doc.json")).unwrap_err();
        assert!(matches!(err, DocumentError::Read { .. }));
    }
}
