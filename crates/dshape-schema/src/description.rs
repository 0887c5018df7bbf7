//! # Schema Description Files
//!
//! Loads schemas authored as YAML or JSON documents instead of with the
//! builder API:
//!
//! ```yaml
//! type: object
//! unknown_fields: deny
//! fields:
//!   method: { type: enum, values: [get, post] }
//!   path:   { type: string }
//!   cors:   { type: boolean, optional: true, default: false }
//! ```
//!
//! ## Pipeline
//!
//! 1. Parse the file (format chosen by extension; YAML is converted to a
//!    JSON value tree).
//! 2. Check the raw description against the embedded Draft 2020-12
//!    meta-schema (`meta/schema-description.schema.json`) using the
//!    `jsonschema` crate. Every problem is reported with its instance path.
//! 3. Decode into a [`SchemaNode`] with serde. Field order is preserved.
//! 4. Compile with [`Schema::compile`].
//!
//! A description that passes the meta-schema can still fail compilation,
//! e.g. an ambiguous union. Shape errors come from step 2, semantic errors
//! from step 4.

use std::fmt;
use std::path::Path;

use dshape_core::{
    load_document, parse_document, DocumentError, DocumentFormat, FieldPath, PathSegment,
};
use jsonschema::Validator;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::compile::{Schema, SchemaDefinitionError};
use crate::node::SchemaNode;

/// The description meta-schema, embedded at build time.
pub const META_SCHEMA: &str = include_str!("../meta/schema-description.schema.json");

/// Error while loading a schema description.
#[derive(Error, Debug)]
pub enum SchemaLoadError {
    /// The description file could not be read or parsed.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// The description does not follow the description format.
    #[error("malformed schema description '{source_name}':\n{violations}")]
    Malformed {
        /// File name or label of the description.
        source_name: String,
        /// Every meta-schema violation found.
        violations: MetaViolations,
    },

    /// The description passed the meta-schema but could not be decoded.
    #[error("cannot decode schema description '{source_name}': {reason}")]
    Decode {
        /// File name or label of the description.
        source_name: String,
        /// Decoder message.
        reason: String,
    },

    /// The decoded schema is contradictory or ambiguous.
    #[error("invalid schema in '{source_name}': {source}")]
    Definition {
        /// File name or label of the description.
        source_name: String,
        /// The definition error.
        #[source]
        source: SchemaDefinitionError,
    },

    /// The embedded meta-schema could not be built.
    #[error("meta-schema error: {0}")]
    MetaSchema(String),
}

/// A place where a description breaks the description format.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaViolation {
    /// Where in the description the problem is, in the notation used for
    /// document violations.
    pub location: FieldPath,
    /// What the meta-schema rejected.
    pub message: String,
}

impl MetaViolation {
    /// Resolve a meta-schema JSON Pointer against the description it came
    /// from. Steps into arrays (`values`, `alternatives`) become indices;
    /// everything else, including numeric field names, stays a key.
    fn at_pointer(description: &Value, pointer: &str, message: String) -> Self {
        let mut node = Some(description);
        let mut location = FieldPath::root();
        for raw in pointer.split('/').skip(1) {
            let step = raw.replace("~1", "/").replace("~0", "~");
            let segment = match (node, step.parse::<usize>()) {
                (Some(Value::Array(items)), Ok(index)) => {
                    node = items.get(index);
                    PathSegment::Index(index)
                }
                (Some(Value::Object(map)), _) => {
                    node = map.get(&step);
                    PathSegment::Key(step)
                }
                _ => {
                    node = None;
                    PathSegment::Key(step)
                }
            };
            location = location.child(segment);
        }
        Self { location, message }
    }
}

impl fmt::Display for MetaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

/// Every meta-schema violation of one description, one per line when shown.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaViolations {
    violations: Vec<MetaViolation>,
}

impl MetaViolations {
    pub fn violations(&self) -> &[MetaViolation] {
        &self.violations
    }
}

impl fmt::Display for MetaViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = self.violations.iter();
        if let Some(first) = lines.next() {
            write!(f, "  {first}")?;
        }
        for v in lines {
            write!(f, "\n  {v}")?;
        }
        Ok(())
    }
}

/// Loads schema descriptions, checking them against the meta-schema.
///
/// Building the meta-schema validator is not free; construct one loader and
/// reuse it for every description.
pub struct DescriptionLoader {
    meta: Validator,
}

impl fmt::Debug for DescriptionLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DescriptionLoader").finish_non_exhaustive()
    }
}

impl DescriptionLoader {
    /// Build the meta-schema validator.
    ///
    /// # Errors
    ///
    /// Returns `SchemaLoadError::MetaSchema` if the embedded meta-schema is
    /// not a valid Draft 2020-12 schema.
    pub fn new() -> Result<Self, SchemaLoadError> {
        let meta_value: Value = serde_json::from_str(META_SCHEMA)
            .map_err(|e| SchemaLoadError::MetaSchema(e.to_string()))?;
        let mut opts = jsonschema::options();
        opts.with_draft(jsonschema::Draft::Draft202012);
        let meta = opts
            .build(&meta_value)
            .map_err(|e| SchemaLoadError::MetaSchema(e.to_string()))?;
        Ok(Self { meta })
    }

    /// Check a raw description against the meta-schema.
    ///
    /// # Errors
    ///
    /// Returns every violation found, in the order `jsonschema` reports them.
    pub fn check(&self, description: &Value) -> Result<(), MetaViolations> {
        let violations: Vec<MetaViolation> = self
            .meta
            .iter_errors(description)
            .map(|e| {
                MetaViolation::at_pointer(description, &e.instance_path.to_string(), e.to_string())
            })
            .collect();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(MetaViolations { violations })
        }
    }

    /// Check and decode a description into an uncompiled node.
    ///
    /// Useful when the node is to be composed further before compiling.
    pub fn decode(&self, description: &Value, source_name: &str) -> Result<SchemaNode, SchemaLoadError> {
        self.check(description)
            .map_err(|violations| SchemaLoadError::Malformed {
                source_name: source_name.to_string(),
                violations,
            })?;
        SchemaNode::deserialize(description).map_err(|e| SchemaLoadError::Decode {
            source_name: source_name.to_string(),
            reason: e.to_string(),
        })
    }

    /// Check, decode and compile a description value.
    pub fn from_value(&self, description: &Value, source_name: &str) -> Result<Schema, SchemaLoadError> {
        let node = self.decode(description, source_name)?;
        let schema = Schema::compile(node).map_err(|source| SchemaLoadError::Definition {
            source_name: source_name.to_string(),
            source,
        })?;
        tracing::debug!(source = source_name, "schema description loaded");
        Ok(schema)
    }

    /// Parse description text in the given format, then load it.
    pub fn load_str(
        &self,
        content: &str,
        format: DocumentFormat,
        source_name: &str,
    ) -> Result<Schema, SchemaLoadError> {
        let description = parse_document(content, format, source_name)?;
        self.from_value(&description, source_name)
    }

    /// Load a description file. `.yaml`/`.yml` files are parsed as YAML,
    /// everything else as JSON.
    pub fn load(&self, path: &Path) -> Result<Schema, SchemaLoadError> {
        let description = load_document(path)?;
        self.from_value(&description, &path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn loader() -> DescriptionLoader {
        DescriptionLoader::new().expect("meta-schema builds")
    }

    #[test]
    fn test_meta_schema_builds() {
        let _ = loader();
    }

    #[test]
    fn test_loads_yaml_description() {
        let yaml = r#"
type: object
unknown_fields: deny
fields:
  method: { type: enum, values: [get, post] }
  path:   { type: string }
  cors:   { type: boolean, optional: true, default: false }
"#;
        let schema = loader()
            .load_str(yaml, DocumentFormat::Yaml, "http.yml")
            .unwrap();
        let result = schema.validate(&json!({"method": "get", "path": "/x"}));
        assert_eq!(
            result.document(),
            Some(&json!({"method": "get", "path": "/x", "cors": false}))
        );
        assert!(!schema.validate(&json!({"method": "put", "path": "/x"})).is_accepted());
    }

    #[test]
    fn test_malformed_description_reports_paths() {
        let description = json!({
            "type": "object",
            "fields": {
                "method": { "type": "enum" },
                "path": { "type": "strng" }
            }
        });
        let err = loader().from_value(&description, "bad.json").unwrap_err();
        match err {
            SchemaLoadError::Malformed { violations, .. } => {
                let paths: Vec<String> = violations
                    .violations()
                    .iter()
                    .map(|v| v.location.to_string())
                    .collect();
                assert!(paths.contains(&".fields.method".to_string()), "{paths:?}");
                assert!(paths.contains(&".fields.path.type".to_string()), "{paths:?}");
            }
            other => panic!("Expected Malformed, got: {other}"),
        }
    }

    #[test]
    fn test_unknown_keyword_is_malformed() {
        let description = json!({ "type": "string", "pattern": "^a" });
        assert!(matches!(
            loader().from_value(&description, "x.json"),
            Err(SchemaLoadError::Malformed { .. })
        ));
    }

    #[test]
    fn test_ambiguous_description_is_definition_error() {
        let description = json!({
            "type": "union",
            "alternatives": [ { "type": "string" }, { "type": "string" } ]
        });
        let err = loader().from_value(&description, "u.json").unwrap_err();
        assert!(matches!(
            err,
            SchemaLoadError::Definition {
                source: SchemaDefinitionError::AmbiguousUnion { .. },
                ..
            }
        ));
        assert!(err.to_string().starts_with("invalid schema in 'u.json'"));
    }

    #[test]
    fn test_constraints_decode() {
        let description = json!({
            "type": "object",
            "fields": {
                "name": { "type": "string", "optional": true },
                "arn":  { "type": "string", "optional": true }
            },
            "constraints": [ { "exactly_one_of": ["name", "arn"] } ]
        });
        let schema = loader().from_value(&description, "auth.json").unwrap();
        assert!(schema.validate(&json!({"name": "a"})).is_accepted());
        assert!(!schema.validate(&json!({"name": "a", "arn": "b"})).is_accepted());
    }

    #[test]
    fn test_constraint_with_two_keys_is_malformed() {
        let description = json!({
            "type": "object",
            "fields": { "a": { "type": "string" }, "b": { "type": "string" } },
            "constraints": [ { "exactly_one_of": ["a", "b"], "at_least_one_of": ["a", "b"] } ]
        });
        assert!(matches!(
            loader().from_value(&description, "c.json"),
            Err(SchemaLoadError::Malformed { .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schedule.json");
        std::fs::write(
            &path,
            r#"{ "type": "union", "alternatives": [
                 { "type": "string" },
                 { "type": "object", "fields": { "rate": { "type": "string" } } } ] }"#,
        )
        .unwrap();
        let schema = loader().load(&path).unwrap();
        assert!(schema.validate(&json!("rate(1 minute)")).is_accepted());
        assert!(schema.validate(&json!({"rate": "rate(1 minute)"})).is_accepted());
    }

    #[test]
    fn test_missing_file_is_document_error() {
        let err = loader()
            .load(Path::new("/nonexistent/dshape/schema.yml"))
            .unwrap_err();
        assert!(matches!(err, SchemaLoadError::Document(DocumentError::Read { .. })));
    }

    #[test]
    fn test_meta_violation_display() {
        let v = MetaViolation {
            location: ["fields", "path", "type"].into_iter().collect(),
            message: "\"strng\" is not one of ...".to_string(),
        };
        assert_eq!(v.to_string(), ".fields.path.type: \"strng\" is not one of ...");
        let root = MetaViolation {
            location: FieldPath::root(),
            message: "\"type\" is a required property".to_string(),
        };
        assert!(root.to_string().starts_with("(root): "));
    }

    #[test]
    fn test_violation_locations_follow_the_description() {
        let description = json!({
            "type": "union",
            "alternatives": [
                { "type": "string" },
                { "type": "enum", "values": ["a", { "b": 1 }] }
            ]
        });
        let violations = loader().check(&description).unwrap_err();
        let paths: Vec<String> = violations
            .violations()
            .iter()
            .map(|v| v.location.to_string())
            .collect();
        assert!(paths.contains(&".alternatives[1].values[1]".to_string()), "{paths:?}");

        let numeric_field = json!({
            "type": "object",
            "fields": { "200": { "type": "strng" } }
        });
        let violations = loader().check(&numeric_field).unwrap_err();
        let expected: FieldPath = [
            PathSegment::from("fields"),
            PathSegment::from("200"),
            PathSegment::from("type"),
        ]
        .into_iter()
        .collect();
        assert!(
            violations.violations().iter().any(|v| v.location == expected),
            "{violations}"
        );
    }

    #[test]
    fn test_malformed_error_lists_one_violation_per_line() {
        let err = loader()
            .from_value(&json!({ "type": "object", "fields": { "a": {}, "b": {} } }), "two.json")
            .unwrap_err();
        let rendered = err.to_string();
        let mut lines = rendered.lines();
        assert_eq!(lines.next(), Some("malformed schema description 'two.json':"));
        for line in lines {
            assert!(line.starts_with("  .fields."), "{rendered}");
        }
    }
}
