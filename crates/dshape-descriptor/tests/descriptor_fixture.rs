//! Validates a complete deployment descriptor file end to end.

use std::path::PathBuf;

use dshape_core::load_document;
use dshape_descriptor::{deployment_schema, validate_descriptor_file};
use dshape_schema::{ValidationResult, ValidatorOptions, ViolationKind};
use serde_json::json;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/serverless.yml")
}

#[test]
fn fixture_is_accepted() {
    let result = validate_descriptor_file(&fixture(), &ValidatorOptions::default()).unwrap();
    assert!(
        result.is_accepted(),
        "violations:\n{}",
        result
            .violations()
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    );
}

#[test]
fn fixture_is_accepted_in_strict_mode() {
    let result = validate_descriptor_file(&fixture(), &ValidatorOptions::strict()).unwrap();
    assert!(result.is_accepted(), "{:?}", result.violations());
}

#[test]
fn fixture_defaults_are_filled() {
    let result = validate_descriptor_file(&fixture(), &ValidatorOptions::default()).unwrap();
    let document = result.document().unwrap();
    let worker_events = &document["functions"]["worker"]["events"];
    assert_eq!(worker_events[2]["s3"]["existing"], json!(false));
    // Explicit values are never replaced.
    assert_eq!(document["provider"]["stage"], json!("prod"));
    assert_eq!(document["configValidationMode"], json!("error"));
}

#[test]
fn normalized_fixture_is_stable() {
    let schema = deployment_schema().unwrap();
    let document = load_document(&fixture()).unwrap();
    let ValidationResult::Accepted(normalized) = schema.validate(&document) else {
        panic!("fixture rejected");
    };
    assert_eq!(
        schema.validate(&normalized),
        ValidationResult::Accepted(normalized.clone())
    );
}

#[test]
fn broken_descriptor_reports_every_problem() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("serverless.yml");
    std::fs::write(
        &path,
        r#"
service: users
configValidationMode: strict
provider:
  name: aws
  memorySize: large
functions:
  api:
    events:
      - http:
          path: users
          method: fetch
"#,
    )
    .unwrap();

    let result = validate_descriptor_file(&path, &ValidatorOptions::default()).unwrap();
    let found: Vec<(String, &'static str)> = result
        .violations()
        .iter()
        .map(|v| (v.path.to_string(), v.kind.name()))
        .collect();
    assert_eq!(
        found,
        vec![
            (".configValidationMode".to_string(), "enum_mismatch"),
            (".provider.memorySize".to_string(), "type_mismatch"),
            (".functions.api.handler".to_string(), "missing_required_field"),
            (".functions.api.events[0]".to_string(), "union_exhausted"),
        ]
    );
    let ViolationKind::UnionExhausted { attempts } = &result.violations()[3].kind else {
        unreachable!();
    };
    assert_eq!(attempts[0].expected, "object");
}
