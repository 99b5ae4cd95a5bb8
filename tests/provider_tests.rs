//! Integration tests for the host-facing `execute` / `execute_file` calls.

use gotter::error::{Error, FileError};
use gotter::provider::{self, HostFunction, Provider, DATA_ARGUMENT, TEMPLATE_ARGUMENT};
use gotter::renderer::{Engine, LogObserver};
use gotter::Value;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use test_log::test;

fn write_template(dir: &TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn execute_file_names_errors_after_path() {
    let dir = TempDir::new().unwrap();
    let path = write_template(&dir, "greeting.tmpl", "line one\nHello {{ .who.name }}!");
    let err = provider::execute_file(&path, r#"{"who": {}}"#).unwrap_err();
    match err {
        Error::Execution { name, .. } => assert_eq!(name, path.display().to_string()),
        other => panic!("expected execution error, got {other:?}"),
    }
    assert_eq!(
        provider::execute_file(&path, r#"{"who": {"name": "gotter"}}"#).unwrap(),
        "line one\nHello gotter!"
    );
}

#[test]
fn execute_file_checks_preconditions_in_order() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.tmpl");
    assert!(matches!(
        provider::execute_file(&missing, "null"),
        Err(Error::File(FileError::NotFound { .. }))
    ));
    assert!(matches!(
        provider::execute_file(dir.path(), "null"),
        Err(Error::File(FileError::IsDirectory { .. }))
    ));
    let empty = write_template(&dir, "empty.tmpl", "");
    assert!(matches!(
        provider::execute_file(&empty, "null"),
        Err(Error::File(FileError::Empty { .. }))
    ));
}

#[test]
fn template_errors_and_data_errors_are_distinct() {
    assert!(matches!(provider::execute("{{ if }}", "null"), Err(Error::Parse { .. })));
    assert!(matches!(provider::execute("{{ . }}", "[1,"), Err(Error::Argument(_))));
}

#[test]
fn native_values_skip_json_decoding() {
    let value: Value = [("list", Value::from(vec![1, 2])), ("flag", Value::from(true))]
        .into_iter()
        .collect();
    assert_eq!(provider::execute("{{ print . }}", value).unwrap(), "map[flag:true list:[1 2]]");
}

#[test]
fn defined_templates_in_files() {
    let dir = TempDir::new().unwrap();
    let path = write_template(
        &dir,
        "page.tmpl",
        r#"{{ define "row" }}<{{ .k }}:{{ .v }}>{{ end -}}
{{ range $k, $v := . }}{{ template "row" (dict $k $v) }}{{ end }}"#,
    );
    // `dict` is not part of the library
    assert!(matches!(provider::execute_file(&path, "{}"), Err(Error::Parse { .. })));

    let path = write_template(
        &dir,
        "page.tmpl",
        r#"{{ define "row" }}<{{ . }}>{{ end -}}
{{ range . }}{{ template "row" . }}{{ end }}"#,
    );
    assert_eq!(provider::execute_file(&path, r#"["a", "b"]"#).unwrap(), "<a><b>");
}

#[test]
fn validate_argument_reports_position() {
    let provider = Provider::new(Engine::new().with_observer(LogObserver));
    let dir = TempDir::new().unwrap();
    let good = write_template(&dir, "good.tmpl", "{{ upper . }}");

    assert!(provider
        .validate_argument(HostFunction::ExecuteFile, TEMPLATE_ARGUMENT, &good.to_string_lossy())
        .is_ok());

    let failure = provider
        .validate_argument(HostFunction::ExecuteFile, TEMPLATE_ARGUMENT, "/no/such/file.tmpl")
        .unwrap_err();
    assert_eq!(failure.position, TEMPLATE_ARGUMENT);
    assert!(failure.message.contains("does not exist"));

    let failure = provider
        .validate_argument(HostFunction::Execute, DATA_ARGUMENT, "{\"a\":")
        .unwrap_err();
    assert_eq!(failure.position, DATA_ARGUMENT);
}
