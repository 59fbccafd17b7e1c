//! File driver: generated source lands atomically, failures leave nothing behind.

use msgtemplate::driver::{check_file, generate_file};
use msgtemplate::{Error, GeneratorConfig};
use std::fs;

const TEMPLATE: &str = "version 2.0\n{\n\tTestMsg High 1 NotTrusted Unencoded\n\t{\n\t\tTestBlock Single\n\t\t{ Foo U32 }\n\t}\n}\n";

#[test]
fn test_generate_file_writes_source() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("message_template.msg");
    let output = dir.path().join("messages.rs");
    fs::write(&input, TEMPLATE).expect("write template");

    let generated = generate_file(&input, &output, &GeneratorConfig::default()).expect("generate");
    assert_eq!(generated.messages, 1);
    assert!(generated.diagnostics.is_empty());

    let source = fs::read_to_string(&output).expect("read output");
    assert!(source.starts_with("// Generated by msgtemplate from template version 2.0."));
    assert!(source.contains("TestMsg_TestBlock"));
    assert_eq!(source, generated.to_source());
}

#[test]
fn test_generate_file_replaces_existing_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("t.msg");
    let output = dir.path().join("out.rs");
    fs::write(&input, TEMPLATE).expect("write template");
    fs::write(&output, "stale").expect("write stale");

    generate_file(&input, &output, &GeneratorConfig::default()).expect("generate");
    assert_ne!(fs::read_to_string(&output).expect("read"), "stale");
    // Only the template and the output remain; the temporary file was renamed.
    assert_eq!(fs::read_dir(dir.path()).expect("read_dir").count(), 2);
}

#[test]
fn test_failed_generation_leaves_no_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("bad.msg");
    let output = dir.path().join("out.rs");
    fs::write(&input, "version 1\n{\nM High 1 T E\n").expect("write template");

    let err = generate_file(&input, &output, &GeneratorConfig::default()).unwrap_err();
    assert!(matches!(err, Error::Structure { line: 2, .. }));
    assert!(!output.exists());
    assert_eq!(fs::read_dir(dir.path()).expect("read_dir").count(), 1);

    fs::write(&output, "previous").expect("write previous");
    generate_file(&input, &output, &GeneratorConfig::default()).unwrap_err();
    assert_eq!(fs::read_to_string(&output).expect("read"), "previous");
}

#[test]
fn test_missing_template_is_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = generate_file(
        &dir.path().join("absent.msg"),
        &dir.path().join("out.rs"),
        &GeneratorConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::Io(_)));
    assert_eq!(err.line(), None);
}

#[test]
fn test_check_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("t.msg");
    fs::write(&input, TEMPLATE).expect("write template");
    let template = check_file(&input).expect("check");
    assert_eq!(template.version, "2.0");
    assert_eq!(template.messages[0].name, "TestMsg");
    assert_eq!(fs::read_dir(dir.path()).expect("read_dir").count(), 1);
}
