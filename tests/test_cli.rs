use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("xmlequiv"))
}

fn xml_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(".xml").unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

/// Equivalent documents: exit 0 and the verdict line.
#[test]
fn test_cli_equivalent_documents() {
    let subject = xml_file("<a><b>1</b></a>");
    let reference = xml_file("<a>\n  <b>1</b>\n</a>");

    cmd()
        .args([subject.path(), reference.path()])
        .assert()
        .success()
        .stdout(predicate::str::contains("equivalent"));
}

/// Different documents: exit 1.
#[test]
fn test_cli_different_documents() {
    let subject = xml_file("<a><b>1</b><c>2</c></a>");
    let reference = xml_file("<a><c>2</c><b>1</b></a>");

    cmd()
        .args([subject.path(), reference.path()])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("different"));
}

/// Malformed input: exit 2 with the cause on stderr.
#[test]
fn test_cli_malformed_input() {
    let subject = xml_file("<a><b>1</b>");
    let reference = xml_file("<a><b>1</b></a>");

    cmd()
        .args([subject.path(), reference.path()])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error:"));
}

/// Missing file: exit 2 with an I/O error message.
#[test]
fn test_cli_missing_file() {
    let reference = xml_file("<a/>");

    cmd()
        .args(["/nonexistent/subject.xml"])
        .arg(reference.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error:"));
}

/// --quiet suppresses the verdict line but keeps the exit code.
#[test]
fn test_cli_quiet() {
    let subject = xml_file("<a x=\"1\" y=\"2\"/>");
    let reference = xml_file("<a y=\"2\" x=\"1\"/>");

    cmd()
        .args([subject.path(), reference.path()])
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}
