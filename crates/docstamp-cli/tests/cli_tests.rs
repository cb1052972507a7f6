//! End-to-end runs of the `docstamp` binary against temporary projects.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const ADD: &str = "function add(a: number, b: number): number {\n  return a + b;\n}\n";

const ADD_DOCUMENTED: &str = "/**\n * Description placeholder\n *\n * @param {number} a\n * @param {number} b\n * @returns {number}\n */\nfunction add(a: number, b: number): number {\n  return a + b;\n}\n";

fn docstamp(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_docstamp"));
    cmd.current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("DOCSTAMP_AUTHOR")
        .env_remove("DOCSTAMP_INCLUDE_TYPES");
    cmd
}

fn project(files: &[(&str, &str)]) -> TempDir {
    let temp = TempDir::new().unwrap();
    for (name, text) in files {
        let path = temp.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, text).unwrap();
    }
    temp
}

#[test]
fn file_command_writes_headers() {
    let temp = project(&[("add.ts", ADD)]);

    docstamp(temp.path())
        .args(["file", "add.ts"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Generated 1 header in add.ts"));

    assert_eq!(
        fs::read_to_string(temp.path().join("add.ts")).unwrap(),
        ADD_DOCUMENTED
    );
}

#[test]
fn second_run_has_nothing_to_generate() {
    let temp = project(&[("add.ts", ADD_DOCUMENTED)]);

    docstamp(temp.path())
        .args(["file", "add.ts"])
        .assert()
        .success()
        .stderr(predicate::str::contains("No undocumented declarations"));

    assert_eq!(
        fs::read_to_string(temp.path().join("add.ts")).unwrap(),
        ADD_DOCUMENTED
    );
}

#[test]
fn dry_run_prints_instead_of_writing() {
    let temp = project(&[("add.ts", ADD)]);

    docstamp(temp.path())
        .args(["--dry-run", "file", "add.ts"])
        .assert()
        .success()
        .stdout(predicate::str::contains("// add.ts"))
        .stdout(predicate::str::contains(" * @param {number} a\n"))
        .stderr(predicate::str::contains("Would generate 1 header"));

    assert_eq!(fs::read_to_string(temp.path().join("add.ts")).unwrap(), ADD);
}

#[test]
fn position_command_documents_one_declaration() {
    let source = "function a() {}\nfunction b(x) {}\n";
    let temp = project(&[("two.js", source)]);

    docstamp(temp.path())
        .args(["at", "two.js", "--line", "2", "--column", "10"])
        .assert()
        .success();

    let text = fs::read_to_string(temp.path().join("two.js")).unwrap();
    assert!(text.starts_with("function a() {}\n/**\n"), "{text}");
    assert!(text.contains(" * @param {*} x\n"), "{text}");
}

#[test]
fn position_without_declaration_fails() {
    let temp = project(&[("log.js", "console.log(1);\n")]);

    docstamp(temp.path())
        .args(["at", "log.js", "--line", "1", "--column", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No documentable declaration"));
}

#[test]
fn missing_file_fails() {
    let temp = TempDir::new().unwrap();

    docstamp(temp.path())
        .args(["file", "nope.ts"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn folder_command_reports_skipped_files() {
    let temp = project(&[
        ("src/add.ts", ADD),
        ("src/broken.ts", "function (\n"),
        ("src/node_modules/dep/index.js", "function dep() {}\n"),
    ]);

    docstamp(temp.path())
        .args(["folder", "src"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Skipped"))
        .stderr(predicate::str::contains("broken.ts"));

    assert_eq!(
        fs::read_to_string(temp.path().join("src/add.ts")).unwrap(),
        ADD_DOCUMENTED
    );
    assert_eq!(
        fs::read_to_string(temp.path().join("src/node_modules/dep/index.js")).unwrap(),
        "function dep() {}\n"
    );
}

#[test]
fn config_file_and_environment_layers_apply() {
    let temp = project(&[
        ("add.ts", ADD),
        ("docstamp.json", r#"{ "includeTypes": false }"#),
    ]);

    docstamp(temp.path())
        .env("DOCSTAMP_AUTHOR", "Ada")
        .args(["file", "add.ts"])
        .assert()
        .success();

    let text = fs::read_to_string(temp.path().join("add.ts")).unwrap();
    assert!(text.contains(" * @author Ada\n"), "{text}");
    assert!(text.contains(" * @param a\n"), "{text}");
}

#[test]
fn invalid_config_is_reported() {
    let temp = project(&[("add.ts", ADD), ("docstamp.json", r#"{ "fileGlob": "" }"#)]);

    docstamp(temp.path())
        .args(["file", "add.ts"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));

    assert_eq!(fs::read_to_string(temp.path().join("add.ts")).unwrap(), ADD);
}
