//! Binary-level checks of the `assemble` CLI.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn scaffold(root: &std::path::Path) {
    let pkg = root.join("crates/arbor/pkg");
    fs::create_dir_all(&pkg).unwrap();
    fs::write(pkg.join("arbor.js"), "module.exports = {};\n").unwrap();
    fs::write(
        pkg.join("arbor.d.ts"),
        "export function lex(input: string): Array<Token>;\nexport function parse(input: string): Array<Node>;\nexport function generate(input: Array<Node>): string;\n",
    )
    .unwrap();
    fs::write(
        pkg.join("package.json"),
        r#"{"name":"arbor","version":"0.4.0","private":true}"#,
    )
    .unwrap();

    let token = root.join("crates/arbor-lexer/bindings");
    fs::create_dir_all(&token).unwrap();
    fs::write(
        token.join("Token.ts"),
        "export declare class Token {\n  value: string\n}\n",
    )
    .unwrap();

    let nodes = root.join("crates/arbor-nodes/bindings");
    fs::create_dir_all(&nodes).unwrap();
    fs::write(
        nodes.join("EchoNode.ts"),
        "export declare class EchoNode {\n  expression: Node\n}\n",
    )
    .unwrap();
}

#[test]
fn all_assembles_a_package_end_to_end() {
    let dir = TempDir::new().unwrap();
    scaffold(dir.path());

    Command::cargo_bin("assemble")
        .unwrap()
        .arg("all")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("package assembled"));

    assert!(dir.path().join("dist/index.js").is_file());
    assert!(dir.path().join("dist/builder.js").is_file());
}

#[test]
fn builder_failure_degrades_the_build_but_ships_the_rest() {
    let dir = TempDir::new().unwrap();
    scaffold(dir.path());
    // An unclosed class makes builder synthesis fail; the failure is local
    // to that phase, so `all` must still assemble a publishable package.
    fs::write(
        dir.path().join("crates/arbor-nodes/bindings/WeirdNode.ts"),
        "export declare class WeirdNode {\n  expression: Node\n",
    )
    .unwrap();

    Command::cargo_bin("assemble")
        .unwrap()
        .arg("all")
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("warning:"))
        .stderr(predicate::str::contains("build degraded"));

    assert!(dir.path().join("dist/index.js").is_file());
    assert!(dir.path().join("dist/package.json").is_file());
    assert!(!dir.path().join("dist/builder.js").exists());

    // The entry module must still load: no reference to the missing builder.
    let index = fs::read_to_string(dir.path().join("dist/index.js")).unwrap();
    assert!(!index.contains("require(\"./builder.js\")"));
}

#[test]
fn missing_artifacts_fail_with_a_diagnostic() {
    let dir = TempDir::new().unwrap();

    Command::cargo_bin("assemble")
        .unwrap()
        .arg("relocate")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing"));
}

#[test]
fn phases_run_standalone_in_release_order() {
    let dir = TempDir::new().unwrap();
    scaffold(dir.path());

    for phase in ["relocate", "declarations", "builder", "entry", "manifest"] {
        Command::cargo_bin("assemble")
            .unwrap()
            .arg(phase)
            .arg(dir.path())
            .assert()
            .success();
    }

    let manifest = fs::read_to_string(dir.path().join("dist/package.json")).unwrap();
    assert!(manifest.contains("\"main\": \"index.js\""));
}
