//! Integration tests for `hxp tokens`, `hxp ast` and `hxp version`.

use std::process::Command;
use tempfile::tempdir;

fn cargo_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO"));
    cmd.args(["run", "-p", "hxp-cli", "--bin", "hxp", "--"]);
    cmd
}

#[test]
fn test_tokens_json_walks_jsx() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("el.hxp"), r#"let el = <div id="x">hi</div>;"#).unwrap();

    let output = cargo_bin()
        .args(["tokens", "el.hxp", "--json", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run tokens command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value =
        serde_json::from_str(&stdout).expect("Output should be valid JSON");

    assert_eq!(json["ok"], true);
    let tokens = json["tokens"].as_array().unwrap();
    let kinds: Vec<&str> = tokens.iter().map(|t| t["kind"].as_str().unwrap()).collect();
    assert_eq!(kinds[0], "keyword");
    assert_eq!(kinds[1], "identifier");
    assert!(kinds.contains(&"jsx-open-tag"));
    assert!(kinds.contains(&"jsx-text"));
    assert_eq!(kinds[kinds.len() - 2], "punct");
    assert_eq!(kinds[kinds.len() - 1], "eof");
    assert_eq!(tokens[0]["line"], 1);
    assert_eq!(tokens[0]["column"], 1);
    assert_eq!(tokens[1]["lexeme"], "el");
}

#[test]
fn test_tokens_text() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("a.hxp"), "a < b").unwrap();

    let output = cargo_bin()
        .args(["tokens", "a.hxp", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run tokens command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, ["1:1 identifier a", "1:3 punct <", "1:5 identifier b", "1:6 eof"]);
}

#[test]
fn test_ast_json_outline() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("prog.hxp"),
        "const limit = 3;\n\nfn main() {\n    print(limit);\n}\n",
    )
    .unwrap();

    let output = cargo_bin()
        .args(["ast", "prog.hxp", "--json", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run ast command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value =
        serde_json::from_str(&stdout).expect("Output should be valid JSON");

    let statements = json["statements"].as_array().unwrap();
    assert_eq!(statements.len(), 2);
    assert_eq!(statements[0]["kind"], "Var");
    assert_eq!(statements[0]["name"], "limit");
    assert_eq!(statements[1]["kind"], "Function");
    assert_eq!(statements[1]["name"], "main");
    assert_eq!(statements[1]["line"], 3);
}

#[test]
fn test_ast_parse_error_exit_code() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("bad.hxp"), "fn (").unwrap();

    let output = cargo_bin()
        .args(["ast", "bad.hxp", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run ast command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error: [line 1:"), "stderr: {stderr}");
    assert!(!stderr.contains("error: [line"), "stderr: {stderr}");
}

#[test]
fn test_version_json() {
    let output = cargo_bin()
        .args(["version", "--json"])
        .output()
        .expect("Failed to run version command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value =
        serde_json::from_str(&stdout).expect("Output should be valid JSON");
    assert_eq!(json["name"], "hxp");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json["bytecode_version"], 1);
}
