//! Integration tests for `hxp compile`.
//!
//! These tests verify:
//! - The default output path follows the target's extension
//! - `--stdout` prints the generated code
//! - JSON output is always valid JSON with an `ok` field
//! - Error codes are SCREAMING_SNAKE_CASE

use std::process::Command;
use tempfile::tempdir;

fn cargo_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO"));
    cmd.args(["run", "-p", "hxp-cli", "--bin", "hxp", "--"]);
    cmd
}

const PROGRAM: &str = r#"
fn add(a, b) {
    return a + b;
}
let greeting = "hi \"there\"";
print(add(1, 2), greeting);
"#;

#[test]
fn test_compile_writes_c_next_to_input() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("add.hxp"), PROGRAM).unwrap();

    let output = cargo_bin()
        .args(["compile", "add.hxp", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run compile command");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Compiled "), "unexpected stdout: {stdout}");

    let c = std::fs::read_to_string(dir.path().join("add.c")).unwrap();
    assert!(c.contains("int main(int argc, char* argv[]) {"));
    assert!(c.contains(r#"hi \"there\""#));
    let header = std::fs::read_to_string(dir.path().join("hyp_runtime.h")).unwrap();
    assert!(header.contains("hyp_value_t hyp_value_boolean(bool value);"));
}

#[test]
fn test_compile_js_to_stdout() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("add.hxp"), PROGRAM).unwrap();

    let output = cargo_bin()
        .args(["compile", "add.hxp", "-t", "js", "--stdout", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run compile command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("function add(a, b)"), "unexpected stdout: {stdout}");
    assert!(!dir.path().join("add.js").exists());
}

#[test]
fn test_compile_json_reports_output_path() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("add.hxp"), PROGRAM).unwrap();

    let output = cargo_bin()
        .args(["compile", "add.hxp", "--target", "javascript", "-o", "out.js", "--json", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run compile command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value =
        serde_json::from_str(&stdout).expect("Output should be valid JSON");

    assert_eq!(json["ok"], true);
    assert_eq!(json["target"], "javascript");
    assert!(json["output"].as_str().unwrap().ends_with("out.js"));
    assert!(dir.path().join("out.js").exists());
}

#[test]
fn test_compile_json_parse_error() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("bad.hxp"), "let = 1;\nprint(1);\nlet x = ;\n").unwrap();

    let output = cargo_bin()
        .args(["compile", "bad.hxp", "--json", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run compile command");

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value =
        serde_json::from_str(&stdout).expect("Output should be valid JSON");

    assert_eq!(json["ok"], false);
    assert_eq!(json["error"]["code"], "PARSE_ERROR");
    let message = json["error"]["message"].as_str().unwrap();
    assert!(message.starts_with("[line 1:5] Error at '='"), "{message}");
    assert_eq!(message.lines().count(), 2);
    assert!(!dir.path().join("bad.c").exists());
}

#[test]
fn test_compile_unsupported_target_error_code() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("add.hxp"), PROGRAM).unwrap();

    let output = cargo_bin()
        .args(["compile", "add.hxp", "-t", "llvm", "--json", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run compile command");

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value =
        serde_json::from_str(&stdout).expect("Output should be valid JSON");

    let code = json["error"]["code"].as_str().unwrap();
    assert_eq!(code, "TARGET_UNSUPPORTED");
    assert!(
        code.chars().all(|c| c.is_ascii_uppercase() || c == '_'),
        "Error code should be SCREAMING_SNAKE_CASE"
    );
    assert!(!dir.path().join("add.ll").exists());
}

#[test]
fn test_compile_unknown_target_is_usage_error() {
    let output = cargo_bin()
        .args(["compile", "add.hxp", "-t", "wasm"])
        .output()
        .expect("Failed to run compile command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown target 'wasm'"), "stderr: {stderr}");
}

#[test]
fn test_compile_uses_project_config_target() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("add.hxp"), PROGRAM).unwrap();
    std::fs::write(dir.path().join("hxp.json"), r#"{ "target": "js" }"#).unwrap();

    let output = cargo_bin()
        .args(["compile", "add.hxp", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run compile command");

    assert!(output.status.success());
    assert!(dir.path().join("add.js").exists());
    assert!(!dir.path().join("add.c").exists());
}
