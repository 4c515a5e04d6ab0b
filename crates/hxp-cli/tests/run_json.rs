//! Integration tests for `hxp run`.

use std::process::Command;
use tempfile::tempdir;

fn cargo_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO"));
    cmd.args(["run", "-p", "hxp-cli", "--bin", "hxp", "--"]);
    cmd
}

fn run_json(dir: &std::path::Path, file: &str) -> (bool, serde_json::Value) {
    let output = cargo_bin()
        .args(["run", file, "--json", "--cwd"])
        .arg(dir)
        .output()
        .expect("Failed to run run command");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json = serde_json::from_str(&stdout).expect("Output should be valid JSON");
    (output.status.success(), json)
}

#[test]
fn test_run_prints_program_output() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("counter.hxp"),
        r"
fn make_counter() {
    let count = 0;
    return fn() {
        count = count + 1;
        return count;
    };
}

fn main() {
    let next = make_counter();
    next();
    next();
    print(next());
}
",
    )
    .unwrap();

    let output = cargo_bin()
        .args(["run", "counter.hxp", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run run command");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "3\n");
}

#[test]
fn test_run_json_captures_stdout() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("hello.hxp"), r#"print("hello", 1 + 2);"#).unwrap();

    let (success, json) = run_json(dir.path(), "hello.hxp");

    assert!(success);
    assert_eq!(json["ok"], true);
    assert_eq!(json["stdout"], "hello 3\n");
    assert!(json.get("error").is_none());
}

#[test]
fn test_run_json_runtime_error_keeps_output() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("div.hxp"), "print(1);\nprint(1 / 0);\n").unwrap();

    let (success, json) = run_json(dir.path(), "div.hxp");

    assert!(!success);
    assert_eq!(json["ok"], false);
    assert_eq!(json["stdout"], "1\n");
    assert_eq!(json["error"]["code"], "RUNTIME_ERROR");
    assert_eq!(json["error"]["message"], "Runtime error: Division by zero");
}

#[test]
fn test_run_missing_file() {
    let dir = tempdir().unwrap();

    let (success, json) = run_json(dir.path(), "nope.hxp");

    assert!(!success);
    assert_eq!(json["error"]["code"], "INPUT_READ_FAILED");
}

#[test]
fn test_run_bytecode_not_implemented() {
    let dir = tempdir().unwrap();
    let mut bytes = b"HYB\0".to_vec();
    bytes.extend_from_slice(&1u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    std::fs::write(dir.path().join("prog.hyb"), bytes).unwrap();

    let (success, json) = run_json(dir.path(), "prog.hyb");

    assert!(!success);
    assert_eq!(json["error"]["code"], "NOT_IMPLEMENTED");
}

#[test]
fn test_run_unknown_file_type() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();

    let output = cargo_bin()
        .args(["run", "notes.txt", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run run command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown file type"), "stderr: {stderr}");
}

#[test]
fn test_run_respects_max_call_depth_config() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("hxp.json"), r#"{ "maxCallDepth": 4 }"#).unwrap();
    std::fs::write(
        dir.path().join("deep.hxp"),
        "fn down(n) { if (n == 0) { return 0; } return down(n - 1); }\nprint(down(10));\n",
    )
    .unwrap();

    let (success, json) = run_json(dir.path(), "deep.hxp");

    assert!(!success);
    assert_eq!(json["error"]["message"], "Runtime error: Maximum call depth exceeded");
}
