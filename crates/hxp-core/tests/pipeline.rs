//! File-level pipeline tests.

use std::fs;
use std::path::Path;

use hxp_core::{compile_file, run_file_with, CompileOptions, Config, Error, Target};
use hxp_parser::bytecode::{Chunk, OpCode};
use hxp_parser::C_RUNTIME_HEADER;

const PROGRAM: &str = r#"
fn square(n) { return n * n; }
fn main() {
    print("square:", square(7));
}
"#;

#[test]
fn test_run_source_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("prog.hxp"), PROGRAM).unwrap();

    let config = Config::new(dir.path().to_path_buf());
    let mut out = Vec::new();
    run_file_with(Path::new("prog.hxp"), &config, &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "square: 49\n");
}

#[test]
fn test_run_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::new(dir.path().to_path_buf());
    let err = run_file_with(Path::new("absent.hxp"), &config, &mut Vec::new()).unwrap_err();
    assert!(matches!(err, Error::ReadInput { .. }));
}

#[test]
fn test_run_reports_syntax_errors() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("bad.hxp"), "let = 1;\nprint(1);\nlet x = ;\n").unwrap();
    let config = Config::new(dir.path().to_path_buf());
    let mut out = Vec::new();
    let err = run_file_with(Path::new("bad.hxp"), &config, &mut out).unwrap_err();
    let Error::Parse(errors) = &err else {
        panic!("expected parse errors, got {err}");
    };
    assert_eq!(errors.len(), 2);
    assert!(err.to_string().starts_with("[line 1:5] Error at '='"));
    assert!(out.is_empty());
}

#[test]
fn test_run_bytecode_checks_header() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::new(dir.path().to_path_buf());

    let mut chunk = Chunk::new();
    chunk.emit(OpCode::Halt, 0);
    fs::write(dir.path().join("ok.hyb"), chunk.encode()).unwrap();
    let err = run_file_with(Path::new("ok.hyb"), &config, &mut Vec::new()).unwrap_err();
    assert!(matches!(err, Error::NotImplemented("bytecode execution")));

    fs::write(dir.path().join("bad.hyb"), b"nope").unwrap();
    let err = run_file_with(Path::new("bad.hyb"), &config, &mut Vec::new()).unwrap_err();
    assert!(matches!(err, Error::Bytecode(_)));
}

#[test]
fn test_compile_file_default_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("prog.hxp");
    fs::write(&input, PROGRAM).unwrap();

    let written = compile_file(&input, None, Target::JavaScript, &CompileOptions::default()).unwrap();
    assert_eq!(written, dir.path().join("prog.js"));
    let js = fs::read_to_string(&written).unwrap();
    assert!(js.contains("function square(n) {"));
    assert!(js.trim_end().ends_with("main();"));
}

#[test]
fn test_compile_file_explicit_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("prog.hxp");
    let output = dir.path().join("out.c");
    fs::write(&input, PROGRAM).unwrap();

    let written = compile_file(&input, Some(&output), Target::C, &CompileOptions::default()).unwrap();
    assert_eq!(written, output);
    let c = fs::read_to_string(&output).unwrap();
    assert!(c.contains("hyp_user_main"));
    assert!(c.contains("#include \"hyp_runtime.h\""));
    let header = fs::read_to_string(dir.path().join("hyp_runtime.h")).unwrap();
    assert_eq!(header, C_RUNTIME_HEADER);
}

#[test]
fn test_compile_file_keeps_existing_runtime_header() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("prog.hxp");
    fs::write(&input, PROGRAM).unwrap();
    let header = dir.path().join("hyp_runtime.h");
    fs::write(&header, "/* local runtime */\n").unwrap();

    compile_file(&input, None, Target::C, &CompileOptions::default()).unwrap();
    assert_eq!(fs::read_to_string(&header).unwrap(), "/* local runtime */\n");
    assert!(dir.path().join("prog.c").exists());
}

#[test]
fn test_compile_file_javascript_has_no_header() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("prog.hxp");
    fs::write(&input, PROGRAM).unwrap();

    compile_file(&input, None, Target::JavaScript, &CompileOptions::default()).unwrap();
    assert!(!dir.path().join("hyp_runtime.h").exists());
}

#[test]
fn test_compile_file_unwritable_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("prog.hxp");
    fs::write(&input, PROGRAM).unwrap();
    let output = dir.path().join("missing-dir").join("out.c");

    let err = compile_file(&input, Some(&output), Target::C, &CompileOptions::default()).unwrap_err();
    assert!(matches!(err, Error::OutputWrite { .. }));
}
