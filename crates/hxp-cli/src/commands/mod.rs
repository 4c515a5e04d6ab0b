//! Subcommand implementations.

pub mod ast;
pub mod compile;
pub mod run;
pub mod tokens;
pub mod version;

use hxp_core::Error;
use hxp_parser::CodegenError;
use serde::Serialize;

/// Error payload shared by every `--json` failure.
#[derive(Debug, Serialize)]
pub struct ErrorJson {
    pub code: &'static str,
    pub message: String,
}

impl ErrorJson {
    pub fn from_error(err: &Error) -> Self {
        Self {
            code: error_code(err),
            message: err.to_string(),
        }
    }
}

#[derive(Serialize)]
struct FailureJson {
    ok: bool,
    error: ErrorJson,
}

/// Stable machine-readable code for an error.
pub fn error_code(err: &Error) -> &'static str {
    match err {
        Error::Io(_) => "IO_ERROR",
        Error::ConfigRead { .. } | Error::ConfigParse { .. } => "CONFIG_INVALID",
        Error::ReadInput { .. } => "INPUT_READ_FAILED",
        Error::OutputWrite { .. } => "OUTPUT_WRITE_FAILED",
        Error::Parse(_) => "PARSE_ERROR",
        Error::Codegen(CodegenError::UnsupportedTarget(_)) => "TARGET_UNSUPPORTED",
        Error::Codegen(CodegenError::UnknownTarget(_)) => "TARGET_UNKNOWN",
        Error::Runtime(_) => "RUNTIME_ERROR",
        Error::Bytecode(_) => "BYTECODE_INVALID",
        Error::UnknownFileType { .. } => "FILE_TYPE_UNKNOWN",
        Error::NotImplemented(_) => "NOT_IMPLEMENTED",
        Error::Other(_) => "INTERNAL_ERROR",
    }
}

/// Report `err` and exit with status 1.
///
/// With `json`, prints `{"ok": false, "error": {...}}` to stdout; otherwise
/// prints the message to stderr.
pub fn fail(err: &Error, json: bool) -> ! {
    if json {
        let result = FailureJson {
            ok: false,
            error: ErrorJson::from_error(err),
        };
        print_json(&result);
    } else {
        eprintln!("{}", error_line(err));
    }
    std::process::exit(1);
}

/// Plain-text form of a failure, as printed to stderr.
fn error_line(err: &Error) -> String {
    format!("Error: {err}")
}

pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("Error: failed to serialize output: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hxp_parser::Target;

    #[test]
    fn test_error_codes_are_screaming_snake_case() {
        let errors = [
            Error::NotImplemented("bytecode execution"),
            Error::Codegen(CodegenError::UnsupportedTarget(Target::Llvm)),
            Error::Codegen(CodegenError::UnknownTarget("wasm".to_string())),
            Error::other("boom"),
        ];
        for err in &errors {
            let code = error_code(err);
            assert!(
                code.chars().all(|c| c.is_ascii_uppercase() || c == '_'),
                "{code} is not SCREAMING_SNAKE_CASE"
            );
        }
    }

    #[test]
    fn test_error_line_prefix() {
        let line = error_line(&Error::NotImplemented("bytecode execution"));
        assert_eq!(line, "Error: bytecode execution is not implemented yet");
    }

    #[test]
    fn test_error_json_message() {
        let json = ErrorJson::from_error(&Error::NotImplemented("bytecode execution"));
        assert_eq!(json.code, "NOT_IMPLEMENTED");
        assert_eq!(json.message, "bytecode execution is not implemented yet");
    }
}
