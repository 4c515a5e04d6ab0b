//! Running files.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use hxp_parser::bytecode::Chunk;
use hxp_parser::{Arena, Parser};
use hxp_runtime::{Interpreter, DEFAULT_MAX_CALL_DEPTH};
use tracing::{debug, info_span};

use crate::compile::read_source;
use crate::config::Config;
use crate::error::Error;

/// What a file passed to `run` contains, by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// `.hxp` source, interpreted.
    Source,
    /// `.hyb` bytecode.
    Bytecode,
    /// `.c` generated code.
    C,
}

impl FileKind {
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "hxp" => Some(Self::Source),
            "hyb" => Some(Self::Bytecode),
            "c" => Some(Self::C),
            _ => None,
        }
    }
}

/// Options for [`execute_with`].
#[derive(Debug, Clone, Copy)]
pub struct ExecuteOptions {
    pub max_call_depth: usize,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

impl ExecuteOptions {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_call_depth: config.max_call_depth,
        }
    }
}

/// Interpret Hyper source, printing to stdout.
pub fn execute(source: &str) -> Result<(), Error> {
    let stdout = io::stdout();
    execute_with(source, &ExecuteOptions::default(), &mut stdout.lock())
}

/// Interpret Hyper source, printing to `out`.
pub fn execute_with(source: &str, options: &ExecuteOptions, out: &mut dyn Write) -> Result<(), Error> {
    let arena = Arena::new();
    let program = Parser::new(&arena, source).parse()?;
    debug!(statements = program.stmts.len(), "parsed");

    let mut interpreter = Interpreter::with_output(out).with_max_call_depth(options.max_call_depth);
    interpreter.run(&program)?;
    Ok(())
}

/// Run a file by kind, printing to stdout.
pub fn run_file(path: &Path, config: &Config) -> Result<(), Error> {
    let stdout = io::stdout();
    run_file_with(path, config, &mut stdout.lock())
}

/// Run a file by kind, printing to `out`.
///
/// Only `.hxp` source runs today. `.hyb` files are checked for a valid
/// header first so a corrupt file reports that rather than the missing VM.
pub fn run_file_with(path: &Path, config: &Config, out: &mut dyn Write) -> Result<(), Error> {
    let path = config.resolve(path);
    let _span = info_span!("run", path = %path.display()).entered();

    match FileKind::from_path(&path) {
        Some(FileKind::Source) => {
            let source = read_source(&path)?;
            execute_with(&source, &ExecuteOptions::from_config(config), out)
        }
        Some(FileKind::Bytecode) => {
            let bytes = fs::read(&path).map_err(|source| Error::ReadInput {
                path: path.clone(),
                source,
            })?;
            let count = Chunk::validate_header(&bytes)?;
            debug!(instructions = count, "bytecode header ok");
            Err(Error::NotImplemented("bytecode execution"))
        }
        Some(FileKind::C) => Err(Error::NotImplemented("compiling and running C output")),
        None => Err(Error::UnknownFileType { path }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_file_kind() {
        assert_eq!(FileKind::from_path(Path::new("a.hxp")), Some(FileKind::Source));
        assert_eq!(FileKind::from_path(Path::new("dir/a.hyb")), Some(FileKind::Bytecode));
        assert_eq!(FileKind::from_path(Path::new("a.c")), Some(FileKind::C));
        assert_eq!(FileKind::from_path(Path::new("a.txt")), None);
        assert_eq!(FileKind::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn test_execute_with() {
        let mut out = Vec::new();
        execute_with("print(2 + 3 * 4);", &ExecuteOptions::default(), &mut out).unwrap();
        assert_eq!(out, b"14\n");
    }

    #[test]
    fn test_execute_with_call_depth() {
        let mut out = Vec::new();
        let options = ExecuteOptions { max_call_depth: 4 };
        let err = execute_with("fn f() { return f(); } f();", &options, &mut out).unwrap_err();
        assert_eq!(err.to_string(), "Runtime error: Maximum call depth exceeded");
    }

    #[test]
    fn test_c_not_implemented() {
        let config = Config::new(PathBuf::from("/nonexistent"));
        let err = run_file_with(Path::new("prog.c"), &config, &mut io::sink()).unwrap_err();
        assert!(matches!(err, Error::NotImplemented(_)));
    }

    #[test]
    fn test_unknown_file_type() {
        let config = Config::new(PathBuf::from("/nonexistent"));
        let err = run_file_with(Path::new("prog.py"), &config, &mut io::sink()).unwrap_err();
        assert!(matches!(err, Error::UnknownFileType { .. }));
    }
}
