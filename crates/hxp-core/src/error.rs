use std::path::PathBuf;

use hxp_parser::bytecode::BytecodeError;
use hxp_parser::{CodegenError, ParseErrors};
use hxp_runtime::RuntimeError;
use thiserror::Error;

/// Core error type for hxp operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not read file {path}: {source}")]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not write output file {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Parse(#[from] ParseErrors),

    #[error(transparent)]
    Codegen(#[from] CodegenError),

    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("Invalid bytecode: {0}")]
    Bytecode(#[from] BytecodeError),

    #[error("Unknown file type: {path} (expected .hxp, .hyb or .c)")]
    UnknownFileType { path: PathBuf },

    #[error("{0} is not implemented yet")]
    NotImplemented(&'static str),

    #[error("{0}")]
    Other(String),
}

impl Error {
    #[must_use]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}
