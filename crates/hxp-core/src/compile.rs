//! Source to target text.

use std::fs;
use std::path::{Path, PathBuf};

use hxp_parser::{
    codegen, Arena, CodegenError, CodegenOptions, Parser, Target, C_RUNTIME_HEADER, C_RUNTIME_HEADER_NAME,
};
use tracing::{debug, info_span, warn};

use crate::config::Config;
use crate::error::Error;

/// Options for [`compile`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CompileOptions {
    pub optimize: bool,
    pub debug_info: bool,
}

impl CompileOptions {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            optimize: config.optimize,
            debug_info: config.debug_info,
        }
    }

    #[must_use]
    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    #[must_use]
    pub fn with_debug_info(mut self, debug_info: bool) -> Self {
        self.debug_info = debug_info;
        self
    }
}

/// Compile Hyper source text to `target`.
///
/// Fails on any syntax error (with every diagnostic collected) and on
/// targets without a code generator.
pub fn compile(
    source: &str,
    filename: &str,
    target: Target,
    options: &CompileOptions,
) -> Result<String, Error> {
    let _span = info_span!("compile", filename, %target).entered();

    if !target.is_implemented() {
        return Err(CodegenError::UnsupportedTarget(target).into());
    }

    let arena = Arena::new();
    let program = Parser::new(&arena, source).parse()?;
    debug!(statements = program.stmts.len(), arena_bytes = arena.allocated_bytes(), "parsed");

    let codegen_options = CodegenOptions::new(target)
        .with_optimize(options.optimize)
        .with_debug_info(options.debug_info)
        .with_filename(filename);
    let output = codegen::generate(&program, codegen_options)?;
    debug!(bytes = output.len(), "generated");
    Ok(output)
}

/// Default output path: the input path with the target's extension.
#[must_use]
pub fn output_path(input: &Path, target: Target) -> PathBuf {
    input.with_extension(target.extension().trim_start_matches('.'))
}

/// Read `input`, compile it and write the result.
///
/// Writes to `output`, or next to the input when `None`. C output also gets
/// the runtime header it includes, in the same directory. Returns the path
/// of the generated source.
pub fn compile_file(
    input: &Path,
    output: Option<&Path>,
    target: Target,
    options: &CompileOptions,
) -> Result<PathBuf, Error> {
    let source = read_source(input)?;
    let filename = input.display().to_string();
    let text = compile(&source, &filename, target, options)?;

    let output = output.map_or_else(|| output_path(input, target), Path::to_path_buf);
    fs::write(&output, text).map_err(|source| Error::OutputWrite {
        path: output.clone(),
        source,
    })?;
    debug!(output = %output.display(), "wrote output");

    if target == Target::C {
        write_runtime_header(&output)?;
    }
    Ok(output)
}

/// Put `hyp_runtime.h` next to `c_output`. A different existing header is
/// left in place.
fn write_runtime_header(c_output: &Path) -> Result<(), Error> {
    let path = c_output.with_file_name(C_RUNTIME_HEADER_NAME);
    match fs::read_to_string(&path) {
        Ok(existing) if existing == C_RUNTIME_HEADER => return Ok(()),
        Ok(_) => {
            warn!(path = %path.display(), "keeping existing runtime header");
            return Ok(());
        }
        Err(_) => {}
    }
    fs::write(&path, C_RUNTIME_HEADER).map_err(|source| Error::OutputWrite {
        path: path.clone(),
        source,
    })?;
    debug!(header = %path.display(), "wrote runtime header");
    Ok(())
}

pub(crate) fn read_source(path: &Path) -> Result<String, Error> {
    fs::read_to_string(path).map_err(|source| Error::ReadInput {
        path: path.to_path_buf(),
        source,
    })
}
