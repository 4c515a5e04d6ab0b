//! `hxp compile` command implementation.

use std::path::PathBuf;

use hxp_core::{compile, compile_file, CompileOptions, Config, Error, Target};
use miette::Result;
use serde::Serialize;
use tracing::debug;

use super::{fail, print_json};

/// Compile command action.
#[derive(Debug, Clone)]
pub struct CompileAction {
    pub file: PathBuf,
    pub output: Option<PathBuf>,
    pub target: Target,
    pub optimize: bool,
    pub debug_info: bool,
    /// Print the generated code instead of writing a file.
    pub stdout: bool,
}

#[derive(Serialize)]
struct CompileResultJson {
    ok: bool,
    input: String,
    target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

/// Run the compile command.
pub fn run(config: &Config, action: CompileAction, json: bool) -> Result<()> {
    let input = config.resolve(&action.file);
    let options = CompileOptions::default()
        .with_optimize(action.optimize)
        .with_debug_info(action.debug_info);
    debug!(input = %input.display(), target = %action.target, "compile");

    let mut result = CompileResultJson {
        ok: true,
        input: input.display().to_string(),
        target: action.target.to_string(),
        output: None,
        code: None,
    };

    if action.stdout {
        let code = match compile_to_string(&input, action.target, &options) {
            Ok(code) => code,
            Err(e) => fail(&e, json),
        };
        if json {
            result.code = Some(code);
            print_json(&result);
        } else {
            print!("{code}");
        }
        return Ok(());
    }

    let output = action.output.as_deref().map(|p| config.resolve(p));
    let written = match compile_file(&input, output.as_deref(), action.target, &options) {
        Ok(path) => path,
        Err(e) => fail(&e, json),
    };

    if json {
        result.output = Some(written.display().to_string());
        print_json(&result);
    } else {
        println!("Compiled {} -> {}", input.display(), written.display());
    }
    Ok(())
}

fn compile_to_string(
    input: &std::path::Path,
    target: Target,
    options: &CompileOptions,
) -> Result<String, Error> {
    let source = std::fs::read_to_string(input).map_err(|source| Error::ReadInput {
        path: input.to_path_buf(),
        source,
    })?;
    compile(&source, &input.display().to_string(), target, options)
}
