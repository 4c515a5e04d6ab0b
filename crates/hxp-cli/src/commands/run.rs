//! `hxp run` command implementation.

use std::path::Path;

use hxp_core::{run_file, run_file_with, Config};
use miette::Result;
use serde::Serialize;

use super::{fail, print_json, ErrorJson};

#[derive(Serialize)]
struct RunResultJson {
    ok: bool,
    file: String,
    /// Everything the program printed, including output before a failure.
    stdout: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorJson>,
}

/// Run the run command.
pub fn run(config: &Config, file: &Path, json: bool) -> Result<()> {
    if !json {
        if let Err(e) = run_file(file, config) {
            fail(&e, false);
        }
        return Ok(());
    }

    let mut captured = Vec::new();
    let outcome = run_file_with(file, config, &mut captured);
    let result = RunResultJson {
        ok: outcome.is_ok(),
        file: config.resolve(file).display().to_string(),
        stdout: String::from_utf8_lossy(&captured).into_owned(),
        error: outcome.as_ref().err().map(ErrorJson::from_error),
    };
    print_json(&result);
    if !result.ok {
        std::process::exit(1);
    }
    Ok(())
}
