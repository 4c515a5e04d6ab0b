use hxp_core::version::{version_string, BYTECODE_VERSION};
use hxp_core::VERSION;
use miette::Result;
use serde::Serialize;

use super::print_json;

#[derive(Serialize)]
struct VersionJson {
    name: &'static str,
    version: &'static str,
    bytecode_version: u32,
}

pub fn run(json: bool) -> Result<()> {
    if json {
        print_json(&VersionJson {
            name: "hxp",
            version: VERSION,
            bytecode_version: BYTECODE_VERSION,
        });
    } else {
        println!("{}", version_string());
    }
    Ok(())
}
