use std::fmt::Write;

use hxp_parser::bytecode::FORMAT_VERSION;

/// The current version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version of the `.hyb` bytecode format this build reads and writes.
pub const BYTECODE_VERSION: u32 = FORMAT_VERSION;

/// Returns a formatted version string including build metadata if available.
#[must_use]
pub fn version_string() -> String {
    let mut s = format!("hxp {VERSION}");

    if let Some(hash) = option_env!("HXP_BUILD_GIT_HASH") {
        let _ = write!(s, " ({hash})");
    }

    s
}
