//! hxp-core: the pipeline behind the `hxp` CLI.
//!
//! [`compile`] turns source into C or JavaScript text, [`execute`] and
//! [`run_file`] interpret it. Everything here returns [`Error`]; nothing
//! prints diagnostics or installs a log subscriber.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]

pub mod compile;
pub mod config;
pub mod error;
pub mod run;
pub mod version;

pub use compile::{compile, compile_file, output_path, CompileOptions};
pub use config::{Config, CONFIG_FILE};
pub use error::Error;
pub use hxp_parser::Target;
pub use run::{execute, execute_with, run_file, run_file_with, ExecuteOptions, FileKind};
pub use version::VERSION;
