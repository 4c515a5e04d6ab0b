//! hxp-runtime: tree-walking interpreter for Hyper programs.
//!
//! Values are reference counted. Arrays and objects are shared and mutable,
//! scopes form a chain of `Rc` frames, and closures hold their defining
//! frame. Frames captured by closures are cleared when the [`Interpreter`]
//! is dropped, so closure/scope cycles do not outlive a run.
//!
//! ```
//! use hxp_parser::{Arena, Parser};
//! use hxp_runtime::Interpreter;
//!
//! let arena = Arena::new();
//! let program = Parser::new(&arena, "print(2 + 3 * 4);").parse().unwrap();
//! let mut out = Vec::new();
//! Interpreter::with_output(&mut out).run(&program).unwrap();
//! assert_eq!(out, b"14\n");
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]

pub mod builtins;
pub mod env;
pub mod error;
pub mod interpreter;
pub mod value;

pub use builtins::Builtin;
pub use env::{Environment, WeakEnvironment};
pub use error::RuntimeError;
pub use interpreter::{Flow, Interpreter, DEFAULT_MAX_CALL_DEPTH};
pub use value::{format_number, Closure, Object, Value};
