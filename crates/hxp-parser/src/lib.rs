//! hxp-parser: front end and code generator for the Hyper language (`.hxp`).
//!
//! # Pipeline
//!
//! 1. **Lexing on demand.** The [`Lexer`] is pulled by the parser one token
//!    at a time. It carries a small amount of state so that `<` after an
//!    operand is a comparison and `<` in operand position opens a JSX
//!    element.
//!
//! 2. **Arena-based AST.** Every node lives in an [`Arena`] (a bump
//!    allocator). Nodes hold `&'a` references into it and are `Copy`;
//!    dropping the arena frees the whole tree at once.
//!
//! 3. **Error recovery.** The [`Parser`] reports the first error of a
//!    statement, then skips to the next statement boundary and keeps going,
//!    so one pass yields every independent syntax error.
//!
//! 4. **Code generation.** [`codegen::generate`] emits C (against the
//!    `hyp_runtime.h` value API) or JavaScript text from the tree.
//!
//! # Example
//!
//! ```
//! use hxp_parser::{codegen, Arena, CodegenOptions, Parser, Target};
//!
//! let arena = Arena::new();
//! let program = Parser::new(&arena, "let x = 1 + 2;").parse().unwrap();
//! let js = codegen::generate(&program, CodegenOptions::new(Target::JavaScript)).unwrap();
//! assert!(js.contains("let x = (1 + 2);"));
//! ```

mod arena;
mod ast;
mod lexer;
mod parser;
mod span;
mod token;

pub mod bytecode;
pub mod codegen;

pub use arena::{Arena, Vec};
pub use ast::*;
pub use codegen::{CodegenError, CodegenOptions, Symbol, Target, C_RUNTIME_HEADER, C_RUNTIME_HEADER_NAME};
pub use lexer::{tokenize, Lexer};
pub use parser::{ErrorLocation, ParseError, ParseErrors, Parser, MAX_NESTING};
pub use span::{LineIndex, Span};
pub use token::{keyword_from_str, Token, TokenKind};

/// Parse `source` into `arena`.
pub fn parse<'a>(arena: &'a Arena, source: &'a str) -> Result<Program<'a>, ParseErrors> {
    Parser::new(arena, source).parse()
}
