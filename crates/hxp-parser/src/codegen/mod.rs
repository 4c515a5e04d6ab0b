//! Code generator.
//!
//! Converts a parsed [`Program`] into C or JavaScript source text. Generation
//! is purely syntax directed: no type checking, no name resolution beyond a
//! lexically scoped symbol table used to spot a user-defined `main` and
//! builtins shadowed at the point of a call. Constructs a target cannot express are replaced by a
//! `/* unsupported: Kind */` placeholder rather than failing the whole file.
//!
//! Output depends only on the AST and the options, so generating twice from
//! the same tree yields identical text.

mod c;
mod js;

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ast::*;

/// File name generated C `#include`s for the runtime API.
pub const C_RUNTIME_HEADER_NAME: &str = "hyp_runtime.h";

/// Declarations of every runtime function generated C calls. Written next
/// to compiled C output as [`C_RUNTIME_HEADER_NAME`].
pub const C_RUNTIME_HEADER: &str = include_str!("hyp_runtime.h");

/// Output language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// C source against the `hyp_runtime.h` value API.
    #[default]
    C,
    /// Self-contained JavaScript.
    #[serde(alias = "js")]
    JavaScript,
    /// `.hyb` bytecode (format only, no generator yet).
    Bytecode,
    #[serde(alias = "asm")]
    Assembly,
    Llvm,
}

impl Target {
    /// Whether code generation exists for this target.
    pub fn is_implemented(self) -> bool {
        matches!(self, Target::C | Target::JavaScript)
    }

    /// File extension (with the dot) of generated output.
    pub fn extension(self) -> &'static str {
        match self {
            Target::C => ".c",
            Target::JavaScript => ".js",
            Target::Bytecode => ".hyb",
            Target::Assembly => ".s",
            Target::Llvm => ".ll",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Target::C => "c",
            Target::JavaScript => "javascript",
            Target::Bytecode => "bytecode",
            Target::Assembly => "assembly",
            Target::Llvm => "llvm",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = CodegenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "c" => Ok(Target::C),
            "js" | "javascript" => Ok(Target::JavaScript),
            "bytecode" => Ok(Target::Bytecode),
            "asm" | "assembly" => Ok(Target::Assembly),
            "llvm" => Ok(Target::Llvm),
            _ => Err(CodegenError::UnknownTarget(s.to_string())),
        }
    }
}

/// Code generation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodegenError {
    #[error("unsupported target: {0} code generation is not implemented")]
    UnsupportedTarget(Target),

    #[error("unknown target '{0}' (expected c, js, bytecode, asm or llvm)")]
    UnknownTarget(String),
}

/// Code generation options.
#[derive(Debug, Clone)]
pub struct CodegenOptions {
    pub target: Target,
    /// One level of indentation.
    pub indent: String,
    /// Accepted and recorded in the output header; no passes run yet.
    pub optimize: bool,
    /// Emit a `source:` header comment naming the input file.
    pub debug_info: bool,
    /// Input file name, used by `debug_info`.
    pub filename: Option<String>,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            target: Target::C,
            indent: "    ".to_string(),
            optimize: false,
            debug_info: false,
            filename: None,
        }
    }
}

impl CodegenOptions {
    #[must_use]
    pub fn new(target: Target) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
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

    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

/// A declared name. The table keeps every declaration in order; which of
/// them are in scope is tracked separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    /// Annotated or literal-inferred type, if any.
    pub ty: Option<String>,
    /// 0 for top-level declarations.
    pub depth: u32,
}

/// Generate target source for a whole program.
pub fn generate(program: &Program<'_>, options: CodegenOptions) -> Result<String, CodegenError> {
    Codegen::new(options).generate(program)
}

/// The code generator.
pub struct Codegen {
    options: CodegenOptions,
    /// Output buffer.
    output: String,
    /// Current indentation level.
    indent_level: usize,
    symbols: Vec<Symbol>,
    /// Indices of the function and block locals currently in scope.
    scope: Vec<usize>,
    /// Index of the top-level symbol for each name.
    globals: FxHashMap<String, usize>,
    /// Parameter count of each top-level function.
    arity: FxHashMap<String, usize>,
    /// JavaScript prelude helpers referenced so far.
    helpers: BTreeSet<js::Helper>,
    depth: u32,
    /// Inside a function body (as opposed to top-level code).
    in_function: bool,
}

impl Codegen {
    /// Create a new code generator.
    pub fn new(options: CodegenOptions) -> Self {
        Self {
            options,
            output: String::new(),
            indent_level: 0,
            symbols: Vec::new(),
            scope: Vec::new(),
            globals: FxHashMap::default(),
            arity: FxHashMap::default(),
            helpers: BTreeSet::new(),
            depth: 0,
            in_function: false,
        }
    }

    /// Generate source for `program` in the configured target.
    pub fn generate(mut self, program: &Program<'_>) -> Result<String, CodegenError> {
        self.declare_globals(program);
        match self.options.target {
            Target::C => self.emit_c_program(program),
            Target::JavaScript => self.emit_js_program(program),
            target => return Err(CodegenError::UnsupportedTarget(target)),
        }
        Ok(self.output)
    }

    /// Symbols recorded so far.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    // =========================================================================
    // Output Helpers
    // =========================================================================

    fn emit(&mut self, s: &str) {
        self.output.push_str(s);
    }

    fn emit_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.output.push_str(&self.options.indent);
        }
    }

    /// Indented, newline-terminated line. An empty line carries no indent.
    fn emit_line(&mut self, s: &str) {
        if !s.is_empty() {
            self.emit_indent();
        }
        self.output.push_str(s);
        self.output.push('\n');
    }

    fn indent(&mut self) {
        self.indent_level += 1;
    }

    fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    /// Header comment lines shared by both targets (without comment markers).
    fn header_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("Generated by hxp ({})", self.options.target)];
        if self.options.debug_info {
            let source = self.options.filename.as_deref().unwrap_or("<input>");
            lines.push(format!("source: {source}"));
        }
        if self.options.optimize {
            lines.push("optimize: on".to_string());
        }
        lines
    }

    // =========================================================================
    // Symbols
    // =========================================================================

    fn define(&mut self, name: &str, ty: Option<String>) {
        let index = self.symbols.len();
        self.symbols.push(Symbol {
            name: name.to_string(),
            ty,
            depth: self.depth,
        });
        if self.depth == 0 {
            self.globals.insert(name.to_string(), index);
        } else {
            self.scope.push(index);
        }
    }

    fn is_global(&self, name: &str) -> bool {
        self.globals.contains_key(name)
    }

    fn global_function(&self, name: &str) -> bool {
        self.globals
            .get(name)
            .map_or(false, |&i| self.symbols[i].ty.as_deref() == Some("fn"))
    }

    fn global_arity(&self, name: &str) -> Option<usize> {
        if self.global_function(name) {
            self.arity.get(name).copied()
        } else {
            None
        }
    }

    /// A top-level name, or a local visible from the code being emitted.
    fn is_declared(&self, name: &str) -> bool {
        self.is_global(name) || self.scope.iter().any(|&i| self.symbols[i].name == name)
    }

    /// Open a block: locals defined until the matching `leave_block` go out
    /// of scope there.
    fn enter_block(&mut self) -> usize {
        self.depth += 1;
        self.scope.len()
    }

    fn leave_block(&mut self, mark: usize) {
        self.scope.truncate(mark);
        self.depth -= 1;
    }

    /// Record every top-level function and variable before emitting.
    fn declare_globals(&mut self, program: &Program<'_>) {
        for stmt in program.stmts {
            match stmt.kind {
                StmtKind::Function(func) => {
                    if let Some(name) = func.name {
                        self.define(name, Some("fn".to_string()));
                        self.arity.insert(name.to_string(), func.params.len());
                    }
                }
                StmtKind::Var { name, ty, init, .. } => {
                    let ty = ty.map(|t| t.to_string()).or_else(|| init.and_then(|e| literal_type(&e)));
                    self.define(name, ty);
                }
                _ => {}
            }
        }
    }

    /// Enter a function body: parameters become locals one level down.
    fn enter_function(&mut self, func: &Function<'_>) -> FunctionScope {
        let saved = FunctionScope {
            depth: self.depth,
            in_function: self.in_function,
            scope_len: self.scope.len(),
        };
        self.depth += 1;
        self.in_function = true;
        for param in func.params {
            self.define(param.name, param.ty.map(|t| t.to_string()));
        }
        saved
    }

    fn leave_function(&mut self, saved: FunctionScope) {
        self.scope.truncate(saved.scope_len);
        self.depth = saved.depth;
        self.in_function = saved.in_function;
    }
}

/// Generator state restored when a function body ends.
struct FunctionScope {
    depth: u32,
    in_function: bool,
    scope_len: usize,
}

/// Type name for a literal initializer.
fn literal_type(expr: &Expr<'_>) -> Option<String> {
    let name = match expr.kind {
        ExprKind::Null => "null",
        ExprKind::Bool(_) => "bool",
        ExprKind::Number(_) => "number",
        ExprKind::String(_) => "string",
        ExprKind::Array(_) => "array",
        ExprKind::Object(_) => "object",
        ExprKind::Lambda(_) => "fn",
        _ => return None,
    };
    Some(name.to_string())
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Shortest decimal form that reads back as the same `f64`.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{n:.0}")
    } else {
        let s = format!("{n}");
        let exp = format!("{n:e}");
        if exp.len() < s.len() {
            exp
        } else {
            s
        }
    }
}

/// Escape string contents for a double-quoted literal in `target`.
fn escape_string(s: &str, target: Target) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            // Octal escapes are always three digits in C so they never run
            // into a following digit; JavaScript gets \u escapes instead.
            c if c.is_control() && target == Target::C && (c as u32) < 0x100 => {
                result.push_str(&format!("\\{:03o}", c as u32));
            }
            c if c.is_control() => {
                result.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => result.push(c),
        }
    }
    result
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::parser::Parser;

    fn generate_source(source: &str, options: CodegenOptions) -> Result<String, CodegenError> {
        let arena = Arena::new();
        let program = Parser::new(&arena, source).parse().unwrap();
        generate(&program, options)
    }

    #[test]
    fn test_target_from_str() {
        assert_eq!("c".parse::<Target>().unwrap(), Target::C);
        assert_eq!("js".parse::<Target>().unwrap(), Target::JavaScript);
        assert_eq!("JavaScript".parse::<Target>().unwrap(), Target::JavaScript);
        assert_eq!("asm".parse::<Target>().unwrap(), Target::Assembly);
        assert_eq!("llvm".parse::<Target>().unwrap(), Target::Llvm);
        assert!(matches!("wasm".parse::<Target>(), Err(CodegenError::UnknownTarget(_))));
    }

    #[test]
    fn test_target_extension() {
        assert_eq!(Target::C.extension(), ".c");
        assert_eq!(Target::JavaScript.extension(), ".js");
        assert_eq!(Target::Bytecode.extension(), ".hyb");
        assert_eq!(Target::Assembly.extension(), ".s");
        assert_eq!(Target::Llvm.extension(), ".ll");
    }

    #[test]
    fn test_unimplemented_targets_fail() {
        for target in [Target::Bytecode, Target::Assembly, Target::Llvm] {
            let result = generate_source("let x = 1;", CodegenOptions::new(target));
            assert_eq!(result, Err(CodegenError::UnsupportedTarget(target)));
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let source = r#"
            let a = { z: 1, y: 2, x: [1, 2, 3] };
            fn helper(n) { return n * 2; }
            fn main() { print(helper(len(a.x)), typeof(a)); for (k in a) print(k); }
        "#;
        for target in [Target::C, Target::JavaScript] {
            let first = generate_source(source, CodegenOptions::new(target)).unwrap();
            let second = generate_source(source, CodegenOptions::new(target)).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_debug_info_header() {
        let output = generate_source(
            "let x = 1;",
            CodegenOptions::new(Target::JavaScript)
                .with_debug_info(true)
                .with_filename("demo.hxp"),
        )
        .unwrap();
        assert!(output.contains("source: demo.hxp"));
    }

    #[test]
    fn test_custom_indent() {
        let output = generate_source(
            "fn f() { return 1; }",
            CodegenOptions::new(Target::JavaScript).with_indent("\t"),
        )
        .unwrap();
        assert!(output.contains("\n\treturn 1;\n"));
    }

    #[test]
    fn test_symbol_table_records_globals() {
        let arena = Arena::new();
        let program = Parser::new(&arena, "let n: number = 1; let s = \"x\"; fn main() {}")
            .parse()
            .unwrap();
        let mut codegen = Codegen::new(CodegenOptions::default());
        codegen.declare_globals(&program);
        let symbols: Vec<_> = codegen
            .symbols()
            .iter()
            .map(|s| (s.name.as_str(), s.ty.as_deref(), s.depth))
            .collect();
        assert_eq!(
            symbols,
            vec![
                ("n", Some("number"), 0),
                ("s", Some("string"), 0),
                ("main", Some("fn"), 0),
            ]
        );
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(0.1), "0.1");
        assert_eq!(format_number(1e21), "1e21");
        assert_eq!(format_number(2.5e-7), "2.5e-7");
    }

    #[test]
    fn test_escape_string() {
        assert_eq!(escape_string("a\"b\\c\n", Target::C), "a\\\"b\\\\c\\n");
        assert_eq!(escape_string("\u{1}7", Target::C), "\\0017");
        assert_eq!(escape_string("\u{1}7", Target::JavaScript), "\\u00017");
    }
}
