//! JavaScript backend.
//!
//! Hyper maps almost 1:1 onto JavaScript. Equality becomes strict, `for in`
//! iterates through a helper, and the builtins come from a small prelude
//! that is only emitted for helpers the program actually calls.

use super::{escape_string, format_number, is_identifier, Codegen, Target};
use crate::ast::*;

/// Prelude functions, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(super) enum Helper {
    Print,
    Typeof,
    Len,
    Iter,
}

impl Helper {
    fn for_builtin(name: &str) -> Option<Helper> {
        match name {
            "print" => Some(Helper::Print),
            "typeof" => Some(Helper::Typeof),
            "len" => Some(Helper::Len),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Helper::Print => "__hyp_print",
            Helper::Typeof => "__hyp_typeof",
            Helper::Len => "__hyp_len",
            Helper::Iter => "__hyp_iter",
        }
    }

    fn source(self) -> &'static str {
        match self {
            Helper::Print => PRINT,
            Helper::Typeof => TYPEOF,
            Helper::Len => LEN,
            Helper::Iter => ITER,
        }
    }
}

const PRINT: &str = r#"function __hyp_print(...args) {
    const show = (v) => Array.isArray(v)
        ? "[" + v.map(show).join(", ") + "]"
        : v !== null && typeof v === "object"
            ? "{" + Object.entries(v).map(([k, x]) => k + ": " + show(x)).join(", ") + "}"
            : String(v);
    console.log(args.map(show).join(" "));
    return null;
}"#;

const TYPEOF: &str = r#"function __hyp_typeof(v) {
    if (v === null || v === undefined) return "null";
    if (Array.isArray(v)) return "array";
    return typeof v;
}"#;

const LEN: &str = r#"function __hyp_len(v) {
    if (typeof v === "string" || Array.isArray(v)) return v.length;
    if (v !== null && typeof v === "object") return Object.keys(v).length;
    throw new TypeError("len() expects a string, array or object");
}"#;

const ITER: &str = r#"function __hyp_iter(v) {
    if (typeof v === "string" || Array.isArray(v)) return v;
    if (v !== null && typeof v === "object") return Object.keys(v);
    throw new TypeError("Value is not iterable");
}"#;

/// Names that are fine in Hyper but reserved (or special) in JavaScript.
const JS_RESERVED: &[&str] = &[
    "arguments", "class", "debugger", "delete", "do", "eval", "extends", "function",
    "implements", "instanceof", "interface", "new", "package", "private", "protected", "public",
    "static", "super", "switch", "this", "typeof", "undefined", "var", "void", "with", "yield",
];

impl Codegen {
    pub(super) fn emit_js_program(&mut self, program: &Program<'_>) {
        for stmt in program.stmts {
            self.emit_js_stmt(stmt);
        }
        if self.global_function("main") {
            self.emit_line("");
            self.emit_line("main();");
        }

        // The prelude depends on what the body used, so it goes in last.
        let body = std::mem::take(&mut self.output);
        for line in self.header_lines() {
            self.emit_line(&format!("// {line}"));
        }
        self.emit_line("");
        let helpers: Vec<Helper> = self.helpers.iter().copied().collect();
        for helper in helpers {
            self.emit_line(helper.source());
            self.emit_line("");
        }
        self.output.push_str(&body);
    }

    // =========================================================================
    // Statement Emission
    // =========================================================================

    fn emit_js_stmt(&mut self, stmt: &Stmt<'_>) {
        match stmt.kind {
            StmtKind::Expr(expr) => {
                let code = match expr.kind {
                    // Bare assignments need no parentheses at statement level.
                    ExprKind::Assign { op, target, value } => format!(
                        "{} {} {}",
                        self.js_expr(target),
                        op.as_str(),
                        self.js_expr(value)
                    ),
                    // Would otherwise parse as a block or a declaration.
                    ExprKind::Object(_) | ExprKind::Lambda(_) => format!("({})", self.js_expr(&expr)),
                    _ => self.js_expr(&expr),
                };
                self.emit_line(&format!("{code};"));
            }
            StmtKind::Var { kind, name, ty, init } => {
                let value = init.map_or_else(|| "null".to_string(), |e| self.js_expr(&e));
                if self.depth > 0 {
                    self.define(name, ty.map(|t| t.to_string()));
                }
                self.emit_line(&format!("{} {} = {value};", kind.as_str(), js_name(name)));
            }
            StmtKind::Function(func) => {
                if self.depth > 0 {
                    if let Some(name) = func.name {
                        self.define(name, Some("fn".to_string()));
                    }
                }
                let code = self.js_function(func);
                self.emit_line(&code);
            }
            StmtKind::Block(stmts) => {
                self.emit_line("{");
                self.emit_js_block(stmts);
                self.emit_line("}");
            }
            StmtKind::If {
                test,
                consequent,
                alternate,
            } => self.emit_js_if(&test, consequent, alternate),
            StmtKind::While { test, body } => {
                let test = self.js_expr(&test);
                self.emit_line(&format!("while ({test}) {{"));
                self.emit_js_body(body);
                self.emit_line("}");
            }
            StmtKind::For {
                binding,
                iterable,
                body,
            } => {
                self.helpers.insert(Helper::Iter);
                let iterable = self.js_expr(&iterable);
                self.emit_line(&format!(
                    "for (let {} of {}({iterable})) {{",
                    js_name(binding),
                    Helper::Iter.name()
                ));
                let mark = self.enter_block();
                self.define(binding, None);
                self.emit_js_body(body);
                self.leave_block(mark);
                self.emit_line("}");
            }
            StmtKind::Return(arg) => {
                if self.in_function {
                    match arg {
                        Some(arg) => {
                            let value = self.js_expr(&arg);
                            self.emit_line(&format!("return {value};"));
                        }
                        None => self.emit_line("return;"),
                    }
                } else {
                    self.emit_line("/* unsupported: top-level Return */");
                }
            }
            StmtKind::Break => self.emit_line("break;"),
            StmtKind::Continue => self.emit_line("continue;"),
            StmtKind::Empty => {}
        }
    }

    fn emit_js_block(&mut self, stmts: &[Stmt<'_>]) {
        self.indent();
        let mark = self.enter_block();
        for stmt in stmts {
            self.emit_js_stmt(stmt);
        }
        self.leave_block(mark);
        self.dedent();
    }

    fn emit_js_body(&mut self, body: &Stmt<'_>) {
        match body.kind {
            StmtKind::Block(stmts) => self.emit_js_block(stmts),
            _ => self.emit_js_block(std::slice::from_ref(body)),
        }
    }

    fn emit_js_if(&mut self, test: &Expr<'_>, consequent: &Stmt<'_>, alternate: Option<&Stmt<'_>>) {
        let test = self.js_expr(test);
        self.emit_line(&format!("if ({test}) {{"));
        self.emit_js_body(consequent);

        let mut alternate = alternate;
        while let Some(alt) = alternate {
            match alt.kind {
                StmtKind::If {
                    test,
                    consequent,
                    alternate: next,
                } => {
                    let test = self.js_expr(&test);
                    self.emit_line(&format!("}} else if ({test}) {{"));
                    self.emit_js_body(consequent);
                    alternate = next;
                }
                _ => {
                    self.emit_line("} else {");
                    self.emit_js_body(alt);
                    alternate = None;
                }
            }
        }
        self.emit_line("}");
    }

    /// `function name(params) { ... }` as text. The body is indented one
    /// level deeper than the current line; the closing brace is not.
    fn js_function(&mut self, func: &Function<'_>) -> String {
        let saved = self.enter_function(func);

        let mut params = Vec::with_capacity(func.params.len());
        for param in func.params {
            let name = js_name(param.name);
            match &param.default {
                Some(default) => params.push(format!("{name} = {}", self.js_expr(default))),
                None => params.push(name),
            }
        }

        let outer = std::mem::take(&mut self.output);
        self.emit_js_block(func.body);
        let body = std::mem::replace(&mut self.output, outer);
        self.leave_function(saved);

        let head = match func.name {
            Some(name) => format!("function {}", js_name(name)),
            None => "function ".to_string(),
        };
        let closing = self.options.indent.repeat(self.indent_level);
        format!("{head}({}) {{\n{body}{closing}}}", params.join(", "))
    }

    // =========================================================================
    // Expression Emission
    // =========================================================================

    fn js_expr(&mut self, expr: &Expr<'_>) -> String {
        match expr.kind {
            ExprKind::Null => "null".to_string(),
            ExprKind::Bool(b) => b.to_string(),
            ExprKind::Number(n) => js_number(n),
            ExprKind::String(s) => format!("\"{}\"", escape_string(s, Target::JavaScript)),
            ExprKind::Ident(name) => js_name(name),
            ExprKind::Array(items) => {
                let items: Vec<String> = items.iter().map(|item| self.js_expr(item)).collect();
                format!("[{}]", items.join(", "))
            }
            ExprKind::Object(props) => {
                if props.is_empty() {
                    return "{}".to_string();
                }
                let mut entries = Vec::with_capacity(props.len());
                for prop in props {
                    let key = if is_identifier(prop.key) {
                        prop.key.to_string()
                    } else {
                        format!("\"{}\"", escape_string(prop.key, Target::JavaScript))
                    };
                    entries.push(format!("{key}: {}", self.js_expr(&prop.value)));
                }
                format!("{{ {} }}", entries.join(", "))
            }
            ExprKind::Lambda(func) => self.js_function(func),
            ExprKind::Unary { op, arg } => format!("({}{})", op.as_str(), self.js_expr(arg)),
            ExprKind::Update { op, arg } => format!("({}{})", op.as_str(), self.js_expr(arg)),
            ExprKind::Binary { op, left, right } => {
                let op = match op {
                    BinaryOp::Eq => "===",
                    BinaryOp::NotEq => "!==",
                    op => op.as_str(),
                };
                format!("({} {op} {})", self.js_expr(left), self.js_expr(right))
            }
            ExprKind::Assign { op, target, value } => format!(
                "({} {} {})",
                self.js_expr(target),
                op.as_str(),
                self.js_expr(value)
            ),
            ExprKind::Conditional {
                test,
                consequent,
                alternate,
            } => format!(
                "({} ? {} : {})",
                self.js_expr(test),
                self.js_expr(consequent),
                self.js_expr(alternate)
            ),
            ExprKind::Call { callee, args } => {
                let callee = self.js_callee(callee);
                let args: Vec<String> = args.iter().map(|arg| self.js_expr(arg)).collect();
                format!("{callee}({})", args.join(", "))
            }
            ExprKind::Member { object, property } => {
                format!("{}.{property}", self.js_object(object))
            }
            ExprKind::Index { object, index } => {
                format!("{}[{}]", self.js_object(object), self.js_expr(index))
            }
        }
    }

    fn js_callee(&mut self, callee: &Expr<'_>) -> String {
        match callee.kind {
            ExprKind::Ident(name) if !self.is_declared(name) => match Helper::for_builtin(name) {
                Some(helper) => {
                    self.helpers.insert(helper);
                    helper.name().to_string()
                }
                None => js_name(name),
            },
            ExprKind::Lambda(_) => format!("({})", self.js_expr(callee)),
            _ => self.js_object(callee),
        }
    }

    /// The left side of `.`, `[]` or a call.
    fn js_object(&mut self, object: &Expr<'_>) -> String {
        let code = self.js_expr(object);
        match object.kind {
            ExprKind::Number(_) | ExprKind::Object(_) | ExprKind::Lambda(_) => format!("({code})"),
            _ => code,
        }
    }
}

fn js_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{sign}Infinity")
    } else {
        format_number(n)
    }
}

fn js_name(name: &str) -> String {
    if JS_RESERVED.contains(&name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
}
