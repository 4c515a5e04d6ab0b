//! C backend.
//!
//! Output stays dynamically typed: every slot is a `hyp_value_t` and every
//! operator is a call into the companion runtime declared by
//! [`C_RUNTIME_HEADER`](super::C_RUNTIME_HEADER). Builtins take the runtime
//! handle `hyp_rt`, which `main` creates. Top-level variables become file-scope statics, top-level statements run
//! in `hyp_program_init()`, and a user `main` is renamed `hyp_user_main` so
//! the generated `int main` can set up the runtime around it.

use super::{escape_string, format_number, Codegen, Target, C_RUNTIME_HEADER_NAME};
use crate::ast::*;

/// Names that are fine in Hyper but reserved in C.
const C_RESERVED: &[&str] = &[
    "auto", "bool", "char", "do", "double", "extern", "float", "goto", "inline", "int", "long",
    "register", "restrict", "short", "signed", "sizeof", "static", "switch", "typedef", "union",
    "unsigned", "void", "volatile", "NULL",
];

/// Hyper builtin and the runtime function implementing it.
const BUILTINS: &[(&str, &str)] = &[
    ("print", "hyp_builtin_print"),
    ("typeof", "hyp_builtin_typeof"),
    ("len", "hyp_builtin_length"),
];

/// Runtime handle passed to builtins.
const RUNTIME_VAR: &str = "hyp_rt";

impl Codegen {
    pub(super) fn emit_c_program(&mut self, program: &Program<'_>) {
        for line in self.header_lines() {
            self.emit_line(&format!("/* {line} */"));
        }
        for include in ["<stdio.h>", "<stdlib.h>", "<stdbool.h>", "<string.h>"] {
            self.emit_line(&format!("#include {include}"));
        }
        self.emit_line(&format!("#include \"{C_RUNTIME_HEADER_NAME}\""));
        self.emit_line("");
        self.emit_line(&format!("static hyp_runtime_t* {RUNTIME_VAR};"));
        self.emit_line("");

        // Prototypes, so definition order never matters.
        let functions: Vec<&Function<'_>> = program.functions().collect();
        for func in &functions {
            let signature = self.c_signature(func);
            self.emit_line(&format!("{signature};"));
        }
        if !functions.is_empty() {
            self.emit_line("");
        }

        let mut has_globals = false;
        for stmt in program.stmts {
            if let StmtKind::Var { name, .. } = stmt.kind {
                self.emit_line(&format!("static hyp_value_t {};", self.c_name(name)));
                has_globals = true;
            }
        }
        if has_globals {
            self.emit_line("");
        }

        for func in &functions {
            self.emit_c_function(func);
            self.emit_line("");
        }

        self.emit_line("void hyp_program_init(void) {");
        self.indent();
        for stmt in program.stmts {
            match stmt.kind {
                StmtKind::Function(_) => {}
                StmtKind::Var { name, init, .. } => {
                    let value = self.c_init(init);
                    self.emit_line(&format!("{} = {value};", self.c_name(name)));
                }
                _ => self.emit_c_stmt(stmt),
            }
        }
        self.dedent();
        self.emit_line("}");
        self.emit_line("");

        self.emit_line("int main(int argc, char* argv[]) {");
        self.indent();
        self.emit_line("(void)argc;");
        self.emit_line("(void)argv;");
        self.emit_line(&format!("{RUNTIME_VAR} = hyp_runtime_create();"));
        self.emit_line(&format!("if (!{RUNTIME_VAR}) return 1;"));
        self.emit_line("hyp_program_init();");
        if self.global_function("main") {
            self.emit_line("hyp_user_main();");
        }
        self.emit_line(&format!("hyp_runtime_destroy({RUNTIME_VAR});"));
        self.emit_line("return 0;");
        self.dedent();
        self.emit_line("}");
    }

    fn c_signature(&self, func: &Function<'_>) -> String {
        let name = func.name.map_or_else(|| "hyp_lambda".to_string(), |n| self.c_name(n));
        let params = if func.params.is_empty() {
            "void".to_string()
        } else {
            func.params
                .iter()
                .map(|p| format!("hyp_value_t {}", self.c_name(p.name)))
                .collect::<Vec<_>>()
                .join(", ")
        };
        format!("hyp_value_t {name}({params})")
    }

    fn emit_c_function(&mut self, func: &Function<'_>) {
        let signature = self.c_signature(func);
        let saved = self.enter_function(func);

        self.emit_line(&format!("{signature} {{"));
        self.indent();
        for param in func.params {
            if let Some(default) = &param.default {
                let name = self.c_name(param.name);
                let value = self.c_expr(default);
                self.emit_line(&format!("if (hyp_value_is_null({name})) {name} = {value};"));
            }
        }
        for stmt in func.body {
            self.emit_c_stmt(stmt);
        }
        self.emit_line("return hyp_value_null();");
        self.dedent();
        self.emit_line("}");

        self.leave_function(saved);
    }

    // =========================================================================
    // Statement Emission
    // =========================================================================

    fn emit_c_stmt(&mut self, stmt: &Stmt<'_>) {
        match stmt.kind {
            StmtKind::Expr(expr) => {
                let code = self.c_expr(&expr);
                self.emit_line(&format!("{code};"));
            }
            StmtKind::Var { kind, name, ty, init } => {
                let value = self.c_init(init);
                self.define(name, ty.map(|t| t.to_string()));
                let qualifier = if kind == VarKind::Const { "const " } else { "" };
                self.emit_line(&format!("{qualifier}hyp_value_t {} = {value};", self.c_name(name)));
            }
            StmtKind::Block(stmts) => {
                self.emit_line("{");
                self.emit_c_block(stmts);
                self.emit_line("}");
            }
            StmtKind::If {
                test,
                consequent,
                alternate,
            } => self.emit_c_if(&test, consequent, alternate),
            StmtKind::While { test, body } => {
                let test = self.c_expr(&test);
                self.emit_line(&format!("while (hyp_value_is_truthy({test})) {{"));
                self.emit_c_body(body);
                self.emit_line("}");
            }
            StmtKind::Return(arg) => {
                if self.in_function {
                    let value = arg.map_or_else(|| "hyp_value_null()".to_string(), |e| self.c_expr(&e));
                    self.emit_line(&format!("return {value};"));
                } else {
                    // Top-level code lives in a void function.
                    if let Some(arg) = arg {
                        let value = self.c_expr(&arg);
                        self.emit_line(&format!("(void){value};"));
                    }
                    self.emit_line("return;");
                }
            }
            StmtKind::Break => self.emit_line("break;"),
            StmtKind::Continue => self.emit_line("continue;"),
            StmtKind::Empty => {}
            StmtKind::Function(_) | StmtKind::For { .. } => {
                self.emit_line(&format!("/* unsupported: {} */", stmt.kind.name()));
            }
        }
    }

    fn emit_c_block(&mut self, stmts: &[Stmt<'_>]) {
        self.indent();
        let mark = self.enter_block();
        for stmt in stmts {
            self.emit_c_stmt(stmt);
        }
        self.leave_block(mark);
        self.dedent();
    }

    /// Body of a braced construct; the caller emits the braces.
    fn emit_c_body(&mut self, body: &Stmt<'_>) {
        match body.kind {
            StmtKind::Block(stmts) => self.emit_c_block(stmts),
            _ => self.emit_c_block(std::slice::from_ref(body)),
        }
    }

    fn emit_c_if(&mut self, test: &Expr<'_>, consequent: &Stmt<'_>, alternate: Option<&Stmt<'_>>) {
        let test = self.c_expr(test);
        self.emit_line(&format!("if (hyp_value_is_truthy({test})) {{"));
        self.emit_c_body(consequent);

        let mut alternate = alternate;
        while let Some(alt) = alternate {
            match alt.kind {
                StmtKind::If {
                    test,
                    consequent,
                    alternate: next,
                } => {
                    let test = self.c_expr(&test);
                    self.emit_line(&format!("}} else if (hyp_value_is_truthy({test})) {{"));
                    self.emit_c_body(consequent);
                    alternate = next;
                }
                _ => {
                    self.emit_line("} else {");
                    self.emit_c_body(alt);
                    alternate = None;
                }
            }
        }
        self.emit_line("}");
    }

    // =========================================================================
    // Expression Emission
    // =========================================================================

    fn c_init(&self, init: Option<Expr<'_>>) -> String {
        init.map_or_else(|| "hyp_value_null()".to_string(), |e| self.c_expr(&e))
    }

    fn c_expr(&self, expr: &Expr<'_>) -> String {
        match expr.kind {
            ExprKind::Null => "hyp_value_null()".to_string(),
            ExprKind::Bool(b) => format!("hyp_value_boolean({b})"),
            ExprKind::Number(n) => format!("hyp_value_number({})", c_number(n)),
            ExprKind::String(s) => format!("hyp_value_string(\"{}\")", escape_string(s, Target::C)),
            ExprKind::Ident(name) => self.c_name(name),
            ExprKind::Array([]) => "hyp_value_array(0)".to_string(),
            ExprKind::Array(items) => {
                let items: Vec<String> = items.iter().map(|item| self.c_expr(item)).collect();
                format!("hyp_array_from({}, {})", c_values(&items), items.len())
            }
            ExprKind::Object([]) => "hyp_value_object()".to_string(),
            ExprKind::Object(props) => {
                let keys: Vec<String> = props
                    .iter()
                    .map(|prop| format!("\"{}\"", escape_string(prop.key, Target::C)))
                    .collect();
                let values: Vec<String> = props.iter().map(|prop| self.c_expr(&prop.value)).collect();
                format!(
                    "hyp_object_from((const char*[]){{{}}}, {}, {})",
                    keys.join(", "),
                    c_values(&values),
                    props.len()
                )
            }
            ExprKind::Lambda(_) => "hyp_value_null() /* unsupported: Lambda */".to_string(),
            ExprKind::Unary { op, arg } => {
                format!("{}({})", c_unary_helper(op), self.c_expr(arg))
            }
            ExprKind::Update { op, arg } => {
                let value = c_binary(op.binary(), &self.c_expr(arg), "hyp_value_number(1)");
                self.c_store(arg, value)
            }
            ExprKind::Binary { op, left, right } => c_binary(op, &self.c_expr(left), &self.c_expr(right)),
            ExprKind::Assign { op, target, value } => {
                let value = self.c_expr(value);
                let value = match op.binary() {
                    Some(op) => c_binary(op, &self.c_expr(target), &value),
                    None => value,
                };
                self.c_store(target, value)
            }
            ExprKind::Conditional {
                test,
                consequent,
                alternate,
            } => format!(
                "(hyp_value_is_truthy({}) ? {} : {})",
                self.c_expr(test),
                self.c_expr(consequent),
                self.c_expr(alternate)
            ),
            ExprKind::Call { callee, args } => self.c_call(callee, args),
            ExprKind::Member { object, property } => format!(
                "hyp_value_get_member({}, \"{}\")",
                self.c_expr(object),
                escape_string(property, Target::C)
            ),
            ExprKind::Index { object, index } => format!(
                "hyp_value_get_index({}, {})",
                self.c_expr(object),
                self.c_expr(index)
            ),
        }
    }

    /// Store `value` into an assignment target.
    fn c_store(&self, target: &Expr<'_>, value: String) -> String {
        match target.kind {
            ExprKind::Ident(name) => format!("({} = {value})", self.c_name(name)),
            ExprKind::Member { object, property } => format!(
                "hyp_value_set_member({}, \"{}\", {value})",
                self.c_expr(object),
                escape_string(property, Target::C)
            ),
            ExprKind::Index { object, index } => format!(
                "hyp_value_set_index({}, {}, {value})",
                self.c_expr(object),
                self.c_expr(index)
            ),
            _ => format!("{value} /* unsupported: assignment to {} */", target.kind.name()),
        }
    }

    fn c_call(&self, callee: &Expr<'_>, args: &[Expr<'_>]) -> String {
        let mut args: Vec<String> = args.iter().map(|arg| self.c_expr(arg)).collect();

        if let ExprKind::Ident(name) = callee.kind {
            let builtin = BUILTINS.iter().find(|(hyper, _)| *hyper == name);
            if let Some((_, runtime_fn)) = builtin.filter(|_| !self.is_declared(name)) {
                return format!("{runtime_fn}({RUNTIME_VAR}, {}, {})", c_args(&args), args.len());
            }
            if let Some(arity) = self.global_arity(name) {
                // C needs the exact parameter count.
                args.resize(arity, "hyp_value_null()".to_string());
                return format!("{}({})", self.c_name(name), args.join(", "));
            }
        }

        format!("hyp_value_call({}, {}, {})", self.c_expr(callee), c_args(&args), args.len())
    }

    fn c_name(&self, name: &str) -> String {
        if name == "main" && self.global_function("main") {
            "hyp_user_main".to_string()
        } else if C_RESERVED.contains(&name) {
            format!("{name}_")
        } else {
            name.to_string()
        }
    }
}

fn c_number(n: f64) -> String {
    if n.is_nan() {
        "(0.0 / 0.0)".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("({sign}1.0 / 0.0)")
    } else {
        format_number(n)
    }
}

/// A `hyp_value_t[]` compound literal.
fn c_values(items: &[String]) -> String {
    format!("(hyp_value_t[]){{{}}}", items.join(", "))
}

/// Argument array for a runtime call; `NULL` when there are none.
fn c_args(args: &[String]) -> String {
    if args.is_empty() {
        "NULL".to_string()
    } else {
        c_values(args)
    }
}

fn c_binary(op: BinaryOp, left: &str, right: &str) -> String {
    let helper = match op {
        // The runtime compares with a C bool.
        BinaryOp::Eq => return format!("hyp_value_boolean(hyp_value_equals({left}, {right}))"),
        BinaryOp::NotEq => return format!("hyp_value_boolean(!hyp_value_equals({left}, {right}))"),
        BinaryOp::Add => "hyp_value_add",
        BinaryOp::Sub => "hyp_value_sub",
        BinaryOp::Mul => "hyp_value_mul",
        BinaryOp::Div => "hyp_value_div",
        BinaryOp::Mod => "hyp_value_mod",
        BinaryOp::Lt => "hyp_value_lt",
        BinaryOp::LtEq => "hyp_value_le",
        BinaryOp::Gt => "hyp_value_gt",
        BinaryOp::GtEq => "hyp_value_ge",
        BinaryOp::And => "hyp_value_and",
        BinaryOp::Or => "hyp_value_or",
    };
    format!("{helper}({left}, {right})")
}

fn c_unary_helper(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Minus => "hyp_value_neg",
        UnaryOp::Not => "hyp_value_not",
        UnaryOp::BitNot => "hyp_value_bitnot",
    }
}
