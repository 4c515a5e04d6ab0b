//! Arena-allocated AST for Hyper programs.
//!
//! Every node is `Copy` and borrows its children from the parse arena, so a
//! whole tree is released in one go when the arena is dropped. Nodes are
//! never mutated after the parser builds them.

use crate::span::Span;

// =============================================================================
// Expressions
// =============================================================================

/// An expression node.
#[derive(Debug, Clone, Copy)]
pub struct Expr<'a> {
    pub kind: ExprKind<'a>,
    pub span: Span,
}

impl<'a> Expr<'a> {
    pub fn new(kind: ExprKind<'a>, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Expression kinds.
#[derive(Debug, Clone, Copy)]
pub enum ExprKind<'a> {
    // === Literals ===
    Null,
    Bool(bool),
    Number(f64),
    String(&'a str),

    // === Identifiers ===
    Ident(&'a str),

    // === Compound Expressions ===
    Array(&'a [Expr<'a>]),
    Object(&'a [Property<'a>]),
    /// Anonymous `fn (params) { body }`.
    Lambda(&'a Function<'a>),

    // === Operations ===
    Unary {
        op: UnaryOp,
        arg: &'a Expr<'a>,
    },
    /// Prefix `++x` / `--x`.
    Update {
        op: UpdateOp,
        arg: &'a Expr<'a>,
    },
    Binary {
        op: BinaryOp,
        left: &'a Expr<'a>,
        right: &'a Expr<'a>,
    },
    Assign {
        op: AssignOp,
        target: &'a Expr<'a>,
        value: &'a Expr<'a>,
    },
    Conditional {
        test: &'a Expr<'a>,
        consequent: &'a Expr<'a>,
        alternate: &'a Expr<'a>,
    },

    // === Calls and Member Access ===
    Call {
        callee: &'a Expr<'a>,
        args: &'a [Expr<'a>],
    },
    Member {
        object: &'a Expr<'a>,
        property: &'a str,
    },
    Index {
        object: &'a Expr<'a>,
        index: &'a Expr<'a>,
    },
}

impl ExprKind<'_> {
    /// Variant name, used in diagnostics and codegen placeholders.
    pub fn name(&self) -> &'static str {
        match self {
            ExprKind::Null => "Null",
            ExprKind::Bool(_) => "Bool",
            ExprKind::Number(_) => "Number",
            ExprKind::String(_) => "String",
            ExprKind::Ident(_) => "Ident",
            ExprKind::Array(_) => "Array",
            ExprKind::Object(_) => "Object",
            ExprKind::Lambda(_) => "Lambda",
            ExprKind::Unary { .. } => "Unary",
            ExprKind::Update { .. } => "Update",
            ExprKind::Binary { .. } => "Binary",
            ExprKind::Assign { .. } => "Assign",
            ExprKind::Conditional { .. } => "Conditional",
            ExprKind::Call { .. } => "Call",
            ExprKind::Member { .. } => "Member",
            ExprKind::Index { .. } => "Index",
        }
    }

    /// Whether this expression may appear on the left of `=`.
    pub fn is_assign_target(&self) -> bool {
        matches!(
            self,
            ExprKind::Ident(_) | ExprKind::Member { .. } | ExprKind::Index { .. }
        )
    }
}

/// An object literal entry: `key: value`.
#[derive(Debug, Clone, Copy)]
pub struct Property<'a> {
    pub key: &'a str,
    pub value: Expr<'a>,
    pub span: Span,
}

// =============================================================================
// Statements
// =============================================================================

/// A statement node.
#[derive(Debug, Clone, Copy)]
pub struct Stmt<'a> {
    pub kind: StmtKind<'a>,
    pub span: Span,
}

impl<'a> Stmt<'a> {
    pub fn new(kind: StmtKind<'a>, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Statement kinds.
#[derive(Debug, Clone, Copy)]
pub enum StmtKind<'a> {
    Expr(Expr<'a>),
    Var {
        kind: VarKind,
        name: &'a str,
        ty: Option<&'a Type<'a>>,
        init: Option<Expr<'a>>,
    },
    Function(&'a Function<'a>),
    Block(&'a [Stmt<'a>]),
    If {
        test: Expr<'a>,
        consequent: &'a Stmt<'a>,
        alternate: Option<&'a Stmt<'a>>,
    },
    While {
        test: Expr<'a>,
        body: &'a Stmt<'a>,
    },
    /// `for (binding in iterable) body`
    For {
        binding: &'a str,
        iterable: Expr<'a>,
        body: &'a Stmt<'a>,
    },
    Return(Option<Expr<'a>>),
    Break,
    Continue,
    Empty,
}

impl StmtKind<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            StmtKind::Expr(_) => "Expr",
            StmtKind::Var { .. } => "Var",
            StmtKind::Function(_) => "Function",
            StmtKind::Block(_) => "Block",
            StmtKind::If { .. } => "If",
            StmtKind::While { .. } => "While",
            StmtKind::For { .. } => "For",
            StmtKind::Return(_) => "Return",
            StmtKind::Break => "Break",
            StmtKind::Continue => "Continue",
            StmtKind::Empty => "Empty",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Let,
    Const,
}

impl VarKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VarKind::Let => "let",
            VarKind::Const => "const",
        }
    }
}

// =============================================================================
// Functions and Types
// =============================================================================

/// A function declaration or lambda.
#[derive(Debug, Clone, Copy)]
pub struct Function<'a> {
    /// `None` for lambdas.
    pub name: Option<&'a str>,
    pub params: &'a [Param<'a>],
    pub return_type: Option<&'a Type<'a>>,
    pub body: &'a [Stmt<'a>],
    pub span: Span,
}

/// A function parameter.
#[derive(Debug, Clone, Copy)]
pub struct Param<'a> {
    pub name: &'a str,
    pub ty: Option<&'a Type<'a>>,
    pub default: Option<Expr<'a>>,
    pub span: Span,
}

/// A type annotation. Parsed for syntax only; nothing checks it.
#[derive(Debug, Clone, Copy)]
pub struct Type<'a> {
    pub name: &'a str,
    pub is_array: bool,
    pub is_optional: bool,
    /// Element type for `T[]`.
    pub element: Option<&'a Type<'a>>,
}

impl std::fmt::Display for Type<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.element {
            Some(element) if self.is_array => write!(f, "{element}[]")?,
            _ => f.write_str(self.name)?,
        }
        if self.is_optional {
            f.write_str("?")?;
        }
        Ok(())
    }
}

// =============================================================================
// Operators
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Minus,
    Not,
    BitNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
    Increment,
    Decrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Minus => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
        }
    }
}

impl UpdateOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UpdateOp::Increment => "++",
            UpdateOp::Decrement => "--",
        }
    }

    /// The binary operator this update applies with a right operand of 1.
    pub fn binary(self) -> BinaryOp {
        match self {
            UpdateOp::Increment => BinaryOp::Add,
            UpdateOp::Decrement => BinaryOp::Sub,
        }
    }
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

impl AssignOp {
    pub fn as_str(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::AddAssign => "+=",
            AssignOp::SubAssign => "-=",
            AssignOp::MulAssign => "*=",
            AssignOp::DivAssign => "/=",
            AssignOp::ModAssign => "%=",
        }
    }

    /// The binary operator a compound assignment applies, `None` for `=`.
    pub fn binary(self) -> Option<BinaryOp> {
        match self {
            AssignOp::Assign => None,
            AssignOp::AddAssign => Some(BinaryOp::Add),
            AssignOp::SubAssign => Some(BinaryOp::Sub),
            AssignOp::MulAssign => Some(BinaryOp::Mul),
            AssignOp::DivAssign => Some(BinaryOp::Div),
            AssignOp::ModAssign => Some(BinaryOp::Mod),
        }
    }
}

// =============================================================================
// Program
// =============================================================================

/// The root of a parsed source file.
#[derive(Debug, Clone, Copy)]
pub struct Program<'a> {
    pub stmts: &'a [Stmt<'a>],
    pub span: Span,
}

impl<'a> Program<'a> {
    pub fn new(stmts: &'a [Stmt<'a>], span: Span) -> Self {
        Self { stmts, span }
    }

    /// Top-level function declarations, in source order.
    pub fn functions(&self) -> impl Iterator<Item = &'a Function<'a>> + '_ {
        self.stmts.iter().filter_map(|stmt| match stmt.kind {
            StmtKind::Function(func) => Some(func),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_display() {
        let num = Type { name: "number", is_array: false, is_optional: false, element: None };
        let arr = Type { name: "number", is_array: true, is_optional: true, element: Some(&num) };
        assert_eq!(num.to_string(), "number");
        assert_eq!(arr.to_string(), "number[]?");
    }

    #[test]
    fn test_compound_assign_maps_to_binary() {
        assert_eq!(AssignOp::Assign.binary(), None);
        assert_eq!(AssignOp::ModAssign.binary(), Some(BinaryOp::Mod));
        assert_eq!(UpdateOp::Decrement.binary(), BinaryOp::Sub);
    }
}
