use thiserror::Error;

/// An error that stops evaluation.
///
/// Output written before the error stays written.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Division by zero")]
    DivisionByZero,

    #[error("Invalid operands for binary operator '{op}'")]
    InvalidOperands { op: &'static str },

    #[error("Invalid operand for unary operator '{op}': {ty}")]
    InvalidOperand { op: &'static str, ty: &'static str },

    #[error("Function '{0}' not found")]
    FunctionNotFound(String),

    #[error("Value of type {0} is not callable")]
    NotCallable(&'static str),

    #[error("{name} expects exactly {expected} argument{}", plural(.expected))]
    BuiltinArity { name: &'static str, expected: usize },

    #[error("{name} can only be called on {accepts}")]
    BuiltinArgument {
        name: &'static str,
        accepts: &'static str,
    },

    #[error("Cannot assign to constant '{0}'")]
    ConstAssignment(String),

    #[error("Invalid assignment target")]
    InvalidAssignmentTarget,

    #[error("Cannot read property '{property}' of {ty}")]
    InvalidMember { property: String, ty: &'static str },

    #[error("Cannot set property '{property}' on {ty}")]
    InvalidMemberAssignment { property: String, ty: &'static str },

    #[error("Cannot index {ty} with {index}")]
    InvalidIndex {
        ty: &'static str,
        index: &'static str,
    },

    #[error("Array index {index} out of bounds (length {len})")]
    IndexOutOfBounds { index: f64, len: usize },

    #[error("Value of type {0} is not iterable")]
    NotIterable(&'static str),

    #[error("Maximum call depth exceeded")]
    CallDepthExceeded,

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

fn plural(n: &usize) -> &'static str {
    if *n == 1 {
        ""
    } else {
        "s"
    }
}
