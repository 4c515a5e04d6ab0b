//! Tree-walking evaluator.
//!
//! Statements return a [`Flow`] so `return`, `break` and `continue` unwind
//! through nested blocks and loops up to the construct that handles them.
//! Errors are ordinary `Result`s; the first one stops evaluation.

use std::io::{self, Write};
use std::mem;
use std::rc::Rc;

use hxp_parser::{BinaryOp, Expr, ExprKind, Function, Program, Stmt, StmtKind, UnaryOp, VarKind};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::builtins::Builtin;
use crate::env::{Environment, WeakEnvironment};
use crate::error::RuntimeError;
use crate::value::{Closure, Object, Value};

/// Default bound on nested calls.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 256;

const STACK_RED_ZONE: usize = 128 * 1024;
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

/// Captured-scope count that triggers the first sweep of dead entries.
const CAPTURED_SWEEP_MIN: usize = 64;

/// How a statement finished.
#[derive(Debug)]
pub enum Flow<'a> {
    Normal,
    Return(Value<'a>),
    Break,
    Continue,
}

/// An assignable location, with its object and index already evaluated.
enum Place<'a> {
    Var(&'a str),
    Member(Value<'a>, &'a str),
    Index(Value<'a>, Value<'a>),
}

/// Evaluates one program against one global scope.
///
/// `print` output goes to `W`, stdout unless another sink is supplied.
pub struct Interpreter<'a, W: Write = io::Stdout> {
    globals: Environment<'a>,
    env: Environment<'a>,
    out: W,
    depth: usize,
    max_call_depth: usize,
    /// Scopes captured by closures, cleared on drop if still alive.
    captured: FxHashMap<usize, WeakEnvironment<'a>>,
    /// Sweep dead `captured` entries once the map reaches this size.
    sweep_at: usize,
}

impl<'a> Interpreter<'a> {
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }
}

impl Default for Interpreter<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, W: Write> Interpreter<'a, W> {
    pub fn with_output(out: W) -> Self {
        let globals = Environment::new();
        for builtin in Builtin::ALL {
            globals.define(builtin.name(), Value::Builtin(builtin), false);
        }
        Self {
            env: globals.clone(),
            globals,
            out,
            depth: 0,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            captured: FxHashMap::default(),
            sweep_at: CAPTURED_SWEEP_MIN,
        }
    }

    #[must_use]
    pub fn with_max_call_depth(mut self, max_call_depth: usize) -> Self {
        self.max_call_depth = max_call_depth;
        self
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Current value of a global binding.
    pub fn global(&self, name: &str) -> Option<Value<'a>> {
        self.globals.get(name)
    }

    /// Run the top-level statements in order, then `main()` if one is defined.
    ///
    /// A top-level `return` ends the statement list early; `main` still runs.
    pub fn run(&mut self, program: &Program<'a>) -> Result<(), RuntimeError> {
        debug!(statements = program.stmts.len(), "running program");

        for stmt in program.stmts {
            if let Flow::Return(_) = self.execute(stmt)? {
                debug!("top-level return");
                break;
            }
        }

        if let Some(Value::Function(main)) = self.globals.get("main") {
            debug!("calling main");
            self.call_closure(&main, Vec::new())?;
        }

        self.out.flush()?;
        Ok(())
    }

    // =========================================================================
    // Statements
    // =========================================================================

    pub fn execute(&mut self, stmt: &Stmt<'a>) -> Result<Flow<'a>, RuntimeError> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.execute_inner(stmt))
    }

    fn execute_inner(&mut self, stmt: &Stmt<'a>) -> Result<Flow<'a>, RuntimeError> {
        match stmt.kind {
            StmtKind::Expr(expr) => {
                self.eval(&expr)?;
                Ok(Flow::Normal)
            }
            StmtKind::Var {
                kind, name, init, ..
            } => {
                let value = match init {
                    Some(init) => self.eval(&init)?,
                    None => Value::Null,
                };
                self.env.define(name, value, kind == VarKind::Const);
                Ok(Flow::Normal)
            }
            StmtKind::Function(function) => {
                let closure = self.make_closure(function);
                if let Some(name) = function.name {
                    self.env.define(name, closure, false);
                }
                Ok(Flow::Normal)
            }
            StmtKind::Block(stmts) => {
                let scope = self.env.child();
                self.with_env(scope, |this| this.execute_block(stmts))
            }
            StmtKind::If {
                test,
                consequent,
                alternate,
            } => {
                if self.eval(&test)?.is_truthy() {
                    self.execute(consequent)
                } else if let Some(alternate) = alternate {
                    self.execute(alternate)
                } else {
                    Ok(Flow::Normal)
                }
            }
            StmtKind::While { test, body } => {
                while self.eval(&test)?.is_truthy() {
                    match self.execute(body)? {
                        Flow::Break => break,
                        Flow::Normal | Flow::Continue => {}
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }
                Ok(Flow::Normal)
            }
            StmtKind::For {
                binding,
                iterable,
                body,
            } => {
                let iterable = self.eval(&iterable)?;
                for item in iterate(&iterable)? {
                    let scope = self.env.child();
                    scope.define(binding, item, false);
                    match self.with_env(scope, |this| this.execute(body))? {
                        Flow::Break => break,
                        Flow::Normal | Flow::Continue => {}
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }
                Ok(Flow::Normal)
            }
            StmtKind::Return(value) => {
                let value = match value {
                    Some(value) => self.eval(&value)?,
                    None => Value::Null,
                };
                Ok(Flow::Return(value))
            }
            StmtKind::Break => Ok(Flow::Break),
            StmtKind::Continue => Ok(Flow::Continue),
            StmtKind::Empty => Ok(Flow::Normal),
        }
    }

    /// Execute statements in the current scope until one does not finish
    /// normally.
    fn execute_block(&mut self, stmts: &[Stmt<'a>]) -> Result<Flow<'a>, RuntimeError> {
        for stmt in stmts {
            match self.execute(stmt)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    fn with_env<T>(&mut self, env: Environment<'a>, f: impl FnOnce(&mut Self) -> T) -> T {
        let previous = mem::replace(&mut self.env, env);
        let result = f(self);
        self.env = previous;
        result
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    pub fn eval(&mut self, expr: &Expr<'a>) -> Result<Value<'a>, RuntimeError> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.eval_inner(expr))
    }

    fn eval_inner(&mut self, expr: &Expr<'a>) -> Result<Value<'a>, RuntimeError> {
        match expr.kind {
            ExprKind::Null => Ok(Value::Null),
            ExprKind::Bool(b) => Ok(Value::Bool(b)),
            ExprKind::Number(n) => Ok(Value::Number(n)),
            ExprKind::String(s) => Ok(Value::string(s)),
            ExprKind::Ident(name) => Ok(self.env.get(name).unwrap_or(Value::Null)),
            ExprKind::Array(items) => {
                let items = items
                    .iter()
                    .map(|item| self.eval(item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::array(items))
            }
            ExprKind::Object(properties) => {
                let mut object = Object::new();
                for property in properties {
                    let value = self.eval(&property.value)?;
                    object.set(property.key, value);
                }
                Ok(Value::object(object))
            }
            ExprKind::Lambda(function) => Ok(self.make_closure(function)),
            ExprKind::Unary { op, arg } => {
                let value = self.eval(arg)?;
                unary(op, &value)
            }
            ExprKind::Update { op, arg } => {
                let place = self.place(arg)?;
                let current = self.load(&place)?;
                let Value::Number(n) = current else {
                    return Err(RuntimeError::InvalidOperand {
                        op: op.as_str(),
                        ty: current.type_name(),
                    });
                };
                let updated = binary(op.binary(), &Value::Number(n), &Value::Number(1.0))?;
                self.store(place, updated.clone())?;
                Ok(updated)
            }
            ExprKind::Binary {
                op: BinaryOp::And,
                left,
                right,
            } => {
                let left = self.eval(left)?;
                if left.is_truthy() {
                    self.eval(right)
                } else {
                    Ok(left)
                }
            }
            ExprKind::Binary {
                op: BinaryOp::Or,
                left,
                right,
            } => {
                let left = self.eval(left)?;
                if left.is_truthy() {
                    Ok(left)
                } else {
                    self.eval(right)
                }
            }
            ExprKind::Binary { op, left, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                binary(op, &left, &right)
            }
            ExprKind::Assign { op, target, value } => {
                let place = self.place(target)?;
                let value = match op.binary() {
                    None => self.eval(value)?,
                    Some(op) => {
                        let current = self.load(&place)?;
                        let rhs = self.eval(value)?;
                        binary(op, &current, &rhs)?
                    }
                };
                self.store(place, value.clone())?;
                Ok(value)
            }
            ExprKind::Conditional {
                test,
                consequent,
                alternate,
            } => {
                if self.eval(test)?.is_truthy() {
                    self.eval(consequent)
                } else {
                    self.eval(alternate)
                }
            }
            ExprKind::Call { callee, args } => {
                let function = match callee.kind {
                    ExprKind::Ident(name) => self
                        .env
                        .get(name)
                        .ok_or_else(|| RuntimeError::FunctionNotFound(name.to_string()))?,
                    _ => self.eval(callee)?,
                };
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                self.call(function, args)
            }
            ExprKind::Member { object, property } => {
                let object = self.eval(object)?;
                get_member(&object, property)
            }
            ExprKind::Index { object, index } => {
                let object = self.eval(object)?;
                let index = self.eval(index)?;
                get_index(&object, &index)
            }
        }
    }

    // =========================================================================
    // Calls
    // =========================================================================

    /// Call any value with already evaluated arguments.
    pub fn call(&mut self, callee: Value<'a>, args: Vec<Value<'a>>) -> Result<Value<'a>, RuntimeError> {
        match callee {
            Value::Function(closure) => self.call_closure(&closure, args),
            Value::Builtin(builtin) => {
                trace!(name = builtin.name(), args = args.len(), "native call");
                builtin.call(&args, &mut self.out)
            }
            other => Err(RuntimeError::NotCallable(other.type_name())),
        }
    }

    /// Bind parameters in a fresh scope under the closure's captured one,
    /// then run the body.
    ///
    /// Missing arguments take the parameter default, evaluated in the new
    /// scope, or null. Extra arguments are ignored.
    fn call_closure(&mut self, closure: &Closure<'a>, args: Vec<Value<'a>>) -> Result<Value<'a>, RuntimeError> {
        if self.depth >= self.max_call_depth {
            return Err(RuntimeError::CallDepthExceeded);
        }
        trace!(name = closure.name(), args = args.len(), depth = self.depth, "call");

        let function = closure.function;
        let scope = closure.env.child();
        self.depth += 1;
        let result = self.with_env(scope, |this| {
            let mut args = args.into_iter();
            for param in function.params {
                let value = match (args.next(), param.default) {
                    (Some(arg), _) => arg,
                    (None, Some(default)) => this.eval(&default)?,
                    (None, None) => Value::Null,
                };
                this.env.define(param.name, value, false);
            }
            this.execute_block(function.body)
        });
        self.depth -= 1;

        match result? {
            Flow::Return(value) => Ok(value),
            Flow::Normal | Flow::Break | Flow::Continue => Ok(Value::Null),
        }
    }

    fn make_closure(&mut self, function: &'a Function<'a>) -> Value<'a> {
        let env = self.env.clone();
        // A dead entry may share the id of a freed scope; replace it.
        self.captured.insert(env.id(), env.downgrade());
        if self.captured.len() >= self.sweep_at {
            self.captured.retain(|_, scope| scope.is_alive());
            self.sweep_at = (self.captured.len() * 2).max(CAPTURED_SWEEP_MIN);
        }
        Value::Function(Rc::new(Closure { function, env }))
    }

    // =========================================================================
    // Assignment
    // =========================================================================

    fn place(&mut self, target: &Expr<'a>) -> Result<Place<'a>, RuntimeError> {
        match target.kind {
            ExprKind::Ident(name) => Ok(Place::Var(name)),
            ExprKind::Member { object, property } => Ok(Place::Member(self.eval(object)?, property)),
            ExprKind::Index { object, index } => {
                let object = self.eval(object)?;
                let index = self.eval(index)?;
                Ok(Place::Index(object, index))
            }
            _ => Err(RuntimeError::InvalidAssignmentTarget),
        }
    }

    fn load(&self, place: &Place<'a>) -> Result<Value<'a>, RuntimeError> {
        match place {
            Place::Var(name) => Ok(self.env.get(name).unwrap_or(Value::Null)),
            Place::Member(object, property) => get_member(object, property),
            Place::Index(object, index) => get_index(object, index),
        }
    }

    fn store(&mut self, place: Place<'a>, value: Value<'a>) -> Result<(), RuntimeError> {
        match place {
            Place::Var(name) => self.env.assign(name, value),
            Place::Member(Value::Object(object), property) => {
                object.borrow_mut().set(property, value);
                Ok(())
            }
            Place::Member(other, property) => Err(RuntimeError::InvalidMemberAssignment {
                property: property.to_string(),
                ty: other.type_name(),
            }),
            Place::Index(Value::Array(items), Value::Number(n)) => {
                let mut items = items.borrow_mut();
                let len = items.len();
                match array_index(n) {
                    Some(i) if i < len => items[i] = value,
                    Some(i) if i == len => items.push(value),
                    _ => return Err(RuntimeError::IndexOutOfBounds { index: n, len }),
                }
                Ok(())
            }
            Place::Index(Value::Object(object), Value::String(key)) => {
                object.borrow_mut().set(&key, value);
                Ok(())
            }
            Place::Index(object, index) => Err(RuntimeError::InvalidIndex {
                ty: object.type_name(),
                index: index.type_name(),
            }),
        }
    }
}

impl<W: Write> Drop for Interpreter<'_, W> {
    fn drop(&mut self) {
        for env in self.captured.drain().filter_map(|(_, scope)| scope.upgrade()) {
            env.clear();
        }
        self.globals.clear();
    }
}

// =============================================================================
// Operators
// =============================================================================

fn unary<'a>(op: UnaryOp, value: &Value<'a>) -> Result<Value<'a>, RuntimeError> {
    match (op, value) {
        (UnaryOp::Not, value) => Ok(Value::Bool(!value.is_truthy())),
        (UnaryOp::Minus, Value::Number(n)) => Ok(Value::Number(-n)),
        (UnaryOp::BitNot, Value::Number(n)) => Ok(Value::Number(f64::from(!to_int32(*n)))),
        (op, value) => Err(RuntimeError::InvalidOperand {
            op: op.as_str(),
            ty: value.type_name(),
        }),
    }
}

fn binary<'a>(op: BinaryOp, left: &Value<'a>, right: &Value<'a>) -> Result<Value<'a>, RuntimeError> {
    use Value::{Number, String};

    let result = match (op, left, right) {
        (BinaryOp::Eq, l, r) => Value::Bool(l.equals(r)),
        (BinaryOp::NotEq, l, r) => Value::Bool(!l.equals(r)),
        (BinaryOp::And, l, r) => (if l.is_truthy() { r } else { l }).clone(),
        (BinaryOp::Or, l, r) => (if l.is_truthy() { l } else { r }).clone(),

        (BinaryOp::Add, Number(a), Number(b)) => Number(a + b),
        (BinaryOp::Add, String(a), String(b)) => {
            let mut s = std::string::String::with_capacity(a.len() + b.len());
            s.push_str(a);
            s.push_str(b);
            String(Rc::from(s))
        }
        (BinaryOp::Sub, Number(a), Number(b)) => Number(a - b),
        (BinaryOp::Mul, Number(a), Number(b)) => Number(a * b),
        (BinaryOp::Div | BinaryOp::Mod, Number(_), Number(b)) if *b == 0.0 => {
            return Err(RuntimeError::DivisionByZero)
        }
        (BinaryOp::Div, Number(a), Number(b)) => Number(a / b),
        (BinaryOp::Mod, Number(a), Number(b)) => Number(a % b),

        (BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq, Number(a), Number(b)) => {
            Value::Bool(compare(op, a.partial_cmp(b)))
        }
        (BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq, String(a), String(b)) => {
            Value::Bool(compare(op, Some(a.cmp(b))))
        }

        _ => return Err(RuntimeError::InvalidOperands { op: op.as_str() }),
    };
    Ok(result)
}

/// Apply a comparison operator to an ordering. Unordered (NaN) is false.
fn compare(op: BinaryOp, ordering: Option<std::cmp::Ordering>) -> bool {
    let Some(ordering) = ordering else {
        return false;
    };
    match op {
        BinaryOp::Lt => ordering.is_lt(),
        BinaryOp::LtEq => ordering.is_le(),
        BinaryOp::Gt => ordering.is_gt(),
        BinaryOp::GtEq => ordering.is_ge(),
        _ => false,
    }
}

/// Wrap to a signed 32-bit integer the way bitwise operators see numbers.
fn to_int32(n: f64) -> i32 {
    if !n.is_finite() {
        return 0;
    }
    let wrapped = n.trunc().rem_euclid(4_294_967_296.0);
    wrapped as u32 as i32
}

// =============================================================================
// Access
// =============================================================================

fn get_member<'a>(object: &Value<'a>, property: &str) -> Result<Value<'a>, RuntimeError> {
    match object {
        Value::Object(object) => Ok(object.borrow().get(property).unwrap_or(Value::Null)),
        other => Err(RuntimeError::InvalidMember {
            property: property.to_string(),
            ty: other.type_name(),
        }),
    }
}

fn get_index<'a>(object: &Value<'a>, index: &Value<'a>) -> Result<Value<'a>, RuntimeError> {
    match (object, index) {
        (Value::Array(items), Value::Number(n)) => Ok(array_index(*n)
            .and_then(|i| items.borrow().get(i).cloned())
            .unwrap_or(Value::Null)),
        (Value::Object(object), Value::String(key)) => {
            Ok(object.borrow().get(key).unwrap_or(Value::Null))
        }
        (Value::String(s), Value::Number(n)) => Ok(array_index(*n)
            .and_then(|i| s.chars().nth(i))
            .map(|c| Value::string(c.encode_utf8(&mut [0; 4])))
            .unwrap_or(Value::Null)),
        (object, index) => Err(RuntimeError::InvalidIndex {
            ty: object.type_name(),
            index: index.type_name(),
        }),
    }
}

/// A non-negative integral number as an index.
fn array_index(n: f64) -> Option<usize> {
    (n >= 0.0 && n.fract() == 0.0 && n <= usize::MAX as f64).then_some(n as usize)
}

/// The items `for … in` visits: array elements, object keys, string
/// characters. Taken as a snapshot before the loop starts.
fn iterate<'a>(value: &Value<'a>) -> Result<Vec<Value<'a>>, RuntimeError> {
    match value {
        Value::Array(items) => Ok(items.borrow().clone()),
        Value::Object(object) => Ok(object
            .borrow()
            .keys()
            .map(|key| Value::String(key.clone()))
            .collect()),
        Value::String(s) => Ok(s
            .chars()
            .map(|c| Value::string(c.encode_utf8(&mut [0; 4])))
            .collect()),
        other => Err(RuntimeError::NotIterable(other.type_name())),
    }
}
