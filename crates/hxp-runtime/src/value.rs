//! Runtime values.
//!
//! Scalars are stored inline. Strings are immutable `Rc<str>`; arrays and
//! objects are shared, mutable `Rc<RefCell<_>>` so that assignment through
//! one reference is visible through every other, and equality on them is
//! identity.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use hxp_parser::Function;

use crate::builtins::Builtin;
use crate::env::Environment;

/// A Hyper value.
#[derive(Clone)]
pub enum Value<'a> {
    Null,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Array(Rc<RefCell<Vec<Value<'a>>>>),
    Object(Rc<RefCell<Object<'a>>>),
    Function(Rc<Closure<'a>>),
    Builtin(Builtin),
}

impl<'a> Value<'a> {
    pub fn string(s: &str) -> Self {
        Value::String(Rc::from(s))
    }

    pub fn array(items: Vec<Value<'a>>) -> Self {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn object(object: Object<'a>) -> Self {
        Value::Object(Rc::new(RefCell::new(object)))
    }

    /// The name `typeof` reports.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) | Value::Builtin(_) => "function",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) | Value::Function(_) | Value::Builtin(_) => true,
        }
    }

    /// `==`: same kind, then value equality for scalars and strings,
    /// identity for everything else.
    pub fn equals(&self, other: &Value<'a>) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Array(items) => write!(f, "Array(len={})", items.borrow().len()),
            Value::Object(object) => write!(f, "Object(len={})", object.borrow().len()),
            Value::Function(closure) => write!(f, "Function({})", closure.name()),
            Value::Builtin(builtin) => write!(f, "Builtin({})", builtin.name()),
        }
    }
}

/// The text `print` writes.
///
/// Arrays and objects render their contents; a container reached again
/// while it is already being rendered prints as `[Circular]`.
impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self, &mut Vec::new())
    }
}

fn write_value(f: &mut fmt::Formatter<'_>, value: &Value<'_>, seen: &mut Vec<usize>) -> fmt::Result {
    match value {
        Value::Null => f.write_str("null"),
        Value::Bool(b) => write!(f, "{b}"),
        Value::Number(n) => f.write_str(&format_number(*n)),
        Value::String(s) => f.write_str(s),
        Value::Array(items) => {
            let id = Rc::as_ptr(items) as usize;
            if seen.contains(&id) {
                return f.write_str("[Circular]");
            }
            seen.push(id);
            f.write_str("[")?;
            for (i, item) in items.borrow().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_value(f, item, seen)?;
            }
            seen.pop();
            f.write_str("]")
        }
        Value::Object(object) => {
            let id = Rc::as_ptr(object) as usize;
            if seen.contains(&id) {
                return f.write_str("[Circular]");
            }
            seen.push(id);
            f.write_str("{")?;
            for (i, (key, value)) in object.borrow().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{key}: ")?;
                write_value(f, value, seen)?;
            }
            seen.pop();
            f.write_str("}")
        }
        Value::Function(closure) => write!(f, "[Function {}]", closure.name()),
        Value::Builtin(builtin) => write!(f, "[Native Function {}]", builtin.name()),
    }
}

/// Format a number like C's `%g`: six significant digits, trailing zeros
/// removed, scientific notation below `1e-4` and from `1e6` up.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "nan".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if n == 0.0 {
        return if n.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    const PRECISION: i32 = 6;

    // Round to the target precision first; the exponent of the rounded
    // value decides the style.
    let sci = format!("{:.*e}", (PRECISION - 1) as usize, n);
    let (mantissa, exponent) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if exponent < -4 || exponent >= PRECISION {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", strip_zeros(mantissa), exponent.abs())
    } else {
        let decimals = (PRECISION - 1 - exponent) as usize;
        strip_zeros(&format!("{n:.decimals$}")).to_string()
    }
}

fn strip_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// An insertion-ordered property list with an optional prototype link.
#[derive(Default)]
pub struct Object<'a> {
    properties: Vec<(Rc<str>, Value<'a>)>,
    prototype: Option<Rc<RefCell<Object<'a>>>>,
}

impl<'a> Object<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty object whose lookups fall back to `prototype`.
    ///
    /// No Hyper expression creates a prototype link; this is for hosts that
    /// build objects before handing them to a program.
    pub fn with_prototype(prototype: Rc<RefCell<Object<'a>>>) -> Self {
        Self {
            properties: Vec::new(),
            prototype: Some(prototype),
        }
    }

    /// Look up `key` here, then along the prototype chain.
    pub fn get(&self, key: &str) -> Option<Value<'a>> {
        if let Some(value) = self.get_own(key) {
            return Some(value);
        }
        let mut next = self.prototype.clone();
        while let Some(proto) = next {
            let proto = proto.borrow();
            if let Some(value) = proto.get_own(key) {
                return Some(value);
            }
            next = proto.prototype.clone();
        }
        None
    }

    pub fn get_own(&self, key: &str) -> Option<Value<'a>> {
        self.properties
            .iter()
            .find(|(k, _)| &**k == key)
            .map(|(_, v)| v.clone())
    }

    /// Insert or overwrite an own property. New keys keep insertion order.
    pub fn set(&mut self, key: &str, value: Value<'a>) {
        if let Some(slot) = self.properties.iter_mut().find(|(k, _)| &**k == key) {
            slot.1 = value;
        } else {
            self.properties.push((Rc::from(key), value));
        }
    }

    /// Own property count.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn keys(&self) -> Keys<'_, 'a> {
        self.properties
            .iter()
            .map(entry_key as for<'e> fn(&'e (Rc<str>, Value<'a>)) -> &'e Rc<str>)
    }

    /// Own properties in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, (Rc<str>, Value<'a>)> {
        self.properties.iter()
    }
}

/// Iterator over an object's own keys.
pub type Keys<'s, 'a> =
    std::iter::Map<std::slice::Iter<'s, (Rc<str>, Value<'a>)>, for<'e> fn(&'e (Rc<str>, Value<'a>)) -> &'e Rc<str>>;

fn entry_key<'s>(entry: &'s (Rc<str>, Value<'_>)) -> &'s Rc<str> {
    &entry.0
}

/// A function value: the declaration plus the environment it was created in.
pub struct Closure<'a> {
    pub function: &'a Function<'a>,
    pub env: Environment<'a>,
}

impl Closure<'_> {
    pub fn name(&self) -> &str {
        self.function.name.unwrap_or("<lambda>")
    }
}
