//! Native functions bound in the global scope.

use std::io::Write;

use crate::error::RuntimeError;
use crate::value::Value;

/// A native function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Print,
    Typeof,
    Len,
}

impl Builtin {
    pub const ALL: [Builtin; 3] = [Builtin::Print, Builtin::Typeof, Builtin::Len];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Print => "print",
            Builtin::Typeof => "typeof",
            Builtin::Len => "len",
        }
    }

    pub fn call<'a>(self, args: &[Value<'a>], out: &mut dyn Write) -> Result<Value<'a>, RuntimeError> {
        match self {
            Builtin::Print => print(args, out),
            Builtin::Typeof => type_of(args),
            Builtin::Len => len(args),
        }
    }
}

/// Write the arguments separated by spaces, then a newline.
fn print<'a>(args: &[Value<'a>], out: &mut dyn Write) -> Result<Value<'a>, RuntimeError> {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.write_all(b" ")?;
        }
        write!(out, "{arg}")?;
    }
    out.write_all(b"\n")?;
    Ok(Value::Null)
}

fn type_of<'a>(args: &[Value<'a>]) -> Result<Value<'a>, RuntimeError> {
    let [value] = args else {
        return Err(RuntimeError::BuiltinArity {
            name: "typeof",
            expected: 1,
        });
    };
    Ok(Value::string(value.type_name()))
}

fn len<'a>(args: &[Value<'a>]) -> Result<Value<'a>, RuntimeError> {
    let [value] = args else {
        return Err(RuntimeError::BuiltinArity {
            name: "len",
            expected: 1,
        });
    };
    let n = match value {
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.borrow().len(),
        Value::Object(object) => object.borrow().len(),
        _ => {
            return Err(RuntimeError::BuiltinArgument {
                name: "len",
                accepts: "strings, arrays, or objects",
            })
        }
    };
    Ok(Value::Number(n as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Object;

    #[test]
    fn test_print_joins_with_spaces() {
        let mut out = Vec::new();
        Builtin::Print
            .call(
                &[Value::Number(14.0), Value::string("hi"), Value::Bool(true), Value::Null],
                &mut out,
            )
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "14 hi true null\n");
    }

    #[test]
    fn test_print_no_args() {
        let mut out = Vec::new();
        Builtin::Print.call(&[], &mut out).unwrap();
        assert_eq!(out, b"\n");
    }

    #[test]
    fn test_typeof() {
        let mut sink = Vec::new();
        let cases = [
            (Value::Null, "null"),
            (Value::Bool(false), "boolean"),
            (Value::Number(1.0), "number"),
            (Value::string("s"), "string"),
            (Value::array(Vec::new()), "array"),
            (Value::object(Object::new()), "object"),
            (Value::Builtin(Builtin::Len), "function"),
        ];
        for (value, expected) in cases {
            let result = Builtin::Typeof.call(&[value], &mut sink).unwrap();
            assert!(matches!(result, Value::String(s) if &*s == expected));
        }
    }

    #[test]
    fn test_len() {
        let mut sink = Vec::new();
        let n = |v: Value<'static>, sink: &mut Vec<u8>| match Builtin::Len.call(&[v], sink) {
            Ok(Value::Number(n)) => n,
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(n(Value::string("hello"), &mut sink), 5.0);
        assert_eq!(n(Value::string("héllo"), &mut sink), 5.0);
        assert_eq!(n(Value::array(Vec::new()), &mut sink), 0.0);
    }

    #[test]
    fn test_len_errors() {
        let mut sink = Vec::new();
        let err = Builtin::Len.call(&[], &mut sink).unwrap_err();
        assert_eq!(err.to_string(), "len expects exactly 1 argument");
        let err = Builtin::Len
            .call(&[Value::Null, Value::Null], &mut sink)
            .unwrap_err();
        assert_eq!(err.to_string(), "len expects exactly 1 argument");
        let err = Builtin::Len.call(&[Value::Number(3.0)], &mut sink).unwrap_err();
        assert_eq!(
            err.to_string(),
            "len can only be called on strings, arrays, or objects"
        );
    }
}
