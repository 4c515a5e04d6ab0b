//! End-to-end programs through the public API.

use hxp_parser::{Arena, Parser};
use hxp_runtime::{Interpreter, RuntimeError, Value};

fn run(source: &str) -> Result<String, RuntimeError> {
    let arena = Arena::new();
    let program = Parser::new(&arena, source).parse().expect("parse failed");
    let mut out = Vec::new();
    Interpreter::with_output(&mut out).run(&program)?;
    Ok(String::from_utf8(out).expect("utf-8 output"))
}

#[test]
fn test_fibonacci() {
    let out = run(r#"
        fn fib(n) {
            if (n <= 1) { return n; }
            return fib(n - 1) + fib(n - 2);
        }
        let results = [];
        let i = 0;
        while (i < 10) {
            results[i] = fib(i);
            i += 1;
        }
        print(results);
    "#)
    .unwrap();
    assert_eq!(out, "[0, 1, 1, 2, 3, 5, 8, 13, 21, 34]\n");
}

#[test]
fn test_objects_and_loops() {
    let out = run(r#"
        let inventory = { apples: 3, pears: 0, plums: 12 };
        let stocked = [];
        for (name in inventory) {
            if (inventory[name] > 0) {
                stocked[len(stocked)] = name;
            }
        }
        print("stocked:", stocked, len(stocked));
    "#)
    .unwrap();
    assert_eq!(out, "stocked: [apples, plums] 2\n");
}

#[test]
fn test_higher_order_functions() {
    let out = run(r#"
        fn map(xs, f) {
            let out = [];
            for (x in xs) { out[len(out)] = f(x); }
            return out;
        }
        fn adder(n) { return fn(x) { return x + n; }; }
        print(map([1, 2, 3], adder(10)));
        print(map(["a", "b"], fn(s) { return s + s; }));
    "#)
    .unwrap();
    assert_eq!(out, "[11, 12, 13]\n[aa, bb]\n");
}

#[test]
fn test_number_output() {
    let out = run("print(1 / 3, 2.5e10, 0.1 + 0.2, -7);").unwrap();
    assert_eq!(out, "0.333333 2.5e+10 0.3 -7\n");
}

#[test]
fn test_error_keeps_earlier_output() {
    let arena = Arena::new();
    let program = Parser::new(&arena, r#"print("one"); print(len(1)); print("two");"#)
        .parse()
        .unwrap();
    let mut out = Vec::new();
    let err = Interpreter::with_output(&mut out).run(&program).unwrap_err();
    assert_eq!(out, b"one\n");
    assert!(matches!(err, RuntimeError::BuiltinArgument { name: "len", .. }));
}

#[test]
fn test_globals_visible_after_run() {
    let arena = Arena::new();
    let program = Parser::new(&arena, "let total = 0; for (x in [1, 2, 3]) { total += x; }")
        .parse()
        .unwrap();
    let mut interpreter = Interpreter::with_output(std::io::sink());
    interpreter.run(&program).unwrap();
    assert!(matches!(interpreter.global("total"), Some(Value::Number(n)) if n == 6.0));
}
