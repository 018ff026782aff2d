use std::{cell::RefCell, io::Write, path::PathBuf, rc::Rc};

use crate::{
    environment::prelude::{Environment, Value},
    eval::prelude::{Interpreter, Options, RuntimeErrorType},
    parser::prelude::parse_module,
    utils::prelude::{Error, NullWarningEmitterIO}
};

/// In-memory sink shared between the interpreter and the test.
#[derive(Clone, Default)]
struct Capture(Rc<RefCell<Vec<u8>>>);

impl Capture {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn interpreter(options: Options, input: &str) -> (Interpreter, Capture) {
    let capture = Capture::default();
    let interpreter = Interpreter::new(options)
        .with_output(Box::new(capture.clone()))
        .with_input(Box::new(std::io::Cursor::new(input.to_string().into_bytes())));

    (interpreter, capture)
}

fn execute_with(src: &str, options: Options) -> (Result<Value, Error>, String) {
    let (mut interpreter, capture) = interpreter(options, "");
    let result = interpreter.run_source(
        PathBuf::from("test.nt"),
        src.to_string(),
        &Environment::global(),
        Rc::new(NullWarningEmitterIO)
    );

    (result, capture.text())
}

fn output(src: &str) -> Result<String, Error> {
    let (result, output) = execute_with(src, Options::default());
    result.map(|_| output)
}

fn failure(src: &str, options: Options) -> Option<RuntimeErrorType> {
    match execute_with(src, options).0 {
        Err(Error::Runtime { error, .. }) => Some(error.error),
        _ => None
    }
}

#[test]
fn test_arithmetic_program() -> Result<(), Error> {
    assert_eq!(output("var a = 2 + 3 * 4; print(a);")?, "14\n");

    let unoptimized = Options { optimize: false, ..Options::default() };
    let (result, printed) = execute_with("var a = 2 + 3 * 4; print(a);", unoptimized);
    assert!(result.is_ok());
    assert_eq!(printed, "14\n");

    Ok(())
}

#[test]
fn test_function_call() -> Result<(), Error> {
    assert_eq!(output("func add(a, b) { return a + b; } print(add(2, 3));")?, "5\n");
    assert_eq!(output("func nothing() { var x = 1; } print(nothing());")?, "undefined\n");
    assert_eq!(output("var twice = lambda(x) => x * 2; print(twice(21));")?, "42\n");

    Ok(())
}

#[test]
fn test_closures_capture_their_frame() -> Result<(), Error> {
    let src = r#"
        func counter() {
            var count = 0;
            func next() {
                count += 1;
                return count;
            }
            return next;
        }

        var c = counter();
        c();
        c();
        print(c());

        var d = counter();
        print(d());
    "#;

    assert_eq!(output(src)?, "3\n1\n");

    Ok(())
}

#[test]
fn test_functions_resolve_names_where_defined() -> Result<(), Error> {
    let src = r#"
        var x = "outer";
        func show() { print(x); }
        func caller() {
            var x = "caller";
            show();
        }
        caller();
        x = "changed";
        show();
    "#;

    assert_eq!(output(src)?, "outer\nchanged\n");

    Ok(())
}

#[test]
fn test_block_shadowing() -> Result<(), Error> {
    let src = r#"
        var x = 1;
        {
            var x = 2;
            print(x);
        }
        print(x);
        {
            x = 5;
        }
        print(x);
    "#;

    assert_eq!(output(src)?, "2\n1\n5\n");

    Ok(())
}

#[test]
fn test_constants_are_protected() {
    assert_eq!(
        failure("const limit = 5; limit = 6;", Options::default()),
        Some(RuntimeErrorType::ConstantReassignment { name: "limit".to_string() })
    );
    assert_eq!(
        failure("net rate = 1.5; func bump() { rate += 1; } bump();", Options::default()),
        Some(RuntimeErrorType::ConstantReassignment { name: "rate".to_string() })
    );
}

#[test]
fn test_failed_constant_assignment_keeps_value() -> Result<(), Error> {
    let (mut interpreter, capture) = interpreter(Options::default(), "");
    let env = Environment::global();
    let warnings = Rc::new(NullWarningEmitterIO);

    interpreter.run_source(PathBuf::new(), "const x = 5;".to_string(), &env, warnings.clone())?;
    assert!(interpreter.run_source(PathBuf::new(), "x = 6;".to_string(), &env, warnings.clone()).is_err());
    interpreter.run_source(PathBuf::new(), "print(x);".to_string(), &env, warnings)?;

    assert_eq!(capture.text(), "5\n");

    Ok(())
}

#[test]
fn test_break_leaves_innermost_loop() -> Result<(), Error> {
    let src = r#"
        var out = "";
        for [var i = 0; i < 3; ++i] {
            for [var j = 0; j < 3; ++j] {
                if [j == 1] {
                    break;
                }
                out = out .. i .. j .. " ";
            }
        }
        print(out);
    "#;

    assert_eq!(output(src)?, "00 10 20 \n");

    let src = r#"
        var sum = 0;
        var i = 0;
        while [i < 10] {
            ++i;
            if [i % 2 == 0] { continue; }
            sum += i;
        }
        print(sum);
    "#;

    assert_eq!(output(src)?, "25\n");

    Ok(())
}

#[test]
fn test_return_exits_function() -> Result<(), Error> {
    let src = r#"
        func first(items) {
            for [var i = 0; i < len(items); ++i] {
                if [items[i] > 2] {
                    return items[i];
                }
            }
            return null;
        }
        print(first([1, 5, 3]), first([1]));
    "#;

    assert_eq!(output(src)?, "5 null\n");

    Ok(())
}

#[test]
fn test_top_level_return_and_stray_jumps() {
    let (result, printed) = execute_with("print(1); return 7; print(2);", Options::default());

    assert_eq!(result, Ok(Value::Integer { value: 7 }));
    assert_eq!(printed, "1\n");

    assert_eq!(failure("break;", Options::default()), Some(RuntimeErrorType::BreakOutsideLoop));
    assert_eq!(
        failure("func f() { continue; } while [true] { f(); }", Options::default()),
        Some(RuntimeErrorType::ContinueOutsideLoop)
    );
}

#[test]
fn test_division() -> Result<(), Error> {
    let src = "print(1 / 0, 5 % 0, 1.0 / 0, 7 / 2, 8 / 2, -7 % 3);";
    let expected = "undefined undefined undefined 3.5 4 -1\n";

    assert_eq!(output(src)?, expected);

    let (result, printed) = execute_with(src, Options { optimize: false, ..Options::default() });
    assert!(result.is_ok());
    assert_eq!(printed, expected);

    Ok(())
}

#[test]
fn test_integer_overflow() {
    assert_eq!(
        failure("print(9223372036854775807 + 1);", Options::default()),
        Some(RuntimeErrorType::IntegerOverflow { operator: "+".to_string() })
    );
    assert_eq!(
        failure("print(2 ** 64);", Options::default()),
        Some(RuntimeErrorType::IntegerOverflow { operator: "**".to_string() })
    );
}

#[test]
fn test_call_depth_limit() {
    let runaway = "func f(n) { return f(n + 1); } f(0);";

    assert_eq!(
        failure(runaway, Options::default()),
        Some(RuntimeErrorType::StackOverflow { depth: 256 })
    );
    assert_eq!(
        failure(runaway, Options { max_call_depth: 64, ..Options::default() }),
        Some(RuntimeErrorType::StackOverflow { depth: 64 })
    );

    let (result, printed) = execute_with(
        "func fib(n) { return n < 2 ? n : fib(n - 1) + fib(n - 2); } print(fib(15));",
        Options::default()
    );

    assert!(result.is_ok());
    assert_eq!(printed, "610\n");
}

#[test]
fn test_deep_recursion_grows_the_stack() {
    let deep = Options { max_call_depth: 5000, ..Options::default() };
    let (result, printed) = execute_with(
        "func down(n) { if [n == 0] { return 0; } return 1 + down(n - 1); } print(down(4000));",
        deep
    );

    assert!(result.is_ok());
    assert_eq!(printed, "4000\n");
}

#[test]
fn test_undeclared_assignment() -> Result<(), Error> {
    assert_eq!(
        failure("x = 5; print(x);", Options::default()),
        Some(RuntimeErrorType::UndefinedVariable { name: "x".to_string() })
    );

    let implicit = Options { implicit_declarations: true, ..Options::default() };

    let (result, printed) = execute_with("x = 5; print(x);", implicit.clone());
    result?;
    assert_eq!(printed, "5\n");

    // the implicit declaration lands in the function's own frame
    assert_eq!(
        failure("func f() { y = 1; } f(); print(y);", implicit),
        Some(RuntimeErrorType::UndefinedVariable { name: "y".to_string() })
    );

    Ok(())
}

#[test]
fn test_try_catch_finally() -> Result<(), Error> {
    let src = r#"
        func risky(n) {
            if [n > 1] {
                throw error("too big", n);
            }
            return n;
        }

        try {
            print(risky(1));
            risky(5);
            print("unreached");
        } catch (e) {
            print("caught", e);
        } finally {
            print("done");
        }

        try { throw 1; } catch { print("anonymous"); }
    "#;

    assert_eq!(output(src)?, "1\ncaught error: too big (5)\ndone\nanonymous\n");

    Ok(())
}

#[test]
fn test_runtime_errors_skip_catch() {
    let src = r#"
        try {
            print(missing);
        } catch (e) {
            print("caught");
        } finally {
            print("cleanup");
        }
    "#;

    let (result, printed) = execute_with(src, Options::default());

    assert_eq!(printed, "cleanup\n");
    assert!(matches!(
        result,
        Err(Error::Runtime { error, .. }) if error.error == RuntimeErrorType::UndefinedVariable { name: "missing".to_string() }
    ));

    assert_eq!(
        failure("throw \"boom\";", Options::default()),
        Some(RuntimeErrorType::UncaughtThrow { value: "boom".to_string() })
    );
}

#[test]
fn test_classes() -> Result<(), Error> {
    let src = r#"
        class Animal {
            var name = "animal";
            func init(n) { name = n; }
            func speak() { return name .. " makes a sound"; }
        }

        class Dog extends Animal {
            func speak() { return name .. " barks"; }
        }

        var a = Animal("cat");
        var d = Dog("rex");
        print(a.speak(), "|", d.speak(), "|", d.name, type(d));
    "#;

    assert_eq!(output(src)?, "cat makes a sound | rex barks | rex instance\n");

    assert_eq!(
        failure("class A {} var a = A(); print(a.nope);", Options::default()),
        Some(RuntimeErrorType::UnknownMember { name: "nope".to_string() })
    );
    assert_eq!(
        failure("var base = 1; class B extends base {}", Options::default()),
        Some(RuntimeErrorType::InvalidParent { name: "base".to_string(), type_name: "int" })
    );

    Ok(())
}

#[test]
fn test_switch() -> Result<(), Error> {
    let src = r#"
        func describe(n) {
            switch [n] {
                case 1: return "one";
                case 2: return "two";
                default: return "many";
            }
        }
        print(describe(1), describe(2), describe(9));

        for [var i = 0; i < 5; ++i] {
            switch [i] {
                case 2: break;
                default: print(i);
            }
        }

        switch [1] {
            default: print("default");
            case 1: print("one");
        }
    "#;

    assert_eq!(output(src)?, "one two many\n0\n1\ndefault\n");

    Ok(())
}

#[test]
fn test_collections() -> Result<(), Error> {
    let src = r#"
        var a = [1];
        var b = a;
        push(b, 2);
        print(a, a === b, [1] == [1], [1] === [1]);

        var m = {name: "n", "k": 1};
        print(m.name, m["k"], m.missing, m["x"], [1, 2][5], "abc"[1]);
        print(keys(m), values(m), has(m, "k"), has(a, 2), len("héllo"));
    "#;

    assert_eq!(
        output(src)?,
        "[1, 2] true true false\nn 1 undefined undefined undefined b\n[\"name\", \"k\"] [\"n\", 1] true true 5\n"
    );

    assert_eq!(
        failure("print([1][\"a\"]);", Options::default()),
        Some(RuntimeErrorType::InvalidIndex { container: "array", index: "string" })
    );
    assert_eq!(
        failure("print(5[0]);", Options::default()),
        Some(RuntimeErrorType::NotIndexable { type_name: "int" })
    );

    Ok(())
}

#[test]
fn test_operators() -> Result<(), Error> {
    let src = r#"
        print(0 || "x", 1 && 2, null && crash());
        var x = 5;
        x += 2;
        x *= 3;
        --x;
        print(x, ++x);
        print(0.1 + 0.2 > 0.3, 2.0, 1 / 4, 2 ** 10, -2 ** 2);
        print(6 & 3, 6 | 3, 6 ^ 3, ~0, 1 << 4, -16 >> 2, -1 >>> 60);
        print("a" < "b", 1 == 1.0, 1 === 1.0, "n" .. 1 .. true, !0);
    "#;

    assert_eq!(
        output(src)?,
        "x 2 null\n20 21\ntrue 2.0 0.25 1024 4\n2 7 5 -1 16 -4 15\ntrue true false n1true true\n"
    );

    assert_eq!(
        failure("print(1 + \"a\");", Options::default()),
        Some(RuntimeErrorType::InvalidOperands {
            operator: "+".to_string(),
            left: "int",
            right: "string"
        })
    );

    Ok(())
}

#[test]
fn test_calls_fail_cleanly() {
    assert_eq!(
        failure("var x = 1; x();", Options::default()),
        Some(RuntimeErrorType::NotCallable { type_name: "int" })
    );
    assert_eq!(
        failure("func f(a) {} f();", Options::default()),
        Some(RuntimeErrorType::ArityMismatch { name: "f".to_string(), expected: 1, got: 0 })
    );
    assert_eq!(
        failure("nope(1);", Options::default()),
        Some(RuntimeErrorType::UndefinedFunction { name: "nope".to_string() })
    );
    assert_eq!(
        failure("len(1, 2);", Options::default()),
        Some(RuntimeErrorType::ArityMismatch { name: "len".to_string(), expected: 1, got: 2 })
    );
    assert!(matches!(
        failure("len(1);", Options::default()),
        Some(RuntimeErrorType::Native { name, .. }) if name == "len"
    ));
}

#[test]
fn test_container_equality() -> Result<(), Error> {
    let src = r#"
        print({a: 1, b: 2} == {b: 2, a: 1}, {a: 1} == {a: 1, b: 2});
        var a = [];
        push(a, a);
        var b = [];
        push(b, b);
        print(a == b, a === b);
    "#;

    assert_eq!(output(src)?, "true false\ntrue false\n");

    Ok(())
}

#[test]
fn test_callable_lookup_prefers_functions() -> Result<(), Error> {
    let src = r#"
        var len = 5;
        print(len([1, 2]), len);

        func type(v) { return "mine"; }
        print(type(1));
    "#;

    assert_eq!(output(src)?, "2 5\nmine\n");

    Ok(())
}

#[test]
fn test_natives() -> Result<(), Error> {
    let src = r#"
        var items = [3, 1];
        print(pop(items), len(items), pop([]));
        print(str(12) .. "!", int("42"), int(3.9), float("2.5"), float(2));
        print(min(3, 1.5, 2), max(1, 7), abs(-4), type(clock()));
        print(error("bad"), error("bad", [1]));
    "#;

    assert_eq!(
        output(src)?,
        "1 1 undefined\n12! 42 3 2.5 2.0\n1.5 7 4 float\nerror: bad error: bad ([1])\n"
    );

    Ok(())
}

#[test]
fn test_registered_natives_and_import() -> Result<(), Error> {
    let imported = Rc::new(RefCell::new(vec![]));
    let (mut interpreter, capture) = interpreter(Options::default(), "");

    interpreter.register_native("double", Some(1), |args, _| match &args[0] {
        Value::Integer { value } => Ok(Value::Integer { value: value * 2 }),
        other => Err(format!("cannot double `{}`", other.type_name()))
    });

    let seen = imported.clone();
    interpreter.register_native("import", Some(1), move |args, env| {
        seen.borrow_mut().push(args[0].to_string());
        env.borrow_mut().define("loaded", Value::Boolean { value: true }, false);
        Ok(Value::Undefined)
    });

    let env = Environment::global();
    interpreter.run_source(
        PathBuf::from("main.nt"),
        "import lib; import \"dir/other\"; print(double(21), loaded);".to_string(),
        &env,
        Rc::new(NullWarningEmitterIO)
    )?;

    assert_eq!(capture.text(), "42 true\n");
    assert_eq!(*imported.borrow(), vec!["lib".to_string(), "dir/other".to_string()]);

    assert_eq!(
        failure("import lib;", Options::default()),
        Some(RuntimeErrorType::UndefinedFunction { name: "import".to_string() })
    );

    Ok(())
}

#[test]
fn test_nested_interpreter_shares_output_and_depth() -> Result<(), Error> {
    let (mut interpreter, capture) = interpreter(Options { max_call_depth: 3, ..Options::default() }, "");
    let module = "print(\"module\"); func d(n) { return n == 0 ? 0 : d(n - 1); } d(2);";

    let template = interpreter.nested();
    interpreter.register_native("import", Some(1), move |_, env| {
        template.nested()
            .run_source(PathBuf::from("m.nt"), module.to_string(), env, Rc::new(NullWarningEmitterIO))
            .map_err(|err| err.to_string())
    });

    let env = Environment::global();
    let warnings = Rc::new(NullWarningEmitterIO);

    interpreter.run_source(PathBuf::new(), "import \"m\"; print(\"after\");".to_string(), &env, warnings.clone())?;
    assert_eq!(capture.text(), "module\nafter\n");

    // the importing call already counts towards the limit
    let result = interpreter.run_source(
        PathBuf::new(),
        "func wrap() { import \"m\"; } wrap();".to_string(),
        &env,
        warnings
    );

    assert!(matches!(
        result,
        Err(Error::Runtime { error, .. }) if matches!(&error.error, RuntimeErrorType::Native { name, .. } if name == "import")
    ));

    Ok(())
}

#[test]
fn test_input() -> Result<(), Error> {
    let (mut interpreter, capture) = interpreter(Options::default(), "nettle\r\n");

    interpreter.run_source(
        PathBuf::from("input.nt"),
        "var name = input(\"name? \"); print(\"hi \" .. name); print(input());".to_string(),
        &Environment::global(),
        Rc::new(NullWarningEmitterIO)
    )?;

    assert_eq!(capture.text(), "name? hi nettle\nundefined\n");

    Ok(())
}

#[test]
fn test_environment_persists_between_runs() -> Result<(), Error> {
    let (mut interpreter, capture) = interpreter(Options::default(), "");
    let env = Environment::global();
    let warnings = Rc::new(NullWarningEmitterIO);

    interpreter.run_source(PathBuf::new(), "var total = 40;".to_string(), &env, warnings.clone())?;
    let value = interpreter.run_source(PathBuf::new(), "total + 2;".to_string(), &env, warnings.clone())?;

    assert_eq!(value, Value::Integer { value: 42 });

    // a failing line leaves earlier definitions intact
    assert!(interpreter.run_source(PathBuf::new(), "total = missing;".to_string(), &env, warnings.clone()).is_err());
    interpreter.run_source(PathBuf::new(), "print(total);".to_string(), &env, warnings)?;

    assert_eq!(capture.text(), "40\n");

    Ok(())
}

#[test]
fn test_printed_program_evaluates_identically() -> Result<(), Error> {
    let src = r#"
        var values = [1, 2.5, "three", {k: [true, null]}];
        func describe(v) { return type(v) .. ":" .. str(v); }
        for [var i = 0; i < len(values); ++i] { print(describe(values[i])); }
        var n = -(3 - 10) * 2 ** 2;
        print(n, n > 20 ? "big" : "small", (1 + 2) * 3);
        class P { var v = 1; func get() { return v; } }
        print(P().get(), lambda(a, b) => a .. b);
    "#;

    let printed = match parse_module(src) {
        Ok(parsed) => parsed.program.to_string(),
        Err(errors) => panic!("{errors:?}")
    };

    for options in [Options::default(), Options { optimize: false, ..Options::default() }] {
        let (first, first_output) = execute_with(src, options.clone());
        let (second, second_output) = execute_with(&printed, options);

        assert!(first.is_ok() && second.is_ok());
        assert_eq!(first_output, second_output);
    }

    Ok(())
}
