//! Integration tests for end-to-end interpretation.
//!
//! These tests verify the complete pipeline from source text through
//! lexing, parsing, type checking, and evaluation, including the builtin
//! library and the profiler.

use std::collections::HashMap;
use std::rc::Rc;

use interpreter::nodes::node::Node;
use interpreter::parser::parser::parse;
use interpreter::profiler::profile_result::ProfileResult;
use interpreter::runtime::environment::{self, Call, EnvRef, Environment};
use interpreter::runtime::executor::{execute, ExecContext};
use interpreter::runtime::value::Value;
use interpreter::stdlib;

/// Parses and runs a program with the builtin globals, returning the root
/// environment for inspection. Statements are evaluated without the
/// per-statement sweep so the final bindings stay observable.
fn run_program(source: &str) -> EnvRef {
    let (global_defs, global_values) = stdlib::globals();
    let (module_defs, module_values) = stdlib::modules();
    let ast = parse(source, "test.lang", global_defs, module_defs).unwrap();

    let env = Environment::new_root(Call {
        function_name: String::from("main"),
        file: Rc::new(String::from("test.lang")),
        line: 0,
    });
    for (name, value) in global_values {
        env.borrow_mut().declare(name, value);
    }
    let mut ctx = ExecContext {
        file: Rc::new(String::from("test.lang")),
        modules: module_values,
        profiler: None,
    };
    for node in &ast {
        node.eval(&env, &mut ctx);
    }
    env
}

#[test]
fn test_builtin_functions() {
    let env = run_program("var n = len(trim(\"  abc  \"))");
    assert_eq!(environment::get(&env, "n"), Value::Int64(3));
}

#[test]
fn test_print_accepts_any_values_variadically() {
    // print takes any number of arguments of any type and returns nil
    let env = run_program(
        "\
var x: int32 = 2
var y: int32 = 3
print(\"total:\", x + y, true)
var done = 1
",
    );
    assert_eq!(environment::get(&env, "done"), Value::Int64(1));
}

#[test]
fn test_execute_with_kv_module() {
    let source = "\
import \"kv\"
fn fib(n: int64): int64 {
    if n < 2 {
        return n
    }
    return fib(n - 1) + fib(n - 2)
}
kv.set(\"fib\", fib(10))
";
    let (global_defs, global_values) = stdlib::globals();
    let (module_defs, module_values) = stdlib::modules();

    // The store is shared through the module's closures, so a handle taken
    // before the run observes what the program wrote
    let kv_get = match module_values.get("kv") {
        Some(Value::Map(entries)) => entries.borrow().get("get").cloned().unwrap(),
        _ => panic!("kv module missing"),
    };

    let ast = parse(source, "test.lang", global_defs, module_defs).unwrap();
    let result = execute(
        &ast,
        Rc::new(String::from("test.lang")),
        false,
        global_values,
        module_values,
    );
    assert!(result.is_none());

    let env = Environment::new_root(Call {
        function_name: String::from("main"),
        file: Rc::new(String::from("test.lang")),
        line: 0,
    });
    let mut ctx = ExecContext {
        file: Rc::new(String::from("test.lang")),
        modules: HashMap::new(),
        profiler: None,
    };
    match kv_get {
        Value::Function(get) => {
            let stored = get.call(
                vec![Value::String(String::from("fib"))],
                &env,
                &mut ctx,
            );
            assert_eq!(stored, Value::Int64(55));
        }
        other => panic!("expected a function, found {}", other.type_name()),
    }
}

#[test]
fn test_closure_keeps_captured_binding() {
    let source = "\
fn make(): fn(): int64 {
    var captured = 7
    fn inner(): int64 {
        return captured
    }
    return inner
}
var f = make()
var r = f()
";
    let env = run_program(source);
    assert_eq!(environment::get(&env, "r"), Value::Int64(7));
}

#[test]
fn test_struct_program() {
    let source = "\
struct Counter {
    count: int64
    increment(by: int64) {
        self.count = self.count + by
    }
    total(): int64 {
        return self.count
    }
}
var c = Counter(0)
for i range 5 {
    c.increment(2)
}
var total = c.total()
";
    let env = run_program(source);
    assert_eq!(environment::get(&env, "total"), Value::Int64(10));
}

#[test]
fn test_profiling_builds_call_tree() {
    let source = "\
fn slow() {
    var x = 0
    for i range 100 {
        x = x + 1
    }
}
fn run() {
    slow()
    slow()
}
run()
";
    let (global_defs, global_values) = stdlib::globals();
    let (module_defs, module_values) = stdlib::modules();
    let ast = parse(source, "test.lang", global_defs, module_defs).unwrap();
    let result = execute(
        &ast,
        Rc::new(String::from("test.lang")),
        true,
        global_values,
        module_values,
    )
    .expect("profiling should produce a result");

    assert_eq!(result.name, "main");
    assert_eq!(result.sub_programs.len(), 1);
    let run = &result.sub_programs[0];
    assert_eq!(run.name, "run");
    assert_eq!(run.sub_programs.len(), 2);
    assert!(run.sub_programs.iter().all(|call| call.name == "slow"));

    // Serialized form reconstructs the same tree
    let parsed = ProfileResult::parse_csv(&result.to_csv()).unwrap();
    assert_eq!(parsed.name, "main");
    assert_eq!(parsed.sub_programs.len(), 1);
    assert_eq!(parsed.sub_programs[0].name, "run");
    assert_eq!(parsed.sub_programs[0].sub_programs.len(), 2);
    assert_eq!(parsed.sub_programs[0].duration, run.duration);
}

#[test]
#[should_panic]
fn test_out_of_bounds_access_panics() {
    run_program("var a = [1]\nvar b = a[2]");
}

#[test]
#[should_panic]
fn test_integer_division_by_zero_panics() {
    run_program("var a = 10\nvar b = a / 0");
}
