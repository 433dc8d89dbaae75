//! Unit tests for the parser module.
//!
//! This module contains tests for parsing various language constructs
//! including:
//! - Variable declarations and literal narrowing
//! - Function declarations and return checking
//! - Expressions and operator precedence
//! - Control flow statements
//! - Struct definitions
//! - Syntax and type errors

use std::collections::HashMap;
use std::rc::Rc;

use crate::errors::errors::Error;
use crate::nodes::basic::{Assignment, Literal, VarDeclaration};
use crate::nodes::control::If;
use crate::nodes::functions::FuncDeclaration;
use crate::nodes::node::{Node, NodeRef};
use crate::runtime::environment::{self, Call, EnvRef, Environment};
use crate::runtime::executor::ExecContext;
use crate::runtime::value::Value;
use crate::types::types::{GenericType, TypeDef};

use super::parser::parse;

fn parse_source(source: &str) -> Result<Vec<NodeRef>, Error> {
    parse(source, "test.lang", HashMap::new(), HashMap::new())
}

fn parse_error_name(source: &str) -> String {
    match parse_source(source) {
        Ok(_) => panic!("expected the parse to fail"),
        Err(error) => error.get_error_name().to_string(),
    }
}

/// Parses and runs a program, returning the root environment so tests can
/// inspect the final variable values. Statements are evaluated without
/// the per-statement sweep, which would otherwise collect every binding
/// once no statements remain.
fn run_program(source: &str) -> EnvRef {
    let ast = parse_source(source).unwrap();
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
    for node in &ast {
        node.eval(&env, &mut ctx);
    }
    env
}

#[test]
fn test_parse_variable_declaration() {
    let result = parse_source("var x = 42");
    assert!(result.is_ok());
    assert_eq!(result.unwrap().len(), 1);
}

#[test]
fn test_parse_empty_and_comments() {
    let result = parse_source("\n\n// just a comment\n");
    assert!(result.unwrap().is_empty());
}

#[test]
fn test_literal_takes_declared_width() {
    let ast = parse_source("var x: int8 = 5").unwrap();
    let declaration = ast[0]
        .as_any()
        .downcast_ref::<VarDeclaration>()
        .expect("expected a var declaration");
    let literal = declaration
        .value
        .as_any()
        .downcast_ref::<Literal>()
        .expect("expected a literal");
    assert_eq!(literal.value, Value::Int8(5));
}

#[test]
fn test_float_literal() {
    let env = run_program("var f: float32 = 4.5");
    assert_eq!(environment::get(&env, "f"), Value::Float32(4.5));
}

#[test]
fn test_assignment_depth_counts_scope_hops() {
    let source = "\
var a = 1
if true {
    if true {
        a = 2
    }
}
";
    let ast = parse_source(source).unwrap();
    let outer_if = ast[1].as_any().downcast_ref::<If>().expect("expected if");
    let inner_if = outer_if.inner.nodes[0]
        .as_any()
        .downcast_ref::<If>()
        .expect("expected nested if");
    let assignment = inner_if.inner.nodes[0]
        .as_any()
        .downcast_ref::<Assignment>()
        .expect("expected assignment");
    assert_eq!(assignment.depth, 2);
}

#[test]
fn test_operator_precedence() {
    let env = run_program("var a = 2 + 3 * 4\nvar b = 20 - 10 / 2");
    assert_eq!(environment::get(&env, "a"), Value::Int64(14));
    assert_eq!(environment::get(&env, "b"), Value::Int64(15));
}

#[test]
fn test_comparison_chains_with_logic() {
    let env = run_program("var a = 1\nvar b = 2\nvar c = a < b && b == 2");
    assert_eq!(environment::get(&env, "c"), Value::Bool(true));
}

#[test]
fn test_unary_operators() {
    let env = run_program("var a = -3\nvar b = !false");
    assert_eq!(environment::get(&env, "a"), Value::Int64(-3));
    assert_eq!(environment::get(&env, "b"), Value::Bool(true));
}

#[test]
fn test_single_line_function() {
    let env = run_program("fn add(a: int64, b: int64): int64 { return a + b }\nvar r = add(2, 3)");
    assert_eq!(environment::get(&env, "r"), Value::Int64(5));
}

#[test]
fn test_recursive_function() {
    let source = "\
fn fib(n: int64): int64 {
    if n < 2 {
        return n
    }
    return fib(n - 1) + fib(n - 2)
}
var r = fib(10)
";
    let env = run_program(source);
    assert_eq!(environment::get(&env, "r"), Value::Int64(55));
}

#[test]
fn test_dead_code_after_return_is_dropped() {
    let source = "\
fn f(): int64 {
    return 1
    var unused = 2
}
";
    let ast = parse_source(source).unwrap();
    let declaration = ast[0]
        .as_any()
        .downcast_ref::<FuncDeclaration>()
        .expect("expected a function declaration");
    assert_eq!(declaration.body.nodes.len(), 1);
}

#[test]
fn test_missing_return_satisfied_by_if_else() {
    let source = "\
fn sign(n: int64): int64 {
    if n < 0 {
        return -1
    } else {
        return 1
    }
}
";
    assert!(parse_source(source).is_ok());
}

#[test]
fn test_for_range_loop() {
    let source = "\
var sum = 0
for i range 1, 4 {
    sum = sum + i
}
";
    let env = run_program(source);
    assert_eq!(environment::get(&env, "sum"), Value::Int64(6));
}

#[test]
fn test_for_range_implicit_start() {
    let source = "\
var count = 0
for i range 3 {
    count = count + 1
}
";
    let env = run_program(source);
    assert_eq!(environment::get(&env, "count"), Value::Int64(3));
}

#[test]
fn test_for_array_loop_with_index() {
    let source = "\
var values = [10, 20, 30]
var total = 0
for v, i range values {
    total = total + v + i
}
";
    let env = run_program(source);
    assert_eq!(environment::get(&env, "total"), Value::Int64(63));
}

#[test]
fn test_while_loop() {
    let source = "\
var n = 5
var steps = 0
while n > 0 {
    n = n - 1
    steps = steps + 1
}
";
    let env = run_program(source);
    assert_eq!(environment::get(&env, "steps"), Value::Int64(5));
}

#[test]
fn test_array_literal_and_indexing() {
    let source = "\
var values: int32[3] = [7]
var first = values[0]
var filler = values[2]
values[1] = 9
var second = values[1]
";
    let env = run_program(source);
    assert_eq!(environment::get(&env, "first"), Value::Int32(7));
    assert_eq!(environment::get(&env, "filler"), Value::Int32(0));
    assert_eq!(environment::get(&env, "second"), Value::Int32(9));
}

#[test]
fn test_struct_declaration_and_use() {
    let source = "\
struct Point {
    x: int64
    y: int64
    sum(): int64 {
        return self.x + self.y
    }
    scaled(factor: int64): int64 {
        return self.sum() * factor
    }
}
var p = Point(3, 4)
var x = p.x
var s = p.sum()
var sc = p.scaled(10)
p.x = 5
var s2 = p.sum()
";
    let env = run_program(source);
    assert_eq!(environment::get(&env, "x"), Value::Int64(3));
    assert_eq!(environment::get(&env, "s"), Value::Int64(7));
    assert_eq!(environment::get(&env, "sc"), Value::Int64(70));
    assert_eq!(environment::get(&env, "s2"), Value::Int64(9));
}

#[test]
fn test_struct_method_calls_later_sibling() {
    // Method bodies parse after the whole struct shape is known, so a
    // method may call a sibling declared below it.
    let source = "\
struct Doubler {
    n: int64
    quadrupled(): int64 {
        return self.doubled() * 2
    }
    doubled(): int64 {
        return self.n * 2
    }
}
var d = Doubler(3)
var q = d.quadrupled()
";
    let env = run_program(source);
    assert_eq!(environment::get(&env, "q"), Value::Int64(12));
}

#[test]
fn test_struct_as_argument_type() {
    let source = "\
struct Point {
    x: int64
    y: int64
}
fn abscissa(p: Point): int64 {
    return p.x
}
var r = abscissa(Point(8, 9))
";
    let env = run_program(source);
    assert_eq!(environment::get(&env, "r"), Value::Int64(8));
}

#[test]
fn test_function_as_value() {
    let source = "\
fn double(n: int64): int64 {
    return n * 2
}
fn apply(f: fn(int64): int64, n: int64): int64 {
    return f(n)
}
var r = apply(double, 21)
";
    let env = run_program(source);
    assert_eq!(environment::get(&env, "r"), Value::Int64(42));
}

#[test]
fn test_import_and_module_access() {
    let mut kv = HashMap::new();
    kv.insert(
        String::from("answer"),
        TypeDef::Primitive(GenericType::Int64),
    );
    let mut modules = HashMap::new();
    modules.insert(String::from("facts"), kv);

    let source = "import \"facts\" as f\nvar a = f.answer";
    let result = parse(source, "test.lang", HashMap::new(), modules);
    assert!(result.is_ok());
}

#[test]
fn test_error_identifier_not_declared() {
    assert_eq!(parse_error_name("var a = missing"), "IdentifierNotDeclared");
}

#[test]
fn test_error_type_mismatch_in_declaration() {
    assert_eq!(
        parse_error_name("var a: int32 = \"text\""),
        "TypeMismatch"
    );
}

#[test]
fn test_error_type_mismatch_in_assignment() {
    assert_eq!(
        parse_error_name("var a = 1\na = \"text\""),
        "TypeMismatch"
    );
}

#[test]
fn test_error_missing_return() {
    assert_eq!(
        parse_error_name("fn f(): int64 {\nvar a = 1\n}"),
        "MissingReturn"
    );
}

#[test]
fn test_error_if_without_else_does_not_count_as_return() {
    let source = "\
fn f(): int64 {
    if true {
        return 1
    }
}
";
    assert_eq!(parse_error_name(source), "MissingReturn");
}

#[test]
fn test_error_unexpected_return_value() {
    assert_eq!(
        parse_error_name("fn f() {\nreturn 1\n}"),
        "UnexpectedReturnValue"
    );
}

#[test]
fn test_error_non_boolean_condition() {
    assert_eq!(parse_error_name("if 1 {\n}"), "NonBooleanCondition");
    assert_eq!(parse_error_name("while \"s\" {\n}"), "NonBooleanCondition");
}

#[test]
fn test_error_call_arity() {
    assert_eq!(
        parse_error_name("fn f(a: int64) {\n}\nf()"),
        "MissingArguments"
    );
    assert_eq!(
        parse_error_name("fn f(a: int64) {\n}\nf(1, 2)"),
        "TooManyArguments"
    );
}

#[test]
fn test_error_argument_type_mismatch() {
    assert_eq!(
        parse_error_name("fn f(a: int64) {\n}\nf(\"s\")"),
        "ArgumentTypeMismatch"
    );
}

#[test]
fn test_error_not_callable() {
    assert_eq!(parse_error_name("var a = 1\na()"), "NotCallable");
}

#[test]
fn test_error_not_indexable() {
    assert_eq!(parse_error_name("var a = 1\nvar b = a[0]"), "NotIndexable");
}

#[test]
fn test_error_non_integer_index() {
    assert_eq!(
        parse_error_name("var a = [1]\nvar b = a[\"x\"]"),
        "NonIntegerIndex"
    );
}

#[test]
fn test_error_not_assignable() {
    assert_eq!(parse_error_name("var a = 1\na + 1 = 2"), "NotAssignable");
}

#[test]
fn test_error_unknown_module() {
    assert_eq!(parse_error_name("import \"missing\""), "UnknownModule");
}

#[test]
fn test_error_unknown_property() {
    let source = "\
struct Point {
    x: int64
}
var p = Point(1)
var y = p.y
";
    assert_eq!(parse_error_name(source), "UnknownProperty");
}

#[test]
fn test_error_unexpected_token() {
    assert_eq!(parse_error_name("var a = 1 var b = 2"), "UnexpectedToken");
}
