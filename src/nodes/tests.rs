use std::collections::HashMap;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::nodes::arrays::{ArrayAssignment, ArrayIndex, ArrayInitialization};
use crate::nodes::basic::{
    Assignment, Block, Identifier, Import, Literal, MapValue, Return, VarDeclaration,
};
use crate::nodes::control::{If, LoopArray, LoopRange, While};
use crate::nodes::functions::{FuncCall, FuncDeclaration, StructDeclaration, StructProperty};
use crate::nodes::node::{Flow, Node, NodeRef};
use crate::nodes::operators::{
    And, ComparisonType, EqualityComparison, InequalityComparison, MathsOperation,
    MathsOperationType, Not, Or,
};
use crate::runtime::environment::{self, Call, EnvRef, Environment};
use crate::runtime::executor::ExecContext;
use crate::runtime::value::Value;

fn test_env() -> (EnvRef, ExecContext) {
    let env = Environment::new_root(Call {
        function_name: String::from("main"),
        file: Rc::new(String::from("test.lang")),
        line: 0,
    });
    let ctx = ExecContext {
        file: Rc::new(String::from("test.lang")),
        modules: HashMap::new(),
        profiler: None,
    };
    (env, ctx)
}

fn lit(value: Value) -> NodeRef {
    Rc::new(Literal { value })
}

fn ident(name: &str) -> NodeRef {
    Rc::new(Identifier {
        name: name.to_string(),
    })
}

#[test]
fn test_literal_and_identifier() {
    let (env, mut ctx) = test_env();
    env.borrow_mut()
        .declare(String::from("a"), Value::Int64(3));

    assert_eq!(lit(Value::Int64(1)).eval(&env, &mut ctx).value(), Value::Int64(1));
    assert_eq!(ident("a").eval(&env, &mut ctx).value(), Value::Int64(3));
}

#[test]
fn test_var_declaration_and_assignment_depth() {
    let (env, mut ctx) = test_env();

    VarDeclaration {
        identifier: String::from("a"),
        value: lit(Value::Int64(1)),
    }
    .eval(&env, &mut ctx);

    // Write from a nested scope lands in the declaring scope
    let child = Environment::new_child(Rc::clone(&env));
    Assignment {
        identifier: String::from("a"),
        depth: 1,
        value: lit(Value::Int64(2)),
    }
    .eval(&child, &mut ctx);

    assert_eq!(environment::get(&env, "a"), Value::Int64(2));
    assert!(!child.borrow().contains("a"));
}

#[test]
fn test_if_branches() {
    let (env, mut ctx) = test_env();
    env.borrow_mut()
        .declare(String::from("result"), Value::Int64(0));

    let assign = |value: i64| -> NodeRef {
        Rc::new(Assignment {
            identifier: String::from("result"),
            depth: 1,
            value: lit(Value::Int64(value)),
        })
    };

    let node = If {
        condition: lit(Value::Bool(false)),
        inner: Block {
            nodes: vec![assign(1)],
        },
        else_branch: Some(Rc::new(If {
            condition: lit(Value::Bool(true)),
            inner: Block {
                nodes: vec![assign(2)],
            },
            else_branch: None,
        })),
    };
    node.eval(&env, &mut ctx);

    assert_eq!(environment::get(&env, "result"), Value::Int64(2));
}

#[test]
fn test_while_counts_down() {
    let (env, mut ctx) = test_env();
    env.borrow_mut()
        .declare(String::from("n"), Value::Int64(3));

    let node = While {
        condition: Rc::new(InequalityComparison::<i64> {
            comparison: ComparisonType::GreaterThan,
            left: ident("n"),
            right: lit(Value::Int64(0)),
            marker: PhantomData,
        }),
        inner: Block {
            nodes: vec![Rc::new(Assignment {
                identifier: String::from("n"),
                depth: 1,
                value: Rc::new(MathsOperation::<i64> {
                    operation: MathsOperationType::Subtraction,
                    left: ident("n"),
                    right: lit(Value::Int64(1)),
                    marker: PhantomData,
                }),
            })],
        },
    };
    node.eval(&env, &mut ctx);

    assert_eq!(environment::get(&env, "n"), Value::Int64(0));
}

#[test]
fn test_loop_range_accumulates() {
    let (env, mut ctx) = test_env();
    env.borrow_mut()
        .declare(String::from("sum"), Value::Int64(0));

    let node = LoopRange {
        val_identifier: String::from("i"),
        start: lit(Value::Int64(0)),
        end: lit(Value::Int64(4)),
        inner: Block {
            nodes: vec![Rc::new(Assignment {
                identifier: String::from("sum"),
                depth: 1,
                value: Rc::new(MathsOperation::<i64> {
                    operation: MathsOperationType::Addition,
                    left: ident("sum"),
                    right: ident("i"),
                    marker: PhantomData,
                }),
            })],
        },
    };
    node.eval(&env, &mut ctx);

    // 0 + 1 + 2 + 3
    assert_eq!(environment::get(&env, "sum"), Value::Int64(6));
    assert!(!env.borrow().contains("i"));
}

#[test]
fn test_loop_array_binds_element_and_index() {
    let (env, mut ctx) = test_env();
    env.borrow_mut().declare(
        String::from("values"),
        Value::new_array(vec![Value::Int64(10), Value::Int64(20)]),
    );
    env.borrow_mut()
        .declare(String::from("total"), Value::Int64(0));

    let node = LoopArray::<i64> {
        val_identifier: String::from("v"),
        index_identifier: Some(String::from("i")),
        array: ident("values"),
        inner: Block {
            nodes: vec![Rc::new(Assignment {
                identifier: String::from("total"),
                depth: 1,
                value: Rc::new(MathsOperation::<i64> {
                    operation: MathsOperationType::Addition,
                    left: ident("total"),
                    right: Rc::new(MathsOperation::<i64> {
                        operation: MathsOperationType::Addition,
                        left: ident("v"),
                        right: ident("i"),
                        marker: PhantomData,
                    }),
                    marker: PhantomData,
                }),
            })],
        },
        marker: PhantomData,
    };
    node.eval(&env, &mut ctx);

    // (10 + 0) + (20 + 1)
    assert_eq!(environment::get(&env, "total"), Value::Int64(31));
}

#[test]
fn test_logical_operators() {
    let (env, mut ctx) = test_env();

    let and = And {
        left: lit(Value::Bool(true)),
        right: lit(Value::Bool(false)),
    };
    assert_eq!(and.eval(&env, &mut ctx).value(), Value::Bool(false));

    let or = Or {
        left: lit(Value::Bool(false)),
        right: lit(Value::Bool(true)),
    };
    assert_eq!(or.eval(&env, &mut ctx).value(), Value::Bool(true));

    let not = Not {
        value: lit(Value::Bool(true)),
    };
    assert_eq!(not.eval(&env, &mut ctx).value(), Value::Bool(false));
}

#[test]
fn test_equality_comparison() {
    let (env, mut ctx) = test_env();

    let equal = EqualityComparison {
        left: lit(Value::String(String::from("a"))),
        right: lit(Value::String(String::from("a"))),
    };
    assert_eq!(equal.eval(&env, &mut ctx).value(), Value::Bool(true));

    let unequal = EqualityComparison {
        left: lit(Value::Int64(1)),
        right: lit(Value::Int64(2)),
    };
    assert_eq!(unequal.eval(&env, &mut ctx).value(), Value::Bool(false));
}

#[test]
fn test_maths_operation_wraps_on_overflow() {
    let (env, mut ctx) = test_env();

    let node = MathsOperation::<i8> {
        operation: MathsOperationType::Addition,
        left: lit(Value::Int8(i8::MAX)),
        right: lit(Value::Int8(1)),
        marker: PhantomData,
    };
    assert_eq!(node.eval(&env, &mut ctx).value(), Value::Int8(i8::MIN));
}

#[test]
#[should_panic]
fn test_integer_division_by_zero_panics() {
    let (env, mut ctx) = test_env();

    let node = MathsOperation::<i64> {
        operation: MathsOperationType::Division,
        left: lit(Value::Int64(1)),
        right: lit(Value::Int64(0)),
        marker: PhantomData,
    };
    node.eval(&env, &mut ctx);
}

#[test]
fn test_float_division_by_zero_is_infinite() {
    let (env, mut ctx) = test_env();

    let node = MathsOperation::<f64> {
        operation: MathsOperationType::Division,
        left: lit(Value::Float64(1.0)),
        right: lit(Value::Float64(0.0)),
        marker: PhantomData,
    };
    assert_eq!(
        node.eval(&env, &mut ctx).value(),
        Value::Float64(f64::INFINITY)
    );
}

#[test]
fn test_array_initialization_fills_to_size() {
    let (env, mut ctx) = test_env();

    let node = ArrayInitialization::<i64> {
        elements: vec![lit(Value::Int64(7))],
        size: Some(3),
        marker: PhantomData,
    };
    let value = node.eval(&env, &mut ctx).value();
    match value {
        Value::Array(elements) => {
            let elements = elements.borrow();
            assert_eq!(elements.len(), 3);
            assert_eq!(elements[0], Value::Int64(7));
            assert_eq!(elements[1], Value::Int64(0));
            assert_eq!(elements[2], Value::Int64(0));
        }
        other => panic!("expected an array, found {}", other.type_name()),
    }
}

#[test]
fn test_array_index_and_assignment() {
    let (env, mut ctx) = test_env();
    env.borrow_mut().declare(
        String::from("values"),
        Value::new_array(vec![Value::Int64(1), Value::Int64(2)]),
    );

    ArrayAssignment::<i64> {
        array: ident("values"),
        index: lit(Value::Int64(1)),
        value: lit(Value::Int64(9)),
        marker: PhantomData,
    }
    .eval(&env, &mut ctx);

    let read = ArrayIndex::<i64> {
        array: ident("values"),
        index: lit(Value::Int32(1)),
        marker: PhantomData,
    };
    assert_eq!(read.eval(&env, &mut ctx).value(), Value::Int64(9));
}

#[test]
#[should_panic]
fn test_array_index_out_of_bounds_panics() {
    let (env, mut ctx) = test_env();
    env.borrow_mut()
        .declare(String::from("values"), Value::new_array(vec![Value::Int64(1)]));

    ArrayIndex::<i64> {
        array: ident("values"),
        index: lit(Value::Int64(1)),
        marker: PhantomData,
    }
    .eval(&env, &mut ctx);
}

#[test]
fn test_func_declaration_attaches_outer_references() {
    let (env, mut ctx) = test_env();
    env.borrow_mut()
        .declare(String::from("outer"), Value::Int64(5));

    let declaration = FuncDeclaration {
        name: String::from("f"),
        arg_names: vec![String::from("x")],
        body: Rc::new(Block {
            nodes: vec![Rc::new(Return {
                value: Some(Rc::new(MathsOperation::<i64> {
                    operation: MathsOperationType::Addition,
                    left: ident("x"),
                    right: ident("outer"),
                    marker: PhantomData,
                })),
            })],
        }),
        line: 1,
    };
    declaration.eval(&env, &mut ctx);

    assert!(env.borrow().contains("f"));
    // `x` is an argument, `outer` is free
    assert_eq!(
        env.borrow().attached_references("f"),
        Some(&vec![String::from("outer")])
    );

    let call = FuncCall {
        function: ident("f"),
        args: vec![lit(Value::Int64(2))],
    };
    assert_eq!(call.eval(&env, &mut ctx).value(), Value::Int64(7));
}

#[test]
fn test_struct_declaration_and_property_access() {
    let (env, mut ctx) = test_env();

    // struct Point { x: int64; scaled_x(factor: int64): int64 { ... } }
    let method = FuncDeclaration {
        name: String::from("scaled_x"),
        arg_names: vec![String::from("self"), String::from("factor")],
        body: Rc::new(Block {
            nodes: vec![Rc::new(Return {
                value: Some(Rc::new(MathsOperation::<i64> {
                    operation: MathsOperationType::Multiplication,
                    left: Rc::new(ArrayIndex::<i64> {
                        array: ident("self"),
                        index: lit(Value::Int64(0)),
                        marker: PhantomData,
                    }),
                    right: ident("factor"),
                    marker: PhantomData,
                })),
            })],
        }),
        line: 1,
    };
    StructDeclaration {
        name: String::from("Point"),
        methods: vec![Rc::new(method)],
    }
    .eval(&env, &mut ctx);

    // var p = Point(3)
    VarDeclaration {
        identifier: String::from("p"),
        value: Rc::new(FuncCall {
            function: ident("Point"),
            args: vec![lit(Value::Int64(3))],
        }),
    }
    .eval(&env, &mut ctx);

    // p.x
    let property = StructProperty {
        struct_value: ident("p"),
        index: 0,
        is_method: false,
        name: String::from("x"),
    };
    assert_eq!(property.eval(&env, &mut ctx).value(), Value::Int64(3));

    // p.scaled_x(4)
    let call = FuncCall {
        function: Rc::new(StructProperty {
            struct_value: ident("p"),
            index: 1,
            is_method: true,
            name: String::from("scaled_x"),
        }),
        args: vec![lit(Value::Int64(4))],
    };
    assert_eq!(call.eval(&env, &mut ctx).value(), Value::Int64(12));
}

#[test]
fn test_import_binds_module_value() {
    let (env, mut ctx) = test_env();
    let mut entries = HashMap::new();
    entries.insert(String::from("answer"), Value::Int64(42));
    ctx.modules
        .insert(String::from("facts"), Value::new_map(entries));

    Import {
        module: String::from("facts"),
        identifier: String::from("f"),
    }
    .eval(&env, &mut ctx);

    let read = MapValue {
        map: ident("f"),
        key: String::from("answer"),
    };
    assert_eq!(read.eval(&env, &mut ctx).value(), Value::Int64(42));
}
