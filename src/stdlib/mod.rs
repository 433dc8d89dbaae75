//! Builtin functions and modules available to every program.
//!
//! Each builtin is registered as a descriptor/value pair: the descriptor
//! is what the parser type-checks calls against, the value is what the
//! executor binds. Both halves come from the same record so they cannot
//! drift apart.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

use crate::runtime::value::{Function, Value};
use crate::types::types::{FuncDef, GenericType, TypeDef};


struct Builtin {
    name: &'static str,
    def: TypeDef,
    value: Value,
}

fn native(name: &'static str, def: FuncDef, func: impl Fn(Vec<Value>) -> Value + 'static) -> Builtin {
    Builtin {
        name,
        def: TypeDef::Func(def),
        value: Value::Function(Rc::new(Function::Native {
            name: name.to_string(),
            func: Box::new(func),
        })),
    }
}

fn split(builtins: Vec<Builtin>) -> (HashMap<String, TypeDef>, HashMap<String, Value>) {
    let mut defs = HashMap::new();
    let mut values = HashMap::new();
    for builtin in builtins {
        defs.insert(builtin.name.to_string(), builtin.def);
        values.insert(builtin.name.to_string(), builtin.value);
    }
    (defs, values)
}

/// The global builtins, as the parser's descriptor table and the
/// executor's value table.
pub fn globals() -> (HashMap<String, TypeDef>, HashMap<String, Value>) {
    split(vec![
        native(
            "print",
            FuncDef {
                args: vec![TypeDef::ANY],
                variadic: true,
                return_type: None,
            },
            |args| {
                let mut out = io::stdout().lock();
                for (i, arg) in args.iter().enumerate() {
                    if i != 0 {
                        let _ = write!(out, " ");
                    }
                    let _ = write!(out, "{}", arg);
                }
                let _ = writeln!(out);
                Value::Nil
            },
        ),
        native(
            "len",
            FuncDef {
                args: vec![TypeDef::ANY],
                variadic: false,
                return_type: Some(Box::new(TypeDef::Primitive(GenericType::Int64))),
            },
            |args| match args.first() {
                Some(Value::String(value)) => Value::Int64(value.chars().count() as i64),
                Some(Value::Array(elements)) => Value::Int64(elements.borrow().len() as i64),
                Some(Value::Map(entries)) => Value::Int64(entries.borrow().len() as i64),
                Some(other) => panic!("cannot take the length of a {}", other.type_name()),
                None => Value::Int64(0),
            },
        ),
        native(
            "trim",
            FuncDef {
                args: vec![TypeDef::Primitive(GenericType::String)],
                variadic: false,
                return_type: Some(Box::new(TypeDef::Primitive(GenericType::String))),
            },
            |args| match args.into_iter().next() {
                Some(Value::String(value)) => Value::String(value.trim().to_string()),
                _ => Value::String(String::new()),
            },
        ),
        native(
            "read_line",
            FuncDef {
                args: Vec::new(),
                variadic: false,
                return_type: Some(Box::new(TypeDef::Primitive(GenericType::String))),
            },
            |_| {
                let mut line = String::new();
                let _ = io::stdin().lock().read_line(&mut line);
                while line.ends_with('\n') || line.ends_with('\r') {
                    line.pop();
                }
                Value::String(line)
            },
        ),
    ])
}

/// The importable builtin modules. The descriptor side feeds the parser's
/// module table; the value side is a ready-made map value per module for
/// the executor.
pub fn modules() -> (
    HashMap<String, HashMap<String, TypeDef>>,
    HashMap<String, Value>,
) {
    let mut defs = HashMap::new();
    let mut values = HashMap::new();

    let (kv_defs, kv_values) = split(kv_module());
    defs.insert(String::from("kv"), kv_defs);
    values.insert(String::from("kv"), Value::new_map(kv_values));

    (defs, values)
}

/// A process-local string-keyed store. `set` and `get` close over the
/// same table.
fn kv_module() -> Vec<Builtin> {
    let store: Rc<RefCell<HashMap<String, Value>>> = Rc::new(RefCell::new(HashMap::new()));

    let set_store = Rc::clone(&store);
    let set = native(
        "set",
        FuncDef {
            args: vec![TypeDef::Primitive(GenericType::String), TypeDef::ANY],
            variadic: false,
            return_type: None,
        },
        move |args| {
            let mut args = args.into_iter();
            if let (Some(Value::String(key)), Some(value)) = (args.next(), args.next()) {
                set_store.borrow_mut().insert(key, value);
            }
            Value::Nil
        },
    );

    let get = native(
        "get",
        FuncDef {
            args: vec![TypeDef::Primitive(GenericType::String)],
            variadic: false,
            return_type: Some(Box::new(TypeDef::ANY)),
        },
        move |args| match args.into_iter().next() {
            Some(Value::String(key)) => store
                .borrow()
                .get(&key)
                .cloned()
                .unwrap_or(Value::Nil),
            _ => Value::Nil,
        },
    );

    vec![set, get]
}
