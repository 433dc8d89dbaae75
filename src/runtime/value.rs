use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{self, Display};
use std::rc::Rc;

use crate::nodes::basic::Block;
use crate::runtime::environment::{Call, EnvRef, Environment};
use crate::runtime::executor::{run_statements, ExecContext};
use crate::{impl_numeric_float, impl_numeric_int, impl_value_type};

use super::environment::runtime_panic;

/// A value produced by evaluating a node. Aggregates share their backing
/// store, so copying a `Value` copies a handle, not the contents. Struct
/// instances have no representation of their own: they are plain `Array`
/// values whose layout only the parser knows.
#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Float32(f32),
    Float64(f64),
    String(String),
    Array(Rc<RefCell<Vec<Value>>>),
    Map(Rc<RefCell<HashMap<String, Value>>>),
    Function(Rc<Function>),
}

impl Value {
    pub fn new_array(elements: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(elements)))
    }

    pub fn new_map(entries: HashMap<String, Value>) -> Value {
        Value::Map(Rc::new(RefCell::new(entries)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int8(_) => "int8",
            Value::Int16(_) => "int16",
            Value::Int32(_) => "int32",
            Value::Int64(_) => "int64",
            Value::Uint8(_) => "uint8",
            Value::Uint16(_) => "uint16",
            Value::Uint32(_) => "uint32",
            Value::Uint64(_) => "uint64",
            Value::Float32(_) => "float32",
            Value::Float64(_) => "float64",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Function(_) => "function",
        }
    }
}

// Equality between aggregates compares handles, not contents, so two arrays
// are equal only when they are the same array.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int8(a), Value::Int8(b)) => a == b,
            (Value::Int16(a), Value::Int16(b)) => a == b,
            (Value::Int32(a), Value::Int32(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::Uint8(a), Value::Uint8(b)) => a == b,
            (Value::Uint16(a), Value::Uint16(b)) => a == b,
            (Value::Uint32(a), Value::Uint32(b)) => a == b,
            (Value::Uint64(a), Value::Uint64(b)) => a == b,
            (Value::Float32(a), Value::Float32(b)) => a == b,
            (Value::Float64(a), Value::Float64(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Map(a), Value::Map(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int8(v) => write!(f, "{}", v),
            Value::Int16(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::Uint8(v) => write!(f, "{}", v),
            Value::Uint16(v) => write!(f, "{}", v),
            Value::Uint32(v) => write!(f, "{}", v),
            Value::Uint64(v) => write!(f, "{}", v),
            Value::Float32(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{}", v),
            Value::Array(elements) => {
                write!(f, "[")?;
                for (i, element) in elements.borrow().iter().enumerate() {
                    if i != 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, "]")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.borrow().iter().enumerate() {
                    if i != 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            Value::Function(function) => write!(f, "<fn {}>", function.name()),
        }
    }
}

/// A callable runtime value.
pub enum Function {
    /// A function declared in the program. Captures the environment it was
    /// declared in, so calls resolve outer identifiers against the
    /// declaration site rather than the call site.
    Declared {
        name: String,
        arg_names: Vec<String>,
        body: Rc<Block>,
        env: EnvRef,
        line: u32,
    },
    /// A builtin implemented by the host.
    Native {
        name: String,
        func: Box<dyn Fn(Vec<Value>) -> Value>,
    },
    /// A struct method bound to its instance. Injects the instance as the
    /// implicit first argument before delegating.
    Method { instance: Value, func: Rc<Function> },
    /// Declared by a struct statement. Calling it builds an instance: the
    /// given property values followed by the struct's method closures, as
    /// one ordered sequence.
    StructConstructor { name: String, methods: Vec<Value> },
}

impl Function {
    pub fn name(&self) -> &str {
        match self {
            Function::Declared { name, .. } => name,
            Function::Native { name, .. } => name,
            Function::Method { func, .. } => func.name(),
            Function::StructConstructor { name, .. } => name,
        }
    }

    pub fn call(&self, mut args: Vec<Value>, env: &EnvRef, ctx: &mut ExecContext) -> Value {
        match self {
            Function::Declared {
                name,
                arg_names,
                body,
                env: closure_env,
                line,
            } => {
                let call_env = Environment::new_call(
                    Rc::clone(closure_env),
                    Call {
                        function_name: name.clone(),
                        file: Rc::clone(&ctx.file),
                        line: *line,
                    },
                );
                for (arg_name, arg) in arg_names.iter().zip(args) {
                    call_env.borrow_mut().declare(arg_name.clone(), arg);
                }
                match run_statements(&body.nodes, &call_env, ctx) {
                    crate::nodes::node::Flow::Returned(value) => value,
                    crate::nodes::node::Flow::Completed(_) => Value::Nil,
                }
            }
            Function::Native { func, .. } => func(args),
            Function::Method { instance, func } => {
                args.insert(0, instance.clone());
                func.call(args, env, ctx)
            }
            Function::StructConstructor { methods, .. } => {
                args.extend(methods.iter().cloned());
                Value::new_array(args)
            }
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.name())
    }
}

/// A host type that a `Value` variant stores directly. `from_value` asserts
/// the tag the parser proved at parse time; a mismatch is an interpreter
/// bug, never a user error.
pub trait RuntimeType: Clone + 'static {
    fn type_name() -> &'static str;
    fn from_value(value: &Value) -> Self;
    fn to_value(self) -> Value;
    fn default_value() -> Value;
}

/// Arithmetic over one numeric width. Integer implementations wrap on
/// overflow; only integer division can fail.
pub trait Numeric: RuntimeType + PartialOrd {
    fn add(self, other: Self) -> Self;
    fn subtract(self, other: Self) -> Self;
    fn multiply(self, other: Self) -> Self;
    fn divide(self, other: Self) -> Option<Self>;
}

impl_numeric_int!(i8, Int8, "int8");
impl_numeric_int!(i16, Int16, "int16");
impl_numeric_int!(i32, Int32, "int32");
impl_numeric_int!(i64, Int64, "int64");
impl_numeric_int!(u8, Uint8, "uint8");
impl_numeric_int!(u16, Uint16, "uint16");
impl_numeric_int!(u32, Uint32, "uint32");
impl_numeric_int!(u64, Uint64, "uint64");
impl_numeric_float!(f32, Float32, "float32");
impl_numeric_float!(f64, Float64, "float64");
impl_value_type!(bool, Bool, "bool", false);
impl_value_type!(String, String, "string", String::new());

// Identity impl so aggregate element types (arrays of arrays, arrays of
// struct instances) can flow through the same specialized node families as
// primitives.
impl RuntimeType for Value {
    fn type_name() -> &'static str {
        "any"
    }

    fn from_value(value: &Value) -> Self {
        value.clone()
    }

    fn to_value(self) -> Value {
        self
    }

    fn default_value() -> Value {
        Value::Nil
    }
}

/// Extracts a value of a known runtime type, panicking with the call stack
/// if the tag does not match what the parser proved.
pub fn extract<T: RuntimeType>(value: &Value, env: &EnvRef) -> T {
    if !matches_tag::<T>(value) {
        runtime_panic(
            env,
            &format!(
                "expected a {} value, found {}",
                T::type_name(),
                value.type_name()
            ),
        );
    }
    T::from_value(value)
}

fn matches_tag<T: RuntimeType>(value: &Value) -> bool {
    let expected = T::type_name();
    expected == "any" || expected == value.type_name()
}
