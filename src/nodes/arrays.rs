use std::any::Any;
use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::nodes::node::{Flow, Node, NodeRef};
use crate::runtime::environment::{runtime_panic, EnvRef};
use crate::runtime::executor::ExecContext;
use crate::runtime::value::{extract, RuntimeType, Value};

fn array_contents(value: Value, env: &EnvRef) -> Rc<RefCell<Vec<Value>>> {
    match value {
        Value::Array(elements) => elements,
        other => runtime_panic(
            env,
            &format!("cannot index a {} value", other.type_name()),
        ),
    }
}

/// Normalizes an index of any integer width to an unsigned offset within
/// `len`, aborting on anything out of bounds (including negatives).
fn array_offset(index: &Value, len: usize, env: &EnvRef) -> usize {
    let offset = match index {
        Value::Int8(v) => *v as i64,
        Value::Int16(v) => *v as i64,
        Value::Int32(v) => *v as i64,
        Value::Int64(v) => *v,
        Value::Uint8(v) => *v as i64,
        Value::Uint16(v) => *v as i64,
        Value::Uint32(v) => *v as i64,
        Value::Uint64(v) => {
            if *v > i64::MAX as u64 {
                runtime_panic(env, &format!("index {} out of bounds (length {})", v, len));
            }
            *v as i64
        }
        other => runtime_panic(
            env,
            &format!("array index must be an integer, found {}", other.type_name()),
        ),
    };
    if offset < 0 || offset as usize >= len {
        runtime_panic(
            env,
            &format!("index {} out of bounds (length {})", offset, len),
        );
    }
    offset as usize
}

/// Reads one element out of an array.
pub struct ArrayIndex<T: RuntimeType> {
    pub array: NodeRef,
    pub index: NodeRef,
    pub marker: PhantomData<T>,
}

impl<T: RuntimeType> Node for ArrayIndex<T> {
    fn eval(&self, env: &EnvRef, ctx: &mut ExecContext) -> Flow {
        let elements = array_contents(self.array.eval(env, ctx).completed(), env);
        let index = self.index.eval(env, ctx).completed();
        let offset = array_offset(&index, elements.borrow().len(), env);
        let element = extract::<T>(&elements.borrow()[offset], env);
        Flow::Completed(element.to_value())
    }

    fn references(&self) -> Vec<String> {
        let mut refs = self.array.references();
        refs.extend(self.index.references());
        refs
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Writes one element of an array in place. Every handle to the array sees
/// the write, since arrays share their backing store.
pub struct ArrayAssignment<T: RuntimeType> {
    pub array: NodeRef,
    pub index: NodeRef,
    pub value: NodeRef,
    pub marker: PhantomData<T>,
}

impl<T: RuntimeType> Node for ArrayAssignment<T> {
    fn eval(&self, env: &EnvRef, ctx: &mut ExecContext) -> Flow {
        let elements = array_contents(self.array.eval(env, ctx).completed(), env);
        let index = self.index.eval(env, ctx).completed();
        let value = extract::<T>(&self.value.eval(env, ctx).completed(), env);
        let offset = array_offset(&index, elements.borrow().len(), env);
        let value = value.to_value();
        elements.borrow_mut()[offset] = value.clone();
        Flow::Completed(value)
    }

    fn references(&self) -> Vec<String> {
        let mut refs = self.array.references();
        refs.extend(self.index.references());
        refs.extend(self.value.references());
        refs
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Builds a new array from element expressions. A fixed-size array type
/// fills the slots the literal leaves empty with the element type's
/// default.
pub struct ArrayInitialization<T: RuntimeType> {
    pub elements: Vec<NodeRef>,
    pub size: Option<usize>,
    pub marker: PhantomData<T>,
}

impl<T: RuntimeType> Node for ArrayInitialization<T> {
    fn eval(&self, env: &EnvRef, ctx: &mut ExecContext) -> Flow {
        let len = self.size.unwrap_or(self.elements.len());
        let mut values = Vec::with_capacity(len);
        for element in &self.elements {
            let value = extract::<T>(&element.eval(env, ctx).completed(), env);
            values.push(value.to_value());
        }
        while values.len() < len {
            values.push(T::default_value());
        }
        Flow::Completed(Value::new_array(values))
    }

    fn references(&self) -> Vec<String> {
        let mut refs = Vec::new();
        for element in &self.elements {
            refs.extend(element.references());
        }
        refs
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
