use std::any::Any;
use std::rc::Rc;

use crate::nodes::basic::Block;
use crate::nodes::node::{Flow, Node, NodeRef};
use crate::runtime::environment::{self, EnvRef, Environment};
use crate::runtime::executor::{run_statements, ExecContext};
use crate::runtime::value::{extract, RuntimeType, Value};

/// Runs the inner block when the condition holds, otherwise the else arm
/// if there is one. `else if` chains are nested `If` nodes in the else arm.
pub struct If {
    pub condition: NodeRef,
    pub inner: Block,
    pub else_branch: Option<NodeRef>,
}

impl Node for If {
    fn eval(&self, env: &EnvRef, ctx: &mut ExecContext) -> Flow {
        let condition = self.condition.eval(env, ctx).completed();
        if extract::<bool>(&condition, env) {
            return self.inner.eval_child(env, ctx);
        }
        if let Some(else_branch) = &self.else_branch {
            return else_branch.eval(env, ctx);
        }
        Flow::Completed(Value::Nil)
    }

    fn references(&self) -> Vec<String> {
        let mut refs = self.condition.references();
        refs.extend(self.inner.references());
        if let Some(else_branch) = &self.else_branch {
            refs.extend(else_branch.references());
        }
        refs
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Repeats the inner block while the condition holds. Every iteration gets
/// its own scope, so bindings made in the body are collected each pass.
pub struct While {
    pub condition: NodeRef,
    pub inner: Block,
}

impl Node for While {
    fn eval(&self, env: &EnvRef, ctx: &mut ExecContext) -> Flow {
        loop {
            let condition = self.condition.eval(env, ctx).completed();
            if !extract::<bool>(&condition, env) {
                return Flow::Completed(Value::Nil);
            }
            if let Flow::Returned(value) = self.inner.eval_child(env, ctx) {
                return Flow::Returned(value);
            }
        }
    }

    fn references(&self) -> Vec<String> {
        let mut refs = self.condition.references();
        refs.extend(self.inner.references());
        refs
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Counts the loop identifier from start (inclusive) to end (exclusive).
/// Bounds of any integer width are widened to `int64` before comparing.
pub struct LoopRange {
    pub val_identifier: String,
    pub start: NodeRef,
    pub end: NodeRef,
    pub inner: Block,
}

impl Node for LoopRange {
    fn eval(&self, env: &EnvRef, ctx: &mut ExecContext) -> Flow {
        let start = range_value(&self.start.eval(env, ctx).completed(), env);
        let end = range_value(&self.end.eval(env, ctx).completed(), env);
        for i in start..end {
            let child = Environment::new_child(Rc::clone(env));
            child
                .borrow_mut()
                .declare(self.val_identifier.clone(), Value::Int64(i));
            if let Flow::Returned(value) = run_statements(&self.inner.nodes, &child, ctx) {
                return Flow::Returned(value);
            }
        }
        Flow::Completed(Value::Nil)
    }

    fn references(&self) -> Vec<String> {
        let mut refs = self.start.references();
        refs.extend(self.end.references());
        refs.extend(self.inner.references());
        refs
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn range_value(value: &Value, env: &EnvRef) -> i64 {
    match value {
        Value::Int8(v) => *v as i64,
        Value::Int16(v) => *v as i64,
        Value::Int32(v) => *v as i64,
        Value::Int64(v) => *v,
        Value::Uint8(v) => *v as i64,
        Value::Uint16(v) => *v as i64,
        Value::Uint32(v) => *v as i64,
        Value::Uint64(v) => *v as i64,
        other => environment::runtime_panic(
            env,
            &format!("range bound must be an integer, found {}", other.type_name()),
        ),
    }
}

/// Iterates an array, binding each element (and optionally its index) in a
/// per-iteration scope.
pub struct LoopArray<T: RuntimeType> {
    pub val_identifier: String,
    pub index_identifier: Option<String>,
    pub array: NodeRef,
    pub inner: Block,
    pub marker: std::marker::PhantomData<T>,
}

impl<T: RuntimeType> Node for LoopArray<T> {
    fn eval(&self, env: &EnvRef, ctx: &mut ExecContext) -> Flow {
        let array = self.array.eval(env, ctx).completed();
        let elements = match array {
            Value::Array(elements) => elements,
            other => environment::runtime_panic(
                env,
                &format!("cannot iterate a {} value", other.type_name()),
            ),
        };
        let mut index = 0;
        loop {
            // Elements are fetched one at a time so the body may mutate
            // the array it is iterating.
            let element = match elements.borrow().get(index) {
                Some(element) => extract::<T>(element, env),
                None => break,
            };
            let child = Environment::new_child(Rc::clone(env));
            {
                let mut child_env = child.borrow_mut();
                child_env.declare(self.val_identifier.clone(), element.to_value());
                if let Some(index_identifier) = &self.index_identifier {
                    child_env.declare(index_identifier.clone(), Value::Int64(index as i64));
                }
            }
            if let Flow::Returned(value) = run_statements(&self.inner.nodes, &child, ctx) {
                return Flow::Returned(value);
            }
            index += 1;
        }
        Flow::Completed(Value::Nil)
    }

    fn references(&self) -> Vec<String> {
        let mut refs = self.array.references();
        refs.extend(self.inner.references());
        refs
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
