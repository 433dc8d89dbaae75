use std::any::Any;
use std::rc::Rc;

use crate::nodes::node::{Flow, Node, NodeRef};
use crate::runtime::environment::{self, EnvRef, Environment};
use crate::runtime::executor::{run_statements, ExecContext};
use crate::runtime::value::Value;

/// A literal value baked in at parse time.
pub struct Literal {
    pub value: Value,
}

impl Node for Literal {
    fn eval(&self, _env: &EnvRef, _ctx: &mut ExecContext) -> Flow {
        Flow::Completed(self.value.clone())
    }

    fn references(&self) -> Vec<String> {
        Vec::new()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Reads a value by its identifier.
pub struct Identifier {
    pub name: String,
}

impl Node for Identifier {
    fn eval(&self, env: &EnvRef, _ctx: &mut ExecContext) -> Flow {
        Flow::Completed(environment::get(env, &self.name))
    }

    fn references(&self) -> Vec<String> {
        vec![self.name.clone()]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Writes to an existing binding. The parser resolves how many scopes up
/// the binding lives and bakes the hop count in, so writes never create a
/// shadowing binding by accident.
pub struct Assignment {
    pub identifier: String,
    pub depth: usize,
    pub value: NodeRef,
}

impl Node for Assignment {
    fn eval(&self, env: &EnvRef, ctx: &mut ExecContext) -> Flow {
        let value = self.value.eval(env, ctx).completed();
        environment::set_at_depth(env, self.depth, &self.identifier, value.clone());
        Flow::Completed(value)
    }

    fn references(&self) -> Vec<String> {
        let mut refs = self.value.references();
        refs.push(self.identifier.clone());
        refs
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Declares a new binding in the current scope.
pub struct VarDeclaration {
    pub identifier: String,
    pub value: NodeRef,
}

impl Node for VarDeclaration {
    fn eval(&self, env: &EnvRef, ctx: &mut ExecContext) -> Flow {
        let value = self.value.eval(env, ctx).completed();
        env.borrow_mut().declare(self.identifier.clone(), value);
        Flow::Completed(Value::Nil)
    }

    fn references(&self) -> Vec<String> {
        self.value.references()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A nested statement sequence, such as a loop or function body. Callers
/// that need their own scope evaluate it through `eval_child`.
pub struct Block {
    pub nodes: Vec<NodeRef>,
}

impl Block {
    /// Runs the block in a fresh child scope of `env`.
    pub fn eval_child(&self, env: &EnvRef, ctx: &mut ExecContext) -> Flow {
        let child = Environment::new_child(Rc::clone(env));
        run_statements(&self.nodes, &child, ctx)
    }
}

impl Node for Block {
    fn eval(&self, env: &EnvRef, ctx: &mut ExecContext) -> Flow {
        self.eval_child(env, ctx)
    }

    fn references(&self) -> Vec<String> {
        let mut refs = Vec::new();
        for node in &self.nodes {
            refs.extend(node.references());
        }
        refs
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Returns a value from the enclosing function call.
pub struct Return {
    pub value: Option<NodeRef>,
}

impl Node for Return {
    fn eval(&self, env: &EnvRef, ctx: &mut ExecContext) -> Flow {
        let value = match &self.value {
            Some(node) => node.eval(env, ctx).completed(),
            None => Value::Nil,
        };
        Flow::Returned(value)
    }

    fn references(&self) -> Vec<String> {
        match &self.value {
            Some(node) => node.references(),
            None => Vec::new(),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Binds a builtin module's value table to an identifier in the current
/// scope.
pub struct Import {
    pub module: String,
    pub identifier: String,
}

impl Node for Import {
    fn eval(&self, env: &EnvRef, ctx: &mut ExecContext) -> Flow {
        let module = match ctx.modules.get(&self.module) {
            Some(module) => module.clone(),
            None => environment::runtime_panic(
                env,
                &format!("module {:?} is not registered", self.module),
            ),
        };
        env.borrow_mut().declare(self.identifier.clone(), module);
        Flow::Completed(Value::Nil)
    }

    fn references(&self) -> Vec<String> {
        vec![self.identifier.clone()]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Reads a fixed key out of a string-keyed map value. Module property
/// access compiles to this, since modules are plain maps at runtime.
pub struct MapValue {
    pub map: NodeRef,
    pub key: String,
}

impl Node for MapValue {
    fn eval(&self, env: &EnvRef, ctx: &mut ExecContext) -> Flow {
        let map = self.map.eval(env, ctx).completed();
        let entries = match map {
            Value::Map(entries) => entries,
            other => environment::runtime_panic(
                env,
                &format!("expected a map value, found {}", other.type_name()),
            ),
        };
        let value = match entries.borrow().get(&self.key) {
            Some(value) => value.clone(),
            None => environment::runtime_panic(
                env,
                &format!("map has no value for key {:?}", self.key),
            ),
        };
        Flow::Completed(value)
    }

    fn references(&self) -> Vec<String> {
        self.map.references()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
