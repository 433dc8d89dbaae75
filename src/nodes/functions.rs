use std::any::Any;
use std::rc::Rc;
use std::time::Instant;

use crate::nodes::basic::Block;
use crate::nodes::node::{Flow, Node, NodeRef};
use crate::runtime::environment::{runtime_panic, EnvRef, Environment};
use crate::runtime::executor::ExecContext;
use crate::runtime::value::{Function, Value};

/// Declares a function. The resulting value captures the environment it
/// was declared in, so the body resolves outer identifiers against the
/// declaration site. The identifiers the body reads from outer scopes are
/// attached to the binding so the garbage collector keeps them alive for
/// as long as the function is.
pub struct FuncDeclaration {
    pub name: String,
    pub arg_names: Vec<String>,
    pub body: Rc<Block>,
    pub line: u32,
}

impl FuncDeclaration {
    fn outer_references(&self) -> Vec<String> {
        self.body
            .references()
            .into_iter()
            .filter(|name| !self.arg_names.contains(name) && *name != self.name)
            .collect()
    }
}

impl Node for FuncDeclaration {
    fn eval(&self, env: &EnvRef, _ctx: &mut ExecContext) -> Flow {
        let function = Value::Function(Rc::new(Function::Declared {
            name: self.name.clone(),
            arg_names: self.arg_names.clone(),
            body: Rc::clone(&self.body),
            env: Rc::clone(env),
            line: self.line,
        }));
        let mut env = env.borrow_mut();
        env.declare(self.name.clone(), function.clone());
        env.attach_references(&self.name, self.outer_references());
        Flow::Completed(function)
    }

    fn references(&self) -> Vec<String> {
        self.outer_references()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Calls a function value with evaluated arguments. When profiling is
/// enabled the call's elapsed time is recorded against the calling frame.
pub struct FuncCall {
    pub function: NodeRef,
    pub args: Vec<NodeRef>,
}

impl Node for FuncCall {
    fn eval(&self, env: &EnvRef, ctx: &mut ExecContext) -> Flow {
        let callee = self.function.eval(env, ctx).completed();
        let function = match callee {
            Value::Function(function) => function,
            other => runtime_panic(
                env,
                &format!("cannot call a {} value", other.type_name()),
            ),
        };
        let mut args = Vec::with_capacity(self.args.len());
        for arg in &self.args {
            args.push(arg.eval(env, ctx).completed());
        }

        let result = if ctx.profiler.is_some() {
            if let Some(profiler) = &mut ctx.profiler {
                profiler.begin_call(function.name());
            }
            let start = Instant::now();
            let result = function.call(args, env, ctx);
            let elapsed = start.elapsed();
            if let Some(profiler) = &mut ctx.profiler {
                profiler.end_call(elapsed);
            }
            result
        } else {
            function.call(args, env, ctx)
        };
        Flow::Completed(result)
    }

    fn references(&self) -> Vec<String> {
        let mut refs = self.function.references();
        for arg in &self.args {
            refs.extend(arg.references());
        }
        refs
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Declares a struct. At runtime the struct is a constructor function: it
/// is called with the property values and returns the instance, which is a
/// plain array of the properties followed by the method closures. All
/// layout validation happened at parse time.
pub struct StructDeclaration {
    pub name: String,
    pub methods: Vec<NodeRef>,
}

impl Node for StructDeclaration {
    fn eval(&self, env: &EnvRef, ctx: &mut ExecContext) -> Flow {
        let method_env = Environment::new_child(Rc::clone(env));
        let mut method_values = Vec::with_capacity(self.methods.len());
        for method in &self.methods {
            method_values.push(method.eval(&method_env, ctx).completed());
        }

        let constructor = Value::Function(Rc::new(Function::StructConstructor {
            name: self.name.clone(),
            methods: method_values,
        }));
        let mut env = env.borrow_mut();
        env.declare(self.name.clone(), constructor);
        env.attach_references(&self.name, self.references());
        Flow::Completed(Value::Nil)
    }

    fn references(&self) -> Vec<String> {
        let mut refs = Vec::new();
        for method in &self.methods {
            refs.extend(method.references());
        }
        refs
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Reads a property out of a struct instance by its baked-in index. Method
/// access wraps the stored closure in a bound method that injects the
/// instance as the implicit `self` argument.
pub struct StructProperty {
    pub struct_value: NodeRef,
    pub index: usize,
    pub is_method: bool,
    pub name: String,
}

impl Node for StructProperty {
    fn eval(&self, env: &EnvRef, ctx: &mut ExecContext) -> Flow {
        let instance = self.struct_value.eval(env, ctx).completed();
        let elements = match &instance {
            Value::Array(elements) => Rc::clone(elements),
            other => runtime_panic(
                env,
                &format!("{} value has no property {:?}", other.type_name(), self.name),
            ),
        };
        let value = match elements.borrow().get(self.index) {
            Some(value) => value.clone(),
            None => runtime_panic(
                env,
                &format!("instance has no slot for property {:?}", self.name),
            ),
        };
        if !self.is_method {
            return Flow::Completed(value);
        }
        let func = match value {
            Value::Function(func) => func,
            other => runtime_panic(
                env,
                &format!("property {:?} is a {}, not a method", self.name, other.type_name()),
            ),
        };
        Flow::Completed(Value::Function(Rc::new(Function::Method {
            instance,
            func,
        })))
    }

    fn references(&self) -> Vec<String> {
        self.struct_value.references()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
