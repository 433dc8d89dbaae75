use std::any::Any;
use std::rc::Rc;

use crate::runtime::environment::EnvRef;
use crate::runtime::executor::ExecContext;
use crate::runtime::value::Value;

/// Result of evaluating a node. `Returned` propagates a `return` statement
/// up through enclosing blocks and loops until a function call boundary
/// absorbs it.
#[derive(Debug, Clone)]
pub enum Flow {
    Completed(Value),
    Returned(Value),
}

impl Flow {
    /// Unwraps the carried value regardless of how the node finished.
    pub fn value(self) -> Value {
        match self {
            Flow::Completed(value) => value,
            Flow::Returned(value) => value,
        }
    }

    /// Unwraps the value of a node that cannot produce a `return`, such as
    /// an operand expression.
    pub fn completed(self) -> Value {
        match self {
            Flow::Completed(value) => value,
            Flow::Returned(_) => panic!("unexpected return while evaluating an expression"),
        }
    }
}

/// A single executable node of the program tree. The parser performs all
/// validation ahead of time, so evaluation never type-checks its operands.
pub trait Node {
    /// Evaluates the node in an execution environment.
    fn eval(&self, env: &EnvRef, ctx: &mut ExecContext) -> Flow;

    /// The identifiers the node may read when evaluated, used by the
    /// garbage collector to decide which bindings a block still needs.
    fn references(&self) -> Vec<String>;

    fn as_any(&self) -> &dyn Any;
}

pub type NodeRef = Rc<dyn Node>;
