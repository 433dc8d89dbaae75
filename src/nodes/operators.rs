use std::any::Any;
use std::marker::PhantomData;

use crate::nodes::node::{Flow, Node, NodeRef};
use crate::runtime::environment::{runtime_panic, EnvRef};
use crate::runtime::executor::ExecContext;
use crate::runtime::value::{extract, Numeric, RuntimeType, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathsOperationType {
    Addition,
    Subtraction,
    Multiplication,
    Division,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonType {
    GreaterThan,
    GreaterThanOrEquals,
    LessThan,
    LessThanOrEquals,
}

/// True when both sides are true. Both operands are always evaluated; the
/// language does not short-circuit.
pub struct And {
    pub left: NodeRef,
    pub right: NodeRef,
}

impl Node for And {
    fn eval(&self, env: &EnvRef, ctx: &mut ExecContext) -> Flow {
        let left = extract::<bool>(&self.left.eval(env, ctx).completed(), env);
        let right = extract::<bool>(&self.right.eval(env, ctx).completed(), env);
        Flow::Completed(Value::Bool(left && right))
    }

    fn references(&self) -> Vec<String> {
        let mut refs = self.left.references();
        refs.extend(self.right.references());
        refs
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// True when either side is true. Both operands are always evaluated.
pub struct Or {
    pub left: NodeRef,
    pub right: NodeRef,
}

impl Node for Or {
    fn eval(&self, env: &EnvRef, ctx: &mut ExecContext) -> Flow {
        let left = extract::<bool>(&self.left.eval(env, ctx).completed(), env);
        let right = extract::<bool>(&self.right.eval(env, ctx).completed(), env);
        Flow::Completed(Value::Bool(left || right))
    }

    fn references(&self) -> Vec<String> {
        let mut refs = self.left.references();
        refs.extend(self.right.references());
        refs
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Inverts a boolean value.
pub struct Not {
    pub value: NodeRef,
}

impl Node for Not {
    fn eval(&self, env: &EnvRef, ctx: &mut ExecContext) -> Flow {
        let value = extract::<bool>(&self.value.eval(env, ctx).completed(), env);
        Flow::Completed(Value::Bool(!value))
    }

    fn references(&self) -> Vec<String> {
        self.value.references()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Compares two values of the same parse-time type for equality. Aggregates
/// compare by handle, so two arrays are equal only when they are the same
/// array.
pub struct EqualityComparison {
    pub left: NodeRef,
    pub right: NodeRef,
}

impl Node for EqualityComparison {
    fn eval(&self, env: &EnvRef, ctx: &mut ExecContext) -> Flow {
        let left = self.left.eval(env, ctx).completed();
        let right = self.right.eval(env, ctx).completed();
        Flow::Completed(Value::Bool(left == right))
    }

    fn references(&self) -> Vec<String> {
        let mut refs = self.left.references();
        refs.extend(self.right.references());
        refs
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Ordering comparison specialized to one numeric width.
pub struct InequalityComparison<T: Numeric> {
    pub comparison: ComparisonType,
    pub left: NodeRef,
    pub right: NodeRef,
    pub marker: PhantomData<T>,
}

impl<T: Numeric> Node for InequalityComparison<T> {
    fn eval(&self, env: &EnvRef, ctx: &mut ExecContext) -> Flow {
        let left = extract::<T>(&self.left.eval(env, ctx).completed(), env);
        let right = extract::<T>(&self.right.eval(env, ctx).completed(), env);
        let result = match self.comparison {
            ComparisonType::GreaterThan => left > right,
            ComparisonType::GreaterThanOrEquals => left >= right,
            ComparisonType::LessThan => left < right,
            ComparisonType::LessThanOrEquals => left <= right,
        };
        Flow::Completed(Value::Bool(result))
    }

    fn references(&self) -> Vec<String> {
        let mut refs = self.left.references();
        refs.extend(self.right.references());
        refs
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Arithmetic specialized to one numeric width. Integer arithmetic wraps;
/// integer division by zero aborts with the call stack.
pub struct MathsOperation<T: Numeric> {
    pub operation: MathsOperationType,
    pub left: NodeRef,
    pub right: NodeRef,
    pub marker: PhantomData<T>,
}

impl<T: Numeric> Node for MathsOperation<T> {
    fn eval(&self, env: &EnvRef, ctx: &mut ExecContext) -> Flow {
        let left = extract::<T>(&self.left.eval(env, ctx).completed(), env);
        let right = extract::<T>(&self.right.eval(env, ctx).completed(), env);
        let result = match self.operation {
            MathsOperationType::Addition => left.add(right),
            MathsOperationType::Subtraction => left.subtract(right),
            MathsOperationType::Multiplication => left.multiply(right),
            MathsOperationType::Division => match left.divide(right) {
                Some(result) => result,
                None => runtime_panic(env, "integer division by zero"),
            },
        };
        Flow::Completed(result.to_value())
    }

    fn references(&self) -> Vec<String> {
        let mut refs = self.left.references();
        refs.extend(self.right.references());
        refs
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
