use std::marker::PhantomData;
use std::rc::Rc;

use crate::nodes::arrays::{ArrayAssignment, ArrayIndex, ArrayInitialization};
use crate::nodes::basic::Block;
use crate::nodes::control::LoopArray;
use crate::nodes::node::{Node, NodeRef};
use crate::nodes::operators::{
    ComparisonType, InequalityComparison, MathsOperation, MathsOperationType,
};
use crate::runtime::value::{Numeric, RuntimeType, Value};
use crate::types::types::{GenericType, TypeDef};

/// Builds the nodes that are specialized per runtime type, such as maths
/// operations and array access, where the concrete host type has to be
/// known when the node is constructed. The parser picks a generator from
/// the operand's type once, at parse time, so evaluation never needs a
/// runtime type switch.
pub trait TypeNodeGenerator {
    fn maths_operation(
        &self,
        operation: MathsOperationType,
        left: NodeRef,
        right: NodeRef,
    ) -> NodeRef;
    fn inequality_comparison(
        &self,
        comparison: ComparisonType,
        left: NodeRef,
        right: NodeRef,
    ) -> NodeRef;
    fn array_initialization(&self, elements: Vec<NodeRef>, size: Option<usize>) -> NodeRef;
    fn array_index(&self, array: NodeRef, index: NodeRef) -> NodeRef;
    fn array_assignment(&self, array: NodeRef, index: NodeRef, value: NodeRef) -> NodeRef;
    fn loop_array(
        &self,
        val_identifier: String,
        index_identifier: Option<String>,
        array: NodeRef,
        inner: Block,
    ) -> NodeRef;
    /// Decomposes a previously built array index node back into its array
    /// and index operands, for rewriting `a[i] = v` from the value node the
    /// left hand side initially parsed as.
    fn array_index_details(&self, node: &dyn Node) -> Option<(NodeRef, NodeRef)>;
}

/// Picks the generator for a type. Numeric types get the full set; every
/// other type panics on arithmetic, which the parser rules out before ever
/// asking.
pub fn generic_type_node(def: &TypeDef) -> Box<dyn TypeNodeGenerator> {
    match def.generic_type() {
        GenericType::Int8 => Box::new(NumberTypeGenerator::<i8>(PhantomData)),
        GenericType::Int16 => Box::new(NumberTypeGenerator::<i16>(PhantomData)),
        GenericType::Int32 => Box::new(NumberTypeGenerator::<i32>(PhantomData)),
        GenericType::Int64 => Box::new(NumberTypeGenerator::<i64>(PhantomData)),
        GenericType::Uint8 => Box::new(NumberTypeGenerator::<u8>(PhantomData)),
        GenericType::Uint16 => Box::new(NumberTypeGenerator::<u16>(PhantomData)),
        GenericType::Uint32 => Box::new(NumberTypeGenerator::<u32>(PhantomData)),
        GenericType::Uint64 => Box::new(NumberTypeGenerator::<u64>(PhantomData)),
        GenericType::Float32 => Box::new(NumberTypeGenerator::<f32>(PhantomData)),
        GenericType::Float64 => Box::new(NumberTypeGenerator::<f64>(PhantomData)),
        GenericType::String => Box::new(ValueTypeGenerator::<String>(PhantomData)),
        GenericType::Bool => Box::new(ValueTypeGenerator::<bool>(PhantomData)),
        // Aggregate element types flow through the identity runtime type.
        _ => Box::new(ValueTypeGenerator::<Value>(PhantomData)),
    }
}

pub struct ValueTypeGenerator<T: RuntimeType>(PhantomData<T>);
pub struct NumberTypeGenerator<T: Numeric>(PhantomData<T>);

fn new_array_initialization<T: RuntimeType>(
    elements: Vec<NodeRef>,
    size: Option<usize>,
) -> NodeRef {
    Rc::new(ArrayInitialization::<T> {
        elements,
        size,
        marker: PhantomData,
    })
}

fn new_array_index<T: RuntimeType>(array: NodeRef, index: NodeRef) -> NodeRef {
    Rc::new(ArrayIndex::<T> {
        array,
        index,
        marker: PhantomData,
    })
}

fn new_array_assignment<T: RuntimeType>(
    array: NodeRef,
    index: NodeRef,
    value: NodeRef,
) -> NodeRef {
    Rc::new(ArrayAssignment::<T> {
        array,
        index,
        value,
        marker: PhantomData,
    })
}

fn new_loop_array<T: RuntimeType>(
    val_identifier: String,
    index_identifier: Option<String>,
    array: NodeRef,
    inner: Block,
) -> NodeRef {
    Rc::new(LoopArray::<T> {
        val_identifier,
        index_identifier,
        array,
        inner,
        marker: PhantomData,
    })
}

fn index_details<T: RuntimeType>(node: &dyn Node) -> Option<(NodeRef, NodeRef)> {
    let index = node.as_any().downcast_ref::<ArrayIndex<T>>()?;
    Some((Rc::clone(&index.array), Rc::clone(&index.index)))
}

impl<T: RuntimeType> TypeNodeGenerator for ValueTypeGenerator<T> {
    fn maths_operation(&self, _: MathsOperationType, _: NodeRef, _: NodeRef) -> NodeRef {
        panic!("cannot build a maths operation for the non-number type {}", T::type_name())
    }

    fn inequality_comparison(&self, _: ComparisonType, _: NodeRef, _: NodeRef) -> NodeRef {
        panic!(
            "cannot build an inequality comparison for the non-number type {}",
            T::type_name()
        )
    }

    fn array_initialization(&self, elements: Vec<NodeRef>, size: Option<usize>) -> NodeRef {
        new_array_initialization::<T>(elements, size)
    }

    fn array_index(&self, array: NodeRef, index: NodeRef) -> NodeRef {
        new_array_index::<T>(array, index)
    }

    fn array_assignment(&self, array: NodeRef, index: NodeRef, value: NodeRef) -> NodeRef {
        new_array_assignment::<T>(array, index, value)
    }

    fn loop_array(
        &self,
        val_identifier: String,
        index_identifier: Option<String>,
        array: NodeRef,
        inner: Block,
    ) -> NodeRef {
        new_loop_array::<T>(val_identifier, index_identifier, array, inner)
    }

    fn array_index_details(&self, node: &dyn Node) -> Option<(NodeRef, NodeRef)> {
        index_details::<T>(node)
    }
}

impl<T: Numeric> TypeNodeGenerator for NumberTypeGenerator<T> {
    fn maths_operation(
        &self,
        operation: MathsOperationType,
        left: NodeRef,
        right: NodeRef,
    ) -> NodeRef {
        Rc::new(MathsOperation::<T> {
            operation,
            left,
            right,
            marker: PhantomData,
        })
    }

    fn inequality_comparison(
        &self,
        comparison: ComparisonType,
        left: NodeRef,
        right: NodeRef,
    ) -> NodeRef {
        Rc::new(InequalityComparison::<T> {
            comparison,
            left,
            right,
            marker: PhantomData,
        })
    }

    fn array_initialization(&self, elements: Vec<NodeRef>, size: Option<usize>) -> NodeRef {
        new_array_initialization::<T>(elements, size)
    }

    fn array_index(&self, array: NodeRef, index: NodeRef) -> NodeRef {
        new_array_index::<T>(array, index)
    }

    fn array_assignment(&self, array: NodeRef, index: NodeRef, value: NodeRef) -> NodeRef {
        new_array_assignment::<T>(array, index, value)
    }

    fn loop_array(
        &self,
        val_identifier: String,
        index_identifier: Option<String>,
        array: NodeRef,
        inner: Block,
    ) -> NodeRef {
        new_loop_array::<T>(val_identifier, index_identifier, array, inner)
    }

    fn array_index_details(&self, node: &dyn Node) -> Option<(NodeRef, NodeRef)> {
        index_details::<T>(node)
    }
}
