//! Executable node tree for the interpreter.
//!
//! This module defines the nodes the parser assembles the program from.
//! Every node knows how to evaluate itself in an environment and which
//! identifiers it references. The parser performs all type checking, so
//! nodes assume their operands have the shapes that were proven at parse
//! time. Node families with a type parameter are specialized per primitive
//! runtime type by the parser's dispatch table.

pub mod arrays;
pub mod basic;
pub mod control;
pub mod functions;
pub mod node;
pub mod operators;

#[cfg(test)]
mod tests;
