//! Parser module for building the executable node tree.
//!
//! This module contains the single-pass parser. Parsing and type checking
//! happen together: every expression's type descriptor is computed as it
//! is parsed, and the finished node tree carries no type information the
//! evaluator would have to re-check. It handles:
//!
//! - Statement parsing (declarations, control flow, imports, returns)
//! - Layered expression parsing with operator precedence
//! - Depth resolution for assignments through the type environment
//! - Two-phase struct parsing for forward self-references
//! - Literal narrowing from implicit types

pub mod parser;
pub mod stmt;
pub mod structs;
pub mod values;

#[cfg(test)]
mod tests;
