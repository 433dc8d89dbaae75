//! Static type information used during parsing.
//!
//! This module holds everything the parser needs to prove a program
//! type-correct before it runs. It handles:
//!
//! - Type descriptors for every value shape the language has
//! - Structural equality with the `any` escape hatch
//! - Literal narrowing from the default numeric widths
//! - The parse-time scope stack with depth-resolved lookups
//! - Type-directed construction of specialized node families

pub mod conversions;
pub mod dispatch;
pub mod environment;
pub mod types;
