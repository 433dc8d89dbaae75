//! Runtime execution module for the interpreter.
//!
//! This module contains everything the evaluator needs at runtime. It
//! handles:
//!
//! - Runtime values and callable function values
//! - The scope chain of execution environments with call records
//! - Scope-exit garbage collection driven by statement references
//! - The executor entry point and profiling attribution

pub mod environment;
pub mod executor;
pub mod gc;
pub mod value;
