//! Error types and error handling for the interpreter.
//!
//! This module defines the error types used by the lexing and parsing
//! phases. It includes:
//!
//! - Error structures with source line information
//! - Specific error variants for syntax and type errors
//! - Error formatting and display functionality
//! - Helpful error messages and suggestions

pub mod errors;
