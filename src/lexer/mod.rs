//! Lexical analysis module for the interpreter.
//!
//! This module contains the lexer that converts source code into a stream
//! of tokens for parsing. It handles:
//!
//! - Streaming tokenization with single-token lookahead (`peek`)
//! - Rewinding the most recently read token (`unread`)
//! - Saving and seeking cursor positions for deferred parsing
//! - Recognition of keywords, identifiers, literals, and symbols
//! - String literals with escape sequences

pub mod lexer;
pub mod tokens;

#[cfg(test)]
mod tests;
