use std::collections::HashMap;
use std::rc::Rc;

use crate::errors::errors::{Error, ErrorImpl};
use crate::lexer::lexer::Lexer;
use crate::lexer::tokens::{Token, TokenKind};
use crate::nodes::node::NodeRef;
use crate::types::environment::TypeEnvironment;
use crate::types::types::TypeDef;

use super::stmt::parse_next;

/// The parser state: the token stream, the parse-time scope stack, and the
/// builtin module descriptors import statements resolve against.
pub struct Parser {
    pub(crate) lexer: Lexer,
    pub(crate) file: Rc<String>,
    pub(crate) type_env: TypeEnvironment,
    pub(crate) modules: HashMap<String, HashMap<String, TypeDef>>,
}

/// Parses a whole source file into an executable node sequence. `globals`
/// and `modules` declare the embedder's builtins to the type checker; the
/// matching value tables go to the executor. Any syntax or type error
/// aborts the parse, there is no recovery.
pub fn parse(
    source: &str,
    file_path: &str,
    globals: HashMap<String, TypeDef>,
    modules: HashMap<String, HashMap<String, TypeDef>>,
) -> Result<Vec<NodeRef>, Error> {
    let file = Rc::new(file_path.to_string());
    let mut parser = Parser {
        lexer: Lexer::new(source, Rc::clone(&file)),
        file,
        type_env: TypeEnvironment::new(globals),
        modules,
    };

    let mut ast = Vec::new();
    while let Some(node) = parse_next(&mut parser, false)? {
        ast.push(node);
    }
    Ok(ast)
}

impl Parser {
    /// Reads the next token, collapsing `//` comments: the rest of the
    /// physical line is discarded and the terminating newline is returned
    /// in its place.
    pub(crate) fn next_token(&mut self) -> Result<Token, Error> {
        let token = self.lexer.next()?;
        if token.kind == TokenKind::ForwardSlash
            && self.lexer.peek()?.kind == TokenKind::ForwardSlash
        {
            self.lexer.skip_line();
            return self.next_token();
        }
        Ok(token)
    }

    /// Comment-aware single token lookahead.
    pub(crate) fn peek_token(&mut self) -> Result<Token, Error> {
        let pos = self.lexer.save();
        let token = self.next_token();
        self.lexer.seek(pos);
        token
    }

    /// Reads the next token and requires it to be one of the given kinds.
    pub(crate) fn expect_token(&mut self, kinds: &[TokenKind]) -> Result<Token, Error> {
        let token = self.next_token()?;
        if kinds.contains(&token.kind) {
            return Ok(token);
        }
        Err(self.error(ErrorImpl::UnexpectedToken {
            token: token.literal,
        }))
    }

    /// Builds an error annotated with the current line and file.
    pub(crate) fn error(&self, error_impl: ErrorImpl) -> Error {
        Error::new(
            error_impl,
            self.lexer.get_current_line(),
            Rc::clone(&self.file),
        )
    }
}
