use std::rc::Rc;

use crate::errors::errors::{Error, ErrorImpl};

use super::tokens::{char_token, literal_token, Token, TokenKind};

/// A saved cursor position, used to revisit deferred code such as struct
/// method bodies once the full struct shape is known.
#[derive(Debug, Clone, Copy)]
pub struct LexerPos {
    cursor: usize,
    line: u32,
}

impl LexerPos {
    pub fn line(&self) -> u32 {
        self.line
    }
}

/// Streaming lexer over the source text.
///
/// Tokens are produced one at a time; the parser uses `peek` for a single
/// token of lookahead and `unread` to rewind the most recently read token
/// when it has to backtrack out of a tried interpretation.
pub struct Lexer {
    content: Vec<char>,
    cursor: usize,
    current_line: u32,
    file: Rc<String>,
}

impl Lexer {
    pub fn new(content: &str, file: Rc<String>) -> Lexer {
        Lexer {
            content: content.chars().collect(),
            cursor: 0,
            current_line: 1,
            file,
        }
    }

    pub fn next(&mut self) -> Result<Token, Error> {
        let mut current_str = String::new();
        while self.cursor < self.content.len() {
            let ch = self.content[self.cursor];
            self.cursor += 1;

            if ch == ' ' || ch == '\t' || ch == '\r' {
                continue;
            }

            if let Some(kind) = char_token(ch) {
                if kind == TokenKind::NewLine {
                    self.current_line += 1;
                }
                return Ok(Token {
                    kind,
                    literal: ch.to_string(),
                    line: self.current_line,
                });
            }

            if ch == '"' {
                let literal = self.read_string()?;
                return Ok(Token {
                    kind: TokenKind::String,
                    literal,
                    line: self.current_line,
                });
            }

            current_str.push(ch);
            let end_of_token = if self.cursor >= self.content.len() {
                true
            } else {
                let next_ch = self.content[self.cursor];
                next_ch == ' '
                    || next_ch == '\t'
                    || next_ch == '\r'
                    || next_ch == '"'
                    || char_token(next_ch).is_some()
            };

            if end_of_token {
                return Ok(Token {
                    kind: literal_token(&current_str),
                    literal: current_str,
                    line: self.current_line,
                });
            }
        }

        Ok(Token {
            kind: TokenKind::EOF,
            literal: String::from("EOF"),
            line: self.current_line,
        })
    }

    pub fn peek(&mut self) -> Result<Token, Error> {
        let original_pos = self.cursor;
        let original_line = self.current_line;
        let token = self.next();
        self.cursor = original_pos;
        self.current_line = original_line;
        token
    }

    fn read_string(&mut self) -> Result<String, Error> {
        let mut current_str = String::new();
        let mut escaped = false;
        while self.cursor < self.content.len() {
            let ch = self.content[self.cursor];
            self.cursor += 1;

            if ch == '\\' && !escaped {
                escaped = true;
                continue;
            }
            if escaped {
                match ch {
                    'n' => current_str.push('\n'),
                    't' => current_str.push('\t'),
                    'r' => current_str.push('\r'),
                    _ => current_str.push(ch),
                }
                escaped = false;
            } else {
                if ch == '"' {
                    return Ok(current_str);
                }
                if ch == '\n' {
                    return Err(Error::new(
                        ErrorImpl::NewlineInString,
                        self.current_line,
                        Rc::clone(&self.file),
                    ));
                }
                current_str.push(ch);
            }
        }

        Err(Error::new(
            ErrorImpl::UnterminatedString,
            self.current_line,
            Rc::clone(&self.file),
        ))
    }

    pub fn get_current_line(&self) -> u32 {
        self.current_line
    }

    /// Moves the cursor back to the start of the previously read token so it
    /// is produced again at the next call of `next`. Only the most recently
    /// read token may be unread.
    pub fn unread(&mut self, token: &Token) {
        if token.kind == TokenKind::EOF {
            return;
        }
        self.cursor -= token.literal.chars().count();
        if token.kind == TokenKind::String {
            // Account for the quotation marks on either side
            self.cursor -= 2;
        } else if token.kind == TokenKind::NewLine {
            self.current_line -= 1;
        }
    }

    pub fn save(&self) -> LexerPos {
        LexerPos {
            cursor: self.cursor,
            line: self.current_line,
        }
    }

    /// Moves the lexer to a previously saved position, returning the position
    /// it was at so the caller can seek back afterwards.
    pub fn seek(&mut self, pos: LexerPos) -> LexerPos {
        let previous = self.save();
        self.cursor = pos.cursor;
        self.current_line = pos.line;
        previous
    }

    /// Discards the remainder of the current physical line, leaving the
    /// terminating newline unread. Used for `//` comments.
    pub fn skip_line(&mut self) {
        while self.cursor < self.content.len() && self.content[self.cursor] != '\n' {
            self.cursor += 1;
        }
    }
}
