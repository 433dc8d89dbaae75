use std::rc::Rc;

use super::lexer::Lexer;
use super::tokens::{Token, TokenKind};

fn new_lexer(content: &str) -> Lexer {
    Lexer::new(content, Rc::new(String::from("test.lang")))
}

fn collect_kinds(content: &str) -> Vec<TokenKind> {
    let mut lexer = new_lexer(content);
    let mut kinds = Vec::new();
    loop {
        let token = lexer.next().unwrap();
        let kind = token.kind;
        kinds.push(kind);
        if kind == TokenKind::EOF {
            return kinds;
        }
    }
}

#[test]
fn test_keywords() {
    assert_eq!(
        collect_kinds("var fn if else while for range struct import as return"),
        vec![
            TokenKind::Var,
            TokenKind::Fn,
            TokenKind::If,
            TokenKind::Else,
            TokenKind::While,
            TokenKind::For,
            TokenKind::Range,
            TokenKind::Struct,
            TokenKind::Import,
            TokenKind::As,
            TokenKind::Return,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_type_keywords() {
    assert_eq!(
        collect_kinds("int32 uint8 float64 string bool map"),
        vec![
            TokenKind::TypeInt32,
            TokenKind::TypeUint8,
            TokenKind::TypeFloat64,
            TokenKind::TypeString,
            TokenKind::TypeBool,
            TokenKind::TypeMap,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_identifiers_and_numbers() {
    let mut lexer = new_lexer("counter 123 4.5 12a");
    let token = lexer.next().unwrap();
    assert_eq!(token.kind, TokenKind::Identifier);
    assert_eq!(token.literal, "counter");

    let token = lexer.next().unwrap();
    assert_eq!(token.kind, TokenKind::Number);
    assert_eq!(token.literal, "123");

    // 4.5 lexes as Number, Period, Number; the parser reassembles floats
    assert_eq!(lexer.next().unwrap().kind, TokenKind::Number);
    assert_eq!(lexer.next().unwrap().kind, TokenKind::Period);
    assert_eq!(lexer.next().unwrap().kind, TokenKind::Number);

    // A digit run followed by letters is an identifier, not a number
    let token = lexer.next().unwrap();
    assert_eq!(token.kind, TokenKind::Identifier);
    assert_eq!(token.literal, "12a");
}

#[test]
fn test_symbols() {
    assert_eq!(
        collect_kinds("( ) { } [ ] + - * / = > < ! & | , : ; ."),
        vec![
            TokenKind::LeftBracket,
            TokenKind::RightBracket,
            TokenKind::LeftBrace,
            TokenKind::RightBrace,
            TokenKind::LeftSquareBracket,
            TokenKind::RightSquareBracket,
            TokenKind::Plus,
            TokenKind::Dash,
            TokenKind::Asterisk,
            TokenKind::ForwardSlash,
            TokenKind::Equals,
            TokenKind::GreaterThan,
            TokenKind::LessThan,
            TokenKind::ExclamationMark,
            TokenKind::Ampersand,
            TokenKind::Bar,
            TokenKind::Comma,
            TokenKind::Colon,
            TokenKind::SemiColon,
            TokenKind::Period,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_symbols_terminate_identifiers() {
    let mut lexer = new_lexer("count+1");
    assert_eq!(lexer.next().unwrap().literal, "count");
    assert_eq!(lexer.next().unwrap().kind, TokenKind::Plus);
    assert_eq!(lexer.next().unwrap().literal, "1");
}

#[test]
fn test_string_literal() {
    let mut lexer = new_lexer("\"hello world\"");
    let token = lexer.next().unwrap();
    assert_eq!(token.kind, TokenKind::String);
    assert_eq!(token.literal, "hello world");
    assert_eq!(lexer.next().unwrap().kind, TokenKind::EOF);
}

#[test]
fn test_string_escapes() {
    let mut lexer = new_lexer("\"a\\tb\\nc\\\"d\\\\e\"");
    let token = lexer.next().unwrap();
    assert_eq!(token.kind, TokenKind::String);
    assert_eq!(token.literal, "a\tb\nc\"d\\e");
}

#[test]
fn test_unterminated_string() {
    let mut lexer = new_lexer("\"no closing quote");
    let error = lexer.next().unwrap_err();
    assert_eq!(error.get_error_name(), "UnterminatedString");
}

#[test]
fn test_newline_in_string() {
    let mut lexer = new_lexer("\"split\nstring\"");
    let error = lexer.next().unwrap_err();
    assert_eq!(error.get_error_name(), "NewlineInString");
}

#[test]
fn test_line_tracking() {
    let mut lexer = new_lexer("a\nb\nc");
    assert_eq!(lexer.next().unwrap().line, 1);
    assert_eq!(lexer.next().unwrap().line, 2); // the newline itself
    assert_eq!(lexer.next().unwrap().line, 2);
    assert_eq!(lexer.next().unwrap().line, 3);
    assert_eq!(lexer.next().unwrap().line, 3);
}

#[test]
fn test_unread_round_trip() {
    let source = "var x: int32 = 5\nprint(\"done\")";
    let mut lexer = new_lexer(source);
    loop {
        let token = lexer.next().unwrap();
        if token.kind == TokenKind::EOF {
            break;
        }
        lexer.unread(&token);
        let again = lexer.next().unwrap();
        assert_eq!(again, token);
    }
}

#[test]
fn test_unread_newline_restores_line() {
    let mut lexer = new_lexer("a\nb");
    lexer.next().unwrap();
    let newline = lexer.next().unwrap();
    assert_eq!(newline.kind, TokenKind::NewLine);
    assert_eq!(lexer.get_current_line(), 2);
    lexer.unread(&newline);
    assert_eq!(lexer.get_current_line(), 1);
}

#[test]
fn test_peek_does_not_consume() {
    let mut lexer = new_lexer("first second");
    let peeked = lexer.peek().unwrap();
    let token = lexer.next().unwrap();
    assert_eq!(peeked, token);
    assert_eq!(token.literal, "first");
    assert_eq!(lexer.next().unwrap().literal, "second");
}

#[test]
fn test_save_and_seek() {
    let mut lexer = new_lexer("one two three");
    lexer.next().unwrap();
    let saved = lexer.save();
    assert_eq!(lexer.next().unwrap().literal, "two");
    assert_eq!(lexer.next().unwrap().literal, "three");
    let end = lexer.seek(saved);
    assert_eq!(lexer.next().unwrap().literal, "two");
    lexer.seek(end);
    assert_eq!(lexer.next().unwrap().kind, TokenKind::EOF);
}

#[test]
fn test_skip_line() {
    let mut lexer = new_lexer("a // a comment here\nb");
    assert_eq!(lexer.next().unwrap().literal, "a");
    assert_eq!(lexer.next().unwrap().kind, TokenKind::ForwardSlash);
    assert_eq!(lexer.next().unwrap().kind, TokenKind::ForwardSlash);
    lexer.skip_line();
    assert_eq!(lexer.next().unwrap().kind, TokenKind::NewLine);
    assert_eq!(lexer.next().unwrap().literal, "b");
}

#[test]
fn test_end_of_statement() {
    let token = Token {
        kind: TokenKind::NewLine,
        literal: String::from("\n"),
        line: 1,
    };
    assert!(token.is_end_of_statement());
    let token = Token {
        kind: TokenKind::Identifier,
        literal: String::from("x"),
        line: 1,
    };
    assert!(!token.is_end_of_statement());
}
