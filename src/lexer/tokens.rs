use lazy_static::lazy_static;
use std::{collections::HashMap, fmt::Display};

lazy_static! {
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("if", TokenKind::If);
        map.insert("else", TokenKind::Else);
        map.insert("fn", TokenKind::Fn);
        map.insert("struct", TokenKind::Struct);
        map.insert("import", TokenKind::Import);
        map.insert("as", TokenKind::As);
        map.insert("for", TokenKind::For);
        map.insert("while", TokenKind::While);
        map.insert("range", TokenKind::Range);
        map.insert("var", TokenKind::Var);
        map.insert("return", TokenKind::Return);
        map.insert("true", TokenKind::True);
        map.insert("false", TokenKind::False);
        map.insert("int8", TokenKind::TypeInt8);
        map.insert("int16", TokenKind::TypeInt16);
        map.insert("int32", TokenKind::TypeInt32);
        map.insert("int64", TokenKind::TypeInt64);
        map.insert("uint8", TokenKind::TypeUint8);
        map.insert("uint16", TokenKind::TypeUint16);
        map.insert("uint32", TokenKind::TypeUint32);
        map.insert("uint64", TokenKind::TypeUint64);
        map.insert("float32", TokenKind::TypeFloat32);
        map.insert("float64", TokenKind::TypeFloat64);
        map.insert("string", TokenKind::TypeString);
        map.insert("bool", TokenKind::TypeBool);
        map.insert("map", TokenKind::TypeMap);
        map
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EOF,
    Number,
    String,
    Identifier,
    True,
    False,

    // Reserved statement keywords
    If,
    Else,
    Fn,
    Struct,
    Import,
    As,
    For,
    While,
    Range,
    Var,
    Return,

    // Reserved type keywords
    TypeInt8,
    TypeInt16,
    TypeInt32,
    TypeInt64,
    TypeUint8,
    TypeUint16,
    TypeUint32,
    TypeUint64,
    TypeFloat32,
    TypeFloat64,
    TypeString,
    TypeBool,
    TypeMap,

    // Symbols, one character each. Multi-character operators such as `==`
    // and `&&` are read by the parser as two consecutive symbol tokens.
    Colon,
    SemiColon,
    NewLine,
    Comma,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    LeftSquareBracket,
    RightSquareBracket,
    Asterisk,
    Plus,
    Dash,
    ForwardSlash,
    Ampersand,
    Bar,
    ExclamationMark,
    Equals,
    GreaterThan,
    LessThan,
    Period,
}

/// Maps a single character to its symbol token kind, if it is one.
pub fn char_token(ch: char) -> Option<TokenKind> {
    match ch {
        ':' => Some(TokenKind::Colon),
        ';' => Some(TokenKind::SemiColon),
        '\n' => Some(TokenKind::NewLine),
        ',' => Some(TokenKind::Comma),
        '(' => Some(TokenKind::LeftBracket),
        ')' => Some(TokenKind::RightBracket),
        '{' => Some(TokenKind::LeftBrace),
        '}' => Some(TokenKind::RightBrace),
        '[' => Some(TokenKind::LeftSquareBracket),
        ']' => Some(TokenKind::RightSquareBracket),
        '*' => Some(TokenKind::Asterisk),
        '+' => Some(TokenKind::Plus),
        '-' => Some(TokenKind::Dash),
        '/' => Some(TokenKind::ForwardSlash),
        '&' => Some(TokenKind::Ampersand),
        '|' => Some(TokenKind::Bar),
        '!' => Some(TokenKind::ExclamationMark),
        '=' => Some(TokenKind::Equals),
        '>' => Some(TokenKind::GreaterThan),
        '<' => Some(TokenKind::LessThan),
        '.' => Some(TokenKind::Period),
        _ => None,
    }
}

/// Classifies a buffered run of characters as a keyword, number or
/// identifier.
pub fn literal_token(literal: &str) -> TokenKind {
    if let Some(kind) = RESERVED_LOOKUP.get(literal) {
        return *kind;
    }
    if !literal.is_empty() && literal.chars().all(|ch| ch.is_ascii_digit()) {
        return TokenKind::Number;
    }
    TokenKind::Identifier
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub line: u32,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Token {{ kind: {}, literal: {} }}", self.kind, self.literal)
    }
}

impl Token {
    pub fn is_end_of_statement(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::NewLine | TokenKind::SemiColon | TokenKind::EOF
        )
    }
}
