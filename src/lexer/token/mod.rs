mod span;

pub use span::{Span, SpanIndex};
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::LazyLock;

/// Reserved words, built once and never mutated.
pub static KEYWORD_HASHMAP: LazyLock<HashMap<&'static str, TokenKind>> = LazyLock::new(|| {
    HashMap::from([
        ("true", TokenKind::KeywordTrue),
        ("false", TokenKind::KeywordFalse),
        ("var", TokenKind::KeywordVar),
        ("const", TokenKind::KeywordConst),
        ("set", TokenKind::KeywordSet),
        ("is", TokenKind::KeywordIs),
        ("for", TokenKind::KeywordFor),
        ("break", TokenKind::KeywordBreak),
        ("return", TokenKind::KeywordReturn),
        ("func", TokenKind::KeywordFunc),
        ("and", TokenKind::KeywordAnd),
        ("or", TokenKind::KeywordOr),
        ("not", TokenKind::KeywordNot),
        ("if", TokenKind::KeywordIf),
        ("then", TokenKind::KeywordThen),
        ("else", TokenKind::KeywordElse),
        ("none", TokenKind::TypeNone),
        ("int", TokenKind::TypeInt),
        ("dec", TokenKind::TypeDec),
        ("str", TokenKind::TypeStr),
        ("bool", TokenKind::TypeBool),
        ("list", TokenKind::TypeList),
        ("map", TokenKind::TypeMap),
    ])
});

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Brackets
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    LeftParenthesis,
    RightParenthesis,
    LeftTriangle,
    RightTriangle,
    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    // Compound assignment
    PlusEqual,
    MinusEqual,
    StarEqual,
    SlashEqual,
    PercentEqual,
    // Comparison
    Equal,
    GreaterThan,
    GreaterThanEqual,
    LessThan,
    LessThanEqual,
    // Punctuation
    Comma,
    Colon,
    Semicolon,
    Underscore,

    // Literals
    IntLiteral,
    DecLiteral,
    StringLiteral,
    Ident,

    // Keywords
    KeywordTrue,
    KeywordFalse,
    KeywordVar,
    KeywordConst,
    KeywordSet,
    KeywordIs,
    KeywordFor,
    KeywordBreak,
    KeywordReturn,
    KeywordFunc,
    KeywordAnd,
    KeywordOr,
    KeywordNot,
    KeywordIf,
    KeywordThen,
    KeywordElse,

    // Type keywords
    TypeNone,
    TypeInt,
    TypeDec,
    TypeStr,
    TypeBool,
    TypeList,
    TypeMap,

    // End of file.
    Eof,
}

impl TokenKind {
    /// Fixed spelling of the token, `None` for tokens whose text varies.
    pub fn symbol(&self) -> Option<&'static str> {
        let symbol = match self {
            TokenKind::LeftBracket => "[",
            TokenKind::RightBracket => "]",
            TokenKind::LeftBrace => "{",
            TokenKind::RightBrace => "}",
            TokenKind::LeftParenthesis => "(",
            TokenKind::RightParenthesis => ")",
            TokenKind::LeftTriangle => "<|",
            TokenKind::RightTriangle => "|>",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::PlusEqual => "+=",
            TokenKind::MinusEqual => "-=",
            TokenKind::StarEqual => "*=",
            TokenKind::SlashEqual => "/=",
            TokenKind::PercentEqual => "%=",
            TokenKind::Equal => "=",
            TokenKind::GreaterThan => ">",
            TokenKind::GreaterThanEqual => ">=",
            TokenKind::LessThan => "<",
            TokenKind::LessThanEqual => "<=",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Semicolon => ";",
            TokenKind::Underscore => "_",
            TokenKind::KeywordTrue => "true",
            TokenKind::KeywordFalse => "false",
            TokenKind::KeywordVar => "var",
            TokenKind::KeywordConst => "const",
            TokenKind::KeywordSet => "set",
            TokenKind::KeywordIs => "is",
            TokenKind::KeywordFor => "for",
            TokenKind::KeywordBreak => "break",
            TokenKind::KeywordReturn => "return",
            TokenKind::KeywordFunc => "func",
            TokenKind::KeywordAnd => "and",
            TokenKind::KeywordOr => "or",
            TokenKind::KeywordNot => "not",
            TokenKind::KeywordIf => "if",
            TokenKind::KeywordThen => "then",
            TokenKind::KeywordElse => "else",
            TokenKind::TypeNone => "none",
            TokenKind::TypeInt => "int",
            TokenKind::TypeDec => "dec",
            TokenKind::TypeStr => "str",
            TokenKind::TypeBool => "bool",
            TokenKind::TypeList => "list",
            TokenKind::TypeMap => "map",
            TokenKind::IntLiteral
            | TokenKind::DecLiteral
            | TokenKind::StringLiteral
            | TokenKind::Ident
            | TokenKind::Eof => return None,
        };
        Some(symbol)
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TokenKind::LeftBracket => "LEFT_BRACKET",
            TokenKind::RightBracket => "RIGHT_BRACKET",
            TokenKind::LeftBrace => "LEFT_BRACE",
            TokenKind::RightBrace => "RIGHT_BRACE",
            TokenKind::LeftParenthesis => "LEFT_PAREN",
            TokenKind::RightParenthesis => "RIGHT_PAREN",
            TokenKind::LeftTriangle => "LEFT_TRIANGLE",
            TokenKind::RightTriangle => "RIGHT_TRIANGLE",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Star => "STAR",
            TokenKind::Slash => "SLASH",
            TokenKind::Percent => "PERCENT",
            TokenKind::PlusEqual => "PLUS_EQUAL",
            TokenKind::MinusEqual => "MINUS_EQUAL",
            TokenKind::StarEqual => "STAR_EQUAL",
            TokenKind::SlashEqual => "SLASH_EQUAL",
            TokenKind::PercentEqual => "PERCENT_EQUAL",
            TokenKind::Equal => "EQUAL",
            TokenKind::GreaterThan => "GREATER",
            TokenKind::GreaterThanEqual => "GREATER_EQUAL",
            TokenKind::LessThan => "LESS",
            TokenKind::LessThanEqual => "LESS_EQUAL",
            TokenKind::Comma => "COMMA",
            TokenKind::Colon => "COLON",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Underscore => "UNDERSCORE",
            TokenKind::IntLiteral => "INT",
            TokenKind::DecLiteral => "DEC",
            TokenKind::StringLiteral => "STRING",
            TokenKind::Ident => "IDENTIFIER",
            TokenKind::KeywordTrue => "TRUE",
            TokenKind::KeywordFalse => "FALSE",
            TokenKind::KeywordVar => "VAR",
            TokenKind::KeywordConst => "CONST",
            TokenKind::KeywordSet => "SET",
            TokenKind::KeywordIs => "IS",
            TokenKind::KeywordFor => "FOR",
            TokenKind::KeywordBreak => "BREAK",
            TokenKind::KeywordReturn => "RETURN",
            TokenKind::KeywordFunc => "FUNC",
            TokenKind::KeywordAnd => "AND",
            TokenKind::KeywordOr => "OR",
            TokenKind::KeywordNot => "NOT",
            TokenKind::KeywordIf => "IF",
            TokenKind::KeywordThen => "THEN",
            TokenKind::KeywordElse => "ELSE",
            TokenKind::TypeNone => "NONE",
            TokenKind::TypeInt => "INT_TYPE",
            TokenKind::TypeDec => "DEC_TYPE",
            TokenKind::TypeStr => "STR_TYPE",
            TokenKind::TypeBool => "BOOL_TYPE",
            TokenKind::TypeList => "LIST_TYPE",
            TokenKind::TypeMap => "MAP_TYPE",
            TokenKind::Eof => "EOF",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}
