use crate::lexer::{LexicalError, Span, TokenKind};
use compact_str::CompactString;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParserErrorKind {
    #[error("Expected {expected} but got token {actual}.")]
    UnexpectedToken {
        actual: TokenKind,
        expected: TokenKind,
    },
    #[error("Expected an expression but got token {0}.")]
    NonExpression(TokenKind),
    #[error("Expected a type but got token {0}.")]
    NonType(TokenKind),
    #[error("Expected an assignment operator but got token {0}.")]
    NonAssignmentOperator(TokenKind),
    #[error("Expected a declaration but got token {0}.")]
    NonDeclaration(TokenKind),
    #[error("Expected a non-EOF token.")]
    UnexpectedEof,
    #[error("Invalid literal {0}.")]
    InvalidLiteral(CompactString),
    #[error("Expression is nested too deeply.")]
    TooDeep,
    #[error("Encountered a lexer error {0}.")]
    LexicalError(#[from] LexicalError),
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind}")]
pub struct ParserError {
    #[source]
    pub kind: ParserErrorKind,
    pub span: Span,
}

impl ParserError {
    pub fn code(&self) -> &'static str {
        match &self.kind {
            ParserErrorKind::UnexpectedToken { .. } => "PA001",
            ParserErrorKind::NonExpression(_) => "PA002",
            ParserErrorKind::NonType(_) => "PA003",
            ParserErrorKind::NonAssignmentOperator(_) => "PA004",
            ParserErrorKind::NonDeclaration(_) => "PA005",
            ParserErrorKind::UnexpectedEof => "PA006",
            ParserErrorKind::InvalidLiteral(_) => "PA007",
            ParserErrorKind::TooDeep => "PA008",
            ParserErrorKind::LexicalError(error) => error.code(),
        }
    }
}

impl From<LexicalError> for ParserError {
    fn from(error: LexicalError) -> Self {
        Self {
            span: error.span,
            kind: ParserErrorKind::LexicalError(error),
        }
    }
}
