use super::{token::Token, unescape_string, LineBreaks, TokenKind};
use crate::lexer::{Lexer, LexicalError, LexicalErrorKind};

/// Interface for creating new token formatters.
pub trait TokenFormatter {
    /// Formats a token into a string.
    fn format(&self, token: &Token) -> String;
    /// Formats a lexer error into a string.
    fn format_lexical_error(&self, error: &LexicalError) -> String;
}

pub trait ToFormatter<F>
where
    F: TokenFormatter,
{
    fn create_formatter(&self) -> F;
}

/// One token per line as `KIND lexeme literal`.
pub struct BasicFormatter<'src> {
    text: &'src str,
    line_breaks: LineBreaks,
}

impl<'src> ToFormatter<BasicFormatter<'src>> for Lexer<'src> {
    fn create_formatter(&self) -> BasicFormatter<'src> {
        BasicFormatter {
            text: self.get_source(),
            line_breaks: self.get_line_breaks(),
        }
    }
}

impl<'src> TokenFormatter for BasicFormatter<'src> {
    fn format(&self, token: &Token) -> String {
        let lexeme = self.text.get(token.span.range()).unwrap_or_default();
        match token.kind {
            TokenKind::Eof => "EOF  null".into(),
            TokenKind::IntLiteral | TokenKind::DecLiteral => {
                format!("{} {lexeme} {lexeme}", token.kind)
            }
            TokenKind::StringLiteral => match unescape_string(lexeme) {
                Ok(value) => format!("STRING {lexeme} {value}"),
                Err(_) => format!("STRING {lexeme} null"),
            },
            kind => format!("{kind} {lexeme} null"),
        }
    }

    fn format_lexical_error(&self, error: &LexicalError) -> String {
        let line = self.line_breaks.get_line_from_span(error.span);
        match error.kind {
            LexicalErrorKind::Unrecognized(c) => {
                format!("[line {line}] Error: Unexpected character: {c}")
            }
            LexicalErrorKind::UnclosedString => {
                format!("[line {line}] Error: Unterminated string.")
            }
            LexicalErrorKind::UnknownEscape(c) => {
                format!("[line {line}] Error: Unknown escape sequence: \\{c}")
            }
        }
    }
}

pub struct DebugFormatter;

impl<'src> ToFormatter<DebugFormatter> for Lexer<'src> {
    fn create_formatter(&self) -> DebugFormatter {
        DebugFormatter {}
    }
}

impl TokenFormatter for DebugFormatter {
    fn format(&self, token: &Token) -> String {
        format!("{token:?}")
    }

    fn format_lexical_error(&self, error: &LexicalError) -> String {
        format!("{error:?}")
    }
}
