mod error;
pub mod formatter;
mod token;

pub use error::{LexicalError, LexicalErrorKind};
use compact_str::CompactString;
use std::{rc::Rc, str::CharIndices};
pub use token::{Span, SpanIndex, Token, TokenKind, KEYWORD_HASHMAP};

/// Maps byte offsets to 1-based line numbers.
#[derive(Debug, Clone)]
pub struct LineBreaks {
    line_starts: Rc<[usize]>,
}

impl LineBreaks {
    pub fn new(text: &str) -> Self {
        let line_starts: Vec<usize> = std::iter::once(0)
            .chain(
                text.bytes()
                    .enumerate()
                    .filter(|(_, byte)| *byte == b'\n')
                    .map(|(offset, _)| offset + 1),
            )
            .collect();
        Self {
            line_starts: line_starts.into(),
        }
    }

    pub fn get_max_line(&self) -> u32 {
        self.line_starts.len() as u32
    }

    pub fn get_line(&self, offset: SpanIndex) -> u32 {
        let offset = offset.to_usize();
        self.line_starts.partition_point(|&start| start <= offset) as u32
    }

    pub fn get_line_from_span(&self, span: Span) -> u32 {
        self.get_line(span.start)
    }
}

#[derive(Debug, Clone)]
pub struct Lexer<'src> {
    source: &'src str,
    chars: CharIndices<'src>,
    line_breaks: LineBreaks,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.char_indices(),
            line_breaks: LineBreaks::new(source),
        }
    }

    pub fn get_source(&self) -> &'src str {
        self.source
    }

    pub fn get_line_breaks(&self) -> LineBreaks {
        self.line_breaks.clone()
    }

    pub fn get_lexeme(&self, span: &Span) -> Option<&'src str> {
        self.source.get(span.range())
    }
}

impl<'src> Lexer<'src> {
    fn next_char(&mut self) -> Option<(usize, char)> {
        self.chars.next()
    }

    fn peek_char(&self) -> Option<char> {
        self.chars.clone().next().map(|(_, c)| c)
    }

    fn peek_second_char(&self) -> Option<char> {
        let mut lookahead = self.chars.clone();
        lookahead.next();
        lookahead.next().map(|(_, c)| c)
    }

    fn offset(&self) -> usize {
        self.chars.offset()
    }

    fn eat_if(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            let _ = self.next_char();
            true
        } else {
            false
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek_char() {
                Some(c) if c.is_whitespace() => {
                    let _ = self.next_char();
                }
                Some('/') if self.peek_second_char() == Some('/') => {
                    while let Some(c) = self.peek_char() {
                        if c == '\n' {
                            break;
                        }
                        let _ = self.next_char();
                    }
                }
                _ => return,
            }
        }
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            span: Span::new(start, self.offset()),
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexicalError> {
        self.skip_trivia();

        let Some((start, c)) = self.next_char() else {
            let end = self.source.len();
            return Ok(Token {
                kind: TokenKind::Eof,
                span: Span::new(end, end),
            });
        };

        let kind = match c {
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            '(' => TokenKind::LeftParenthesis,
            ')' => TokenKind::RightParenthesis,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semicolon,
            '_' => TokenKind::Underscore,
            '=' => TokenKind::Equal,
            '+' if self.eat_if('=') => TokenKind::PlusEqual,
            '+' => TokenKind::Plus,
            '-' if self.eat_if('=') => TokenKind::MinusEqual,
            '-' => TokenKind::Minus,
            '*' if self.eat_if('=') => TokenKind::StarEqual,
            '*' => TokenKind::Star,
            '/' if self.eat_if('=') => TokenKind::SlashEqual,
            '/' => TokenKind::Slash,
            '%' if self.eat_if('=') => TokenKind::PercentEqual,
            '%' => TokenKind::Percent,
            '>' if self.eat_if('=') => TokenKind::GreaterThanEqual,
            '>' => TokenKind::GreaterThan,
            '<' if self.eat_if('=') => TokenKind::LessThanEqual,
            '<' if self.eat_if('|') => TokenKind::LeftTriangle,
            '<' => TokenKind::LessThan,
            '|' if self.eat_if('>') => TokenKind::RightTriangle,
            '"' => return self.lex_string(start),
            '0'..='9' => self.lex_number(),
            'a'..='z' | 'A'..='Z' => {
                while matches!(self.peek_char(), Some(c) if c.is_ascii_alphabetic()) {
                    let _ = self.next_char();
                }
                let lexeme = &self.source[start..self.offset()];
                KEYWORD_HASHMAP
                    .get(lexeme)
                    .copied()
                    .unwrap_or(TokenKind::Ident)
            }
            _ => {
                return Err(LexicalError {
                    kind: LexicalErrorKind::Unrecognized(c),
                    span: Span::new(start, start + c.len_utf8()),
                })
            }
        };

        Ok(self.token(kind, start))
    }

    fn lex_number(&mut self) -> TokenKind {
        while matches!(self.peek_char(), Some('0'..='9')) {
            let _ = self.next_char();
        }
        let is_decimal =
            self.peek_char() == Some('.') && matches!(self.peek_second_char(), Some('0'..='9'));
        if !is_decimal {
            return TokenKind::IntLiteral;
        }
        let _ = self.next_char();
        while matches!(self.peek_char(), Some('0'..='9')) {
            let _ = self.next_char();
        }
        TokenKind::DecLiteral
    }

    fn lex_string(&mut self, start: usize) -> Result<Token, LexicalError> {
        loop {
            match self.next_char() {
                None => {
                    return Err(LexicalError {
                        kind: LexicalErrorKind::UnclosedString,
                        span: Span::new(start, self.source.len()),
                    })
                }
                Some((_, '"')) => return Ok(self.token(TokenKind::StringLiteral, start)),
                Some((escape_start, '\\')) => match self.next_char() {
                    Some((_, c)) if escape_char(c).is_some() => {}
                    Some((_, c)) => {
                        return Err(LexicalError {
                            kind: LexicalErrorKind::UnknownEscape(c),
                            span: Span::new(escape_start, self.offset()),
                        })
                    }
                    None => {
                        return Err(LexicalError {
                            kind: LexicalErrorKind::UnclosedString,
                            span: Span::new(start, self.source.len()),
                        })
                    }
                },
                Some(_) => {}
            }
        }
    }
}

fn escape_char(c: char) -> Option<char> {
    match c {
        'n' => Some('\n'),
        't' => Some('\t'),
        'r' => Some('\r'),
        '0' => Some('\0'),
        '\\' => Some('\\'),
        '"' => Some('"'),
        _ => None,
    }
}

/// Strips the quotes from a string literal lexeme and resolves its escapes.
pub fn unescape_string(lexeme: &str) -> Result<CompactString, LexicalErrorKind> {
    let inner = lexeme
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or(LexicalErrorKind::UnclosedString)?;

    let mut value = CompactString::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            value.push(c);
            continue;
        }
        let escaped = chars.next().ok_or(LexicalErrorKind::UnclosedString)?;
        value.push(escape_char(escaped).ok_or(LexicalErrorKind::UnknownEscape(escaped))?);
    }
    Ok(value)
}
