mod error;
pub mod expression;
pub mod formatter;
mod program;

pub use error::{ParserError, ParserErrorKind};
use expression::{
    BinaryOperator, Block, Declaration, DeclarationKind, ElseBranch, Expression, ExpressionKind,
    IfExpression, Literal, MapEntry, TypeExpression, TypeExpressionKind, UnaryOperator,
};
pub use program::Program;

use crate::{
    lexer::{unescape_string, Lexer, LexicalError, LineBreaks, Span, Token, TokenKind},
    string::Ident,
    MAX_NESTING_DEPTH,
};
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use std::str::FromStr;

/// A block and each statement inside it count as separate parser levels.
const MAX_PARSE_DEPTH: usize = 2 * MAX_NESTING_DEPTH;

pub struct Parser<'src> {
    lexer: Lexer<'src>,
    lookahead: Option<Result<Token, ParserError>>,
    depth: usize,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            lexer: Lexer::new(source),
            lookahead: None,
            depth: 0,
        }
    }

    pub fn get_source(&self) -> &'src str {
        self.lexer.get_source()
    }

    pub fn get_line_breaks(&self) -> LineBreaks {
        self.lexer.get_line_breaks()
    }

    fn peek(&mut self) -> Result<Token, ParserError> {
        match self.lookahead {
            Some(ref token_or_error) => token_or_error.clone(),
            None => {
                let next_token = self.next_token();
                self.lookahead = Some(next_token.clone());
                next_token
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, ParserError> {
        match self.lookahead.take() {
            Some(token_or_error) => token_or_error,
            None => self.lexer.next_token().map_err(ParserError::from),
        }
    }

    fn expect(&mut self, expected: TokenKind) -> Result<Token, ParserError> {
        let next_token = self.next_token()?;
        if next_token.kind == TokenKind::Eof && expected != TokenKind::Eof {
            return Err(ParserError {
                kind: ParserErrorKind::UnexpectedEof,
                span: next_token.span,
            });
        }
        if next_token.kind != expected {
            Err(ParserError {
                kind: ParserErrorKind::UnexpectedToken {
                    actual: next_token.kind,
                    expected,
                },
                span: next_token.span,
            })
        } else {
            Ok(next_token)
        }
    }

    fn eat_if(&mut self, next: TokenKind) -> Result<Option<Token>, ParserError> {
        let next_token = self.peek()?;
        if next_token.kind != next {
            Ok(None)
        } else {
            self.next_token()?;
            Ok(Some(next_token))
        }
    }

    fn lexeme(&self, token: &Token) -> &'src str {
        self.lexer.get_lexeme(&token.span).unwrap_or_default()
    }

    fn expect_ident(&mut self) -> Result<Ident, ParserError> {
        let token = self.expect(TokenKind::Ident)?;
        Ok(Ident {
            name: self.lexeme(&token).into(),
            span: token.span,
        })
    }

    fn descend(&mut self, span: Span) -> Result<(), ParserError> {
        self.depth += 1;
        if self.depth > MAX_PARSE_DEPTH {
            return Err(ParserError {
                kind: ParserErrorKind::TooDeep,
                span,
            });
        }
        Ok(())
    }

    fn ascend(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

// Parse program/statements
impl<'src> Parser<'src> {
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn parse(&mut self) -> Result<Program, ParserError> {
        let mut statements = Vec::new();

        loop {
            let first = self.peek()?;
            match first.kind {
                TokenKind::Eof => break,
                TokenKind::Semicolon => {
                    self.next_token()?;
                }
                _ => {
                    statements.push(self.parse_statement()?);
                    self.expect(TokenKind::Semicolon)?;
                }
            }
        }

        tracing::debug!(statements = statements.len(), "parsed program");
        Ok(Program::new(statements))
    }

    fn parse_statement(&mut self) -> Result<Expression, ParserError> {
        let first = self.peek()?;
        match first.kind {
            TokenKind::KeywordReturn | TokenKind::KeywordBreak => {
                self.next_token()?;
                let next = self.peek()?;
                let operand = match next.kind {
                    TokenKind::Semicolon | TokenKind::RightBrace | TokenKind::Eof => None,
                    _ => Some(Box::new(self.parse_expression()?)),
                };
                let span = operand
                    .as_ref()
                    .map_or(first.span, |operand| first.span.merge(&operand.span));
                let kind = if first.kind == TokenKind::KeywordReturn {
                    ExpressionKind::Return(operand)
                } else {
                    ExpressionKind::Break(operand)
                };
                Ok(Expression::new(kind, span))
            }
            _ => self.parse_expression(),
        }
    }

    pub fn parse_expression(&mut self) -> Result<Expression, ParserError> {
        let first = self.peek()?;
        self.descend(first.span)?;
        let expression = match first.kind {
            TokenKind::KeywordVar | TokenKind::KeywordConst => self
                .parse_declaration()
                .map(|declaration| {
                    let span = declaration.span;
                    Expression::new(ExpressionKind::Declaration(declaration), span)
                }),
            TokenKind::KeywordSet => self.parse_assignment(),
            TokenKind::KeywordIf => self.parse_if().map(|(if_expression, span)| {
                Expression::new(ExpressionKind::If(if_expression), span)
            }),
            TokenKind::KeywordFor => self.parse_for(),
            TokenKind::LeftBrace => self.parse_block().map(|block| {
                let span = block.span;
                Expression::new(ExpressionKind::Block(block), span)
            }),
            _ => self.parse_expression_pratt(0),
        };
        self.ascend();
        expression
    }

    fn parse_block(&mut self) -> Result<Block, ParserError> {
        let open = self.expect(TokenKind::LeftBrace)?;
        let mut statements = Vec::new();

        let close = loop {
            let next = self.peek()?;
            match next.kind {
                TokenKind::RightBrace => break self.next_token()?,
                TokenKind::Semicolon => {
                    self.next_token()?;
                }
                TokenKind::Eof => {
                    return Err(ParserError {
                        kind: ParserErrorKind::UnexpectedEof,
                        span: next.span,
                    })
                }
                _ => {
                    statements.push(self.parse_statement()?);
                    // The last statement of a block may omit its semicolon.
                    if self.eat_if(TokenKind::Semicolon)?.is_none() {
                        break self.expect(TokenKind::RightBrace)?;
                    }
                }
            }
        };

        Ok(Block {
            statements,
            span: open.span.merge(&close.span),
        })
    }

    fn parse_declaration(&mut self) -> Result<Declaration, ParserError> {
        let keyword = self.next_token()?;
        let kind = match keyword.kind {
            TokenKind::KeywordVar => DeclarationKind::Var,
            TokenKind::KeywordConst => DeclarationKind::Const,
            other => {
                return Err(ParserError {
                    kind: ParserErrorKind::NonDeclaration(other),
                    span: keyword.span,
                })
            }
        };
        let name = self.expect_ident()?;
        let value_type = self.parse_type()?;
        self.expect(TokenKind::KeywordIs)?;
        let value = self.parse_expression()?;
        let span = keyword.span.merge(&value.span);

        Ok(Declaration {
            kind,
            name,
            value_type,
            value: Box::new(value),
            span,
        })
    }

    fn parse_assignment(&mut self) -> Result<Expression, ParserError> {
        let keyword = self.expect(TokenKind::KeywordSet)?;
        let name = self.expect_ident()?;
        let operator_token = self.next_token()?;
        let operator = match operator_token.kind {
            TokenKind::KeywordIs => None,
            TokenKind::PlusEqual => Some(BinaryOperator::Add),
            TokenKind::MinusEqual => Some(BinaryOperator::Subtract),
            TokenKind::StarEqual => Some(BinaryOperator::Multiply),
            TokenKind::SlashEqual => Some(BinaryOperator::Divide),
            TokenKind::PercentEqual => Some(BinaryOperator::Modulo),
            other => {
                return Err(ParserError {
                    kind: ParserErrorKind::NonAssignmentOperator(other),
                    span: operator_token.span,
                })
            }
        };
        let value = self.parse_expression()?;
        let span = keyword.span.merge(&value.span);

        // `set x += e` is sugar for `set x is x + e`.
        let value = match operator {
            None => value,
            Some(operator) => {
                let value_span = name.span.merge(&value.span);
                let current = Expression::new(ExpressionKind::Identifier(name.clone()), name.span);
                Expression::new(
                    ExpressionKind::Binary {
                        operator,
                        lhs: Box::new(current),
                        rhs: Box::new(value),
                    },
                    value_span,
                )
            }
        };

        Ok(Expression::new(
            ExpressionKind::Assignment {
                name,
                value: Box::new(value),
            },
            span,
        ))
    }

    fn parse_if(&mut self) -> Result<(IfExpression, Span), ParserError> {
        let keyword = self.expect(TokenKind::KeywordIf)?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::KeywordThen)?;
        let then = self.parse_block()?;
        let mut span = keyword.span.merge(&then.span);

        let else_branch = match self.eat_if(TokenKind::KeywordElse)? {
            None => None,
            Some(_) => {
                if self.peek()?.kind == TokenKind::KeywordIf {
                    let (nested, nested_span) = self.parse_if()?;
                    span = span.merge(&nested_span);
                    Some(ElseBranch::ElseIf(Box::new(nested), nested_span))
                } else {
                    let block = self.parse_block()?;
                    span = span.merge(&block.span);
                    Some(ElseBranch::Else(block))
                }
            }
        };

        Ok((
            IfExpression {
                condition: Box::new(condition),
                then,
                else_branch,
            },
            span,
        ))
    }

    fn parse_for(&mut self) -> Result<Expression, ParserError> {
        let keyword = self.expect(TokenKind::KeywordFor)?;
        let mut declarations = vec![self.parse_declaration()?];
        while self.eat_if(TokenKind::Comma)?.is_some() {
            declarations.push(self.parse_declaration()?);
        }
        let body = self.parse_block()?;
        let span = keyword.span.merge(&body.span);

        Ok(Expression::new(
            ExpressionKind::For { declarations, body },
            span,
        ))
    }

    fn parse_type(&mut self) -> Result<TypeExpression, ParserError> {
        let token = self.next_token()?;
        let (kind, span) = match token.kind {
            TokenKind::TypeNone => (TypeExpressionKind::None, token.span),
            TokenKind::TypeInt => (TypeExpressionKind::Int, token.span),
            TokenKind::TypeDec => (TypeExpressionKind::Dec, token.span),
            TokenKind::TypeStr => (TypeExpressionKind::Str, token.span),
            TokenKind::TypeBool => (TypeExpressionKind::Bool, token.span),
            TokenKind::TypeList => {
                self.expect(TokenKind::LeftBracket)?;
                let element = self.parse_type()?;
                let close = self.expect(TokenKind::RightBracket)?;
                (
                    TypeExpressionKind::List(Box::new(element)),
                    token.span.merge(&close.span),
                )
            }
            TokenKind::TypeMap => {
                self.expect(TokenKind::LeftBracket)?;
                let key = self.parse_type()?;
                self.expect(TokenKind::RightBracket)?;
                let value = self.parse_type()?;
                let span = token.span.merge(&value.span);
                (TypeExpressionKind::Map(Box::new(key), Box::new(value)), span)
            }
            TokenKind::Eof => {
                return Err(ParserError {
                    kind: ParserErrorKind::UnexpectedEof,
                    span: token.span,
                })
            }
            other => {
                return Err(ParserError {
                    kind: ParserErrorKind::NonType(other),
                    span: token.span,
                })
            }
        };
        Ok(TypeExpression { kind, span })
    }
}

// Pratt parser for expressions
impl<'src> Parser<'src> {
    fn peek_binary_operator(&mut self) -> Result<Option<BinaryOperator>, ParserError> {
        let token = self.peek()?;

        let operator = match token.kind {
            TokenKind::Plus => BinaryOperator::Add,
            TokenKind::Minus => BinaryOperator::Subtract,
            TokenKind::Star => BinaryOperator::Multiply,
            TokenKind::Slash => BinaryOperator::Divide,
            TokenKind::Percent => BinaryOperator::Modulo,
            TokenKind::Equal => BinaryOperator::Equal,
            TokenKind::GreaterThan => BinaryOperator::GreaterThan,
            TokenKind::LessThan => BinaryOperator::LessThan,
            TokenKind::GreaterThanEqual => BinaryOperator::GreaterThanEqual,
            TokenKind::LessThanEqual => BinaryOperator::LessThanEqual,
            TokenKind::KeywordAnd => BinaryOperator::And,
            TokenKind::KeywordOr => BinaryOperator::Or,
            TokenKind::Underscore => BinaryOperator::Index,
            _ => return Ok(None),
        };
        Ok(Some(operator))
    }

    fn parse_expression_pratt(&mut self, min_bp: u8) -> Result<Expression, ParserError> {
        let first = self.peek()?;
        self.descend(first.span)?;
        let mut lhs = self.expect_left_expression()?;

        while let Some(operator) = self.peek_binary_operator()? {
            let (lbp, rbp) = operator.get_binding_power();
            if lbp < min_bp {
                break;
            }
            self.next_token()?;

            let rhs = self.parse_expression_pratt(rbp)?;
            let span = lhs.span.merge(&rhs.span);
            lhs = Expression::new(
                ExpressionKind::Binary {
                    operator,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            );
        }

        self.ascend();
        Ok(lhs)
    }

    fn expect_left_expression(&mut self) -> Result<Expression, ParserError> {
        let token = self.next_token()?;
        let lexeme = self.lexeme(&token);

        let kind = match token.kind {
            TokenKind::IntLiteral => {
                let value = BigInt::from_str(lexeme).map_err(|_| ParserError {
                    kind: ParserErrorKind::InvalidLiteral(lexeme.into()),
                    span: token.span,
                })?;
                ExpressionKind::Literal(Literal::Int(value))
            }
            TokenKind::DecLiteral => {
                let value = BigDecimal::from_str(lexeme).map_err(|_| ParserError {
                    kind: ParserErrorKind::InvalidLiteral(lexeme.into()),
                    span: token.span,
                })?;
                ExpressionKind::Literal(Literal::Dec(value))
            }
            TokenKind::StringLiteral => {
                let value = unescape_string(lexeme).map_err(|kind| {
                    ParserError::from(LexicalError {
                        kind,
                        span: token.span,
                    })
                })?;
                ExpressionKind::Literal(Literal::Str(value))
            }
            TokenKind::KeywordTrue => ExpressionKind::Literal(Literal::Bool(true)),
            TokenKind::KeywordFalse => ExpressionKind::Literal(Literal::Bool(false)),
            TokenKind::Ident => {
                let ident = Ident {
                    name: lexeme.into(),
                    span: token.span,
                };
                if self.eat_if(TokenKind::LeftParenthesis)?.is_some() {
                    let (arguments, close) =
                        self.parse_expression_list(TokenKind::RightParenthesis)?;
                    return Ok(Expression::new(
                        ExpressionKind::Call {
                            callee: ident,
                            arguments,
                        },
                        token.span.merge(&close.span),
                    ));
                }
                ExpressionKind::Identifier(ident)
            }
            TokenKind::LeftBracket => {
                let (elements, close) = self.parse_expression_list(TokenKind::RightBracket)?;
                return Ok(Expression::new(
                    ExpressionKind::List(elements),
                    token.span.merge(&close.span),
                ));
            }
            TokenKind::LeftTriangle => {
                let (entries, close) = self.parse_map_entries()?;
                return Ok(Expression::new(
                    ExpressionKind::Map(entries),
                    token.span.merge(&close.span),
                ));
            }
            // Unary operators
            TokenKind::Minus | TokenKind::KeywordNot => {
                let operator = if token.kind == TokenKind::Minus {
                    UnaryOperator::Minus
                } else {
                    UnaryOperator::Not
                };
                let rhs = self.parse_expression_pratt(operator.get_binding_power())?;
                let span = token.span.merge(&rhs.span);
                return Ok(Expression::new(
                    ExpressionKind::Unary {
                        operator,
                        rhs: Box::new(rhs),
                    },
                    span,
                ));
            }
            // Bracketed expression
            TokenKind::LeftParenthesis => {
                let inner = self.parse_expression()?;
                let close = self.expect(TokenKind::RightParenthesis)?;
                return Ok(Expression::new(inner.kind, token.span.merge(&close.span)));
            }
            TokenKind::Eof => {
                return Err(ParserError {
                    kind: ParserErrorKind::UnexpectedEof,
                    span: token.span,
                })
            }
            kind => {
                return Err(ParserError {
                    kind: ParserErrorKind::NonExpression(kind),
                    span: token.span,
                })
            }
        };
        Ok(Expression::new(kind, token.span))
    }

    /// Comma separated expressions with an optional trailing comma, up to and including `end`.
    fn parse_expression_list(
        &mut self,
        end: TokenKind,
    ) -> Result<(Vec<Expression>, Token), ParserError> {
        let mut expressions = Vec::new();
        loop {
            if let Some(close) = self.eat_if(end)? {
                return Ok((expressions, close));
            }
            expressions.push(self.parse_expression()?);
            if self.eat_if(TokenKind::Comma)?.is_none() {
                let close = self.expect(end)?;
                return Ok((expressions, close));
            }
        }
    }

    fn parse_map_entries(&mut self) -> Result<(Vec<MapEntry>, Token), ParserError> {
        let mut entries = Vec::new();
        loop {
            if let Some(close) = self.eat_if(TokenKind::RightTriangle)? {
                return Ok((entries, close));
            }
            let key = self.parse_expression()?;
            self.expect(TokenKind::Colon)?;
            let value = self.parse_expression()?;
            entries.push(MapEntry { key, value });
            if self.eat_if(TokenKind::Comma)?.is_none() {
                let close = self.expect(TokenKind::RightTriangle)?;
                return Ok((entries, close));
            }
        }
    }
}
