mod operator;

use crate::{lexer::Span, string::Ident};
use bigdecimal::BigDecimal;
use compact_str::CompactString;
use num_bigint::BigInt;
pub use operator::{BinaryOperator, UnaryOperator};

/// A node of the syntax tree. Statements are expressions too; every node has a value.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    Literal(Literal),
    List(Vec<Expression>),
    Map(Vec<MapEntry>),
    Identifier(Ident),
    Unary {
        operator: UnaryOperator,
        rhs: Box<Expression>,
    },
    Binary {
        operator: BinaryOperator,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    Declaration(Declaration),
    Assignment {
        name: Ident,
        value: Box<Expression>,
    },
    Block(Block),
    If(IfExpression),
    For {
        declarations: Vec<Declaration>,
        body: Block,
    },
    Return(Option<Box<Expression>>),
    Break(Option<Box<Expression>>),
    Call {
        callee: Ident,
        arguments: Vec<Expression>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(BigInt),
    Dec(BigDecimal),
    Str(CompactString),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry {
    pub key: Expression,
    pub value: Expression,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Var,
    Const,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub kind: DeclarationKind,
    pub name: Ident,
    pub value_type: TypeExpression,
    pub value: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfExpression {
    pub condition: Box<Expression>,
    pub then: Block,
    pub else_branch: Option<ElseBranch>,
}

impl IfExpression {
    /// True when the chain ends in a plain `else`, so some branch always runs.
    pub fn is_exhaustive(&self) -> bool {
        match &self.else_branch {
            None => false,
            Some(ElseBranch::ElseIf(nested, _)) => nested.is_exhaustive(),
            Some(ElseBranch::Else(_)) => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElseBranch {
    ElseIf(Box<IfExpression>, Span),
    Else(Block),
}

/// A type as written in a declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeExpression {
    pub kind: TypeExpressionKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpressionKind {
    None,
    Int,
    Dec,
    Str,
    Bool,
    List(Box<TypeExpression>),
    Map(Box<TypeExpression>, Box<TypeExpression>),
}

impl Expression {
    pub fn new(kind: ExpressionKind, span: Span) -> Self {
        Self { kind, span }
    }
}
