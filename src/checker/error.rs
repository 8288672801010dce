use crate::{lexer::Span, string::IdentName, value::ValueType};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TypeErrorKind {
    #[error("mismatched types: got {expected} and {actual} at {at}")]
    MismatchedTypes {
        expected: ValueType,
        actual: ValueType,
        at: String,
    },
    #[error("identifier not found: {0}")]
    IdentifierNotFound(IdentName),
    #[error("cannot assign to constant: {0}")]
    AssignToConstant(IdentName),
    #[error("mixed types in list: expected {expected}, got {actual}")]
    MixedList {
        expected: ValueType,
        actual: ValueType,
    },
    #[error("mixed types in map: expected {expected}, got {actual}")]
    MixedMap {
        expected: ValueType,
        actual: ValueType,
    },
    #[error("type not indexable: {0}")]
    NotIndexable(ValueType),
    #[error("collection {collection} is not indexable by {index}, expect {expected}")]
    InvalidIndex {
        collection: ValueType,
        index: ValueType,
        expected: ValueType,
    },
    #[error("only Int allowed for Mod: got {lhs} and {rhs}")]
    ModuloOperands { lhs: ValueType, rhs: ValueType },
    #[error("operation {operation} only allowed on Bool and Bool: got {lhs} and {rhs}")]
    TestOperands {
        operation: &'static str,
        lhs: ValueType,
        rhs: ValueType,
    },
    #[error("operation Not only allowed on Bool: got {0}")]
    NotOperand(ValueType),
    #[error("operation UnaryMinus only allowed on Int and Dec: got {0}")]
    MinusOperand(ValueType),
    #[error("types are not comparable for {operation}: got {lhs} and {rhs}")]
    NotComparable {
        operation: &'static str,
        lhs: ValueType,
        rhs: ValueType,
    },
    #[error("operation {operation} not allowed on {lhs} and {rhs}")]
    InvalidOperands {
        operation: &'static str,
        lhs: ValueType,
        rhs: ValueType,
    },
    #[error("condition must be Bool: got {0}")]
    NonBoolCondition(ValueType),
    #[error("mismatched branch types: then branch is {then}, other branch is {other}")]
    BranchMismatch { then: ValueType, other: ValueType },
    #[error("mismatched exit types: expected {expected}, got {actual}")]
    ExitMismatch {
        expected: ValueType,
        actual: ValueType,
    },
    #[error("function `{0}` does not exist")]
    UnknownFunction(IdentName),
    #[error("incorrect number of arguments for `{function}`: got {actual}, want {expected}")]
    ArgumentCount {
        function: &'static str,
        actual: usize,
        expected: usize,
    },
    #[error("invalid argument for `{function}`: got {actual}")]
    InvalidArgument {
        function: &'static str,
        actual: ValueType,
    },
    #[error("expression nested too deeply")]
    TooDeep,
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind}")]
pub struct TypeError {
    #[source]
    pub kind: TypeErrorKind,
    pub span: Span,
}

impl TypeError {
    pub fn code(&self) -> &'static str {
        match self.kind {
            TypeErrorKind::MismatchedTypes { .. } => "TC001",
            TypeErrorKind::IdentifierNotFound(_) => "TC002",
            TypeErrorKind::AssignToConstant(_) => "TC003",
            TypeErrorKind::MixedList { .. } => "TC004",
            TypeErrorKind::MixedMap { .. } => "TC005",
            TypeErrorKind::NotIndexable(_) => "TC006",
            TypeErrorKind::InvalidIndex { .. } => "TC007",
            TypeErrorKind::ModuloOperands { .. } => "TC008",
            TypeErrorKind::TestOperands { .. } => "TC009",
            TypeErrorKind::NotOperand(_) => "TC010",
            TypeErrorKind::MinusOperand(_) => "TC011",
            TypeErrorKind::NotComparable { .. } => "TC012",
            TypeErrorKind::InvalidOperands { .. } => "TC013",
            TypeErrorKind::NonBoolCondition(_) => "TC014",
            TypeErrorKind::BranchMismatch { .. } => "TC015",
            TypeErrorKind::UnknownFunction(_) => "TC016",
            TypeErrorKind::ArgumentCount { .. } => "TC017",
            TypeErrorKind::InvalidArgument { .. } => "TC018",
            TypeErrorKind::TooDeep => "TC019",
            TypeErrorKind::ExitMismatch { .. } => "TC020",
        }
    }
}
