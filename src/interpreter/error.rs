use crate::{
    lexer::Span,
    string::IdentName,
    value::{error::OperationError, ValueType},
};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeErrorKind {
    #[error("{0}")]
    Operation(#[from] OperationError),
    #[error("identifier not found: {0}")]
    IdentifierNotFound(IdentName),
    #[error("cannot assign to constant: {0}")]
    AssignToConstant(IdentName),
    #[error("mismatched types: got {expected} and {actual}")]
    MismatchedTypes {
        expected: ValueType,
        actual: ValueType,
    },
    #[error("condition must be Bool: got {0}")]
    NonBoolCondition(ValueType),
    #[error("function `{0}` does not exist")]
    UnknownFunction(IdentName),
    #[error("incorrect number of arguments for `{function}`: got {actual}, want {expected}")]
    ArgumentCount {
        function: &'static str,
        actual: usize,
        expected: usize,
    },
    #[error("expression nested too deeply")]
    TooDeep,
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind}")]
pub struct RuntimeError {
    #[source]
    pub kind: RuntimeErrorKind,
    pub span: Span,
}

impl RuntimeError {
    pub fn code(&self) -> &'static str {
        match &self.kind {
            RuntimeErrorKind::Operation(error) => match error {
                OperationError::DivisionByZero(_) => "RT001",
                OperationError::ModuloByZero => "RT002",
                OperationError::IndexOutOfRange { .. } => "RT003",
                OperationError::MismatchedTypes { .. } => "RT004",
                OperationError::InvalidOperand { .. } => "RT005",
                OperationError::NotIndexable(_) => "RT006",
            },
            RuntimeErrorKind::IdentifierNotFound(_) => "RT007",
            RuntimeErrorKind::AssignToConstant(_) => "RT008",
            RuntimeErrorKind::MismatchedTypes { .. } => "RT009",
            RuntimeErrorKind::NonBoolCondition(_) => "RT010",
            RuntimeErrorKind::UnknownFunction(_) => "RT011",
            RuntimeErrorKind::ArgumentCount { .. } => "RT012",
            RuntimeErrorKind::TooDeep => "RT013",
        }
    }

    /// True for the division and modulo by zero family.
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self.kind,
            RuntimeErrorKind::Operation(
                OperationError::DivisionByZero(_) | OperationError::ModuloByZero
            )
        )
    }
}
