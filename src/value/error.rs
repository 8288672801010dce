use super::ValueType;
use num_bigint::BigInt;
use thiserror::Error;

/// Failure of a single value-level operation. Every variant names the type
/// whose zero value stands in for the missing result.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OperationError {
    #[error("division by 0")]
    DivisionByZero(ValueType),
    #[error("modulo by 0")]
    ModuloByZero,
    #[error("index `{index}` out of range for length {length}")]
    IndexOutOfRange {
        index: BigInt,
        length: usize,
        fallback: ValueType,
    },
    #[error("mismatched types for {operation}: got {lhs} and {rhs}")]
    MismatchedTypes {
        operation: &'static str,
        lhs: ValueType,
        rhs: ValueType,
    },
    #[error("operation {operation} not allowed on {operand}")]
    InvalidOperand {
        operation: &'static str,
        operand: ValueType,
    },
    #[error("type not indexable: {0}")]
    NotIndexable(ValueType),
}

impl OperationError {
    pub fn fallback(&self) -> ValueType {
        match self {
            OperationError::DivisionByZero(result_type) => result_type.clone(),
            OperationError::ModuloByZero => ValueType::int(),
            OperationError::IndexOutOfRange { fallback, .. } => fallback.clone(),
            OperationError::MismatchedTypes { .. }
            | OperationError::InvalidOperand { .. }
            | OperationError::NotIndexable(_) => ValueType::none(),
        }
    }
}
