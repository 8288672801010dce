use super::{error::OperationError, ListValue, TypeName, Value, ValueType};
use bigdecimal::BigDecimal;
use compact_str::CompactString;
use num_bigint::BigInt;
use num_traits::{Euclid, ToPrimitive, Zero};
use std::cmp::Ordering;

/// Significant digits kept by decimal division.
const DEC_DIVISION_PRECISION: u64 = 16;

enum Numeric<'a> {
    Int(&'a BigInt, &'a BigInt),
    Dec(BigDecimal, BigDecimal),
}

fn to_dec(value: &BigInt) -> BigDecimal {
    BigDecimal::new(value.clone(), 0)
}

/// Pairs two numeric operands, promoting to `Dec` when either side is one.
fn numeric<'a>(lhs: &'a Value, rhs: &'a Value) -> Option<Numeric<'a>> {
    match (lhs, rhs) {
        (Value::Int(l), Value::Int(r)) => Some(Numeric::Int(l, r)),
        (Value::Int(l), Value::Dec(r)) => Some(Numeric::Dec(to_dec(l), r.clone())),
        (Value::Dec(l), Value::Int(r)) => Some(Numeric::Dec(l.clone(), to_dec(r))),
        (Value::Dec(l), Value::Dec(r)) => Some(Numeric::Dec(l.clone(), r.clone())),
        _ => None,
    }
}

fn mismatched(operation: &'static str, lhs: &Value, rhs: &Value) -> OperationError {
    OperationError::MismatchedTypes {
        operation,
        lhs: lhs.value_type(),
        rhs: rhs.value_type(),
    }
}

impl Value {
    pub fn add(&self, rhs: &Value) -> Result<Value, OperationError> {
        if let Some(pair) = numeric(self, rhs) {
            return Ok(match pair {
                Numeric::Int(l, r) => Value::Int(l + r),
                Numeric::Dec(l, r) => Value::Dec(l + r),
            });
        }
        match (self, rhs) {
            (Value::Str(l), Value::Str(r)) => {
                let mut joined = CompactString::with_capacity(l.len() + r.len());
                joined.push_str(l);
                joined.push_str(r);
                Ok(Value::Str(joined))
            }
            (Value::List(l), Value::List(r)) if l.element_type.equal(&r.element_type) => {
                let elements = l.elements.iter().chain(&r.elements).cloned().collect();
                Ok(Value::List(ListValue::new(l.element_type.clone(), elements)))
            }
            _ => Err(mismatched("Add", self, rhs)),
        }
    }

    pub fn subtract(&self, rhs: &Value) -> Result<Value, OperationError> {
        if let Some(pair) = numeric(self, rhs) {
            return Ok(match pair {
                Numeric::Int(l, r) => Value::Int(l - r),
                Numeric::Dec(l, r) => Value::Dec(l - r),
            });
        }
        match (self, rhs) {
            // Removes every occurrence of the right string.
            (Value::Str(l), Value::Str(r)) if r.is_empty() => Ok(Value::Str(l.clone())),
            (Value::Str(l), Value::Str(r)) => Ok(Value::Str(l.replace(r.as_str(), "").into())),
            (Value::List(l), Value::List(r)) if l.element_type.equal(&r.element_type) => {
                let elements = l
                    .elements
                    .iter()
                    .filter(|kept| !r.elements.iter().any(|removed| removed.equal(kept)))
                    .cloned()
                    .collect();
                Ok(Value::List(ListValue::new(l.element_type.clone(), elements)))
            }
            _ => Err(mismatched("Sub", self, rhs)),
        }
    }

    pub fn multiply(&self, rhs: &Value) -> Result<Value, OperationError> {
        match numeric(self, rhs) {
            Some(Numeric::Int(l, r)) => Ok(Value::Int(l * r)),
            Some(Numeric::Dec(l, r)) => Ok(Value::Dec(l * r)),
            None => Err(mismatched("Mul", self, rhs)),
        }
    }

    /// Integer division is Euclidean: the remainder left by the quotient is never negative.
    pub fn divide(&self, rhs: &Value) -> Result<Value, OperationError> {
        match numeric(self, rhs) {
            Some(Numeric::Int(_, r)) if r.is_zero() => {
                Err(OperationError::DivisionByZero(ValueType::int()))
            }
            Some(Numeric::Int(l, r)) => Ok(Value::Int(l.div_euclid(r))),
            Some(Numeric::Dec(_, r)) if r.is_zero() => {
                Err(OperationError::DivisionByZero(ValueType::dec()))
            }
            Some(Numeric::Dec(l, r)) => {
                Ok(Value::Dec((l / r).with_prec(DEC_DIVISION_PRECISION)))
            }
            None => Err(mismatched("Div", self, rhs)),
        }
    }

    /// Euclidean remainder, always in `0..|rhs|`.
    pub fn modulo(&self, rhs: &Value) -> Result<Value, OperationError> {
        match (self, rhs) {
            (Value::Int(_), Value::Int(r)) if r.is_zero() => Err(OperationError::ModuloByZero),
            (Value::Int(l), Value::Int(r)) => Ok(Value::Int(l.rem_euclid(r))),
            _ => Err(mismatched("Mod", self, rhs)),
        }
    }

    pub fn negate(&self) -> Result<Value, OperationError> {
        match self {
            Value::Int(v) => Ok(Value::Int(-v)),
            Value::Dec(v) => Ok(Value::Dec(-v.clone())),
            _ => Err(OperationError::InvalidOperand {
                operation: "UnaryMinus",
                operand: self.value_type(),
            }),
        }
    }

    pub fn logical_not(&self) -> Result<Value, OperationError> {
        match self {
            Value::Bool(v) => Ok(Value::Bool(!v)),
            _ => Err(OperationError::InvalidOperand {
                operation: "Not",
                operand: self.value_type(),
            }),
        }
    }

    /// Ordering between two comparable values. Mixed `Int`/`Dec` operands are promoted.
    pub fn compare(
        &self,
        rhs: &Value,
        operation: &'static str,
    ) -> Result<Ordering, OperationError> {
        if let Some(pair) = numeric(self, rhs) {
            return Ok(match pair {
                Numeric::Int(l, r) => l.cmp(r),
                Numeric::Dec(l, r) => l.cmp(&r),
            });
        }
        match (self, rhs) {
            (Value::Str(l), Value::Str(r)) => Ok(l.cmp(r)),
            _ => Err(mismatched(operation, self, rhs)),
        }
    }

    pub fn index(&self, index: &Value) -> Result<Value, OperationError> {
        match (self, index) {
            (Value::Str(text), Value::Int(position)) => position
                .to_usize()
                .and_then(|position| text.chars().nth(position))
                .map(|c| Value::Str(std::iter::once(c).collect()))
                .ok_or_else(|| OperationError::IndexOutOfRange {
                    index: position.clone(),
                    length: text.chars().count(),
                    fallback: ValueType::str(),
                }),
            (Value::List(list), Value::Int(position)) => position
                .to_usize()
                .and_then(|position| list.elements.get(position))
                .cloned()
                .ok_or_else(|| OperationError::IndexOutOfRange {
                    index: position.clone(),
                    length: list.len(),
                    fallback: list.element_type.clone(),
                }),
            // A missing key reads as the zero value of the map's value type.
            (Value::Map(map), key) => Ok(map
                .get(key)
                .cloned()
                .unwrap_or_else(|| map.value_type.zero_value())),
            (Value::Str(_) | Value::List(_), _) => Err(mismatched("Indexing", self, index)),
            _ => Err(OperationError::NotIndexable(self.value_type())),
        }
    }

    /// Rune count for `Str`, element count for `List` and `Map`.
    pub fn len(&self) -> Result<usize, OperationError> {
        match self {
            Value::Str(text) => Ok(text.chars().count()),
            Value::List(list) => Ok(list.len()),
            Value::Map(map) => Ok(map.len()),
            _ => Err(OperationError::InvalidOperand {
                operation: "len",
                operand: self.value_type(),
            }),
        }
    }

    pub fn is_type(&self, name: TypeName) -> bool {
        self.value_type().is_name(name)
    }
}
