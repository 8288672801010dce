use super::{ListValue, MapValue, Value};
use crate::parser::expression::{TypeExpression, TypeExpressionKind};
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeName {
    None,
    Int,
    Dec,
    Str,
    Bool,
    List,
    Map,
}

impl TypeName {
    /// Number of type arguments a well-formed type with this name carries.
    pub fn arity(&self) -> usize {
        match self {
            TypeName::List => 1,
            TypeName::Map => 2,
            TypeName::None | TypeName::Int | TypeName::Dec | TypeName::Str | TypeName::Bool => 0,
        }
    }
}

impl Display for TypeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TypeName::None => "None",
            TypeName::Int => "Int",
            TypeName::Dec => "Dec",
            TypeName::Str => "Str",
            TypeName::Bool => "Bool",
            TypeName::List => "List",
            TypeName::Map => "Map",
        };
        write!(f, "{name}")
    }
}

/// Structural type descriptor shared by the checker and the evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValueType {
    name: TypeName,
    type_args: Vec<ValueType>,
}

impl ValueType {
    pub fn new(name: TypeName) -> Self {
        Self {
            name,
            type_args: Vec::new(),
        }
    }

    pub fn none() -> Self {
        Self::new(TypeName::None)
    }

    pub fn int() -> Self {
        Self::new(TypeName::Int)
    }

    pub fn dec() -> Self {
        Self::new(TypeName::Dec)
    }

    pub fn str() -> Self {
        Self::new(TypeName::Str)
    }

    pub fn bool() -> Self {
        Self::new(TypeName::Bool)
    }

    pub fn list(element: ValueType) -> Self {
        Self::new(TypeName::List).add_type_arg(element)
    }

    pub fn map(key: ValueType, value: ValueType) -> Self {
        Self::new(TypeName::Map)
            .add_type_arg(key)
            .add_type_arg(value)
    }

    pub fn add_type_arg(mut self, arg: ValueType) -> Self {
        self.type_args.push(arg);
        self
    }

    pub fn name(&self) -> TypeName {
        self.name
    }

    pub fn type_args(&self) -> &[ValueType] {
        &self.type_args
    }

    /// Deep structural equality.
    pub fn equal(&self, other: &ValueType) -> bool {
        self.name == other.name
            && self.type_args.len() == other.type_args.len()
            && self
                .type_args
                .iter()
                .zip(&other.type_args)
                .all(|(lhs, rhs)| lhs.equal(rhs))
    }

    pub fn not_equal(&self, other: &ValueType) -> bool {
        !self.equal(other)
    }

    /// Shallow equality on the name only.
    pub fn is(&self, other: &ValueType) -> bool {
        self.name == other.name
    }

    pub fn is_not(&self, other: &ValueType) -> bool {
        !self.is(other)
    }

    pub fn is_name(&self, name: TypeName) -> bool {
        self.name == name
    }

    pub fn is_not_name(&self, name: TypeName) -> bool {
        self.name != name
    }

    pub fn is_indexable(&self) -> bool {
        matches!(self.name, TypeName::Str | TypeName::List | TypeName::Map)
    }

    pub fn is_comparable(&self) -> bool {
        matches!(self.name, TypeName::Int | TypeName::Dec | TypeName::Str)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.name, TypeName::Int | TypeName::Dec)
    }

    /// Element type of a `List`, `None` for every other type.
    pub fn element_type(&self) -> ValueType {
        match self.name {
            TypeName::List => self.type_arg(0),
            _ => ValueType::none(),
        }
    }

    pub fn key_type(&self) -> ValueType {
        match self.name {
            TypeName::Map => self.type_arg(0),
            _ => ValueType::none(),
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self.name {
            TypeName::Map => self.type_arg(1),
            _ => ValueType::none(),
        }
    }

    fn type_arg(&self, index: usize) -> ValueType {
        self.type_args
            .get(index)
            .cloned()
            .unwrap_or_else(ValueType::none)
    }

    /// The default value of this type.
    pub fn zero_value(&self) -> Value {
        match self.name {
            TypeName::None => Value::None,
            TypeName::Int => Value::Int(BigInt::default()),
            TypeName::Dec => Value::Dec(BigDecimal::default()),
            TypeName::Str => Value::Str(Default::default()),
            TypeName::Bool => Value::Bool(false),
            TypeName::List => Value::List(ListValue::new(self.element_type(), Vec::new())),
            TypeName::Map => Value::Map(MapValue::new(self.key_type(), self.value_type())),
        }
    }

    /// Result type of mixing two numeric operands: `Dec` wins.
    pub fn promote(&self, other: &ValueType) -> ValueType {
        if self.is_name(TypeName::Dec) || other.is_name(TypeName::Dec) {
            ValueType::dec()
        } else {
            self.clone()
        }
    }
}

impl Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.type_args.as_slice() {
            [] => write!(f, "{}", self.name),
            [arg] => write!(f, "{}[{arg}]", self.name),
            [key, value] => write!(f, "{}[{key}]{value}", self.name),
            args => {
                write!(f, "{}[", self.name)?;
                for (index, arg) in args.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<&TypeExpression> for ValueType {
    fn from(value_type: &TypeExpression) -> Self {
        match &value_type.kind {
            TypeExpressionKind::None => ValueType::none(),
            TypeExpressionKind::Int => ValueType::int(),
            TypeExpressionKind::Dec => ValueType::dec(),
            TypeExpressionKind::Str => ValueType::str(),
            TypeExpressionKind::Bool => ValueType::bool(),
            TypeExpressionKind::List(element) => ValueType::list(element.as_ref().into()),
            TypeExpressionKind::Map(key, value) => {
                ValueType::map(key.as_ref().into(), value.as_ref().into())
            }
        }
    }
}
