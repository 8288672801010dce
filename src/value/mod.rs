pub mod error;
mod operation;
mod types;

use bigdecimal::BigDecimal;
use compact_str::CompactString;
use num_bigint::BigInt;
pub use types::{TypeName, ValueType};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    None,
    Int(BigInt),
    Dec(BigDecimal),
    Str(CompactString),
    Bool(bool),
    List(ListValue),
    Map(MapValue),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListValue {
    element_type: ValueType,
    elements: Vec<Value>,
}

impl ListValue {
    pub fn new(element_type: ValueType, elements: Vec<Value>) -> Self {
        Self {
            element_type,
            elements,
        }
    }

    pub fn element_type(&self) -> &ValueType {
        &self.element_type
    }

    pub fn elements(&self) -> &[Value] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Insertion-ordered map keyed by structural value equality.
#[derive(Debug, Clone)]
pub struct MapValue {
    key_type: ValueType,
    value_type: ValueType,
    entries: Vec<(Value, Value)>,
}

impl MapValue {
    pub fn new(key_type: ValueType, value_type: ValueType) -> Self {
        Self {
            key_type,
            value_type,
            entries: Vec::new(),
        }
    }

    pub fn key_type(&self) -> &ValueType {
        &self.key_type
    }

    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    pub fn entries(&self) -> &[(Value, Value)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.equal(key))
            .map(|(_, value)| value)
    }

    /// Replaces the value of an existing key in place, otherwise appends.
    pub fn insert(&mut self, key: Value, value: Value) {
        match self
            .entries
            .iter_mut()
            .find(|(existing, _)| existing.equal(&key))
        {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }
}

impl PartialEq for MapValue {
    fn eq(&self, other: &Self) -> bool {
        self.key_type.equal(&other.key_type)
            && self.value_type.equal(&other.value_type)
            && self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .all(|(key, value)| other.get(key).is_some_and(|found| found.equal(value)))
    }
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::None => ValueType::none(),
            Value::Int(_) => ValueType::int(),
            Value::Dec(_) => ValueType::dec(),
            Value::Str(_) => ValueType::str(),
            Value::Bool(_) => ValueType::bool(),
            Value::List(list) => ValueType::list(list.element_type.clone()),
            Value::Map(map) => ValueType::map(map.key_type.clone(), map.value_type.clone()),
        }
    }

    /// Identical types and structurally equal payloads.
    pub fn equal(&self, other: &Value) -> bool {
        self.value_type().equal(&other.value_type()) && self == other
    }

    /// Text written by `print` and `println`.
    pub fn render(&self) -> String {
        self.to_string()
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<&BigInt> {
        match self {
            Value::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_dec(&self) -> Option<&BigDecimal> {
        match self {
            Value::Dec(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListValue> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapValue> {
        match self {
            Value::Map(v) => Some(v),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::None => write!(f, "none"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Dec(v) => write!(f, "{}", v.normalized().to_plain_string()),
            Value::Str(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::List(list) => {
                write!(f, "[")?;
                for element in &list.elements {
                    write!(f, "{element},")?;
                }
                write!(f, "]")
            }
            Value::Map(map) => {
                write!(f, "<|")?;
                for (key, value) in &map.entries {
                    write!(f, "{key}:{value},")?;
                }
                write!(f, "|>")
            }
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(BigInt::from(value))
    }
}

impl From<BigInt> for Value {
    fn from(value: BigInt) -> Self {
        Value::Int(value)
    }
}

impl From<BigDecimal> for Value {
    fn from(value: BigDecimal) -> Self {
        Value::Dec(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.into())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}
