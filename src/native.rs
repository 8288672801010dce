use crate::{
    checker::TypeErrorKind,
    interpreter::{RuntimeErrorKind, SystemContext},
    value::{TypeName, Value, ValueType},
};
use num_bigint::BigInt;

/// A function provided by the host rather than written in nice-expr.
pub trait NativeFunction: std::fmt::Debug + Send + Sync {
    fn get_name(&self) -> &'static str;
    /// Result type of a call with arguments of the given types.
    fn check(&self, arguments: &[ValueType]) -> Result<ValueType, TypeErrorKind>;
    fn call(
        &self,
        arguments: &[Value],
        context: &mut dyn SystemContext,
    ) -> Result<Value, RuntimeErrorKind>;
}

static NATIVE_FUNCTIONS: [&dyn NativeFunction; 3] = [&NativePrint, &NativePrintln, &NativeLen];

pub fn find_native(name: &str) -> Option<&'static dyn NativeFunction> {
    NATIVE_FUNCTIONS
        .iter()
        .copied()
        .find(|native| native.get_name() == name)
}

#[derive(Debug)]
pub struct NativePrint;

impl NativeFunction for NativePrint {
    fn get_name(&self) -> &'static str {
        "print"
    }

    fn check(&self, _arguments: &[ValueType]) -> Result<ValueType, TypeErrorKind> {
        Ok(ValueType::none())
    }

    fn call(
        &self,
        arguments: &[Value],
        context: &mut dyn SystemContext,
    ) -> Result<Value, RuntimeErrorKind> {
        for argument in arguments {
            context.write(&argument.render());
        }
        Ok(Value::None)
    }
}

#[derive(Debug)]
pub struct NativePrintln;

impl NativeFunction for NativePrintln {
    fn get_name(&self) -> &'static str {
        "println"
    }

    fn check(&self, _arguments: &[ValueType]) -> Result<ValueType, TypeErrorKind> {
        Ok(ValueType::none())
    }

    fn call(
        &self,
        arguments: &[Value],
        context: &mut dyn SystemContext,
    ) -> Result<Value, RuntimeErrorKind> {
        if arguments.is_empty() {
            context.writeln("");
        }
        for argument in arguments {
            context.writeln(&argument.render());
        }
        Ok(Value::None)
    }
}

#[derive(Debug)]
pub struct NativeLen;

impl NativeFunction for NativeLen {
    fn get_name(&self) -> &'static str {
        "len"
    }

    fn check(&self, arguments: &[ValueType]) -> Result<ValueType, TypeErrorKind> {
        let [argument] = arguments else {
            return Err(TypeErrorKind::ArgumentCount {
                function: self.get_name(),
                actual: arguments.len(),
                expected: 1,
            });
        };
        match argument.name() {
            TypeName::Str | TypeName::List | TypeName::Map => Ok(ValueType::int()),
            _ => Err(TypeErrorKind::InvalidArgument {
                function: self.get_name(),
                actual: argument.clone(),
            }),
        }
    }

    fn call(
        &self,
        arguments: &[Value],
        _context: &mut dyn SystemContext,
    ) -> Result<Value, RuntimeErrorKind> {
        let [argument] = arguments else {
            return Err(RuntimeErrorKind::ArgumentCount {
                function: self.get_name(),
                actual: arguments.len(),
                expected: 1,
            });
        };
        let length = argument.len()?;
        Ok(Value::Int(BigInt::from(length)))
    }
}
