use super::{RuntimeError, RuntimeErrorKind, SystemContext};
use crate::{
    context::{Context, IdentifierEntry, IdentifierKind},
    control::ControlResult,
    lexer::Span,
    native::find_native,
    parser::{
        expression::{
            BinaryOperator, Block, Declaration, ElseBranch, Expression, ExpressionKind,
            IfExpression, Literal, MapEntry, UnaryOperator,
        },
        Program,
    },
    string::Ident,
    value::{error::OperationError, ListValue, MapValue, Value, ValueType},
    MAX_NESTING_DEPTH,
};
use std::cmp::Ordering;

/// Evaluates a checked program by walking its tree.
///
/// Runtime errors are recorded and evaluation carries on with the zero value
/// of the expected type, so one run reports every failure it reaches.
pub struct TreeWalkInterpreter<C: SystemContext> {
    environment: Context<Value>,
    context: C,
    errors: Vec<RuntimeError>,
    depth: usize,
}

impl<C> TreeWalkInterpreter<C>
where
    C: SystemContext,
{
    pub fn new(context: C) -> Self {
        Self {
            environment: Context::new(),
            context,
            errors: Vec::new(),
            depth: 0,
        }
    }

    /// Runs the program until its statements are exhausted or a `return` or
    /// `break` reaches the top level.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn run(&mut self, program: &Program) -> ControlResult<Value> {
        for statement in program.statements() {
            let result = self.evaluate(statement);
            if result.is_signal() {
                tracing::debug!(value = %result.inner(), "program stopped early");
                return result;
            }
        }
        tracing::debug!(errors = self.errors.len(), "program finished");
        ControlResult::Normal(Value::None)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[RuntimeError] {
        &self.errors
    }

    pub fn environment(&self) -> &Context<Value> {
        &self.environment
    }

    /// Current value of a name visible from the current frame.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.environment
            .get_identifier(name)
            .map(|(entry, _)| &entry.payload)
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn into_context(self) -> C {
        self.context
    }

    fn report(&mut self, kind: RuntimeErrorKind, span: Span) {
        tracing::debug!(%kind, "runtime error");
        self.errors.push(RuntimeError { kind, span });
    }

    /// Unwraps an operation result, recording the failure and substituting
    /// the zero value of the type the operation would have produced.
    fn settle(&mut self, result: Result<Value, OperationError>, span: Span) -> Value {
        match result {
            Ok(value) => value,
            Err(error) => {
                let fallback = error.fallback().zero_value();
                self.report(RuntimeErrorKind::Operation(error), span);
                fallback
            }
        }
    }

    fn evaluate_value(&mut self, expression: &Expression) -> Value {
        self.evaluate(expression).into_inner()
    }

    pub fn evaluate(&mut self, expression: &Expression) -> ControlResult<Value> {
        if self.depth >= MAX_NESTING_DEPTH {
            self.report(RuntimeErrorKind::TooDeep, expression.span);
            return ControlResult::Normal(Value::None);
        }
        self.depth += 1;
        let result = self.evaluate_kind(expression);
        self.depth -= 1;
        tracing::trace!(result = %result.inner(), "evaluated node");
        result
    }

    fn evaluate_kind(&mut self, expression: &Expression) -> ControlResult<Value> {
        let span = expression.span;
        let value = match &expression.kind {
            ExpressionKind::Literal(literal) => match literal {
                Literal::Int(v) => Value::Int(v.clone()),
                Literal::Dec(v) => Value::Dec(v.clone()),
                Literal::Str(v) => Value::Str(v.clone()),
                Literal::Bool(v) => Value::Bool(*v),
            },
            ExpressionKind::List(elements) => self.evaluate_list(elements),
            ExpressionKind::Map(entries) => self.evaluate_map(entries),
            ExpressionKind::Identifier(ident) => self.evaluate_identifier(ident),
            ExpressionKind::Unary { operator, rhs } => {
                let operand = self.evaluate_value(rhs);
                let result = match operator {
                    UnaryOperator::Minus => operand.negate(),
                    UnaryOperator::Not => operand.logical_not(),
                };
                self.settle(result, span)
            }
            ExpressionKind::Binary { operator, lhs, rhs } => {
                self.evaluate_binary(*operator, lhs, rhs, span)
            }
            ExpressionKind::Declaration(declaration) => self.evaluate_declaration(declaration),
            ExpressionKind::Assignment { name, value } => self.evaluate_assignment(name, value),
            ExpressionKind::Block(block) => return self.evaluate_block(block),
            ExpressionKind::If(if_expression) => return self.evaluate_if(if_expression),
            ExpressionKind::For { declarations, body } => {
                return self.evaluate_for(declarations, body)
            }
            ExpressionKind::Return(value) => {
                return ControlResult::Returned(self.evaluate_optional(value.as_deref()))
            }
            ExpressionKind::Break(value) => {
                return ControlResult::Broke(self.evaluate_optional(value.as_deref()))
            }
            ExpressionKind::Call { callee, arguments } => self.evaluate_call(callee, arguments),
        };
        ControlResult::Normal(value)
    }

    fn evaluate_optional(&mut self, value: Option<&Expression>) -> Value {
        value
            .map(|value| self.evaluate_value(value))
            .unwrap_or(Value::None)
    }

    fn evaluate_list(&mut self, elements: &[Expression]) -> Value {
        let elements: Vec<Value> = elements
            .iter()
            .map(|element| self.evaluate_value(element))
            .collect();
        let element_type = elements
            .first()
            .map(Value::value_type)
            .unwrap_or_else(ValueType::none);
        Value::List(ListValue::new(element_type, elements))
    }

    /// Entries are evaluated in source order; a repeated key keeps its first
    /// position and takes the last value written.
    fn evaluate_map(&mut self, entries: &[MapEntry]) -> Value {
        let mut map: Option<MapValue> = None;
        for entry in entries {
            let key = self.evaluate_value(&entry.key);
            let value = self.evaluate_value(&entry.value);
            map.get_or_insert_with(|| MapValue::new(key.value_type(), value.value_type()))
                .insert(key, value);
        }
        Value::Map(map.unwrap_or_else(|| MapValue::new(ValueType::none(), ValueType::none())))
    }

    fn evaluate_identifier(&mut self, ident: &Ident) -> Value {
        match self.lookup(&ident.name) {
            Some(value) => value.clone(),
            None => {
                self.report(
                    RuntimeErrorKind::IdentifierNotFound(ident.name.clone()),
                    ident.span,
                );
                Value::None
            }
        }
    }

    fn evaluate_binary(
        &mut self,
        operator: BinaryOperator,
        lhs: &Expression,
        rhs: &Expression,
        span: Span,
    ) -> Value {
        // Both operands are always evaluated, left first.
        let left = self.evaluate_value(lhs);
        let right = self.evaluate_value(rhs);
        let result = match operator {
            BinaryOperator::Add => left.add(&right),
            BinaryOperator::Subtract => left.subtract(&right),
            BinaryOperator::Multiply => left.multiply(&right),
            BinaryOperator::Divide => left.divide(&right),
            BinaryOperator::Modulo => left.modulo(&right),
            BinaryOperator::Index => left.index(&right),
            BinaryOperator::And | BinaryOperator::Or => {
                match (left.as_bool(), right.as_bool()) {
                    (Some(l), Some(r)) if operator == BinaryOperator::And => Ok(Value::Bool(l && r)),
                    (Some(l), Some(r)) => Ok(Value::Bool(l || r)),
                    _ => Err(OperationError::MismatchedTypes {
                        operation: operator.name(),
                        lhs: left.value_type(),
                        rhs: right.value_type(),
                    }),
                }
            }
            BinaryOperator::Equal => Ok(Value::Bool(left.equal(&right))),
            BinaryOperator::GreaterThan
            | BinaryOperator::LessThan
            | BinaryOperator::GreaterThanEqual
            | BinaryOperator::LessThanEqual => {
                left.compare(&right, operator.name())
                    .map(|ordering| {
                        Value::Bool(match operator {
                            BinaryOperator::GreaterThan => ordering == Ordering::Greater,
                            BinaryOperator::LessThan => ordering == Ordering::Less,
                            BinaryOperator::GreaterThanEqual => ordering != Ordering::Less,
                            _ => ordering != Ordering::Greater,
                        })
                    })
            }
        };
        match result {
            Err(error) if operator.is_comparison() || operator.is_test() => {
                self.report(RuntimeErrorKind::Operation(error), span);
                Value::Bool(false)
            }
            result => self.settle(result, span),
        }
    }

    /// A value of the wrong type is reported and replaced by the declared
    /// type's zero value, so the name always holds what it was declared as.
    fn evaluate_declaration(&mut self, declaration: &Declaration) -> Value {
        let declared = ValueType::from(&declaration.value_type);
        let mut value = self.evaluate_value(&declaration.value);
        if value.value_type().not_equal(&declared) {
            self.report(
                RuntimeErrorKind::MismatchedTypes {
                    expected: declared.clone(),
                    actual: value.value_type(),
                },
                declaration.value.span,
            );
            value = declared.zero_value();
        }
        self.environment.add_identifier(IdentifierEntry::new(
            declaration.name.name.clone(),
            value.clone(),
            IdentifierKind::from(declaration.kind),
        ));
        value
    }

    /// Writes land in the frame that owns the name.
    fn evaluate_assignment(&mut self, name: &Ident, value: &Expression) -> Value {
        let value = self.evaluate_value(value);
        let failure = match self.environment.get_identifier_mut(&name.name) {
            None => Some(RuntimeErrorKind::IdentifierNotFound(name.name.clone())),
            Some(entry) if entry.is_const() => {
                Some(RuntimeErrorKind::AssignToConstant(name.name.clone()))
            }
            Some(entry) if entry.payload.value_type().not_equal(&value.value_type()) => {
                Some(RuntimeErrorKind::MismatchedTypes {
                    expected: entry.payload.value_type(),
                    actual: value.value_type(),
                })
            }
            Some(entry) => {
                entry.payload = value.clone();
                None
            }
        };
        if let Some(kind) = failure {
            self.report(kind, name.span);
        }
        value
    }

    /// Runs statements in the current frame, stopping at the first signal.
    fn evaluate_statements(&mut self, statements: &[Expression]) -> Option<ControlResult<Value>> {
        for statement in statements {
            let result = self.evaluate(statement);
            if result.is_signal() {
                return Some(result);
            }
        }
        None
    }

    fn evaluate_block(&mut self, block: &Block) -> ControlResult<Value> {
        let frame = self.environment.enter_scope();
        tracing::debug!(?frame, "entered block scope");
        let result = self.evaluate_statements(&block.statements);
        self.environment.exit_scope();
        tracing::debug!(?frame, "exited block scope");
        result.unwrap_or(ControlResult::Normal(Value::None))
    }

    fn evaluate_if(&mut self, if_expression: &IfExpression) -> ControlResult<Value> {
        let condition = self.evaluate_value(&if_expression.condition);
        match condition.as_bool() {
            Some(true) => self.evaluate_block(&if_expression.then),
            Some(false) => match &if_expression.else_branch {
                Some(ElseBranch::ElseIf(nested, _)) => self.evaluate_if(nested),
                Some(ElseBranch::Else(block)) => self.evaluate_block(block),
                None => ControlResult::Normal(Value::None),
            },
            None => {
                self.report(
                    RuntimeErrorKind::NonBoolCondition(condition.value_type()),
                    if_expression.condition.span,
                );
                ControlResult::Normal(Value::None)
            }
        }
    }

    /// Loop variables live in the enclosing frame for the duration of the
    /// loop. Each iteration runs the body in a fresh child frame and the loop
    /// ends when the body produces a `return` or `break`.
    fn evaluate_for(&mut self, declarations: &[Declaration], body: &Block) -> ControlResult<Value> {
        let mut shadowed = Vec::new();
        for (position, declaration) in declarations.iter().enumerate() {
            let name = &declaration.name.name;
            let repeated = declarations[..position]
                .iter()
                .any(|earlier| &earlier.name.name == name);
            if let Some(previous) = self.environment.delete_identifier(name) {
                if !repeated {
                    shadowed.push(previous);
                }
            }
            self.evaluate_declaration(declaration);
        }

        let value = loop {
            let result = self.evaluate_block(body);
            if result.is_signal() {
                break result.into_inner();
            }
        };

        for declaration in declarations {
            self.environment.delete_identifier(&declaration.name.name);
        }
        for entry in shadowed {
            self.environment.add_identifier(entry);
        }
        ControlResult::Normal(value)
    }

    fn evaluate_call(&mut self, callee: &Ident, arguments: &[Expression]) -> Value {
        let arguments: Vec<Value> = arguments
            .iter()
            .map(|argument| self.evaluate_value(argument))
            .collect();
        let Some(native) = find_native(&callee.name) else {
            self.report(
                RuntimeErrorKind::UnknownFunction(callee.name.clone()),
                callee.span,
            );
            return Value::None;
        };
        match native.call(&arguments, &mut self.context) {
            Ok(value) => value,
            Err(kind) => {
                self.report(kind, callee.span);
                Value::None
            }
        }
    }
}
