mod error;
pub mod formatter;

pub use error::{TypeError, TypeErrorKind};

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
        formatter::{render_declaration, render_expression},
        Program,
    },
    string::Ident,
    value::{TypeName, ValueType},
    MAX_NESTING_DEPTH,
};

/// Static pass over a parsed program.
///
/// Errors are accumulated rather than returned: every node still yields a
/// type (`None` when nothing better is known) so checking continues past the
/// first problem. A program may only be evaluated once `has_errors` is false.
#[derive(Debug, Default)]
pub struct TypeChecker {
    context: Context<ValueType>,
    errors: Vec<TypeError>,
    exits: Vec<ExitFrame>,
    depth: usize,
}

/// Collects the `return` and `break` types that can reach one consumer: a
/// loop, or an expression whose value is used.
#[derive(Debug, Default)]
struct ExitFrame {
    exit_type: Option<ValueType>,
    /// Nonzero while checking statements that follow a certain exit.
    unreachable: usize,
}

impl TypeChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks every top level statement. The result is the type of the first
    /// `return` or `break` certain to reach the top level, otherwise `None`.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn check_program(&mut self, program: &Program) -> ControlResult<ValueType> {
        let mut outcome = None;
        for statement in program.statements() {
            let result = self.check_expression(statement);
            if outcome.is_none() && result.is_signal() {
                outcome = Some(result);
            }
        }
        tracing::debug!(errors = self.errors.len(), "finished type checking");
        outcome.unwrap_or(ControlResult::Normal(ValueType::none()))
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[TypeError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<TypeError> {
        self.errors
    }

    pub fn context(&self) -> &Context<ValueType> {
        &self.context
    }

    fn report(&mut self, kind: TypeErrorKind, span: Span) {
        tracing::debug!(%kind, "type error");
        self.errors.push(TypeError { kind, span });
    }

    /// Type of an expression used as an operand, argument or initializer.
    ///
    /// An exit inside the expression ends it with the exit's value, so every
    /// possible exit must agree with the type it has when it completes.
    fn check_value(&mut self, expression: &Expression) -> ValueType {
        self.exits.push(ExitFrame::default());
        let result = self.check_expression(expression);
        let exit_type = self.exits.pop().and_then(|frame| frame.exit_type);
        match (result, exit_type) {
            (ControlResult::Normal(value_type), Some(exit_type))
                if value_type.not_equal(&exit_type) =>
            {
                self.report(
                    TypeErrorKind::ExitMismatch {
                        expected: exit_type,
                        actual: value_type.clone(),
                    },
                    expression.span,
                );
                value_type
            }
            (result, _) => result.into_inner(),
        }
    }

    /// Records a `return` or `break` against the innermost consumer. Exits at
    /// the top level stop the program and are not compared.
    fn record_exit(&mut self, value_type: &ValueType, span: Span) {
        let Some(frame) = self.exits.last_mut() else {
            return;
        };
        if frame.unreachable > 0 {
            return;
        }
        let Some(expected) = frame.exit_type.clone() else {
            frame.exit_type = Some(value_type.clone());
            return;
        };
        if expected.equal(value_type) {
            return;
        }
        self.report(
            TypeErrorKind::ExitMismatch {
                expected,
                actual: value_type.clone(),
            },
            span,
        );
    }

    fn set_unreachable(&mut self, unreachable: bool) {
        if let Some(frame) = self.exits.last_mut() {
            if unreachable {
                frame.unreachable += 1;
            } else {
                frame.unreachable -= 1;
            }
        }
    }

    pub fn check_expression(&mut self, expression: &Expression) -> ControlResult<ValueType> {
        if self.depth >= MAX_NESTING_DEPTH {
            self.report(TypeErrorKind::TooDeep, expression.span);
            return ControlResult::Normal(ValueType::none());
        }
        self.depth += 1;
        let result = self.check_kind(expression);
        self.depth -= 1;
        tracing::trace!(result = %result.inner(), "checked node");
        result
    }

    fn check_kind(&mut self, expression: &Expression) -> ControlResult<ValueType> {
        let span = expression.span;
        let value_type = match &expression.kind {
            ExpressionKind::Literal(literal) => match literal {
                Literal::Int(_) => ValueType::int(),
                Literal::Dec(_) => ValueType::dec(),
                Literal::Str(_) => ValueType::str(),
                Literal::Bool(_) => ValueType::bool(),
            },
            ExpressionKind::List(elements) => self.check_list(elements),
            ExpressionKind::Map(entries) => self.check_map(entries),
            ExpressionKind::Identifier(ident) => self.check_identifier(ident),
            ExpressionKind::Unary { operator, rhs } => self.check_unary(*operator, rhs),
            ExpressionKind::Binary { operator, lhs, rhs } => {
                self.check_binary(expression, *operator, lhs, rhs)
            }
            ExpressionKind::Declaration(declaration) => self.check_declaration(declaration),
            ExpressionKind::Assignment { name, value } => {
                self.check_assignment(expression, name, value)
            }
            ExpressionKind::Block(block) => return self.check_block(block),
            ExpressionKind::If(if_expression) => return self.check_if(if_expression, span),
            ExpressionKind::For { declarations, body } => {
                return self.check_for(declarations, body)
            }
            ExpressionKind::Return(value) => {
                let value_type = self.check_optional(value.as_deref());
                self.record_exit(&value_type, span);
                return ControlResult::Returned(value_type);
            }
            ExpressionKind::Break(value) => {
                let value_type = self.check_optional(value.as_deref());
                self.record_exit(&value_type, span);
                return ControlResult::Broke(value_type);
            }
            ExpressionKind::Call { callee, arguments } => self.check_call(callee, arguments),
        };
        ControlResult::Normal(value_type)
    }

    fn check_optional(&mut self, value: Option<&Expression>) -> ValueType {
        value
            .map(|value| self.check_value(value))
            .unwrap_or_else(ValueType::none)
    }

    fn check_list(&mut self, elements: &[Expression]) -> ValueType {
        let Some((first, rest)) = elements.split_first() else {
            return ValueType::list(ValueType::none());
        };
        let element_type = self.check_value(first);
        for element in rest {
            let actual = self.check_value(element);
            if actual.not_equal(&element_type) {
                self.report(
                    TypeErrorKind::MixedList {
                        expected: element_type.clone(),
                        actual,
                    },
                    element.span,
                );
            }
        }
        ValueType::list(element_type)
    }

    fn check_map(&mut self, entries: &[MapEntry]) -> ValueType {
        let Some((first, rest)) = entries.split_first() else {
            return ValueType::map(ValueType::none(), ValueType::none());
        };
        let key_type = self.check_value(&first.key);
        let value_type = self.check_value(&first.value);
        for entry in rest {
            for (expected, expression) in [(&key_type, &entry.key), (&value_type, &entry.value)] {
                let actual = self.check_value(expression);
                if actual.not_equal(expected) {
                    self.report(
                        TypeErrorKind::MixedMap {
                            expected: expected.clone(),
                            actual,
                        },
                        expression.span,
                    );
                }
            }
        }
        ValueType::map(key_type, value_type)
    }

    fn check_identifier(&mut self, ident: &Ident) -> ValueType {
        match self.context.get_identifier(&ident.name) {
            Some((entry, _)) => entry.payload.clone(),
            None => {
                self.report(
                    TypeErrorKind::IdentifierNotFound(ident.name.clone()),
                    ident.span,
                );
                ValueType::none()
            }
        }
    }

    fn check_unary(&mut self, operator: UnaryOperator, rhs: &Expression) -> ValueType {
        let operand = self.check_value(rhs);
        match operator {
            UnaryOperator::Minus if operand.is_numeric() => operand,
            UnaryOperator::Minus => {
                self.report(TypeErrorKind::MinusOperand(operand), rhs.span);
                ValueType::none()
            }
            UnaryOperator::Not => {
                if operand.is_not_name(TypeName::Bool) {
                    self.report(TypeErrorKind::NotOperand(operand), rhs.span);
                }
                ValueType::bool()
            }
        }
    }

    fn check_binary(
        &mut self,
        expression: &Expression,
        operator: BinaryOperator,
        lhs: &Expression,
        rhs: &Expression,
    ) -> ValueType {
        let left = self.check_value(lhs);
        let right = self.check_value(rhs);
        let span = expression.span;
        let operation = operator.name();
        match operator {
            BinaryOperator::And | BinaryOperator::Or => {
                if left.is_not_name(TypeName::Bool) || right.is_not_name(TypeName::Bool) {
                    self.report(
                        TypeErrorKind::TestOperands {
                            operation,
                            lhs: left,
                            rhs: right,
                        },
                        span,
                    );
                }
                ValueType::bool()
            }
            BinaryOperator::Equal
            | BinaryOperator::GreaterThan
            | BinaryOperator::LessThan
            | BinaryOperator::GreaterThanEqual
            | BinaryOperator::LessThanEqual => {
                if left.not_equal(&right) {
                    self.report(
                        TypeErrorKind::MismatchedTypes {
                            expected: left,
                            actual: right,
                            at: render_expression(expression),
                        },
                        span,
                    );
                } else if operator != BinaryOperator::Equal && !left.is_comparable() {
                    self.report(
                        TypeErrorKind::NotComparable {
                            operation,
                            lhs: left,
                            rhs: right,
                        },
                        span,
                    );
                }
                ValueType::bool()
            }
            BinaryOperator::Add | BinaryOperator::Subtract => match (left.name(), right.name()) {
                _ if left.is_numeric() && right.is_numeric() => left.promote(&right),
                (TypeName::Str, TypeName::Str) => left,
                (TypeName::List, TypeName::List) if left.equal(&right) => left,
                _ => self.invalid_operands(operation, left, right, span),
            },
            BinaryOperator::Multiply | BinaryOperator::Divide => {
                if left.is_numeric() && right.is_numeric() {
                    left.promote(&right)
                } else {
                    self.invalid_operands(operation, left, right, span)
                }
            }
            BinaryOperator::Modulo => {
                if left.is_name(TypeName::Int) && right.is_name(TypeName::Int) {
                    left
                } else {
                    self.report(
                        TypeErrorKind::ModuloOperands {
                            lhs: left,
                            rhs: right,
                        },
                        span,
                    );
                    ValueType::none()
                }
            }
            BinaryOperator::Index => self.check_index(left, right, rhs.span, span),
        }
    }

    fn invalid_operands(
        &mut self,
        operation: &'static str,
        lhs: ValueType,
        rhs: ValueType,
        span: Span,
    ) -> ValueType {
        self.report(
            TypeErrorKind::InvalidOperands {
                operation,
                lhs,
                rhs,
            },
            span,
        );
        ValueType::none()
    }

    fn check_index(
        &mut self,
        collection: ValueType,
        index: ValueType,
        index_span: Span,
        span: Span,
    ) -> ValueType {
        let (expected, result) = match collection.name() {
            TypeName::Str => (ValueType::int(), ValueType::str()),
            TypeName::List => (ValueType::int(), collection.element_type()),
            TypeName::Map => (collection.key_type(), collection.value_type()),
            _ => {
                self.report(TypeErrorKind::NotIndexable(collection), span);
                return ValueType::none();
            }
        };
        if index.not_equal(&expected) {
            self.report(
                TypeErrorKind::InvalidIndex {
                    collection,
                    index,
                    expected,
                },
                index_span,
            );
        }
        result
    }

    fn check_declaration(&mut self, declaration: &Declaration) -> ValueType {
        let declared = ValueType::from(&declaration.value_type);
        let actual = self.check_value(&declaration.value);
        if actual.not_equal(&declared) {
            self.report(
                TypeErrorKind::MismatchedTypes {
                    expected: declared.clone(),
                    actual,
                    at: render_declaration(declaration),
                },
                declaration.value.span,
            );
        }
        self.context.add_identifier(IdentifierEntry::new(
            declaration.name.name.clone(),
            declared.clone(),
            IdentifierKind::from(declaration.kind),
        ));
        declared
    }

    fn check_assignment(
        &mut self,
        expression: &Expression,
        name: &Ident,
        value: &Expression,
    ) -> ValueType {
        let actual = self.check_value(value);
        let Some((entry, frame)) = self.context.get_identifier(&name.name) else {
            self.report(
                TypeErrorKind::IdentifierNotFound(name.name.clone()),
                name.span,
            );
            return ValueType::none();
        };
        let entry = entry.clone();
        if entry.is_const() {
            self.report(TypeErrorKind::AssignToConstant(name.name.clone()), name.span);
        }
        if actual.not_equal(&entry.payload) {
            self.report(
                TypeErrorKind::MismatchedTypes {
                    expected: entry.payload.clone(),
                    actual,
                    at: render_expression(expression),
                },
                value.span,
            );
        }
        let declared = entry.payload.clone();
        if frame != self.context.current_frame() {
            self.context.add_identifier(entry);
        }
        declared
    }

    /// The block's result is its first certain exit. Statements after it are
    /// still checked but their exits can never be taken.
    fn check_block(&mut self, block: &Block) -> ControlResult<ValueType> {
        let frame = self.context.enter_scope();
        tracing::debug!(?frame, "entered block scope");
        let mut outcome = None;
        for statement in &block.statements {
            let result = self.check_expression(statement);
            if outcome.is_none() && result.is_signal() {
                outcome = Some(result);
                self.set_unreachable(true);
            }
        }
        if outcome.is_some() {
            self.set_unreachable(false);
        }
        self.context.exit_scope();
        tracing::debug!(?frame, "exited block scope");
        outcome.unwrap_or(ControlResult::Normal(ValueType::none()))
    }

    fn check_if(&mut self, if_expression: &IfExpression, span: Span) -> ControlResult<ValueType> {
        let condition = self.check_value(&if_expression.condition);
        if condition.is_not_name(TypeName::Bool) {
            self.report(
                TypeErrorKind::NonBoolCondition(condition),
                if_expression.condition.span,
            );
        }
        let then = self.check_block(&if_expression.then);
        let (other, other_span, exhaustive) = match &if_expression.else_branch {
            // An exit in the then branch is only possible, not certain.
            None => return ControlResult::Normal(ValueType::none()),
            Some(ElseBranch::ElseIf(nested, nested_span)) => (
                self.check_if(nested, *nested_span),
                *nested_span,
                nested.is_exhaustive(),
            ),
            Some(ElseBranch::Else(block)) => (self.check_block(block), block.span, true),
        };
        // An open `else if` chain has no single type to compare against. Its
        // exits are still compared by their consumer.
        if exhaustive && then.inner().not_equal(other.inner()) {
            self.report(
                TypeErrorKind::BranchMismatch {
                    then: then.inner().clone(),
                    other: other.inner().clone(),
                },
                other_span.merge(&span),
            );
        }
        if then.is_signal() && other.is_signal() {
            then
        } else {
            ControlResult::Normal(ValueType::none())
        }
    }

    fn check_for(
        &mut self,
        declarations: &[Declaration],
        body: &Block,
    ) -> ControlResult<ValueType> {
        let mut shadowed = Vec::new();
        for (position, declaration) in declarations.iter().enumerate() {
            let name = &declaration.name.name;
            let repeated = declarations[..position]
                .iter()
                .any(|earlier| &earlier.name.name == name);
            if let Some(previous) = self.context.delete_identifier(name) {
                if !repeated {
                    shadowed.push(previous);
                }
            }
            self.check_declaration(declaration);
        }

        self.exits.push(ExitFrame::default());
        self.check_block(body);
        let result = self
            .exits
            .pop()
            .and_then(|frame| frame.exit_type)
            .unwrap_or_else(ValueType::none);

        for declaration in declarations {
            self.context.delete_identifier(&declaration.name.name);
        }
        for entry in shadowed {
            self.context.add_identifier(entry);
        }
        ControlResult::Normal(result)
    }

    fn check_call(&mut self, callee: &Ident, arguments: &[Expression]) -> ValueType {
        let argument_types: Vec<ValueType> = arguments
            .iter()
            .map(|argument| self.check_value(argument))
            .collect();
        let Some(native) = find_native(&callee.name) else {
            self.report(
                TypeErrorKind::UnknownFunction(callee.name.clone()),
                callee.span,
            );
            return ValueType::none();
        };
        match native.check(&argument_types) {
            Ok(value_type) => value_type,
            Err(kind) => {
                self.report(kind, callee.span);
                ValueType::none()
            }
        }
    }
}
