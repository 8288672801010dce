use super::{
    expression::{
        BinaryOperator, Block, Declaration, DeclarationKind, ElseBranch, Expression,
        ExpressionKind, IfExpression, Literal, TypeExpression, TypeExpressionKind, UnaryOperator,
    },
    ParserError, Program,
};
use crate::lexer::LineBreaks;
use ariadne::{Color, Label, Report, ReportKind, Source};
use std::{fmt::Write, path::Path};

const WRITE_FMT_MSG: &'static str =
    "Encountered an error while attempting to write format string to buffer.";
const ARIADNE_MSG: &'static str = "Ariadne produces valid utf-8 strings";
const ARIADNE_WRITE_MSG: &'static str = "Write into buffer should not fail.";
const INDENT: &'static str = "    ";

pub trait ExpressionFormatter {
    fn format(&self, expression: &Expression) -> String;
    fn format_error(&self, error: &ParserError) -> String;

    fn format_program(&self, program: &Program) -> String {
        let mut buffer = String::new();
        for statement in program.statements() {
            buffer.push_str(&self.format(statement));
            buffer.push_str(";\n");
        }
        buffer
    }
}

pub struct DebugExpressionFormatter;

impl ExpressionFormatter for DebugExpressionFormatter {
    fn format(&self, expression: &Expression) -> String {
        format!("{expression:?}")
    }

    fn format_error(&self, error: &ParserError) -> String {
        format!("{error:?}")
    }
}

/// Renders the tree back into canonical nice-expr source.
pub struct SourceFormatter {
    line_breaks: LineBreaks,
}

impl SourceFormatter {
    pub fn new(text: &str) -> Self {
        Self {
            line_breaks: LineBreaks::new(text),
        }
    }
}

impl ExpressionFormatter for SourceFormatter {
    fn format(&self, expression: &Expression) -> String {
        render_expression(expression)
    }

    fn format_error(&self, error: &ParserError) -> String {
        let line = self.line_breaks.get_line_from_span(error.span);
        format!("[line {line}] Error: {}", error.kind)
    }
}

pub struct PrettyExpressionFormatter<'src> {
    text: &'src str,
    path: &'src Path,
}

impl<'src> PrettyExpressionFormatter<'src> {
    pub fn new(text: &'src str, path: &'src Path) -> Self {
        Self { text, path }
    }
}

impl<'src> ExpressionFormatter for PrettyExpressionFormatter<'src> {
    fn format(&self, expression: &Expression) -> String {
        render_expression(expression)
    }

    fn format_error(&self, error: &ParserError) -> String {
        let path = &self.path.to_string_lossy();
        let mut output = std::io::Cursor::new(Vec::new());
        let span = error.span;
        Report::build(ReportKind::Error, (path, span.range()))
            .with_code(error.code())
            .with_message("Failed to parse the program")
            .with_label(
                Label::new((path, span.range()))
                    .with_message(error.kind.to_string())
                    .with_color(Color::BrightRed),
            )
            .finish()
            .write((path, Source::from(self.text)), &mut output)
            .expect(ARIADNE_WRITE_MSG);
        String::from_utf8(output.into_inner()).expect(ARIADNE_MSG)
    }
}

pub fn render_expression(expression: &Expression) -> String {
    let mut buffer = String::new();
    write_expression(&mut buffer, expression, 0);
    buffer
}

pub fn render_declaration(declaration: &Declaration) -> String {
    let mut buffer = String::new();
    write_declaration(&mut buffer, declaration, 0);
    buffer
}

pub fn render_type(value_type: &TypeExpression) -> String {
    match &value_type.kind {
        TypeExpressionKind::None => "none".into(),
        TypeExpressionKind::Int => "int".into(),
        TypeExpressionKind::Dec => "dec".into(),
        TypeExpressionKind::Str => "str".into(),
        TypeExpressionKind::Bool => "bool".into(),
        TypeExpressionKind::List(element) => format!("list[{}]", render_type(element)),
        TypeExpressionKind::Map(key, value) => {
            format!("map[{}]{}", render_type(key), render_type(value))
        }
    }
}

fn write_literal(buffer: &mut String, literal: &Literal) {
    match literal {
        Literal::Int(v) => write!(buffer, "{v}").expect(WRITE_FMT_MSG),
        Literal::Dec(v) => write!(buffer, "{v}").expect(WRITE_FMT_MSG),
        Literal::Bool(v) => write!(buffer, "{v}").expect(WRITE_FMT_MSG),
        Literal::Str(v) => write!(buffer, "{v:?}").expect(WRITE_FMT_MSG),
    }
}

fn write_separated(buffer: &mut String, items: &[Expression], depth: usize) {
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            buffer.push_str(", ");
        }
        write_expression(buffer, item, depth);
    }
}

fn write_declaration(buffer: &mut String, declaration: &Declaration, depth: usize) {
    let keyword = match declaration.kind {
        DeclarationKind::Var => "var",
        DeclarationKind::Const => "const",
    };
    write!(
        buffer,
        "{keyword} {} {} is ",
        declaration.name,
        render_type(&declaration.value_type)
    )
    .expect(WRITE_FMT_MSG);
    write_expression(buffer, &declaration.value, depth);
}

fn write_block(buffer: &mut String, block: &Block, depth: usize) {
    if block.statements.is_empty() {
        buffer.push_str("{}");
        return;
    }
    buffer.push_str("{\n");
    for statement in &block.statements {
        buffer.push_str(&INDENT.repeat(depth + 1));
        write_expression(buffer, statement, depth + 1);
        buffer.push_str(";\n");
    }
    buffer.push_str(&INDENT.repeat(depth));
    buffer.push('}');
}

fn write_if(buffer: &mut String, if_expression: &IfExpression, depth: usize) {
    buffer.push_str("if ");
    write_expression(buffer, &if_expression.condition, depth);
    buffer.push_str(" then ");
    write_block(buffer, &if_expression.then, depth);
    match &if_expression.else_branch {
        None => {}
        Some(ElseBranch::ElseIf(nested, _)) => {
            buffer.push_str(" else ");
            write_if(buffer, nested, depth);
        }
        Some(ElseBranch::Else(block)) => {
            buffer.push_str(" else ");
            write_block(buffer, block, depth);
        }
    }
}

fn write_expression(buffer: &mut String, expression: &Expression, depth: usize) {
    match &expression.kind {
        ExpressionKind::Literal(literal) => write_literal(buffer, literal),
        ExpressionKind::List(elements) => {
            buffer.push('[');
            write_separated(buffer, elements, depth);
            buffer.push(']');
        }
        ExpressionKind::Map(entries) => {
            buffer.push_str("<|");
            for (index, entry) in entries.iter().enumerate() {
                if index > 0 {
                    buffer.push_str(", ");
                }
                write_expression(buffer, &entry.key, depth);
                buffer.push_str(": ");
                write_expression(buffer, &entry.value, depth);
            }
            buffer.push_str("|>");
        }
        ExpressionKind::Identifier(ident) => buffer.push_str(&ident.name),
        ExpressionKind::Unary { operator, rhs } => {
            buffer.push('(');
            match operator {
                UnaryOperator::Minus => buffer.push('-'),
                UnaryOperator::Not => buffer.push_str("not "),
            }
            write_expression(buffer, rhs, depth);
            buffer.push(')');
        }
        ExpressionKind::Binary { operator, lhs, rhs } => {
            buffer.push('(');
            write_expression(buffer, lhs, depth);
            match operator {
                BinaryOperator::Index => buffer.push('_'),
                operator => write!(buffer, " {operator} ").expect(WRITE_FMT_MSG),
            }
            write_expression(buffer, rhs, depth);
            buffer.push(')');
        }
        ExpressionKind::Declaration(declaration) => write_declaration(buffer, declaration, depth),
        ExpressionKind::Assignment { name, value } => {
            write!(buffer, "set {name} is ").expect(WRITE_FMT_MSG);
            write_expression(buffer, value, depth);
        }
        ExpressionKind::Block(block) => write_block(buffer, block, depth),
        ExpressionKind::If(if_expression) => write_if(buffer, if_expression, depth),
        ExpressionKind::For { declarations, body } => {
            buffer.push_str("for ");
            for (index, declaration) in declarations.iter().enumerate() {
                if index > 0 {
                    buffer.push_str(", ");
                }
                write_declaration(buffer, declaration, depth);
            }
            buffer.push(' ');
            write_block(buffer, body, depth);
        }
        ExpressionKind::Return(operand) | ExpressionKind::Break(operand) => {
            let keyword = if matches!(expression.kind, ExpressionKind::Return(_)) {
                "return"
            } else {
                "break"
            };
            buffer.push_str(keyword);
            if let Some(operand) = operand {
                buffer.push(' ');
                write_expression(buffer, operand, depth);
            }
        }
        ExpressionKind::Call { callee, arguments } => {
            write!(buffer, "{callee}(").expect(WRITE_FMT_MSG);
            write_separated(buffer, arguments, depth);
            buffer.push(')');
        }
    }
}
