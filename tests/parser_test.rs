use color_eyre::eyre::{Context, Result};
use std::{
    fs::{read_dir, read_to_string},
    path::Path,
};

use nice_expr::{
    lexer::{LexicalErrorKind, TokenKind},
    parser::{
        expression::{BinaryOperator, ExpressionKind, Literal, TypeExpressionKind},
        formatter::{ExpressionFormatter, SourceFormatter},
        Parser, ParserErrorKind,
    },
};

fn check(input: &str, expected: &str, test_name: &str) {
    let mut parser = Parser::new(input);
    let formatter = SourceFormatter::new(input);
    let actual = match parser.parse() {
        Ok(program) => formatter.format_program(&program),
        Err(error) => formatter.format_error(&error),
    };
    assert_eq!(actual, expected, "Failed the test {test_name}");
}

fn parse_error(input: &str) -> ParserErrorKind {
    match Parser::new(input).parse() {
        Ok(program) => panic!("expected a parse error, got {program:?}"),
        Err(error) => error.kind,
    }
}

#[test]
fn test_empty_program() -> Result<()> {
    let program = Parser::new(";;\n// only comments\n").parse()?;
    assert!(program.is_empty());
    Ok(())
}

#[test]
fn test_compound_assignment_desugars() -> Result<()> {
    let program = Parser::new("set total *= 2;").parse()?;
    let statement = program.get_statement(0).expect("one statement");
    let ExpressionKind::Assignment { name, value } = &statement.kind else {
        panic!("expected an assignment, got {statement:?}");
    };
    assert_eq!(name.name, "total");
    let ExpressionKind::Binary { operator, lhs, rhs } = &value.kind else {
        panic!("expected a binary expression, got {value:?}");
    };
    assert_eq!(*operator, BinaryOperator::Multiply);
    assert!(matches!(&lhs.kind, ExpressionKind::Identifier(ident) if ident.name == "total"));
    assert!(matches!(&rhs.kind, ExpressionKind::Literal(Literal::Int(_))));
    Ok(())
}

#[test]
fn test_nested_generic_type() -> Result<()> {
    let program = Parser::new("var m map[str]list[dec] is <||>;").parse()?;
    let statement = program.get_statement(0).expect("one statement");
    let ExpressionKind::Declaration(declaration) = &statement.kind else {
        panic!("expected a declaration, got {statement:?}");
    };
    let TypeExpressionKind::Map(key, value) = &declaration.value_type.kind else {
        panic!("expected a map type");
    };
    assert_eq!(key.kind, TypeExpressionKind::Str);
    assert!(matches!(&value.kind, TypeExpressionKind::List(element) if element.kind == TypeExpressionKind::Dec));
    assert!(matches!(&declaration.value.kind, ExpressionKind::Map(entries) if entries.is_empty()));
    Ok(())
}

#[test]
fn test_block_last_statement_needs_no_semicolon() -> Result<()> {
    let program = Parser::new("{ var a int is 1; println(a) };").parse()?;
    let statement = program.get_statement(0).expect("one statement");
    assert!(matches!(&statement.kind, ExpressionKind::Block(block) if block.statements.len() == 2));
    Ok(())
}

#[test]
fn test_statement_requires_semicolon() {
    assert_eq!(parse_error("var x int is 1"), ParserErrorKind::UnexpectedEof);
}

#[test]
fn test_missing_value() {
    assert_eq!(
        parse_error("var x int is ;"),
        ParserErrorKind::NonExpression(TokenKind::Semicolon)
    );
}

#[test]
fn test_missing_type() {
    assert_eq!(
        parse_error("var x is 1;"),
        ParserErrorKind::NonType(TokenKind::KeywordIs)
    );
}

#[test]
fn test_bad_assignment_operator() {
    assert_eq!(
        parse_error("set x 1;"),
        ParserErrorKind::NonAssignmentOperator(TokenKind::IntLiteral)
    );
}

#[test]
fn test_lexical_error_surfaces() {
    assert!(matches!(
        parse_error("var x int is 1 $ 2;"),
        ParserErrorKind::LexicalError(error) if error.kind == LexicalErrorKind::Unrecognized('$')
    ));
}

#[test]
fn test_unclosed_block() {
    assert_eq!(
        parse_error("{ var x int is 1;"),
        ParserErrorKind::UnexpectedEof
    );
}

#[test]
fn test_deep_nesting_is_rejected() -> Result<()> {
    let handle = std::thread::Builder::new()
        .stack_size(64 * 1024 * 1024)
        .spawn(|| {
            let source = format!("{}1{};", "(".repeat(400), ")".repeat(400));
            parse_error(&source)
        })?;
    let kind = handle.join().expect("parser thread panicked");
    assert_eq!(kind, ParserErrorKind::TooDeep);
    Ok(())
}

#[test]
fn test_error_line_is_reported() {
    check(
        "var x int is 1;\nvar y int is ;",
        "[line 2] Error: Expected an expression but got token SEMICOLON.",
        "error line",
    );
}

#[test]
fn test_all() -> Result<()> {
    let input_dir = Path::new("./test_data/parser/in");
    let output_dir = Path::new("./test_data/parser/out");

    let mut succeeded = true;
    for entry in read_dir(input_dir).context("Failed to open input test data folder")? {
        let entry = entry?;
        let path = entry.path();

        let Some(extension) = path.extension() else {
            continue;
        };

        if extension != "ne" {
            continue;
        }

        let test_name = AsRef::<Path>::as_ref(
            path.file_name()
                .expect("File name can't be none as the path is to a real file."),
        );

        let input = read_to_string(&path).context("Failed to open input test data file")?;

        let expected = {
            let output_file_name = test_name.with_extension("txt");
            let output_path = output_dir.join(output_file_name);
            read_to_string(output_path).context("Failed to open output test data file")?
        };

        let res = std::panic::catch_unwind(|| {
            check(&input, &expected, &test_name.to_string_lossy());
        });
        if res.is_err() {
            succeeded = false;
        }
    }

    assert!(succeeded);

    Ok(())
}
