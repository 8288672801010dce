use std::{
    fs::{read_dir, read_to_string},
    path::Path,
};

use color_eyre::{eyre::Context, Result};
use proptest::prelude::*;
use nice_expr::{
    checker::{
        formatter::{BasicTypeErrorFormatter, TypeErrorFormatter},
        TypeChecker,
    },
    control::ControlResult,
    interpreter::{
        context::{BufferedContext, WriterContext},
        formatter::{BasicRuntimeErrorFormatter, RuntimeErrorFormatter},
        RuntimeErrorKind, TreeWalkInterpreter,
    },
    parser::Parser,
    value::{error::OperationError, Value, ValueType},
    MAX_NESTING_DEPTH,
};

#[test]
fn test_scenarios() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/scenarios");
    test_engine(input_dir)
}

#[test]
fn test_arithmetic() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/arithmetic");
    test_engine(input_dir)
}

#[test]
fn test_collections() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/collections");
    test_engine(input_dir)
}

#[test]
fn test_control() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/control");
    test_engine(input_dir)
}

#[test]
fn test_scoping() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/scoping");
    test_engine(input_dir)
}

#[test]
fn test_builtins() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/builtins");
    test_engine(input_dir)
}

#[test]
fn test_errors() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/errors");
    test_engine(input_dir)
}

fn run_source(source: &str) -> Result<TreeWalkInterpreter<BufferedContext>> {
    let program = Parser::new(source).parse()?;
    let mut interpreter = TreeWalkInterpreter::new(BufferedContext::new());
    interpreter.run(&program);
    Ok(interpreter)
}

#[test]
fn test_final_environment() -> Result<()> {
    let interpreter = run_source(
        r#"const k str is "hello world";
        var x int is 10;
        set x += 1;
        var lst list[int] is [1, 2, 3];
        var n int is len(lst);"#,
    )?;
    assert!(!interpreter.has_errors());
    assert_eq!(interpreter.lookup("k"), Some(&Value::from("hello world")));
    assert_eq!(interpreter.lookup("x"), Some(&Value::from(11)));
    assert_eq!(interpreter.lookup("n"), Some(&Value::from(3)));
    assert_eq!(interpreter.context().data(), "");
    Ok(())
}

#[test]
fn test_division_by_zero_continues() -> Result<()> {
    let interpreter = run_source("var z int is 1 / 0; var after int is z + 5;")?;
    assert!(matches!(
        interpreter.errors(),
        [error] if error.kind == RuntimeErrorKind::Operation(OperationError::DivisionByZero(
            ValueType::int()
        ))
    ));
    assert_eq!(interpreter.lookup("after"), Some(&Value::from(5)));
    Ok(())
}

#[test]
fn test_return_value_reaches_caller() -> Result<()> {
    let program = Parser::new("var x int is 2; return x * 21; println(x);").parse()?;
    let mut interpreter = TreeWalkInterpreter::new(BufferedContext::new());
    let result = interpreter.run(&program);
    assert_eq!(result, ControlResult::Returned(Value::from(42)));
    assert_eq!(interpreter.into_context().into_data(), "");
    Ok(())
}

#[test]
fn test_top_level_break_stops_program() -> Result<()> {
    let program = Parser::new("println(1); break; println(2);").parse()?;
    let mut interpreter = TreeWalkInterpreter::new(BufferedContext::new());
    let result = interpreter.run(&program);
    assert_eq!(result, ControlResult::Broke(Value::None));
    assert_eq!(interpreter.context().data(), "1\n");
    Ok(())
}

#[test]
fn test_assignment_writes_owning_frame() -> Result<()> {
    let interpreter = run_source("var x int is 1; { { set x is 7; }; };")?;
    assert_eq!(interpreter.lookup("x"), Some(&Value::from(7)));
    Ok(())
}

#[test]
fn test_constant_assignment_is_reported_at_runtime() -> Result<()> {
    let interpreter = run_source("const c int is 1; set c is 2;")?;
    assert_eq!(interpreter.errors().len(), 1);
    assert_eq!(
        interpreter.errors()[0].kind,
        RuntimeErrorKind::AssignToConstant("c".into())
    );
    assert_eq!(interpreter.lookup("c"), Some(&Value::from(1)));
    Ok(())
}

#[test]
fn test_runtime_error_format() -> Result<()> {
    let source = "var a int is 1;\nvar b int is a % 0;";
    let interpreter = run_source(source)?;
    let formatter = BasicRuntimeErrorFormatter::new(source);
    assert_eq!(
        formatter.format_error(&interpreter.errors()[0]),
        "modulo by 0\n[line 2]"
    );
    assert!(interpreter.errors()[0].is_arithmetic());
    Ok(())
}

#[test]
fn test_deep_nesting_is_reported() -> Result<()> {
    let handle = std::thread::Builder::new()
        .stack_size(64 * 1024 * 1024)
        .spawn(|| {
            let source = format!("var x int is {}1;", "-".repeat(MAX_NESTING_DEPTH + 10));
            run_source(&source)
                .map(|interpreter| interpreter.errors().to_vec())
                .map_err(|error| error.to_string())
        })?;
    let errors = handle
        .join()
        .expect("interpreter thread panicked")
        .map_err(color_eyre::eyre::Error::msg)?;
    assert!(errors
        .iter()
        .any(|error| error.kind == RuntimeErrorKind::TooDeep));
    Ok(())
}

#[test]
fn test_declaration_keeps_declared_type() -> Result<()> {
    let interpreter = run_source(r#"var x int is "a"; println(x + 1);"#)?;
    assert!(matches!(
        interpreter.errors(),
        [error] if error.kind == RuntimeErrorKind::MismatchedTypes {
            expected: ValueType::int(),
            actual: ValueType::str(),
        }
    ));
    assert_eq!(interpreter.lookup("x"), Some(&Value::from(0)));
    assert_eq!(interpreter.context().data(), "1\n");
    Ok(())
}

#[test]
fn test_loop_body_scope_is_fresh_each_iteration() -> Result<()> {
    let interpreter = run_source(
        r#"var x int is 1;
        for var i int is 0 {
            println(x + i);
            var x str is "shadow";
            set i += 1;
            if i > 1 then { break; };
        };"#,
    )?;
    assert!(!interpreter.has_errors());
    assert_eq!(interpreter.context().data(), "1\n2\n");
    Ok(())
}

/// Runs a program only when it type checks.
fn check_and_run(source: &str) -> Result<Option<TreeWalkInterpreter<BufferedContext>>> {
    let program = Parser::new(source).parse()?;
    let mut checker = TypeChecker::new();
    checker.check_program(&program);
    if checker.has_errors() {
        return Ok(None);
    }
    let mut interpreter = TreeWalkInterpreter::new(BufferedContext::new());
    interpreter.run(&program);
    Ok(Some(interpreter))
}

#[test]
fn test_possible_exits_are_rejected_before_running() -> Result<()> {
    for source in [
        "var x int is if false then { return 1; }; println(x + 1);",
        r#"var r int is for var i int is 0 { if i = 1 then { break 1; }; break "a"; }; println(r + 1);"#,
        "println(if true then { return 1; });",
    ] {
        assert!(check_and_run(source)?.is_none(), "accepted: {source}");
    }
    Ok(())
}

#[test]
fn test_output_failures_are_counted() {
    struct ClosedPipe;

    impl std::io::Write for ClosedPipe {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let program = Parser::new("println(1); print(2);")
        .parse()
        .expect("program parses");
    let mut interpreter = TreeWalkInterpreter::new(WriterContext::new(ClosedPipe));
    interpreter.run(&program);
    assert!(!interpreter.has_errors());
    assert_eq!(interpreter.context().failures(), 3);
}

#[test]
fn test_writer_context_delivers_output() -> Result<()> {
    let program = Parser::new(r#"println("a", 1); print(2.50);"#).parse()?;
    let mut interpreter = TreeWalkInterpreter::new(WriterContext::new(Vec::new()));
    interpreter.run(&program);
    let context = interpreter.into_context();
    assert_eq!(context.failures(), 0);
    assert_eq!(String::from_utf8(context.into_inner())?, "a\n1\n2.5");
    Ok(())
}

fn value_source() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("1"),
        Just("x"),
        Just("(x + 1)"),
        Just("len(s)"),
        Just("s"),
        Just("\"a\""),
        Just("true"),
        Just("y"),
    ]
}

fn condition_source() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("true"), Just("false"), Just("x = 1"), Just("s < \"b\"")]
}

fn type_source() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("int"), Just("str"), Just("bool"), Just("none")]
}

/// Statements mixing declarations, branches, loops and exits. Every loop
/// counts up and breaks after three iterations, so every program halts.
fn statement_source() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        prop_oneof![Just("1"), Just("x"), Just("(x + 1)"), Just("len(s)")]
            .prop_map(|value| format!("set x is {value};")),
        value_source().prop_map(|value| format!("println({value});")),
        (type_source(), value_source())
            .prop_map(|(value_type, value)| format!("var y {value_type} is {value};")),
        value_source().prop_map(|value| format!("break {value};")),
        value_source().prop_map(|value| format!("return {value};")),
        Just("break;".to_string()),
    ];
    leaf.prop_recursive(3, 32, 3, |inner| {
        let body = prop::collection::vec(inner, 1..3).prop_map(|statements| statements.join(" "));
        prop_oneof![
            (condition_source(), body.clone())
                .prop_map(|(condition, then)| format!("if {condition} then {{ {then} }};")),
            (condition_source(), body.clone(), body.clone()).prop_map(
                |(condition, then, other)| {
                    format!("if {condition} then {{ {then} }} else {{ {other} }};")
                }
            ),
            (type_source(), condition_source(), body.clone()).prop_map(
                |(value_type, condition, then)| {
                    format!("var y {value_type} is if {condition} then {{ {then} }};")
                }
            ),
            (type_source(), body.clone())
                .prop_map(|(value_type, block)| format!("var y {value_type} is {{ {block} }};")),
            (type_source(), body.clone(), value_source()).prop_map(
                |(value_type, block, value)| {
                    format!(
                        "var y {value_type} is for var i int is 0 {{ {block} set i += 1; if i > 2 then {{ break {value}; }}; }};"
                    )
                }
            ),
            body.prop_map(|block| {
                format!("for var i int is 0 {{ {block} set i += 1; if i > 2 then {{ break; }}; }};")
            }),
        ]
    })
}

proptest! {
    #[test]
    fn checked_programs_never_mistype_at_runtime(
        statements in prop::collection::vec(statement_source(), 1..5),
    ) {
        let source = format!(r#"var x int is 1; var s str is "a"; {}"#, statements.join(" "));
        let program = match Parser::new(&source).parse() {
            Ok(program) => program,
            Err(error) => return Err(TestCaseError::fail(format!("{error}: {source}"))),
        };
        let mut checker = TypeChecker::new();
        checker.check_program(&program);
        if !checker.has_errors() {
            let mut interpreter = TreeWalkInterpreter::new(BufferedContext::new());
            interpreter.run(&program);
            let formatter = BasicRuntimeErrorFormatter::new(&source);
            let errors: Vec<String> = interpreter
                .errors()
                .iter()
                .map(|error| formatter.format_error(error))
                .collect();
            prop_assert!(errors.is_empty(), "{}\n{}", source, errors.join("\n"));
        }
    }
}

struct TestCase {
    name: String,
    source: String,
    output: String,
    type_errors: String,
    runtime_errors: String,
}

impl TestCase {
    pub fn check(&self) {
        let program = match Parser::new(&self.source).parse() {
            Ok(program) => program,
            Err(error) => panic!("Failed test {} at parsing stage: {error}", self.name),
        };

        let mut checker = TypeChecker::new();
        checker.check_program(&program);
        let type_formatter = BasicTypeErrorFormatter::new(&self.source);
        let actual = checker
            .errors()
            .iter()
            .map(|error| type_formatter.format_error(error))
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(
            self.type_errors, actual,
            "Failed test {} at type checking stage.",
            self.name,
        );
        if checker.has_errors() {
            return;
        }

        let mut interpreter = TreeWalkInterpreter::new(BufferedContext::new());
        interpreter.run(&program);
        let runtime_formatter = BasicRuntimeErrorFormatter::new(&self.source);
        let actual = interpreter
            .errors()
            .iter()
            .map(|error| runtime_formatter.format_error(error))
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(
            self.runtime_errors, actual,
            "Failed test {} at runtime.",
            self.name,
        );

        let msg = interpreter.into_context().into_data();
        assert_eq!(self.output, msg, "Failed test {} at print.", self.name);
    }
}

fn test_engine(input_dir: &Path) -> Result<()> {
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

        println!("Parsing {path:?}");
        let test_case = parse_test_case(&path)?;
        println!("Checking {}", test_case.name);

        let res = std::panic::catch_unwind(|| {
            test_case.check();
        });
        if res.is_err() {
            println!("\tFails test case {}", test_case.name);
            succeeded = false;
        }
    }

    assert!(succeeded);

    Ok(())
}

fn expectation<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    line.find(marker)
        .and_then(|index| line[index..].strip_prefix(marker))
        .map(str::trim)
}

fn parse_test_case(input_path: &Path) -> Result<TestCase> {
    let test_name = AsRef::<Path>::as_ref(
        input_path
            .file_name()
            .expect("File name can't be none as the path is to a real file."),
    )
    .to_string_lossy();

    let input = read_to_string(input_path).context("Failed to open input test data file")?;

    let mut expected_outputs = Vec::new();
    let mut expected_type_errors = Vec::new();
    let mut expected_runtime_errors = Vec::new();

    for (line_index, line) in input.lines().enumerate() {
        let line_number = line_index + 1;
        if let Some(expected) = expectation(line, "// expect:") {
            expected_outputs.push(expected.to_string());
        } else if let Some(expected) = expectation(line, "// expect type error:") {
            expected_type_errors.push(format!("[line {line_number}] Error: {expected}"));
        } else if let Some(expected) = expectation(line, "// expect runtime error:") {
            expected_runtime_errors.push(format!("{expected}\n[line {line_number}]"));
        }
    }

    expected_outputs.push(String::new());
    let output = if expected_outputs.len() == 1 {
        String::new()
    } else {
        expected_outputs.join("\n")
    };
    Ok(TestCase {
        name: test_name.into_owned(),
        source: input,
        output,
        type_errors: expected_type_errors.join("\n"),
        runtime_errors: expected_runtime_errors.join("\n"),
    })
}
