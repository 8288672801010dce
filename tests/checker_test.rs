use color_eyre::eyre::Result;

use nice_expr::{
    checker::{
        formatter::{BasicTypeErrorFormatter, TypeErrorFormatter},
        TypeChecker, TypeErrorKind,
    },
    context::IdentifierKind,
    control::ControlResult,
    parser::Parser,
    value::ValueType,
};

fn check_source(source: &str) -> Result<TypeChecker> {
    let program = Parser::new(source).parse()?;
    let mut checker = TypeChecker::new();
    checker.check_program(&program);
    Ok(checker)
}

fn error_kinds(source: &str) -> Result<Vec<TypeErrorKind>> {
    Ok(check_source(source)?
        .into_errors()
        .into_iter()
        .map(|error| error.kind)
        .collect())
}

fn assert_clean(source: &str) -> Result<()> {
    let checker = check_source(source)?;
    let formatter = BasicTypeErrorFormatter::new(source);
    assert!(
        !checker.has_errors(),
        "unexpected type errors:\n{}",
        formatter.format_errors(checker.errors())
    );
    Ok(())
}

#[test]
fn test_constant_declaration() -> Result<()> {
    let checker = check_source(r#"const k str is "hello world";"#)?;
    assert!(!checker.has_errors());
    let (entry, _) = checker
        .context()
        .get_identifier("k")
        .expect("k is declared");
    assert!(entry.payload.equal(&ValueType::str()));
    assert_eq!(entry.kind, IdentifierKind::Const);
    Ok(())
}

#[test]
fn test_declaration_mismatch_still_declares() -> Result<()> {
    let checker = check_source(r#"var x int is "a"; set x is 2;"#)?;
    let kinds: Vec<_> = checker.errors().iter().map(|error| &error.kind).collect();
    assert_eq!(kinds.len(), 1);
    assert!(matches!(
        kinds[0],
        TypeErrorKind::MismatchedTypes { expected, actual, .. }
            if expected.equal(&ValueType::int()) && actual.equal(&ValueType::str())
    ));
    Ok(())
}

#[test]
fn test_mismatch_message_quotes_the_node() -> Result<()> {
    let source = r#"var x int is "a";"#;
    let checker = check_source(source)?;
    let formatter = BasicTypeErrorFormatter::new(source);
    assert_eq!(
        formatter.format_error(&checker.errors()[0]),
        r#"[line 1] Error: mismatched types: got Int and Str at var x int is "a""#
    );
    Ok(())
}

#[test]
fn test_assign_to_constant() -> Result<()> {
    assert_eq!(
        error_kinds("const k int is 1; set k is 2;")?,
        vec![TypeErrorKind::AssignToConstant("k".into())]
    );
    Ok(())
}

#[test]
fn test_unknown_identifier() -> Result<()> {
    assert_eq!(
        error_kinds("set y is 1;")?,
        vec![TypeErrorKind::IdentifierNotFound("y".into())]
    );
    Ok(())
}

#[test]
fn test_mixed_list() -> Result<()> {
    assert_eq!(
        error_kinds(r#"var l list[int] is [1, "a"];"#)?,
        vec![TypeErrorKind::MixedList {
            expected: ValueType::int(),
            actual: ValueType::str(),
        }]
    );
    Ok(())
}

#[test]
fn test_mixed_map_values() -> Result<()> {
    assert_eq!(
        error_kinds(r#"var m map[int]str is <|1: "a", 2: 3|>;"#)?,
        vec![TypeErrorKind::MixedMap {
            expected: ValueType::str(),
            actual: ValueType::int(),
        }]
    );
    Ok(())
}

#[test]
fn test_numeric_promotion() -> Result<()> {
    assert_clean("var d dec is 1 + 2.5; var e dec is 2.5 * 2; var i int is 7 / 2;")?;
    assert!(matches!(
        error_kinds("var i int is 1 + 2.5;")?.as_slice(),
        [TypeErrorKind::MismatchedTypes { actual, .. }] if actual.equal(&ValueType::dec())
    ));
    Ok(())
}

#[test]
fn test_string_and_list_arithmetic() -> Result<()> {
    assert_clean(
        r#"var s str is "ab" + "c" - "b"; var l list[int] is [1, 2] + [3] - [1];"#,
    )?;
    assert!(matches!(
        error_kinds(r#"var l list[int] is [1] + ["a"];"#)?.as_slice(),
        [TypeErrorKind::InvalidOperands { operation: "Add", .. }, ..]
    ));
    Ok(())
}

#[test]
fn test_modulo_requires_ints() -> Result<()> {
    assert!(matches!(
        error_kinds("var m int is 5.5 % 2;")?.first(),
        Some(TypeErrorKind::ModuloOperands { .. })
    ));
    Ok(())
}

#[test]
fn test_comparisons() -> Result<()> {
    assert_clean(r#"var a bool is "a" < "b"; var b bool is [1] = [1]; var c bool is 2.5 >= 1.5;"#)?;
    assert!(matches!(
        error_kinds("var b bool is [1] < [2];")?.as_slice(),
        [TypeErrorKind::NotComparable { operation: "Less", .. }]
    ));
    assert!(matches!(
        error_kinds(r#"var b bool is 1 = "a";"#)?.as_slice(),
        [TypeErrorKind::MismatchedTypes { .. }]
    ));
    Ok(())
}

#[test]
fn test_boolean_tests() -> Result<()> {
    assert_clean("var b bool is not true and false or true;")?;
    assert!(matches!(
        error_kinds("var b bool is not 1;")?.as_slice(),
        [TypeErrorKind::NotOperand(_)]
    ));
    assert!(matches!(
        error_kinds("var b bool is true and 1;")?.as_slice(),
        [TypeErrorKind::TestOperands { operation: "And", .. }]
    ));
    Ok(())
}

#[test]
fn test_unary_minus() -> Result<()> {
    assert_clean("var a int is -1; var b dec is -1.5;")?;
    assert!(error_kinds(r#"var s str is -"a";"#)?
        .iter()
        .any(|kind| matches!(kind, TypeErrorKind::MinusOperand(_))));
    Ok(())
}

#[test]
fn test_indexing() -> Result<()> {
    assert_clean(
        r#"var s str is "abc"_0;
        var l list[list[int]] is [[1]];
        var i int is l_0_0;
        var m map[str]dec is <|"pi": 3.14|>;
        var d dec is m_"pi";"#,
    )?;
    assert!(matches!(
        error_kinds(r#"var m map[int]str is <|1: "a"|>; var v str is m_"x";"#)?.as_slice(),
        [TypeErrorKind::InvalidIndex { .. }]
    ));
    assert!(error_kinds("var n int is 5_0;")?
        .iter()
        .any(|kind| matches!(kind, TypeErrorKind::NotIndexable(_))));
    Ok(())
}

#[test]
fn test_if_condition_must_be_bool() -> Result<()> {
    assert!(matches!(
        error_kinds("if 1 then { println(1); };")?.as_slice(),
        [TypeErrorKind::NonBoolCondition(_)]
    ));
    Ok(())
}

#[test]
fn test_branch_types_must_agree() -> Result<()> {
    assert_clean(r#"if true then { println("a"); } else if false then { println("b"); } else { println("c"); };"#)?;
    let kinds = error_kinds(
        "for var i int is 0 { if i > 3 then { break i; } else { set i += 1; }; };",
    )?;
    assert!(matches!(
        kinds.as_slice(),
        [TypeErrorKind::BranchMismatch { then, other }]
            if then.equal(&ValueType::int()) && other.equal(&ValueType::none())
    ));
    Ok(())
}

#[test]
fn test_for_result_type() -> Result<()> {
    assert_clean(
        "var total int is 0;
        var last int is for var i int is 0 {
            set total += i;
            if i = 4 then { break i; };
            set i += 1;
        };",
    )?;
    Ok(())
}

#[test]
fn test_if_without_else_is_none_valued() -> Result<()> {
    let kinds = error_kinds("var x int is if false then { return 1; }; println(x + 1);")?;
    assert!(kinds.contains(&TypeErrorKind::ExitMismatch {
        expected: ValueType::int(),
        actual: ValueType::none(),
    }));
    assert!(kinds.iter().any(|kind| matches!(
        kind,
        TypeErrorKind::MismatchedTypes { expected, actual, .. }
            if expected.equal(&ValueType::int()) && actual.equal(&ValueType::none())
    )));
    assert!(matches!(
        error_kinds("println(if true then { return 1; });")?.as_slice(),
        [TypeErrorKind::ExitMismatch { .. }]
    ));
    assert_clean(r#"var y int is { return 3; }; var n none is if true then { println("a"); };"#)
}

#[test]
fn test_loop_exits_must_agree() -> Result<()> {
    assert_eq!(
        error_kinds(
            r#"var r int is for var i int is 0 { if i = 1 then { break 1; }; break "a"; };"#
        )?,
        vec![TypeErrorKind::ExitMismatch {
            expected: ValueType::int(),
            actual: ValueType::str(),
        }]
    );
    assert_clean(
        "var r int is for var i int is 0 {
            if i = 0 then { break 1; } else if i = 1 then { return 2; };
            set i += 1;
        };",
    )
}

#[test]
fn test_exits_after_a_certain_exit_are_ignored() -> Result<()> {
    assert_clean(r#"var r int is for var i int is 0 { break 1; break "a"; };"#)?;
    assert_clean(r#"var v int is { return 1; { return "a"; }; };"#)
}

#[test]
fn test_loop_variables_do_not_leak() -> Result<()> {
    assert_eq!(
        error_kinds("for var i int is 0 { break; }; println(i);")?,
        vec![TypeErrorKind::IdentifierNotFound("i".into())]
    );
    Ok(())
}

#[test]
fn test_loop_variable_restores_shadowed_name() -> Result<()> {
    assert_clean(r#"var i str is "outer"; for var i int is 0 { break i; }; var s str is i;"#)
}

#[test]
fn test_block_scoping() -> Result<()> {
    assert_eq!(
        error_kinds("{ var inner int is 1; }; println(inner);")?,
        vec![TypeErrorKind::IdentifierNotFound("inner".into())]
    );
    assert_clean("var x int is 1; { set x is 2; var y int is x; };")
}

#[test]
fn test_builtin_calls() -> Result<()> {
    assert_clean(r#"var n int is len([1, 2]); var p none is println(1, "a"); print();"#)?;
    assert!(matches!(
        error_kinds("len(1);")?.as_slice(),
        [TypeErrorKind::InvalidArgument { function: "len", .. }]
    ));
    assert!(matches!(
        error_kinds(r#"len("a", "b");"#)?.as_slice(),
        [TypeErrorKind::ArgumentCount {
            function: "len",
            actual: 2,
            expected: 1
        }]
    ));
    assert_eq!(
        error_kinds("foo();")?,
        vec![TypeErrorKind::UnknownFunction("foo".into())]
    );
    Ok(())
}

#[test]
fn test_errors_accumulate() -> Result<()> {
    let kinds = error_kinds("println(a); println(b); var c int is true;")?;
    assert_eq!(kinds.len(), 3);
    Ok(())
}

#[test]
fn test_program_result_is_first_signal() -> Result<()> {
    let program = Parser::new("var x int is 1; return x; break \"ignored\";").parse()?;
    let mut checker = TypeChecker::new();
    let result = checker.check_program(&program);
    assert!(matches!(result, ControlResult::Returned(value_type) if value_type.equal(&ValueType::int())));
    Ok(())
}

#[test]
fn test_deep_nesting_is_reported() -> Result<()> {
    let handle = std::thread::Builder::new()
        .stack_size(64 * 1024 * 1024)
        .spawn(|| {
            let source = format!("var x int is {}1;", "-".repeat(200));
            error_kinds(&source).map_err(|error| error.to_string())
        })?;
    let kinds = handle
        .join()
        .expect("checker thread panicked")
        .map_err(color_eyre::eyre::Error::msg)?;
    assert!(kinds.contains(&TypeErrorKind::TooDeep));
    Ok(())
}
