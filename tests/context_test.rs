use nice_expr::context::{Context, FrameId, IdentifierEntry, IdentifierKind};

fn var(name: &str, payload: i64) -> IdentifierEntry<i64> {
    IdentifierEntry::new(name, payload, IdentifierKind::Var)
}

#[test]
fn test_root_frame() {
    let context: Context<i64> = Context::new();
    assert_eq!(context.current_frame(), FrameId::ROOT);
    assert_eq!(context.depth(), 0);
}

#[test]
fn test_lookup_walks_to_ancestors() {
    let mut context = Context::new();
    context.add_identifier(var("x", 1));
    let child = context.enter_scope();
    let (entry, owner) = context.get_identifier("x").expect("x is visible");
    assert_eq!(entry.payload, 1);
    assert_eq!(owner, FrameId::ROOT);
    assert_ne!(child, FrameId::ROOT);
    assert_eq!(context.depth(), 1);
}

#[test]
fn test_shadowing_and_exit() {
    let mut context = Context::new();
    context.add_identifier(var("x", 1));
    let child = context.enter_scope();
    context.add_identifier(var("x", 2));
    assert_eq!(context.get_identifier("x").map(|(e, f)| (e.payload, f)), Some((2, child)));
    context.exit_scope();
    assert_eq!(context.get_identifier("x").map(|(e, _)| e.payload), Some(1));
}

#[test]
fn test_mutation_lands_in_owner() {
    let mut context = Context::new();
    context.add_identifier(var("x", 1));
    context.enter_scope();
    context.enter_scope();
    if let Some(entry) = context.get_identifier_mut("x") {
        entry.payload = 5;
    }
    context.exit_scope();
    context.exit_scope();
    assert_eq!(context.get_identifier("x").map(|(e, _)| e.payload), Some(5));
}

#[test]
fn test_delete_only_touches_current_frame() {
    let mut context = Context::new();
    context.add_identifier(var("x", 1));
    context.enter_scope();
    assert_eq!(context.delete_identifier("x"), None);
    assert!(context.get_identifier("x").is_some());
    context.exit_scope();
    assert_eq!(context.delete_identifier("x"), Some(var("x", 1)));
    assert!(context.get_identifier("x").is_none());
}

#[test]
fn test_root_is_never_discarded() {
    let mut context = Context::new();
    context.add_identifier(IdentifierEntry::new("k", 3, IdentifierKind::Const));
    context.exit_scope();
    let (entry, _) = context.get_identifier("k").expect("k survives");
    assert!(entry.is_const());
}
