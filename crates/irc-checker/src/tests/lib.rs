use super::*;
use irc_common::interner::Interner;
use irc_common::span::Span;
use irc_ir::{Dec, Expr, ExprKind, Flavor, Literal, Pattern, Program};
use irc_types::{ConTable, Effect, Field, ObjSort, Prim, Type};

fn lit(lit: Literal, t: Type) -> Expr {
    Expr { kind: Box::new(ExprKind::Lit(lit)), at: Span::dummy(), typ: t, eff: Effect::Triv }
}

fn var(name: irc_common::interner::Atom, t: Type) -> Expr {
    Expr { kind: Box::new(ExprKind::Var(name)), at: Span::dummy(), typ: t, eff: Effect::Triv }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[test]
fn a_well_formed_program_checks_clean() {
    init_tracing();
    let cons = ConTable::new();
    let mut interner = Interner::new();
    let x = interner.intern("x");
    let get = interner.intern("get");
    let program = Program {
        args: Vec::new(),
        decs: vec![vec![Dec::Let(Pattern::Var(x), lit(Literal::Nat(1), Type::Prim(Prim::Nat)))]],
        actor_fields: vec![(get, var(x, Type::Prim(Prim::Nat)))],
        flavor: Flavor::full(),
    };
    assert!(check_program(&cons, &interner, "test", &program).is_ok());
}

#[test]
fn assigning_through_an_immutable_top_level_binding_is_rejected() {
    let cons = ConTable::new();
    let mut interner = Interner::new();
    let x = interner.intern("x");
    let set = interner.intern("set");
    let target = var(x, Type::Mut(Box::new(Type::Prim(Prim::Nat))));
    let source = lit(Literal::Nat(2), Type::Prim(Prim::Nat));
    let assign = Expr {
        kind: Box::new(ExprKind::Assign(target, source)),
        at: Span::dummy(),
        typ: Type::unit(),
        eff: Effect::Triv,
    };
    let program = Program {
        args: Vec::new(),
        // `x` is bound by `Let`, not `Var` — it is never a mutable cell.
        decs: vec![vec![Dec::Let(Pattern::Var(x), lit(Literal::Nat(1), Type::Prim(Prim::Nat)))]],
        actor_fields: vec![(set, assign)],
        flavor: Flavor::full(),
    };
    let err = check_program(&cons, &interner, "test", &program).unwrap_err();
    assert!(err.message.contains("assignment"));
}

#[test]
fn an_unsorted_object_type_anywhere_in_the_program_is_rejected() {
    let cons = ConTable::new();
    let mut interner = Interner::new();
    let x = interner.intern("x");
    // Intern `a` before `b` so `a`'s atom sorts lower than `b`'s; the field
    // list below lists `b` first, so it is out of order by atom handle.
    let a = interner.intern("a");
    let b = interner.intern("b");
    let unsorted = Type::Object(
        ObjSort::Object,
        vec![Field { label: b, typ: Type::Prim(Prim::Nat) }, Field { label: a, typ: Type::Prim(Prim::Nat) }],
    );
    let program = Program {
        args: Vec::new(),
        decs: vec![vec![Dec::Declare(x, unsorted)]],
        actor_fields: Vec::new(),
        flavor: Flavor::full(),
    };
    let err = check_program(&cons, &interner, "test", &program).unwrap_err();
    assert!(err.message.contains("not distinct and sorted"));
}

#[test]
fn later_declaration_groups_see_names_from_earlier_groups() {
    let cons = ConTable::new();
    let mut interner = Interner::new();
    let x = interner.intern("x");
    let y = interner.intern("y");
    let program = Program {
        args: Vec::new(),
        decs: vec![
            vec![Dec::Let(Pattern::Var(x), lit(Literal::Nat(1), Type::Prim(Prim::Nat)))],
            vec![Dec::Let(Pattern::Var(y), var(x, Type::Prim(Prim::Nat)))],
        ],
        actor_fields: Vec::new(),
        flavor: Flavor::full(),
    };
    assert!(check_program(&cons, &interner, "test", &program).is_ok());
}
