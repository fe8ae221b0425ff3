use super::*;
use crate::constructors::{block_expr, var_expr};
use crate::literal::Literal;
use irc_common::interner::Interner;
use irc_common::span::Span;
use irc_types::{Effect, Prim, Type};

fn lit(v: Literal, t: Type) -> Expr {
    Expr { kind: Box::new(ExprKind::Lit(v)), at: Span::dummy(), typ: t, eff: Effect::Triv }
}

#[test]
fn for_each_child_visits_both_sides_of_a_binop() {
    let a = lit(Literal::Nat(1), Type::Prim(Prim::Nat));
    let b = lit(Literal::Nat(2), Type::Prim(Prim::Nat));
    let e = Expr {
        kind: Box::new(ExprKind::Binop(crate::literal::BinOp::Add, Type::Prim(Prim::Nat), a, b)),
        at: Span::dummy(),
        typ: Type::Prim(Prim::Nat),
        eff: Effect::Triv,
    };
    let mut count = 0;
    for_each_child(&e, &mut |_| count += 1);
    assert_eq!(count, 2);
}

#[test]
fn contains_async_or_await_finds_a_nested_await() {
    let mut interner = Interner::new();
    let p = interner.intern("p");
    let await_typ = Type::Prim(Prim::Nat);
    let awaited = Expr {
        kind: Box::new(ExprKind::Await(var_expr_for_test(p, Type::Async(Box::new(await_typ.clone()))))),
        at: Span::dummy(),
        typ: await_typ,
        eff: Effect::Await,
    };
    let block = block_expr(vec![], awaited, Span::dummy());
    assert!(contains_async_or_await(&block));

    let pure = lit(Literal::Bool(true), Type::Prim(Prim::Bool));
    assert!(!contains_async_or_await(&pure));
}

fn var_expr_for_test(name: irc_common::interner::Atom, t: Type) -> Expr {
    var_expr(name, t, Span::dummy())
}
