use super::*;
use crate::literal::Literal;
use irc_common::interner::Interner;
use irc_common::span::Span;
use irc_types::{Effect, Type};

#[test]
fn expr_carries_its_own_type_and_effect_independent_of_its_children() {
    let mut interner = Interner::new();
    let name = interner.intern("x");
    let e = Expr {
        kind: Box::new(ExprKind::Var(name)),
        at: Span::new(0, 1),
        typ: Type::Prim(irc_types::Prim::Nat),
        eff: Effect::Triv,
    };
    assert_eq!(e.eff, Effect::Triv);
    match e.kind.as_ref() {
        ExprKind::Var(n) => assert_eq!(*n, name),
        _ => panic!("expected a variable reference"),
    }
}

#[test]
fn literal_node_round_trips_through_the_kind() {
    let e = Expr {
        kind: Box::new(ExprKind::Lit(Literal::Bool(true))),
        at: Span::dummy(),
        typ: Type::Prim(irc_types::Prim::Bool),
        eff: Effect::Triv,
    };
    assert!(matches!(e.kind.as_ref(), ExprKind::Lit(Literal::Bool(true))));
}
