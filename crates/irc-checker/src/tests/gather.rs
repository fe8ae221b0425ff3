use super::*;
use irc_common::interner::Interner;
use irc_common::span::Span;
use irc_ir::{Dec, Expr, ExprKind, Literal, Pattern};
use irc_types::{ConTable, Effect, Prim, Type};

fn lit_expr(lit: Literal, t: Type) -> Expr {
    Expr { kind: Box::new(ExprKind::Lit(lit)), at: Span::dummy(), typ: t, eff: Effect::Triv }
}

#[test]
fn let_bindings_in_the_same_block_see_each_other_after_gather() {
    let mut interner = Interner::new();
    let cons = ConTable::new();
    let x = interner.intern("x");
    let y = interner.intern("y");
    let decs = vec![
        Dec::Let(Pattern::Var(x), lit_expr(Literal::Nat(1), Type::Prim(Prim::Nat))),
        Dec::Let(Pattern::Var(y), lit_expr(Literal::Bool(true), Type::Prim(Prim::Bool))),
    ];
    let scope = gather(&cons, "test", Span::dummy(), &Scope::empty(), &decs).unwrap();
    assert_eq!(scope.vals.get(&x), Some(&Type::Prim(Prim::Nat)));
    assert_eq!(scope.vals.get(&y), Some(&Type::Prim(Prim::Bool)));
}

#[test]
fn var_binding_introduces_a_mutable_cell() {
    let mut interner = Interner::new();
    let cons = ConTable::new();
    let x = interner.intern("x");
    let decs = vec![Dec::Var(x, lit_expr(Literal::Nat(1), Type::Prim(Prim::Nat)))];
    let scope = gather(&cons, "test", Span::dummy(), &Scope::empty(), &decs).unwrap();
    assert_eq!(scope.vals.get(&x), Some(&Type::Mut(Box::new(Type::Prim(Prim::Nat)))));
}

#[test]
fn duplicate_name_in_one_block_is_rejected() {
    let mut interner = Interner::new();
    let cons = ConTable::new();
    let x = interner.intern("x");
    let decs = vec![
        Dec::Let(Pattern::Var(x), lit_expr(Literal::Nat(1), Type::Prim(Prim::Nat))),
        Dec::Let(Pattern::Var(x), lit_expr(Literal::Nat(2), Type::Prim(Prim::Nat))),
    ];
    assert!(gather(&cons, "test", Span::dummy(), &Scope::empty(), &decs).is_err());
}

#[test]
fn declare_then_define_does_not_double_bind() {
    let mut interner = Interner::new();
    let cons = ConTable::new();
    let x = interner.intern("x");
    let decs = vec![
        Dec::Declare(x, Type::Prim(Prim::Nat)),
        Dec::Define(x, irc_ir::Mutability::Const, lit_expr(Literal::Nat(1), Type::Prim(Prim::Nat))),
    ];
    let scope = gather(&cons, "test", Span::dummy(), &Scope::empty(), &decs).unwrap();
    assert_eq!(scope.vals.get(&x), Some(&Type::Prim(Prim::Nat)));
}
