use super::*;
use irc_common::interner::Interner;
use irc_ir::{Literal, Pattern};
use irc_types::{ConTable, Field, ObjSort, Prim, Type};

#[test]
fn wildcard_binds_nothing() {
    let cons = ConTable::new();
    let bound = check_pattern(&cons, "test", Span::dummy(), &Pattern::Wild, &Type::Prim(Prim::Nat)).unwrap();
    assert!(bound.is_empty());
}

#[test]
fn variable_pattern_binds_the_scrutinee_type() {
    let mut interner = Interner::new();
    let cons = ConTable::new();
    let x = interner.intern("x");
    let bound =
        check_pattern(&cons, "test", Span::dummy(), &Pattern::Var(x), &Type::Prim(Prim::Nat)).unwrap();
    assert_eq!(bound, vec![(x, Type::Prim(Prim::Nat))]);
}

#[test]
fn literal_pattern_requires_a_matching_type() {
    let cons = ConTable::new();
    assert!(check_pattern(&cons, "test", Span::dummy(), &Pattern::Lit(Literal::Bool(true)), &Type::Prim(Prim::Bool)).is_ok());
    assert!(check_pattern(&cons, "test", Span::dummy(), &Pattern::Lit(Literal::Bool(true)), &Type::Prim(Prim::Nat)).is_err());
}

#[test]
fn tuple_pattern_destructures_components() {
    let mut interner = Interner::new();
    let cons = ConTable::new();
    let x = interner.intern("x");
    let y = interner.intern("y");
    let pat = Pattern::Tuple(vec![Pattern::Var(x), Pattern::Var(y)]);
    let t = Type::Tuple(vec![Type::Prim(Prim::Nat), Type::Prim(Prim::Bool)]);
    let bound = check_pattern(&cons, "test", Span::dummy(), &pat, &t).unwrap();
    assert_eq!(bound, vec![(x, Type::Prim(Prim::Nat)), (y, Type::Prim(Prim::Bool))]);
}

#[test]
fn object_pattern_rejects_an_absent_field() {
    let mut interner = Interner::new();
    let cons = ConTable::new();
    let a = interner.intern("a");
    let missing = interner.intern("missing");
    let pat = Pattern::Object(vec![(missing, Pattern::Wild)]);
    let t = Type::Object(ObjSort::Object, vec![Field { label: a, typ: Type::Prim(Prim::Nat) }]);
    assert!(check_pattern(&cons, "test", Span::dummy(), &pat, &t).is_err());
}

#[test]
fn alternative_pattern_rejects_bound_variables() {
    let mut interner = Interner::new();
    let cons = ConTable::new();
    let x = interner.intern("x");
    let pat = Pattern::Alt(vec![Pattern::Var(x), Pattern::Wild]);
    let err = check_pattern(&cons, "test", Span::dummy(), &pat, &Type::Prim(Prim::Nat)).unwrap_err();
    assert!(err.message.contains("may not bind variables"));
}

#[test]
fn alternative_pattern_without_variables_is_accepted() {
    let cons = ConTable::new();
    let pat = Pattern::Alt(vec![Pattern::Lit(Literal::Nat(1)), Pattern::Lit(Literal::Nat(2))]);
    assert!(check_pattern(&cons, "test", Span::dummy(), &pat, &Type::Prim(Prim::Nat)).is_ok());
}
