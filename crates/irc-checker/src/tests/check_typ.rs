use super::*;
use irc_common::interner::Interner;
use irc_types::{ConTable, Field, ObjSort, Prim, Type};

#[test]
fn rejects_pre_and_bound() {
    let cons = ConTable::new();
    assert!(check_typ(&cons, "test", Span::dummy(), &Type::Pre).is_err());
    assert!(check_typ(&cons, "test", Span::dummy(), &Type::Bound(0)).is_err());
}

#[test]
fn accepts_a_sorted_object_type() {
    let mut interner = Interner::new();
    let cons = ConTable::new();
    let a = interner.intern("a");
    let b = interner.intern("b");
    let t = Type::Object(
        ObjSort::Object,
        vec![Field { label: a, typ: Type::Prim(Prim::Nat) }, Field { label: b, typ: Type::Prim(Prim::Bool) }],
    );
    assert!(check_typ(&cons, "test", Span::dummy(), &t).is_ok());
}

#[test]
fn rejects_an_unsorted_object_type() {
    let mut interner = Interner::new();
    let cons = ConTable::new();
    let a = interner.intern("a");
    let b = interner.intern("b");
    let t = Type::Object(
        ObjSort::Object,
        vec![Field { label: b, typ: Type::Prim(Prim::Bool) }, Field { label: a, typ: Type::Prim(Prim::Nat) }],
    );
    let err = check_typ(&cons, "test", Span::dummy(), &t).unwrap_err();
    assert!(err.message.contains("not distinct and sorted"));
}

#[test]
fn mut_is_illegal_only_at_the_exact_position_checked() {
    assert!(is_illegal_mut_here(&Type::Mut(Box::new(Type::Prim(Prim::Nat)))));
    assert!(!is_illegal_mut_here(&Type::Array(Box::new(Type::Mut(Box::new(Type::Prim(Prim::Nat)))))));
}
