use super::*;
use crate::con::{ConTable, Kind};
use crate::prim::Prim;
use crate::ty::{Control, Field, FuncSort, FuncType, ObjSort, Type, TypeBind};
use irc_common::id::IdGen;
use irc_common::interner::Interner;

#[test]
fn non_is_a_subtype_of_everything_any_is_a_supertype_of_everything() {
    let cons = ConTable::new();
    assert!(subtype(&cons, &Type::Non, &Type::Prim(Prim::Nat)));
    assert!(subtype(&cons, &Type::Non, &Type::Any));
    assert!(subtype(&cons, &Type::Prim(Prim::Text), &Type::Any));
}

#[test]
fn subtype_is_reflexive_for_primitives() {
    let cons = ConTable::new();
    assert!(subtype(&cons, &Type::Prim(Prim::Bool), &Type::Prim(Prim::Bool)));
    assert!(!subtype(&cons, &Type::Prim(Prim::Bool), &Type::Prim(Prim::Nat)));
}

#[test]
fn tuples_are_covariant_and_same_arity() {
    let cons = ConTable::new();
    let short = Type::Tuple(vec![Type::Non]);
    let long = Type::Tuple(vec![Type::Prim(Prim::Nat)]);
    assert!(subtype(&cons, &short, &long));

    let wrong_arity = Type::Tuple(vec![Type::Non, Type::Non]);
    assert!(!subtype(&cons, &wrong_arity, &long));
}

#[test]
fn objects_support_width_and_depth_subtyping() {
    let mut interner = Interner::new();
    let cons = ConTable::new();
    let a = interner.intern("a");
    let b = interner.intern("b");

    let wide = Type::Object(
        ObjSort::Object,
        vec![
            Field { label: a, typ: Type::Non },
            Field { label: b, typ: Type::Prim(Prim::Bool) },
        ],
    );
    let narrow = Type::Object(ObjSort::Object, vec![Field { label: a, typ: Type::Any }]);

    assert!(subtype(&cons, &wide, &narrow), "more fields is a subtype of fewer");
    assert!(!subtype(&cons, &narrow, &wide), "fewer fields is not a subtype of more");
}

#[test]
fn objects_of_different_sorts_never_relate() {
    let cons = ConTable::new();
    let actor = Type::Object(ObjSort::Actor, vec![]);
    let object = Type::Object(ObjSort::Object, vec![]);
    assert!(!subtype(&cons, &actor, &object));
    assert!(!subtype(&cons, &object, &actor));
}

#[test]
fn variants_go_the_opposite_direction_from_objects() {
    let mut interner = Interner::new();
    let cons = ConTable::new();
    let ok = interner.intern("ok");
    let err = interner.intern("err");

    let one_arm = Type::Variant(vec![(ok, Type::Non)]);
    let two_arms = Type::Variant(vec![(err, Type::Any), (ok, Type::Any)]);

    assert!(subtype(&cons, &one_arm, &two_arms), "fewer alternatives is a subtype of more");
    assert!(!subtype(&cons, &two_arms, &one_arm));
}

#[test]
fn mutable_cells_are_invariant() {
    let cons = ConTable::new();
    let a = Type::Mut(Box::new(Type::Prim(Prim::Nat)));
    let b = Type::Mut(Box::new(Type::Prim(Prim::Int)));
    assert!(!subtype(&cons, &a, &b));
    assert!(subtype(&cons, &a, &Type::Mut(Box::new(Type::Prim(Prim::Nat)))));
}

#[test]
fn mutable_arrays_are_invariant_in_their_element_immutable_arrays_are_covariant() {
    let cons = ConTable::new();
    let imm_narrow = Type::Array(Box::new(Type::Non));
    let imm_wide = Type::Array(Box::new(Type::Prim(Prim::Nat)));
    assert!(subtype(&cons, &imm_narrow, &imm_wide));

    let mut_a = Type::Array(Box::new(Type::Mut(Box::new(Type::Prim(Prim::Nat)))));
    let mut_b = Type::Array(Box::new(Type::Mut(Box::new(Type::Prim(Prim::Int)))));
    assert!(!subtype(&cons, &mut_a, &mut_b));
}

#[test]
fn functions_are_contravariant_in_domain_and_covariant_in_codomain() {
    let cons = ConTable::new();
    let narrow_to_wide = Type::Func(FuncType {
        sort: FuncSort::Local,
        control: Control::Returns,
        binds: vec![],
        args: vec![Type::Any], // accepts more (contravariant: wider domain is a subtype)
        ret: vec![Type::Non],  // promises less (covariant: narrower codomain is a subtype)
    });
    let wide_to_narrow = Type::Func(FuncType {
        sort: FuncSort::Local,
        control: Control::Returns,
        binds: vec![],
        args: vec![Type::Non],
        ret: vec![Type::Any],
    });

    assert!(subtype(&cons, &narrow_to_wide, &wide_to_narrow));
    assert!(!subtype(&cons, &wide_to_narrow, &narrow_to_wide));
}

#[test]
fn subtype_promotes_through_a_type_constructor() {
    let gen = IdGen::new();
    let mut interner = Interner::new();
    let mut cons = ConTable::new();
    let name = interner.intern("MyNat");
    let con = cons.declare(&gen, name, Kind::Def { binds: vec![], body: Type::Prim(Prim::Nat) });

    assert!(subtype(&cons, &Type::Con(con, vec![]), &Type::Prim(Prim::Nat)));
    assert!(subtype(&cons, &Type::Prim(Prim::Nat), &Type::Con(con, vec![])));
    assert!(subtype(&cons, &Type::Con(con, vec![]), &Type::Any));
}

#[test]
fn subtype_is_transitive_through_a_chain_of_constructors() {
    let gen = IdGen::new();
    let mut interner = Interner::new();
    let mut cons = ConTable::new();
    let name_a = interner.intern("A");
    let a = cons.declare(&gen, name_a, Kind::Def { binds: vec![], body: Type::Prim(Prim::Nat) });
    let name_b = interner.intern("B");
    let b = cons.declare(&gen, name_b, Kind::Def { binds: vec![], body: Type::Con(a, vec![]) });

    assert!(subtype(&cons, &Type::Con(b, vec![]), &Type::Prim(Prim::Nat)));
}

#[test]
fn shareable_types_are_a_subset_of_shared() {
    let cons = ConTable::new();
    assert!(subtype(&cons, &Type::Prim(Prim::Nat), &Type::Shared), "a primitive is shareable");
    assert!(subtype(&cons, &Type::Shared, &Type::Shared));
    assert!(!subtype(&cons, &Type::Mut(Box::new(Type::Prim(Prim::Nat))), &Type::Shared), "a mutable cell is never shareable");
    assert!(!subtype(&cons, &Type::Async(Box::new(Type::Prim(Prim::Nat))), &Type::Shared), "a future is never shareable");
}

#[test]
fn equiv_requires_mutual_subtyping() {
    let cons = ConTable::new();
    assert!(equiv(&cons, &Type::Prim(Prim::Nat), &Type::Prim(Prim::Nat)));
    assert!(!equiv(&cons, &Type::Non, &Type::Prim(Prim::Nat)));
}
