use super::*;
use crate::con::{ConTable, Kind};
use crate::ty::Type;
use irc_common::id::IdGen;
use irc_common::interner::Interner;

#[test]
fn distinct_declarations_get_distinct_identities_even_with_the_same_name() {
    let gen = IdGen::new();
    let mut interner = Interner::new();
    let mut table = ConTable::new();
    let name = interner.intern("Counter");

    let a = table.declare(&gen, name, Kind::Def { binds: vec![], body: Type::unit() });
    let b = table.declare(&gen, name, Kind::Def { binds: vec![], body: Type::unit() });

    assert_ne!(a, b);
    assert_eq!(table.name(a), table.name(b));
}

#[test]
fn kind_arity_matches_its_binds() {
    let gen = IdGen::new();
    let mut interner = Interner::new();
    let mut table = ConTable::new();
    let name = interner.intern("Pair");
    let binds = vec![
        TypeBind { var: interner.intern("A"), bound: Type::Any },
        TypeBind { var: interner.intern("B"), bound: Type::Any },
    ];
    let con = table.declare(&gen, name, Kind::Def { binds: binds.clone(), body: Type::unit() });

    assert_eq!(table.kind(con).arity(), 2);
}
