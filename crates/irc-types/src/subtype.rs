//! Structural subtyping.
//!
//! `Non` is bottom, `Any` is top. Objects are width- and depth-subtyped
//! (a wider record is a subtype of a narrower one); variants go the
//! other way (fewer alternatives is a subtype of more); functions are
//! contravariant in their domain and covariant in their codomain;
//! mutable cells are invariant, since both reads and writes go through
//! them.

use crate::con::ConTable;
use crate::ops::{self, promote, promote_to_whnf};
use crate::ty::{FuncType, ObjSort, Type};
use irc_common::limits::{MAX_INSTANTIATION_DEPTH, MAX_SUBTYPE_DEPTH};

pub fn subtype(cons: &ConTable, t1: &Type, t2: &Type) -> bool {
    subtype_at(cons, t1, t2, 0)
}

fn subtype_at(cons: &ConTable, t1: &Type, t2: &Type, depth: u32) -> bool {
    if depth >= MAX_SUBTYPE_DEPTH {
        return false;
    }
    if matches!(t1, Type::Non) || matches!(t2, Type::Any) {
        return true;
    }
    match (t1, t2) {
        (Type::Prim(a), Type::Prim(b)) => a == b,
        // Shareable types are a subset of `Shared` (`spec.md` §3.1).
        (_, Type::Shared) => ops::is_shared(cons, t1),
        (Type::Tuple(a), Type::Tuple(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| subtype_at(cons, x, y, depth + 1))
        }
        (Type::Option(a), Type::Option(b)) => subtype_at(cons, a, b, depth + 1),
        (Type::Array(a), Type::Array(b)) => match (a.as_ref(), b.as_ref()) {
            (Type::Mut(x), Type::Mut(y)) => equiv_at(cons, x, y, depth + 1),
            (Type::Mut(_), _) | (_, Type::Mut(_)) => false,
            (x, y) => subtype_at(cons, x, y, depth + 1),
        },
        (Type::Mut(a), Type::Mut(b)) => equiv_at(cons, a, b, depth + 1),
        (Type::Async(a), Type::Async(b)) => subtype_at(cons, a, b, depth + 1),
        (Type::Serialized(a), Type::Serialized(b)) => subtype_at(cons, a, b, depth + 1),
        (Type::Object(s1, f1), Type::Object(s2, f2)) => {
            s1 == s2
                && f2.iter().all(|field2| {
                    f1.iter()
                        .find(|field1| field1.label == field2.label)
                        .is_some_and(|field1| subtype_at(cons, &field1.typ, &field2.typ, depth + 1))
                })
        }
        (Type::Variant(a1), Type::Variant(a2)) => a1.iter().all(|(label, t)| {
            a2.iter()
                .find(|(l2, _)| l2 == label)
                .is_some_and(|(_, t2)| subtype_at(cons, t, t2, depth + 1))
        }),
        (Type::Func(f1), Type::Func(f2)) => func_subtype(cons, f1, f2, depth + 1),
        (Type::Con(c1, a1), Type::Con(c2, a2)) if c1 == c2 => {
            a1.len() == a2.len() && a1.iter().zip(a2).all(|(x, y)| equiv_at(cons, x, y, depth + 1))
        }
        (Type::Con(..), _) => subtype_at(cons, &promote(cons, t1), t2, depth + 1),
        (_, Type::Con(..)) => subtype_at(cons, t1, &promote(cons, t2), depth + 1),
        (Type::Bound(a), Type::Bound(b)) => a == b,
        _ => false,
    }
}

fn equiv_at(cons: &ConTable, t1: &Type, t2: &Type, depth: u32) -> bool {
    subtype_at(cons, t1, t2, depth) && subtype_at(cons, t2, t1, depth)
}

fn func_subtype(cons: &ConTable, f1: &FuncType, f2: &FuncType, depth: u32) -> bool {
    if f1.sort != f2.sort || f1.control != f2.control {
        return false;
    }
    if f1.binds.len() != f2.binds.len() {
        return false;
    }
    let binds_match = f1
        .binds
        .iter()
        .zip(&f2.binds)
        .all(|(b1, b2)| equiv_at(cons, &b1.bound, &b2.bound, depth));
    if !binds_match {
        return false;
    }
    if f1.args.len() != f2.args.len() || f1.ret.len() != f2.ret.len() {
        return false;
    }
    // Contravariant in the domain.
    let args_ok = f1
        .args
        .iter()
        .zip(&f2.args)
        .all(|(a1, a2)| subtype_at(cons, a2, a1, depth));
    // Covariant in the codomain.
    let ret_ok = f1
        .ret
        .iter()
        .zip(&f2.ret)
        .all(|(r1, r2)| subtype_at(cons, r1, r2, depth));
    args_ok && ret_ok
}

/// Whether `t1` and `t2` are mutual subtypes, used wherever the language
/// treats a position invariantly (mutable cells, generic bind bounds).
pub fn equiv(cons: &ConTable, t1: &Type, t2: &Type) -> bool {
    equiv_at(cons, t1, t2, 0)
}

pub fn obj_sort_matches(sort: ObjSort, t: &Type, cons: &ConTable) -> bool {
    matches!(promote_to_whnf(cons, t, MAX_INSTANTIATION_DEPTH), Type::Object(s, _) if s == sort)
}

#[cfg(test)]
#[path = "tests/subtype.rs"]
mod tests;
