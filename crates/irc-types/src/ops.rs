//! Operations on types: one-step unfolding, the sequence/tuple fold, and
//! the destructuring helpers the checker uses to pick apart a type
//! before matching a node's shape against it.

use crate::con::{ConTable, Kind};
use crate::error::TypeError;
use crate::subst::open;
use crate::ty::{FuncType, ObjSort, Type};
use irc_common::interner::Atom;
use irc_common::limits::MAX_INSTANTIATION_DEPTH;

/// Unfolds a type constructor application one step: a `Def` expands to
/// its body, an `Abs` (an as-yet-uninstantiated generic parameter)
/// expands to its upper bound. Anything else is returned unchanged.
/// Does not recurse — callers that need a type in weak-head-normal form
/// loop calling `promote` themselves, bounded by
/// [`irc_common::limits::MAX_INSTANTIATION_DEPTH`].
pub fn promote(cons: &ConTable, t: &Type) -> Type {
    match t {
        Type::Con(c, args) => match cons.kind(*c) {
            Kind::Def { binds, body } => open(binds, args, body),
            Kind::Abs { binds, bound } => open(binds, args, bound),
        },
        other => other.clone(),
    }
}

/// Unfolds `t` until it is no longer a constructor application, or until
/// `limit` steps have been taken (a cycle in a malformed constructor
/// environment must not hang the checker).
pub fn promote_to_whnf(cons: &ConTable, t: &Type, limit: u32) -> Type {
    let mut cur = t.clone();
    for _ in 0..limit {
        match &cur {
            Type::Con(..) => cur = promote(cons, &cur),
            _ => return cur,
        }
    }
    cur
}

/// Folds a flattened argument/result list back into a single type: the
/// empty list is unit, a singleton is itself, anything else is a tuple.
pub fn seq(ts: &[Type]) -> Type {
    match ts {
        [] => Type::unit(),
        [t] => t.clone(),
        _ => Type::Tuple(ts.to_vec()),
    }
}

/// Binary search for a field by label; object and variant fields are
/// kept sorted ascending by construction.
pub fn lookup_field(label: Atom, fields: &[crate::ty::Field]) -> Option<&Type> {
    fields
        .binary_search_by_key(&label, |f| f.label)
        .ok()
        .map(|i| &fields[i].typ)
}

pub fn lookup_variant(label: Atom, arms: &[(Atom, Type)]) -> Option<&Type> {
    arms.binary_search_by_key(&label, |(l, _)| *l)
        .ok()
        .map(|i| &arms[i].1)
}

/// Whether a fully elaborated type contains no abstract type variable
/// and no unresolved placeholder. Shared functions require concrete
/// domain and codomain.
pub fn is_concrete(cons: &ConTable, t: &Type) -> bool {
    match t {
        Type::Pre => false,
        Type::Bound(_) => false,
        Type::Con(c, args) => {
            matches!(cons.kind(*c), Kind::Def { .. }) && args.iter().all(|a| is_concrete(cons, a))
        }
        Type::Prim(_) | Type::Any | Type::Non | Type::Shared => true,
        Type::Tuple(ts) => ts.iter().all(|t| is_concrete(cons, t)),
        Type::Option(t) | Type::Array(t) | Type::Mut(t) | Type::Async(t) | Type::Serialized(t) => {
            is_concrete(cons, t)
        }
        Type::Object(_, fields) => fields.iter().all(|f| is_concrete(cons, &f.typ)),
        Type::Variant(arms) => arms.iter().all(|(_, t)| is_concrete(cons, t)),
        Type::Func(f) => {
            f.binds.iter().all(|b| is_concrete(cons, &b.bound))
                && f.args.iter().all(|t| is_concrete(cons, t))
                && f.ret.iter().all(|t| is_concrete(cons, t))
        }
    }
}

/// Whether every value of this type can cross an actor boundary.
pub fn is_shared(cons: &ConTable, t: &Type) -> bool {
    match t {
        Type::Prim(_) | Type::Any => matches!(t, Type::Prim(_)),
        Type::Non | Type::Shared => true,
        Type::Mut(_) => false,
        Type::Tuple(ts) => ts.iter().all(|t| is_shared(cons, t)),
        Type::Option(t) => is_shared(cons, t),
        Type::Array(t) => is_shared(cons, t),
        Type::Async(_) => false,
        Type::Serialized(t) => is_shared(cons, t),
        Type::Object(ObjSort::Actor, _) => true,
        Type::Object(_, fields) => fields.iter().all(|f| is_shared(cons, &f.typ)),
        Type::Variant(arms) => arms.iter().all(|(_, t)| is_shared(cons, t)),
        Type::Func(f) => matches!(f.sort, crate::ty::FuncSort::Shared),
        Type::Con(..) => is_shared(cons, &promote(cons, t)),
        Type::Bound(_) | Type::Pre => false,
    }
}

/// The immutable view of a type: strips one layer of [`Type::Mut`] if
/// present, otherwise returns the type unchanged. This never fails —
/// every type has an immutable view, it is simply itself when already
/// immutable. Used wherever a `var` is read rather than assigned to.
pub fn as_immut(t: &Type) -> Type {
    match t {
        Type::Mut(inner) => (**inner).clone(),
        other => other.clone(),
    }
}

/// Destructures a mutable cell type, for assignment targets.
pub fn as_mut(cons: &ConTable, t: &Type) -> Result<Type, TypeError> {
    match promote_to_whnf(cons, t, MAX_INSTANTIATION_DEPTH) {
        Type::Mut(inner) => Ok(*inner),
        other => Err(TypeError::NotMutable(other)),
    }
}

pub fn as_tup_sub(cons: &ConTable, t: &Type) -> Result<Vec<Type>, TypeError> {
    match promote_to_whnf(cons, t, MAX_INSTANTIATION_DEPTH) {
        Type::Tuple(ts) => Ok(ts),
        Type::Non => Ok(Vec::new()),
        other => Err(TypeError::NotATuple(other)),
    }
}

pub fn as_obj_sub(cons: &ConTable, t: &Type) -> Result<(ObjSort, Vec<crate::ty::Field>), TypeError> {
    match promote_to_whnf(cons, t, MAX_INSTANTIATION_DEPTH) {
        Type::Object(sort, fields) => Ok((sort, fields)),
        other => Err(TypeError::NotAnObject(other)),
    }
}

pub fn as_array_sub(cons: &ConTable, t: &Type) -> Result<Type, TypeError> {
    match promote_to_whnf(cons, t, MAX_INSTANTIATION_DEPTH) {
        Type::Array(inner) => Ok(*inner),
        other => Err(TypeError::NotAnArray(other)),
    }
}

pub fn as_func_sub(cons: &ConTable, t: &Type) -> Result<FuncType, TypeError> {
    match promote_to_whnf(cons, t, MAX_INSTANTIATION_DEPTH) {
        Type::Func(f) => Ok(f),
        other => Err(TypeError::NotAFunction(other)),
    }
}

pub fn as_async_sub(cons: &ConTable, t: &Type) -> Result<Type, TypeError> {
    match promote_to_whnf(cons, t, MAX_INSTANTIATION_DEPTH) {
        Type::Async(inner) => Ok(*inner),
        other => Err(TypeError::NotAnAsync(other)),
    }
}

#[cfg(test)]
#[path = "tests/ops.rs"]
mod tests;
