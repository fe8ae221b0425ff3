//! Capture-avoiding substitution of type arguments for bound variables.
//!
//! Types are first-order: the only binders are a [`crate::con::Kind`]'s
//! own parameter list and a [`crate::ty::FuncType`]'s `binds`. `open`
//! substitutes a kind's parameters into its body or bound; `close` is
//! its inverse, abstracting a set of concrete constructors back into
//! bound variables when a recursive group of type definitions is formed.

use crate::con::ConId;
use crate::ty::{Field, FuncType, Type, TypeBind};

fn shift(t: &Type, amount: i64, cutoff: u32) -> Type {
    match t {
        Type::Bound(i) if *i >= cutoff => Type::Bound((*i as i64 + amount) as u32),
        Type::Bound(_) => t.clone(),
        Type::Prim(_) | Type::Any | Type::Non | Type::Shared | Type::Pre => t.clone(),
        Type::Tuple(ts) => Type::Tuple(ts.iter().map(|t| shift(t, amount, cutoff)).collect()),
        Type::Option(t) => Type::Option(Box::new(shift(t, amount, cutoff))),
        Type::Array(t) => Type::Array(Box::new(shift(t, amount, cutoff))),
        Type::Mut(t) => Type::Mut(Box::new(shift(t, amount, cutoff))),
        Type::Async(t) => Type::Async(Box::new(shift(t, amount, cutoff))),
        Type::Serialized(t) => Type::Serialized(Box::new(shift(t, amount, cutoff))),
        Type::Object(sort, fields) => Type::Object(
            *sort,
            fields
                .iter()
                .map(|f| Field { label: f.label, typ: shift(&f.typ, amount, cutoff) })
                .collect(),
        ),
        Type::Variant(arms) => {
            Type::Variant(arms.iter().map(|(l, t)| (*l, shift(t, amount, cutoff))).collect())
        }
        Type::Con(c, args) => Type::Con(*c, args.iter().map(|t| shift(t, amount, cutoff)).collect()),
        Type::Func(f) => Type::Func(shift_func(f, amount, cutoff)),
    }
}

fn shift_func(f: &FuncType, amount: i64, cutoff: u32) -> FuncType {
    let inner_cutoff = cutoff + f.binds.len() as u32;
    FuncType {
        sort: f.sort,
        control: f.control,
        binds: f
            .binds
            .iter()
            .map(|b| TypeBind { var: b.var, bound: shift(&b.bound, amount, inner_cutoff) })
            .collect(),
        args: f.args.iter().map(|t| shift(t, amount, inner_cutoff)).collect(),
        ret: f.ret.iter().map(|t| shift(t, amount, inner_cutoff)).collect(),
    }
}

fn subst_at(t: &Type, depth: u32, args: &[Type]) -> Type {
    match t {
        Type::Bound(i) if *i >= depth && ((*i - depth) as usize) < args.len() => {
            shift(&args[(*i - depth) as usize], depth as i64, 0)
        }
        Type::Bound(i) if *i >= depth => Type::Bound(*i - args.len() as u32),
        Type::Bound(_) => t.clone(),
        Type::Prim(_) | Type::Any | Type::Non | Type::Shared | Type::Pre => t.clone(),
        Type::Tuple(ts) => Type::Tuple(ts.iter().map(|t| subst_at(t, depth, args)).collect()),
        Type::Option(t) => Type::Option(Box::new(subst_at(t, depth, args))),
        Type::Array(t) => Type::Array(Box::new(subst_at(t, depth, args))),
        Type::Mut(t) => Type::Mut(Box::new(subst_at(t, depth, args))),
        Type::Async(t) => Type::Async(Box::new(subst_at(t, depth, args))),
        Type::Serialized(t) => Type::Serialized(Box::new(subst_at(t, depth, args))),
        Type::Object(sort, fields) => Type::Object(
            *sort,
            fields
                .iter()
                .map(|f| Field { label: f.label, typ: subst_at(&f.typ, depth, args) })
                .collect(),
        ),
        Type::Variant(arms) => {
            Type::Variant(arms.iter().map(|(l, t)| (*l, subst_at(t, depth, args))).collect())
        }
        Type::Con(c, cargs) => {
            Type::Con(*c, cargs.iter().map(|t| subst_at(t, depth, args)).collect())
        }
        Type::Func(f) => Type::Func(subst_func_at(f, depth, args)),
    }
}

fn subst_func_at(f: &FuncType, depth: u32, args: &[Type]) -> FuncType {
    let inner_depth = depth + f.binds.len() as u32;
    FuncType {
        sort: f.sort,
        control: f.control,
        binds: f
            .binds
            .iter()
            .map(|b| TypeBind { var: b.var, bound: subst_at(&b.bound, inner_depth, args) })
            .collect(),
        args: f.args.iter().map(|t| subst_at(t, inner_depth, args)).collect(),
        ret: f.ret.iter().map(|t| subst_at(t, inner_depth, args)).collect(),
    }
}

/// Substitutes `args` for the bound variables of `body`, one level deep.
/// `binds.len()` must equal `args.len()`; the binds themselves are only
/// consulted for arity, their bounds play no role in substitution.
pub fn open(binds: &[TypeBind], args: &[Type], body: &Type) -> Type {
    debug_assert_eq!(binds.len(), args.len(), "open: arity mismatch");
    if args.is_empty() {
        return body.clone();
    }
    subst_at(body, 0, args)
}

fn close_at(t: &Type, depth: u32, cons: &[ConId]) -> Type {
    match t {
        Type::Con(c, cargs) if cargs.is_empty() => {
            if let Some(i) = cons.iter().position(|x| x == c) {
                Type::Bound(depth + i as u32)
            } else {
                t.clone()
            }
        }
        Type::Con(c, cargs) => {
            Type::Con(*c, cargs.iter().map(|t| close_at(t, depth, cons)).collect())
        }
        Type::Prim(_) | Type::Any | Type::Non | Type::Shared | Type::Pre | Type::Bound(_) => {
            t.clone()
        }
        Type::Tuple(ts) => Type::Tuple(ts.iter().map(|t| close_at(t, depth, cons)).collect()),
        Type::Option(t) => Type::Option(Box::new(close_at(t, depth, cons))),
        Type::Array(t) => Type::Array(Box::new(close_at(t, depth, cons))),
        Type::Mut(t) => Type::Mut(Box::new(close_at(t, depth, cons))),
        Type::Async(t) => Type::Async(Box::new(close_at(t, depth, cons))),
        Type::Serialized(t) => Type::Serialized(Box::new(close_at(t, depth, cons))),
        Type::Object(sort, fields) => Type::Object(
            *sort,
            fields
                .iter()
                .map(|f| Field { label: f.label, typ: close_at(&f.typ, depth, cons) })
                .collect(),
        ),
        Type::Variant(arms) => {
            Type::Variant(arms.iter().map(|(l, t)| (*l, close_at(t, depth, cons))).collect())
        }
        Type::Func(f) => {
            let inner_depth = depth + f.binds.len() as u32;
            Type::Func(FuncType {
                sort: f.sort,
                control: f.control,
                binds: f
                    .binds
                    .iter()
                    .map(|b| TypeBind { var: b.var, bound: close_at(&b.bound, inner_depth, cons) })
                    .collect(),
                args: f.args.iter().map(|t| close_at(t, inner_depth, cons)).collect(),
                ret: f.ret.iter().map(|t| close_at(t, inner_depth, cons)).collect(),
            })
        }
    }
}

/// Abstracts every nullary use of a constructor in `cons` into a bound
/// variable, the inverse of [`open`]. Used when a recursive group of
/// type definitions closes over its own, now-concrete, constructors to
/// build the [`crate::con::Kind::Def`] bodies that refer back to them.
pub fn close(cons: &[ConId], t: &Type) -> Type {
    close_at(t, 0, cons)
}

#[cfg(test)]
#[path = "tests/subst.rs"]
mod tests;
