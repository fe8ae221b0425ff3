//! `check_typ`: validates a type annotation's own well-formedness,
//! independent of any expression it annotates (`spec.md` §4.3 step 1).

use irc_common::diagnostic::Diagnostic;
use irc_common::limits::MAX_TYPE_FIELDS;
use irc_common::span::Span;
use irc_types::{ConTable, Kind, Type};

fn fail(phase: &'static str, at: Span, message: impl Into<String>) -> Diagnostic {
    Diagnostic::new(phase, at, message)
}

/// Recursively validates `t`: no stray bound variable or `Pre` at a
/// position the checker receives from elaboration, object/variant
/// fields sorted and distinct, and constructor applications matching
/// their kind's arity.
///
/// Entry point for a type the checker treats as closed (an expression's
/// own annotation, a `let`'s declared type, ...). [`Type::Bound`] is
/// only legal nested under the binders of a [`Type::Func`] it names —
/// `check_typ_under` tracks how many such binders are currently open.
pub fn check_typ(cons: &ConTable, phase: &'static str, at: Span, t: &Type) -> Result<(), Diagnostic> {
    check_typ_under(cons, phase, at, t, 0)
}

/// As [`check_typ`], but `t` is validated as though it already sits one
/// level under a binder — for a generic function's own parameter/result
/// types and bind bounds, which may reference the function's own
/// [`Type::Bound`] type parameters even though they are not themselves
/// wrapped in a [`Type::Func`] node (the function's binder comes from its
/// [`irc_ir::FuncData::binds`], not from the type it is checked against).
pub(crate) fn check_typ_as_func_member(cons: &ConTable, phase: &'static str, at: Span, t: &Type) -> Result<(), Diagnostic> {
    check_typ_under(cons, phase, at, t, 1)
}

fn check_typ_under(cons: &ConTable, phase: &'static str, at: Span, t: &Type, binders: u32) -> Result<(), Diagnostic> {
    match t {
        Type::Pre => Err(fail(phase, at, "type annotation is unresolved (`Pre`)")),
        Type::Bound(i) => {
            if *i < binders {
                Ok(())
            } else {
                Err(fail(phase, at, "bound type variable escaped its binder into a closed type"))
            }
        }
        Type::Prim(_) | Type::Any | Type::Non | Type::Shared => Ok(()),
        Type::Tuple(ts) => ts.iter().try_for_each(|t| check_typ_under(cons, phase, at, t, binders)),
        Type::Option(t) | Type::Array(t) | Type::Mut(t) | Type::Async(t) | Type::Serialized(t) => {
            check_typ_under(cons, phase, at, t, binders)
        }
        Type::Object(_, fields) => {
            if fields.len() as u32 > MAX_TYPE_FIELDS {
                return Err(fail(phase, at, "object type has more fields than the checker will validate"));
            }
            if !is_sorted_and_distinct(fields.iter().map(|f| f.label)) {
                return Err(fail(phase, at, "object type's fields are not distinct and sorted"));
            }
            fields.iter().try_for_each(|f| check_typ_under(cons, phase, at, &f.typ, binders))
        }
        Type::Variant(arms) => {
            if !is_sorted_and_distinct(arms.iter().map(|(l, _)| *l)) {
                return Err(fail(phase, at, "variant type's arms are not distinct and sorted"));
            }
            arms.iter().try_for_each(|(_, t)| check_typ_under(cons, phase, at, t, binders))
        }
        Type::Func(f) => {
            let inner = binders + 1;
            f.binds.iter().try_for_each(|b| check_typ_under(cons, phase, at, &b.bound, inner))?;
            f.args.iter().try_for_each(|t| check_typ_under(cons, phase, at, t, inner))?;
            f.ret.iter().try_for_each(|t| check_typ_under(cons, phase, at, t, inner))
        }
        Type::Con(c, args) => {
            let kind = cons.kind(*c);
            if kind.arity() != args.len() {
                return Err(fail(
                    phase,
                    at,
                    format!("type constructor applied to {} argument(s), expected {}", args.len(), kind.arity()),
                ));
            }
            args.iter().try_for_each(|t| check_typ_under(cons, phase, at, t, binders))?;
            match kind {
                Kind::Def { .. } | Kind::Abs { .. } => Ok(()),
            }
        }
    }
}

fn is_sorted_and_distinct(mut it: impl Iterator<Item = irc_common::interner::Atom>) -> bool {
    let Some(mut prev) = it.next() else { return true };
    for next in it {
        if next <= prev {
            return false;
        }
        prev = next;
    }
    true
}

/// Whether `t` is directly a [`Type::Mut`] at this position. A mutable
/// cell may only ever appear directly as a variable binding's type, an
/// array's element type, or an object field's type (`spec.md` §3.2) —
/// everywhere else (function parameters/results, tuple components,
/// generic instantiation arguments) it is illegal at the *top* of that
/// position, though it may still occur nested one of those legal
/// positions deeper inside (e.g. a tuple component that is itself a
/// mutable array). This check is intentionally shallow, not recursive.
pub fn is_illegal_mut_here(t: &Type) -> bool {
    matches!(t, Type::Mut(_))
}

#[cfg(test)]
#[path = "tests/check_typ.rs"]
mod tests;
