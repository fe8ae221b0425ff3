//! `check_pattern`, per `spec.md` §4.3.2.

use irc_common::diagnostic::Diagnostic;
use irc_common::interner::Atom;
use irc_common::span::Span;
use irc_ir::{Literal, Pattern};
use irc_types::{ops, subtype::subtype, ConTable, Prim, Type};

fn fail(phase: &'static str, at: Span, message: impl Into<String>) -> Diagnostic {
    Diagnostic::new(phase, at, message)
}

pub(crate) fn literal_type(lit: &Literal) -> Type {
    match lit {
        Literal::Null => Type::Prim(Prim::Null),
        Literal::Bool(_) => Type::Prim(Prim::Bool),
        Literal::Nat(_) => Type::Prim(Prim::Nat),
        Literal::Int(_) => Type::Prim(Prim::Int),
        Literal::Nat8(_) => Type::Prim(Prim::Nat8),
        Literal::Nat16(_) => Type::Prim(Prim::Nat16),
        Literal::Nat32(_) => Type::Prim(Prim::Nat32),
        Literal::Nat64(_) => Type::Prim(Prim::Nat64),
        Literal::Float(_) => Type::Prim(Prim::Float),
        Literal::Char(_) => Type::Prim(Prim::Char),
        Literal::Text(_) => Type::Prim(Prim::Text),
    }
}

/// Checks `pat` against the scrutinee type `t`, returning the pattern's
/// bound-variable environment (name, type pairs, in binding order) or
/// the first mismatch found.
pub fn check_pattern(
    cons: &ConTable,
    phase: &'static str,
    at: Span,
    pat: &Pattern,
    t: &Type,
) -> Result<Vec<(Atom, Type)>, Diagnostic> {
    match pat {
        Pattern::Wild => Ok(Vec::new()),
        Pattern::Var(name) => Ok(vec![(*name, t.clone())]),
        Pattern::Lit(lit) => {
            let lt = literal_type(lit);
            if subtype(cons, &lt, t) {
                Ok(Vec::new())
            } else {
                Err(fail(phase, at, "literal pattern's type is not a subtype of the scrutinee type"))
            }
        }
        Pattern::Tuple(ps) => {
            let ts = ops::as_tup_sub(cons, t)
                .map_err(|e| fail(phase, at, format!("tuple pattern: {e}")))?;
            if !ts.is_empty() && ts.len() != ps.len() {
                return Err(fail(phase, at, "tuple pattern arity does not match the scrutinee type"));
            }
            let mut bound = Vec::new();
            for (i, p) in ps.iter().enumerate() {
                let component = ts.get(i).cloned().unwrap_or(Type::Non);
                bound.extend(check_pattern(cons, phase, at, p, &component)?);
            }
            Ok(bound)
        }
        Pattern::Object(fields) => {
            let (_, obj_fields) =
                ops::as_obj_sub(cons, t).map_err(|e| fail(phase, at, format!("object pattern: {e}")))?;
            let mut bound = Vec::new();
            for (label, p) in fields {
                let field_typ = ops::lookup_field(*label, &obj_fields)
                    .cloned()
                    .ok_or_else(|| fail(phase, at, "object pattern names a field absent from the scrutinee type"))?;
                bound.extend(check_pattern(cons, phase, at, p, &field_typ)?);
            }
            Ok(bound)
        }
        Pattern::Opt(p) => match ops::promote(cons, t) {
            Type::Option(inner) => check_pattern(cons, phase, at, p, &inner),
            Type::Non => check_pattern(cons, phase, at, p, &Type::Non),
            other => Err(fail(phase, at, format!("option pattern against a non-option type {other:?}"))),
        },
        Pattern::Tag(label, p) => match ops::promote(cons, t) {
            Type::Variant(arms) => {
                let arm_typ = ops::lookup_variant(*label, &arms)
                    .cloned()
                    .ok_or_else(|| fail(phase, at, "variant pattern names a tag absent from the scrutinee type"))?;
                check_pattern(cons, phase, at, p, &arm_typ)
            }
            Type::Non => check_pattern(cons, phase, at, p, &Type::Non),
            other => Err(fail(phase, at, format!("variant pattern against a non-variant type {other:?}"))),
        },
        Pattern::Alt(ps) => {
            for p in ps {
                let mut vars = Vec::new();
                p.bound_vars(&mut vars);
                if !vars.is_empty() {
                    return Err(fail(phase, at, "alternative pattern may not bind variables"));
                }
                check_pattern(cons, phase, at, p, t)?;
            }
            Ok(Vec::new())
        }
    }
}

#[cfg(test)]
#[path = "tests/check_pattern.rs"]
mod tests;
