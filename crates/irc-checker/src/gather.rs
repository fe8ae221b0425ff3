//! Two-phase declaration gathering, per `spec.md` §4.3.1.
//!
//! Gather collects every name a block introduces — before any
//! declaration's body is itself checked — so that mutually recursive
//! `let`s can see each other. Each declaration's bound-variable types
//! come straight from its already-annotated initializer expression (the
//! IR arrives fully typed; gather does not infer anything, it only
//! harvests what elaboration already recorded).

use crate::check_pattern::check_pattern;
use crate::scope::Scope;
use irc_common::diagnostic::Diagnostic;
use irc_common::limits::MAX_BLOCK_DECLARATIONS;
use irc_common::span::Span;
use irc_ir::Dec;
use irc_types::{ConTable, Type};

fn fail(phase: &'static str, at: Span, message: impl Into<String>) -> Diagnostic {
    Diagnostic::new(phase, at, message)
}

/// Gathers `decs` into a scope extending `parent`. Fails on the first
/// duplicate name or duplicate type-constructor identity.
pub fn gather(
    cons: &ConTable,
    phase: &'static str,
    at: Span,
    parent: &Scope,
    decs: &[Dec],
) -> Result<Scope, Diagnostic> {
    if decs.len() as u32 > MAX_BLOCK_DECLARATIONS {
        return Err(fail(phase, at, "block has more declarations than the checker will gather"));
    }

    let mut scope = parent.clone();
    for dec in decs {
        match dec {
            Dec::Let(pat, e) => {
                let bound = check_pattern(cons, phase, at, pat, &e.typ)?;
                bind_all(phase, at, &mut scope, bound)?;
            }
            Dec::Var(name, e) => {
                bind_one(phase, at, &mut scope, *name, Type::Mut(Box::new(e.typ.clone())))?;
            }
            Dec::Declare(name, t) => {
                bind_one(phase, at, &mut scope, *name, t.clone())?;
            }
            Dec::Define(..) => {
                // Re-binds a name a prior `Declare` in this same block
                // already introduced; the check phase verifies the
                // initializer against that recorded type.
            }
            Dec::Type(con) => {
                scope
                    .add_cons_disjoint([*con])
                    .map_err(|_| fail(phase, at, "type constructor defined twice in the same block"))?;
            }
        }
    }
    tracing::trace!(phase, declarations = decs.len(), bound = scope.vals.len(), "gather complete");
    Ok(scope)
}

fn bind_one(
    phase: &'static str,
    at: Span,
    scope: &mut Scope,
    name: irc_common::interner::Atom,
    t: Type,
) -> Result<(), Diagnostic> {
    if scope.vals.contains_key(&name) {
        return Err(fail(phase, at, "name bound twice in the same block"));
    }
    scope.vals.insert(name, t);
    Ok(())
}

pub(crate) fn bind_all(
    phase: &'static str,
    at: Span,
    scope: &mut Scope,
    bound: Vec<(irc_common::interner::Atom, Type)>,
) -> Result<(), Diagnostic> {
    for (name, t) in bound {
        bind_one(phase, at, scope, name, t)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/gather.rs"]
mod tests;
