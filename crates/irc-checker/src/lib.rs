//! The IR type/effect checker (`spec.md` §4.3).
//!
//! Public contract: given a fully elaborated [`irc_ir::Program`], a phase
//! name identifying the pass that produced it, and the constructor/atom
//! tables it was built against, [`check_program`] either completes
//! silently or returns the first [`Diagnostic`] describing the violated
//! invariant. Both the tail-call optimizer and the await transform run
//! their output back through this entry point before handing the result
//! to the next pass (`spec.md` §2).

mod check_expr;
mod check_pattern;
mod check_typ;
mod gather;
mod scope;

pub use check_expr::check_expr;
pub use check_pattern::check_pattern;
pub use check_typ::{check_typ, is_illegal_mut_here};
pub use gather::gather;
pub use scope::{Context, Scope};

use check_expr::check_decs;

use irc_common::diagnostic::Diagnostic;
use irc_common::interner::Interner;
use irc_common::span::Span;
use irc_ir::Program;
use irc_types::ConTable;

/// Checks an entire program: its constructor's parameters, its ordered
/// top-level declaration groups, and its actor fields, in that order.
/// Each declaration group is gathered into the running scope before its
/// own declarations (and the next group) are checked, so groups may
/// refer to names the previous group introduced (`spec.md` §6.1).
pub fn check_program(
    cons: &ConTable,
    interner: &Interner,
    phase: &'static str,
    program: &Program,
) -> Result<(), Diagnostic> {
    let mut scope = Scope::empty();
    for (pat, t) in &program.args {
        check_typ(cons, phase, Span::dummy(), t)?;
        for (name, bound_typ) in check_pattern(cons, phase, Span::dummy(), pat, t)? {
            scope.vals.insert(name, bound_typ);
        }
    }

    for group in &program.decs {
        scope = gather(cons, phase, Span::dummy(), &scope, group)?;
        let cx = Context::top_level(scope.clone(), program.flavor, cons, interner, phase);
        check_decs(&cx, group, Span::dummy(), 0)?;
    }

    // Actor fields are checked as method bodies against the scope built
    // up by the declaration groups above: a fresh label environment, no
    // return slot (a field is not itself a function), and outside of
    // any async context.
    let top = Context::top_level(scope, program.flavor, cons, interner, phase);
    let field_cx = top.enter_body(top.scope.clone(), None, false);
    for (_, body) in &program.actor_fields {
        check_expr(&field_cx, body, 0)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/lib.rs"]
mod tests;
