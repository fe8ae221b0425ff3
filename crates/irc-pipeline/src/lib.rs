//! Sequences the three IR passes: tail-call optimization, type checking,
//! and the async/await CPS transform (`spec.md` §2).
//!
//! This is not the driver/CLI named out of scope by `spec.md` §1 — no
//! argv parsing, no file I/O, no diagnostic pretty-printing. It is the
//! four-step sequencing itself, exposed as a library function so the
//! `spec.md` §8 scenarios are executable end to end: tail-call → check →
//! CPS → check. A fresh [`ConTable`] is sufficient for every step, since
//! no pass introduces a type constructor the checker needs to resolve.

use irc_checker::check_program;
use irc_common::diagnostic::Diagnostic;
use irc_common::id::IdGen;
use irc_common::interner::Interner;
use irc_ir::Program;
use irc_transforms::{cps_pass, tailcall_pass};
use irc_types::ConTable;

/// Runs the full pipeline over an elaborated `program`: tail-call →
/// check → CPS → check. Each intermediate program is checked before the
/// next pass runs on it; the first rule violation found aborts the whole
/// run, identifying which pass produced the ill-typed IR.
pub fn run_pipeline(gen: &IdGen, interner: &mut Interner, cons: &ConTable, program: &Program) -> Result<Program, Diagnostic> {
    tracing::debug!("running tailcall pass");
    let after_tailcall = tailcall_pass(gen, interner, program);
    check_program(cons, interner, "tailcall", &after_tailcall)?;

    tracing::debug!("running await pass");
    let after_cps = cps_pass(gen, interner, &after_tailcall);
    check_program(cons, interner, "await", &after_cps)?;

    Ok(after_cps)
}
