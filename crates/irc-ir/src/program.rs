//! The top-level IR program shape, per `spec.md` §6.1.

use crate::expr::{Dec, Expr};
use crate::pattern::Pattern;
use irc_common::interner::Atom;
use irc_types::Type;

/// Feature-availability flags carried by a program, per `spec.md` §6.2.
/// Each pass may clear a flag it has eliminated; the checker then
/// refuses any node relying on a cleared feature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Flavor {
    pub has_await: bool,
    pub has_show: bool,
    pub serialized: bool,
    pub has_async_typ: bool,
}

impl Flavor {
    /// The flavor of a freshly elaborated program: every feature still
    /// available.
    pub fn full() -> Self {
        Self { has_await: true, has_show: true, serialized: false, has_async_typ: true }
    }

    /// The flavor after the await transform has run.
    pub fn without_await(self) -> Self {
        Self { has_await: false, ..self }
    }
}

/// `(arguments, declaration groups, actor fields, flavor)`, per `spec.md`
/// §6.1.
#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    /// The top-level actor constructor's parameters, each with its
    /// declared type.
    pub args: Vec<(Pattern, Type)>,
    /// Ordered declaration groups, each an ordered list of declarations.
    pub decs: Vec<Vec<Dec>>,
    /// The actor's exposed methods, by label.
    pub actor_fields: Vec<(Atom, Expr)>,
    pub flavor: Flavor,
}
