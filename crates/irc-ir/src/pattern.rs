//! Patterns, per `spec.md` §3.2.

use crate::literal::Literal;
use irc_common::interner::Atom;

#[derive(Clone, Debug, PartialEq)]
pub enum Pattern {
    Wild,
    Lit(Literal),
    Var(Atom),
    Tuple(Vec<Pattern>),
    /// Field patterns, label-keyed; order is not semantically significant
    /// (unlike an object *type*'s fields, which must be sorted).
    Object(Vec<(Atom, Pattern)>),
    Opt(Box<Pattern>),
    Tag(Atom, Box<Pattern>),
    /// `p1 | p2 | ...`. Binds no variables — enforced by the checker
    /// (`spec.md` §4.3.2), not by this representation.
    Alt(Vec<Pattern>),
}

impl Pattern {
    /// Every variable this pattern binds, in left-to-right order,
    /// without checking for duplicates (the checker's job).
    pub fn bound_vars(&self, out: &mut Vec<Atom>) {
        match self {
            Pattern::Wild | Pattern::Lit(_) => {}
            Pattern::Var(name) => out.push(*name),
            Pattern::Tuple(ps) => ps.iter().for_each(|p| p.bound_vars(out)),
            Pattern::Object(fields) => fields.iter().for_each(|(_, p)| p.bound_vars(out)),
            Pattern::Opt(p) => p.bound_vars(out),
            Pattern::Tag(_, p) => p.bound_vars(out),
            Pattern::Alt(ps) => ps.iter().for_each(|p| p.bound_vars(out)),
        }
    }
}

#[cfg(test)]
#[path = "tests/pattern.rs"]
mod tests;
