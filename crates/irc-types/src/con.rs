//! Type constructor identity and the kind environment.
//!
//! A type constructor is never compared by name: two `type Foo = ...`
//! declarations in different scopes mint distinct [`ConId`]s even if they
//! share a spelling. Only the binder that introduced a constructor can
//! answer what it means.

use crate::ty::{Type, TypeBind};
use irc_common::id::{Id, IdGen};
use irc_common::interner::Atom;
use rustc_hash::FxHashMap;
use std::fmt;

/// Identity of a type constructor. Equality and hashing are by identity,
/// never by the constructor's display name.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConId(Id);

impl fmt::Debug for ConId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConId({})", self.0.as_u32())
    }
}

/// The definition of a type constructor, per `spec.md` §3.1: either a
/// concrete, expandable definition (`Def`) or an abstract one bounded by a
/// supertype (`Abs`), as introduced by a generic type parameter.
#[derive(Clone, Debug, PartialEq)]
pub enum Kind {
    Def { binds: Vec<TypeBind>, body: Type },
    Abs { binds: Vec<TypeBind>, bound: Type },
}

impl Kind {
    pub fn binds(&self) -> &[TypeBind] {
        match self {
            Kind::Def { binds, .. } | Kind::Abs { binds, .. } => binds,
        }
    }

    pub fn arity(&self) -> usize {
        self.binds().len()
    }
}

/// Maps constructor identities to their kind and display name. Shared
/// across a whole checking run; a constructor, once declared, never has
/// its kind mutated.
#[derive(Default)]
pub struct ConTable {
    entries: FxHashMap<ConId, (Atom, Kind)>,
}

impl ConTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mints a fresh identity for a new type constructor and records its
    /// kind. Never fails: freshness is guaranteed by the id generator.
    pub fn declare(&mut self, gen: &IdGen, name: Atom, kind: Kind) -> ConId {
        let id = ConId(gen.fresh());
        self.entries.insert(id, (name, kind));
        id
    }

    pub fn kind(&self, con: ConId) -> &Kind {
        &self
            .entries
            .get(&con)
            .expect("ConId used outside the table that minted it")
            .1
    }

    pub fn name(&self, con: ConId) -> Atom {
        self.entries
            .get(&con)
            .expect("ConId used outside the table that minted it")
            .0
    }
}

#[cfg(test)]
#[path = "tests/con.rs"]
mod tests;
