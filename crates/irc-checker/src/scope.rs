//! The checker's scope and context, per `spec.md` §3.3.

use irc_common::interner::{Atom, Interner};
use irc_ir::Flavor;
use irc_types::{ConId, ConTable, Type};
use rustc_hash::{FxHashMap, FxHashSet};

/// A scope: the value environment and the type-constructor environment.
/// Scopes overlay immutably — extending one for a nested block never
/// mutates the parent's maps, it builds a new `Scope` that clones the
/// small amount of newly introduced state on top (`spec.md` §5:
/// "Environments ... are small immutable overlays that may be shared
/// structurally between sibling branches").
#[derive(Clone, Default)]
pub struct Scope {
    pub vals: FxHashMap<Atom, Type>,
    pub cons: FxHashSet<ConId>,
}

impl Scope {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Disjoint-unions `extra` constructors into this scope's
    /// constructor set, failing on the first one already present
    /// (`spec.md` §4.1: "fails when adding a duplicate").
    pub fn add_cons_disjoint(&mut self, extra: impl IntoIterator<Item = ConId>) -> Result<(), ConId> {
        let mut staged = Vec::new();
        for c in extra {
            if self.cons.contains(&c) || staged.contains(&c) {
                return Err(c);
            }
            staged.push(c);
        }
        self.cons.extend(staged);
        Ok(())
    }
}

/// Extends a [`Scope`] with the remaining ambient state the checker
/// threads through a walk: in-scope labels, the return slot, the async
/// flag, and the current flavor (`spec.md` §3.3).
pub struct Context<'a> {
    pub scope: Scope,
    pub labels: FxHashMap<Atom, Type>,
    pub return_typ: Option<Type>,
    pub is_async: bool,
    pub flavor: Flavor,
    pub cons: &'a ConTable,
    pub interner: &'a Interner,
    pub phase: &'static str,
}

impl<'a> Context<'a> {
    pub fn top_level(
        scope: Scope,
        flavor: Flavor,
        cons: &'a ConTable,
        interner: &'a Interner,
        phase: &'static str,
    ) -> Self {
        Self {
            scope,
            labels: FxHashMap::default(),
            return_typ: None,
            is_async: false,
            flavor,
            cons,
            interner,
            phase,
        }
    }

    /// A child context for a function/class/actor body: fresh return
    /// slot and async flag, empty labels, same scope.
    pub fn enter_body(&self, scope: Scope, return_typ: Option<Type>, is_async: bool) -> Self {
        Self {
            scope,
            labels: FxHashMap::default(),
            return_typ,
            is_async,
            flavor: self.flavor,
            cons: self.cons,
            interner: self.interner,
            phase: self.phase,
        }
    }

    pub fn with_scope(&self, scope: Scope) -> Self {
        Self {
            scope,
            labels: self.labels.clone(),
            return_typ: self.return_typ.clone(),
            is_async: self.is_async,
            flavor: self.flavor,
            cons: self.cons,
            interner: self.interner,
            phase: self.phase,
        }
    }

    pub fn with_label(&self, label: Atom, t: Type) -> Self {
        let mut labels = self.labels.clone();
        labels.insert(label, t);
        Self {
            scope: self.scope.clone(),
            labels,
            return_typ: self.return_typ.clone(),
            is_async: self.is_async,
            flavor: self.flavor,
            cons: self.cons,
            interner: self.interner,
            phase: self.phase,
        }
    }
}
