//! String interning for identifier and label deduplication.
//!
//! Variable names, field labels, and constructor names are compared for
//! equality far more often than they are printed, so they are interned
//! into a small `u32` handle ([`Atom`]) once and compared by that handle
//! thereafter.

use rustc_hash::FxHashMap;

/// An interned string handle. Cheap to copy, compare, and hash.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom(u32);

/// A string interner.
///
/// Not thread-safe by design: each compilation owns its own interner, in
/// keeping with the pipeline's single-threaded execution model.
#[derive(Debug, Default)]
pub struct Interner {
    strings: Vec<String>,
    lookup: FxHashMap<String, Atom>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `s`, returning its (possibly pre-existing) handle.
    pub fn intern(&mut self, s: &str) -> Atom {
        if let Some(&atom) = self.lookup.get(s) {
            return atom;
        }
        let atom = Atom(self.strings.len() as u32);
        self.strings.push(s.to_string());
        self.lookup.insert(s.to_string(), atom);
        atom
    }

    /// Resolve an [`Atom`] back to its string. Panics if `atom` was not
    /// produced by this interner.
    pub fn resolve(&self, atom: Atom) -> &str {
        &self.strings[atom.0 as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_the_same_string_returns_the_same_atom() {
        let mut interner = Interner::new();
        let a = interner.intern("self");
        let b = interner.intern("self");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_strings_get_distinct_atoms() {
        let mut interner = Interner::new();
        let a = interner.intern("x");
        let b = interner.intern("y");
        assert_ne!(a, b);
        assert_eq!(interner.resolve(a), "x");
        assert_eq!(interner.resolve(b), "y");
    }
}
