//! String interning for identifier deduplication.
//!
//! Identifiers (parameter names, local names, captured-variable names, field
//! names) recur constantly across a module: the same name is looked up by
//! the closure analyser, the hoisting manager, and the resolver for every
//! reference. Interning turns those comparisons and hash-map keys into a
//! cheap `u32` instead of repeated string comparisons/allocations.

use std::fmt;
use std::sync::{Arc, Mutex};

use rustc_hash::FxHashMap;

/// An interned string: a small, `Copy` handle into an `Interner`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom(u32);

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Atom({})", self.0)
    }
}

/// A single-threaded string interner.
#[derive(Debug, Default)]
pub struct Interner {
    strings: Vec<Box<str>>,
    lookup: FxHashMap<Box<str>, u32>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `s`, returning a stable `Atom` handle.
    pub fn intern(&mut self, s: &str) -> Atom {
        if let Some(&id) = self.lookup.get(s) {
            return Atom(id);
        }
        let id = self.strings.len() as u32;
        let boxed: Box<str> = s.into();
        self.strings.push(boxed.clone());
        self.lookup.insert(boxed, id);
        Atom(id)
    }

    /// Resolve an `Atom` back to its string. Panics on a handle from a
    /// different interner — callers own exactly one `Interner` per module.
    pub fn resolve(&self, atom: Atom) -> &str {
        &self.strings[atom.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

/// A thread-safe interner shared across the closure/suspension analysers and
/// the emitter, which may run ahead of each other but never concurrently
/// mutate the same module — the `Mutex` only guards against accidental
/// aliasing, not a real concurrency requirement (see spec.md §5: the
/// emission pipeline is single-threaded within one module).
#[derive(Debug, Clone)]
pub struct ShardedInterner {
    inner: Arc<Mutex<Interner>>,
}

impl Default for ShardedInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl ShardedInterner {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Interner::new())),
        }
    }

    pub fn intern(&self, s: &str) -> Atom {
        self.inner.lock().expect("interner mutex poisoned").intern(s)
    }

    pub fn resolve(&self, atom: Atom) -> String {
        self.inner
            .lock()
            .expect("interner mutex poisoned")
            .resolve(atom)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let mut interner = Interner::new();
        let a = interner.intern("foo");
        let b = interner.intern("foo");
        assert_eq!(a, b);
        assert_eq!(interner.resolve(a), "foo");
    }

    #[test]
    fn distinct_strings_get_distinct_atoms() {
        let mut interner = Interner::new();
        let a = interner.intern("foo");
        let b = interner.intern("bar");
        assert_ne!(a, b);
    }

    #[test]
    fn sharded_interner_resolves_across_clones() {
        let interner = ShardedInterner::new();
        let atom = interner.intern("this");
        let clone = interner.clone();
        assert_eq!(clone.resolve(atom), "this");
    }
}
