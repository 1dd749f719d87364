//! Output data model for the closure analyser (spec.md §3 "Capture record").

use rustc_hash::{FxHashMap, FxHashSet};
use sharpts_ast::NodeId;
use sharpts_common::Atom;

/// A single captured name. `this` is a distinguished variant rather than a
/// magic `Atom` so the resolver (C6) and emitter (C7) can match on it
/// without string comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureName {
    Named(Atom),
    This,
}

/// Per function-like node: the names it references from an enclosing scope
/// (`captures`), and the subset of its own locals that some inner function
/// captures (`captured_locals`).
#[derive(Debug, Clone, Default)]
pub struct FunctionCaptures {
    pub captures: FxHashSet<CaptureName>,
    pub captured_locals: FxHashSet<Atom>,
}

/// Result of running the closure analyser over one parsed unit.
///
/// `any_captured` is the inverse index spec.md §4.1 calls for: the union of
/// every function's `captured_locals`, letting the emitter ask "is this
/// name captured by *anyone*" in O(1) without scanning every function's
/// table.
#[derive(Debug, Clone, Default)]
pub struct CaptureTable {
    per_function: FxHashMap<NodeId, FunctionCaptures>,
    any_captured: FxHashSet<Atom>,
}

impl CaptureTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, function: NodeId) -> Option<&FunctionCaptures> {
        self.per_function.get(&function)
    }

    pub fn captures(&self, function: NodeId) -> impl Iterator<Item = &CaptureName> {
        self.per_function
            .get(&function)
            .into_iter()
            .flat_map(|fc| fc.captures.iter())
    }

    pub fn captured_locals(&self, function: NodeId) -> impl Iterator<Item = &Atom> {
        self.per_function
            .get(&function)
            .into_iter()
            .flat_map(|fc| fc.captured_locals.iter())
    }

    /// Whether any function anywhere in the unit captures `name` as a local.
    /// Used by the emitter to decide whether a declaration needs a
    /// display-class field instead of a stack slot even before visiting the
    /// declaring function's own capture set.
    pub fn is_captured_anywhere(&self, name: &Atom) -> bool {
        self.any_captured.contains(name)
    }

    pub(crate) fn record_capture(&mut self, function: NodeId, name: CaptureName) {
        self.per_function
            .entry(function)
            .or_default()
            .captures
            .insert(name);
    }

    pub(crate) fn record_captured_local(&mut self, owner: NodeId, name: Atom) {
        self.per_function
            .entry(owner)
            .or_default()
            .captured_locals
            .insert(name);
        self.any_captured.insert(name);
    }

    pub(crate) fn ensure_function_entry(&mut self, function: NodeId) {
        self.per_function.entry(function).or_default();
    }
}
