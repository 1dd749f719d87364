//! The hoisting manager (C5): the single lookup table spec.md §4.3 requires
//! every other component to resolve hoisted names through, rather than each
//! one re-deriving field names on its own.

use rustc_hash::FxHashMap;
use sharpts_common::Atom;

/// Index into a state machine's field table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId(pub u32);

/// Index into a display class's field table. A distinct type from
/// [`FieldId`] because captured locals live in the closure's display-class
/// object, not in the state machine's own field table, even though a
/// state-machine field usually holds a reference to that display class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayFieldId(pub u32);

/// What kind of hoisted storage a name resolves to. The resolver (C6) uses
/// this to choose `ldfld`/`stfld` on `<>u__{k}` vs `<>4__this`-relative
/// access vs a display-class field, without re-deriving the distinction
/// itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoistedSlot {
    Parameter(FieldId),
    Local(FieldId),
    Captured(DisplayFieldId),
}

/// Per state machine: the one table mapping a source name to its hoisted
/// field. Built once by [`crate::builder::StateMachineBuilder::build`] and
/// consulted by every later pass — no other component synthesises a
/// hoisted field name (spec.md §4.3).
#[derive(Debug, Clone, Default)]
pub struct HoistingManager {
    slots: FxHashMap<Atom, HoistedSlot>,
}

impl HoistingManager {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&self, name: &Atom) -> Option<HoistedSlot> {
        self.slots.get(name).copied()
    }

    pub(crate) fn insert(&mut self, name: Atom, slot: HoistedSlot) {
        self.slots.insert(name, slot);
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
