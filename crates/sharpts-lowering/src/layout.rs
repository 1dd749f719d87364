//! [`StateMachineLayout`]: the field table synthesised for one async/
//! generator/async-generator function (C4, spec.md §4.3).

use indexmap::IndexMap;
use sharpts_ast::NodeId;
use sharpts_common::Atom;

use crate::hoisting::{DisplayFieldId, FieldId, HoistedSlot, HoistingManager};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsyncKind {
    Async,
    Generator,
    AsyncGenerator,
}

/// Lock-field group emitted for a function-like node carrying a
/// `synchronized` modifier (spec.md §4.3 + §5), surfaced by the external
/// checker/binder as a decorator-equivalent annotation.
#[derive(Debug, Clone, Copy)]
pub struct LockFields {
    pub prev_reentrancy: FieldId,
    pub acquired: FieldId,
    pub lock_awaiter: FieldId,
}

#[derive(Debug, Clone)]
pub struct StateMachineLayout {
    pub function: NodeId,
    pub kind: AsyncKind,
    names: Vec<String>,

    pub state_field: FieldId,
    pub builder_field: FieldId,
    pub this_field: Option<FieldId>,
    pub self_boxed_field: Option<FieldId>,
    pub defaults_applied_field: Option<FieldId>,
    /// `<>u__{k}` awaiter fields, indexed by suspension state index `k`.
    awaiter_fields: Vec<FieldId>,
    pub lock_fields: Option<LockFields>,

    hoisting: HoistingManager,
}

impl StateMachineLayout {
    pub(crate) fn new(function: NodeId, kind: AsyncKind) -> Self {
        Self {
            function,
            kind,
            names: Vec::new(),
            state_field: FieldId(0),
            builder_field: FieldId(0),
            this_field: None,
            self_boxed_field: None,
            defaults_applied_field: None,
            awaiter_fields: Vec::new(),
            lock_fields: None,
            hoisting: HoistingManager::new(),
        }
    }

    pub fn field_name(&self, id: FieldId) -> &str {
        &self.names[id.0 as usize]
    }

    pub fn awaiter_field(&self, suspension_index: u32) -> FieldId {
        self.awaiter_fields[suspension_index as usize]
    }

    pub fn hoisting(&self) -> &HoistingManager {
        &self.hoisting
    }

    pub fn field_count(&self) -> usize {
        self.names.len()
    }
}

/// Builder half of [`StateMachineLayout`] construction: assigns fields in
/// the fixed order the teacher's display-class synthesis uses (state first,
/// builder second, ...), recording each name as it goes.
pub(crate) struct LayoutBuilder {
    layout: StateMachineLayout,
}

impl LayoutBuilder {
    pub fn new(function: NodeId, kind: AsyncKind) -> Self {
        Self {
            layout: StateMachineLayout::new(function, kind),
        }
    }

    fn alloc(&mut self, name: String) -> FieldId {
        let id = FieldId(self.layout.names.len() as u32);
        self.layout.names.push(name);
        id
    }

    pub fn with_state_field(mut self) -> Self {
        self.layout.state_field = self.alloc("<>1__state".to_string());
        self
    }

    pub fn with_builder_field(mut self) -> Self {
        self.layout.builder_field = self.alloc("<>t__builder".to_string());
        self
    }

    pub fn with_this_field(mut self, present: bool) -> Self {
        if present {
            self.layout.this_field = Some(self.alloc("<>4__this".to_string()));
        }
        self
    }

    pub fn with_self_boxed_field(mut self, present: bool) -> Self {
        if present {
            self.layout.self_boxed_field = Some(self.alloc("<>__selfBoxed".to_string()));
        }
        self
    }

    pub fn with_defaults_applied_field(mut self, present: bool) -> Self {
        if present {
            self.layout.defaults_applied_field = Some(self.alloc("<>__defaultsApplied".to_string()));
        }
        self
    }

    pub fn with_awaiter_fields(mut self, count: u32) -> Self {
        for k in 0..count {
            let id = self.alloc(format!("<>u__{k}"));
            self.layout.awaiter_fields.push(id);
        }
        self
    }

    pub fn with_lock_fields(mut self, present: bool) -> Self {
        if present {
            let prev_reentrancy = self.alloc("<>__prevReentrancy".to_string());
            let acquired = self.alloc("<>__lockAcquired".to_string());
            let lock_awaiter = self.alloc("<>__lockAwaiter".to_string());
            self.layout.lock_fields = Some(LockFields {
                prev_reentrancy,
                acquired,
                lock_awaiter,
            });
        }
        self
    }

    /// Hoisted parameter/local fields, `<>5__{name}`. Takes an ordered list
    /// so the field layout is deterministic across builds of the same
    /// function (`IndexMap` preserves insertion order for emission).
    pub fn with_hoisted(mut self, params: &[Atom], locals: &[Atom], names: &impl Fn(Atom) -> String) -> Self {
        let mut resolved: IndexMap<Atom, HoistedSlot> = IndexMap::new();
        for &name in params {
            let field = self.alloc(format!("<>5__{}", names(name)));
            resolved.insert(name, HoistedSlot::Parameter(field));
        }
        for &name in locals {
            if resolved.contains_key(&name) {
                continue;
            }
            let field = self.alloc(format!("<>5__{}", names(name)));
            resolved.insert(name, HoistedSlot::Local(field));
        }
        for (name, slot) in resolved {
            self.layout.hoisting.insert(name, slot);
        }
        self
    }

    pub fn with_captured(mut self, names_and_fields: Vec<(Atom, DisplayFieldId)>) -> Self {
        for (name, field) in names_and_fields {
            self.layout.hoisting.insert(name, HoistedSlot::Captured(field));
        }
        self
    }

    pub fn build(self) -> StateMachineLayout {
        self.layout
    }
}
