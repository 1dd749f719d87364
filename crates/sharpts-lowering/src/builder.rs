//! The state-machine builder (C4, spec.md §4.3): turns one async/generator
//! function plus its closure- and suspension-analysis output into a
//! [`StateMachineLayout`].

use sharpts_ast::{FunctionLike, NodeId};
use sharpts_closures::CaptureTable;
use sharpts_common::Atom;
use sharpts_suspend::SuspensionTable;

use crate::hoisting::DisplayFieldId;
use crate::layout::{AsyncKind, LayoutBuilder, StateMachineLayout};

/// Extra facts about the function-like node that only the emitter's caller
/// (the driver, which has the checker's resolved symbol for this function)
/// knows: whether it's an instance method (needs `<>4__this`), whether it
/// carries a `synchronized` modifier, and whether it's a nested async arrow
/// whose enclosing state machine may already have completed by the time it
/// runs (needs `<>__selfBoxed`, see SPEC_FULL.md §15).
#[derive(Debug, Clone, Copy, Default)]
pub struct StateMachineOptions {
    pub is_instance_method: bool,
    pub is_synchronized: bool,
    pub needs_self_boxed: bool,
    pub has_parameter_defaults: bool,
}

pub struct StateMachineBuilder;

impl StateMachineBuilder {
    /// Builds the field layout for `fn_id`. `resolve_name` turns an
    /// interned `Atom` back into the source identifier text used in field
    /// names (`<>5__{name}`) — the builder itself never touches an
    /// interner directly, keeping it decoupled from `sharpts-common`'s
    /// storage.
    pub fn build(
        fn_id: NodeId,
        function: &FunctionLike,
        captures: &CaptureTable,
        suspend: &SuspensionTable,
        kind: AsyncKind,
        options: StateMachineOptions,
        resolve_name: &impl Fn(Atom) -> String,
    ) -> StateMachineLayout {
        let mut hoisted_locals: Vec<Atom> = suspend.hoisted_locals().copied().collect();
        hoisted_locals.sort();

        let captured: Vec<Atom> = captures
            .captured_locals(fn_id)
            .copied()
            .collect::<Vec<_>>();

        // Captured locals are materialised as display-class fields, not as
        // `<>5__` state-machine fields: exclude them from the hoisted set
        // passed to `with_hoisted` so they aren't double-allocated.
        let hoisted_locals: Vec<Atom> = hoisted_locals
            .into_iter()
            .filter(|name| !captured.contains(name))
            .collect();

        let builder = LayoutBuilder::new(fn_id, kind)
            .with_state_field()
            .with_builder_field()
            .with_this_field(options.is_instance_method)
            .with_self_boxed_field(options.needs_self_boxed)
            .with_defaults_applied_field(options.has_parameter_defaults)
            .with_awaiter_fields(suspend.len() as u32)
            .with_lock_fields(options.is_synchronized)
            .with_hoisted(suspend.hoisted_params(), &hoisted_locals, resolve_name);

        let captured_with_fields: Vec<(Atom, DisplayFieldId)> = captured
            .into_iter()
            .enumerate()
            .map(|(i, name)| (name, DisplayFieldId(i as u32)))
            .collect();

        builder.with_captured(captured_with_fields).build()
    }
}
