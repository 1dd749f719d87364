//! Variable resolver (C6), spec.md §4.4 / SPEC_FULL.md §6.
//!
//! Two implementations of the same `load`/`store` contract, selected by the
//! emission context's function kind: [`NormalResolver`] for a plain method
//! body, [`StateMachineResolver`] for a `MoveNext`/`Resume` body where
//! locals may have been hoisted to fields by the state-machine builder (C4).

use crate::errors::{EmitError, EmitResult};
use crate::ir::Instruction;
use rustc_hash::FxHashMap;
use sharpts_common::Atom;
use sharpts_lowering::{HoistedSlot, StateMachineLayout};
use std::collections::HashMap;

/// Where a normal-resolver local lives: an argument slot or a local slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalSlot {
    Arg(u32),
    Local(u32),
}

/// A nested closure's captured names, materialised as fields on some
/// instance this body can reach: either the display class it just
/// constructed for its own captured locals (`load_instance` is a
/// `ldloc`/`ldarg` against a temp), or `this` itself when the body being
/// compiled *is* a lowered arrow/closure method (`load_instance` is
/// `[LdArg(0)]`, tier 4 of spec.md §4.4's resolution table).
#[derive(Debug, Clone, Default)]
pub struct DisplayClassBinding {
    pub load_instance: Vec<Instruction>,
    pub fields: FxHashMap<Atom, u32>,
    pub this_field: Option<u32>,
}

pub trait Resolver {
    fn load(&self, name: &Atom) -> EmitResult<Vec<Instruction>>;
    fn store(&self, name: &Atom, value: Vec<Instruction>) -> EmitResult<Vec<Instruction>>;
    fn load_this(&self) -> Vec<Instruction>;

    /// Instructions to load the instance a nested closure should bind to
    /// when it's constructed from this body (spec.md §4.2's display-class
    /// synthesis), if this body has one. `None` means a nested arrow here
    /// can't capture anything (no locals of this body are ever captured).
    fn closure_bound_instance(&self) -> Option<Vec<Instruction>> {
        None
    }
}

/// Resolution for a method body with no suspension points: plain locals and
/// arguments resolve directly to `ldloc`/`ldarg`; names captured by a nested
/// closure resolve through a display-class field instead (spec.md §4.4's
/// resolution-order table, normal-function row, tiers 2-4). Tier 5
/// (entry-point/static field) is out of scope here — symbol tables for
/// top-level declarations are a checker/module-resolution concern
/// (spec.md §1 Non-goal), so a name this resolver can't place in either of
/// the first two tiers is a genuine structural error.
#[derive(Debug, Default)]
pub struct NormalResolver {
    slots: HashMap<Atom, LocalSlot>,
    this_arg: Option<u32>,
    display: Option<DisplayClassBinding>,
}

impl NormalResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, name: Atom, slot: LocalSlot) {
        self.slots.insert(name, slot);
    }

    pub fn bind_this(&mut self, arg: u32) {
        self.this_arg = Some(arg);
    }

    /// Binds this body's display-class instance: the instance a captured
    /// local lives on, and the field table a nested arrow's construction
    /// site (or this body's own captured-local accesses) resolves against.
    pub fn bind_display_class(&mut self, binding: DisplayClassBinding) {
        self.display = Some(binding);
    }
}

impl Resolver for NormalResolver {
    fn load(&self, name: &Atom) -> EmitResult<Vec<Instruction>> {
        match self.slots.get(name) {
            Some(LocalSlot::Arg(i)) => Ok(vec![Instruction::LdArg(*i)]),
            Some(LocalSlot::Local(i)) => Ok(vec![Instruction::LdLoc(*i)]),
            None => {
                if let Some(binding) = &self.display {
                    if let Some(&field) = binding.fields.get(name) {
                        let mut out = binding.load_instance.clone();
                        out.push(Instruction::LdFld(field));
                        return Ok(out);
                    }
                }
                Err(EmitError::structural(
                    format!("unresolved variable in a normal method body: {name:?}"),
                    0,
                    0,
                ))
            }
        }
    }

    fn store(&self, name: &Atom, mut value: Vec<Instruction>) -> EmitResult<Vec<Instruction>> {
        match self.slots.get(name) {
            Some(LocalSlot::Arg(i)) => {
                value.push(Instruction::StArg(*i));
                Ok(value)
            }
            Some(LocalSlot::Local(i)) => {
                value.push(Instruction::StLoc(*i));
                Ok(value)
            }
            None => {
                if let Some(binding) = &self.display {
                    if let Some(&field) = binding.fields.get(name) {
                        let mut out = binding.load_instance.clone();
                        out.extend(value);
                        out.push(Instruction::StFld(field));
                        return Ok(out);
                    }
                }
                Err(EmitError::structural(
                    format!("unresolved variable in a normal method body: {name:?}"),
                    0,
                    0,
                ))
            }
        }
    }

    fn load_this(&self) -> Vec<Instruction> {
        if let Some(binding) = &self.display {
            if let Some(field) = binding.this_field {
                let mut out = binding.load_instance.clone();
                out.push(Instruction::LdFld(field));
                return out;
            }
        }
        vec![Instruction::LdArg(self.this_arg.unwrap_or(0))]
    }

    fn closure_bound_instance(&self) -> Option<Vec<Instruction>> {
        self.display.as_ref().map(|b| b.load_instance.clone())
    }
}

/// Resolution for a state-machine body (`MoveNext`/`Resume`): hoisted
/// parameters/locals resolve through the [`HoistingManager`]
/// ([`StateMachineLayout::hoisting`]) to `ldfld`/`stfld` against `this`
/// (the state-machine struct/class instance) rather than `ldloc`/`ldarg`.
/// Names the hoisting manager has no slot for (truly local temporaries
/// introduced by the emitter itself, never live across a suspension point)
/// fall back to plain locals.
pub struct StateMachineResolver<'a> {
    layout: &'a StateMachineLayout,
    temps: HashMap<Atom, LocalSlot>,
}

impl<'a> StateMachineResolver<'a> {
    pub fn new(layout: &'a StateMachineLayout) -> Self {
        Self {
            layout,
            temps: HashMap::new(),
        }
    }

    pub fn bind_temp(&mut self, name: Atom, slot: LocalSlot) {
        self.temps.insert(name, slot);
    }

    fn field_load(&self, field: sharpts_lowering::FieldId) -> Vec<Instruction> {
        vec![Instruction::LdArg(0), Instruction::LdFld(field.0)]
    }

    fn field_store(&self, field: sharpts_lowering::FieldId, mut value: Vec<Instruction>) -> Vec<Instruction> {
        let mut out = vec![Instruction::LdArg(0)];
        out.append(&mut value);
        out.push(Instruction::StFld(field.0));
        out
    }
}

impl<'a> Resolver for StateMachineResolver<'a> {
    fn load(&self, name: &Atom) -> EmitResult<Vec<Instruction>> {
        match self.layout.hoisting().resolve(name) {
            Some(HoistedSlot::Parameter(f) | HoistedSlot::Local(f)) => Ok(self.field_load(f)),
            Some(HoistedSlot::Captured(display_field)) => {
                // Captured names are fields on a display class reached
                // through `<>4__this`'s captured-instance chain; the field
                // index here is resolved by the emitter's display-class
                // binding pass, not by a direct `this`-relative load.
                Ok(vec![Instruction::LdArg(0), Instruction::LdFld(display_field.0)])
            }
            None => match self.temps.get(name) {
                Some(LocalSlot::Arg(i)) => Ok(vec![Instruction::LdArg(*i)]),
                Some(LocalSlot::Local(i)) => Ok(vec![Instruction::LdLoc(*i)]),
                None => Err(EmitError::structural(
                    format!("unresolved variable in a state-machine body: {name:?} is neither hoisted nor a temp"),
                    0,
                    0,
                )),
            },
        }
    }

    fn store(&self, name: &Atom, value: Vec<Instruction>) -> EmitResult<Vec<Instruction>> {
        match self.layout.hoisting().resolve(name) {
            Some(HoistedSlot::Parameter(f) | HoistedSlot::Local(f)) => Ok(self.field_store(f, value)),
            Some(HoistedSlot::Captured(display_field)) => {
                let mut out = vec![Instruction::LdArg(0)];
                out.extend(value);
                out.push(Instruction::StFld(display_field.0));
                Ok(out)
            }
            None => match self.temps.get(name) {
                Some(LocalSlot::Arg(i)) => {
                    let mut out = value;
                    out.push(Instruction::StArg(*i));
                    Ok(out)
                }
                Some(LocalSlot::Local(i)) => {
                    let mut out = value;
                    out.push(Instruction::StLoc(*i));
                    Ok(out)
                }
                None => Err(EmitError::structural(
                    format!("unresolved variable in a state-machine body: {name:?} is neither hoisted nor a temp"),
                    0,
                    0,
                )),
            },
        }
    }

    fn load_this(&self) -> Vec<Instruction> {
        // Five-step chain (spec.md §4.4): hoisted `<>4__this` field first
        // (instance methods lowered to a state machine), else the plain
        // `this` argument — static/arrow contexts never reach here because
        // they have no `this` binding to resolve.
        match self.layout.this_field {
            Some(f) => self.field_load(f),
            None => vec![Instruction::LdArg(0)],
        }
    }

    fn closure_bound_instance(&self) -> Option<Vec<Instruction>> {
        // A captured local already lives directly as a field on `this` (the
        // state machine itself doubles as the display class for anything it
        // captures), so a nested arrow just binds to `this`.
        Some(vec![Instruction::LdArg(0)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharpts_common::Interner;

    #[test]
    fn normal_resolver_loads_arg_and_local_slots() {
        let mut interner = Interner::new();
        let a = interner.intern("a");
        let b = interner.intern("b");
        let mut r = NormalResolver::new();
        r.bind(a, LocalSlot::Arg(1));
        r.bind(b, LocalSlot::Local(0));
        assert_eq!(r.load(&a).unwrap(), vec![Instruction::LdArg(1)]);
        assert_eq!(r.load(&b).unwrap(), vec![Instruction::LdLoc(0)]);
    }

    #[test]
    fn normal_resolver_returns_a_structural_error_on_unknown_name() {
        let mut interner = Interner::new();
        let unknown = interner.intern("unknown");
        let r = NormalResolver::new();
        assert!(r.load(&unknown).is_err());
        assert!(r.store(&unknown, vec![Instruction::LdcI4(1)]).is_err());
    }

    #[test]
    fn normal_resolver_routes_a_display_bound_name_through_its_field() {
        let mut interner = Interner::new();
        let counter = interner.intern("counter");
        let mut fields = FxHashMap::default();
        fields.insert(counter, 3);
        let mut r = NormalResolver::new();
        r.bind_display_class(DisplayClassBinding {
            load_instance: vec![Instruction::LdLoc(0)],
            fields,
            this_field: None,
        });
        assert_eq!(
            r.load(&counter).unwrap(),
            vec![Instruction::LdLoc(0), Instruction::LdFld(3)]
        );
        assert!(r.closure_bound_instance().is_some());
    }
}
