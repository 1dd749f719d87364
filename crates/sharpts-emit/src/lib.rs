//! Expression/statement emitter (C7), state-machine body emitter (C8), and
//! overload generator (C9), spec.md §4.5-§4.7 / SPEC_FULL.md §7-§9.
//!
//! `emit` holds the plain-method dispatch every other emitter in this crate
//! builds on; `state_machine_emit` wraps it for `MoveNext`/`Resume` bodies,
//! overriding only `Await`/`Yield`; `overloads` generates per-arity
//! forwarders for default parameters; `types` is the C1 type-mapping table
//! both of the above consult for stack-shape decisions.

pub mod emit;
pub mod errors;
pub mod ir;
pub mod overloads;
pub mod resolver;
pub mod stack_type;
pub mod state_machine_emit;
pub mod types;

pub use emit::{EmissionContext, MemberTarget};
pub use errors::{EmitError, EmitResult};
pub use ir::{Instruction, Label};
pub use overloads::{generate_overloads, Forwarder, ParamInfo};
pub use resolver::{LocalSlot, NormalResolver, Resolver, StateMachineResolver};
pub use stack_type::StackType;
pub use state_machine_emit::StateMachineEmitter;
pub use types::{is_value_type, map_type, zero_value, RuntimeType, SourceType, ZeroValue};
