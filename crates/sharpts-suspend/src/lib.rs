//! Suspension point analysis for async/generator/async-generator bodies
//! (C3, spec.md §4.2).
//!
//! Walks one function body, assigning each `await`/`yield` a dense state
//! index in source order and computing which locals must be hoisted into
//! state-machine fields because they're alive across a suspension.

mod analyzer;
mod types;

pub use analyzer::{analyze, BodyKind};
pub use types::{AsyncArrowInfo, StateIndex, SuspensionKind, SuspensionPoint, SuspensionTable};
