//! Runtime stub emitter (C11), spec.md §4.9.
//!
//! Emits no runtime semantics of its own — lexing, parsing, the
//! type-checker, and the runtime built-in libraries are out of scope
//! (spec.md Non-goals). What this crate does provide is the
//! content-addressed name surface the bytecode emitter (`sharpts-emit`)
//! calls through: every helper it needs (numeric coercion, property and
//! index access, the iterator protocol, bigint/date/crypto/URL helpers,
//! Promise combinators) gets one stable [`RuntimeMethodRef`] handle, looked
//! up by well-known name instead of a hard-coded metadata token. The
//! assembly reference rewriter (C10, `sharpts-asmrw`) is what turns those
//! handles into real tokens against a concrete runtime assembly.

mod descriptor;
pub mod names;
mod stub_emitter;

pub use descriptor::{RuntimeDescriptor, RuntimeMethodRef, Shape};
pub use stub_emitter::emit_stubs;
