//! Bytecode-level assembly reference rewriter (C10), spec.md §4.8/§6.
//!
//! Takes the in-memory module C7-C9 emitted and retargets it against a
//! concrete runtime assembly: assembly reference headers are rewritten to
//! carry public key tokens instead of full keys, referenced runtime
//! assemblies are narrowed to the minimum set actually used, and every
//! metadata token inside every method body is remapped through a
//! once-built old-handle -> new-handle table. Errors here are fatal to the
//! whole module (spec.md §7), unlike `sharpts-emit::EmitError::Structural`
//! which only drops the current method.

pub mod assembly_ref;
pub mod body_header;
pub mod errors;
pub mod exception_region;
pub mod handle_map;
pub mod opcode;
pub mod rewriter;
pub mod token;

pub use assembly_ref::{
    minimal_runtime_assemblies, AssemblyRefHeader, KeyTokenTable, RetargetedAssemblyRef,
    RuntimeAssemblySet, KNOWN_RUNTIME_ASSEMBLIES,
};
pub use body_header::{BodyHeader, BodyShape};
pub use errors::{RewriteError, RewriteResult};
pub use exception_region::ExceptionClause;
pub use handle_map::HandleMap;
pub use opcode::{Opcode, OperandShape};
pub use rewriter::{patch_tokens, resolve_runtime_call, serialize_body, PatchedBody};
pub use token::{MetadataToken, TableId};
