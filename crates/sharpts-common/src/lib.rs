//! Common types and utilities shared across the SharpTS compiler core crates.
//!
//! This crate provides foundational types used by every pass in the
//! pipeline:
//! - String interning (`Atom`, `Interner`, `ShardedInterner`)
//! - Source spans (`Span`, `Spanned`, `SpanBuilder`, `ByteSpan`)
//! - Diagnostics (`Diagnostic`, `DiagnosticKind`, `DiagnosticCategory`)
//! - Compiler limits and thresholds

// String interning for identifier deduplication
pub mod interner;
pub use interner::{Atom, Interner, ShardedInterner};

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::{ByteSpan, Span, SpanBuilder, Spanned};

// Diagnostics for the three error kinds in spec.md §7
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticKind, RelatedInformation};

// Centralized limits and thresholds
pub mod limits;
