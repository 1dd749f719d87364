//! Ambient error types for the emitter crates (SPEC_FULL.md §13).
//!
//! Internal fallible APIs return these, not `anyhow` — `anyhow` is a
//! CLI-boundary concern only (`sharpts-cli`), matching how the teacher
//! scopes it: the checker/emitter crates don't depend on it, only the
//! driver binary does.

use sharpts_common::{Diagnostic, DiagnosticKind};
use std::fmt;

/// Raised by the expression/statement emitter (C7) and the state-machine
/// body emitter (C8). `Structural` is fatal only for the current method;
/// `IlValidation` is raised only when the validating builder is active
/// (spec.md §4.5/§7).
#[derive(Debug, Clone)]
pub enum EmitError {
    Structural(Diagnostic),
    IlValidation(Diagnostic),
}

impl EmitError {
    pub fn structural(message: impl Into<String>, span_start: u32, span_end: u32) -> Self {
        Self::Structural(Diagnostic::structural(message, span_start, span_end))
    }

    pub fn il_validation(message: impl Into<String>, span_start: u32, span_end: u32) -> Self {
        let mut d = Diagnostic::structural(message, span_start, span_end);
        d.kind = DiagnosticKind::IlValidation;
        Self::IlValidation(d)
    }

    pub fn diagnostic(&self) -> &Diagnostic {
        match self {
            Self::Structural(d) | Self::IlValidation(d) => d,
        }
    }
}

impl fmt::Display for EmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.diagnostic().message)
    }
}

impl std::error::Error for EmitError {}

pub type EmitResult<T> = Result<T, EmitError>;
