//! Diagnostic types for the compiler core.
//!
//! Unlike a front-end type checker, this crate's diagnostics fall into the
//! three kinds enumerated in spec.md §7: static structural errors, IL
//! validation errors, and rewrite errors. There is no user-facing message
//! catalog to translate — each diagnostic carries a formatted message and a
//! stable `code` for tooling, not for localization.

use serde::Serialize;

/// Severity of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Error,
    Warning,
    Message,
}

/// The pipeline phase that raised a diagnostic, mirroring spec.md §7's table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticKind {
    /// Unhandled AST node, missing callee symbol, inconsistent arity, invalid
    /// decorator target. Fatal for the current method; other methods continue.
    Structural,
    /// Stack depth mismatch, unmarked label, invalid box/unbox, branch out of
    /// an exception region. Raised only when the validating builder is active.
    IlValidation,
    /// Unknown opcode, unresolved metadata row, misaligned header. Fatal for
    /// the entire module rewrite.
    Rewrite,
}

#[derive(Clone, Debug, Serialize)]
pub struct RelatedInformation {
    pub message: String,
    pub span_start: u32,
    pub span_end: u32,
}

/// A single diagnostic produced anywhere in the pipeline.
#[derive(Clone, Debug, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub category: DiagnosticCategory,
    pub message: String,
    pub span_start: u32,
    pub span_end: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<RelatedInformation>,
}

impl Diagnostic {
    pub fn structural(message: impl Into<String>, span_start: u32, span_end: u32) -> Self {
        Self {
            kind: DiagnosticKind::Structural,
            category: DiagnosticCategory::Error,
            message: message.into(),
            span_start,
            span_end,
            related: Vec::new(),
        }
    }

    pub fn il_validation(message: impl Into<String>, span_start: u32, span_end: u32) -> Self {
        Self {
            kind: DiagnosticKind::IlValidation,
            category: DiagnosticCategory::Error,
            message: message.into(),
            span_start,
            span_end,
            related: Vec::new(),
        }
    }

    pub fn rewrite(message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::Rewrite,
            category: DiagnosticCategory::Error,
            message: message.into(),
            span_start: 0,
            span_end: 0,
            related: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_related(mut self, message: impl Into<String>, start: u32, end: u32) -> Self {
        self.related.push(RelatedInformation {
            message: message.into(),
            span_start: start,
            span_end: end,
        });
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{:?}] {} ({}..{})",
            self.kind, self.message, self.span_start, self.span_end
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_diagnostic_is_an_error() {
        let diag = Diagnostic::structural("unhandled expression kind", 10, 20);
        assert_eq!(diag.category, DiagnosticCategory::Error);
        assert_eq!(diag.kind, DiagnosticKind::Structural);
    }

    #[test]
    fn related_information_accumulates() {
        let diag = Diagnostic::il_validation("stack depth mismatch at label L3", 0, 1)
            .with_related("label defined here", 5, 6)
            .with_related("branch here", 8, 9);
        assert_eq!(diag.related.len(), 2);
    }
}
