//! Rewrite errors, spec.md §7: fatal to the entire module rewrite, unlike
//! `EmitError::Structural` which is only fatal to a single method.

use sharpts_common::Diagnostic;
use std::fmt;

#[derive(Debug, Clone)]
pub struct RewriteError(Diagnostic);

impl RewriteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(Diagnostic::rewrite(message))
    }

    pub fn unknown_opcode(byte: u8, method_token: u32) -> Self {
        Self::new(format!(
            "unknown opcode 0x{byte:02X} in method body for token 0x{method_token:08X}"
        ))
    }

    pub fn truncated_body(method_token: u32) -> Self {
        Self::new(format!(
            "method body for token 0x{method_token:08X} ends before its declared code size"
        ))
    }

    pub fn unresolved_handle(handle: u32) -> Self {
        Self::new(format!("no new metadata row mapped for old handle {handle}"))
    }

    pub fn misaligned_header(method_token: u32) -> Self {
        Self::new(format!(
            "method body header for token 0x{method_token:08X} is not 4-byte aligned"
        ))
    }

    pub fn diagnostic(&self) -> &Diagnostic {
        &self.0
    }
}

impl fmt::Display for RewriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.message)
    }
}

impl std::error::Error for RewriteError {}

pub type RewriteResult<T> = Result<T, RewriteError>;
