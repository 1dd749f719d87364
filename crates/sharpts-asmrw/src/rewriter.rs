//! The method body token-patching pass, spec.md §4.8 step 4: walk a
//! serialized method body's instructions, remap every token operand
//! through the [`HandleMap`], and re-emit with the header format the
//! resulting shape calls for.

use crate::body_header::{encode_fat, encode_tiny, select_header, BodyHeader, BodyShape};
use crate::errors::{RewriteError, RewriteResult};
use crate::exception_region::{encode_section, ExceptionClause};
use crate::handle_map::HandleMap;
use crate::opcode::{Opcode, OperandShape};
use crate::token::MetadataToken;

/// A method body ready to re-serialize: the patched instruction stream plus
/// whatever exception regions survive the rewrite unchanged (clause kinds
/// and offsets don't move, only the catch-type tokens inside them do).
pub struct PatchedBody {
    pub code: Vec<u8>,
    pub max_stack: u16,
    pub local_sig_token: Option<u32>,
    pub exception_clauses: Vec<ExceptionClause>,
}

/// Walks `code` opcode by opcode, remapping every token operand through
/// `handles`. Non-token operands (branch targets, immediates, switch
/// tables) pass through untouched — the rewriter only retargets metadata
/// references, it never relays out a method body.
pub fn patch_tokens(code: &[u8], method_token: u32, handles: &HandleMap) -> RewriteResult<Vec<u8>> {
    let mut out = Vec::with_capacity(code.len());
    let mut i = 0usize;

    while i < code.len() {
        let byte = code[i];
        let op = Opcode::from_byte(byte).ok_or_else(|| {
            tracing::error!(byte, method_token, "unknown opcode during rewrite");
            RewriteError::unknown_opcode(byte, method_token)
        })?;
        out.push(byte);
        i += 1;

        match op.operand_shape() {
            OperandShape::None => {}
            OperandShape::I4 | OperandShape::BranchTarget => {
                let bytes = take4(code, &mut i, method_token)?;
                out.extend_from_slice(&bytes);
            }
            OperandShape::I8 => {
                let bytes = take_n::<8>(code, &mut i, method_token)?;
                out.extend_from_slice(&bytes);
            }
            OperandShape::Token => {
                let raw = u32::from_le_bytes(take4(code, &mut i, method_token)?);
                let patched = remap_raw_token(raw, method_token, handles)?;
                out.extend_from_slice(&patched.to_le_bytes());
            }
            OperandShape::SwitchTable => {
                let count_bytes = take4(code, &mut i, method_token)?;
                let count = u32::from_le_bytes(count_bytes);
                out.extend_from_slice(&count_bytes);
                for _ in 0..count {
                    let target = take4(code, &mut i, method_token)?;
                    out.extend_from_slice(&target);
                }
            }
        }
    }

    Ok(out)
}

fn take4(code: &[u8], i: &mut usize, method_token: u32) -> RewriteResult<[u8; 4]> {
    Ok(take_n::<4>(code, i, method_token)?)
}

fn take_n<const N: usize>(code: &[u8], i: &mut usize, method_token: u32) -> RewriteResult<[u8; N]> {
    if *i + N > code.len() {
        return Err(RewriteError::truncated_body(method_token));
    }
    let mut buf = [0u8; N];
    buf.copy_from_slice(&code[*i..*i + N]);
    *i += N;
    Ok(buf)
}

fn remap_raw_token(raw: u32, method_token: u32, handles: &HandleMap) -> RewriteResult<u32> {
    // `CallRuntime` operands aren't metadata tokens yet at this layer — they're
    // `RuntimeMethodRef` indices the runtime-assembly pass resolves separately
    // (see `crate::rewriter::resolve_runtime_call`), so only real tokens land here.
    let decoded = MetadataToken::decode(raw).ok_or_else(|| RewriteError::unresolved_handle(raw))?;
    let remapped = handles.remap(decoded).ok_or_else(|| {
        tracing::error!(raw, method_token, "unresolved metadata handle during rewrite");
        RewriteError::unresolved_handle(raw)
    })?;
    Ok(remapped.encode())
}

/// Resolves a `CallRuntime` operand (a bare `RuntimeMethodRef` index) to a
/// real `MethodDef`/`MemberRef` token against the retargeted runtime
/// assembly, via a map the driver builds once while laying out the runtime
/// reference table.
pub fn resolve_runtime_call(stub_index: u32, runtime_tokens: &HandleMap) -> RewriteResult<u32> {
    runtime_tokens
        .remap(MetadataToken {
            table: crate::token::TableId::MemberRef,
            row: stub_index,
        })
        .map(MetadataToken::encode)
        .ok_or_else(|| RewriteError::unresolved_handle(stub_index))
}

/// Serializes a patched body's header plus code plus exception sections,
/// choosing tiny vs fat and small vs fat per spec.md §4.8/§6.
pub fn serialize_body(body: &PatchedBody) -> Vec<u8> {
    let shape = BodyShape {
        code_size: body.code.len() as u32,
        max_stack: body.max_stack,
        has_exception_regions: !body.exception_clauses.is_empty(),
        local_sig_token: body.local_sig_token,
    };

    let mut out = Vec::new();
    match select_header(&shape) {
        BodyHeader::Tiny { code_size } => {
            out.extend_from_slice(&encode_tiny(code_size));
        }
        BodyHeader::Fat {
            init_locals,
            more_sects,
            max_stack,
            code_size,
            local_sig_token,
        } => {
            out.extend_from_slice(&encode_fat(init_locals, more_sects, max_stack, code_size, local_sig_token));
        }
    }

    out.extend_from_slice(&body.code);

    if !body.exception_clauses.is_empty() {
        while out.len() % 4 != 0 {
            out.push(0);
        }
        out.extend_from_slice(&encode_section(&body.exception_clauses));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TableId;

    fn handles_with(table: TableId, old: u32, new: u32) -> HandleMap {
        let mut map = HandleMap::new();
        map.insert(table, old, new);
        map
    }

    #[test]
    fn patches_a_call_tokens_operand() {
        let old_token = MetadataToken {
            table: TableId::MethodDef,
            row: 5,
        }
        .encode();
        let mut code = vec![Opcode::Call.byte()];
        code.extend_from_slice(&old_token.to_le_bytes());

        let handles = handles_with(TableId::MethodDef, 5, 42);
        let patched = patch_tokens(&code, 0x0600_0001, &handles).unwrap();

        let new_token = u32::from_le_bytes([patched[1], patched[2], patched[3], patched[4]]);
        assert_eq!(MetadataToken::decode(new_token).unwrap().row, 42);
    }

    #[test]
    fn non_token_operands_pass_through_unchanged() {
        let mut code = vec![Opcode::LdcI4.byte()];
        code.extend_from_slice(&42i32.to_le_bytes());
        let handles = HandleMap::new();
        let patched = patch_tokens(&code, 0, &handles).unwrap();
        assert_eq!(patched, code);
    }

    #[test]
    fn switch_table_targets_are_preserved_verbatim() {
        let mut code = vec![Opcode::Switch.byte()];
        code.extend_from_slice(&2u32.to_le_bytes());
        code.extend_from_slice(&10u32.to_le_bytes());
        code.extend_from_slice(&20u32.to_le_bytes());
        let handles = HandleMap::new();
        let patched = patch_tokens(&code, 0, &handles).unwrap();
        assert_eq!(patched, code);
    }

    #[test]
    fn unknown_opcode_byte_is_fatal() {
        let code = vec![0xFF];
        let handles = HandleMap::new();
        assert!(patch_tokens(&code, 0, &handles).is_err());
    }

    #[test]
    fn truncated_token_operand_is_fatal() {
        let code = vec![Opcode::Call.byte(), 0x01, 0x02];
        let handles = HandleMap::new();
        assert!(patch_tokens(&code, 0, &handles).is_err());
    }

    #[test]
    fn unmapped_token_is_fatal() {
        let old_token = MetadataToken {
            table: TableId::MethodDef,
            row: 5,
        }
        .encode();
        let mut code = vec![Opcode::Call.byte()];
        code.extend_from_slice(&old_token.to_le_bytes());
        let handles = HandleMap::new();
        assert!(patch_tokens(&code, 0, &handles).is_err());
    }

    #[test]
    fn small_body_serializes_with_tiny_header() {
        let body = PatchedBody {
            code: vec![Opcode::Ret.byte()],
            max_stack: 1,
            local_sig_token: None,
            exception_clauses: vec![],
        };
        let bytes = serialize_body(&body);
        assert_eq!(bytes[0], (1u8 << 2) | 0x02);
        assert_eq!(&bytes[1..], &[Opcode::Ret.byte()]);
    }

    #[test]
    fn body_with_exception_clauses_gets_a_trailing_section() {
        let body = PatchedBody {
            code: vec![Opcode::Nop.byte(); 3],
            max_stack: 1,
            local_sig_token: None,
            exception_clauses: vec![ExceptionClause {
                kind: crate::exception_region::CLAUSE_KIND_FINALLY,
                try_offset: 0,
                try_length: 1,
                handler_offset: 1,
                handler_length: 1,
                catch_type_or_filter: 0,
            }],
        };
        let bytes = serialize_body(&body);
        assert!(bytes.len() > body.code.len());
    }
}
