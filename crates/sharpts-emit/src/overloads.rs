//! Overload generator (C9), spec.md §4.7 / SPEC_FULL.md §9.
//!
//! A TS function with default parameters compiles to one canonical method
//! plus a forwarder per arity that omits a defaulted trailing parameter.
//! Arities below the first parameter that has a default are never emitted —
//! callers at those arities are a static error the checker already rejected.

use crate::emit::EmissionContext;
use crate::errors::{EmitError, EmitResult};
use crate::ir::Instruction;
use crate::stack_type::ensure_boxed;
use crate::types::RuntimeType;
use sharpts_ast::NodeId;

#[derive(Debug, Clone)]
pub struct ParamInfo {
    pub runtime_type: RuntimeType,
    pub has_default: bool,
    /// The default-value expression's AST node, evaluated fresh at each
    /// forwarder call site (spec.md §4.7) — `cfg()`'s `"localhost:8080"`
    /// default has to actually run, not stand in as a zero/null sentinel.
    pub default_expr: Option<NodeId>,
}

/// One forwarder: calls the canonical method with `arity` real arguments
/// plus a zero/default value for each trailing defaulted parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Forwarder {
    pub arity: usize,
    pub body: Vec<Instruction>,
}

/// Generates one [`Forwarder`] per arity from the first defaulted parameter
/// up to (but not including) the full parameter count — the canonical
/// method itself already handles the full arity.
pub fn generate_overloads(
    ctx: &mut EmissionContext,
    params: &[ParamInfo],
    canonical_method: u32,
) -> EmitResult<Vec<Forwarder>> {
    let Some(first_default) = params.iter().position(|p| p.has_default) else {
        return Ok(Vec::new());
    };

    (first_default..params.len())
        .map(|arity| {
            let mut body = Vec::new();
            for i in 0..arity {
                body.push(Instruction::LdArg(i as u32));
            }
            for param in &params[arity..] {
                push_default_value(ctx, &mut body, param)?;
            }
            body.push(Instruction::Call(canonical_method));
            body.push(Instruction::Ret);
            Ok(Forwarder { arity, body })
        })
        .collect()
}

/// Evaluates the parameter's real default-value expression and boxes it to
/// the canonical method's expected (always-boxed, since it came in through
/// a forwarder call) argument shape.
fn push_default_value(ctx: &mut EmissionContext, out: &mut Vec<Instruction>, param: &ParamInfo) -> EmitResult<()> {
    let default_expr = param.default_expr.ok_or_else(|| {
        EmitError::structural("defaulted parameter has no default-value expression to emit", 0, 0)
    })?;
    let (mut value, ty) = ctx.emit_expr(default_expr)?;
    ensure_boxed(ty, &mut value);
    out.extend(value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::NormalResolver;
    use sharpts_ast::{Arena, Expr, Literal, Node, NodeData};
    use sharpts_closures::CaptureTable;
    use sharpts_common::Span;

    fn push(arena: &mut Arena, node: Node) -> NodeId {
        arena.insert(NodeData {
            span: Span::dummy(),
            node,
        })
    }

    #[test]
    fn no_defaults_generates_no_forwarders() {
        let arena = Arena::new();
        let runtime = sharpts_runtime::emit_stubs();
        let resolver = NormalResolver::new();
        let captures = CaptureTable::default();
        let mut ctx = EmissionContext::new(&arena, &runtime, &resolver, &captures);
        let params = vec![ParamInfo {
            runtime_type: RuntimeType::Double,
            has_default: false,
            default_expr: None,
        }];
        assert!(generate_overloads(&mut ctx, &params, 1).unwrap().is_empty());
    }

    #[test]
    fn one_trailing_default_generates_exactly_one_forwarder() {
        let mut arena = Arena::new();
        let default_value = push(&mut arena, Node::Expr(Expr::Literal(Literal::String(
            sharpts_common::Interner::new().intern("localhost:8080"),
        ))));
        let runtime = sharpts_runtime::emit_stubs();
        let resolver = NormalResolver::new();
        let captures = CaptureTable::default();
        let mut ctx = EmissionContext::new(&arena, &runtime, &resolver, &captures);

        let params = vec![
            ParamInfo {
                runtime_type: RuntimeType::Double,
                has_default: false,
                default_expr: None,
            },
            ParamInfo {
                runtime_type: RuntimeType::StringTy,
                has_default: true,
                default_expr: Some(default_value),
            },
        ];
        let forwarders = generate_overloads(&mut ctx, &params, 5).unwrap();
        assert_eq!(forwarders.len(), 1);
        assert_eq!(forwarders[0].arity, 1);
        assert!(forwarders[0].body.contains(&Instruction::Call(5)));
        assert!(forwarders[0].body.contains(&Instruction::LdArg(0)));
    }

    #[test]
    fn arities_below_first_default_are_not_emitted() {
        let mut arena = Arena::new();
        let default_a = push(&mut arena, Node::Expr(Expr::Literal(Literal::Number(1.0))));
        let default_b = push(&mut arena, Node::Expr(Expr::Literal(Literal::Number(2.0))));
        let runtime = sharpts_runtime::emit_stubs();
        let resolver = NormalResolver::new();
        let captures = CaptureTable::default();
        let mut ctx = EmissionContext::new(&arena, &runtime, &resolver, &captures);

        let params = vec![
            ParamInfo {
                runtime_type: RuntimeType::Double,
                has_default: true,
                default_expr: Some(default_a),
            },
            ParamInfo {
                runtime_type: RuntimeType::Double,
                has_default: true,
                default_expr: Some(default_b),
            },
        ];
        let forwarders = generate_overloads(&mut ctx, &params, 9).unwrap();
        let arities: Vec<usize> = forwarders.iter().map(|f| f.arity).collect();
        assert_eq!(arities, vec![0, 1]);
    }

    #[test]
    fn a_defaulted_parameter_with_no_expression_is_a_structural_error() {
        let arena = Arena::new();
        let runtime = sharpts_runtime::emit_stubs();
        let resolver = NormalResolver::new();
        let captures = CaptureTable::default();
        let mut ctx = EmissionContext::new(&arena, &runtime, &resolver, &captures);
        let params = vec![ParamInfo {
            runtime_type: RuntimeType::Double,
            has_default: true,
            default_expr: None,
        }];
        assert!(generate_overloads(&mut ctx, &params, 1).is_err());
    }
}
