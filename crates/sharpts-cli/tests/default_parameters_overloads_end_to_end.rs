//! End-to-end scenario from spec.md §8, scenario 5: two trailing default
//! parameters compile to one canonical method plus a forwarder per missing
//! arity, each evaluating its own real default-value expression (not a
//! zero/null sentinel) — `cfg()` must actually produce `"localhost:8080"`.
//!
//! `function cfg(h="localhost", p=8080) { return h + ":" + p; }`

use sharpts_ast::{Arena, Expr, FunctionKind, FunctionLike, Literal, Node, NodeData, Param, Stmt};
use sharpts_cli::driver::emit_overloads_for_function;
use sharpts_closures::CaptureTable;
use sharpts_common::{Interner, Span};
use sharpts_emit::{EmissionContext, Instruction, NormalResolver, RuntimeType};
use sharpts_runtime::emit_stubs;

fn push(arena: &mut Arena, node: Node) -> sharpts_ast::NodeId {
    arena.insert(NodeData {
        span: Span::dummy(),
        node,
    })
}

#[test]
fn default_parameters_generate_one_forwarder_per_missing_arity() {
    let mut arena = Arena::new();
    let mut interner = Interner::new();
    let h = interner.intern("h");
    let p = interner.intern("p");

    let localhost = push(
        &mut arena,
        Node::Expr(Expr::Literal(Literal::String(interner.intern("localhost")))),
    );
    let eighty_eighty = push(&mut arena, Node::Expr(Expr::Literal(Literal::Number(8080.0))));

    // `return h + ":" + p;`
    let h_ref = push(&mut arena, Node::Expr(Expr::Variable(h)));
    let colon = push(
        &mut arena,
        Node::Expr(Expr::Literal(Literal::String(interner.intern(":")))),
    );
    let h_colon = push(
        &mut arena,
        Node::Expr(Expr::Binary {
            op: sharpts_ast::BinaryOp::Add,
            left: h_ref,
            right: colon,
        }),
    );
    let p_ref = push(&mut arena, Node::Expr(Expr::Variable(p)));
    let full = push(
        &mut arena,
        Node::Expr(Expr::Binary {
            op: sharpts_ast::BinaryOp::Add,
            left: h_colon,
            right: p_ref,
        }),
    );
    let return_full = push(&mut arena, Node::Stmt(Stmt::Return(Some(full))));
    let body = push(&mut arena, Node::Stmt(Stmt::Block(smallvec::smallvec![return_full])));

    let function = FunctionLike {
        name: Some(interner.intern("cfg")),
        kind: FunctionKind::Function,
        params: vec![
            Param {
                name: h,
                default: Some(localhost),
                is_rest: false,
            },
            Param {
                name: p,
                default: Some(eighty_eighty),
                is_rest: false,
            },
        ],
        body,
        is_async: false,
        is_generator: false,
        is_arrow: false,
    };

    let runtime = emit_stubs();
    let resolver = NormalResolver::new();
    let captures = CaptureTable::default();
    let mut ctx = EmissionContext::new(&arena, &runtime, &resolver, &captures);

    let canonical_method = 1;
    let forwarders = emit_overloads_for_function(
        &mut ctx,
        &function,
        &[RuntimeType::StringTy, RuntimeType::Double],
        canonical_method,
    )
    .expect("two trailing default parameters should generate forwarders cleanly");

    let arities: Vec<usize> = forwarders.iter().map(|f| f.arity).collect();
    assert_eq!(arities, vec![0, 1]);

    // `cfg()`'s forwarder evaluates both real default expressions, not a
    // zero/null sentinel — `LdStr`/`LdcR8` for the `"localhost"`/`8080`
    // literals must both appear ahead of the canonical-method call.
    let zero_arity = &forwarders[0].body;
    assert!(zero_arity
        .iter()
        .any(|i| matches!(i, Instruction::LdStr(_))));
    assert!(zero_arity.contains(&Instruction::Call(canonical_method)));
    assert!(!zero_arity.contains(&Instruction::LdNull));
}
