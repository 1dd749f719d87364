//! End-to-end scenario from spec.md §8: an `async function` with a single
//! `await` chain, run through the full pipeline — closure analysis (C2),
//! suspension analysis (C3), state-machine layout (C4/C5), and `MoveNext`
//! body emission (C8) — the way a driver upstream of this repo (not built
//! here; parsing/checking are Non-goals) would invoke `sharpts-cli::driver`.

use sharpts_ast::{Arena, Expr, FunctionKind, FunctionLike, Literal, Node, NodeData, Stmt};
use sharpts_cli::driver::{analyze_function, emit_state_machine_function};
use sharpts_closures::CaptureTable;
use sharpts_common::{Interner, Span};
use sharpts_emit::ir::Instruction;
use sharpts_lowering::{AsyncKind, StateMachineOptions};
use sharpts_runtime::emit_stubs;
use sharpts_suspend::BodyKind;

fn push(arena: &mut Arena, node: Node) -> sharpts_ast::NodeId {
    arena.insert(NodeData {
        span: Span::dummy(),
        node,
    })
}

/// `async function f() { let a = 1; await g(); return a; }`
#[test]
fn async_function_with_one_await_builds_a_runnable_move_next() {
    let mut arena = Arena::new();
    let mut interner = Interner::new();
    let a = interner.intern("a");
    let g = interner.intern("g");

    let one = push(&mut arena, Node::Expr(Expr::Literal(Literal::Number(1.0))));
    let var_a = push(
        &mut arena,
        Node::Stmt(Stmt::Var(sharpts_ast::VarDecl {
            name: a,
            initializer: Some(one),
        })),
    );

    let g_ref = push(&mut arena, Node::Expr(Expr::Variable(g)));
    let call_g = push(
        &mut arena,
        Node::Expr(Expr::Call {
            callee: g_ref,
            args: Default::default(),
            optional: false,
        }),
    );
    let await_g = push(&mut arena, Node::Expr(Expr::Await(call_g)));
    let await_stmt = push(&mut arena, Node::Stmt(Stmt::Expression(await_g)));

    let a_ref = push(&mut arena, Node::Expr(Expr::Variable(a)));
    let return_a = push(&mut arena, Node::Stmt(Stmt::Return(Some(a_ref))));

    let body = push(
        &mut arena,
        Node::Stmt(Stmt::Block(smallvec::smallvec![var_a, await_stmt, return_a])),
    );
    let function = FunctionLike {
        name: Some(interner.intern("f")),
        kind: FunctionKind::Function,
        params: vec![],
        body,
        is_async: true,
        is_generator: false,
        is_arrow: false,
    };
    let fn_id = push(&mut arena, Node::Stmt(Stmt::Function(function.clone())));

    let captures = CaptureTable::default();
    let analysis = analyze_function(&arena, &captures, BodyKind::Async, &function);
    assert_eq!(analysis.suspend.len(), 1);

    let runtime = emit_stubs();
    let (layout, instructions) = emit_state_machine_function(
        &arena,
        &runtime,
        fn_id,
        &function,
        &captures,
        &analysis,
        AsyncKind::Async,
        StateMachineOptions::default(),
        &|atom| interner.resolve(atom).to_string(),
    )
    .expect("async function with one await should emit cleanly");

    assert!(layout.field_count() > 0);
    assert!(matches!(instructions.last(), Some(Instruction::Ret)));
    assert!(instructions
        .iter()
        .any(|i| matches!(i, Instruction::CallRuntime(_))));
}
