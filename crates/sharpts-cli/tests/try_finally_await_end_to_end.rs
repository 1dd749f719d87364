//! End-to-end scenario from spec.md §8, scenario 4: an `await` nested
//! inside a `catch` block, run through the full pipeline. Review comment 3
//! flagged exactly this shape as unreachable when `TryCatch` fell through to
//! the non-suspension-aware base emitter.
//!
//! `async function g() { try { throw 42; } catch (e) { await Promise.resolve(0); return e; } }`

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

#[test]
fn await_inside_a_catch_block_still_resumes_through_the_state_machine() {
    let mut arena = Arena::new();
    let mut interner = Interner::new();
    let e = interner.intern("e");
    let promise = interner.intern("Promise");

    let forty_two = push(&mut arena, Node::Expr(Expr::Literal(Literal::Number(42.0))));
    let throw_stmt = push(&mut arena, Node::Stmt(Stmt::Throw(forty_two)));
    let try_block = push(&mut arena, Node::Stmt(Stmt::Block(smallvec::smallvec![throw_stmt])));

    // `await Promise.resolve(0);`
    let promise_ref = push(&mut arena, Node::Expr(Expr::Variable(promise)));
    let resolve_callee = push(
        &mut arena,
        Node::Expr(Expr::Get {
            object: promise_ref,
            name: interner.intern("resolve"),
            optional: false,
        }),
    );
    let zero_arg = push(&mut arena, Node::Expr(Expr::Literal(Literal::Number(0.0))));
    let resolve_call = push(
        &mut arena,
        Node::Expr(Expr::Call {
            callee: resolve_callee,
            args: smallvec::smallvec![zero_arg],
            optional: false,
        }),
    );
    let await_resolve = push(&mut arena, Node::Expr(Expr::Await(resolve_call)));
    let await_stmt = push(&mut arena, Node::Stmt(Stmt::Expression(await_resolve)));

    let e_ref = push(&mut arena, Node::Expr(Expr::Variable(e)));
    let return_e = push(&mut arena, Node::Stmt(Stmt::Return(Some(e_ref))));
    let catch_block = push(
        &mut arena,
        Node::Stmt(Stmt::Block(smallvec::smallvec![await_stmt, return_e])),
    );

    let try_catch = push(
        &mut arena,
        Node::Stmt(Stmt::TryCatch {
            try_block,
            catch_param: Some(e),
            catch_block: Some(catch_block),
            finally_block: None,
        }),
    );
    let body = push(&mut arena, Node::Stmt(Stmt::Block(smallvec::smallvec![try_catch])));

    let function = FunctionLike {
        name: Some(interner.intern("g")),
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
    .expect("an await nested inside a catch block should emit cleanly");

    assert!(layout.field_count() > 0);
    // The protected region still lowers to `leave`, and the await sitting
    // inside the catch handler still produced its runtime calls, rather than
    // `TryCatch` falling through to the non-suspension-aware base emitter.
    assert!(instructions.iter().any(|i| matches!(i, Instruction::Leave(_))));
    assert!(instructions
        .iter()
        .any(|i| matches!(i, Instruction::CallRuntime(_))));
    assert!(matches!(instructions.last(), Some(Instruction::Ret)));
}
