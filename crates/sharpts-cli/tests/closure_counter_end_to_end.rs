//! End-to-end scenario from spec.md §8, scenario 1: a closure over a local
//! that outlives its declaring function's own call, run through closure
//! analysis (C2) and the plain-function body emitter (C7) the way
//! `sharpts-cli::driver` wires them for a non-suspending function.
//!
//! `function make() { let n = 0; return () => { n = n + 1; return n; }; }`

use sharpts_ast::{Arena, Expr, FunctionKind, FunctionLike, Literal, Node, NodeData, Stmt};
use sharpts_cli::driver::emit_plain_function;
use sharpts_closures::analyze;
use sharpts_common::{Interner, Span};
use sharpts_emit::ir::Instruction;
use sharpts_runtime::emit_stubs;

fn push(arena: &mut Arena, node: Node) -> sharpts_ast::NodeId {
    arena.insert(NodeData {
        span: Span::dummy(),
        node,
    })
}

#[test]
fn closure_over_a_local_counter_binds_a_display_class_instance() {
    let mut arena = Arena::new();
    let mut interner = Interner::new();
    let n = interner.intern("n");

    let zero = push(&mut arena, Node::Expr(Expr::Literal(Literal::Number(0.0))));
    let var_n = push(
        &mut arena,
        Node::Stmt(Stmt::Var(sharpts_ast::VarDecl {
            name: n,
            initializer: Some(zero),
        })),
    );

    // `n = n + 1;`
    let n_ref_rhs = push(&mut arena, Node::Expr(Expr::Variable(n)));
    let one = push(&mut arena, Node::Expr(Expr::Literal(Literal::Number(1.0))));
    let n_plus_one = push(
        &mut arena,
        Node::Expr(Expr::Binary {
            op: sharpts_ast::BinaryOp::Add,
            left: n_ref_rhs,
            right: one,
        }),
    );
    let n_ref_target = push(&mut arena, Node::Expr(Expr::Variable(n)));
    let assign_n = push(
        &mut arena,
        Node::Expr(Expr::Assign {
            target: n_ref_target,
            value: n_plus_one,
        }),
    );
    let assign_stmt = push(&mut arena, Node::Stmt(Stmt::Expression(assign_n)));

    // `return n;`
    let n_ref_return = push(&mut arena, Node::Expr(Expr::Variable(n)));
    let return_n = push(&mut arena, Node::Stmt(Stmt::Return(Some(n_ref_return))));

    let arrow_body = push(
        &mut arena,
        Node::Stmt(Stmt::Block(smallvec::smallvec![assign_stmt, return_n])),
    );
    let arrow = push(
        &mut arena,
        Node::Expr(Expr::ArrowFunction(FunctionLike {
            name: None,
            kind: FunctionKind::Function,
            params: vec![],
            body: arrow_body,
            is_async: false,
            is_generator: false,
            is_arrow: true,
        })),
    );
    let return_arrow = push(&mut arena, Node::Stmt(Stmt::Return(Some(arrow))));

    let make_body = push(
        &mut arena,
        Node::Stmt(Stmt::Block(smallvec::smallvec![var_n, return_arrow])),
    );
    let make = FunctionLike {
        name: Some(interner.intern("make")),
        kind: FunctionKind::Function,
        params: vec![],
        body: make_body,
        is_async: false,
        is_generator: false,
        is_arrow: false,
    };
    let make_id = push(&mut arena, Node::Stmt(Stmt::Function(make.clone())));

    let captures = analyze(&arena, make_id);
    assert!(captures.captured_locals(make_id).any(|name| *name == n));

    let runtime = emit_stubs();
    let instructions = emit_plain_function(&arena, &runtime, &captures, make_id, &make)
        .expect("a function returning a closure over its own local should emit cleanly");

    // The display-class prologue constructs an instance and parks it before
    // `n`'s declaration ever runs.
    assert!(matches!(instructions.first(), Some(Instruction::NewObj(_))));
    assert!(instructions.contains(&Instruction::StFld(0)));
    // The arrow value is built through the closure-construction stub, bound
    // to that same instance rather than a null instance.
    let make_closure = runtime.require(sharpts_runtime::names::MAKE_CLOSURE).index();
    assert!(instructions.contains(&Instruction::CallRuntime(make_closure)));
}
