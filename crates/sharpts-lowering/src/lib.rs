//! State-machine layout synthesis (C4) and the hoisting manager (C5),
//! spec.md §4.3.
//!
//! Given one async/generator/async-generator function plus the closure
//! analyser's (`sharpts-closures`) and suspension analyser's
//! (`sharpts-suspend`) output, synthesises the fixed field layout the
//! emitter (`sharpts-emit`) compiles against: `<>1__state`, `<>t__builder`,
//! one `<>u__{k}` per suspension point, and one `<>5__{name}` per hoisted
//! parameter or local.

mod builder;
mod hoisting;
mod layout;

pub use builder::{StateMachineBuilder, StateMachineOptions};
pub use hoisting::{DisplayFieldId, FieldId, HoistedSlot, HoistingManager};
pub use layout::{AsyncKind, LockFields, StateMachineLayout};

#[cfg(test)]
mod tests {
    use super::*;
    use sharpts_ast::{Arena, Expr, FunctionKind, FunctionLike, Literal, Node, NodeData, Stmt, VarDecl};
    use sharpts_closures::CaptureTable;
    use sharpts_common::{Interner, Span};
    use sharpts_suspend::BodyKind;

    fn push(arena: &mut Arena, node: Node) -> sharpts_ast::NodeId {
        arena.insert(NodeData {
            span: Span::dummy(),
            node,
        })
    }

    /// `async function f() { let a = 1; await g(); return a; }` gets a
    /// layout with: state field at index 0, builder at 1, one awaiter
    /// field, and one hoisted field for `a`.
    #[test]
    fn basic_async_function_layout_has_expected_fields() {
        let mut arena = Arena::new();
        let mut interner = Interner::new();
        let a = interner.intern("a");
        let g = interner.intern("g");

        let one = push(&mut arena, Node::Expr(Expr::Literal(Literal::Number(1.0))));
        let var_a = push(
            &mut arena,
            Node::Stmt(Stmt::Var(VarDecl {
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
            Node::Stmt(Stmt::Block(smallvec::smallvec![
                var_a, await_stmt, return_a
            ])),
        );

        let func = FunctionLike {
            name: Some(interner.intern("f")),
            kind: FunctionKind::Function,
            params: vec![],
            body,
            is_async: true,
            is_generator: false,
            is_arrow: false,
        };
        let fn_id = push(&mut arena, Node::Stmt(Stmt::Function(func.clone())));

        let captures = CaptureTable::default();
        let suspend = sharpts_suspend::analyze(&arena, &captures, BodyKind::Async, &func);

        let layout = StateMachineBuilder::build(
            fn_id,
            &func,
            &captures,
            &suspend,
            AsyncKind::Async,
            StateMachineOptions::default(),
            &|atom| interner.resolve(atom).to_string(),
        );

        assert_eq!(layout.field_name(layout.state_field), "<>1__state");
        assert_eq!(layout.field_name(layout.builder_field), "<>t__builder");
        assert_eq!(layout.field_name(layout.awaiter_field(0)), "<>u__0");
        assert!(matches!(
            layout.hoisting().resolve(&a),
            Some(HoistedSlot::Local(_))
        ));
        assert_eq!(layout.field_count(), 4);
    }

    #[test]
    fn instance_method_gets_this_field() {
        let mut arena = Arena::new();
        let mut interner = Interner::new();
        let body = push(&mut arena, Node::Stmt(Stmt::Block(Default::default())));
        let func = FunctionLike {
            name: Some(interner.intern("m")),
            kind: FunctionKind::Method,
            params: vec![],
            body,
            is_async: true,
            is_generator: false,
            is_arrow: false,
        };
        let fn_id = push(&mut arena, Node::Stmt(Stmt::Function(func.clone())));
        let captures = CaptureTable::default();
        let suspend = sharpts_suspend::analyze(&arena, &captures, BodyKind::Async, &func);

        let layout = StateMachineBuilder::build(
            fn_id,
            &func,
            &captures,
            &suspend,
            AsyncKind::Async,
            StateMachineOptions {
                is_instance_method: true,
                ..Default::default()
            },
            &|atom| interner.resolve(atom).to_string(),
        );

        let this_field = layout.this_field.expect("instance method needs <>4__this");
        assert_eq!(layout.field_name(this_field), "<>4__this");
    }
}
