//! Closure capture analysis (C2, spec.md §4.1).
//!
//! A two-pass, top-down walk over a function or program body that decides,
//! for every function-like node, which outer names it reads or writes
//! (`captures`) and which of its own locals some nested function captures
//! (`captured_locals`). The emitter (`sharpts-emit`) uses this to decide
//! which locals need a display-class field instead of a stack slot.

mod analyzer;
mod types;

pub use analyzer::analyze;
pub use types::{CaptureName, CaptureTable, FunctionCaptures};

#[cfg(test)]
mod tests {
    use super::*;
    use sharpts_ast::{Arena, Expr, FunctionKind, FunctionLike, Node, NodeData, Stmt};
    use sharpts_common::{Atom, Interner, Span};

    struct Fixture {
        arena: Arena,
        interner: Interner,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                arena: Arena::new(),
                interner: Interner::new(),
            }
        }

        fn atom(&mut self, name: &str) -> Atom {
            self.interner.intern(name)
        }

        fn push(&mut self, node: Node) -> sharpts_ast::NodeId {
            self.arena.insert(NodeData {
                span: Span::dummy(),
                node,
            })
        }
    }

    /// `function outer() { let x = 1; function inner() { return x; } }`
    ///
    /// `x` is declared in `outer`, referenced in `inner` nested inside it:
    /// rule 3 fires, so `inner.captures == {x}` and
    /// `outer.captured_locals == {x}`.
    #[test]
    fn nested_function_captures_outer_local() {
        let mut f = Fixture::new();
        let x = f.atom("x");

        let one = f.push(Node::Expr(Expr::Literal(sharpts_ast::Literal::Number(1.0))));
        let var_x = f.push(Node::Stmt(Stmt::Var(sharpts_ast::VarDecl {
            name: x,
            initializer: Some(one),
        })));

        let x_ref = f.push(Node::Expr(Expr::Variable(x)));
        let return_x = f.push(Node::Stmt(Stmt::Return(Some(x_ref))));
        let inner_body = f.push(Node::Stmt(Stmt::Block(smallvec::smallvec![return_x])));
        let inner = f.push(Node::Stmt(Stmt::Function(FunctionLike {
            name: Some(f.atom("inner")),
            kind: FunctionKind::Function,
            params: vec![],
            body: inner_body,
            is_async: false,
            is_generator: false,
            is_arrow: false,
        })));

        let outer_body = f.push(Node::Stmt(Stmt::Block(smallvec::smallvec![var_x, inner])));
        let outer = f.push(Node::Stmt(Stmt::Function(FunctionLike {
            name: Some(f.atom("outer")),
            kind: FunctionKind::Function,
            params: vec![],
            body: outer_body,
            is_async: false,
            is_generator: false,
            is_arrow: false,
        })));

        let table = analyze(&f.arena, outer);
        assert!(table
            .captures(inner)
            .any(|c| *c == CaptureName::Named(x)));
        assert!(table.captured_locals(outer).any(|n| *n == x));
        assert!(table.is_captured_anywhere(&x));
    }

    /// A local only ever used inside its own declaring function is never
    /// reported as a capture of anything.
    #[test]
    fn purely_local_variable_is_not_a_capture() {
        let mut f = Fixture::new();
        let x = f.atom("x");
        let one = f.push(Node::Expr(Expr::Literal(sharpts_ast::Literal::Number(1.0))));
        let var_x = f.push(Node::Stmt(Stmt::Var(sharpts_ast::VarDecl {
            name: x,
            initializer: Some(one),
        })));
        let x_ref = f.push(Node::Expr(Expr::Variable(x)));
        let return_x = f.push(Node::Stmt(Stmt::Return(Some(x_ref))));
        let body = f.push(Node::Stmt(Stmt::Block(smallvec::smallvec![
            var_x, return_x
        ])));
        let func = f.push(Node::Stmt(Stmt::Function(FunctionLike {
            name: Some(f.atom("solo")),
            kind: FunctionKind::Function,
            params: vec![],
            body,
            is_async: false,
            is_generator: false,
            is_arrow: false,
        })));

        let table = analyze(&f.arena, func);
        assert!(!table.is_captured_anywhere(&x));
        assert!(table.captures(func).next().is_none());
    }

    /// An arrow function referencing `this` captures it; a named function
    /// does not (it receives its own `this`).
    #[test]
    fn arrow_captures_this_function_does_not() {
        let mut f = Fixture::new();
        let this_ref = f.push(Node::Expr(Expr::This));
        let return_this = f.push(Node::Stmt(Stmt::Return(Some(this_ref))));
        let arrow_body = f.push(Node::Stmt(Stmt::Block(smallvec::smallvec![return_this])));
        let arrow = f.push(Node::Expr(Expr::ArrowFunction(FunctionLike {
            name: None,
            kind: FunctionKind::Function,
            params: vec![],
            body: arrow_body,
            is_async: false,
            is_generator: false,
            is_arrow: true,
        })));
        let arrow_stmt = f.push(Node::Stmt(Stmt::Expression(arrow)));

        let outer_body = f.push(Node::Stmt(Stmt::Block(smallvec::smallvec![arrow_stmt])));
        let outer = f.push(Node::Stmt(Stmt::Function(FunctionLike {
            name: Some(f.atom("outer")),
            kind: FunctionKind::Function,
            params: vec![],
            body: outer_body,
            is_async: false,
            is_generator: false,
            is_arrow: false,
        })));

        let table = analyze(&f.arena, outer);
        assert!(table.captures(arrow).any(|c| *c == CaptureName::This));
        assert!(!table.captures(outer).any(|c| *c == CaptureName::This));
    }

    /// `var` declared inside a nested block is a local of the *function*,
    /// not the block, so a sibling-block reference after it still resolves
    /// locally rather than as a capture from some outer scope.
    #[test]
    fn var_hoists_out_of_nested_block() {
        let mut f = Fixture::new();
        let v = f.atom("v");
        let one = f.push(Node::Expr(Expr::Literal(sharpts_ast::Literal::Number(1.0))));
        let var_v = f.push(Node::Stmt(Stmt::Var(sharpts_ast::VarDecl {
            name: v,
            initializer: Some(one),
        })));
        let inner_block = f.push(Node::Stmt(Stmt::Block(smallvec::smallvec![var_v])));

        let v_ref = f.push(Node::Expr(Expr::Variable(v)));
        let return_v = f.push(Node::Stmt(Stmt::Return(Some(v_ref))));
        let fn_ref = f.push(Node::Expr(Expr::Variable(v)));
        let return_fn = f.push(Node::Stmt(Stmt::Return(Some(fn_ref))));
        let inner_fn_body = f.push(Node::Stmt(Stmt::Block(smallvec::smallvec![return_fn])));
        let inner_fn = f.push(Node::Stmt(Stmt::Function(FunctionLike {
            name: Some(f.atom("reader")),
            kind: FunctionKind::Function,
            params: vec![],
            body: inner_fn_body,
            is_async: false,
            is_generator: false,
            is_arrow: false,
        })));

        let outer_body = f.push(Node::Stmt(Stmt::Block(smallvec::smallvec![
            inner_block,
            return_v,
            inner_fn
        ])));
        let outer = f.push(Node::Stmt(Stmt::Function(FunctionLike {
            name: Some(f.atom("outer")),
            kind: FunctionKind::Function,
            params: vec![],
            body: outer_body,
            is_async: false,
            is_generator: false,
            is_arrow: false,
        })));

        let table = analyze(&f.arena, outer);
        // `v` is a local of `outer` (rule 1 for the top-level `return v`)...
        assert!(!table.captures(outer).any(|c| *c == CaptureName::Named(v)));
        // ...and a genuine capture for the nested function reading it.
        assert!(table.captures(inner_fn).any(|c| *c == CaptureName::Named(v)));
    }
}
