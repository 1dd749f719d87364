//! Single-body walk assigning dense state indices to `await`/`yield` nodes
//! and computing the hoisted-variable set (spec.md §4.2).

use sharpts_ast::{Arena, ClassMemberKind, Expr, FunctionLike, Node, NodeId, ObjectProp, Stmt};
use sharpts_closures::CaptureTable;
use sharpts_common::Atom;

use crate::types::{AsyncArrowInfo, StateIndex, SuspensionKind, SuspensionPoint, SuspensionTable};

/// Whether the body being analysed is itself an async generator: a `yield`
/// inside one additionally awaits the iterator-result promise on resume
/// (spec.md §4.6), so it is recorded with [`SuspensionKind::AsyncYield`]
/// rather than plain [`SuspensionKind::Yield`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Async,
    Generator,
    AsyncGenerator,
}

struct DeclSite {
    name: Atom,
    /// Index of the next suspension point not yet seen when this name was
    /// declared; a read/write at or after that point hoists it.
    declared_before_point: u32,
}

pub struct Analyzer<'a> {
    arena: &'a Arena,
    captures: &'a CaptureTable,
    kind: BodyKind,
    table: SuspensionTable,
    next_index: u32,
    try_depth: u32,
    loop_depth: u32,
    switch_depth: u32,
    /// Names declared so far in the current body, with the suspension
    /// count at the time of declaration — used to decide whether a later
    /// read/write crosses a suspension boundary.
    declared: Vec<DeclSite>,
    /// Read/write names seen at each point index, deferred so a name's
    /// hoisting decision does not depend on traversal order within a
    /// single expression.
    referenced_at: Vec<(Atom, u32)>,
    arrow_stack: Vec<NodeId>,
}

impl<'a> Analyzer<'a> {
    pub fn new(arena: &'a Arena, captures: &'a CaptureTable, kind: BodyKind) -> Self {
        Self {
            arena,
            captures,
            kind,
            table: SuspensionTable::new(),
            next_index: 0,
            try_depth: 0,
            loop_depth: 0,
            switch_depth: 0,
            declared: Vec::new(),
            referenced_at: Vec::new(),
            arrow_stack: Vec::new(),
        }
    }

    pub fn analyze(mut self, function: &FunctionLike) -> SuspensionTable {
        let params: Vec<Atom> = function.params.iter().map(|p| p.name).collect();
        for &name in &params {
            self.declare(name);
        }
        self.walk_stmt(function.body, true);
        self.finish_hoisting();
        self.table.set_hoisted_params(params);
        self.table
    }

    fn declare(&mut self, name: Atom) {
        self.declared.push(DeclSite {
            name,
            declared_before_point: self.next_index,
        });
    }

    fn reference(&mut self, name: Atom) {
        self.referenced_at.push((name, self.next_index));
    }

    /// Hoisted iff (declared before at least one suspension point) AND
    /// (read or written at or after that same point) — spec.md §4.2.
    fn finish_hoisting(&mut self) {
        for &(name, at_point) in &self.referenced_at {
            let declared_before_suspension = self
                .declared
                .iter()
                .any(|site| site.name == name && site.declared_before_point < at_point);
            if declared_before_suspension {
                self.table.mark_hoisted(name);
            }
        }
    }

    fn record_point(&mut self, node: NodeId, kind: SuspensionKind) -> StateIndex {
        let index = StateIndex(self.next_index);
        self.next_index += 1;
        self.table.push_point(SuspensionPoint {
            node,
            index,
            kind,
            try_depth: self.try_depth,
            loop_depth: self.loop_depth,
            switch_depth: self.switch_depth,
        });
        index
    }

    /// `collecting` is `false` once we've descended into a nested async
    /// arrow purely to discover further-nested arrows: that arrow's own
    /// `await`/`yield` nodes belong to its own, separately-computed
    /// [`SuspensionTable`], not this one.
    fn walk_stmt(&mut self, id: NodeId, collecting: bool) {
        let node = self.arena.get(id).node.clone();
        let Node::Stmt(stmt) = node else {
            self.walk_expr(id, collecting);
            return;
        };
        match stmt {
            Stmt::Var(decl) | Stmt::Const(decl) => {
                if let Some(init) = decl.initializer {
                    self.walk_expr(init, collecting);
                }
                if collecting {
                    self.declare(decl.name);
                }
            }
            Stmt::Function(_) => {
                // A nested function declaration is its own analysis unit;
                // the driver invokes this analyser on it separately if it
                // is itself async/generator.
            }
            Stmt::Class(class) | Stmt::ClassExpr(class) => {
                if let Some(extends) = class.extends {
                    self.walk_expr(extends, collecting);
                }
                for member in &class.members {
                    if let ClassMemberKind::Field {
                        initializer: Some(init),
                    } = &member.kind
                    {
                        self.walk_expr(*init, collecting);
                    }
                    if let ClassMemberKind::StaticBlock(body) = &member.kind {
                        self.walk_stmt(*body, collecting);
                    }
                    // Methods are independent function-like nodes, analysed
                    // on their own when they are themselves async/generator.
                }
            }
            Stmt::If {
                test,
                then_branch,
                else_branch,
            } => {
                self.walk_expr(test, collecting);
                self.walk_stmt(then_branch, collecting);
                if let Some(else_branch) = else_branch {
                    self.walk_stmt(else_branch, collecting);
                }
            }
            Stmt::While { test, body } => {
                self.walk_expr(test, collecting);
                self.loop_depth += 1;
                self.walk_stmt(body, collecting);
                self.loop_depth -= 1;
            }
            Stmt::For {
                init,
                test,
                update,
                body,
            } => {
                if let Some(init) = init {
                    self.walk_stmt(init, collecting);
                }
                if let Some(test) = test {
                    self.walk_expr(test, collecting);
                }
                if let Some(update) = update {
                    self.walk_expr(update, collecting);
                }
                self.loop_depth += 1;
                self.walk_stmt(body, collecting);
                self.loop_depth -= 1;
            }
            Stmt::ForOf {
                binding,
                iterable,
                body,
                ..
            } => {
                self.walk_expr(iterable, collecting);
                if collecting {
                    self.declare(binding);
                }
                self.loop_depth += 1;
                self.walk_stmt(body, collecting);
                self.loop_depth -= 1;
            }
            Stmt::ForIn {
                binding,
                object,
                body,
                ..
            } => {
                self.walk_expr(object, collecting);
                if collecting {
                    self.declare(binding);
                }
                self.loop_depth += 1;
                self.walk_stmt(body, collecting);
                self.loop_depth -= 1;
            }
            Stmt::TryCatch {
                try_block,
                catch_param,
                catch_block,
                finally_block,
            } => {
                self.try_depth += 1;
                self.walk_stmt(try_block, collecting);
                self.try_depth -= 1;
                if let Some(catch_block) = catch_block {
                    if collecting {
                        if let Some(param) = catch_param {
                            self.declare(param);
                        }
                    }
                    self.walk_stmt(catch_block, collecting);
                }
                if let Some(finally_block) = finally_block {
                    self.walk_stmt(finally_block, collecting);
                }
            }
            Stmt::Switch {
                discriminant,
                cases,
            } => {
                self.walk_expr(discriminant, collecting);
                self.switch_depth += 1;
                for case in &cases {
                    if let Some(test) = case.test {
                        self.walk_expr(test, collecting);
                    }
                    for &stmt in &case.body {
                        self.walk_stmt(stmt, collecting);
                    }
                }
                self.switch_depth -= 1;
            }
            Stmt::Return(value) => {
                if let Some(value) = value {
                    self.walk_expr(value, collecting);
                }
            }
            Stmt::Throw(value) => self.walk_expr(value, collecting),
            Stmt::Break(_) | Stmt::Continue(_) => {}
            Stmt::Block(stmts) => {
                for &stmt in &stmts {
                    self.walk_stmt(stmt, collecting);
                }
            }
            Stmt::Sequence(stmts) => {
                for &stmt in &stmts {
                    self.walk_stmt(stmt, collecting);
                }
            }
            Stmt::Expression(expr) => self.walk_expr(expr, collecting),
        }
    }

    fn walk_expr(&mut self, id: NodeId, collecting: bool) {
        let node = self.arena.get(id).node.clone();
        let Node::Expr(expr) = node else {
            self.walk_stmt(id, collecting);
            return;
        };
        match expr {
            Expr::Literal(_) | Expr::ImportMeta | Expr::RegexLiteral(_) | Expr::This | Expr::Super => {}
            Expr::Variable(name) => {
                if collecting {
                    self.reference(name);
                }
            }
            Expr::Assign { target, value } => {
                self.walk_expr(target, collecting);
                self.walk_expr(value, collecting);
            }
            Expr::CompoundAssign { target, value, .. }
            | Expr::LogicalAssign { target, value, .. } => {
                self.walk_expr(target, collecting);
                self.walk_expr(value, collecting);
            }
            Expr::Binary { left, right, .. }
            | Expr::Logical { left, right, .. }
            | Expr::NullishCoalescing { left, right } => {
                self.walk_expr(left, collecting);
                self.walk_expr(right, collecting);
            }
            Expr::Unary { operand, .. }
            | Expr::Spread(operand)
            | Expr::Delete(operand)
            | Expr::NonNullAssertion(operand)
            | Expr::PrefixIncrement(operand)
            | Expr::PostfixIncrement(operand) => self.walk_expr(operand, collecting),
            Expr::Ternary {
                test,
                consequent,
                alternate,
            } => {
                self.walk_expr(test, collecting);
                self.walk_expr(consequent, collecting);
                self.walk_expr(alternate, collecting);
            }
            Expr::Call { callee, args, .. } | Expr::New { callee, args } => {
                self.walk_expr(callee, collecting);
                for &arg in &args {
                    self.walk_expr(arg, collecting);
                }
            }
            Expr::Get { object, .. } => self.walk_expr(object, collecting),
            Expr::Set { object, value, .. } => {
                self.walk_expr(object, collecting);
                self.walk_expr(value, collecting);
            }
            Expr::GetIndex { object, index, .. } => {
                self.walk_expr(object, collecting);
                self.walk_expr(index, collecting);
            }
            Expr::SetIndex {
                object,
                index,
                value,
            } => {
                self.walk_expr(object, collecting);
                self.walk_expr(index, collecting);
                self.walk_expr(value, collecting);
            }
            Expr::GetPrivate { object, .. } => self.walk_expr(object, collecting),
            Expr::SetPrivate { object, value, .. } => {
                self.walk_expr(object, collecting);
                self.walk_expr(value, collecting);
            }
            Expr::CallPrivate { object, args, .. } => {
                self.walk_expr(object, collecting);
                for &arg in &args {
                    self.walk_expr(arg, collecting);
                }
            }
            Expr::ArrayLiteral(items) => {
                for &item in &items {
                    self.walk_expr(item, collecting);
                }
            }
            Expr::ObjectLiteral(props) => {
                for ObjectProp { value, .. } in &props {
                    self.walk_expr(*value, collecting);
                }
            }
            Expr::TemplateLiteral { expressions, .. } => {
                for &expr in &expressions {
                    self.walk_expr(expr, collecting);
                }
            }
            Expr::TaggedTemplateLiteral {
                tag, expressions, ..
            } => {
                self.walk_expr(tag, collecting);
                for &expr in &expressions {
                    self.walk_expr(expr, collecting);
                }
            }
            Expr::ArrowFunction(func) => self.walk_arrow(id, &func, collecting),
            Expr::Await(value) => {
                self.walk_expr(value, collecting);
                if collecting {
                    self.record_point(id, SuspensionKind::Await);
                }
            }
            Expr::Yield { argument, .. } => {
                if let Some(argument) = argument {
                    self.walk_expr(argument, collecting);
                }
                if collecting {
                    let kind = match self.kind {
                        BodyKind::AsyncGenerator => SuspensionKind::AsyncYield,
                        _ => SuspensionKind::Yield,
                    };
                    self.record_point(id, kind);
                }
            }
            Expr::TypeAssertion { expression } | Expr::Satisfies { expression } => {
                self.walk_expr(expression, collecting)
            }
            Expr::DynamicImport(spec) => self.walk_expr(spec, collecting),
            Expr::ClassExpr(class) => {
                if let Some(extends) = class.extends {
                    self.walk_expr(extends, collecting);
                }
                for member in &class.members {
                    if let ClassMemberKind::Field {
                        initializer: Some(init),
                    } = &member.kind
                    {
                        self.walk_expr(*init, collecting);
                    }
                }
            }
        }
    }

    fn walk_arrow(&mut self, id: NodeId, func: &FunctionLike, collecting: bool) {
        if !func.is_async {
            // A non-async nested arrow can't itself suspend and can't host
            // further async arrows in a way that matters to this table;
            // still descend so any async arrow nested inside *it* is found.
            self.walk_stmt(func.body, false);
            return;
        }

        let parent_arrow = self.arrow_stack.last().copied();
        let nesting_level = self.arrow_stack.len() as u32 + 1;
        let captured = self.captures.captures(id).copied().collect::<Vec<_>>();
        self.table.push_async_arrow(AsyncArrowInfo {
            arrow_id: id,
            captured,
            nesting_level,
            parent_arrow,
        });

        self.arrow_stack.push(id);
        self.walk_stmt(func.body, false);
        self.arrow_stack.pop();
    }
}

/// Entry point: runs the suspension analyser over one async/generator/
/// async-generator function body rooted at `function`, given the closure
/// analyser's output for the same unit (needed for the async-arrow nesting
/// table's captured-name lists).
pub fn analyze(
    arena: &Arena,
    captures: &CaptureTable,
    kind: BodyKind,
    function: &FunctionLike,
) -> SuspensionTable {
    Analyzer::new(arena, captures, kind).analyze(function)
}
