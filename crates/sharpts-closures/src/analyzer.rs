//! Two-pass, top-down walk implementing spec.md §4.1's three capture rules.

use rustc_hash::FxHashSet;
use sharpts_ast::{
    Arena, ClassDecl, ClassMemberKind, Expr, FunctionLike, Node, NodeId, ObjectProp, Stmt,
};
use sharpts_common::Atom;

use crate::types::{CaptureName, CaptureTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeKind {
    /// Top of a function-like node's own frame; owns `var` declarations
    /// hoisted up from any nested block.
    Function,
    /// A block, loop header, or catch clause; does not receive hoisted
    /// `var`s.
    Block,
}

struct ScopeFrame {
    kind: ScopeKind,
    /// The function-like node this frame's declarations belong to, for rule
    /// 3's "nearest enclosing function that declares it".
    owner: NodeId,
    declared: FxHashSet<Atom>,
}

pub struct Analyzer<'a> {
    arena: &'a Arena,
    table: CaptureTable,
    /// Parallel to the run of `Function`-kind frames in `scopes`: the
    /// function-like node currently being descended into. Empty at module
    /// scope.
    function_stack: Vec<NodeId>,
    /// Parallel to `function_stack`: each function-expression's own name,
    /// for rule 2's self-reference check.
    function_name_stack: Vec<Option<Atom>>,
    scopes: Vec<ScopeFrame>,
}

impl<'a> Analyzer<'a> {
    pub fn new(arena: &'a Arena) -> Self {
        Self {
            arena,
            table: CaptureTable::new(),
            function_stack: Vec::new(),
            function_name_stack: Vec::new(),
            scopes: Vec::new(),
        }
    }

    pub fn analyze(mut self, root: NodeId) -> CaptureTable {
        self.scopes.push(ScopeFrame {
            kind: ScopeKind::Function,
            owner: root,
            declared: FxHashSet::default(),
        });
        self.walk_stmt(root);
        self.scopes.pop();
        self.table
    }

    fn current_function(&self) -> Option<NodeId> {
        self.function_stack.last().copied()
    }

    fn declare_in_current_scope(&mut self, name: Atom) {
        if let Some(frame) = self.scopes.last_mut() {
            frame.declared.insert(name);
        }
    }

    /// `var` hoists to the nearest enclosing function frame (SPEC_FULL.md
    /// §3), skipping any intervening block frames.
    fn declare_hoisted(&mut self, name: Atom) {
        for frame in self.scopes.iter_mut().rev() {
            if frame.kind == ScopeKind::Function {
                frame.declared.insert(name);
                return;
            }
        }
    }

    /// Rules 1 and 3 from spec.md §4.1. Returns the owning function-like
    /// node of the declaring scope, or `None` if the name is free (declared
    /// nowhere in any visited scope, i.e. a module-level/global reference).
    fn resolve(&mut self, name: Atom) {
        let current = self.current_function();

        // Rule 2: a named function expression referencing its own name.
        if let (Some(current_fn), Some(Some(own_name))) =
            (current, self.function_name_stack.last().copied())
        {
            if own_name == name {
                self.table
                    .record_capture(current_fn, CaptureName::Named(name));
                return;
            }
        }

        let mut owner: Option<NodeId> = None;
        for frame in self.scopes.iter().rev() {
            if frame.declared.contains(&name) {
                owner = Some(frame.owner);
                break;
            }
        }

        let Some(owner) = owner else {
            // Free reference: no declaring scope was visited. Not a capture
            // by this analyser's contract (captures are bounded by
            // `outer-scope names ∪ {this}` actually present in the unit).
            return;
        };

        match current {
            Some(current_fn) if current_fn == owner => {
                // Rule 1: declared local of the current function.
            }
            Some(current_fn) => {
                // Rule 3: captured from an enclosing function.
                self.table
                    .record_capture(current_fn, CaptureName::Named(name));
                self.table.record_captured_local(owner, name);
            }
            None => {
                // Reference made outside any function (module top level);
                // never a capture.
            }
        }
    }

    fn resolve_this(&mut self) {
        if let Some(current_fn) = self.current_function() {
            self.table.record_capture(current_fn, CaptureName::This);
        }
    }

    fn enter_function(&mut self, id: NodeId, func: &FunctionLike) {
        self.table.ensure_function_entry(id);

        let own_name = if func.is_arrow { None } else { func.name };
        self.function_stack.push(id);
        self.function_name_stack.push(own_name);
        self.scopes.push(ScopeFrame {
            kind: ScopeKind::Function,
            owner: id,
            declared: FxHashSet::default(),
        });
        for param in &func.params {
            self.declare_in_current_scope(param.name);
        }
        self.walk_stmt(func.body);
        self.scopes.pop();
        self.function_name_stack.pop();
        self.function_stack.pop();
    }

    fn enter_block(&mut self, owner: NodeId) {
        self.scopes.push(ScopeFrame {
            kind: ScopeKind::Block,
            owner,
            declared: FxHashSet::default(),
        });
    }

    fn exit_block(&mut self) {
        self.scopes.pop();
    }

    fn current_owner(&self) -> NodeId {
        self.scopes
            .last()
            .map(|f| f.owner)
            .unwrap_or_else(|| unreachable!("scope stack is never empty during a walk"))
    }

    fn walk_stmt(&mut self, id: NodeId) {
        let node = self.arena.get(id).node.clone();
        let Node::Stmt(stmt) = node else {
            self.walk_expr(id);
            return;
        };
        match stmt {
            Stmt::Var(decl) => {
                self.declare_hoisted(decl.name);
                if let Some(init) = decl.initializer {
                    self.walk_expr(init);
                }
            }
            Stmt::Const(decl) => {
                if let Some(init) = decl.initializer {
                    self.walk_expr(init);
                }
                self.declare_in_current_scope(decl.name);
            }
            Stmt::Function(func) => {
                if let Some(name) = func.name {
                    self.declare_in_current_scope(name);
                }
                self.enter_function(id, &func);
            }
            Stmt::Class(class) | Stmt::ClassExpr(class) => self.walk_class(&class),
            Stmt::If {
                test,
                then_branch,
                else_branch,
            } => {
                self.walk_expr(test);
                self.walk_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.walk_stmt(else_branch);
                }
            }
            Stmt::While { test, body } => {
                self.walk_expr(test);
                self.walk_stmt(body);
            }
            Stmt::For {
                init,
                test,
                update,
                body,
            } => {
                let owner = self.current_owner();
                self.enter_block(owner);
                if let Some(init) = init {
                    self.walk_stmt(init);
                }
                if let Some(test) = test {
                    self.walk_expr(test);
                }
                if let Some(update) = update {
                    self.walk_expr(update);
                }
                self.walk_stmt(body);
                self.exit_block();
            }
            Stmt::ForOf {
                binding,
                iterable,
                body,
                ..
            } => {
                self.walk_expr(iterable);
                let owner = self.current_owner();
                self.enter_block(owner);
                self.declare_in_current_scope(binding);
                self.walk_stmt(body);
                self.exit_block();
            }
            Stmt::ForIn {
                binding,
                object,
                body,
                ..
            } => {
                self.walk_expr(object);
                let owner = self.current_owner();
                self.enter_block(owner);
                self.declare_in_current_scope(binding);
                self.walk_stmt(body);
                self.exit_block();
            }
            Stmt::TryCatch {
                try_block,
                catch_param,
                catch_block,
                finally_block,
            } => {
                self.walk_stmt(try_block);
                if let Some(catch_block) = catch_block {
                    let owner = self.current_owner();
                    self.enter_block(owner);
                    if let Some(param) = catch_param {
                        self.declare_in_current_scope(param);
                    }
                    self.walk_stmt(catch_block);
                    self.exit_block();
                }
                if let Some(finally_block) = finally_block {
                    self.walk_stmt(finally_block);
                }
            }
            Stmt::Switch { discriminant, cases } => {
                self.walk_expr(discriminant);
                let owner = self.current_owner();
                self.enter_block(owner);
                for case in &cases {
                    if let Some(test) = case.test {
                        self.walk_expr(test);
                    }
                    for &stmt in &case.body {
                        self.walk_stmt(stmt);
                    }
                }
                self.exit_block();
            }
            Stmt::Return(value) => {
                if let Some(value) = value {
                    self.walk_expr(value);
                }
            }
            Stmt::Throw(value) => self.walk_expr(value),
            Stmt::Break(_) | Stmt::Continue(_) => {}
            Stmt::Block(stmts) => {
                let owner = self.current_owner();
                self.enter_block(owner);
                for &stmt in &stmts {
                    self.walk_stmt(stmt);
                }
                self.exit_block();
            }
            Stmt::Sequence(stmts) => {
                for &stmt in &stmts {
                    self.walk_stmt(stmt);
                }
            }
            Stmt::Expression(expr) => self.walk_expr(expr),
        }
    }

    fn walk_expr(&mut self, id: NodeId) {
        let node = self.arena.get(id).node.clone();
        let Node::Expr(expr) = node else {
            self.walk_stmt(id);
            return;
        };
        match expr {
            Expr::Literal(_) | Expr::ImportMeta | Expr::RegexLiteral(_) => {}
            Expr::Variable(name) => self.resolve(name),
            Expr::This => self.resolve_this(),
            Expr::Super => {}
            Expr::Assign { target, value } => {
                self.walk_expr(target);
                self.walk_expr(value);
            }
            Expr::CompoundAssign { target, value, .. }
            | Expr::LogicalAssign { target, value, .. } => {
                self.walk_expr(target);
                self.walk_expr(value);
            }
            Expr::Binary { left, right, .. }
            | Expr::Logical { left, right, .. }
            | Expr::NullishCoalescing { left, right } => {
                self.walk_expr(left);
                self.walk_expr(right);
            }
            Expr::Unary { operand, .. }
            | Expr::Spread(operand)
            | Expr::Delete(operand)
            | Expr::NonNullAssertion(operand)
            | Expr::PrefixIncrement(operand)
            | Expr::PostfixIncrement(operand) => self.walk_expr(operand),
            Expr::Ternary {
                test,
                consequent,
                alternate,
            } => {
                self.walk_expr(test);
                self.walk_expr(consequent);
                self.walk_expr(alternate);
            }
            Expr::Call { callee, args, .. } | Expr::New { callee, args } => {
                self.walk_expr(callee);
                for &arg in &args {
                    self.walk_expr(arg);
                }
            }
            Expr::Get { object, .. } => self.walk_expr(object),
            Expr::Set { object, value, .. } => {
                self.walk_expr(object);
                self.walk_expr(value);
            }
            Expr::GetIndex { object, index, .. } => {
                self.walk_expr(object);
                self.walk_expr(index);
            }
            Expr::SetIndex {
                object,
                index,
                value,
            } => {
                self.walk_expr(object);
                self.walk_expr(index);
                self.walk_expr(value);
            }
            Expr::GetPrivate { object, .. } => self.walk_expr(object),
            Expr::SetPrivate { object, value, .. } => {
                self.walk_expr(object);
                self.walk_expr(value);
            }
            Expr::CallPrivate { object, args, .. } => {
                self.walk_expr(object);
                for &arg in &args {
                    self.walk_expr(arg);
                }
            }
            Expr::ArrayLiteral(items) => {
                for &item in &items {
                    self.walk_expr(item);
                }
            }
            Expr::ObjectLiteral(props) => {
                for ObjectProp { value, .. } in &props {
                    self.walk_expr(*value);
                }
            }
            Expr::TemplateLiteral { expressions, .. } => {
                for &expr in &expressions {
                    self.walk_expr(expr);
                }
            }
            Expr::TaggedTemplateLiteral {
                tag, expressions, ..
            } => {
                self.walk_expr(tag);
                for &expr in &expressions {
                    self.walk_expr(expr);
                }
            }
            Expr::ArrowFunction(func) => self.enter_function(id, &func),
            Expr::Await(value) | Expr::TypeAssertion { expression: value } => self.walk_expr(value),
            Expr::Yield { argument, .. } => {
                if let Some(argument) = argument {
                    self.walk_expr(argument);
                }
            }
            Expr::Satisfies { expression } => self.walk_expr(expression),
            Expr::DynamicImport(spec) => self.walk_expr(spec),
            Expr::ClassExpr(class) => self.walk_class(&class),
        }
    }

    /// Shared by `Stmt::Class`/`Stmt::ClassExpr`/`Expr::ClassExpr`: a class
    /// declaration's own name is a binding in the enclosing scope, its
    /// `extends` clause is evaluated in that same scope, and each method
    /// is its own function-like node one block deeper (so a method body
    /// resolving an outer class field goes through the normal capture path
    /// rather than a Rust-specific shortcut).
    fn walk_class(&mut self, class: &ClassDecl) {
        if let Some(name) = class.name {
            self.declare_in_current_scope(name);
        }
        if let Some(extends) = class.extends {
            self.walk_expr(extends);
        }
        for member in &class.members {
            match &member.kind {
                ClassMemberKind::Method(method_id) => {
                    let owner = self.current_owner();
                    self.enter_block(owner);
                    let Node::Stmt(Stmt::Function(func)) = self.arena.get(*method_id).node.clone()
                    else {
                        unreachable!("ClassMemberKind::Method must point at a Stmt::Function node");
                    };
                    self.enter_function(*method_id, &func);
                    self.exit_block();
                }
                ClassMemberKind::Field { initializer } => {
                    if let Some(init) = initializer {
                        self.walk_expr(*init);
                    }
                }
                ClassMemberKind::StaticBlock(body) => self.walk_stmt(*body),
            }
        }
    }
}

/// Entry point: runs the closure analyser over the function or program body
/// rooted at `root` and returns the resulting [`CaptureTable`].
pub fn analyze(arena: &Arena, root: NodeId) -> CaptureTable {
    Analyzer::new(arena).analyze(root)
}
