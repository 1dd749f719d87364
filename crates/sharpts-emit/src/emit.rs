//! Expression/statement emitter (C7), spec.md §4.5 / SPEC_FULL.md §7.
//!
//! Walks one function body (already resolved by C1-C6) and produces
//! [`Instruction`]s with a tracked [`StackType`] per emitted expression, so
//! a consumer that already expects the representation on top of the stack
//! (e.g. a `double` operand to `+`) skips an unnecessary box/unbox
//! round-trip. The state-machine body emitter (C8, `state_machine_emit`)
//! reuses this dispatch for every expression inside a `MoveNext`/`Resume`
//! body and only overrides `Await`/`Yield`/`AsyncYield`.

use crate::errors::{EmitError, EmitResult};
use crate::ir::{Instruction, Label, LabelAllocator};
use crate::resolver::Resolver;
use crate::stack_type::{ensure_boolean, ensure_boxed, ensure_double, ensure_string, StackType};
use rustc_hash::FxHashMap;
use sharpts_ast::{Arena, BinaryOp, Expr, FunctionLike, Literal, LogicalOp, Node, NodeId, ObjectProp, PropertyKey, Stmt, SwitchCase, UnaryOp};
use sharpts_closures::{CaptureName, CaptureTable};
use sharpts_common::Atom;
use sharpts_runtime::{names, RuntimeDescriptor};

/// A statically-known compiled class field, keyed by member name, for the
/// direct `ldfld`/`callvirt` fast path (spec.md §4.5: "direct field/getter
/// for statically-known compiled-class receivers"). Receivers whose static
/// type isn't a compiled class fall back to the runtime
/// `GetProperty`/`SetProperty`/`GetIndex`/`SetIndex` stubs.
#[derive(Debug, Clone, Copy)]
pub enum MemberTarget {
    Field(u32),
    Getter(u32),
    Setter(u32),
    Method(u32),
}

/// Per-method mutable emission state: the runtime helper descriptor (C11),
/// a resolver (C6) bound to this method's locals/hoisted fields, statically
/// known member tables, and label/break-continue bookkeeping. This is
/// exactly the "Emission context" container from spec.md §3.
pub struct EmissionContext<'a> {
    pub arena: &'a Arena,
    pub runtime: &'a RuntimeDescriptor,
    pub resolver: &'a dyn Resolver,
    pub captures: &'a CaptureTable,
    pub members: FxHashMap<Atom, MemberTarget>,
    pub private_members: FxHashMap<Atom, MemberTarget>,
    labels: LabelAllocator,
    loop_targets: Vec<(Label, Label)>, // (continue_target, break_target)
}

impl<'a> EmissionContext<'a> {
    pub fn new(
        arena: &'a Arena,
        runtime: &'a RuntimeDescriptor,
        resolver: &'a dyn Resolver,
        captures: &'a CaptureTable,
    ) -> Self {
        Self {
            arena,
            runtime,
            resolver,
            captures,
            members: FxHashMap::default(),
            private_members: FxHashMap::default(),
            labels: LabelAllocator::new(),
            loop_targets: Vec::new(),
        }
    }

    fn label(&mut self) -> Label {
        self.labels.alloc()
    }

    /// Exposed so [`crate::state_machine_emit::StateMachineEmitter`] can
    /// allocate labels from the same counter its await/yield overrides use,
    /// keeping every label in one method body unique.
    pub fn alloc_label(&mut self) -> Label {
        self.labels.alloc()
    }

    /// Exposed so [`crate::state_machine_emit::StateMachineEmitter`] can
    /// share this context's break/continue target stack when it reimplements
    /// its own suspension-aware `If`/`While`/`For`/`Switch` emission — a
    /// `break`/`continue` statement inside one of those bodies still falls
    /// through to this base dispatcher's `Stmt::Break`/`Stmt::Continue` arm.
    pub fn push_loop_target(&mut self, continue_target: Label, break_target: Label) {
        self.loop_targets.push((continue_target, break_target));
    }

    pub fn pop_loop_target(&mut self) {
        self.loop_targets.pop();
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.arena.get(id).node
    }

    fn runtime_call(&self, name: &str) -> u32 {
        self.runtime.require(name).index()
    }

    /// Emits one expression, returning its instructions and the
    /// [`StackType`] left on top of the stack.
    pub fn emit_expr(&mut self, id: NodeId) -> EmitResult<(Vec<Instruction>, StackType)> {
        let Node::Expr(expr) = self.node(id).clone() else {
            return Err(EmitError::structural(
                "expected an expression node",
                0,
                0,
            ));
        };

        match expr {
            Expr::Literal(lit) => Ok(self.emit_literal(&lit)),
            Expr::Variable(name) => Ok((self.resolver.load(&name)?, StackType::Unknown)),
            Expr::This => Ok((self.resolver.load_this(), StackType::Unknown)),
            Expr::Assign { target, value } => self.emit_assign(target, value),
            Expr::Binary { op, left, right } => self.emit_binary(op, left, right),
            Expr::Logical { op, left, right } => self.emit_logical(op, left, right),
            Expr::NullishCoalescing { left, right } => self.emit_nullish(left, right),
            Expr::Unary { op, operand } => self.emit_unary(op, operand),
            Expr::Ternary {
                test,
                consequent,
                alternate,
            } => self.emit_ternary(test, consequent, alternate),
            Expr::Call {
                callee,
                args,
                optional,
            } => self.emit_call(callee, &args, optional),
            Expr::New { callee, args } => self.emit_new(callee, &args),
            Expr::Get {
                object,
                name,
                optional,
            } => self.emit_get(object, name, optional),
            Expr::Set {
                object,
                name,
                value,
            } => self.emit_set(object, name, value),
            Expr::GetIndex {
                object,
                index,
                optional,
            } => self.emit_get_index(object, index, optional),
            Expr::SetIndex {
                object,
                index,
                value,
            } => self.emit_set_index(object, index, value),
            Expr::GetPrivate { object, name } => self.emit_get_private(object, name),
            Expr::SetPrivate {
                object,
                name,
                value,
            } => self.emit_set_private(object, name, value),
            Expr::TemplateLiteral {
                quasis,
                expressions,
            } => self.emit_template_literal(&quasis, &expressions),
            Expr::Spread(inner) | Expr::NonNullAssertion(inner) | Expr::TypeAssertion {
                expression: inner,
            } | Expr::Satisfies { expression: inner } => self.emit_expr(inner),
            Expr::CompoundAssign { op, target, value } => self.emit_compound_assign(op, target, value),
            Expr::PrefixIncrement(target) => self.emit_increment(target, true),
            Expr::PostfixIncrement(target) => self.emit_increment(target, false),
            Expr::ArrayLiteral(items) => self.emit_array_literal(&items),
            Expr::Delete(target) => self.emit_delete(target),
            Expr::DynamicImport(specifier) => {
                let (mut spec_ins, spec_ty) = self.emit_expr(specifier)?;
                ensure_boxed(spec_ty, &mut spec_ins);
                spec_ins.push(Instruction::CallRuntime(self.runtime_call(names::DYNAMIC_IMPORT)));
                Ok((spec_ins, StackType::Unknown))
            }
            Expr::Await(_) => Err(EmitError::structural(
                "Await outside a state-machine body; state_machine_emit must override this handler",
                0,
                0,
            )),
            Expr::Yield { .. } => Err(EmitError::structural(
                "Yield outside a state-machine body; state_machine_emit must override this handler",
                0,
                0,
            )),
            Expr::ArrowFunction(func) => self.emit_arrow_function(id, &func),
            Expr::ObjectLiteral(props) => self.emit_object_literal(&props),
            Expr::ClassExpr(_) => Ok((vec![Instruction::NewObj(node_token(id))], StackType::Unknown)),
            Expr::LogicalAssign { op, target, value } => self.emit_logical_assign(op, target, value),
            Expr::CallPrivate { object, name, args } => self.emit_call_private(object, name, &args),
            Expr::Super => Ok((self.resolver.load_this(), StackType::Unknown)),
            Expr::TaggedTemplateLiteral {
                tag,
                quasis,
                expressions,
            } => self.emit_tagged_template_literal(tag, &quasis, &expressions),
            Expr::RegexLiteral(pattern) => {
                let out = vec![
                    Instruction::LdStr(atom_token(pattern)),
                    Instruction::CallRuntime(self.runtime_call(names::REGEX_NEW)),
                ];
                Ok((out, StackType::Unknown))
            }
            Expr::ImportMeta => {
                let out = vec![Instruction::CallRuntime(self.runtime_call(names::IMPORT_META))];
                Ok((out, StackType::Unknown))
            }
        }
    }

    /// Builds a closure value at an arrow's use site (spec.md §4.2/§4.6):
    /// a function pointer to the arrow's own separately-emitted body, bound
    /// to whichever instance this body sources captured names from. The
    /// arrow body itself is compiled as its own method by the driver's
    /// per-function-like-node pass, not recursively inlined here.
    fn emit_arrow_function(&mut self, id: NodeId, _func: &FunctionLike) -> EmitResult<(Vec<Instruction>, StackType)> {
        let method_token = node_token(id);
        let needs_instance = self
            .captures
            .captures(id)
            .any(|c| matches!(c, CaptureName::Named(_) | CaptureName::This));

        let mut out = vec![Instruction::LdFtn(method_token)];
        if needs_instance {
            let instance = self.resolver.closure_bound_instance().ok_or_else(|| {
                EmitError::structural(
                    "arrow function captures a variable but this body has no display-class binding to source it from",
                    0,
                    0,
                )
            })?;
            out.extend(instance);
        } else {
            out.push(Instruction::LdNull);
        }
        out.push(Instruction::CallRuntime(self.runtime_call(names::MAKE_CLOSURE)));
        Ok((out, StackType::Unknown))
    }

    /// `{ ...spread, key: value }` builds a fresh object then applies each
    /// property left to right, keeping the dup'd object reference on the
    /// stack between properties (spec.md §4.5's object-literal lowering).
    fn emit_object_literal(&mut self, props: &[ObjectProp]) -> EmitResult<(Vec<Instruction>, StackType)> {
        let mut out = vec![Instruction::CallRuntime(self.runtime_call(names::NEW_OBJECT))];
        for prop in props {
            out.push(Instruction::Dup);
            if prop.is_spread {
                let (mut val, ty) = self.emit_expr(prop.value)?;
                ensure_boxed(ty, &mut val);
                out.extend(val);
                out.push(Instruction::CallRuntime(self.runtime_call(names::OBJECT_SPREAD)));
                out.push(Instruction::Pop);
                continue;
            }
            match &prop.key {
                PropertyKey::Identifier(name) | PropertyKey::PrivateName(name) => {
                    out.push(Instruction::LdStr(atom_token(*name)));
                }
                PropertyKey::Computed(key_expr) => {
                    let (mut key_ins, key_ty) = self.emit_expr(*key_expr)?;
                    ensure_boxed(key_ty, &mut key_ins);
                    out.extend(key_ins);
                }
            }
            let (mut val, ty) = self.emit_expr(prop.value)?;
            ensure_boxed(ty, &mut val);
            out.extend(val);
            out.push(Instruction::CallRuntime(self.runtime_call(names::SET_PROPERTY)));
            out.push(Instruction::Pop);
        }
        Ok((out, StackType::Unknown))
    }

    /// `target &&= value` / `||=` / `??=`: load the current value, test it,
    /// and only evaluate+store `value` when the short-circuit doesn't fire.
    /// Both paths converge at `end` with exactly one value on the stack —
    /// the untouched original on the short-circuit path, the freshly stored
    /// (and reloaded) value otherwise.
    fn emit_logical_assign(
        &mut self,
        op: LogicalOp,
        target: NodeId,
        value: NodeId,
    ) -> EmitResult<(Vec<Instruction>, StackType)> {
        let Node::Expr(Expr::Variable(name)) = self.node(target).clone() else {
            return Err(EmitError::structural(
                "logical assignment target must be a resolvable variable in this emission path",
                0,
                0,
            ));
        };

        let mut current = self.resolver.load(&name)?;
        ensure_boxed(StackType::Unknown, &mut current);
        let end = self.label();

        let mut out = current;
        out.push(Instruction::Dup);
        match op {
            LogicalOp::And => {
                let to_boolean = self.runtime_call(names::TO_BOOLEAN);
                ensure_boolean(StackType::Unknown, &mut out, to_boolean);
                out.push(Instruction::BrFalse(end));
            }
            LogicalOp::Or => {
                let to_boolean = self.runtime_call(names::TO_BOOLEAN);
                ensure_boolean(StackType::Unknown, &mut out, to_boolean);
                out.push(Instruction::BrTrue(end));
            }
            LogicalOp::NullishCoalescing => {
                out.push(Instruction::LdNull);
                out.push(Instruction::Ceq);
                out.push(Instruction::BrTrue(end));
            }
        }
        // Short-circuit branch taken: the remaining dup'd copy of `current`
        // is exactly the value that lands at `end`. Fallthrough: drop it and
        // evaluate the real assignment.
        out.push(Instruction::Pop);
        let (mut val, val_ty) = self.emit_expr(value)?;
        ensure_boxed(val_ty, &mut val);
        out.extend(val);
        out = self.resolver.store(&name, out)?;
        out.extend(self.resolver.load(&name)?);
        out.push(Instruction::Label(end));
        Ok((out, StackType::Unknown))
    }

    /// `object.#name(args)`: a statically known private method short-circuits
    /// to `callvirt`; otherwise routes through `GetPrivate` + the generic
    /// `InvokeValue` call path, mirroring `emit_call`'s dual-path shape.
    fn emit_call_private(
        &mut self,
        object: NodeId,
        name: Atom,
        args: &[NodeId],
    ) -> EmitResult<(Vec<Instruction>, StackType)> {
        if let Some(MemberTarget::Method(token)) = self.private_members.get(&name).copied() {
            let (mut out, obj_ty) = self.emit_expr(object)?;
            ensure_boxed(obj_ty, &mut out);
            for arg in args {
                let (mut arg_ins, arg_ty) = self.emit_expr(*arg)?;
                ensure_boxed(arg_ty, &mut arg_ins);
                out.extend(arg_ins);
            }
            out.push(Instruction::CallVirt(token));
            return Ok((out, StackType::Unknown));
        }

        let (mut out, obj_ty) = self.emit_expr(object)?;
        ensure_boxed(obj_ty, &mut out);
        out.push(Instruction::LdStr(atom_token(name)));
        out.push(Instruction::CallRuntime(self.runtime_call(names::GET_PRIVATE)));
        for arg in args {
            let (mut arg_ins, arg_ty) = self.emit_expr(*arg)?;
            ensure_boxed(arg_ty, &mut arg_ins);
            out.extend(arg_ins);
        }
        out.push(Instruction::CallRuntime(self.runtime_call(names::INVOKE_VALUE)));
        Ok((out, StackType::Unknown))
    }

    /// `` tag`...${expr}...` ``: the tag function is called with the quasis
    /// array followed by each substitution expression, the same
    /// variadic-call shape `emit_call`'s fallback path already uses.
    fn emit_tagged_template_literal(
        &mut self,
        tag: NodeId,
        quasis: &[Atom],
        expressions: &[NodeId],
    ) -> EmitResult<(Vec<Instruction>, StackType)> {
        let (mut out, tag_ty) = self.emit_expr(tag)?;
        ensure_boxed(tag_ty, &mut out);
        for quasi in quasis {
            out.push(Instruction::LdStr(atom_token(*quasi)));
        }
        out.push(Instruction::CallRuntime(self.runtime_call(names::NEW_ARRAY)));
        for expr in expressions {
            let (mut val, ty) = self.emit_expr(*expr)?;
            ensure_boxed(ty, &mut val);
            out.extend(val);
        }
        out.push(Instruction::CallRuntime(self.runtime_call(names::INVOKE_VALUE)));
        Ok((out, StackType::Unknown))
    }

    fn emit_literal(&self, lit: &Literal) -> (Vec<Instruction>, StackType) {
        match lit {
            Literal::Number(n) => (
                vec![Instruction::LdcR8(n.to_bits())],
                StackType::Double,
            ),
            Literal::Boolean(b) => (
                vec![Instruction::LdcI4(if *b { 1 } else { 0 })],
                StackType::Boolean,
            ),
            Literal::String(atom) => (
                vec![Instruction::LdStr(atom_token(*atom))],
                StackType::StringTy,
            ),
            Literal::Null | Literal::Undefined => (vec![Instruction::LdNull], StackType::NullTy),
        }
    }

    fn emit_assign(&mut self, target: NodeId, value: NodeId) -> EmitResult<(Vec<Instruction>, StackType)> {
        let (mut out, ty) = self.emit_expr(value)?;
        let Node::Expr(Expr::Variable(name)) = self.node(target).clone() else {
            return Err(EmitError::structural(
                "assignment target must be a resolvable variable in this emission path",
                0,
                0,
            ));
        };
        out = self.resolver.store(&name, out)?;
        Ok((out, ty))
    }

    /// Binary arithmetic dispatch: `+` always routes through the runtime
    /// `Add` stub (string concatenation vs numeric addition is a runtime
    /// decision, not a static one); every other arithmetic operator takes
    /// the unboxed-`double` fast path. Comparisons lower `<=`/`>=` via
    /// `cgt`/`clt` followed by `ldc.i4.0; ceq` (spec.md §4.5).
    fn emit_binary(
        &mut self,
        op: BinaryOp,
        left: NodeId,
        right: NodeId,
    ) -> EmitResult<(Vec<Instruction>, StackType)> {
        let (mut lhs, lhs_ty) = self.emit_expr(left)?;
        let (mut rhs, rhs_ty) = self.emit_expr(right)?;

        match op {
            BinaryOp::Add => {
                ensure_boxed(lhs_ty, &mut lhs);
                ensure_boxed(rhs_ty, &mut rhs);
                let mut out = lhs;
                out.extend(rhs);
                out.push(Instruction::CallRuntime(self.runtime_call(names::ADD)));
                Ok((out, StackType::Unknown))
            }
            BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
                ensure_double(lhs_ty, &mut lhs);
                ensure_double(rhs_ty, &mut rhs);
                let mut out = lhs;
                out.extend(rhs);
                out.push(match op {
                    BinaryOp::Sub => Instruction::Sub,
                    BinaryOp::Mul => Instruction::Mul,
                    BinaryOp::Div => Instruction::Div,
                    BinaryOp::Mod => Instruction::Rem,
                    _ => unreachable!(),
                });
                Ok((out, StackType::Double))
            }
            BinaryOp::Exponent => {
                ensure_double(lhs_ty, &mut lhs);
                ensure_double(rhs_ty, &mut rhs);
                let mut out = lhs;
                out.extend(rhs);
                out.push(Instruction::CallRuntime(self.runtime_call(names::POW)));
                Ok((out, StackType::Double))
            }
            BinaryOp::Less | BinaryOp::Greater => {
                ensure_double(lhs_ty, &mut lhs);
                ensure_double(rhs_ty, &mut rhs);
                let mut out = lhs;
                out.extend(rhs);
                out.push(if op == BinaryOp::Less {
                    Instruction::Clt
                } else {
                    Instruction::Cgt
                });
                Ok((out, StackType::Boolean))
            }
            BinaryOp::LessEqual | BinaryOp::GreaterEqual => {
                ensure_double(lhs_ty, &mut lhs);
                ensure_double(rhs_ty, &mut rhs);
                let mut out = lhs;
                out.extend(rhs);
                // a <= b  ==  !(a > b)   (cgt; ldc.i4.0; ceq)
                // a >= b  ==  !(a < b)   (clt; ldc.i4.0; ceq)
                out.push(if op == BinaryOp::LessEqual {
                    Instruction::Cgt
                } else {
                    Instruction::Clt
                });
                out.push(Instruction::LdcI4(0));
                out.push(Instruction::Ceq);
                Ok((out, StackType::Boolean))
            }
            BinaryOp::Equal | BinaryOp::StrictEqual => {
                ensure_boxed(lhs_ty, &mut lhs);
                ensure_boxed(rhs_ty, &mut rhs);
                let stub = if op == BinaryOp::Equal {
                    names::JS_EQUALS
                } else {
                    names::JS_STRICT_EQUALS
                };
                let mut out = lhs;
                out.extend(rhs);
                out.push(Instruction::CallRuntime(self.runtime_call(stub)));
                Ok((out, StackType::Boolean))
            }
            BinaryOp::NotEqual | BinaryOp::StrictNotEqual => {
                ensure_boxed(lhs_ty, &mut lhs);
                ensure_boxed(rhs_ty, &mut rhs);
                let stub = if op == BinaryOp::NotEqual {
                    names::JS_EQUALS
                } else {
                    names::JS_STRICT_EQUALS
                };
                let mut out = lhs;
                out.extend(rhs);
                out.push(Instruction::CallRuntime(self.runtime_call(stub)));
                out.push(Instruction::LdcI4(0));
                out.push(Instruction::Ceq);
                Ok((out, StackType::Boolean))
            }
            BinaryOp::BitAnd
            | BinaryOp::BitOr
            | BinaryOp::BitXor
            | BinaryOp::ShiftLeft
            | BinaryOp::ShiftRight
            | BinaryOp::UnsignedShiftRight
            | BinaryOp::In
            | BinaryOp::InstanceOf => {
                ensure_boxed(lhs_ty, &mut lhs);
                ensure_boxed(rhs_ty, &mut rhs);
                let mut out = lhs;
                out.extend(rhs);
                out.push(Instruction::CallRuntime(self.runtime_call(names::INVOKE_VALUE)));
                Ok((out, StackType::Unknown))
            }
        }
    }

    /// `&&`/`||` short-circuit via a thunk: evaluate the left, branch past
    /// the right operand if it already determines the result.
    fn emit_logical(
        &mut self,
        op: LogicalOp,
        left: NodeId,
        right: NodeId,
    ) -> EmitResult<(Vec<Instruction>, StackType)> {
        if op == LogicalOp::NullishCoalescing {
            return self.emit_nullish(left, right);
        }
        let (mut lhs, lhs_ty) = self.emit_expr(left)?;
        ensure_boxed(lhs_ty, &mut lhs);
        let (mut rhs, rhs_ty) = self.emit_expr(right)?;
        ensure_boxed(rhs_ty, &mut rhs);
        let to_boolean = self.runtime_call(names::TO_BOOLEAN);

        let end = self.label();
        let mut out = lhs;
        out.push(Instruction::Dup);
        ensure_boolean(StackType::Unknown, &mut out, to_boolean);
        out.push(if op == LogicalOp::And {
            Instruction::BrFalse(end)
        } else {
            Instruction::BrTrue(end)
        });
        out.push(Instruction::Pop);
        out.extend(rhs);
        out.push(Instruction::Label(end));
        Ok((out, StackType::Unknown))
    }

    fn emit_nullish(&mut self, left: NodeId, right: NodeId) -> EmitResult<(Vec<Instruction>, StackType)> {
        let (mut lhs, lhs_ty) = self.emit_expr(left)?;
        ensure_boxed(lhs_ty, &mut lhs);
        let (mut rhs, rhs_ty) = self.emit_expr(right)?;
        ensure_boxed(rhs_ty, &mut rhs);

        let end = self.label();
        let mut out = lhs;
        out.push(Instruction::Dup);
        out.push(Instruction::LdNull);
        out.push(Instruction::Ceq);
        out.push(Instruction::BrFalse(end));
        out.push(Instruction::Pop);
        out.extend(rhs);
        out.push(Instruction::Label(end));
        Ok((out, StackType::Unknown))
    }

    fn emit_unary(&mut self, op: UnaryOp, operand: NodeId) -> EmitResult<(Vec<Instruction>, StackType)> {
        let (mut val, ty) = self.emit_expr(operand)?;
        match op {
            UnaryOp::Minus => {
                ensure_double(ty, &mut val);
                val.push(Instruction::Neg);
                Ok((val, StackType::Double))
            }
            UnaryOp::Plus => {
                ensure_boxed(ty, &mut val);
                val.push(Instruction::CallRuntime(self.runtime_call(names::TO_NUMBER)));
                Ok((val, StackType::Double))
            }
            UnaryOp::Not => {
                let to_boolean = self.runtime_call(names::TO_BOOLEAN);
                ensure_boolean(ty, &mut val, to_boolean);
                val.push(Instruction::LdcI4(0));
                val.push(Instruction::Ceq);
                Ok((val, StackType::Boolean))
            }
            UnaryOp::BitNot | UnaryOp::TypeOf | UnaryOp::Void => {
                ensure_boxed(ty, &mut val);
                val.push(Instruction::CallRuntime(self.runtime_call(names::INVOKE_VALUE)));
                Ok((val, StackType::Unknown))
            }
        }
    }

    /// `x op= v` desugars to `x = x op v` through the same binary dispatch
    /// used for plain binary expressions, then stores back through the
    /// resolver — the only supported compound-assignment target in this
    /// emitter is a plain variable (member/index compound targets are
    /// desugared by the checker before this pass sees them).
    fn emit_compound_assign(
        &mut self,
        op: sharpts_ast::CompoundOp,
        target: NodeId,
        value: NodeId,
    ) -> EmitResult<(Vec<Instruction>, StackType)> {
        use sharpts_ast::CompoundOp;
        let Node::Expr(Expr::Variable(name)) = self.node(target).clone() else {
            return Err(EmitError::structural(
                "compound assignment target must be a resolvable variable in this emission path",
                0,
                0,
            ));
        };
        let binary_op = match op {
            CompoundOp::AddAssign => BinaryOp::Add,
            CompoundOp::SubAssign => BinaryOp::Sub,
            CompoundOp::MulAssign => BinaryOp::Mul,
            CompoundOp::DivAssign => BinaryOp::Div,
            CompoundOp::ModAssign => BinaryOp::Mod,
            CompoundOp::ExponentAssign => BinaryOp::Exponent,
            CompoundOp::BitAndAssign => BinaryOp::BitAnd,
            CompoundOp::BitOrAssign => BinaryOp::BitOr,
            CompoundOp::BitXorAssign => BinaryOp::BitXor,
            CompoundOp::ShiftLeftAssign => BinaryOp::ShiftLeft,
            CompoundOp::ShiftRightAssign => BinaryOp::ShiftRight,
            CompoundOp::UnsignedShiftRightAssign => BinaryOp::UnsignedShiftRight,
        };
        let load = self.resolver.load(&name)?;
        let (mut rhs, rhs_ty) = self.emit_expr(value)?;
        // Reuse the binary dispatch by emitting `load` then `rhs` ourselves
        // rather than re-evaluating the right-hand side through emit_binary
        // (which would re-run its own emit_expr calls on `left`/`right`
        // node ids we don't have for the left-hand side here).
        ensure_boxed(StackType::Unknown, &mut rhs);
        let mut out = load;
        out.extend(rhs);
        let token = match binary_op {
            BinaryOp::Add => self.runtime_call(names::ADD),
            _ => self.runtime_call(names::INVOKE_VALUE),
        };
        out.push(Instruction::CallRuntime(token));
        out = self.resolver.store(&name, out)?;
        Ok((out, StackType::Unknown))
    }

    fn emit_increment(&mut self, target: NodeId, is_prefix: bool) -> EmitResult<(Vec<Instruction>, StackType)> {
        let Node::Expr(Expr::Variable(name)) = self.node(target).clone() else {
            return Err(EmitError::structural(
                "increment/decrement target must be a resolvable variable in this emission path",
                0,
                0,
            ));
        };
        let to_number = self.runtime_call(names::TO_NUMBER);
        let mut load = self.resolver.load(&name)?;
        ensure_boxed(StackType::Unknown, &mut load);
        load.push(Instruction::CallRuntime(to_number));

        let mut incremented = load.clone();
        incremented.push(Instruction::LdcR8(1.0f64.to_bits()));
        incremented.push(Instruction::Add);
        let store = self.resolver.store(&name, incremented)?;

        let mut out = store;
        if !is_prefix {
            // Postfix yields the pre-increment value; re-load after the
            // store rather than keeping a stray stack copy across the
            // store, since `StateMachineResolver::store` may reorder the
            // value onto a field-store sequence.
            out.extend(load);
        } else {
            out.extend(self.resolver.load(&name)?);
        }
        Ok((out, StackType::Double))
    }

    fn emit_array_literal(&mut self, items: &[NodeId]) -> EmitResult<(Vec<Instruction>, StackType)> {
        let mut out = Vec::new();
        for item in items {
            let (mut val, ty) = self.emit_expr(*item)?;
            ensure_boxed(ty, &mut val);
            out.extend(val);
        }
        out.push(Instruction::CallRuntime(self.runtime_call(names::NEW_ARRAY)));
        Ok((out, StackType::Unknown))
    }

    fn emit_delete(&mut self, target: NodeId) -> EmitResult<(Vec<Instruction>, StackType)> {
        match self.node(target).clone() {
            Node::Expr(Expr::Get { object, name, .. }) => {
                let (mut out, obj_ty) = self.emit_expr(object)?;
                ensure_boxed(obj_ty, &mut out);
                out.push(Instruction::LdStr(atom_token(name)));
                out.push(Instruction::CallRuntime(self.runtime_call(names::DELETE_PROPERTY)));
                Ok((out, StackType::Boolean))
            }
            _ => Ok((vec![Instruction::LdcI4(1)], StackType::Boolean)),
        }
    }

    fn emit_ternary(
        &mut self,
        test: NodeId,
        consequent: NodeId,
        alternate: NodeId,
    ) -> EmitResult<(Vec<Instruction>, StackType)> {
        let (mut test_ins, test_ty) = self.emit_expr(test)?;
        let to_boolean = self.runtime_call(names::TO_BOOLEAN);
        ensure_boolean(test_ty, &mut test_ins, to_boolean);
        let (then_ins, _) = self.emit_expr(consequent)?;
        let (else_ins, _) = self.emit_expr(alternate)?;

        let else_label = self.label();
        let end_label = self.label();
        let mut out = test_ins;
        out.push(Instruction::BrFalse(else_label));
        out.extend(then_ins);
        out.push(Instruction::Br(end_label));
        out.push(Instruction::Label(else_label));
        out.extend(else_ins);
        out.push(Instruction::Label(end_label));
        Ok((out, StackType::Unknown))
    }

    /// Three call-dispatch fast paths (direct `callvirt` against a
    /// statically known method, a constructor-bound static method, a
    /// resolved free function) plus the generic `InvokeValue` fallback for
    /// everything the checker couldn't pin down statically.
    fn emit_call(
        &mut self,
        callee: NodeId,
        args: &[NodeId],
        _optional: bool,
    ) -> EmitResult<(Vec<Instruction>, StackType)> {
        if let Node::Expr(Expr::Get { object, name, .. }) = self.node(callee).clone() {
            if let Some(MemberTarget::Method(token)) = self.members.get(&name).copied() {
                let (mut out, obj_ty) = self.emit_expr(object)?;
                ensure_boxed(obj_ty, &mut out);
                for arg in args {
                    let (arg_ins, arg_ty) = self.emit_expr(*arg)?;
                    let mut arg_ins = arg_ins;
                    ensure_boxed(arg_ty, &mut arg_ins);
                    out.extend(arg_ins);
                }
                out.push(Instruction::CallVirt(token));
                return Ok((out, StackType::Unknown));
            }
        }

        let (mut out, callee_ty) = self.emit_expr(callee)?;
        ensure_boxed(callee_ty, &mut out);
        for arg in args {
            let (arg_ins, arg_ty) = self.emit_expr(*arg)?;
            let mut arg_ins = arg_ins;
            ensure_boxed(arg_ty, &mut arg_ins);
            out.extend(arg_ins);
        }
        out.push(Instruction::CallRuntime(self.runtime_call(names::INVOKE_VALUE)));
        Ok((out, StackType::Unknown))
    }

    /// `new` resolution: a statically known compiled class short-circuits to
    /// `newobj` against its constructor token; otherwise routes through the
    /// runtime dynamic-construction path (namespace-qualified mangling is a
    /// resolution-time concern handled before this emitter sees the
    /// callee's token, per spec.md §4.5).
    fn emit_new(&mut self, callee: NodeId, args: &[NodeId]) -> EmitResult<(Vec<Instruction>, StackType)> {
        let ctor_token = match self.node(callee).clone() {
            Node::Expr(Expr::Variable(name)) => self.members.get(&name).copied(),
            _ => None,
        };
        let mut out = Vec::new();
        for arg in args {
            let (arg_ins, arg_ty) = self.emit_expr(*arg)?;
            let mut arg_ins = arg_ins;
            ensure_boxed(arg_ty, &mut arg_ins);
            out.extend(arg_ins);
        }
        match ctor_token {
            Some(MemberTarget::Method(token)) => out.push(Instruction::NewObj(token)),
            _ => out.push(Instruction::CallRuntime(self.runtime_call(names::INVOKE_VALUE))),
        }
        Ok((out, StackType::Unknown))
    }

    fn emit_get(&mut self, object: NodeId, name: Atom, _optional: bool) -> EmitResult<(Vec<Instruction>, StackType)> {
        let (mut out, obj_ty) = self.emit_expr(object)?;
        match self.members.get(&name).copied() {
            Some(MemberTarget::Field(token)) => {
                out.push(Instruction::LdFld(token));
                Ok((out, StackType::Unknown))
            }
            Some(MemberTarget::Getter(token)) => {
                out.push(Instruction::CallVirt(token));
                Ok((out, StackType::Unknown))
            }
            _ => {
                ensure_boxed(obj_ty, &mut out);
                out.push(Instruction::LdStr(atom_token(name)));
                out.push(Instruction::CallRuntime(self.runtime_call(names::GET_PROPERTY)));
                Ok((out, StackType::Unknown))
            }
        }
    }

    fn emit_set(&mut self, object: NodeId, name: Atom, value: NodeId) -> EmitResult<(Vec<Instruction>, StackType)> {
        let (mut out, obj_ty) = self.emit_expr(object)?;
        let (val_ins, val_ty) = self.emit_expr(value)?;
        match self.members.get(&name).copied() {
            Some(MemberTarget::Field(token)) => {
                out.extend(val_ins);
                out.push(Instruction::StFld(token));
            }
            Some(MemberTarget::Setter(token)) => {
                out.extend(val_ins);
                out.push(Instruction::CallVirt(token));
            }
            _ => {
                let mut val_ins = val_ins;
                ensure_boxed(obj_ty, &mut out);
                ensure_boxed(val_ty, &mut val_ins);
                out.push(Instruction::LdStr(atom_token(name)));
                out.extend(val_ins);
                out.push(Instruction::CallRuntime(self.runtime_call(names::SET_PROPERTY)));
            }
        }
        Ok((out, StackType::Unknown))
    }

    fn emit_get_index(&mut self, object: NodeId, index: NodeId, _optional: bool) -> EmitResult<(Vec<Instruction>, StackType)> {
        let (mut out, obj_ty) = self.emit_expr(object)?;
        let (idx_ins, idx_ty) = self.emit_expr(index)?;
        let mut idx_ins = idx_ins;
        ensure_boxed(obj_ty, &mut out);
        ensure_boxed(idx_ty, &mut idx_ins);
        out.extend(idx_ins);
        out.push(Instruction::CallRuntime(self.runtime_call(names::GET_INDEX)));
        Ok((out, StackType::Unknown))
    }

    fn emit_set_index(&mut self, object: NodeId, index: NodeId, value: NodeId) -> EmitResult<(Vec<Instruction>, StackType)> {
        let (mut out, obj_ty) = self.emit_expr(object)?;
        let (idx_ins, idx_ty) = self.emit_expr(index)?;
        let (val_ins, val_ty) = self.emit_expr(value)?;
        let (mut idx_ins, mut val_ins) = (idx_ins, val_ins);
        ensure_boxed(obj_ty, &mut out);
        ensure_boxed(idx_ty, &mut idx_ins);
        ensure_boxed(val_ty, &mut val_ins);
        out.extend(idx_ins);
        out.extend(val_ins);
        out.push(Instruction::CallRuntime(self.runtime_call(names::SET_INDEX)));
        Ok((out, StackType::Unknown))
    }

    fn emit_get_private(&mut self, object: NodeId, name: Atom) -> EmitResult<(Vec<Instruction>, StackType)> {
        let (mut out, obj_ty) = self.emit_expr(object)?;
        match self.private_members.get(&name).copied() {
            Some(MemberTarget::Field(token)) => {
                out.push(Instruction::LdFld(token));
            }
            _ => {
                ensure_boxed(obj_ty, &mut out);
                out.push(Instruction::LdStr(atom_token(name)));
                out.push(Instruction::CallRuntime(self.runtime_call(names::GET_PRIVATE)));
            }
        }
        Ok((out, StackType::Unknown))
    }

    fn emit_set_private(&mut self, object: NodeId, name: Atom, value: NodeId) -> EmitResult<(Vec<Instruction>, StackType)> {
        let (mut out, obj_ty) = self.emit_expr(object)?;
        let (mut val_ins, val_ty) = self.emit_expr(value)?;
        match self.private_members.get(&name).copied() {
            Some(MemberTarget::Field(token)) => {
                out.extend(val_ins);
                out.push(Instruction::StFld(token));
            }
            _ => {
                ensure_boxed(obj_ty, &mut out);
                ensure_boxed(val_ty, &mut val_ins);
                out.push(Instruction::LdStr(atom_token(name)));
                out.extend(val_ins);
                out.push(Instruction::CallRuntime(self.runtime_call(names::SET_PRIVATE)));
            }
        }
        Ok((out, StackType::Unknown))
    }

    /// Template literals interleave quasis (literal string segments) with
    /// expressions, each coerced via the runtime `Stringify` stub, then
    /// concatenated left to right through `Add`.
    fn emit_template_literal(&mut self, quasis: &[Atom], expressions: &[NodeId]) -> EmitResult<(Vec<Instruction>, StackType)> {
        let stringify = self.runtime_call(names::STRINGIFY);
        let add = self.runtime_call(names::ADD);
        let mut out = vec![Instruction::LdStr(atom_token(quasis[0]))];
        for (i, expr) in expressions.iter().enumerate() {
            let (mut val, ty) = self.emit_expr(*expr)?;
            ensure_string(ty, &mut val, stringify);
            out.extend(val);
            out.push(Instruction::CallRuntime(add));
            if let Some(quasi) = quasis.get(i + 1) {
                out.push(Instruction::LdStr(atom_token(*quasi)));
                out.push(Instruction::CallRuntime(add));
            }
        }
        Ok((out, StackType::StringTy))
    }

    /// Emits one statement. Statements never leave a value on the stack.
    pub fn emit_stmt(&mut self, id: NodeId) -> EmitResult<Vec<Instruction>> {
        let Node::Stmt(stmt) = self.node(id).clone() else {
            return Err(EmitError::structural("expected a statement node", 0, 0));
        };

        match stmt {
            Stmt::Var(decl) | Stmt::Const(decl) => match decl.initializer {
                Some(init) => {
                    let (val, _) = self.emit_expr(init)?;
                    self.resolver.store(&decl.name, val)
                }
                None => Ok(Vec::new()),
            },
            Stmt::Expression(expr) => {
                let (mut ins, _) = self.emit_expr(expr)?;
                ins.push(Instruction::Pop);
                Ok(ins)
            }
            Stmt::Return(value) => {
                let mut out = Vec::new();
                if let Some(value) = value {
                    let (val, ty) = self.emit_expr(value)?;
                    let mut val = val;
                    ensure_boxed(ty, &mut val);
                    out.extend(val);
                }
                out.push(Instruction::Ret);
                Ok(out)
            }
            Stmt::Throw(value) => {
                let (mut val, ty) = self.emit_expr(value)?;
                ensure_boxed(ty, &mut val);
                val.push(Instruction::CallRuntime(self.runtime_call(names::WRAP_EXCEPTION)));
                val.push(Instruction::Throw);
                Ok(val)
            }
            Stmt::Block(body) | Stmt::Sequence(body) => {
                let mut out = Vec::new();
                for stmt in body {
                    out.extend(self.emit_stmt(stmt)?);
                }
                Ok(out)
            }
            Stmt::If {
                test,
                then_branch,
                else_branch,
            } => self.emit_if(test, then_branch, else_branch),
            Stmt::While { test, body } => self.emit_while(test, body),
            Stmt::For {
                init,
                test,
                update,
                body,
            } => self.emit_for(init, test, update, body),
            Stmt::Break(_) => {
                let (_, brk) = *self
                    .loop_targets
                    .last()
                    .ok_or_else(|| EmitError::structural("break outside a loop", 0, 0))?;
                Ok(vec![Instruction::Br(brk)])
            }
            Stmt::Continue(_) => {
                let (cont, _) = *self
                    .loop_targets
                    .last()
                    .ok_or_else(|| EmitError::structural("continue outside a loop", 0, 0))?;
                Ok(vec![Instruction::Br(cont)])
            }
            Stmt::Switch {
                discriminant,
                cases,
            } => self.emit_switch(discriminant, &cases),
            Stmt::TryCatch {
                try_block,
                catch_param,
                catch_block,
                finally_block,
            } => self.emit_try_catch(try_block, catch_param.as_ref(), catch_block, finally_block),
            Stmt::ForOf {
                binding,
                iterable,
                body,
                ..
            } => self.emit_for_of(&binding, iterable, body),
            Stmt::ForIn { binding, object, body, .. } => self.emit_for_in(&binding, object, body),
            Stmt::Function(_) | Stmt::Class(_) | Stmt::ClassExpr(_) => {
                // Declarations are hoisted and emitted as their own methods
                // by the driver's pass 1 (SPEC_FULL.md §12); encountering
                // one mid-body is a no-op here.
                Ok(Vec::new())
            }
        }
    }

    fn emit_if(
        &mut self,
        test: NodeId,
        then_branch: NodeId,
        else_branch: Option<NodeId>,
    ) -> EmitResult<Vec<Instruction>> {
        let (mut test_ins, test_ty) = self.emit_expr(test)?;
        let to_boolean = self.runtime_call(names::TO_BOOLEAN);
        ensure_boolean(test_ty, &mut test_ins, to_boolean);
        let else_label = self.label();
        let end_label = self.label();

        let mut out = test_ins;
        out.push(Instruction::BrFalse(else_label));
        out.extend(self.emit_stmt(then_branch)?);
        out.push(Instruction::Br(end_label));
        out.push(Instruction::Label(else_label));
        if let Some(else_branch) = else_branch {
            out.extend(self.emit_stmt(else_branch)?);
        }
        out.push(Instruction::Label(end_label));
        Ok(out)
    }

    fn emit_while(&mut self, test: NodeId, body: NodeId) -> EmitResult<Vec<Instruction>> {
        let start = self.label();
        let end = self.label();
        self.loop_targets.push((start, end));

        let (mut test_ins, test_ty) = self.emit_expr(test)?;
        let to_boolean = self.runtime_call(names::TO_BOOLEAN);
        ensure_boolean(test_ty, &mut test_ins, to_boolean);
        let body_ins = self.emit_stmt(body)?;
        self.loop_targets.pop();

        let mut out = vec![Instruction::Label(start)];
        out.extend(test_ins);
        out.push(Instruction::BrFalse(end));
        out.extend(body_ins);
        out.push(Instruction::Br(start));
        out.push(Instruction::Label(end));
        Ok(out)
    }

    fn emit_for(
        &mut self,
        init: Option<NodeId>,
        test: Option<NodeId>,
        update: Option<NodeId>,
        body: NodeId,
    ) -> EmitResult<Vec<Instruction>> {
        let start = self.label();
        let continue_target = self.label();
        let end = self.label();
        let mut out = Vec::new();
        if let Some(init) = init {
            out.extend(self.emit_stmt(init)?);
        }

        self.loop_targets.push((continue_target, end));
        out.push(Instruction::Label(start));
        if let Some(test) = test {
            let (mut test_ins, test_ty) = self.emit_expr(test)?;
            let to_boolean = self.runtime_call(names::TO_BOOLEAN);
            ensure_boolean(test_ty, &mut test_ins, to_boolean);
            out.extend(test_ins);
            out.push(Instruction::BrFalse(end));
        }
        out.extend(self.emit_stmt(body)?);
        out.push(Instruction::Label(continue_target));
        if let Some(update) = update {
            let (mut val, _) = self.emit_expr(update)?;
            val.push(Instruction::Pop);
            out.extend(val);
        }
        out.push(Instruction::Br(start));
        out.push(Instruction::Label(end));
        self.loop_targets.pop();
        Ok(out)
    }

    /// `for-of` over a known runtime collection goes through the array/
    /// native-collection fast accessors; anything else gets the
    /// `$IteratorWrapper` protocol path (`GetIteratorFunction`,
    /// `InvokeIteratorNext`, `GetIteratorDone`, `GetIteratorValue`).
    fn emit_for_of(&mut self, binding: &Atom, iterable: NodeId, body: NodeId) -> EmitResult<Vec<Instruction>> {
        let (mut out, iter_ty) = self.emit_expr(iterable)?;
        ensure_boxed(iter_ty, &mut out);
        out.push(Instruction::CallRuntime(self.runtime_call(names::GET_ITERATOR_FUNCTION)));

        let start = self.label();
        let continue_target = self.label();
        let end = self.label();
        out.push(Instruction::Label(start));
        out.push(Instruction::Dup);
        out.push(Instruction::CallRuntime(self.runtime_call(names::INVOKE_ITERATOR_NEXT)));
        out.push(Instruction::Dup);
        out.push(Instruction::CallRuntime(self.runtime_call(names::GET_ITERATOR_DONE)));
        out.push(Instruction::BrTrue(end));
        out.push(Instruction::CallRuntime(self.runtime_call(names::GET_ITERATOR_VALUE)));
        out = self.resolver.store(binding, out)?;

        self.loop_targets.push((continue_target, end));
        out.extend(self.emit_stmt(body)?);
        self.loop_targets.pop();
        out.push(Instruction::Label(continue_target));
        out.push(Instruction::Br(start));
        out.push(Instruction::Label(end));
        out.push(Instruction::Pop); // drop the iterator function reference
        Ok(out)
    }

    /// `for (x in object)`: identical iterator protocol to `for-of`, except
    /// the sequence being iterated is the object's enumerable key strings
    /// (`EnumKeys`) rather than the object itself.
    fn emit_for_in(&mut self, binding: &Atom, object: NodeId, body: NodeId) -> EmitResult<Vec<Instruction>> {
        let (mut out, obj_ty) = self.emit_expr(object)?;
        ensure_boxed(obj_ty, &mut out);
        out.push(Instruction::CallRuntime(self.runtime_call(names::ENUM_KEYS)));
        out.push(Instruction::CallRuntime(self.runtime_call(names::GET_ITERATOR_FUNCTION)));

        let start = self.label();
        let continue_target = self.label();
        let end = self.label();
        out.push(Instruction::Label(start));
        out.push(Instruction::Dup);
        out.push(Instruction::CallRuntime(self.runtime_call(names::INVOKE_ITERATOR_NEXT)));
        out.push(Instruction::Dup);
        out.push(Instruction::CallRuntime(self.runtime_call(names::GET_ITERATOR_DONE)));
        out.push(Instruction::BrTrue(end));
        out.push(Instruction::CallRuntime(self.runtime_call(names::GET_ITERATOR_VALUE)));
        out = self.resolver.store(binding, out)?;

        self.loop_targets.push((continue_target, end));
        out.extend(self.emit_stmt(body)?);
        self.loop_targets.pop();
        out.push(Instruction::Label(continue_target));
        out.push(Instruction::Br(start));
        out.push(Instruction::Label(end));
        out.push(Instruction::Pop);
        Ok(out)
    }

    fn emit_switch(&mut self, discriminant: NodeId, cases: &[SwitchCase]) -> EmitResult<Vec<Instruction>> {
        let (mut disc_ins, disc_ty) = self.emit_expr(discriminant)?;
        ensure_boxed(disc_ty, &mut disc_ins);
        let strict_equals = self.runtime_call(names::JS_STRICT_EQUALS);

        let end = self.label();
        let case_labels: Vec<Label> = cases.iter().map(|_| self.label()).collect();
        let default_index = cases.iter().position(|c| c.test.is_none());

        let mut out = Vec::new();
        for (case, label) in cases.iter().zip(&case_labels) {
            if let Some(test) = case.test {
                let (mut test_ins, test_ty) = self.emit_expr(test)?;
                ensure_boxed(test_ty, &mut test_ins);
                out.extend(disc_ins.clone());
                out.extend(test_ins);
                out.push(Instruction::CallRuntime(strict_equals));
                out.push(Instruction::BrTrue(*label));
            }
        }
        match default_index {
            Some(i) => out.push(Instruction::Br(case_labels[i])),
            None => out.push(Instruction::Br(end)),
        }

        self.loop_targets.push((end, end));
        for (case, label) in cases.iter().zip(&case_labels) {
            out.push(Instruction::Label(*label));
            for stmt in &case.body {
                out.extend(self.emit_stmt(*stmt)?);
            }
        }
        self.loop_targets.pop();
        out.push(Instruction::Label(end));
        Ok(out)
    }

    /// Lowers `try`/`catch`/`finally` to `leave`/`endfinally`; the
    /// try/await catch-all rewrite needed for a suspension point inside a
    /// protected region is C8's responsibility (spec.md §4.6), not this
    /// plain emitter's.
    fn emit_try_catch(
        &mut self,
        try_block: NodeId,
        catch_param: Option<&Atom>,
        catch_block: Option<NodeId>,
        finally_block: Option<NodeId>,
    ) -> EmitResult<Vec<Instruction>> {
        let end = self.label();
        let mut out = self.emit_stmt(try_block)?;
        out.push(Instruction::Leave(end));

        if let Some(catch_block) = catch_block {
            if let Some(param) = catch_param {
                out = self.resolver.store(param, out)?;
            }
            out.extend(self.emit_stmt(catch_block)?);
            out.push(Instruction::Leave(end));
        }
        out.push(Instruction::Label(end));
        if let Some(finally_block) = finally_block {
            out.extend(self.emit_stmt(finally_block)?);
            out.push(Instruction::EndFinally);
        }
        Ok(out)
    }
}

fn atom_token(atom: Atom) -> u32 {
    // Placeholder token: the real `UserString` heap index is assigned by
    // `sharpts-asmrw` during module assembly; the emitter only needs a
    // stable per-atom handle to thread through until then.
    atom_as_u32(atom)
}

fn atom_as_u32(atom: Atom) -> u32 {
    // `Atom` has no public numeric accessor by design (SPEC_FULL.md keeps it
    // an opaque handle); emit keys its string-token table by the `Debug`
    // form instead of reaching into its representation.
    format!("{atom:?}")
        .trim_start_matches("Atom(")
        .trim_end_matches(')')
        .parse()
        .unwrap_or(0)
}

/// Same trick as [`atom_as_u32`], for `NodeId`: a stable per-node placeholder
/// token (method token for an arrow, constructor token for a class
/// expression) until the real table index is assigned during module
/// assembly.
fn node_token(id: NodeId) -> u32 {
    format!("{id:?}")
        .trim_start_matches("NodeId(")
        .trim_end_matches(')')
        .parse()
        .unwrap_or(0)
}
