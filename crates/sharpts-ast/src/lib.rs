//! Arena-indexed AST node types consumed by the compiler core.
//!
//! The real parser and type-checker are external collaborators (spec.md
//! §1 Non-goals); this crate defines the *stable shape* the rest of the
//! pipeline is written against: a single arena of nodes addressed by
//! [`NodeId`], exactly the representation spec.md §9's design notes call
//! for ("parse into a single arena of nodes and use `NodeId` keys for
//! every side table"). Every side table in `sharpts-closures`,
//! `sharpts-suspend`, and `sharpts-lowering` is keyed by `NodeId` rather
//! than by AST reference-equality, which is how the source system does it.

pub mod arena;
pub mod node;

pub use arena::{Arena, NodeId};
pub use node::{
    BinaryOp, ClassDecl, ClassMember, ClassMemberKind, CompoundOp, Expr, FunctionKind,
    FunctionLike, Literal, LogicalOp, Node, NodeList, ObjectProp, Param, PropertyKey, Stmt,
    SwitchCase, UnaryOp, VarDecl,
};

use sharpts_common::Span;

/// A node's payload plus its source span, the unit stored in [`Arena`].
#[derive(Debug, Clone)]
pub struct NodeData {
    pub span: Span,
    pub node: Node,
}
