//! Output data model for the suspension analyser (spec.md §4.2, expanded by
//! SPEC_FULL.md §4 with loop/switch nesting and the async-arrow table).

use rustc_hash::{FxHashMap, FxHashSet};
use sharpts_ast::NodeId;
use sharpts_closures::CaptureName;
use sharpts_common::Atom;

/// Dense `0..N-1` index assigned to one `await`/`yield` in program order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateIndex(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuspensionKind {
    Await,
    Yield,
    /// `yield` inside an async generator: the resume path additionally
    /// awaits the iterator-result promise before resuming (spec.md §4.6).
    AsyncYield,
}

/// One `await`/`yield` node and the bookkeeping the state-machine body
/// emitter (C8) needs to re-enter its surrounding control structures after
/// a resume.
#[derive(Debug, Clone)]
pub struct SuspensionPoint {
    pub node: NodeId,
    pub index: StateIndex,
    pub kind: SuspensionKind,
    pub try_depth: u32,
    pub loop_depth: u32,
    pub switch_depth: u32,
}

/// A nested async arrow found while walking an async function's body.
/// `nesting_level` is 1 for an arrow directly inside the analysed function,
/// 2 for one nested inside that arrow, and so on; `parent_arrow` is `None`
/// when the immediate enclosing async scope is the function itself rather
/// than another async arrow.
#[derive(Debug, Clone)]
pub struct AsyncArrowInfo {
    pub arrow_id: NodeId,
    pub captured: Vec<CaptureName>,
    pub nesting_level: u32,
    pub parent_arrow: Option<NodeId>,
}

/// Result of running the suspension analyser over one async/generator body.
#[derive(Debug, Clone, Default)]
pub struct SuspensionTable {
    points: Vec<SuspensionPoint>,
    by_node: FxHashMap<NodeId, StateIndex>,
    hoisted_locals: FxHashSet<Atom>,
    hoisted_params: Vec<Atom>,
    async_arrows: Vec<AsyncArrowInfo>,
}

impl SuspensionTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[SuspensionPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn index_of(&self, node: NodeId) -> Option<StateIndex> {
        self.by_node.get(&node).copied()
    }

    pub fn is_hoisted(&self, name: &Atom) -> bool {
        self.hoisted_locals.contains(name) || self.hoisted_params.contains(name)
    }

    pub fn hoisted_locals(&self) -> impl Iterator<Item = &Atom> {
        self.hoisted_locals.iter()
    }

    pub fn hoisted_params(&self) -> &[Atom] {
        &self.hoisted_params
    }

    pub fn async_arrows(&self) -> &[AsyncArrowInfo] {
        &self.async_arrows
    }

    pub(crate) fn push_point(&mut self, point: SuspensionPoint) {
        self.by_node.insert(point.node, point.index);
        self.points.push(point);
    }

    pub(crate) fn mark_hoisted(&mut self, name: Atom) {
        self.hoisted_locals.insert(name);
    }

    pub(crate) fn set_hoisted_params(&mut self, params: Vec<Atom>) {
        self.hoisted_params = params;
    }

    pub(crate) fn push_async_arrow(&mut self, info: AsyncArrowInfo) {
        self.async_arrows.push(info);
    }
}
