//! [`RuntimeDescriptor`]: the content-addressed handle table the bytecode
//! emitter (`sharpts-emit`) uses to call runtime helpers by well-known name
//! instead of hard-coding a metadata token (spec.md §4.9).

use rustc_hash::FxHashMap;

/// Opaque handle to one runtime helper method. Stable for the lifetime of a
/// [`RuntimeDescriptor`]; the assembly reference rewriter (C10) is what
/// turns these into real metadata tokens against a concrete runtime
/// assembly set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuntimeMethodRef(u32);

impl RuntimeMethodRef {
    /// The raw index into the descriptor's stub table. `sharpts-emit` carries
    /// this as a `CallRuntime` operand; `sharpts-asmrw` is what turns it into
    /// a real metadata token against the runtime assembly during rewriting.
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Arity/shape hint for a stub, used by the emitter to decide how many
/// values to push before calling it. Stubs with variable arity (the
/// object-array-packing fallback path, spec.md §4.5) are modelled as
/// [`Shape::Variadic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Fixed(u8),
    Variadic,
}

#[derive(Debug, Clone)]
struct StubInfo {
    name: &'static str,
    shape: Shape,
}

/// The registry of every runtime helper name the emitter is allowed to
/// reference. Building one is the job of [`crate::stub_emitter::emit_stubs`];
/// `sharpts-emit` only ever consults an already-built descriptor.
#[derive(Debug, Clone, Default)]
pub struct RuntimeDescriptor {
    by_name: FxHashMap<&'static str, RuntimeMethodRef>,
    stubs: Vec<StubInfo>,
}

impl RuntimeDescriptor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(&mut self, name: &'static str, shape: Shape) -> RuntimeMethodRef {
        let handle = RuntimeMethodRef(self.stubs.len() as u32);
        self.stubs.push(StubInfo { name, shape });
        self.by_name.insert(name, handle);
        handle
    }

    pub fn get(&self, name: &str) -> Option<RuntimeMethodRef> {
        self.by_name.get(name).copied()
    }

    /// Panics on an unknown name: every name the emitter passes here must
    /// come from the well-known constants in [`crate::names`], so a miss
    /// indicates a bug in the emitter, not malformed user input.
    pub fn require(&self, name: &str) -> RuntimeMethodRef {
        self.get(name)
            .unwrap_or_else(|| panic!("unknown runtime helper requested: {name}"))
    }

    pub fn name_of(&self, handle: RuntimeMethodRef) -> &str {
        self.stubs[handle.0 as usize].name
    }

    pub fn shape_of(&self, handle: RuntimeMethodRef) -> Shape {
        self.stubs[handle.0 as usize].shape
    }

    pub fn len(&self) -> usize {
        self.stubs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stubs.is_empty()
    }
}
