//! Assembly reference retargeting, spec.md §4.8 steps 1-2: copy the
//! assembly/module headers across, replacing each `AssemblyRef`'s full
//! public key with its token, then narrow the referenced runtime assemblies
//! down to the minimum set the emitted module actually needs.

use rustc_hash::FxHashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyRefHeader {
    pub name: String,
    pub version: (u16, u16, u16, u16),
    pub public_key_full: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetargetedAssemblyRef {
    pub name: String,
    pub version: (u16, u16, u16, u16),
    pub public_key_token: Vec<u8>,
}

/// Known full-key -> token mappings for the runtime assemblies this
/// compiler can emit references to. A full public key that isn't in this
/// table can't be retargeted, since there's no strong-name signing step in
/// this pipeline (spec.md §9, Non-goals).
#[derive(Debug, Default)]
pub struct KeyTokenTable {
    tokens: FxHashMap<Vec<u8>, Vec<u8>>,
}

impl KeyTokenTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, public_key_full: impl Into<Vec<u8>>, public_key_token: impl Into<Vec<u8>>) {
        self.tokens.insert(public_key_full.into(), public_key_token.into());
    }

    pub fn retarget(&self, header: &AssemblyRefHeader) -> Option<RetargetedAssemblyRef> {
        self.tokens.get(&header.public_key_full).map(|token| RetargetedAssemblyRef {
            name: header.name.clone(),
            version: header.version,
            public_key_token: token.clone(),
        })
    }
}

/// The fixed set of runtime assemblies `sharpts-runtime` stubs can be
/// drawn from. The minimal set for a module is whichever of these its
/// `CallRuntime` operands and typed field signatures actually touch.
pub const KNOWN_RUNTIME_ASSEMBLIES: &[&str] = &["SharpTS.Runtime", "System.Private.CoreLib"];

/// Narrows `referenced` (assembly names seen while walking a module's
/// tokens) down to the subset that's both known and actually used,
/// preserving `KNOWN_RUNTIME_ASSEMBLIES`'s order.
pub fn minimal_runtime_assemblies(referenced: &[&str]) -> Vec<&'static str> {
    KNOWN_RUNTIME_ASSEMBLIES
        .iter()
        .copied()
        .filter(|known| referenced.contains(known))
        .collect()
}

/// The minimum set of runtime assemblies a rewritten module ends up
/// referencing, carried around as a unit so the driver can pass it through
/// its pipeline options without recomputing it at every step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeAssemblySet(Vec<&'static str>);

impl RuntimeAssemblySet {
    pub fn compute(referenced: &[&str]) -> Self {
        Self(minimal_runtime_assemblies(referenced))
    }

    pub fn names(&self) -> &[&'static str] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retargets_a_known_public_key() {
        let mut table = KeyTokenTable::new();
        table.register(vec![1, 2, 3, 4], vec![0xAA; 8]);
        let header = AssemblyRefHeader {
            name: "SharpTS.Runtime".into(),
            version: (1, 0, 0, 0),
            public_key_full: vec![1, 2, 3, 4],
        };
        let retargeted = table.retarget(&header).unwrap();
        assert_eq!(retargeted.public_key_token, vec![0xAA; 8]);
        assert_eq!(retargeted.name, "SharpTS.Runtime");
    }

    #[test]
    fn unknown_public_key_cannot_be_retargeted() {
        let table = KeyTokenTable::new();
        let header = AssemblyRefHeader {
            name: "Unknown".into(),
            version: (1, 0, 0, 0),
            public_key_full: vec![9, 9, 9],
        };
        assert!(table.retarget(&header).is_none());
    }

    #[test]
    fn minimal_set_drops_unreferenced_assemblies() {
        let referenced = ["SharpTS.Runtime"];
        assert_eq!(minimal_runtime_assemblies(&referenced), vec!["SharpTS.Runtime"]);
    }

    #[test]
    fn minimal_set_preserves_known_order_regardless_of_input_order() {
        let referenced = ["System.Private.CoreLib", "SharpTS.Runtime"];
        assert_eq!(
            minimal_runtime_assemblies(&referenced),
            vec!["SharpTS.Runtime", "System.Private.CoreLib"]
        );
    }
}
