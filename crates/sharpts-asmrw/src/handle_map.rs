//! Old-handle-to-new-handle maps, spec.md §4.8 step 3: built once per
//! rewrite, then consulted while patching every method body's tokens.

use crate::token::{MetadataToken, TableId};
use rustc_hash::FxHashMap;

#[derive(Debug, Default)]
pub struct HandleMap {
    rows: FxHashMap<(TableId, u32), u32>,
}

impl HandleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, table: TableId, old_row: u32, new_row: u32) {
        self.rows.insert((table, old_row), new_row);
    }

    pub fn get(&self, table: TableId, old_row: u32) -> Option<u32> {
        self.rows.get(&(table, old_row)).copied()
    }

    /// Remaps a full token, looking up its row within its table.
    pub fn remap(&self, old: MetadataToken) -> Option<MetadataToken> {
        self.get(old.table, old.row).map(|row| MetadataToken {
            table: old.table,
            row,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaps_a_known_row() {
        let mut map = HandleMap::new();
        map.insert(TableId::MemberRef, 3, 9);
        let old = MetadataToken {
            table: TableId::MemberRef,
            row: 3,
        };
        assert_eq!(
            map.remap(old),
            Some(MetadataToken {
                table: TableId::MemberRef,
                row: 9
            })
        );
    }

    #[test]
    fn unmapped_row_returns_none() {
        let map = HandleMap::new();
        let old = MetadataToken {
            table: TableId::TypeRef,
            row: 1,
        };
        assert_eq!(map.remap(old), None);
    }

    #[test]
    fn different_tables_with_the_same_row_number_do_not_collide() {
        let mut map = HandleMap::new();
        map.insert(TableId::TypeRef, 1, 100);
        map.insert(TableId::MethodDef, 1, 200);
        assert_eq!(map.get(TableId::TypeRef, 1), Some(100));
        assert_eq!(map.get(TableId::MethodDef, 1), Some(200));
    }
}
