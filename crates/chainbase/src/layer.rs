use std::collections::{BTreeMap, HashMap};

/// A single write recorded in a snapshot layer. `Delete` is the tombstone
/// marker distinguishing "known absent" from "ask an older layer".
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum WriteOp {
    Put(Vec<u8>),
    Delete,
}

/// One diff of writes atop the parent state, covering every registered
/// table. Layers form the manager's stack; a layer's position in the stack
/// is its depth, and it is mutable only while it is the tip.
#[derive(Debug, Clone, Default)]
pub(crate) struct SnapshotLayer {
    pub(crate) committed: bool,
    tables: HashMap<String, BTreeMap<Vec<u8>, WriteOp>>,
}

impl SnapshotLayer {
    pub fn record_put(&mut self, table: &str, key: Vec<u8>, value: Vec<u8>) {
        self.tables
            .entry(table.to_string())
            .or_default()
            .insert(key, WriteOp::Put(value));
    }

    pub fn record_delete(&mut self, table: &str, key: Vec<u8>) {
        self.tables
            .entry(table.to_string())
            .or_default()
            .insert(key, WriteOp::Delete);
    }

    pub fn get(&self, table: &str, key: &[u8]) -> Option<&WriteOp> {
        self.tables.get(table).and_then(|entries| entries.get(key))
    }

    pub fn table(&self, table: &str) -> Option<&BTreeMap<Vec<u8>, WriteOp>> {
        self.tables.get(table)
    }

    pub fn tables(&self) -> impl Iterator<Item = (&String, &BTreeMap<Vec<u8>, WriteOp>)> {
        self.tables.iter()
    }

    /// Fold every entry of `newer` into this layer; entries of the newer
    /// layer win on key collision.
    pub fn absorb(&mut self, newer: SnapshotLayer) {
        for (table, entries) in newer.tables {
            self.tables.entry(table).or_default().extend(entries);
        }
    }

    pub fn entry_count(&self) -> usize {
        self.tables.values().map(BTreeMap::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_write_wins_within_a_layer() {
        let mut layer = SnapshotLayer::default();
        layer.record_put("t", b"k".to_vec(), b"v1".to_vec());
        layer.record_put("t", b"k".to_vec(), b"v2".to_vec());
        assert_eq!(layer.get("t", b"k"), Some(&WriteOp::Put(b"v2".to_vec())));

        layer.record_delete("t", b"k".to_vec());
        assert_eq!(layer.get("t", b"k"), Some(&WriteOp::Delete));
        assert_eq!(layer.entry_count(), 1);
    }

    #[test]
    fn absorb_prefers_newer_entries() {
        let mut parent = SnapshotLayer::default();
        parent.record_put("t", b"a".to_vec(), b"old".to_vec());
        parent.record_put("t", b"b".to_vec(), b"keep".to_vec());

        let mut child = SnapshotLayer::default();
        child.record_put("t", b"a".to_vec(), b"new".to_vec());
        child.record_delete("u", b"c".to_vec());

        parent.absorb(child);
        assert_eq!(parent.get("t", b"a"), Some(&WriteOp::Put(b"new".to_vec())));
        assert_eq!(parent.get("t", b"b"), Some(&WriteOp::Put(b"keep".to_vec())));
        assert_eq!(parent.get("u", b"c"), Some(&WriteOp::Delete));
        assert_eq!(parent.entry_count(), 3);
    }

    #[test]
    fn tables_are_isolated() {
        let mut layer = SnapshotLayer::default();
        layer.record_put("t", b"k".to_vec(), b"v".to_vec());
        assert_eq!(layer.get("u", b"k"), None);
    }
}
