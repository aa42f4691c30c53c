use crate::error::Result;
use parking_lot::RwLock;
use sled::{Db, Tree};
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::path::Path;

/// A single write in a batch applied to one table namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    Put(Vec<u8>, Vec<u8>),
    Delete(Vec<u8>),
}

/// Ordered key-value store on persistent media. The chainbase treats an
/// implementation as the oldest, permanently committed layer of every
/// table. Keys within a namespace are byte-lexicographically ordered and
/// iteration honors that order.
pub trait DurableBackend: Send + Sync {
    fn get(&self, ns: &str, key: &[u8]) -> Result<Option<Vec<u8>>>;

    fn put(&self, ns: &str, key: &[u8], value: &[u8]) -> Result<()>;

    fn delete(&self, ns: &str, key: &[u8]) -> Result<()>;

    /// Apply a batch of writes to one namespace as a unit.
    fn apply_batch(&self, ns: &str, batch: Vec<BatchOp>) -> Result<()>;

    /// Up to `limit` entries with key >= `start`, ascending.
    fn iter_from(&self, ns: &str, start: &[u8], limit: usize) -> Result<Vec<(Vec<u8>, Vec<u8>)>>;

    /// Up to `limit` entries taken from the end of the namespace, descending.
    fn iter_back(&self, ns: &str, limit: usize) -> Result<Vec<(Vec<u8>, Vec<u8>)>>;

    /// Every entry whose key starts with `prefix`, ascending.
    fn scan_prefix(&self, ns: &str, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>>;

    /// Block until previously applied writes are durable.
    fn flush(&self) -> Result<()>;
}

/// Smallest byte string that is greater than every key starting with
/// `prefix`, or `None` when no such bound exists.
pub(crate) fn prefix_upper_bound(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut bound = prefix.to_vec();
    while let Some(last) = bound.last_mut() {
        if *last < u8::MAX {
            *last += 1;
            return Some(bound);
        }
        bound.pop();
    }
    None
}

/// Sled-backed durable store; one tree per table namespace. The tree name
/// is the table's namespace prefix, so persisted rows are laid out as
/// `{namespace}{key}` within the sled keyspace.
pub struct SledBackend {
    db: Db,
    trees: RwLock<HashMap<String, Tree>>,
}

impl SledBackend {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            db: sled::open(path)?,
            trees: RwLock::new(HashMap::new()),
        })
    }

    fn tree(&self, ns: &str) -> Result<Tree> {
        if let Some(tree) = self.trees.read().get(ns) {
            return Ok(tree.clone());
        }
        let tree = self.db.open_tree(ns)?;
        self.trees.write().insert(ns.to_string(), tree.clone());
        Ok(tree)
    }
}

impl DurableBackend for SledBackend {
    fn get(&self, ns: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.tree(ns)?.get(key)?.map(|value| value.to_vec()))
    }

    fn put(&self, ns: &str, key: &[u8], value: &[u8]) -> Result<()> {
        self.tree(ns)?.insert(key, value)?;
        Ok(())
    }

    fn delete(&self, ns: &str, key: &[u8]) -> Result<()> {
        self.tree(ns)?.remove(key)?;
        Ok(())
    }

    fn apply_batch(&self, ns: &str, batch: Vec<BatchOp>) -> Result<()> {
        let mut sled_batch = sled::Batch::default();
        for op in batch {
            match op {
                BatchOp::Put(key, value) => sled_batch.insert(key, value),
                BatchOp::Delete(key) => sled_batch.remove(key),
            }
        }
        self.tree(ns)?.apply_batch(sled_batch)?;
        Ok(())
    }

    fn iter_from(&self, ns: &str, start: &[u8], limit: usize) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        self.tree(ns)?
            .range(start..)
            .take(limit)
            .map(|entry| {
                let (key, value) = entry?;
                Ok((key.to_vec(), value.to_vec()))
            })
            .collect()
    }

    fn iter_back(&self, ns: &str, limit: usize) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        self.tree(ns)?
            .iter()
            .rev()
            .take(limit)
            .map(|entry| {
                let (key, value) = entry?;
                Ok((key.to_vec(), value.to_vec()))
            })
            .collect()
    }

    fn scan_prefix(&self, ns: &str, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        self.tree(ns)?
            .scan_prefix(prefix)
            .map(|entry| {
                let (key, value) = entry?;
                Ok((key.to_vec(), value.to_vec()))
            })
            .collect()
    }

    fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}

/// In-memory backend for tests: a single ordered map holding
/// `{namespace}/{key}` concatenated rows.
#[derive(Default)]
pub struct MemoryBackend {
    entries: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn scoped(ns: &str, key: &[u8]) -> Vec<u8> {
        let mut scoped = Vec::with_capacity(ns.len() + 1 + key.len());
        scoped.extend_from_slice(ns.as_bytes());
        scoped.push(b'/');
        scoped.extend_from_slice(key);
        scoped
    }

    fn ns_prefix(ns: &str) -> Vec<u8> {
        Self::scoped(ns, &[])
    }
}

impl DurableBackend for MemoryBackend {
    fn get(&self, ns: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.read().get(&Self::scoped(ns, key)).cloned())
    }

    fn put(&self, ns: &str, key: &[u8], value: &[u8]) -> Result<()> {
        self.entries
            .write()
            .insert(Self::scoped(ns, key), value.to_vec());
        Ok(())
    }

    fn delete(&self, ns: &str, key: &[u8]) -> Result<()> {
        self.entries.write().remove(&Self::scoped(ns, key));
        Ok(())
    }

    fn apply_batch(&self, ns: &str, batch: Vec<BatchOp>) -> Result<()> {
        let mut entries = self.entries.write();
        for op in batch {
            match op {
                BatchOp::Put(key, value) => {
                    entries.insert(Self::scoped(ns, &key), value);
                }
                BatchOp::Delete(key) => {
                    entries.remove(&Self::scoped(ns, &key));
                }
            }
        }
        Ok(())
    }

    fn iter_from(&self, ns: &str, start: &[u8], limit: usize) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let prefix = Self::ns_prefix(ns);
        Ok(self
            .entries
            .read()
            .range(Self::scoped(ns, start)..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .take(limit)
            .map(|(key, value)| (key[prefix.len()..].to_vec(), value.clone()))
            .collect())
    }

    fn iter_back(&self, ns: &str, limit: usize) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let prefix = Self::ns_prefix(ns);
        let upper = match prefix_upper_bound(&prefix) {
            Some(end) => Bound::Excluded(end),
            None => Bound::Unbounded,
        };
        Ok(self
            .entries
            .read()
            .range((Bound::Included(prefix.clone()), upper))
            .rev()
            .take(limit)
            .map(|(key, value)| (key[prefix.len()..].to_vec(), value.clone()))
            .collect())
    }

    fn scan_prefix(&self, ns: &str, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let scoped_prefix = Self::scoped(ns, prefix);
        let ns_prefix = Self::ns_prefix(ns);
        Ok(self
            .entries
            .read()
            .range(scoped_prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&scoped_prefix))
            .map(|(key, value)| (key[ns_prefix.len()..].to_vec(), value.clone()))
            .collect())
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(backend: &dyn DurableBackend) {
        backend.put("acct", b"a", b"1").unwrap();
        backend.put("acct", b"b", b"2").unwrap();
        backend.put("acct", b"c", b"3").unwrap();
        backend.put("block", b"a", b"other-namespace").unwrap();

        assert_eq!(backend.get("acct", b"b").unwrap(), Some(b"2".to_vec()));
        assert_eq!(backend.get("acct", b"z").unwrap(), None);

        // Ascending from an inclusive start key, bounded.
        let forward = backend.iter_from("acct", b"b", 10).unwrap();
        assert_eq!(
            forward,
            vec![
                (b"b".to_vec(), b"2".to_vec()),
                (b"c".to_vec(), b"3".to_vec()),
            ]
        );

        // Descending from the end of the namespace.
        let backward = backend.iter_back("acct", 2).unwrap();
        assert_eq!(
            backward,
            vec![
                (b"c".to_vec(), b"3".to_vec()),
                (b"b".to_vec(), b"2".to_vec()),
            ]
        );

        backend.delete("acct", b"b").unwrap();
        assert_eq!(backend.get("acct", b"b").unwrap(), None);

        backend
            .apply_batch(
                "acct",
                vec![
                    BatchOp::Put(b"d".to_vec(), b"4".to_vec()),
                    BatchOp::Delete(b"a".to_vec()),
                ],
            )
            .unwrap();
        assert_eq!(backend.get("acct", b"d").unwrap(), Some(b"4".to_vec()));
        assert_eq!(backend.get("acct", b"a").unwrap(), None);

        // Namespaces do not bleed into each other.
        assert_eq!(
            backend.get("block", b"a").unwrap(),
            Some(b"other-namespace".to_vec())
        );
        assert_eq!(backend.iter_back("block", 10).unwrap().len(), 1);

        backend.put("acct", b"pa", b"5").unwrap();
        backend.put("acct", b"pb", b"6").unwrap();
        let scanned = backend.scan_prefix("acct", b"p").unwrap();
        assert_eq!(
            scanned,
            vec![
                (b"pa".to_vec(), b"5".to_vec()),
                (b"pb".to_vec(), b"6".to_vec()),
            ]
        );

        backend.flush().unwrap();
    }

    #[test]
    fn memory_backend_contract() {
        exercise(&MemoryBackend::new());
    }

    #[test]
    fn sled_backend_contract() {
        let dir = tempfile::TempDir::new().unwrap();
        exercise(&SledBackend::open(dir.path()).unwrap());
    }

    #[test]
    fn prefix_upper_bound_increments_last_byte() {
        assert_eq!(prefix_upper_bound(b"ab"), Some(b"ac".to_vec()));
        assert_eq!(prefix_upper_bound(&[0x61, 0xff]), Some(vec![0x62]));
        assert_eq!(prefix_upper_bound(&[0xff, 0xff]), None);
        assert_eq!(prefix_upper_bound(b""), None);
    }
}
