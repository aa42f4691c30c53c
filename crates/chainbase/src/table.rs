use crate::cursor::Cursor;
use crate::error::{ChainbaseError, Result};
use crate::manager::Chainbase;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

/// Explicit encode/decode strategy binding a record type to its byte
/// representation, supplied at view construction.
pub trait TableCodec: Send + Sync {
    type Record;

    fn encode(&self, record: &Self::Record) -> Result<Vec<u8>>;

    fn decode(&self, bytes: &[u8]) -> Result<Self::Record>;
}

/// Codec serializing any serde record to JSON bytes.
pub struct JsonCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonCodec<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonCodec<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T: Serialize + DeserializeOwned> TableCodec for JsonCodec<T> {
    type Record = T;

    fn encode(&self, record: &T) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(record)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<T> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Per-table facade over the shared snapshot stack. Every view created from
/// one chainbase advances and retreats in lockstep because they all share
/// its stack; the view only binds a table name and a codec to it.
///
/// The plain read methods observe the head; the `_at` variants observe the
/// supplied cursor.
pub struct TableView<C: TableCodec> {
    name: String,
    db: Chainbase,
    codec: C,
}

impl<C: TableCodec + Clone> Clone for TableView<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            db: self.db.clone(),
            codec: self.codec.clone(),
        }
    }
}

impl<C: TableCodec> TableView<C> {
    /// Create the view and enter its table into the chainbase registry.
    pub fn new(db: &Chainbase, name: &str, codec: C) -> Result<Self> {
        db.register_table(name)?;
        Ok(Self {
            name: name.to_string(),
            db: db.clone(),
            codec,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn decode(&self, bytes: &[u8]) -> Result<C::Record> {
        self.codec.decode(bytes).map_err(|error| match error {
            ChainbaseError::Serialization(source) => ChainbaseError::Corrupted {
                table: self.name.clone(),
                source,
            },
            other => other,
        })
    }

    pub fn put(&self, key: &[u8], record: &C::Record) -> Result<()> {
        let bytes = self.codec.encode(record)?;
        self.db.put_raw(&self.name, key, &bytes)
    }

    /// Write a tombstone for the key.
    pub fn delete(&self, key: &[u8]) -> Result<()> {
        self.db.delete_raw(&self.name, key)
    }

    pub fn get(&self, key: &[u8]) -> Result<Option<C::Record>> {
        self.get_at(key, Cursor::Head)
    }

    pub fn get_at(&self, key: &[u8], cursor: Cursor) -> Result<Option<C::Record>> {
        self.db
            .get_raw_at(&self.name, key, cursor)?
            .map(|bytes| self.decode(&bytes))
            .transpose()
    }

    pub fn has(&self, key: &[u8]) -> Result<bool> {
        self.db.has_raw_at(&self.name, key, Cursor::Head)
    }

    pub fn has_at(&self, key: &[u8], cursor: Cursor) -> Result<bool> {
        self.db.has_raw_at(&self.name, key, cursor)
    }

    /// The most recently written `count` distinct records.
    pub fn latest(&self, count: usize) -> Result<Vec<C::Record>> {
        self.latest_at(count, Cursor::Head)
    }

    pub fn latest_at(&self, count: usize, cursor: Cursor) -> Result<Vec<C::Record>> {
        self.db
            .latest_values_at(&self.name, count, cursor)?
            .iter()
            .map(|bytes| self.decode(bytes))
            .collect()
    }

    /// Up to `count` records whose keys are strictly greater than `after`,
    /// in ascending key order.
    pub fn next_values(&self, after: &[u8], count: usize) -> Result<Vec<C::Record>> {
        self.next_values_at(after, count, Cursor::Head)
    }

    pub fn next_values_at(
        &self,
        after: &[u8],
        count: usize,
        cursor: Cursor,
    ) -> Result<Vec<C::Record>> {
        self.db
            .next_entries_at(&self.name, after, count, cursor)?
            .iter()
            .map(|(_, bytes)| self.decode(bytes))
            .collect()
    }

    /// Up to `count` keys strictly greater than `after`, ascending.
    pub fn next_keys(&self, after: &[u8], count: usize) -> Result<Vec<Vec<u8>>> {
        self.next_keys_at(after, count, Cursor::Head)
    }

    pub fn next_keys_at(&self, after: &[u8], count: usize, cursor: Cursor) -> Result<Vec<Vec<u8>>> {
        Ok(self
            .db
            .next_entries_at(&self.name, after, count, cursor)?
            .into_iter()
            .map(|(key, _)| key)
            .collect())
    }

    /// Every record whose key starts with `prefix`, ascending by key.
    pub fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, C::Record)>> {
        self.scan_prefix_at(prefix, Cursor::Head)
    }

    pub fn scan_prefix_at(
        &self,
        prefix: &[u8],
        cursor: Cursor,
    ) -> Result<Vec<(Vec<u8>, C::Record)>> {
        self.db
            .scan_prefix_at(&self.name, prefix, cursor)?
            .into_iter()
            .map(|(key, bytes)| Ok((key, self.decode(&bytes)?)))
            .collect()
    }
}
