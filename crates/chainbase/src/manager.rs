use crate::backend::{prefix_upper_bound, BatchOp, DurableBackend};
use crate::config::ChainbaseConfig;
use crate::cursor::Cursor;
use crate::error::{ChainbaseError, Result};
use crate::layer::{SnapshotLayer, WriteOp};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::ops::Bound;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How a balanced session run ends; decides the fate of the pushed layer.
enum SessionOutcome {
    Commit,
    Merge,
    Revert,
}

#[derive(Default)]
struct StackState {
    layers: VecDeque<SnapshotLayer>,
    active_sessions: usize,
    enabled: bool,
    shut_down: bool,
    confirmed_depth: usize,
    tables: BTreeSet<String>,
}

struct ChainbaseShared {
    backend: Arc<dyn DurableBackend>,
    config: ChainbaseConfig,
    state: RwLock<StackState>,
}

/// The snapshot manager. Owns the live stack of snapshot layers shared by
/// all registered tables, counts nested sessions, and gives the rest of the
/// node the illusion of a single mutable database over a bounded chain of
/// copy-on-write diffs.
///
/// All stack mutations are serialized under one lock; reads resolve a depth
/// and observe the stack truncated to it, so they are consistent with
/// respect to concurrent mutation.
#[derive(Clone)]
pub struct Chainbase {
    shared: Arc<ChainbaseShared>,
}

impl Chainbase {
    pub fn new(backend: Arc<dyn DurableBackend>, config: ChainbaseConfig) -> Self {
        Self {
            shared: Arc::new(ChainbaseShared {
                backend,
                config,
                state: RwLock::new(StackState {
                    enabled: true,
                    ..StackState::default()
                }),
            }),
        }
    }

    pub fn config(&self) -> &ChainbaseConfig {
        &self.shared.config
    }

    pub fn backend(&self) -> &Arc<dyn DurableBackend> {
        &self.shared.backend
    }

    /// Enter a table into the registry. Views register at construction;
    /// registration is idempotent.
    pub fn register_table(&self, name: &str) -> Result<()> {
        let mut state = self.shared.state.write();
        if state.shut_down {
            return Err(ChainbaseError::state("chainbase is shut down"));
        }
        state.tables.insert(name.to_string());
        Ok(())
    }

    pub fn tables(&self) -> Vec<String> {
        self.shared.state.read().tables.iter().cloned().collect()
    }

    /// Number of layers currently on the stack.
    pub fn depth(&self) -> usize {
        self.shared.state.read().layers.len()
    }

    /// Re-entrancy count of the open session, zero when none is active.
    pub fn active_sessions(&self) -> usize {
        self.shared.state.read().active_sessions
    }

    pub fn is_enabled(&self) -> bool {
        self.shared.state.read().enabled
    }

    /// Route writes through the layered stack again.
    pub fn enable(&self) {
        self.shared.state.write().enabled = true;
    }

    /// Bypass the layered stack: writes go straight to the durable backend
    /// and stack operations become no-ops. Used for bulk historical import.
    pub fn disable(&self) {
        self.shared.state.write().enabled = false;
    }

    /// Depth observed by [`Cursor::Confirmed`] reads; set by the consensus
    /// layer as quorum confirmation advances.
    pub fn set_confirmed_depth(&self, depth: usize) {
        self.shared.state.write().confirmed_depth = depth;
    }

    pub fn confirmed_depth(&self) -> usize {
        self.shared.state.read().confirmed_depth
    }

    /// Open a session over one push of the stack. If a session is already
    /// active the same pushed layer is shared and a reference count is
    /// incremented, so concurrent logical writers inside one
    /// block-processing pass see one diff layer.
    pub fn build_session(&self) -> Result<Session> {
        let mut state = self.shared.state.write();
        if state.shut_down {
            return Err(ChainbaseError::state("chainbase is shut down"));
        }
        if !state.enabled {
            return Err(ChainbaseError::state("chainbase is disabled"));
        }
        if state.active_sessions == 0 {
            while self.shared.config.max_layers > 0
                && state.layers.len() >= self.shared.config.max_layers
            {
                self.flush_oldest_locked(&mut state)?;
            }
            state.layers.push_back(SnapshotLayer::default());
            debug!(depth = state.layers.len(), "pushed snapshot layer");
        }
        state.active_sessions += 1;
        Ok(Session {
            db: self.clone(),
            finished: false,
        })
    }

    /// Flush the oldest committed layer into the durable backend and drop
    /// it from the stack. The checkpoint operation, invoked once a block is
    /// irreversible.
    pub fn pop(&self) -> Result<()> {
        let mut state = self.shared.state.write();
        if state.shut_down {
            return Err(ChainbaseError::state("chainbase is shut down"));
        }
        if !state.enabled {
            debug!("pop ignored while disabled");
            return Ok(());
        }
        if state.active_sessions > 0 {
            return Err(ChainbaseError::state("cannot pop with an active session"));
        }
        if state.layers.is_empty() {
            return Err(ChainbaseError::state("cannot pop an empty stack"));
        }
        self.flush_oldest_locked(&mut state)
    }

    /// Drop any uncommitted tip, flush every committed layer oldest to
    /// newest, and clear the stack. Reads afterwards see only backend data.
    pub fn shutdown(&self) -> Result<()> {
        let mut state = self.shared.state.write();
        if state.shut_down {
            return Ok(());
        }
        if state.active_sessions > 0 {
            state.layers.pop_back();
            state.active_sessions = 0;
            warn!("shutdown discarded an uncommitted session layer");
        }
        while !state.layers.is_empty() {
            self.flush_oldest_locked(&mut state)?;
        }
        self.shared.backend.flush()?;
        state.shut_down = true;
        info!("chainbase shut down, stack drained to backend");
        Ok(())
    }

    /// All-or-nothing per layer on the stack side: the layer is removed
    /// only after every table batch landed, so a failed flush leaves the
    /// stack unchanged and retrying is safe.
    fn flush_oldest_locked(&self, state: &mut StackState) -> Result<()> {
        let layer = match state.layers.front() {
            Some(layer) => layer,
            None => return Err(ChainbaseError::state("cannot flush an empty stack")),
        };
        if !layer.committed {
            return Err(ChainbaseError::state("cannot flush an uncommitted layer"));
        }
        for (table, entries) in layer.tables() {
            let batch = entries
                .iter()
                .map(|(key, op)| match op {
                    WriteOp::Put(value) => BatchOp::Put(key.clone(), value.clone()),
                    WriteOp::Delete => BatchOp::Delete(key.clone()),
                })
                .collect();
            self.shared.backend.apply_batch(table, batch)?;
        }
        state.layers.pop_front();
        info!(
            depth = state.layers.len(),
            "flushed oldest snapshot layer to backend"
        );
        Ok(())
    }

    fn finish_session(&self, outcome: SessionOutcome) -> Result<()> {
        let mut state = self.shared.state.write();
        if state.active_sessions == 0 {
            warn!("unbalanced session operation");
            return Err(ChainbaseError::state("no active session"));
        }
        state.active_sessions -= 1;
        if state.active_sessions > 0 {
            return Ok(());
        }
        match outcome {
            SessionOutcome::Commit => match state.layers.back_mut() {
                Some(tip) => {
                    tip.committed = true;
                    debug!(depth = state.layers.len(), "committed tip layer");
                }
                None => return Err(ChainbaseError::state("commit with an empty stack")),
            },
            SessionOutcome::Merge => {
                if state.layers.len() < 2 {
                    state.active_sessions += 1;
                    return Err(ChainbaseError::state("merge requires a parent layer"));
                }
                let tip = match state.layers.pop_back() {
                    Some(tip) => tip,
                    None => return Err(ChainbaseError::state("merge with an empty stack")),
                };
                match state.layers.back_mut() {
                    Some(parent) => parent.absorb(tip),
                    None => return Err(ChainbaseError::state("merge without a parent layer")),
                }
                debug!(depth = state.layers.len(), "merged tip layer into parent");
            }
            SessionOutcome::Revert => {
                state.layers.pop_back();
                debug!(depth = state.layers.len(), "discarded tip layer");
            }
        }
        Ok(())
    }

    pub(crate) fn put_raw(&self, table: &str, key: &[u8], value: &[u8]) -> Result<()> {
        let mut state = self.shared.state.write();
        if state.shut_down {
            return Err(ChainbaseError::state("chainbase is shut down"));
        }
        Self::ensure_registered(&state, table)?;
        if !state.enabled {
            return self.shared.backend.put(table, key, value);
        }
        match state.layers.back_mut() {
            Some(tip) => {
                tip.record_put(table, key.to_vec(), value.to_vec());
                Ok(())
            }
            None => self.shared.backend.put(table, key, value),
        }
    }

    pub(crate) fn delete_raw(&self, table: &str, key: &[u8]) -> Result<()> {
        let mut state = self.shared.state.write();
        if state.shut_down {
            return Err(ChainbaseError::state("chainbase is shut down"));
        }
        Self::ensure_registered(&state, table)?;
        if !state.enabled {
            return self.shared.backend.delete(table, key);
        }
        match state.layers.back_mut() {
            Some(tip) => {
                tip.record_delete(table, key.to_vec());
                Ok(())
            }
            None => self.shared.backend.delete(table, key),
        }
    }

    pub(crate) fn get_raw_at(
        &self,
        table: &str,
        key: &[u8],
        cursor: Cursor,
    ) -> Result<Option<Vec<u8>>> {
        let state = self.shared.state.read();
        Self::ensure_registered(&state, table)?;
        let depth = self.resolve_depth(&state, cursor);
        for layer in state.layers.iter().take(depth).rev() {
            match layer.get(table, key) {
                Some(WriteOp::Put(value)) => return Ok(Some(value.clone())),
                Some(WriteOp::Delete) => return Ok(None),
                None => {}
            }
        }
        self.shared.backend.get(table, key)
    }

    pub(crate) fn has_raw_at(&self, table: &str, key: &[u8], cursor: Cursor) -> Result<bool> {
        Ok(self.get_raw_at(table, key, cursor)?.is_some())
    }

    /// Merged ascending scan strictly after `after`, newest layer winning
    /// per key, tombstones suppressing older values; at most `count`
    /// entries.
    pub(crate) fn next_entries_at(
        &self,
        table: &str,
        after: &[u8],
        count: usize,
        cursor: Cursor,
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let state = self.shared.state.read();
        Self::ensure_registered(&state, table)?;
        let depth = self.resolve_depth(&state, cursor);

        // Smallest key strictly greater than the boundary.
        let mut start = after.to_vec();
        start.push(0);

        // Every layer entry can shadow at most one backend row, so fetching
        // count + layer entry count from the backend is always enough.
        let layer_entries: usize = state
            .layers
            .iter()
            .take(depth)
            .filter_map(|layer| layer.table(table))
            .map(|entries| {
                entries
                    .range::<[u8], _>((Bound::Included(start.as_slice()), Bound::Unbounded))
                    .count()
            })
            .sum();

        let mut merged: BTreeMap<Vec<u8>, Option<Vec<u8>>> = BTreeMap::new();
        for (key, value) in self
            .shared
            .backend
            .iter_from(table, &start, count + layer_entries)?
        {
            merged.insert(key, Some(value));
        }
        for layer in state.layers.iter().take(depth) {
            if let Some(entries) = layer.table(table) {
                for (key, op) in
                    entries.range::<[u8], _>((Bound::Included(start.as_slice()), Bound::Unbounded))
                {
                    let resolved = match op {
                        WriteOp::Put(value) => Some(value.clone()),
                        WriteOp::Delete => None,
                    };
                    merged.insert(key.clone(), resolved);
                }
            }
        }
        Ok(merged
            .into_iter()
            .filter_map(|(key, value)| value.map(|value| (key, value)))
            .take(count)
            .collect())
    }

    /// The most recently written `count` distinct values of a table: newest
    /// layers first, then the backend from its largest keys backwards.
    pub(crate) fn latest_values_at(
        &self,
        table: &str,
        count: usize,
        cursor: Cursor,
    ) -> Result<Vec<Vec<u8>>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let state = self.shared.state.read();
        Self::ensure_registered(&state, table)?;
        let depth = self.resolve_depth(&state, cursor);

        let mut seen: BTreeSet<Vec<u8>> = BTreeSet::new();
        let mut values = Vec::new();
        'layers: for layer in state.layers.iter().take(depth).rev() {
            if let Some(entries) = layer.table(table) {
                for (key, op) in entries.iter().rev() {
                    if seen.insert(key.clone()) {
                        if let WriteOp::Put(value) = op {
                            values.push(value.clone());
                            if values.len() == count {
                                break 'layers;
                            }
                        }
                    }
                }
            }
        }
        if values.len() < count {
            // Keys already resolved by a layer may reappear in the backend;
            // fetch enough rows to skip past all of them.
            let limit = count - values.len() + seen.len();
            for (key, value) in self.shared.backend.iter_back(table, limit)? {
                if seen.insert(key) {
                    values.push(value);
                    if values.len() == count {
                        break;
                    }
                }
            }
        }
        Ok(values)
    }

    /// Merged ascending scan of every key starting with `prefix`.
    pub(crate) fn scan_prefix_at(
        &self,
        table: &str,
        prefix: &[u8],
        cursor: Cursor,
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let state = self.shared.state.read();
        Self::ensure_registered(&state, table)?;
        let depth = self.resolve_depth(&state, cursor);

        let mut merged: BTreeMap<Vec<u8>, Option<Vec<u8>>> = BTreeMap::new();
        for (key, value) in self.shared.backend.scan_prefix(table, prefix)? {
            merged.insert(key, Some(value));
        }
        let upper = prefix_upper_bound(prefix);
        let upper_bound = match upper.as_deref() {
            Some(end) => Bound::Excluded(end),
            None => Bound::Unbounded,
        };
        for layer in state.layers.iter().take(depth) {
            if let Some(entries) = layer.table(table) {
                for (key, op) in entries.range::<[u8], _>((Bound::Included(prefix), upper_bound)) {
                    let resolved = match op {
                        WriteOp::Put(value) => Some(value.clone()),
                        WriteOp::Delete => None,
                    };
                    merged.insert(key.clone(), resolved);
                }
            }
        }
        Ok(merged
            .into_iter()
            .filter_map(|(key, value)| value.map(|value| (key, value)))
            .collect())
    }

    fn resolve_depth(&self, state: &StackState, cursor: Cursor) -> usize {
        match cursor {
            Cursor::Head => state.layers.len(),
            Cursor::Solid => state
                .layers
                .len()
                .saturating_sub(self.shared.config.solid_offset),
            Cursor::Confirmed => state.confirmed_depth.min(state.layers.len()),
        }
    }

    fn ensure_registered(state: &StackState, table: &str) -> Result<()> {
        if state.tables.contains(table) {
            Ok(())
        } else {
            Err(ChainbaseError::state(format!(
                "table {table} is not registered"
            )))
        }
    }
}

/// A scoped unit of writes corresponding to one push of the snapshot
/// stack. Each of [`commit`](Session::commit), [`merge`](Session::merge)
/// and [`revert`](Session::revert) consumes the session and balances one
/// `build_session` call; the call that balances the last open handle
/// applies the structural effect. Dropping an unfinished session reverts,
/// so every exit path cleans up.
pub struct Session {
    db: Chainbase,
    finished: bool,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Mark the layer permanent-pending: it stays on the stack for a later
    /// merge or pop but its writes survive this session.
    pub fn commit(mut self) -> Result<()> {
        self.db.finish_session(SessionOutcome::Commit)?;
        self.finished = true;
        Ok(())
    }

    /// Fold the layer's entries into its parent and drop it from the
    /// stack; the writes survive but are no longer separately revertible.
    /// On failure the drop path reverts the session instead.
    pub fn merge(mut self) -> Result<()> {
        self.db.finish_session(SessionOutcome::Merge)?;
        self.finished = true;
        Ok(())
    }

    /// Discard the layer entirely; its writes vanish.
    pub fn revert(mut self) -> Result<()> {
        self.db.finish_session(SessionOutcome::Revert)?;
        self.finished = true;
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(error) = self.db.finish_session(SessionOutcome::Revert) {
                warn!(%error, "implicit session revert failed");
            }
        }
    }
}
