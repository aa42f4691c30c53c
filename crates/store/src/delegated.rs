use crate::Result;
use tessera_chainbase::{Chainbase, Cursor, JsonCodec, TableView};
use tessera_types::{Address, DelegatedResource, DelegatedResourceAccountIndex};

pub const DELEGATED_TABLE: &str = "delegated-resource";
pub const DELEGATED_INDEX_TABLE: &str = "delegated-resource-index";

/// Delegation records keyed by the `from ++ to` address pair. Keys from
/// one delegator are contiguous, so a 32-byte prefix scan lists all of an
/// account's outgoing delegations.
#[derive(Clone)]
pub struct DelegatedResourceStore {
    view: TableView<JsonCodec<DelegatedResource>>,
}

impl DelegatedResourceStore {
    pub fn new(db: &Chainbase) -> Result<Self> {
        Ok(Self {
            view: TableView::new(db, DELEGATED_TABLE, JsonCodec::new())?,
        })
    }

    pub fn put(&self, resource: &DelegatedResource) -> Result<()> {
        let key = DelegatedResource::key(&resource.from, &resource.to);
        Ok(self.view.put(&key, resource)?)
    }

    pub fn get(&self, from: &Address, to: &Address) -> Result<Option<DelegatedResource>> {
        self.get_at(from, to, Cursor::Head)
    }

    pub fn get_at(
        &self,
        from: &Address,
        to: &Address,
        cursor: Cursor,
    ) -> Result<Option<DelegatedResource>> {
        let key = DelegatedResource::key(from, to);
        Ok(self.view.get_at(&key, cursor)?)
    }

    pub fn delete(&self, from: &Address, to: &Address) -> Result<()> {
        let key = DelegatedResource::key(from, to);
        Ok(self.view.delete(&key)?)
    }

    /// Every delegation made by `from`, ascending by receiver address.
    pub fn delegations_from(&self, from: &Address) -> Result<Vec<DelegatedResource>> {
        self.delegations_from_at(from, Cursor::Head)
    }

    pub fn delegations_from_at(
        &self,
        from: &Address,
        cursor: Cursor,
    ) -> Result<Vec<DelegatedResource>> {
        Ok(self
            .view
            .scan_prefix_at(from, cursor)?
            .into_iter()
            .map(|(_, resource)| resource)
            .collect())
    }
}

/// Per-account counterparty index maintained next to the delegation
/// records.
#[derive(Clone)]
pub struct DelegatedResourceAccountIndexStore {
    view: TableView<JsonCodec<DelegatedResourceAccountIndex>>,
}

impl DelegatedResourceAccountIndexStore {
    pub fn new(db: &Chainbase) -> Result<Self> {
        Ok(Self {
            view: TableView::new(db, DELEGATED_INDEX_TABLE, JsonCodec::new())?,
        })
    }

    pub fn put(&self, index: &DelegatedResourceAccountIndex) -> Result<()> {
        Ok(self.view.put(&index.account, index)?)
    }

    pub fn get(&self, account: &Address) -> Result<Option<DelegatedResourceAccountIndex>> {
        self.get_at(account, Cursor::Head)
    }

    pub fn get_at(
        &self,
        account: &Address,
        cursor: Cursor,
    ) -> Result<Option<DelegatedResourceAccountIndex>> {
        Ok(self.view.get_at(account, cursor)?)
    }

    /// Update both sides of the index for a new `from -> to` delegation.
    pub fn record(&self, from: &Address, to: &Address) -> Result<()> {
        let mut sender = self
            .get(from)?
            .unwrap_or_else(|| DelegatedResourceAccountIndex::new(*from));
        sender.add_to(*to);
        self.put(&sender)?;

        let mut receiver = self
            .get(to)?
            .unwrap_or_else(|| DelegatedResourceAccountIndex::new(*to));
        receiver.add_from(*from);
        self.put(&receiver)?;
        Ok(())
    }
}
