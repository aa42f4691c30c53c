use crate::Result;
use tessera_chainbase::{Chainbase, Cursor, JsonCodec, TableView};
use tessera_types::{Account, Address};

pub const ACCOUNT_TABLE: &str = "account";

/// Account table, keyed by the 32-byte address.
#[derive(Clone)]
pub struct AccountStore {
    view: TableView<JsonCodec<Account>>,
}

impl AccountStore {
    pub fn new(db: &Chainbase) -> Result<Self> {
        Ok(Self {
            view: TableView::new(db, ACCOUNT_TABLE, JsonCodec::new())?,
        })
    }

    pub fn put(&self, account: &Account) -> Result<()> {
        Ok(self.view.put(&account.address, account)?)
    }

    pub fn get(&self, address: &Address) -> Result<Option<Account>> {
        Ok(self.view.get(address)?)
    }

    pub fn get_at(&self, address: &Address, cursor: Cursor) -> Result<Option<Account>> {
        Ok(self.view.get_at(address, cursor)?)
    }

    pub fn has(&self, address: &Address) -> Result<bool> {
        Ok(self.view.has(address)?)
    }

    pub fn delete(&self, address: &Address) -> Result<()> {
        Ok(self.view.delete(address)?)
    }

    /// The most recently touched `count` accounts.
    pub fn latest(&self, count: usize) -> Result<Vec<Account>> {
        Ok(self.view.latest(count)?)
    }

    /// Up to `count` accounts with addresses strictly greater than `after`.
    pub fn accounts_after(&self, after: &Address, count: usize) -> Result<Vec<Account>> {
        Ok(self.view.next_values(after, count)?)
    }
}
