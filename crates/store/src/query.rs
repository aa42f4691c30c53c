use crate::bundle::StoreBundle;
use crate::properties::LATEST_BLOCK_NUMBER;
use crate::Result;
use tessera_chainbase::Cursor;
use tessera_types::{Account, Address, Block, BlockId, DelegatedResource};

/// Read-only facade serving queries at a fixed consistency point while
/// consensus keeps mutating the tip. One instance per API surface: head
/// for provisional answers, solid for irreversible-in-practice answers,
/// confirmed for quorum-backed answers.
#[derive(Clone)]
pub struct QueryService {
    stores: StoreBundle,
    cursor: Cursor,
}

impl QueryService {
    pub fn head(stores: StoreBundle) -> Self {
        Self {
            stores,
            cursor: Cursor::Head,
        }
    }

    pub fn solid(stores: StoreBundle) -> Self {
        Self {
            stores,
            cursor: Cursor::Solid,
        }
    }

    pub fn confirmed(stores: StoreBundle) -> Self {
        Self {
            stores,
            cursor: Cursor::Confirmed,
        }
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn account(&self, address: &Address) -> Result<Option<Account>> {
        self.stores.accounts.get_at(address, self.cursor)
    }

    pub fn block(&self, id: &BlockId) -> Result<Option<Block>> {
        self.stores.blocks.get_at(id, self.cursor)
    }

    pub fn block_by_number(&self, number: u64) -> Result<Option<Block>> {
        self.stores.blocks.get_by_number_at(number, self.cursor)
    }

    /// The `count` highest blocks visible at this cursor, newest first.
    pub fn latest_blocks(&self, count: usize) -> Result<Vec<Block>> {
        self.stores.blocks.latest_at(count, self.cursor)
    }

    pub fn latest_block_number(&self) -> Result<Option<u64>> {
        self.stores
            .properties
            .try_get_u64_at(LATEST_BLOCK_NUMBER, self.cursor)
    }

    pub fn delegations_from(&self, from: &Address) -> Result<Vec<DelegatedResource>> {
        self.stores.delegated.delegations_from_at(from, self.cursor)
    }

    pub fn chain_parameter(&self, name: &str) -> Result<Option<u64>> {
        self.stores.properties.try_get_u64_at(name, self.cursor)
    }
}
