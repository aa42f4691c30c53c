use crate::accounts::AccountStore;
use crate::blocks::BlockStore;
use crate::delegated::{DelegatedResourceAccountIndexStore, DelegatedResourceStore};
use crate::properties::DynamicPropertiesStore;
use crate::Result;
use tessera_chainbase::Chainbase;

/// Every typed store over one chainbase. Block application code receives
/// a bundle and writes through it; actuators must never reach around these
/// views to the durable backend.
#[derive(Clone)]
pub struct StoreBundle {
    chainbase: Chainbase,
    pub accounts: AccountStore,
    pub blocks: BlockStore,
    pub delegated: DelegatedResourceStore,
    pub delegated_index: DelegatedResourceAccountIndexStore,
    pub properties: DynamicPropertiesStore,
}

impl StoreBundle {
    /// Construct all stores, registering their tables with the chainbase.
    pub fn new(db: &Chainbase) -> Result<Self> {
        Ok(Self {
            chainbase: db.clone(),
            accounts: AccountStore::new(db)?,
            blocks: BlockStore::new(db)?,
            delegated: DelegatedResourceStore::new(db)?,
            delegated_index: DelegatedResourceAccountIndexStore::new(db)?,
            properties: DynamicPropertiesStore::new(db)?,
        })
    }

    pub fn chainbase(&self) -> &Chainbase {
        &self.chainbase
    }
}
