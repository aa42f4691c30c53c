use crate::{Result, StoreError};
use tessera_chainbase::{Chainbase, Cursor, JsonCodec, TableView};

pub const PROPERTIES_TABLE: &str = "properties";

pub const LATEST_BLOCK_NUMBER: &str = "latest_block_number";
pub const LATEST_SOLID_BLOCK_NUMBER: &str = "latest_solid_block_number";
pub const MAINTENANCE_INTERVAL_US: &str = "maintenance_interval_us";

/// Dynamic chain parameters: string-keyed u64 values that consensus
/// adjusts as the chain advances.
#[derive(Clone)]
pub struct DynamicPropertiesStore {
    view: TableView<JsonCodec<u64>>,
}

impl DynamicPropertiesStore {
    pub fn new(db: &Chainbase) -> Result<Self> {
        Ok(Self {
            view: TableView::new(db, PROPERTIES_TABLE, JsonCodec::new())?,
        })
    }

    /// A parameter expected to be set; missing is an error distinct from a
    /// storage failure.
    pub fn get_u64(&self, name: &'static str) -> Result<u64> {
        self.view
            .get(name.as_bytes())?
            .ok_or(StoreError::PropertyMissing(name))
    }

    pub fn try_get_u64(&self, name: &str) -> Result<Option<u64>> {
        Ok(self.view.get(name.as_bytes())?)
    }

    pub fn try_get_u64_at(&self, name: &str, cursor: Cursor) -> Result<Option<u64>> {
        Ok(self.view.get_at(name.as_bytes(), cursor)?)
    }

    pub fn set_u64(&self, name: &str, value: u64) -> Result<()> {
        Ok(self.view.put(name.as_bytes(), &value)?)
    }

    pub fn latest_block_number(&self) -> Result<u64> {
        self.get_u64(LATEST_BLOCK_NUMBER)
    }

    pub fn set_latest_block_number(&self, number: u64) -> Result<()> {
        self.set_u64(LATEST_BLOCK_NUMBER, number)
    }

    pub fn latest_solid_block_number(&self) -> Result<u64> {
        self.get_u64(LATEST_SOLID_BLOCK_NUMBER)
    }

    pub fn set_latest_solid_block_number(&self, number: u64) -> Result<()> {
        self.set_u64(LATEST_SOLID_BLOCK_NUMBER, number)
    }

    pub fn maintenance_interval_us(&self) -> Result<u64> {
        self.get_u64(MAINTENANCE_INTERVAL_US)
    }

    pub fn set_maintenance_interval_us(&self, interval: u64) -> Result<()> {
        self.set_u64(MAINTENANCE_INTERVAL_US, interval)
    }
}
