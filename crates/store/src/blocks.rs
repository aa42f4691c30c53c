use crate::Result;
use tessera_chainbase::{Chainbase, Cursor, JsonCodec, TableView};
use tessera_types::{Block, BlockId};

pub const BLOCK_TABLE: &str = "block";
pub const BLOCK_INDEX_TABLE: &str = "block-index";

/// Block table keyed by block id, plus the number-to-id index that keys
/// blocks by their big-endian height for ordered scans.
#[derive(Clone)]
pub struct BlockStore {
    blocks: TableView<JsonCodec<Block>>,
    index: TableView<JsonCodec<BlockId>>,
}

impl BlockStore {
    pub fn new(db: &Chainbase) -> Result<Self> {
        Ok(Self {
            blocks: TableView::new(db, BLOCK_TABLE, JsonCodec::new())?,
            index: TableView::new(db, BLOCK_INDEX_TABLE, JsonCodec::new())?,
        })
    }

    /// Store the block and its height index entry.
    pub fn put(&self, block: &Block) -> Result<()> {
        self.blocks.put(&block.id(), block)?;
        self.index
            .put(&block.number().to_be_bytes(), &block.id())?;
        Ok(())
    }

    pub fn get(&self, id: &BlockId) -> Result<Option<Block>> {
        Ok(self.blocks.get(id)?)
    }

    pub fn get_at(&self, id: &BlockId, cursor: Cursor) -> Result<Option<Block>> {
        Ok(self.blocks.get_at(id, cursor)?)
    }

    pub fn has(&self, id: &BlockId) -> Result<bool> {
        Ok(self.blocks.has(id)?)
    }

    pub fn get_by_number(&self, number: u64) -> Result<Option<Block>> {
        self.get_by_number_at(number, Cursor::Head)
    }

    pub fn get_by_number_at(&self, number: u64, cursor: Cursor) -> Result<Option<Block>> {
        match self.index.get_at(&number.to_be_bytes(), cursor)? {
            Some(id) => Ok(self.blocks.get_at(&id, cursor)?),
            None => Ok(None),
        }
    }

    /// Up to `count` blocks with heights strictly greater than `number`,
    /// ascending.
    pub fn blocks_after(&self, number: u64, count: usize) -> Result<Vec<Block>> {
        self.blocks_after_at(number, count, Cursor::Head)
    }

    pub fn blocks_after_at(&self, number: u64, count: usize, cursor: Cursor) -> Result<Vec<Block>> {
        let ids = self
            .index
            .next_values_at(&number.to_be_bytes(), count, cursor)?;
        let mut blocks = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(block) = self.blocks.get_at(&id, cursor)? {
                blocks.push(block);
            }
        }
        Ok(blocks)
    }

    /// The `count` highest blocks, newest first.
    pub fn latest(&self, count: usize) -> Result<Vec<Block>> {
        self.latest_at(count, Cursor::Head)
    }

    pub fn latest_at(&self, count: usize, cursor: Cursor) -> Result<Vec<Block>> {
        let ids = self.index.latest_at(count, cursor)?;
        let mut blocks = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(block) = self.blocks.get_at(&id, cursor)? {
                blocks.push(block);
            }
        }
        Ok(blocks)
    }
}
