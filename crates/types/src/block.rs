use crate::account::Address;
use crate::transaction::Transaction;
use blake3::Hasher as Blake3;
use serde::{Deserialize, Serialize};

/// Canonical identifier for a block header (32-byte digest).
pub type BlockId = [u8; 32];

/// Block header carrying the chain-linking metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Canonical identifier for this block (hash of the header fields).
    pub id: BlockId,
    /// Height of the block in the chain.
    pub number: u64,
    /// Identifier of the parent block.
    pub parent_id: BlockId,
    /// Address of the producing node.
    pub producer: Address,
    /// Microsecond timestamp assigned by the producer.
    pub timestamp_us: u64,
    /// Merkle root over the transaction identifiers.
    pub tx_root: [u8; 32],
}

/// A block along with its transaction payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
}

impl BlockHeader {
    fn compute_id(
        number: u64,
        parent_id: &BlockId,
        producer: &Address,
        timestamp_us: u64,
        tx_root: &[u8; 32],
    ) -> BlockId {
        let mut hasher = Blake3::new();
        hasher.update(&number.to_be_bytes());
        hasher.update(parent_id);
        hasher.update(producer);
        hasher.update(&timestamp_us.to_be_bytes());
        hasher.update(tx_root);
        *hasher.finalize().as_bytes()
    }
}

impl Block {
    /// Assemble a block, computing the transaction root and header id.
    pub fn new(
        number: u64,
        parent_id: BlockId,
        producer: Address,
        timestamp_us: u64,
        transactions: Vec<Transaction>,
    ) -> Self {
        let tx_root = Self::compute_tx_root(&transactions);
        let id = BlockHeader::compute_id(number, &parent_id, &producer, timestamp_us, &tx_root);
        Self {
            header: BlockHeader {
                id,
                number,
                parent_id,
                producer,
                timestamp_us,
                tx_root,
            },
            transactions,
        }
    }

    pub fn id(&self) -> BlockId {
        self.header.id
    }

    pub fn number(&self) -> u64 {
        self.header.number
    }

    fn compute_tx_root(transactions: &[Transaction]) -> [u8; 32] {
        let mut hasher = Blake3::new();
        for tx in transactions {
            hasher.update(&tx.id());
        }
        *hasher.finalize().as_bytes()
    }
}
