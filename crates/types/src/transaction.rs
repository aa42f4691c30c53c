use crate::account::Address;
use blake3::Hasher as Blake3;
use serde::{Deserialize, Serialize};

/// Canonical identifier for a transaction (32-byte digest).
pub type TxId = [u8; 32];

/// A value transfer in the Tessera ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Sender address.
    pub from: Address,
    /// Recipient address.
    pub to: Address,
    /// Amount to transfer in base units.
    pub amount: u64,
    /// Nonce for replay protection.
    pub nonce: u64,
    /// Microsecond timestamp when the transaction was created.
    pub timestamp_us: u64,
}

impl Transaction {
    pub fn new(from: Address, to: Address, amount: u64, nonce: u64, timestamp_us: u64) -> Self {
        Self {
            from,
            to,
            amount,
            nonce,
            timestamp_us,
        }
    }

    /// Compute the canonical identifier over all transaction fields.
    pub fn id(&self) -> TxId {
        let mut hasher = Blake3::new();
        hasher.update(&self.from);
        hasher.update(&self.to);
        hasher.update(&self.amount.to_be_bytes());
        hasher.update(&self.nonce.to_be_bytes());
        hasher.update(&self.timestamp_us.to_be_bytes());
        *hasher.finalize().as_bytes()
    }
}
