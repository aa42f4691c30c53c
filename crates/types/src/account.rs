use serde::{Deserialize, Serialize};

/// Account address (32-byte public key hash).
pub type Address = [u8; 32];

/// Resource classes an account can freeze balance against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceKind {
    Bandwidth,
    Cpu,
}

/// A balance locked until an expiry instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrozenBalance {
    /// Locked amount in base units.
    pub amount: u64,
    /// Microsecond timestamp after which the balance may be unfrozen.
    pub expire_us: u64,
}

/// Ledger account record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub address: Address,
    /// Spendable balance in base units.
    pub balance: u64,
    /// Nonce for replay protection.
    pub nonce: u64,
    /// Balance frozen for bandwidth, if any.
    pub frozen_for_bandwidth: Option<FrozenBalance>,
    /// Balance frozen for cpu, if any.
    pub frozen_for_cpu: Option<FrozenBalance>,
}

impl Account {
    pub fn new(address: Address, balance: u64) -> Self {
        Self {
            address,
            balance,
            nonce: 0,
            frozen_for_bandwidth: None,
            frozen_for_cpu: None,
        }
    }

    /// Total balance frozen across all resource classes.
    pub fn total_frozen(&self) -> u64 {
        let bandwidth = self.frozen_for_bandwidth.map(|f| f.amount).unwrap_or(0);
        let cpu = self.frozen_for_cpu.map(|f| f.amount).unwrap_or(0);
        bandwidth.saturating_add(cpu)
    }

    /// Freeze `amount` out of the spendable balance for the given resource.
    /// Returns false when the spendable balance is insufficient.
    pub fn freeze(&mut self, kind: ResourceKind, amount: u64, expire_us: u64) -> bool {
        if self.balance < amount {
            return false;
        }
        self.balance -= amount;
        let slot = match kind {
            ResourceKind::Bandwidth => &mut self.frozen_for_bandwidth,
            ResourceKind::Cpu => &mut self.frozen_for_cpu,
        };
        let prior = slot.map(|f| f.amount).unwrap_or(0);
        *slot = Some(FrozenBalance {
            amount: prior.saturating_add(amount),
            expire_us,
        });
        true
    }
}
