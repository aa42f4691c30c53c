use crate::account::Address;
use serde::{Deserialize, Serialize};

/// Resources one account has delegated to another by freezing balance on
/// the receiver's behalf. Keyed by the `from ++ to` address pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegatedResource {
    pub from: Address,
    pub to: Address,
    /// Balance frozen for the receiver's bandwidth.
    pub frozen_for_bandwidth: u64,
    /// Balance frozen for the receiver's cpu.
    pub frozen_for_cpu: u64,
    /// Expiry of the bandwidth delegation, microseconds.
    pub expire_bandwidth_us: u64,
    /// Expiry of the cpu delegation, microseconds.
    pub expire_cpu_us: u64,
}

impl DelegatedResource {
    pub fn new(from: Address, to: Address) -> Self {
        Self {
            from,
            to,
            frozen_for_bandwidth: 0,
            frozen_for_cpu: 0,
            expire_bandwidth_us: 0,
            expire_cpu_us: 0,
        }
    }

    /// Storage key for a delegation pair: the 64-byte `from ++ to`
    /// concatenation, so all delegations from one account are contiguous.
    pub fn key(from: &Address, to: &Address) -> [u8; 64] {
        let mut key = [0u8; 64];
        key[..32].copy_from_slice(from);
        key[32..].copy_from_slice(to);
        key
    }
}

/// Per-account index of delegation counterparties, maintained alongside
/// the delegation records themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegatedResourceAccountIndex {
    pub account: Address,
    /// Accounts that delegated resources to this one.
    pub from_accounts: Vec<Address>,
    /// Accounts this one delegated resources to.
    pub to_accounts: Vec<Address>,
}

impl DelegatedResourceAccountIndex {
    pub fn new(account: Address) -> Self {
        Self {
            account,
            from_accounts: Vec::new(),
            to_accounts: Vec::new(),
        }
    }

    /// Record a counterparty that delegated to this account. Keeps the list
    /// sorted and free of duplicates.
    pub fn add_from(&mut self, from: Address) {
        if let Err(pos) = self.from_accounts.binary_search(&from) {
            self.from_accounts.insert(pos, from);
        }
    }

    /// Record a counterparty this account delegated to.
    pub fn add_to(&mut self, to: Address) {
        if let Err(pos) = self.to_accounts.binary_search(&to) {
            self.to_accounts.insert(pos, to);
        }
    }
}
