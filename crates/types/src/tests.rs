use crate::*;

fn addr(byte: u8) -> Address {
    [byte; 32]
}

#[test]
fn transaction_id_is_stable() {
    let tx = Transaction::new(addr(1), addr(2), 100, 1, 1_000);
    let again = Transaction::new(addr(1), addr(2), 100, 1, 1_000);
    assert_eq!(tx.id(), again.id());

    let other = Transaction::new(addr(1), addr(2), 101, 1, 1_000);
    assert_ne!(tx.id(), other.id());
}

#[test]
fn block_id_commits_to_transactions() {
    let txs = vec![Transaction::new(addr(1), addr(2), 10, 0, 500)];
    let block = Block::new(1, [0u8; 32], addr(9), 1_000, txs.clone());
    let empty = Block::new(1, [0u8; 32], addr(9), 1_000, vec![]);
    assert_ne!(block.id(), empty.id());
    assert_eq!(block.number(), 1);
    assert_eq!(block.header.tx_root, {
        let rebuilt = Block::new(1, [0u8; 32], addr(9), 1_000, txs);
        rebuilt.header.tx_root
    });
}

#[test]
fn account_freeze_moves_balance() {
    let mut account = Account::new(addr(3), 1_000);
    assert!(account.freeze(ResourceKind::Bandwidth, 400, 9_999));
    assert_eq!(account.balance, 600);
    assert_eq!(account.total_frozen(), 400);

    // A second freeze on the same resource accumulates.
    assert!(account.freeze(ResourceKind::Bandwidth, 100, 10_000));
    assert_eq!(account.frozen_for_bandwidth.unwrap().amount, 500);

    // Freezing more than the spendable balance is refused.
    assert!(!account.freeze(ResourceKind::Cpu, 10_000, 0));
    assert_eq!(account.balance, 500);
}

#[test]
fn delegation_key_orders_by_sender() {
    let key_a = DelegatedResource::key(&addr(1), &addr(9));
    let key_b = DelegatedResource::key(&addr(1), &addr(10));
    let key_c = DelegatedResource::key(&addr(2), &addr(0));
    assert!(key_a < key_b);
    assert!(key_b < key_c);
}

#[test]
fn account_index_deduplicates_counterparties() {
    let mut index = DelegatedResourceAccountIndex::new(addr(5));
    index.add_from(addr(1));
    index.add_from(addr(1));
    index.add_to(addr(2));
    index.add_to(addr(1));
    assert_eq!(index.from_accounts.len(), 1);
    assert_eq!(index.to_accounts, vec![addr(1), addr(2)]);
}

#[test]
fn account_record_round_trips_through_json() {
    let mut account = Account::new(addr(7), 42);
    account.freeze(ResourceKind::Cpu, 10, 123);
    let bytes = serde_json::to_vec(&account).unwrap();
    let decoded: Account = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(account, decoded);
}
