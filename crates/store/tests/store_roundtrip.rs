//! Round trips for every typed store, and rollback behavior of writes made
//! through them inside a session.

use std::sync::Arc;
use tessera_chainbase::{Chainbase, ChainbaseConfig, MemoryBackend};
use tessera_store::{
    Actuator, StoreBundle, StoreError, TransferActuator,
};
use tessera_types::{Account, Address, Block, DelegatedResource};

fn addr(byte: u8) -> Address {
    [byte; 32]
}

fn open_bundle() -> StoreBundle {
    let db = Chainbase::new(Arc::new(MemoryBackend::new()), ChainbaseConfig::default());
    StoreBundle::new(&db).unwrap()
}

fn make_block(number: u64) -> Block {
    let parent = [number.wrapping_sub(1) as u8; 32];
    Block::new(number, parent, addr(9), number * 1_000, vec![])
}

#[test]
fn account_store_round_trip() {
    let stores = open_bundle();

    let account = Account::new(addr(1), 500);
    stores.accounts.put(&account).unwrap();
    assert_eq!(stores.accounts.get(&addr(1)).unwrap(), Some(account));
    assert!(stores.accounts.has(&addr(1)).unwrap());

    stores.accounts.delete(&addr(1)).unwrap();
    assert_eq!(stores.accounts.get(&addr(1)).unwrap(), None);
}

#[test]
fn block_store_indexes_by_number() {
    let stores = open_bundle();

    for number in 0..10 {
        let session = stores.chainbase().build_session().unwrap();
        stores.blocks.put(&make_block(number)).unwrap();
        session.commit().unwrap();
    }

    let block = stores.blocks.get_by_number(4).unwrap().unwrap();
    assert_eq!(block.number(), 4);
    assert_eq!(stores.blocks.get(&block.id()).unwrap(), Some(block));

    let after = stores.blocks.blocks_after(2, 3).unwrap();
    let numbers: Vec<u64> = after.iter().map(Block::number).collect();
    assert_eq!(numbers, vec![3, 4, 5]);

    let latest = stores.blocks.latest(2).unwrap();
    let numbers: Vec<u64> = latest.iter().map(Block::number).collect();
    assert_eq!(numbers, vec![9, 8]);
}

#[test]
fn delegated_store_lists_by_sender_prefix() {
    let stores = open_bundle();

    let mut to_b = DelegatedResource::new(addr(1), addr(2));
    to_b.frozen_for_bandwidth = 100;
    let mut to_c = DelegatedResource::new(addr(1), addr(3));
    to_c.frozen_for_cpu = 200;
    let other = DelegatedResource::new(addr(4), addr(2));

    stores.delegated.put(&to_b).unwrap();
    stores.delegated.put(&to_c).unwrap();
    stores.delegated.put(&other).unwrap();

    let from_one = stores.delegated.delegations_from(&addr(1)).unwrap();
    assert_eq!(from_one, vec![to_b.clone(), to_c]);

    assert_eq!(
        stores.delegated.get(&addr(1), &addr(2)).unwrap(),
        Some(to_b)
    );
    stores.delegated.delete(&addr(1), &addr(2)).unwrap();
    assert_eq!(stores.delegated.get(&addr(1), &addr(2)).unwrap(), None);
    assert_eq!(stores.delegated.delegations_from(&addr(1)).unwrap().len(), 1);
}

#[test]
fn delegation_index_tracks_both_sides() {
    let stores = open_bundle();

    stores.delegated_index.record(&addr(1), &addr(2)).unwrap();
    stores.delegated_index.record(&addr(1), &addr(3)).unwrap();
    stores.delegated_index.record(&addr(4), &addr(1)).unwrap();

    let index = stores.delegated_index.get(&addr(1)).unwrap().unwrap();
    assert_eq!(index.to_accounts, vec![addr(2), addr(3)]);
    assert_eq!(index.from_accounts, vec![addr(4)]);

    let receiver = stores.delegated_index.get(&addr(2)).unwrap().unwrap();
    assert_eq!(receiver.from_accounts, vec![addr(1)]);
    assert!(receiver.to_accounts.is_empty());
}

#[test]
fn missing_chain_parameter_is_a_distinct_error() {
    let stores = open_bundle();

    let error = stores.properties.latest_block_number().unwrap_err();
    assert!(matches!(error, StoreError::PropertyMissing(_)));

    stores.properties.set_latest_block_number(7).unwrap();
    assert_eq!(stores.properties.latest_block_number().unwrap(), 7);
    assert_eq!(stores.properties.try_get_u64("unset").unwrap(), None);
}

#[test]
fn session_revert_rolls_back_every_store() {
    let stores = open_bundle();
    let db = stores.chainbase().clone();

    stores.accounts.put(&Account::new(addr(1), 100)).unwrap();

    let session = db.build_session().unwrap();
    stores.accounts.put(&Account::new(addr(1), 999)).unwrap();
    stores.blocks.put(&make_block(1)).unwrap();
    stores.properties.set_latest_block_number(1).unwrap();
    stores
        .delegated
        .put(&DelegatedResource::new(addr(1), addr(2)))
        .unwrap();
    session.revert().unwrap();

    assert_eq!(
        stores.accounts.get(&addr(1)).unwrap().unwrap().balance,
        100
    );
    assert_eq!(stores.blocks.get_by_number(1).unwrap(), None);
    assert!(matches!(
        stores.properties.latest_block_number().unwrap_err(),
        StoreError::PropertyMissing(_)
    ));
    assert_eq!(stores.delegated.get(&addr(1), &addr(2)).unwrap(), None);
}

#[test]
fn transfer_actuator_writes_through_the_views() {
    let stores = open_bundle();
    let db = stores.chainbase().clone();

    stores.accounts.put(&Account::new(addr(1), 1_000)).unwrap();

    let transfer = TransferActuator {
        from: addr(1),
        to: addr(2),
        amount: 300,
    };

    let session = db.build_session().unwrap();
    transfer.validate(&stores).unwrap();
    transfer.execute(&stores).unwrap();
    session.commit().unwrap();

    assert_eq!(stores.accounts.get(&addr(1)).unwrap().unwrap().balance, 700);
    assert_eq!(stores.accounts.get(&addr(2)).unwrap().unwrap().balance, 300);
    assert_eq!(stores.accounts.get(&addr(1)).unwrap().unwrap().nonce, 1);
}

#[test]
fn abandoned_transfer_leaves_no_trace() {
    let stores = open_bundle();
    let db = stores.chainbase().clone();

    stores.accounts.put(&Account::new(addr(1), 1_000)).unwrap();

    let transfer = TransferActuator {
        from: addr(1),
        to: addr(2),
        amount: 300,
    };

    {
        let _session = db.build_session().unwrap();
        transfer.validate(&stores).unwrap();
        transfer.execute(&stores).unwrap();
        assert_eq!(stores.accounts.get(&addr(2)).unwrap().unwrap().balance, 300);
        // Dropped without commit: the fork candidate was abandoned.
    }

    assert_eq!(
        stores.accounts.get(&addr(1)).unwrap().unwrap().balance,
        1_000
    );
    assert_eq!(stores.accounts.get(&addr(2)).unwrap(), None);
}

#[test]
fn transfer_validation_rejects_overdraft() {
    let stores = open_bundle();

    stores.accounts.put(&Account::new(addr(1), 10)).unwrap();

    let transfer = TransferActuator {
        from: addr(1),
        to: addr(2),
        amount: 300,
    };
    assert!(matches!(
        transfer.validate(&stores).unwrap_err(),
        StoreError::Validation(_)
    ));

    let self_transfer = TransferActuator {
        from: addr(1),
        to: addr(1),
        amount: 1,
    };
    assert!(matches!(
        self_transfer.validate(&stores).unwrap_err(),
        StoreError::Validation(_)
    ));
}
