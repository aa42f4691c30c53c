//! Query service tests: the same state answered at head, solid, and
//! quorum-confirmed consistency points.

use std::sync::Arc;
use tessera_chainbase::{Chainbase, ChainbaseConfig, MemoryBackend};
use tessera_store::{QueryService, StoreBundle};
use tessera_types::{Account, Address, Block};

fn addr(byte: u8) -> Address {
    [byte; 32]
}

fn open_bundle(solid_offset: usize) -> StoreBundle {
    let db = Chainbase::new(
        Arc::new(MemoryBackend::new()),
        ChainbaseConfig {
            max_layers: 256,
            solid_offset,
        },
    );
    StoreBundle::new(&db).unwrap()
}

/// Apply one block: store it, bump the chain head parameter, credit the
/// producer.
fn apply_block(stores: &StoreBundle, number: u64) {
    let session = stores.chainbase().build_session().unwrap();
    let block = Block::new(number, [0u8; 32], addr(9), number * 1_000, vec![]);
    stores.blocks.put(&block).unwrap();
    stores.properties.set_latest_block_number(number).unwrap();
    stores
        .accounts
        .put(&Account::new(addr(9), number * 10))
        .unwrap();
    session.commit().unwrap();
}

#[test]
fn head_and_solid_disagree_by_the_configured_offset() {
    let stores = open_bundle(1);

    apply_block(&stores, 1);
    apply_block(&stores, 2);
    apply_block(&stores, 3);

    let head = QueryService::head(stores.clone());
    let solid = QueryService::solid(stores.clone());

    assert_eq!(head.latest_block_number().unwrap(), Some(3));
    assert_eq!(solid.latest_block_number().unwrap(), Some(2));

    assert_eq!(head.block_by_number(3).unwrap().unwrap().number(), 3);
    assert_eq!(solid.block_by_number(3).unwrap(), None);
    assert_eq!(solid.block_by_number(2).unwrap().unwrap().number(), 2);

    // Producer balance as of the solid view lags the head too.
    assert_eq!(head.account(&addr(9)).unwrap().unwrap().balance, 30);
    assert_eq!(solid.account(&addr(9)).unwrap().unwrap().balance, 20);
}

#[test]
fn confirmed_view_follows_the_quorum_depth() {
    let stores = open_bundle(0);

    apply_block(&stores, 1);
    apply_block(&stores, 2);
    apply_block(&stores, 3);

    let confirmed = QueryService::confirmed(stores.clone());

    // Nothing confirmed yet: only backend state is visible.
    assert_eq!(confirmed.latest_block_number().unwrap(), None);
    assert_eq!(confirmed.account(&addr(9)).unwrap(), None);

    stores.chainbase().set_confirmed_depth(2);
    assert_eq!(confirmed.latest_block_number().unwrap(), Some(2));

    stores.chainbase().set_confirmed_depth(3);
    assert_eq!(confirmed.latest_block_number().unwrap(), Some(3));
}

#[test]
fn latest_blocks_respect_the_cursor() {
    let stores = open_bundle(2);

    for number in 1..6 {
        apply_block(&stores, number);
    }

    let head = QueryService::head(stores.clone());
    let solid = QueryService::solid(stores.clone());

    let head_numbers: Vec<u64> = head
        .latest_blocks(3)
        .unwrap()
        .iter()
        .map(Block::number)
        .collect();
    assert_eq!(head_numbers, vec![5, 4, 3]);

    let solid_numbers: Vec<u64> = solid
        .latest_blocks(3)
        .unwrap()
        .iter()
        .map(Block::number)
        .collect();
    assert_eq!(solid_numbers, vec![3, 2, 1]);
}

#[test]
fn a_reorg_is_invisible_below_the_cursors() {
    let stores = open_bundle(1);

    apply_block(&stores, 1);
    apply_block(&stores, 2);

    let head = QueryService::head(stores.clone());
    let solid = QueryService::solid(stores.clone());

    // A candidate block is applied and then abandoned.
    {
        let _session = stores.chainbase().build_session().unwrap();
        stores.properties.set_latest_block_number(99).unwrap();
        assert_eq!(head.latest_block_number().unwrap(), Some(99));
        assert_eq!(solid.latest_block_number().unwrap(), Some(2));
    }

    assert_eq!(head.latest_block_number().unwrap(), Some(2));
    assert_eq!(solid.latest_block_number().unwrap(), Some(1));
}
