mod helpers;

use helpers::{
    create_temp_file_store, create_temp_sled_store, mined_chain, reopen_sled_store,
    teardown_sled_store, TEST_DIFFICULTY,
};
use ledger_core::{genesis_block, Chain};
use ledger_storage::{
    load_or_create, load_verified_or_create, ChainStore, FileStore, SledStore, StorageError,
};
use std::fs;
use tempfile::tempdir;

fn assert_same_chain(left: &Chain, right: &Chain) {
    assert_eq!(left.len(), right.len());
    for (a, b) in left.blocks().iter().zip(right.blocks()) {
        assert_eq!(a.index, b.index);
        assert_eq!(a.previous_hash, b.previous_hash);
        assert_eq!(a.timestamp, b.timestamp);
        assert_eq!(a.data, b.data);
        assert_eq!(a.hash, b.hash);
        assert_eq!(a.nonce, b.nonce);
    }
}

#[tokio::test]
async fn test_file_round_trip() -> anyhow::Result<()> {
    let (temp_dir, store) = create_temp_file_store();
    for k in [0, 1, 5, 20] {
        let chain = mined_chain(k);
        store.save(&chain)?;
        let loaded = store.load()?;
        assert_same_chain(&chain, &loaded);
        assert!(loaded.is_valid(TEST_DIFFICULTY));
    }
    temp_dir.close()?;
    Ok(())
}

#[tokio::test]
async fn test_file_persistence_across_handles() -> anyhow::Result<()> {
    let (temp_dir, store) = create_temp_file_store();
    let chain = mined_chain(3);
    store.save(&chain)?;
    drop(store);

    // A new handle on the same path sees the saved chain
    let reopened = FileStore::new(temp_dir.path().join("blockchain.dat"));
    assert_same_chain(&chain, &reopened.load()?);
    temp_dir.close()?;
    Ok(())
}

#[tokio::test]
async fn test_file_save_overwrites() -> anyhow::Result<()> {
    let (temp_dir, store) = create_temp_file_store();
    store.save(&mined_chain(6))?;
    let shorter = mined_chain(2);
    store.save(&shorter)?;
    assert_same_chain(&shorter, &store.load()?);
    temp_dir.close()?;
    Ok(())
}

#[tokio::test]
async fn test_file_missing_falls_back_to_genesis() -> anyhow::Result<()> {
    let (temp_dir, store) = create_temp_file_store();
    assert!(matches!(store.load(), Err(StorageError::NotFound(_))));

    let chain = load_or_create(&store);
    assert_eq!(chain.len(), 1);
    assert_eq!(chain.blocks()[0].index, 0);
    assert!(chain.blocks()[0].previous_hash.is_empty());
    temp_dir.close()?;
    Ok(())
}

#[tokio::test]
async fn test_file_corrupt_falls_back_to_genesis() -> anyhow::Result<()> {
    let (temp_dir, store) = create_temp_file_store();
    store.save(&mined_chain(4))?;

    // Truncate the encoded chain halfway through
    let bytes = fs::read(store.path())?;
    fs::write(store.path(), &bytes[..bytes.len() / 2])?;
    assert!(matches!(store.load(), Err(StorageError::Decode(_))));

    let chain = load_or_create(&store);
    assert_eq!(chain.len(), 1);
    assert!(chain.blocks()[0].is_genesis());
    temp_dir.close()?;
    Ok(())
}

#[tokio::test]
async fn test_load_trusts_tampered_chain_unless_verified() -> anyhow::Result<()> {
    let (temp_dir, store) = create_temp_file_store();
    let mut blocks = mined_chain(3).into_blocks();
    blocks[2].data = "rewritten history".to_string();
    let tampered = Chain::from_blocks(blocks);
    store.save(&tampered)?;

    // The plain load path does not look inside the chain
    assert_same_chain(&tampered, &load_or_create(&store));

    let verified = load_verified_or_create(&store, TEST_DIFFICULTY);
    assert_eq!(verified.len(), 1);
    temp_dir.close()?;
    Ok(())
}

#[tokio::test]
async fn test_verified_load_keeps_valid_chain() -> anyhow::Result<()> {
    let (temp_dir, store) = create_temp_file_store();
    let chain = mined_chain(5);
    store.save(&chain)?;
    assert_same_chain(&chain, &load_verified_or_create(&store, TEST_DIFFICULTY));
    temp_dir.close()?;
    Ok(())
}

#[tokio::test]
async fn test_sled_round_trip() -> anyhow::Result<()> {
    let (temp_dir, store) = create_temp_sled_store();
    let chain = mined_chain(10);
    store.save(&chain)?;
    assert_same_chain(&chain, &store.load()?);
    assert_eq!(store.tip_height()?, Some(10));
    teardown_sled_store(temp_dir, store);
    Ok(())
}

#[tokio::test]
async fn test_sled_save_drops_stale_blocks() -> anyhow::Result<()> {
    let (temp_dir, store) = create_temp_sled_store();
    store.save(&mined_chain(8))?;
    let shorter = mined_chain(3);
    store.save(&shorter)?;
    assert_same_chain(&shorter, &store.load()?);
    assert_eq!(store.tip_height()?, Some(3));
    teardown_sled_store(temp_dir, store);
    Ok(())
}

#[tokio::test]
async fn test_sled_persistence() -> anyhow::Result<()> {
    let (temp_dir, store) = create_temp_sled_store();
    let chain = mined_chain(2);
    store.save(&chain)?;
    store.close()?;
    drop(store);

    // Re-open the SledStore and verify the chain persists
    let store = reopen_sled_store(temp_dir.path())?;
    assert_same_chain(&chain, &store.load()?);
    teardown_sled_store(temp_dir, store);
    Ok(())
}

#[tokio::test]
async fn test_sled_empty_database() -> anyhow::Result<()> {
    let (temp_dir, store) = create_temp_sled_store();
    assert!(matches!(store.load(), Err(StorageError::NotFound(_))));
    assert_eq!(store.tip_height()?, None);
    let chain = load_or_create(&store);
    assert_eq!(chain.len(), 1);
    teardown_sled_store(temp_dir, store);
    Ok(())
}

#[tokio::test]
async fn test_sled_corrupt_block_falls_back() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    // One Db handle for the whole test, so the directory lock is never re-acquired
    let sled_db = sled::open(temp_dir.path())?;
    let store = SledStore::from_db(sled_db.clone(), temp_dir.path());
    store.save(&mined_chain(2))?;

    // Overwrite block 1 with bytes that do not decode as a block
    let blocks = sled_db.open_tree("blocks")?;
    blocks.insert(1u64.to_be_bytes(), vec![0u8; 3])?;
    sled_db.flush()?;

    assert!(matches!(store.load(), Err(StorageError::Decode(_))));
    let chain = load_or_create(&store);
    assert_eq!(chain.len(), 1);
    drop(blocks);
    drop(sled_db);
    teardown_sled_store(temp_dir, store);
    Ok(())
}

#[tokio::test]
async fn test_store_trait_objects() -> anyhow::Result<()> {
    let (file_dir, file_store) = create_temp_file_store();
    let (sled_dir, sled_store) = create_temp_sled_store();
    let chain = mined_chain(1);
    {
        let stores: Vec<&dyn ChainStore> = vec![&file_store, &sled_store];
        for store in stores {
            store.save(&chain)?;
            assert_same_chain(&chain, &load_or_create(store));
        }
    }
    file_dir.close()?;
    teardown_sled_store(sled_dir, sled_store);
    Ok(())
}

#[tokio::test]
async fn test_genesis_only_chain_round_trips() -> anyhow::Result<()> {
    let (temp_dir, store) = create_temp_file_store();
    let chain = Chain::from_blocks(vec![genesis_block()]);
    store.save(&chain)?;
    let loaded = store.load()?;
    assert_eq!(loaded, chain);
    assert!(loaded.blocks()[0].hash.is_empty());
    temp_dir.close()?;
    Ok(())
}
