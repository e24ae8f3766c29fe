#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::thread::sleep;
use std::time::Duration;

use ledger_core::{Chain, Miner, MinerConfig};
use ledger_storage::{FileStore, SledStore, StorageError};
use rand::{distributions::Alphanumeric, Rng};
use tempfile::{tempdir, TempDir};

pub const TEST_DIFFICULTY: u32 = 1;

pub fn create_temp_file_store() -> (TempDir, FileStore) {
    // Scratch directory holding a single chain file
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let store = FileStore::new(temp_dir.path().join("blockchain.dat"));
    (temp_dir, store)
}

pub fn create_temp_sled_store() -> (TempDir, SledStore) {
    // Create a temporary directory for the sled database
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let db_path = temp_dir.path().to_path_buf();
    (
        temp_dir,
        SledStore::open(db_path).expect("Failed to open SledStore"),
    )
}

/// Open a sled directory that a just-dropped handle may still hold locked.
/// sled's background flusher releases the lock shortly after the drop.
pub fn reopen_sled_store(path: &Path) -> Result<SledStore, StorageError> {
    let mut attempts = 0;
    loop {
        match SledStore::open(path) {
            Ok(store) => return Ok(store),
            Err(StorageError::Sled(sled::Error::Io(e)))
                if e.kind() == std::io::ErrorKind::WouldBlock && attempts < 50 =>
            {
                attempts += 1;
                sleep(Duration::from_millis(20));
            }
            Err(e) => return Err(e),
        }
    }
}

pub fn random_payload() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(24)
        .map(char::from)
        .collect()
}

/// Genesis plus `k` blocks mined at [`TEST_DIFFICULTY`].
pub fn mined_chain(k: usize) -> Chain {
    let miner = Miner::new(MinerConfig::new(TEST_DIFFICULTY));
    let mut chain = Chain::new();
    for _ in 0..k {
        chain
            .mine_and_append(random_payload(), &miner)
            .expect("mining at low difficulty succeeds");
    }
    chain
}

pub fn teardown_sled_store(temp_dir: TempDir, store: SledStore) {
    let db_path = temp_dir.path().to_path_buf();
    store.clear().expect("Failed to clear the store");
    drop(store);
    temp_dir.close().expect("Failed to delete temp dir");
    let _ = fs::remove_dir_all(&db_path);
    // Verify the directory is removed
    assert!(!db_path.exists(), "Database directory should be removed");
}
