pub mod file_store;
pub mod sled_store;

use ledger_core::Chain;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

pub use file_store::FileStore;
pub use sled_store::SledStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("no stored chain at {0}")]
    NotFound(PathBuf),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored chain could not be decoded: {0}")]
    Decode(#[from] bincode::Error),

    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// A single named location holding one whole chain.
pub trait ChainStore: Send + Sync {
    /// Replace whatever is stored with `chain`.
    fn save(&self, chain: &Chain) -> Result<()>;
    fn load(&self) -> Result<Chain>;
}

/// Load the stored chain, or start a new one if loading fails for any reason.
/// Missing and corrupt storage end up the same way; only the log differs.
pub fn load_or_create<S: ChainStore + ?Sized>(store: &S) -> Chain {
    match store.load() {
        Ok(chain) => {
            info!("loaded chain with {} blocks", chain.len());
            chain
        }
        Err(StorageError::NotFound(path)) => {
            info!("no chain at {}, starting from genesis", path.display());
            Chain::new()
        }
        Err(e) => {
            warn!("discarding unreadable chain: {e}");
            Chain::new()
        }
    }
}

/// Like [`load_or_create`], but a chain that fails validation at
/// `difficulty` is also replaced by a fresh one.
pub fn load_verified_or_create<S: ChainStore + ?Sized>(store: &S, difficulty: u32) -> Chain {
    let chain = load_or_create(store);
    match chain.validate(difficulty) {
        Ok(()) => chain,
        Err(e) => {
            warn!("discarding invalid chain: {e}");
            Chain::new()
        }
    }
}
