use crate::{ChainStore, Result, StorageError};
use ledger_core::{Block, Chain};
use sled::{Batch, Db, IVec};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const TREE_BLOCKS: &str = "blocks";
const KEY_TIP_HEIGHT: &[u8] = b"tip_height";

/// sled-backed store: one entry per block keyed by its big-endian position,
/// so tree order is chain order.
#[derive(Clone)]
pub struct SledStore {
  db: Db,
  path: PathBuf,
}

impl SledStore {
  pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
    let db = sled::open(path.as_ref())?;
    info!("sled store opened at {}", path.as_ref().display());
    Ok(Self::from_db(db, path))
  }

  /// Wrap a database that is already open, e.g. one shared with other trees.
  pub fn from_db<P: AsRef<Path>>(db: Db, path: P) -> Self {
    Self {
      db,
      path: path.as_ref().to_path_buf(),
    }
  }

  fn blocks(&self) -> Result<sled::Tree> {
    Ok(self.db.open_tree(TREE_BLOCKS)?)
  }

  pub fn tip_height(&self) -> Result<Option<u64>> {
    Ok(self.db.get(KEY_TIP_HEIGHT)?.map(|v| decode_height(&v)))
  }

  /// Drop every stored block and the tip marker.
  pub fn clear(&self) -> Result<()> {
    self.blocks()?.clear()?;
    self.db.remove(KEY_TIP_HEIGHT)?;
    self.db.flush()?;
    Ok(())
  }

  pub fn close(&self) -> Result<()> {
    self.db.flush()?;
    Ok(())
  }
}

fn decode_height(v: &IVec) -> u64 {
  let mut arr = [0u8; 8];
  let len = v.len().min(8);
  arr[8 - len..].copy_from_slice(&v[..len]);
  u64::from_be_bytes(arr)
}

impl ChainStore for SledStore {
  fn save(&self, chain: &Chain) -> Result<()> {
    let tree = self.blocks()?;
    let mut batch = Batch::default();
    for (position, block) in chain.blocks().iter().enumerate() {
      let bytes = bincode::serialize(block)?;
      batch.insert((position as u64).to_be_bytes().to_vec(), bytes);
    }

    // drop leftovers from a longer previous chain
    let keep = chain.len() as u64;
    for key in tree.iter().keys() {
      let key = key?;
      if decode_height(&key) >= keep {
        batch.remove(key);
      }
    }
    tree.apply_batch(batch)?;

    match chain.len().checked_sub(1) {
      Some(tip) => self.db.insert(KEY_TIP_HEIGHT, (tip as u64).to_be_bytes().to_vec())?,
      None => self.db.remove(KEY_TIP_HEIGHT)?,
    };

    self.db.flush()?;
    debug!("saved {} blocks to sled", chain.len());
    Ok(())
  }

  fn load(&self) -> Result<Chain> {
    let tree = self.blocks()?;
    if tree.is_empty() {
      return Err(StorageError::NotFound(self.path.clone()));
    }
    let blocks = tree
      .iter()
      .values()
      .map(|value| -> Result<Block> { Ok(bincode::deserialize(&value?)?) })
      .collect::<Result<Vec<_>>>()?;
    debug!("read {} blocks from sled", blocks.len());
    Ok(Chain::from_blocks(blocks))
  }
}
