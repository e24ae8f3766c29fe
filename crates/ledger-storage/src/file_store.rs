use crate::{ChainStore, Result, StorageError};
use ledger_core::Chain;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Whole-chain bincode file. Saves go through a sibling temp file that is
/// renamed over the target, so a reader sees either the old or the new chain.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ChainStore for FileStore {
    fn save(&self, chain: &Chain) -> Result<()> {
        let bytes = bincode::serialize(chain)?;
        let tmp = self.temp_path();
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            writer.write_all(&bytes)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        debug!("saved {} blocks to {}", chain.len(), self.path.display());
        Ok(())
    }

    fn load(&self) -> Result<Chain> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound(self.path.clone()))
            }
            Err(e) => return Err(e.into()),
        };
        let chain: Chain = bincode::deserialize(&bytes)?;
        debug!("read {} blocks from {}", chain.len(), self.path.display());
        Ok(chain)
    }
}
