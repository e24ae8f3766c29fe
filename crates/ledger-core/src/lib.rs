use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub mod chain;
pub mod constants;
pub mod error;
pub mod mine;
pub mod node;

pub use chain::Chain;
pub use error::{ChainError, PowError};
pub use mine::{Miner, MinerConfig, MiningOutcome};
pub use node::{Node, NodeRegistry, SelectionPolicy};

use constants::GENESIS_DATA;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub previous_hash: String,
    pub timestamp: String,
    pub data: String,
    pub hash: String,
    pub nonce: u64,
}

impl Block {
    /// Recompute the digest from the block's current field values.
    /// The stored `hash` field is not an input.
    pub fn calculate_hash(&self) -> String {
        calculate_hash(
            self.index,
            &self.previous_hash,
            &self.timestamp,
            &self.data,
            self.nonce,
        )
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 0 && self.previous_hash.is_empty()
    }
}

/// SHA-256 over the textual concatenation of the hashable fields, hex encoded.
pub fn calculate_hash(
    index: u64,
    previous_hash: &str,
    timestamp: &str,
    data: &str,
    nonce: u64,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(hash_record(index, previous_hash, timestamp, data, nonce).as_bytes());
    hex::encode(hasher.finalize())
}

pub fn hash_record(
    index: u64,
    previous_hash: &str,
    timestamp: &str,
    data: &str,
    nonce: u64,
) -> String {
    format!("{index}{previous_hash}{timestamp}{data}{nonce}")
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

/// The first block of every chain. It is neither hashed nor mined, so its
/// `hash` stays empty and block 1 links to the empty string.
pub fn genesis_block() -> Block {
    Block {
        index: 0,
        previous_hash: String::new(),
        timestamp: now(),
        data: GENESIS_DATA.to_string(),
        hash: String::new(),
        nonce: 0,
    }
}

/// Build the successor of `previous` with a provisional hash. The hash is
/// overwritten once the block is mined.
pub fn next_block(previous: &Block, data: impl Into<String>) -> Block {
    let mut block = Block {
        index: previous.index + 1,
        previous_hash: previous.hash.clone(),
        timestamp: now(),
        data: data.into(),
        hash: String::new(),
        nonce: 0,
    };
    block.hash = block.calculate_hash();
    block
}

pub mod pow {
    use super::Block;
    use crate::constants::HASH_HEX_SIZE;

    /// True when the first `difficulty` characters of `hash` are all `'0'`.
    pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
        let difficulty = difficulty as usize;
        if difficulty > HASH_HEX_SIZE || hash.len() < difficulty {
            return false;
        }
        hash.bytes().take(difficulty).all(|b| b == b'0')
    }

    /// Mine the block in place by incrementing the nonce until its hash has
    /// `difficulty` leading zero hex characters. There is no iteration bound:
    /// a difficulty above the hash length never returns. Use
    /// [`crate::Miner`] with `max_iterations` when that matters.
    pub fn mine_block(block: &mut Block, difficulty: u32) {
        loop {
            block.hash = block.calculate_hash();
            if meets_difficulty(&block.hash, difficulty) {
                return;
            }
            block.nonce = block.nonce.wrapping_add(1);
        }
    }

    pub fn count_leading_zero_chars(hash: &str) -> u32 {
        hash.bytes().take_while(|b| *b == b'0').count() as u32
    }
}
