use crate::{constants::DEFAULT_DIFFICULTY, constants::HASH_HEX_SIZE, pow::meets_difficulty};
use crate::{Block, PowError};
use tracing::{info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MinerConfig {
    /// Leading zero hex characters required in a mined hash.
    pub difficulty: u32,
    /// Upper bound on hash attempts. `None` searches forever.
    pub max_iterations: Option<u64>,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            max_iterations: None,
        }
    }
}

impl MinerConfig {
    pub fn new(difficulty: u32) -> Self {
        Self {
            difficulty,
            max_iterations: None,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MiningOutcome {
    pub nonce: u64,
    pub attempts: u64,
}

/// Sequential nonce search with an optional attempt budget.
#[derive(Clone, Debug, Default)]
pub struct Miner {
    config: MinerConfig,
}

impl Miner {
    pub fn new(config: MinerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MinerConfig {
        &self.config
    }

    pub fn difficulty(&self) -> u32 {
        self.config.difficulty
    }

    /// Mines `block` in place starting from its current nonce.
    ///
    /// On success the block's `hash` satisfies the difficulty and equals
    /// `block.calculate_hash()`. When the attempt budget runs out the block
    /// is left consistent at the last nonce tried and
    /// [`PowError::DifficultyUnreachable`] is returned.
    pub fn mine(&self, block: &mut Block) -> Result<MiningOutcome, PowError> {
        let difficulty = self.config.difficulty;
        if difficulty as usize > HASH_HEX_SIZE {
            return Err(PowError::DifficultyOutOfRange {
                difficulty,
                max: HASH_HEX_SIZE as u32,
            });
        }
        if self.config.max_iterations == Some(0) {
            return Err(PowError::DifficultyUnreachable {
                difficulty,
                attempts: 0,
            });
        }

        let mut attempts = 0u64;
        loop {
            block.hash = block.calculate_hash();
            attempts = attempts.saturating_add(1);

            if meets_difficulty(&block.hash, difficulty) {
                info!(
                    "Mined block {} with nonce {} after {} attempts: {}",
                    block.index, block.nonce, attempts, block.hash
                );
                return Ok(MiningOutcome {
                    nonce: block.nonce,
                    attempts,
                });
            }

            if let Some(max) = self.config.max_iterations {
                if attempts >= max {
                    warn!(
                        "Gave up mining block {} at difficulty {} after {} attempts",
                        block.index, difficulty, attempts
                    );
                    return Err(PowError::DifficultyUnreachable {
                        difficulty,
                        attempts,
                    });
                }
            }
            block.nonce = block.nonce.wrapping_add(1);
        }
    }
}
