use thiserror::Error;

/// Errors raised by the guarded miner.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PowError {
    #[error("difficulty {difficulty} exceeds the {max} hex characters of a hash")]
    DifficultyOutOfRange { difficulty: u32, max: u32 },

    #[error("difficulty {difficulty} not reached after {attempts} attempts")]
    DifficultyUnreachable { difficulty: u32, attempts: u64 },
}

/// Reasons a chain fails validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("chain has no blocks")]
    Empty,

    #[error("first block is not a genesis block (index {index})")]
    InvalidGenesis { index: u64 },

    #[error("block at position {position} has index {got}, expected {expected}")]
    IndexMismatch {
        position: usize,
        expected: u64,
        got: u64,
    },

    #[error("block {index} does not link to the hash of its predecessor")]
    PreviousHashMismatch { index: u64 },

    #[error("block {index} stored hash does not match its contents")]
    HashMismatch { index: u64 },

    #[error("block {index} hash does not meet difficulty {difficulty}")]
    DifficultyNotMet { index: u64, difficulty: u32 },
}
