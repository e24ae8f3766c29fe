use crate::{genesis_block, next_block, pow::meets_difficulty, Block, ChainError, Miner, PowError};
use serde::{Deserialize, Serialize};

/// Append-only sequence of blocks starting at genesis.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
    blocks: Vec<Block>,
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}

impl Chain {
    /// A chain holding only a fresh genesis block.
    pub fn new() -> Self {
        Self {
            blocks: vec![genesis_block()],
        }
    }

    /// Wrap already-built blocks, e.g. ones read back from storage.
    /// Nothing is checked; call [`Chain::validate`] when that matters.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn tip(&self) -> Option<&Block> {
        self.blocks.last()
    }

    /// Push `block` onto the end. Linkage is the caller's responsibility.
    pub fn append(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Build the successor of the tip, mine it and append it. An empty chain
    /// gets a genesis block first.
    pub fn mine_and_append(
        &mut self,
        data: impl Into<String>,
        miner: &Miner,
    ) -> Result<&Block, PowError> {
        if self.blocks.is_empty() {
            self.blocks.push(genesis_block());
        }
        let previous = &self.blocks[self.blocks.len() - 1];
        let mut block = next_block(previous, data);
        miner.mine(&mut block)?;
        self.blocks.push(block);
        Ok(&self.blocks[self.blocks.len() - 1])
    }

    /// Re-check every structural and proof-of-work invariant.
    ///
    /// The genesis block must have index 0 and an empty previous hash; its
    /// hash is not checked. Every later block must follow its predecessor by
    /// one, link to its hash, carry a hash matching its contents and meet
    /// `difficulty`.
    pub fn validate(&self, difficulty: u32) -> Result<(), ChainError> {
        let genesis = self.blocks.first().ok_or(ChainError::Empty)?;
        if !genesis.is_genesis() {
            return Err(ChainError::InvalidGenesis {
                index: genesis.index,
            });
        }

        for (position, pair) in self.blocks.windows(2).enumerate() {
            let (previous, block) = (&pair[0], &pair[1]);
            let expected = previous.index + 1;
            if block.index != expected {
                return Err(ChainError::IndexMismatch {
                    position: position + 1,
                    expected,
                    got: block.index,
                });
            }
            if block.previous_hash != previous.hash {
                return Err(ChainError::PreviousHashMismatch { index: block.index });
            }
            if block.hash != block.calculate_hash() {
                return Err(ChainError::HashMismatch { index: block.index });
            }
            if !meets_difficulty(&block.hash, difficulty) {
                return Err(ChainError::DifficultyNotMet {
                    index: block.index,
                    difficulty,
                });
            }
        }
        Ok(())
    }

    pub fn is_valid(&self, difficulty: u32) -> bool {
        self.validate(difficulty).is_ok()
    }
}
