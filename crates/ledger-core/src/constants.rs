pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
pub const DEFAULT_DIFFICULTY: u32 = 4;
pub const GENESIS_DATA: &str = "Genesis Block";
pub const BLOCKS_PER_CYCLE: u32 = 5;
pub const DEFAULT_CHAIN_FILE: &str = "blockchain.dat";
