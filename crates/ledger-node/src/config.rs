use crate::constants::{DEFAULT_DATA_DIR, DEFAULT_LISTEN};
use crate::orchestrator::OrchestratorConfig;
use clap::{Parser, ValueEnum};
use ledger_core::constants::{BLOCKS_PER_CYCLE, DEFAULT_CHAIN_FILE, DEFAULT_DIFFICULTY};
use ledger_core::{MinerConfig, SelectionPolicy};
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Single bincode file
    File,
    /// sled database directory
    Sled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Selection {
    RoundRobin,
    ReputationWeighted,
}

impl From<Selection> for SelectionPolicy {
    fn from(selection: Selection) -> Self {
        match selection {
            Selection::RoundRobin => SelectionPolicy::RoundRobin,
            Selection::ReputationWeighted => SelectionPolicy::ReputationWeighted,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "ledger-node")]
#[command(about = "Mines and serves a proof-of-work demo chain")]
pub struct Args {
    /// Address to listen on, e.g. 127.0.0.1:8080
    #[arg(long, default_value = DEFAULT_LISTEN)]
    pub listen: String,

    /// Where the chain is stored
    #[arg(long, value_enum, default_value_t = Backend::File)]
    pub backend: Backend,

    /// Chain file for the file backend
    #[arg(long, default_value = DEFAULT_CHAIN_FILE)]
    pub chain_file: PathBuf,

    /// Data directory for the sled backend
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Leading zero hex characters required in each mined hash
    #[arg(long, default_value_t = DEFAULT_DIFFICULTY,
          value_parser = clap::value_parser!(u32).range(0..=64))]
    pub difficulty: u32,

    /// Blocks mined per request
    #[arg(long, default_value_t = BLOCKS_PER_CYCLE)]
    pub blocks_per_request: u32,

    /// Give up on a block after this many hash attempts (default: never)
    #[arg(long)]
    pub max_iterations: Option<u64>,

    /// How each mined block is attributed to a node
    #[arg(long, value_enum, default_value_t = Selection::RoundRobin)]
    pub selection: Selection,

    /// Re-validate the stored chain on load and discard it if invalid
    #[arg(long)]
    pub verify_on_load: bool,
}

impl Args {
    pub fn miner_config(&self) -> MinerConfig {
        MinerConfig {
            difficulty: self.difficulty,
            max_iterations: self.max_iterations,
        }
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            miner: self.miner_config(),
            blocks_per_cycle: self.blocks_per_request,
            verify_on_load: self.verify_on_load,
        }
    }
}
