use crate::constants::BLOCK_DATA_PREFIX;
use anyhow::{Context, Result};
use ledger_core::{Block, Chain, Miner, MinerConfig, Node, NodeRegistry};
use ledger_storage::{load_or_create, load_verified_or_create, ChainStore};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrchestratorConfig {
    pub miner: MinerConfig,
    pub blocks_per_cycle: u32,
    pub verify_on_load: bool,
}

/// A block mined during a cycle and the node it is credited to.
#[derive(Clone, Debug, Serialize)]
pub struct MinedBlock {
    pub index: u64,
    pub hash: String,
    pub nonce: u64,
    pub node: Node,
}

#[derive(Clone, Debug, Serialize)]
pub struct CycleReport {
    pub chain: Chain,
    pub mined: Vec<MinedBlock>,
    pub nodes: Vec<Node>,
}

/// Runs load -> mine -> save cycles against an injected store.
pub struct Orchestrator {
    store: Arc<dyn ChainStore>,
    registry: NodeRegistry,
    miner: Miner,
    blocks_per_cycle: u32,
    verify_on_load: bool,
    // Cycles read, extend and overwrite the same storage location.
    cycle_lock: Mutex<()>,
}

impl Orchestrator {
    pub fn new(
        store: Arc<dyn ChainStore>,
        registry: NodeRegistry,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            store,
            registry,
            miner: Miner::new(config.miner),
            blocks_per_cycle: config.blocks_per_cycle,
            verify_on_load: config.verify_on_load,
            cycle_lock: Mutex::new(()),
        }
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn load_or_create_chain(&self) -> Chain {
        if self.verify_on_load {
            load_verified_or_create(self.store.as_ref(), self.miner.difficulty())
        } else {
            load_or_create(self.store.as_ref())
        }
    }

    pub fn mine_and_append(&self, chain: &mut Chain, payload: impl Into<String>) -> Result<Block> {
        let block = chain
            .mine_and_append(payload, &self.miner)
            .context("mining failed")?;
        Ok(block.clone())
    }

    pub fn persist(&self, chain: &Chain) -> Result<()> {
        self.store.save(chain).context("failed to save blockchain")
    }

    pub fn select_node_for_block(&self, index: u64) -> &Node {
        self.registry.select_node_for_block(index)
    }

    /// The stored chain as it is now, without mining anything.
    pub fn current_chain(&self) -> Chain {
        let _guard = self.cycle_lock.lock().unwrap_or_else(|e| e.into_inner());
        self.load_or_create_chain()
    }

    /// Load (or create) the chain, mine `blocks_per_cycle` blocks, credit
    /// each to a node and save. Nothing is saved if any block fails to mine.
    pub fn run_cycle(&self) -> Result<CycleReport> {
        let _guard = self.cycle_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut chain = self.load_or_create_chain();

        let mut mined = Vec::with_capacity(self.blocks_per_cycle as usize);
        for i in 1..=self.blocks_per_cycle {
            let block = self.mine_and_append(&mut chain, format!("{BLOCK_DATA_PREFIX} {i} Data"))?;
            let node = self.select_node_for_block(block.index).clone();
            info!(
                "Block {} mined by {} with reputation {}",
                block.index, node.id, node.reputation
            );
            mined.push(MinedBlock {
                index: block.index,
                hash: block.hash,
                nonce: block.nonce,
                node,
            });
        }

        self.persist(&chain)?;
        info!("cycle complete, chain height {}", chain.len() - 1);

        Ok(CycleReport {
            chain,
            mined,
            nodes: self.registry.list_nodes().to_vec(),
        })
    }
}
