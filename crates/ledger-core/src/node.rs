//! Simulated participants used to attribute mined blocks.
//!
//! Nothing here is persisted or verified. The registry is rebuilt on every
//! run from a fixed list and only decides which name a block is credited to.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub reputation: i64,
    pub is_authority: bool,
}

impl Node {
    pub fn new(id: impl Into<String>, reputation: i64, is_authority: bool) -> Self {
        Self {
            id: id.into(),
            reputation,
            is_authority,
        }
    }
}

/// How a block index is mapped onto a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionPolicy {
    /// `nodes[index % len]`. Reputation and authority play no part.
    #[default]
    RoundRobin,
    /// Authorities only, each owning a slice of `index % total_reputation`
    /// proportional to its reputation. Deterministic for a given index.
    ReputationWeighted,
}

/// Non-empty, read-only set of nodes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeRegistry {
    nodes: Vec<Node>,
    policy: SelectionPolicy,
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self {
            nodes: default_nodes(),
            policy: SelectionPolicy::RoundRobin,
        }
    }
}

/// The five illustrative nodes every run starts with.
pub fn default_nodes() -> Vec<Node> {
    vec![
        Node::new("Node1", 50, true),
        Node::new("Node2", 30, false),
        Node::new("Node3", 80, true),
        Node::new("Node4", 60, false),
        Node::new("Node5", 90, true),
    ]
}

impl NodeRegistry {
    /// Returns `None` for an empty node list.
    pub fn new(nodes: Vec<Node>) -> Option<Self> {
        if nodes.is_empty() {
            return None;
        }
        Some(Self {
            nodes,
            policy: SelectionPolicy::RoundRobin,
        })
    }

    pub fn with_policy(mut self, policy: SelectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    pub fn list_nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn select_node_for_block(&self, index: u64) -> &Node {
        match self.policy {
            SelectionPolicy::RoundRobin => self.round_robin(index),
            SelectionPolicy::ReputationWeighted => self
                .reputation_weighted(index)
                .unwrap_or_else(|| self.round_robin(index)),
        }
    }

    fn round_robin(&self, index: u64) -> &Node {
        &self.nodes[(index % self.nodes.len() as u64) as usize]
    }

    fn reputation_weighted(&self, index: u64) -> Option<&Node> {
        let weight = |node: &Node| -> u64 {
            if node.is_authority && node.reputation > 0 {
                node.reputation as u64
            } else {
                0
            }
        };
        let total = self
            .nodes
            .iter()
            .fold(0u64, |acc, node| acc.saturating_add(weight(node)));
        if total == 0 {
            return None;
        }

        let slot = index % total;
        let mut cumulative = 0u64;
        self.nodes.iter().find(|node| {
            cumulative = cumulative.saturating_add(weight(*node));
            slot < cumulative
        })
    }
}
