//! Memo table of visited states.
//!
//! Nodes are keyed by the canonical state's string key, so transpositions
//! share statistics. The table is owned by one engine and is only emptied
//! by an explicit clear.

use crate::node::SearchNode;
use std::collections::HashMap;

/// Canonical state key.
pub type StateKey = Vec<u8>;

#[derive(Debug, Default)]
pub struct Tree {
    nodes: HashMap<StateKey, SearchNode>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &[u8]) -> Option<&SearchNode> {
        self.nodes.get(key)
    }

    pub fn get_mut(&mut self, key: &[u8]) -> Option<&mut SearchNode> {
        self.nodes.get_mut(key)
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        self.nodes.contains_key(key)
    }

    pub fn insert(&mut self, key: StateKey, node: SearchNode) {
        self.nodes.insert(key, node);
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
