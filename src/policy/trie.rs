//! Choice Trie
//!
//! Prefix tree over the sufficient shard subsets of a layout. Every subset
//! is stored as an ascending root-to-leaf path, so subsets sharing a prefix
//! share nodes and a broken shard prunes every subset below it at once.
//!
//! Nodes live in an arena and refer to their children by index. Roots and
//! children keep insertion order, which makes searches deterministic.

use std::collections::HashMap;

/// Index of a node in the trie arena
pub type NodeId = usize;

/// What the caller already knows about a shard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShardState {
    /// Already loaded, costs nothing to use
    Available,
    /// Known bad, must not be used
    Broken,
}

#[derive(Debug, Clone)]
struct ChoiceNode {
    shard: usize,
    children: Vec<NodeId>,
    /// A subset ends here
    leaf: bool,
}

/// Prefix tree of sufficient shard subsets
#[derive(Debug, Clone, Default)]
pub struct ChoiceTrie {
    nodes: Vec<ChoiceNode>,
    root_shards: Vec<usize>,
    roots: HashMap<usize, NodeId>,
    choices: usize,
}

impl ChoiceTrie {
    /// Create an empty trie
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one subset; `choice` must be sorted ascending
    pub fn insert(&mut self, choice: &[usize]) {
        let Some((&first, rest)) = choice.split_first() else {
            return;
        };

        let mut current = match self.roots.get(&first) {
            Some(&id) => id,
            None => {
                let id = self.push_node(first);
                self.roots.insert(first, id);
                self.root_shards.push(first);
                id
            }
        };

        for &shard in rest {
            let existing = self.nodes[current]
                .children
                .iter()
                .copied()
                .find(|&child| self.nodes[child].shard == shard);
            current = match existing {
                Some(child) => child,
                None => {
                    let child = self.push_node(shard);
                    self.nodes[current].children.push(child);
                    child
                }
            };
        }

        if !self.nodes[current].leaf {
            self.nodes[current].leaf = true;
            self.choices += 1;
        }
    }

    fn push_node(&mut self, shard: usize) -> NodeId {
        self.nodes.push(ChoiceNode {
            shard,
            children: Vec::new(),
            leaf: false,
        });
        self.nodes.len() - 1
    }

    /// Number of distinct subsets stored
    pub fn len(&self) -> usize {
        self.choices
    }

    /// Whether no subset has been inserted
    pub fn is_empty(&self) -> bool {
        self.choices == 0
    }

    /// Number of arena nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Root shards in insertion order
    pub fn root_shards(&self) -> &[usize] {
        &self.root_shards
    }

    /// Node for a root shard
    pub fn root(&self, shard: usize) -> Option<NodeId> {
        self.roots.get(&shard).copied()
    }

    /// Depth-first search below `root` for the first subset that avoids
    /// every broken shard and contains every available one.
    ///
    /// `known` is indexed by shard. Returns the shards of that subset the
    /// caller does not have yet, in path order.
    pub fn search(
        &self,
        root: NodeId,
        known: &[Option<ShardState>],
        available: usize,
    ) -> Option<Vec<usize>> {
        let mut load = Vec::new();
        self.walk(root, known, available, &mut load).then_some(load)
    }

    /// `unseen` counts available shards not yet met on the current path
    fn walk(
        &self,
        id: NodeId,
        known: &[Option<ShardState>],
        unseen: usize,
        load: &mut Vec<usize>,
    ) -> bool {
        let node = &self.nodes[id];
        let state = known.get(node.shard).copied().flatten();

        let unseen = match state {
            Some(ShardState::Broken) => return false,
            Some(ShardState::Available) => unseen.saturating_sub(1),
            None => {
                load.push(node.shard);
                unseen
            }
        };

        if node.leaf && unseen == 0 {
            return true;
        }
        for &child in &node.children {
            if self.walk(child, known, unseen, load) {
                return true;
            }
        }

        if state.is_none() {
            load.pop();
        }
        false
    }
}
