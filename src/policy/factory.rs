//! Repair Policy Factory
//!
//! Decides which shards to read next so that, together with the shards the
//! caller already holds, a stripe can be repaired. Single-shard losses take
//! a local fast path (D/2 reads, or D for a global parity); everything else
//! searches the choice trie for the first sufficient subset that avoids the
//! broken shards and contains the available ones.

use std::collections::HashSet;

use crate::ec::layout::{LocalGroup, ShardLayout};
use crate::error::{Error, Result};
use crate::metrics;
use crate::policy::choices::{self, decode_choice};
use crate::policy::trie::{ChoiceTrie, ShardState};
use tracing::{debug, instrument, warn};

/// Plans shard loads for repairs of one (D, 2, G) layout
#[derive(Debug, Clone)]
pub struct PolicyFactory {
    layout: ShardLayout,
    trie: ChoiceTrie,
}

impl PolicyFactory {
    /// Create a factory backed by the embedded choice table for the layout.
    ///
    /// Fails with `ConfigurationUnsupported` when no table ships for this
    /// (D, G) pair; see [`PolicyFactory::with_table`] for other layouts.
    pub fn new(data_shards: usize, local_shards: usize, global_shards: usize) -> Result<Self> {
        let layout = ShardLayout::new(data_shards, local_shards, global_shards)?;
        let table = choices::precomputed(&layout).ok_or(Error::ConfigurationUnsupported {
            data_shards,
            local_shards,
            global_shards,
        })?;
        Self::build(layout, table)
    }

    /// Create a factory from a caller-supplied bit-packed choice table
    pub fn with_table(
        data_shards: usize,
        local_shards: usize,
        global_shards: usize,
        table: &[u64],
    ) -> Result<Self> {
        let layout = ShardLayout::new(data_shards, local_shards, global_shards)?;
        Self::build(layout, table)
    }

    fn build(layout: ShardLayout, table: &[u64]) -> Result<Self> {
        let mut trie = ChoiceTrie::new();
        for &mask in table {
            let choice = decode_choice(mask);
            if choice.len() != layout.data_shards()
                || choice.iter().any(|&i| i >= layout.total_shards())
            {
                return Err(Error::InvalidChoice(mask));
            }
            trie.insert(&choice);
        }

        debug!(
            data_shards = layout.data_shards(),
            global_shards = layout.global_shards(),
            choices = trie.len(),
            nodes = trie.node_count(),
            "Built choice trie"
        );

        Ok(Self { layout, trie })
    }

    /// Stripe geometry
    pub fn layout(&self) -> &ShardLayout {
        &self.layout
    }

    /// Number of sufficient subsets known to the factory
    pub fn choice_count(&self) -> usize {
        self.trie.len()
    }

    /// Compute the shards to load next.
    ///
    /// `available` are shards already in hand, `broken` are shards known to
    /// be lost. Both are treated as sets. The result never repeats an
    /// available shard.
    #[instrument(skip(self))]
    pub fn generate_policy(&self, available: &[usize], broken: &[usize]) -> Result<Vec<usize>> {
        let result = self.generate_inner(available, broken);
        let path = match &result {
            Ok(_) if available.is_empty() && broken.len() == 1 => {
                match self.repair_group(broken[0]) {
                    Some(_) => "local",
                    None => "global_parity",
                }
            }
            Ok(_) => "search",
            Err(Error::CannotRepair) => "cannot_repair",
            Err(_) => "rejected",
        };
        metrics::record_policy(path);
        result
    }

    fn generate_inner(&self, available: &[usize], broken: &[usize]) -> Result<Vec<usize>> {
        let total = self.layout.total_shards();
        if let Some(&shard) = available.iter().chain(broken).find(|&&i| i >= total) {
            return Err(Error::InvalidInputShard(shard));
        }
        let available = normalize(available)?;
        let broken = normalize(broken)?;
        if let Some(&shard) = available.iter().find(|i| broken.contains(i)) {
            return Err(Error::DuplicatedShard(shard));
        }

        if broken.is_empty() {
            return Err(Error::NoBrokenShard);
        }
        let max = self.layout.local_shards() + self.layout.global_shards();
        if broken.len() > max {
            return Err(Error::TooManyBrokenShards {
                broken: broken.len(),
                max,
            });
        }

        if available.is_empty() && broken.len() == 1 {
            let load = self.local_policy(broken[0]);
            debug!(broken = broken[0], ?load, "Single-shard repair policy");
            return Ok(load);
        }

        let mut known = vec![None; self.layout.total_shards()];
        for &i in &available {
            known[i] = Some(ShardState::Available);
        }
        for &i in &broken {
            known[i] = Some(ShardState::Broken);
        }

        for &shard in self.trie.root_shards() {
            if known[shard] == Some(ShardState::Broken) {
                continue;
            }
            let root = self.trie.root(shard).ok_or(Error::ConflictState(shard))?;
            if let Some(load) = self.trie.search(root, &known, available.len()) {
                debug!(root = shard, ?load, "Found repair policy");
                return Ok(load);
            }
        }

        warn!(?available, ?broken, "No shard combination can repair the stripe");
        Err(Error::CannotRepair)
    }

    /// Loads needed to repair a single shard without any shard in hand
    fn local_policy(&self, broken: usize) -> Vec<usize> {
        match self.layout.group_of(broken) {
            Some(group) => self
                .layout
                .group_members(group)
                .into_iter()
                .filter(|&i| i != broken)
                .collect(),
            None => (0..self.layout.data_shards()).collect(),
        }
    }

    /// Local group a lone broken shard is repaired from, `None` for global
    /// parities
    pub fn repair_group(&self, broken: usize) -> Option<LocalGroup> {
        self.layout.group_of(broken)
    }
}

/// Reject duplicates and sort ascending
fn normalize(shards: &[usize]) -> Result<Vec<usize>> {
    let mut seen = HashSet::with_capacity(shards.len());
    for &shard in shards {
        if !seen.insert(shard) {
            return Err(Error::DuplicatedShard(shard));
        }
    }

    let mut sorted = shards.to_vec();
    sorted.sort_unstable();
    Ok(sorted)
}
