//! LRC Shard Layout
//!
//! Fixed positional layout of an LRC stripe with D data shards, two local
//! parities and G global parities:
//!
//! ```text
//! index:  0 .. D/2-1 | D/2 .. D-1 |   D    |  D+1   | D+2 .. D+G+1
//!         left data  | right data | left   | right  | global parity
//!                                   local    local
//! ```
//!
//! The global code is built over D data inputs and G+1 outputs; its first
//! output is the "combined" value `shard[D] ^ shard[D+1]`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Number of local parity shards supported
pub const LOCAL_SHARDS: usize = 2;

/// One of the two local groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocalGroup {
    Left,
    Right,
}

impl std::fmt::Display for LocalGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocalGroup::Left => write!(f, "left"),
            LocalGroup::Right => write!(f, "right"),
        }
    }
}

/// Validated geometry of an LRC stripe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardLayout {
    data_shards: usize,
    global_shards: usize,
}

impl ShardLayout {
    /// Validate a (data, local, global) triple
    pub fn new(data_shards: usize, local_shards: usize, global_shards: usize) -> Result<Self> {
        if local_shards != LOCAL_SHARDS {
            return Err(Error::LocalShardsUnsupported(local_shards));
        }
        if data_shards == 0 || data_shards % 2 != 0 {
            return Err(Error::DataShardsInvalid(data_shards));
        }
        // The global generator has D + G + 1 Vandermonde rows
        if data_shards + global_shards + 1 > 256 {
            return Err(Error::InvalidEcConfig(format!(
                "{} data + {} global shards exceed GF(2^8) limits",
                data_shards, global_shards
            )));
        }

        Ok(Self {
            data_shards,
            global_shards,
        })
    }

    /// Number of data shards (D)
    pub fn data_shards(&self) -> usize {
        self.data_shards
    }

    /// Number of local parity shards (always 2)
    pub fn local_shards(&self) -> usize {
        LOCAL_SHARDS
    }

    /// Number of global parity shards (G)
    pub fn global_shards(&self) -> usize {
        self.global_shards
    }

    /// Total stripe width (D + 2 + G)
    pub fn total_shards(&self) -> usize {
        self.data_shards + LOCAL_SHARDS + self.global_shards
    }

    /// Data shards per local group (D/2)
    pub fn half(&self) -> usize {
        self.data_shards / 2
    }

    /// Index of the left local parity (D)
    pub fn left_parity(&self) -> usize {
        self.data_shards
    }

    /// Index of the right local parity (D+1)
    pub fn right_parity(&self) -> usize {
        self.data_shards + 1
    }

    /// Members of a local group, data indices first and the parity last
    pub fn group_members(&self, group: LocalGroup) -> Vec<usize> {
        let (data, parity) = match group {
            LocalGroup::Left => (0..self.half(), self.left_parity()),
            LocalGroup::Right => (self.half()..self.data_shards, self.right_parity()),
        };
        data.chain(std::iter::once(parity)).collect()
    }

    /// Local group a shard belongs to, `None` for global parities
    pub fn group_of(&self, index: usize) -> Option<LocalGroup> {
        if index < self.half() || index == self.left_parity() {
            Some(LocalGroup::Left)
        } else if index < self.data_shards || index == self.right_parity() {
            Some(LocalGroup::Right)
        } else {
            None
        }
    }

    /// Stripe indices feeding the global code, in global-code order.
    ///
    /// Data shards, then the combined slot (stored at D+1), then the true
    /// global parities.
    pub fn global_slots(&self) -> Vec<usize> {
        (0..self.data_shards)
            .chain(self.right_parity()..self.total_shards())
            .collect()
    }

    /// Whether a global repair starting from `present` restores every shard.
    ///
    /// Mirrors the repair sequence of the codec: one local pass, then the
    /// global code (which sees the combined slot only when both local
    /// parities are known), then local parities are recomputed from data.
    pub fn recoverable(&self, present: &[bool]) -> bool {
        if present.len() != self.total_shards() {
            return false;
        }
        let mut known = present.to_vec();

        for group in [LocalGroup::Left, LocalGroup::Right] {
            let members = self.group_members(group);
            let count = members.iter().filter(|&&i| known[i]).count();
            if count == self.half() {
                for i in members {
                    known[i] = true;
                }
            }
        }
        if known.iter().all(|&k| k) {
            return true;
        }

        let combined = known[self.left_parity()] && known[self.right_parity()];
        let data = known[..self.data_shards].iter().filter(|&&k| k).count();
        let global = known[self.right_parity() + 1..]
            .iter()
            .filter(|&&k| k)
            .count();
        data + usize::from(combined) + global >= self.data_shards
    }
}
