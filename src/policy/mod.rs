//! Repair Planning
//!
//! Given the shards a caller already holds and the ones known to be lost,
//! decide which shards to read next.
//!
//! - **Choices** (`choices.rs`): bit-packed tables of sufficient shard
//!   subsets, embedded for common layouts and derivable for others.
//! - **Trie** (`trie.rs`): prefix tree over those subsets.
//! - **Factory** (`factory.rs`): validation, the single-shard fast path and
//!   the trie search.

pub mod choices;
pub mod factory;
pub mod trie;

pub use choices::{decode_choice, derive_table, encode_choice};
pub use factory::PolicyFactory;
pub use trie::{ChoiceTrie, ShardState};
