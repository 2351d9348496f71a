//! CoucheStor LRC - Local Reconstruction Codes with Repair Planning
//!
//! Erasure coding for CoucheStor cold-tier stripes: a Reed-Solomon global
//! code augmented with two local parities, plus a planner that tells a
//! caller which shards to read before a repair.
//!
//! # Architecture
//!
//! ```text
//! broken shards ──▶ PolicyFactory ──▶ shards to load ──▶ LrcCodec
//!                   (policy)                             (ec)
//!                                                        local_repair
//!                                                        global_repair
//!                                                        verify
//! ```
//!
//! # Modules
//!
//! - [`config`] - Stripe geometry configuration
//! - [`ec`] - LRC codec and the coding primitives under it
//! - [`error`] - Error types
//! - [`metrics`] - Prometheus counters
//! - [`policy`] - Repair planning over sufficient shard subsets

pub mod config;
pub mod ec;
pub mod error;
pub mod metrics;
pub mod policy;

// Re-export commonly used types
pub use config::LrcConfig;
pub use ec::{LrcCodec, ShardLayout};
pub use error::{Error, Result};
pub use policy::PolicyFactory;
