//! Error types for CoucheStor LRC

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while encoding, repairing or planning repairs
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    // =========================================================================
    // Construction Errors
    // =========================================================================
    /// Only two local parity shards are supported
    #[error("Unsupported local shard count {0}: only 2 local shards are supported")]
    LocalShardsUnsupported(usize),

    /// Data shard count must be positive and even
    #[error("Invalid data shard count {0}: must be greater than 0 and even")]
    DataShardsInvalid(usize),

    /// No precomputed choice table exists for this layout
    #[error("No choice table for {data_shards}+{local_shards}+{global_shards} layout")]
    ConfigurationUnsupported {
        data_shards: usize,
        local_shards: usize,
        global_shards: usize,
    },

    /// A choice table entry does not describe a valid shard subset
    #[error("Invalid choice table entry: {0:#x}")]
    InvalidChoice(u64),

    /// Invalid EC configuration
    #[error("Invalid EC configuration: {0}")]
    InvalidEcConfig(String),

    // =========================================================================
    // Shape / Contract Errors
    // =========================================================================
    /// Wrong number of shards in a stripe
    #[error("Shard count mismatch: expected {expected}, got {actual}")]
    ShardCountMismatch { expected: usize, actual: usize },

    /// Shards are empty or differ in length
    #[error("Invalid shard shape: {0}")]
    ShardShapeInvalid(String),

    /// Shard index outside the stripe
    #[error("Invalid input shard index: {0}")]
    InvalidInputShard(usize),

    /// Shard index listed twice, or both available and broken
    #[error("Duplicated shard index: {0}")]
    DuplicatedShard(usize),

    // =========================================================================
    // Repair Feasibility Errors
    // =========================================================================
    /// Not enough surviving shards for the attempted code
    #[error("Too few shards for reconstruction: have {available}, need {required}")]
    TooFewShards { available: usize, required: usize },

    /// More broken shards than the layout has parity
    #[error("Too many broken shards: {broken} broken, at most {max} tolerated")]
    TooManyBrokenShards { broken: usize, max: usize },

    /// A repair policy was requested without any broken shard
    #[error("No broken shard given")]
    NoBrokenShard,

    /// No shard combination can repair the stripe
    #[error("Cannot repair: no sufficient shard combination is available")]
    CannotRepair,

    /// The choice trie lost track of a root shard
    #[error("Conflict state: root shard {0} missing from choice trie")]
    ConflictState(usize),

    /// Decode matrix could not be inverted
    #[error("Decode matrix is singular")]
    SingularMatrix,

    // =========================================================================
    // Configuration / IO Errors
    // =========================================================================
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
