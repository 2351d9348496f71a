//! Erasure Coding Module
//!
//! Local Reconstruction Code (LRC) over GF(2^8): a global Reed-Solomon code
//! plus two local parities that make single-shard repairs cheap.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        LrcCodec (lrc.rs)                      │
//! │   encode / local_repair / global_repair / verify              │
//! ├──────────────────────────────────────────────────────────────┤
//! │  local_left        local_right         global                 │
//! │  D/2 + 1           D/2 + 1             D + (G+1)              │
//! │  └───────────── MatrixCoder (coder.rs) ──────────────┘        │
//! │                        │                                      │
//! │                 Matrix (matrix.rs)                            │
//! │                 galois_8 arithmetic                           │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - **Layout** (`layout.rs`): shard index ranges, local groups and the
//!   recoverability rule shared with the repair planner.
//! - **Matrix** (`matrix.rs`): systematic generator construction and
//!   inversion.
//! - **Coder** (`coder.rs`): encode/reconstruct/verify for one generator
//!   matrix.
//! - **LRC** (`lrc.rs`): the local/global protocol on top.
//!
//! # Usage
//!
//! ```rust
//! use couchestor_lrc::ec::LrcCodec;
//!
//! let codec = LrcCodec::new(4, 2, 3)?;
//! let data = b"love";
//! let shards = codec.encode_data(data)?;
//!
//! let mut stripe: Vec<Option<Vec<u8>>> = shards.into_iter().map(Some).collect();
//! stripe[0] = None;
//! stripe[3] = None;
//!
//! let recovered = codec.decode_data(&mut stripe, data.len())?;
//! assert_eq!(recovered, data);
//! # Ok::<(), couchestor_lrc::Error>(())
//! ```

pub mod coder;
pub mod layout;
pub mod lrc;
pub mod matrix;

#[cfg(test)]
mod proptest;

pub use coder::MatrixCoder;
pub use layout::{LocalGroup, ShardLayout, LOCAL_SHARDS};
pub use lrc::LrcCodec;
pub use matrix::Matrix;
