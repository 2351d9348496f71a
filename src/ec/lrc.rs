//! Local Reconstruction Code
//!
//! Augments a global Reed-Solomon code with two local parities, each covering
//! half of the data shards. A single lost shard is repaired from its local
//! group (D/2 reads); anything worse falls back to the global code.
//!
//! The global generator has G+1 parity rows. Its first parity row, the
//! "combine" row, is split column-wise into the parity rows of the two local
//! codes, so for every stripe:
//!
//! ```text
//! shard[D] ^ shard[D+1] == combine_row . data
//! ```
//!
//! Encoding uses this to derive the right local parity from the global
//! output instead of running the right local encoder. The right-parity slot
//! therefore moves through two states, and the order of the steps that touch
//! it is part of the protocol:
//!
//! ```text
//! COMBINED  (global output, before XOR with shard[D])
//!    │  shard[D+1] ^= shard[D]
//!    ▼
//! TRUE_PARITY  (what callers store and verify)
//! ```

use crate::ec::coder::{uniform_len, MatrixCoder};
use crate::ec::layout::{LocalGroup, ShardLayout};
use crate::ec::matrix::Matrix;
use crate::error::{Error, Result};
use crate::metrics::{self, Operation};
use reed_solomon_erasure::galois_8;
use tracing::{debug, instrument, warn};

/// LRC codec for a (D, 2, G) layout
#[derive(Debug, Clone)]
pub struct LrcCodec {
    /// Stripe geometry
    layout: ShardLayout,
    /// D/2 + 1 code over the left half and shard D
    local_left: MatrixCoder,
    /// D/2 + 1 code over the right half and shard D+1
    local_right: MatrixCoder,
    /// D + (G+1) code; parity 0 is the combined value
    global: MatrixCoder,
}

impl LrcCodec {
    /// Create a codec for `data_shards` data, `local_shards` local parities
    /// (must be 2) and `global_shards` global parities.
    pub fn new(data_shards: usize, local_shards: usize, global_shards: usize) -> Result<Self> {
        let layout = ShardLayout::new(data_shards, local_shards, global_shards)?;
        Self::with_layout(layout)
    }

    /// Create a codec for an already validated layout
    pub fn with_layout(layout: ShardLayout) -> Result<Self> {
        let data = layout.data_shards();
        let half = layout.half();

        let global = MatrixCoder::new(data, layout.global_shards() + 1)?;
        let combine = global.matrix().row(data);

        let local_left = Self::local_coder(half, &combine[..half])?;
        let local_right = Self::local_coder(half, &combine[half..])?;

        debug!(
            data_shards = data,
            global_shards = layout.global_shards(),
            "Built LRC codec"
        );

        Ok(Self {
            layout,
            local_left,
            local_right,
            global,
        })
    }

    fn local_coder(half: usize, combine: &[u8]) -> Result<MatrixCoder> {
        let mut matrix = Matrix::systematic(half, half + 1)?;
        matrix.row_mut(half).copy_from_slice(combine);
        MatrixCoder::with_matrix(half, 1, matrix)
    }

    /// Stripe geometry
    pub fn layout(&self) -> &ShardLayout {
        &self.layout
    }

    /// Get the number of data shards
    pub fn data_shards(&self) -> usize {
        self.layout.data_shards()
    }

    /// Get the number of global parity shards
    pub fn global_shards(&self) -> usize {
        self.layout.global_shards()
    }

    /// Get the total number of shards
    pub fn total_shards(&self) -> usize {
        self.layout.total_shards()
    }

    // =========================================================================
    // Encode
    // =========================================================================

    /// Compute local and global parities in place.
    ///
    /// Every slot must be allocated with the same non-zero length; data
    /// shards are read, parity slots are overwritten.
    #[instrument(skip(self, shards))]
    pub fn encode(&self, shards: &mut [Vec<u8>]) -> Result<()> {
        let result = self.encode_inner(shards);
        metrics::record_operation(Operation::Encode, &result);
        result
    }

    fn encode_inner(&self, shards: &mut [Vec<u8>]) -> Result<()> {
        self.check_count(shards.len())?;
        uniform_len(shards.iter().map(Vec::as_slice))?;

        let data_count = self.data_shards();
        let half = self.layout.half();
        let (data, parity) = shards.split_at_mut(data_count);
        let (left_parity, tail) = parity
            .split_first_mut()
            .ok_or_else(|| Error::Internal("stripe has no parity slots".to_string()))?;

        let inputs: Vec<&[u8]> = data.iter().map(Vec::as_slice).collect();

        // Global outputs land in D+1.. ; slot D+1 now holds the combined value
        {
            let mut outputs: Vec<&mut [u8]> = tail.iter_mut().map(Vec::as_mut_slice).collect();
            self.global.encode(&inputs, &mut outputs)?;
        }

        self.local_left
            .encode(&inputs[..half], &mut [left_parity.as_mut_slice()])?;

        // COMBINED -> TRUE_PARITY; must follow the global encode
        galois_8::mul_slice_xor(1, left_parity, &mut tail[0]);

        debug!(
            shard_size = left_parity.len(),
            total_shards = self.total_shards(),
            "Encoded LRC stripe"
        );
        Ok(())
    }

    /// Split a payload into D zero-padded data shards and encode a full stripe
    #[instrument(skip(self, data), fields(data_len = data.len()))]
    pub fn encode_data(&self, data: &[u8]) -> Result<Vec<Vec<u8>>> {
        if data.is_empty() {
            return Err(Error::ShardShapeInvalid(
                "cannot encode an empty payload".to_string(),
            ));
        }
        let data_count = self.data_shards();
        let shard_size = data.len().div_ceil(data_count);

        let mut shards: Vec<Vec<u8>> = data
            .chunks(shard_size)
            .map(|chunk| {
                let mut shard = chunk.to_vec();
                shard.resize(shard_size, 0);
                shard
            })
            .collect();
        shards.resize(self.total_shards(), vec![0u8; shard_size]);

        self.encode(&mut shards)?;
        Ok(shards)
    }

    /// Repair a stripe if needed and return the first `original_len` bytes
    /// of its data shards
    pub fn decode_data(
        &self,
        shards: &mut [Option<Vec<u8>>],
        original_len: usize,
    ) -> Result<Vec<u8>> {
        self.check_count(shards.len())?;
        if shards[..self.data_shards()].iter().any(Option::is_none) {
            self.global_repair(shards)?;
        }

        let mut data = Vec::with_capacity(original_len);
        for shard in shards.iter().take(self.data_shards()).flatten() {
            data.extend_from_slice(shard);
        }
        data.truncate(original_len);
        Ok(data)
    }

    // =========================================================================
    // Repair
    // =========================================================================

    /// Repair at most one missing shard per local group.
    ///
    /// A group with exactly one missing member is rebuilt from the other D/2.
    /// A group with more than one missing member (and at least one present)
    /// cannot be helped locally: the other group is still repaired, then
    /// `TooFewShards` is returned.
    #[instrument(skip(self, shards))]
    pub fn local_repair(&self, shards: &mut [Option<Vec<u8>>]) -> Result<()> {
        let result = self.local_repair_inner(shards);
        metrics::record_operation(Operation::LocalRepair, &result);
        result
    }

    fn local_repair_inner(&self, shards: &mut [Option<Vec<u8>>]) -> Result<()> {
        self.check_count(shards.len())?;
        self.check_present(shards)?;

        let half = self.layout.half();
        let mut shortfall = None;

        for group in [LocalGroup::Left, LocalGroup::Right] {
            let members = self.layout.group_members(group);
            let present = members.iter().filter(|&&i| shards[i].is_some()).count();

            if present == 0 || present == members.len() {
                continue;
            }
            if present < half {
                debug!(%group, present, required = half, "Local group under-determined");
                if shortfall.is_none() {
                    shortfall = Some(Error::TooFewShards {
                        available: present,
                        required: half,
                    });
                }
                continue;
            }

            self.repair_group(group, &members, shards)?;
        }

        match shortfall {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn repair_group(
        &self,
        group: LocalGroup,
        members: &[usize],
        shards: &mut [Option<Vec<u8>>],
    ) -> Result<()> {
        let coder = match group {
            LocalGroup::Left => &self.local_left,
            LocalGroup::Right => &self.local_right,
        };

        let mut slots: Vec<Option<Vec<u8>>> = members.iter().map(|&i| shards[i].take()).collect();
        let result = coder.reconstruct(&mut slots);
        for (&i, slot) in members.iter().zip(slots) {
            shards[i] = slot;
        }

        if result.is_ok() {
            debug!(%group, "Repaired local group");
        }
        result
    }

    /// Repair any recoverable loss pattern.
    ///
    /// Runs an opportunistic local pass, then the global code over the data
    /// shards, the combined value and the global parities, then recomputes
    /// the local parities from the restored data.
    #[instrument(skip(self, shards))]
    pub fn global_repair(&self, shards: &mut [Option<Vec<u8>>]) -> Result<()> {
        let result = self.global_repair_inner(shards);
        metrics::record_operation(Operation::GlobalRepair, &result);
        result
    }

    fn global_repair_inner(&self, shards: &mut [Option<Vec<u8>>]) -> Result<()> {
        self.check_count(shards.len())?;
        self.check_present(shards)?;

        if let Err(e) = self.local_repair_inner(shards) {
            debug!(error = %e, "Local pass incomplete, continuing with global code");
        }
        if shards.iter().all(Option::is_some) {
            return Ok(());
        }

        let left = self.layout.left_parity();
        let right = self.layout.right_parity();

        // TRUE_PARITY -> COMBINED, or drop the slot if it cannot be combined
        let (head, tail) = shards.split_at_mut(right);
        let combined = match (head[left].as_deref(), tail[0].as_mut()) {
            (Some(l), Some(r)) => {
                galois_8::mul_slice_xor(1, l, r);
                true
            }
            _ => false,
        };
        let stashed = if combined { None } else { tail[0].take() };

        let slots = self.layout.global_slots();
        let mut global: Vec<Option<Vec<u8>>> = slots.iter().map(|&i| shards[i].take()).collect();
        let result = self.global.reconstruct(&mut global);
        for (&i, slot) in slots.iter().zip(global) {
            shards[i] = slot;
        }

        if let Err(e) = result {
            warn!(error = %e, "Global reconstruction failed");
            self.restore_right_parity(shards, combined, stashed);
            return Err(e);
        }

        // Slot D+1 holds the combined value, not the right parity
        shards[right] = None;
        self.local_repair_inner(shards)
    }

    /// Undo the COMBINED transition after a failed global reconstruction
    fn restore_right_parity(
        &self,
        shards: &mut [Option<Vec<u8>>],
        combined: bool,
        stashed: Option<Vec<u8>>,
    ) {
        let right = self.layout.right_parity();
        if !combined {
            shards[right] = stashed;
            return;
        }
        let (head, tail) = shards.split_at_mut(right);
        if let (Some(l), Some(r)) = (head[self.layout.left_parity()].as_deref(), tail[0].as_mut()) {
            galois_8::mul_slice_xor(1, l, r);
        }
    }

    // =========================================================================
    // Verify
    // =========================================================================

    /// Check both local relations and the global relation.
    ///
    /// Read-only: the combined value is built in a private copy.
    #[instrument(skip(self, shards))]
    pub fn verify(&self, shards: &[Vec<u8>]) -> Result<bool> {
        let result = self.verify_inner(shards);
        metrics::record_operation(Operation::Verify, &result);
        if let Ok(false) = result {
            metrics::record_inconsistent();
        }
        result
    }

    fn verify_inner(&self, shards: &[Vec<u8>]) -> Result<bool> {
        self.check_count(shards.len())?;
        uniform_len(shards.iter().map(Vec::as_slice))?;

        let left = self.layout.left_parity();
        let right = self.layout.right_parity();

        for (group, coder) in [
            (LocalGroup::Left, &self.local_left),
            (LocalGroup::Right, &self.local_right),
        ] {
            let members: Vec<&[u8]> = self
                .layout
                .group_members(group)
                .into_iter()
                .map(|i| shards[i].as_slice())
                .collect();
            if !coder.verify(&members)? {
                debug!(%group, "Local parity mismatch");
                return Ok(false);
            }
        }

        let mut combined = shards[right].clone();
        galois_8::mul_slice_xor(1, &shards[left], &mut combined);

        let global: Vec<&[u8]> = shards[..self.data_shards()]
            .iter()
            .map(Vec::as_slice)
            .chain(std::iter::once(combined.as_slice()))
            .chain(shards[right + 1..].iter().map(Vec::as_slice))
            .collect();
        let consistent = self.global.verify(&global)?;
        if !consistent {
            debug!("Global parity mismatch");
        }
        Ok(consistent)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn check_count(&self, actual: usize) -> Result<()> {
        if actual != self.total_shards() {
            return Err(Error::ShardCountMismatch {
                expected: self.total_shards(),
                actual,
            });
        }
        Ok(())
    }

    /// Present shards must share one non-zero length
    fn check_present(&self, shards: &[Option<Vec<u8>>]) -> Result<()> {
        if shards.iter().any(Option::is_some) {
            uniform_len(shards.iter().filter_map(|s| s.as_deref()))?;
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    /// The 4+2+3 stripe holding "love", one byte per data shard
    fn love_stripe(codec: &LrcCodec) -> Vec<Vec<u8>> {
        let mut shards = vec![vec![0u8; 1]; codec.total_shards()];
        for (i, b) in b"love".iter().enumerate() {
            shards[i] = vec![*b];
        }
        codec.encode(&mut shards).unwrap();
        shards
    }

    fn stripe(codec: &LrcCodec, shard_size: usize) -> Vec<Vec<u8>> {
        let mut shards = vec![vec![0u8; shard_size]; codec.total_shards()];
        for (i, shard) in shards.iter_mut().take(codec.data_shards()).enumerate() {
            for (j, b) in shard.iter_mut().enumerate() {
                *b = (i * 31 + j * 7 + 3) as u8;
            }
        }
        codec.encode(&mut shards).unwrap();
        shards
    }

    fn lose(shards: &[Vec<u8>], missing: &[usize]) -> Vec<Option<Vec<u8>>> {
        shards
            .iter()
            .enumerate()
            .map(|(i, s)| (!missing.contains(&i)).then(|| s.clone()))
            .collect()
    }

    fn restored(shards: Vec<Option<Vec<u8>>>) -> Vec<Vec<u8>> {
        shards
            .into_iter()
            .map(|s| s.expect("shard restored"))
            .collect()
    }

    // =========================================================================
    // Construction Tests
    // =========================================================================

    #[test]
    fn test_codec_new() {
        let codec = LrcCodec::new(4, 2, 3).unwrap();
        assert_eq!(codec.data_shards(), 4);
        assert_eq!(codec.global_shards(), 3);
        assert_eq!(codec.total_shards(), 9);
    }

    #[test]
    fn test_codec_invalid_config() {
        assert_matches!(LrcCodec::new(4, 1, 3), Err(Error::LocalShardsUnsupported(1)));
        assert_matches!(LrcCodec::new(4, 3, 3), Err(Error::LocalShardsUnsupported(3)));
        assert_matches!(LrcCodec::new(0, 2, 3), Err(Error::DataShardsInvalid(0)));
        assert_matches!(LrcCodec::new(3, 2, 3), Err(Error::DataShardsInvalid(3)));
    }

    #[test]
    fn test_local_rows_split_combine_row() {
        let codec = LrcCodec::new(6, 2, 2).unwrap();
        let combine = codec.global.matrix().row(6).to_vec();
        assert_eq!(codec.local_left.matrix().row(3), &combine[..3]);
        assert_eq!(codec.local_right.matrix().row(3), &combine[3..]);
    }

    // =========================================================================
    // Encode Tests
    // =========================================================================

    #[test]
    fn test_encode_keeps_data() {
        let codec = LrcCodec::new(4, 2, 3).unwrap();
        let shards = love_stripe(&codec);
        assert_eq!(&shards[0], b"l");
        assert_eq!(&shards[1], b"o");
        assert_eq!(&shards[2], b"v");
        assert_eq!(&shards[3], b"e");
    }

    #[test]
    fn test_encode_combined_matches_global_output() {
        let codec = LrcCodec::new(4, 2, 3).unwrap();
        let shards = stripe(&codec, 16);

        let inputs: Vec<&[u8]> = shards[..4].iter().map(Vec::as_slice).collect();
        let mut direct = vec![vec![0u8; 16]; 4];
        {
            let mut outputs: Vec<&mut [u8]> = direct.iter_mut().map(Vec::as_mut_slice).collect();
            codec.global.encode(&inputs, &mut outputs).unwrap();
        }

        let combined: Vec<u8> = shards[4]
            .iter()
            .zip(&shards[5])
            .map(|(l, r)| l ^ r)
            .collect();
        assert_eq!(combined, direct[0]);
        assert_eq!(&shards[6..], &direct[1..]);
    }

    #[test]
    fn test_encode_shard_count_mismatch() {
        let codec = LrcCodec::new(4, 2, 3).unwrap();
        let mut shards = vec![vec![0u8; 4]; 8];
        assert_matches!(
            codec.encode(&mut shards),
            Err(Error::ShardCountMismatch {
                expected: 9,
                actual: 8
            })
        );
    }

    #[test]
    fn test_encode_rejects_bad_shapes() {
        let codec = LrcCodec::new(4, 2, 3).unwrap();
        let mut shards = vec![vec![0u8; 4]; 9];
        shards[7] = Vec::new();
        assert_matches!(codec.encode(&mut shards), Err(Error::ShardShapeInvalid(_)));

        let mut shards = vec![vec![0u8; 4]; 9];
        shards[2] = vec![0u8; 5];
        assert_matches!(codec.encode(&mut shards), Err(Error::ShardShapeInvalid(_)));
    }

    #[test]
    fn test_encode_zero_global_shards() {
        let codec = LrcCodec::new(2, 2, 0).unwrap();
        let shards = stripe(&codec, 8);
        assert_eq!(shards.len(), 4);
        assert!(codec.verify(&shards).unwrap());
    }

    #[test]
    fn test_encode_data_roundtrip() {
        let codec = LrcCodec::new(4, 2, 3).unwrap();
        let payload = b"Hello, local reconstruction codes!";
        let shards = codec.encode_data(payload).unwrap();
        assert_eq!(shards.len(), 9);
        assert!(codec.verify(&shards).unwrap());

        let mut loaded = lose(&shards, &[0, 3]);
        let recovered = codec.decode_data(&mut loaded, payload.len()).unwrap();
        assert_eq!(recovered, payload);
    }

    #[test]
    fn test_encode_data_empty() {
        let codec = LrcCodec::new(4, 2, 3).unwrap();
        assert!(codec.encode_data(&[]).is_err());
    }

    // =========================================================================
    // Local Repair Tests
    // =========================================================================

    #[test]
    fn test_local_repair_each_single_loss() {
        let codec = LrcCodec::new(4, 2, 3).unwrap();
        let original = stripe(&codec, 32);

        for lost in 0..6 {
            let mut shards = lose(&original, &[lost]);
            codec.local_repair(&mut shards).unwrap();
            assert_eq!(restored(shards), original, "lost shard {}", lost);
        }
    }

    #[test]
    fn test_local_repair_one_loss_per_group() {
        let codec = LrcCodec::new(4, 2, 3).unwrap();
        let original = love_stripe(&codec);

        let mut shards = lose(&original, &[0, 3]);
        codec.local_repair(&mut shards).unwrap();
        assert_eq!(restored(shards), original);
    }

    #[test]
    fn test_local_repair_two_losses_in_group() {
        let codec = LrcCodec::new(4, 2, 3).unwrap();
        let original = love_stripe(&codec);

        let mut shards = lose(&original, &[0, 1]);
        assert_matches!(
            codec.local_repair(&mut shards),
            Err(Error::TooFewShards {
                available: 1,
                required: 2
            })
        );
        assert!(shards[0].is_none());
        assert!(shards[1].is_none());
        for i in 2..9 {
            assert_eq!(shards[i].as_deref(), Some(original[i].as_slice()));
        }
    }

    #[test]
    fn test_local_repair_other_group_still_repaired() {
        let codec = LrcCodec::new(6, 2, 2).unwrap();
        let original = stripe(&codec, 8);

        // Left group loses two, right group loses one
        let mut shards = lose(&original, &[0, 6, 4]);
        assert_matches!(
            codec.local_repair(&mut shards),
            Err(Error::TooFewShards { .. })
        );
        assert_eq!(shards[4].as_deref(), Some(original[4].as_slice()));
        assert!(shards[0].is_none());
        assert!(shards[6].is_none());
    }

    #[test]
    fn test_local_repair_ignores_global_parity_loss() {
        let codec = LrcCodec::new(4, 2, 3).unwrap();
        let original = love_stripe(&codec);

        let mut shards = lose(&original, &[7]);
        codec.local_repair(&mut shards).unwrap();
        assert!(shards[7].is_none());
    }

    #[test]
    fn test_local_repair_shard_count_mismatch() {
        let codec = LrcCodec::new(4, 2, 3).unwrap();
        let mut shards: Vec<Option<Vec<u8>>> = vec![None; 5];
        assert_matches!(
            codec.local_repair(&mut shards),
            Err(Error::ShardCountMismatch { .. })
        );
    }

    // =========================================================================
    // Global Repair Tests
    // =========================================================================

    #[test]
    fn test_global_repair_love() {
        let codec = LrcCodec::new(4, 2, 3).unwrap();
        let original = love_stripe(&codec);

        let mut shards = lose(&original, &[0, 3]);
        codec.global_repair(&mut shards).unwrap();
        assert_eq!(shards[0].as_deref(), Some(&b"l"[..]));
        assert_eq!(shards[3].as_deref(), Some(&b"e"[..]));

        let mut shards = lose(&original, &[0, 1, 2, 3]);
        codec.global_repair(&mut shards).unwrap();
        let repaired = restored(shards);
        assert_eq!(repaired, original);
        assert_eq!(repaired[..4].concat(), b"love");
    }

    #[test]
    fn test_global_repair_any_four_losses() {
        let codec = LrcCodec::new(4, 2, 3).unwrap();
        let original = stripe(&codec, 16);

        for a in 0..9 {
            for b in (a + 1)..9 {
                for c in (b + 1)..9 {
                    for d in (c + 1)..9 {
                        let mut shards = lose(&original, &[a, b, c, d]);
                        codec.global_repair(&mut shards).unwrap();
                        let repaired = restored(shards);
                        assert_eq!(repaired, original, "lost {:?}", [a, b, c, d]);
                        assert!(codec.verify(&repaired).unwrap());
                    }
                }
            }
        }
    }

    #[test]
    fn test_global_repair_five_losses() {
        let codec = LrcCodec::new(4, 2, 3).unwrap();
        let original = love_stripe(&codec);

        for missing in [[0, 1, 2, 4, 5], [0, 1, 5, 6, 7]] {
            let mut shards = lose(&original, &missing);
            codec.global_repair(&mut shards).unwrap();
            assert_eq!(restored(shards), original, "lost {:?}", missing);
        }
    }

    #[test]
    fn test_global_repair_right_group_already_short() {
        // Right group misses a data shard on top of the forced clear of D+1
        let codec = LrcCodec::new(6, 2, 3).unwrap();
        let original = stripe(&codec, 8);

        for missing in [vec![0, 1, 4], vec![0, 1, 4, 7], vec![3, 4, 6, 7], vec![1, 5, 7, 9]] {
            let mut shards = lose(&original, &missing);
            codec.global_repair(&mut shards).unwrap();
            assert_eq!(restored(shards), original, "lost {:?}", missing);
        }
    }

    #[test]
    fn test_global_repair_too_many_losses() {
        let codec = LrcCodec::new(4, 2, 3).unwrap();
        let original = love_stripe(&codec);

        let mut shards = lose(&original, &[0, 1, 2, 3, 6, 7]);
        assert_matches!(
            codec.global_repair(&mut shards),
            Err(Error::TooFewShards { .. })
        );
        // Local parities are left as they were
        assert_eq!(shards[4].as_deref(), Some(original[4].as_slice()));
        assert_eq!(shards[5].as_deref(), Some(original[5].as_slice()));
    }

    #[test]
    fn test_global_repair_failure_keeps_unpaired_right_parity() {
        let codec = LrcCodec::new(4, 2, 3).unwrap();
        let original = love_stripe(&codec);

        let mut shards = lose(&original, &[0, 1, 4, 6, 7]);
        assert!(codec.global_repair(&mut shards).is_err());
        assert_eq!(shards[5].as_deref(), Some(original[5].as_slice()));
    }

    #[test]
    fn test_global_repair_complete_stripe() {
        let codec = LrcCodec::new(4, 2, 3).unwrap();
        let original = love_stripe(&codec);

        let mut shards = lose(&original, &[]);
        codec.global_repair(&mut shards).unwrap();
        assert_eq!(restored(shards), original);
    }

    #[test]
    fn test_global_repair_rejects_uneven_shards() {
        let codec = LrcCodec::new(4, 2, 3).unwrap();
        let original = love_stripe(&codec);

        let mut shards = lose(&original, &[0]);
        shards[1] = Some(vec![1, 2]);
        assert_matches!(
            codec.global_repair(&mut shards),
            Err(Error::ShardShapeInvalid(_))
        );
    }

    // =========================================================================
    // Verify Tests
    // =========================================================================

    #[test]
    fn test_verify_love() {
        let codec = LrcCodec::new(4, 2, 3).unwrap();
        let mut shards = love_stripe(&codec);
        assert!(codec.verify(&shards).unwrap());

        shards[0][0] = b'a';
        assert!(!codec.verify(&shards).unwrap());
        shards[0][0] = b'l';
        assert!(codec.verify(&shards).unwrap());

        let five = shards[5][0];
        shards[5][0] = b'a';
        assert!(!codec.verify(&shards).unwrap());
        shards[5][0] = five;
        assert!(codec.verify(&shards).unwrap());
    }

    #[test]
    fn test_verify_detects_any_byte_flip() {
        let codec = LrcCodec::new(4, 2, 2).unwrap();
        let mut shards = stripe(&codec, 4);

        for i in 0..shards.len() {
            for j in 0..4 {
                let saved = shards[i][j];
                shards[i][j] ^= 0x5a;
                assert!(!codec.verify(&shards).unwrap(), "shard {} byte {}", i, j);
                shards[i][j] = saved;
                assert!(codec.verify(&shards).unwrap());
            }
        }
    }

    #[test]
    fn test_verify_is_read_only() {
        let codec = LrcCodec::new(4, 2, 3).unwrap();
        let shards = stripe(&codec, 8);
        let snapshot = shards.clone();
        codec.verify(&shards).unwrap();
        assert_eq!(shards, snapshot);
    }

    #[test]
    fn test_verify_errors() {
        let codec = LrcCodec::new(4, 2, 3).unwrap();
        let mut shards = stripe(&codec, 8);

        assert_matches!(
            codec.verify(&shards[..8]),
            Err(Error::ShardCountMismatch { .. })
        );
        shards[4].clear();
        assert_matches!(codec.verify(&shards), Err(Error::ShardShapeInvalid(_)));
    }
}
