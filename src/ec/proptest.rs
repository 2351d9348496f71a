//! Property-Based Tests for the LRC Codec
//!
//! # Test Properties
//!
//! 1. **Roundtrip**: encode then verify holds for every even D and G >= 0
//! 2. **Local Repair**: any single lost shard is restored from its group
//! 3. **Global Repair**: every loss pattern the layout calls recoverable is
//!    restored exactly
//! 4. **Payload**: encode_data then decode_data returns the payload

#![cfg(test)]

use proptest::prelude::*;

use super::lrc::LrcCodec;

// =============================================================================
// Property Strategies
// =============================================================================

/// (D, G) with D even in 2..=8 and G in 0..=3
fn lrc_config_strategy() -> impl Strategy<Value = (usize, usize)> {
    (1usize..=4, 0usize..=3).prop_map(|(half, g)| (half * 2, g))
}

/// Shard payloads for one stripe: D shards of a shared length
fn stripe_strategy() -> impl Strategy<Value = ((usize, usize), Vec<Vec<u8>>)> {
    lrc_config_strategy().prop_flat_map(|(d, g)| {
        (1usize..64).prop_flat_map(move |len| {
            prop::collection::vec(prop::collection::vec(any::<u8>(), len), d)
                .prop_map(move |data| ((d, g), data))
        })
    })
}

fn full_stripe(codec: &LrcCodec, data: Vec<Vec<u8>>) -> Vec<Vec<u8>> {
    let len = data[0].len();
    let mut shards = data;
    shards.resize(codec.total_shards(), vec![0u8; len]);
    shards
}

/// Erasure mask as a bit set over the stripe
fn erasure_strategy() -> impl Strategy<Value = u64> {
    any::<u64>()
}

// =============================================================================
// Roundtrip Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: an encoded stripe always verifies.
    #[test]
    fn prop_encode_verify((config, data) in stripe_strategy()) {
        let (d, g) = config;
        let codec = LrcCodec::new(d, 2, g)?;
        let mut shards = full_stripe(&codec, data);
        codec.encode(&mut shards)?;
        prop_assert!(codec.verify(&shards)?);
    }

    /// Property: encoding is deterministic.
    #[test]
    fn prop_encode_deterministic((config, data) in stripe_strategy()) {
        let (d, g) = config;
        let codec = LrcCodec::new(d, 2, g)?;
        let mut first = full_stripe(&codec, data.clone());
        let mut second = full_stripe(&codec, data);
        codec.encode(&mut first)?;
        codec.encode(&mut second)?;
        prop_assert_eq!(first, second);
    }

    /// Property: payloads survive encode_data/decode_data with no loss.
    #[test]
    fn prop_payload_roundtrip(
        (d, g) in lrc_config_strategy(),
        payload in prop::collection::vec(any::<u8>(), 1..2000),
    ) {
        let codec = LrcCodec::new(d, 2, g)?;
        let shards = codec.encode_data(&payload)?;
        let mut stripe: Vec<Option<Vec<u8>>> = shards.into_iter().map(Some).collect();
        let decoded = codec.decode_data(&mut stripe, payload.len())?;
        prop_assert_eq!(decoded, payload);
    }
}

// =============================================================================
// Repair Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: any single lost shard comes back from a local repair.
    #[test]
    fn prop_single_loss_local_repair(
        (config, data) in stripe_strategy(),
        pick in any::<prop::sample::Index>(),
    ) {
        let (d, g) = config;
        let codec = LrcCodec::new(d, 2, g)?;
        let mut shards = full_stripe(&codec, data);
        codec.encode(&mut shards)?;

        let lost = pick.index(d + 2);
        let mut stripe: Vec<Option<Vec<u8>>> = shards.iter().cloned().map(Some).collect();
        stripe[lost] = None;

        codec.local_repair(&mut stripe)?;
        prop_assert_eq!(stripe[lost].as_ref(), Some(&shards[lost]));
    }

    /// Property: global repair restores exactly the patterns the layout
    /// reports as recoverable, and leaves the rest failing.
    #[test]
    fn prop_global_repair_matches_layout(
        (config, data) in stripe_strategy(),
        mask in erasure_strategy(),
    ) {
        let (d, g) = config;
        let codec = LrcCodec::new(d, 2, g)?;
        let mut shards = full_stripe(&codec, data);
        codec.encode(&mut shards)?;

        let total = codec.total_shards();
        let present: Vec<bool> = (0..total).map(|i| mask & (1 << i) == 0).collect();
        let mut stripe: Vec<Option<Vec<u8>>> = shards
            .iter()
            .zip(&present)
            .map(|(shard, &keep)| keep.then(|| shard.clone()))
            .collect();
        prop_assume!(stripe.iter().any(Option::is_some));

        let result = codec.global_repair(&mut stripe);
        if codec.layout().recoverable(&present) {
            prop_assert!(result.is_ok());
            let repaired: Vec<Vec<u8>> = stripe.into_iter().flatten().collect();
            prop_assert_eq!(repaired, shards);
        } else {
            prop_assert!(result.is_err());
        }
    }
}
