//! Counter-based deterministic PRNG.
//!
//! Every draw is a pure function of `(seed, counter, lane)`: there is no
//! hidden state to advance, so the same draw can be recomputed in any order.
//! The growth engine uses the draw index as the counter and a cell key as the
//! lane, which makes candidate selection independent of how the frontier is
//! stored in memory.
//!
//! The mixing function is the SplitMix64 finaliser (pure integer arithmetic,
//! identical on every platform).

use serde::{Deserialize, Serialize};

/// Golden-ratio increment used by SplitMix64.
const GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;
/// Odd multiplier spreading consecutive counters across the state space.
const COUNTER_STRIDE: u64 = 0xD1B5_4A32_D192_ED03;

/// Counter-based PRNG keyed by a run seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterRng {
    key: u64,
}

impl CounterRng {
    /// Creates a stream keyed by `seed`. Any seed, including 0, is valid.
    pub fn new(seed: u64) -> Self {
        Self { key: mix(seed) }
    }

    /// Returns the 64-bit draw at `(counter, lane)`.
    pub fn u64_at(&self, counter: u64, lane: u64) -> u64 {
        mix(self.key ^ counter.wrapping_mul(COUNTER_STRIDE) ^ mix(lane))
    }

    /// Returns a uniformly distributed f64 in (0, 1]. Safe to pass to `ln`.
    ///
    /// Uses the upper 53 bits of the draw for full mantissa precision.
    pub fn open_f64_at(&self, counter: u64, lane: u64) -> f64 {
        ((self.u64_at(counter, lane) >> 11) + 1) as f64 / (1u64 << 53) as f64
    }
}

/// SplitMix64 step: add the golden gamma, then finalise.
fn mix(z: u64) -> u64 {
    let mut z = z.wrapping_add(GAMMA);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mix_matches_reference_splitmix64() {
        // First output of the reference SplitMix64 generator seeded with 0.
        assert_eq!(mix(0), 0xE220_A839_7B1D_CDAF);
    }

    #[test]
    fn u64_at_produces_known_golden_value() {
        // If this breaks, every saved run replays differently.
        let rng = CounterRng::new(42);
        assert_eq!(rng.u64_at(0, 0), 0xCCF7_D166_7EA4_1D4D);
    }

    #[test]
    fn same_seed_same_draws() {
        let a = CounterRng::new(7);
        let b = CounterRng::new(7);
        for counter in 0..500 {
            assert_eq!(a.u64_at(counter, 3), b.u64_at(counter, 3));
        }
    }

    #[test]
    fn draws_are_order_independent() {
        let rng = CounterRng::new(99);
        let forward: Vec<u64> = (0..64).map(|c| rng.u64_at(c, 1)).collect();
        let mut backward: Vec<u64> = (0..64).rev().map(|c| rng.u64_at(c, 1)).collect();
        backward.reverse();
        assert_eq!(forward, backward);
    }

    #[test]
    fn different_seeds_diverge() {
        let a = CounterRng::new(42);
        let b = CounterRng::new(43);
        assert!((0..16).any(|c| a.u64_at(c, 0) != b.u64_at(c, 0)));
    }

    #[test]
    fn lanes_are_distinct_streams() {
        let rng = CounterRng::new(5);
        assert_ne!(rng.u64_at(10, 0), rng.u64_at(10, 1));
    }

    #[test]
    fn seed_zero_is_usable() {
        let rng = CounterRng::new(0);
        assert!((0..8).any(|c| rng.u64_at(c, 0) != 0));
    }

    #[test]
    fn serialization_roundtrip_preserves_stream() {
        let rng = CounterRng::new(1234);
        let json = serde_json::to_string(&rng).unwrap();
        let restored: CounterRng = serde_json::from_str(&json).unwrap();
        for c in 0..32 {
            assert_eq!(rng.u64_at(c, c), restored.u64_at(c, c));
        }
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn open_f64_at_excludes_zero(seed: u64, counter: u64, lane: u64) {
                let v = CounterRng::new(seed).open_f64_at(counter, lane);
                prop_assert!(v > 0.0 && v <= 1.0, "open_f64_at = {v}");
                prop_assert!(v.ln().is_finite());
            }

            #[test]
            fn open_f64_at_approximate_uniformity(seed: u64) {
                let rng = CounterRng::new(seed);
                let mut buckets = [0u32; 10];
                for c in 0..10_000u64 {
                    let idx = ((rng.open_f64_at(c, 0) * 10.0) as usize).min(9);
                    buckets[idx] += 1;
                }
                // Expected ~1000 per bucket; loose bound avoids flakiness.
                for (i, &count) in buckets.iter().enumerate() {
                    prop_assert!(count >= 500, "bucket {i} has only {count}");
                }
            }
        }
    }
}
