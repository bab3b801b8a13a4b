//! Deterministic PRNG.
//!
//! Every combat roll and every AI move-shuffle draws from a [`SeededRng`]
//! derived from `GameState::rng_seed`. Given the same seed and the same
//! sequence of draws, two independent runs must produce byte-identical
//! output — `rand::rngs::StdRng` seeded via `SeedableRng::seed_from_u64` is
//! deterministic across platforms for a fixed seed, which the determinism
//! property requires.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// The stable seed carried in `GameState`. Either a string or an integer
/// is accepted on construction; we normalize to a string so it serializes
/// simply and round-trips through JSON without type ambiguity.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct RngSeed(pub String);

impl RngSeed {
    pub fn from_u64(seed: u64) -> Self {
        Self(seed.to_string())
    }

    /// FNV-1a, chosen because it's a few lines, has no dependency, and is
    /// stable across platforms and Rust versions — unlike `std`'s default
    /// `RandomState` hasher, which is explicitly randomized per-process.
    fn fnv1a(s: &str) -> u64 {
        let mut hash: u64 = 0xcbf29ce484222325;
        for byte in s.as_bytes() {
            hash ^= *byte as u64;
            hash = hash.wrapping_mul(0x100000001b3);
        }
        hash
    }

    fn as_u64(&self) -> u64 {
        Self::fnv1a(&self.0)
    }
}

impl From<u64> for RngSeed {
    fn from(v: u64) -> Self {
        Self::from_u64(v)
    }
}

impl From<&str> for RngSeed {
    fn from(v: &str) -> Self {
        Self(v.to_string())
    }
}

impl From<String> for RngSeed {
    fn from(v: String) -> Self {
        Self(v)
    }
}

/// A deterministic RNG scoped to one logical draw stream. Cloning a
/// `GameState` and advancing the clone's `SeededRng` never perturbs the
/// original's stream — each holds its own `StdRng` by value.
#[derive(Clone)]
pub struct SeededRng {
    inner: StdRng,
}

impl SeededRng {
    pub fn from_seed(seed: &RngSeed) -> Self {
        Self { inner: StdRng::seed_from_u64(seed.as_u64()) }
    }

    /// Derive an independent child stream for a sub-computation (e.g. one
    /// AI search ply) without disturbing `self`. The child's seed is a
    /// deterministic function of this stream's current state plus `path`,
    /// so the same `(seed, path)` always forks the same way.
    pub fn fork_by_path(&mut self, path: &[u64]) -> Self {
        let mut mixer = self.inner.gen::<u64>();
        for component in path {
            mixer = mixer
                .wrapping_mul(0x9E3779B97F4A7C15)
                .wrapping_add(*component);
        }
        Self { inner: StdRng::seed_from_u64(mixer) }
    }

    /// Roll one die with the given number of sides, returning a value in
    /// `[1, sides]`.
    pub fn roll_dice(&mut self, sides: u32) -> u32 {
        assert!(sides > 0, "a die must have at least one side");
        self.inner.gen_range(1, sides + 1)
    }

    pub fn roll_dice_n(&mut self, sides: u32, n: usize) -> Vec<u32> {
        (0..n).map(|_| self.roll_dice(sides)).collect()
    }

    pub fn gen_range(&mut self, low: usize, high_exclusive: usize) -> usize {
        self.inner.gen_range(low, high_exclusive)
    }

    /// Fisher-Yates shuffle, used by the AI search to de-bias move
    /// ordering without ever calling non-deterministic randomness.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        let len = items.len();
        if len < 2 {
            return;
        }
        for i in (1..len).rev() {
            let j = self.gen_range(0, i + 1);
            items.swap(i, j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let seed = RngSeed::from("attacker-wins-seed");
        let mut a = SeededRng::from_seed(&seed);
        let mut b = SeededRng::from_seed(&seed);
        let rolls_a: Vec<u32> = (0..20).map(|_| a.roll_dice(6)).collect();
        let rolls_b: Vec<u32> = (0..20).map(|_| b.roll_dice(6)).collect();
        assert_eq!(rolls_a, rolls_b);
    }

    #[test]
    fn dice_within_bounds() {
        let mut rng = SeededRng::from_seed(&RngSeed::from_u64(42));
        for _ in 0..500 {
            let d = rng.roll_dice(6);
            assert!((1..=6).contains(&d));
        }
    }

    #[test]
    fn fork_is_independent_of_parent_stream() {
        let mut parent = SeededRng::from_seed(&RngSeed::from_u64(7));
        let mut child = parent.fork_by_path(&[1, 2, 3]);
        let parent_next = parent.roll_dice(20);
        let child_next = child.roll_dice(20);
        // Not a meaningful correctness property that they differ (they
        // could coincidentally match), but forking must not panic and
        // must not advance the parent stream beyond the one draw above.
        let _ = (parent_next, child_next);
    }

    #[test]
    fn shuffle_is_deterministic_for_seed() {
        let mut a = SeededRng::from_seed(&RngSeed::from_u64(99));
        let mut b = SeededRng::from_seed(&RngSeed::from_u64(99));
        let mut v1 = vec![0, 1, 2, 3, 4, 5, 6, 7];
        let mut v2 = v1.clone();
        a.shuffle(&mut v1);
        b.shuffle(&mut v2);
        assert_eq!(v1, v2);
    }
}

