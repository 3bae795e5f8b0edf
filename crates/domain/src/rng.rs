//! Deterministic, explicitly-threaded random streams.
//!
//! The previous generation of this crate dropped `rand` entirely "for
//! hexagonal architecture purity", intending RNG to be injected via closure.
//! That intent is honoured here in spirit rather than to the letter: a
//! `SeededRng` is a plain owned value, constructed from a seed and threaded
//! explicitly through generator/executor calls. There is no global RNG and
//! no `thread_rng()` anywhere in this crate.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::fnv::hash_location_id;

/// A random stream seeded deterministically, per the determinism contract
/// (§6/§9): one stream per generator call, seeded from `hash(location_id)`;
/// one stream per turn, seeded from `(location_id, turn_count_this_visit)`.
pub struct SeededRng {
    inner: StdRng,
}

impl SeededRng {
    /// Build a stream from a raw `u64` seed.
    pub fn from_seed_u64(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    /// Seed a generator's draw stream from its location id (§4.C2).
    pub fn for_location(location_id: &str) -> Self {
        Self::from_seed_u64(hash_location_id(location_id))
    }

    /// Seed a per-turn draw stream from `(location_id, turn_count_this_visit)`
    /// (§4.C6, §9) so that action-resolution randomness is reproducible on
    /// replay given identical recorded LM outputs.
    pub fn for_turn(location_id: &str, turn_count_this_visit: u64) -> Self {
        let mut seed = hash_location_id(location_id);
        // Mix the turn count in with a second FNV-style pass so that
        // consecutive turns don't share overlapping low bits of the seed.
        seed ^= turn_count_this_visit;
        seed = seed.wrapping_mul(0x100000001b3);
        Self::from_seed_u64(seed)
    }

    /// Draw an integer in `[low, high]` inclusive.
    pub fn gen_range_inclusive(&mut self, low: u32, high: u32) -> u32 {
        self.inner.gen_range(low..=high)
    }

    /// Draw a boolean with probability `p` of being `true`.
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.inner.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Choose one element of a non-empty slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.gen_range_inclusive(0, (items.len() - 1) as u32) as usize;
        items.get(idx)
    }

    /// Roll a single six-sided die (1..=6), as used by the success gate (§4.C6).
    pub fn roll_d6(&mut self) -> u32 {
        self.gen_range_inclusive(1, 6)
    }
}
