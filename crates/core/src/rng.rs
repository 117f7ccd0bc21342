//! RNG module - seeded chip generation
//!
//! Chips are drawn uniformly from the configured kinds, optionally excluding
//! up to two kinds (the initial-fill no-match rule). Every chip gets a fresh
//! [`ChipId`] so identical kinds stay distinguishable.
//!
//! Also provides a simple LCG so that a seed fully determines a board.

use arrayvec::ArrayVec;

use crate::types::{Chip, ChipId, ChipKindId, MAX_EXCLUSIONS};

/// Kinds a single draw must avoid
pub type Exclusions = ArrayVec<ChipKindId, MAX_EXCLUSIONS>;

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    ///
    /// Scales by the high bits; the low bits of a power-of-two LCG cycle with a tiny period.
    pub fn next_range(&mut self, max: u32) -> u32 {
        debug_assert!(max > 0, "next_range needs a non-empty range");
        ((u64::from(self.next_u32()) * u64::from(max)) >> 32) as u32
    }

    /// Current internal state (a seed that continues this sequence)
    pub fn state(&self) -> u32 {
        self.state
    }
}

/// Produces chips of uniformly random kind
#[derive(Debug, Clone)]
pub struct ChipGenerator {
    kinds: Vec<ChipKindId>,
    rng: SimpleRng,
    next_id: u32,
}

impl ChipGenerator {
    /// Generator over `kinds`, seeded with `seed`
    pub fn new(kinds: Vec<ChipKindId>, seed: u32) -> Self {
        Self {
            kinds,
            rng: SimpleRng::new(seed),
            next_id: 0,
        }
    }

    pub fn kinds(&self) -> &[ChipKindId] {
        &self.kinds
    }

    /// Mutable access to the underlying RNG (blocked cell placement shares it)
    pub fn rng_mut(&mut self) -> &mut SimpleRng {
        &mut self.rng
    }

    /// Make sure future ids start at or after `next`
    pub fn reserve_ids(&mut self, next: u32) {
        self.next_id = self.next_id.max(next);
    }

    /// Id the next generated chip will carry
    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    /// Draw a chip of any configured kind
    pub fn generate(&mut self) -> Chip {
        self.generate_excluding(&[])
    }

    /// Draw a chip whose kind is not in `excluded`
    ///
    /// The candidate set is the full kind list minus the exclusions; the draw
    /// is uniform over what remains.
    ///
    /// # Panics
    ///
    /// If the exclusions remove every kind. With at least three kinds and at
    /// most two exclusions this cannot happen on a validated board.
    pub fn generate_excluding(&mut self, excluded: &[ChipKindId]) -> Chip {
        debug_assert!(excluded.len() <= MAX_EXCLUSIONS);

        let candidates = self
            .kinds
            .iter()
            .filter(|kind| !excluded.contains(kind))
            .count();
        assert!(
            candidates > 0,
            "no chip kind left to draw after excluding {:?}",
            excluded
        );

        let pick = self.rng.next_range(candidates as u32) as usize;
        let kind = self
            .kinds
            .iter()
            .copied()
            .filter(|kind| !excluded.contains(kind))
            .nth(pick)
            .unwrap_or(self.kinds[0]);

        let id = ChipId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        Chip { id, kind }
    }
}
