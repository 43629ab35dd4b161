//! Park-Miller MINSTD generator behind an injectable coin-flip trait.
//!
//! Generation only ever needs fair coin flips, so the seam is a single-method
//! trait: tests substitute scripted sources, production code seeds
//! [`MinstdRng`] and gets a reproducible maze per seed.
//!
//! Constants: multiplier 48271, modulus 2^31 - 1.
//! Reference: https://en.wikipedia.org/wiki/Lehmer_random_number_generator

/// Uniform randomness injected into the generator.
pub trait RandomSource {
    /// A fair coin flip.
    fn coin_flip(&mut self) -> bool;
}

/// Park-Miller linear congruential generator.
///
/// Same seed, same sequence, on every platform; integer arithmetic only.
#[derive(Debug, Clone)]
pub struct MinstdRng {
    state: u32,
}

const A: u64 = 48271;
const M: u64 = 2_147_483_647; // 2^31 - 1

impl MinstdRng {
    /// Seed the generator. A zero state would be a fixed point of the
    /// recurrence, so seeds congruent to 0 mod m are promoted to 1.
    pub fn new(seed: u32) -> Self {
        let state = seed % M as u32;
        Self {
            state: if state == 0 { 1 } else { state },
        }
    }

    /// Advance and return the next state, uniform over [1, 2^31 - 1).
    fn next(&mut self) -> u32 {
        self.state = ((self.state as u64 * A) % M) as u32;
        self.state
    }
}

impl RandomSource for MinstdRng {
    fn coin_flip(&mut self) -> bool {
        // Compare against the midpoint of the state range rather than using
        // the low bit, which is weak in an LCG.
        (self.next() as u64) > M / 2
    }
}
