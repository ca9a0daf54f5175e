//! Guid module - deterministic item guid generation
//!
//! Guids are 16 lowercase hex digits: 8 from an LCG draw followed by 8 from a
//! monotonically increasing counter. The counter part keeps ids unique within
//! a session; the LCG part keeps ids from different seeds apart. The same
//! seed always yields the same sequence, which keeps tests and replays stable.

use crate::types::ItemId;

/// Simple LCG (Linear Congruential Generator)
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce a fixed first draw
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m, a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }
}

/// Source of fresh item guids
#[derive(Debug, Clone)]
pub struct GuidSource {
    rng: SimpleRng,
    counter: u32,
}

impl GuidSource {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: SimpleRng::new(seed),
            counter: 0,
        }
    }

    /// Draw the next guid
    pub fn next_guid(&mut self) -> ItemId {
        self.counter = self.counter.wrapping_add(1);
        ItemId::new(format!("{:08x}{:08x}", self.rng.next_u32(), self.counter))
    }

    /// Number of guids handed out so far
    pub fn issued(&self) -> u32 {
        self.counter
    }
}

impl Default for GuidSource {
    fn default() -> Self {
        Self::new(1)
    }
}
