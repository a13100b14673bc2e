//! Unseeded implementation of FlockContext backed by OS entropy.

use crate::FlockContext;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Context whose streams are seeded from the operating system.
///
/// Used when a run does not need to be reproduced.
pub struct EntropyContext {
    growth: StdRng,
    feed: StdRng,
    reaction: StdRng,
}

impl EntropyContext {
    /// Creates a new EntropyContext.
    pub fn new() -> Self {
        Self {
            growth: StdRng::from_entropy(),
            feed: StdRng::from_entropy(),
            reaction: StdRng::from_entropy(),
        }
    }
}

impl Default for EntropyContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FlockContext for EntropyContext {
    fn growth_rng(&mut self) -> &mut dyn RngCore {
        &mut self.growth
    }

    fn feed_rng(&mut self) -> &mut dyn RngCore {
        &mut self.feed
    }

    fn reaction_rng(&mut self) -> &mut dyn RngCore {
        &mut self.reaction
    }

    fn seed(&self) -> u64 {
        0
    }
}
