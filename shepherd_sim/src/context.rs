//! Seeded context implementing FlockContext for reproducible runs.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use shepherd_env::FlockContext;

/// ChaCha stream numbers. Every stream shares the master seed.
pub(crate) const GROWTH_STREAM: u64 = 0;
pub(crate) const FEED_STREAM: u64 = 1;
pub(crate) const REACTION_STREAM: u64 = 2;
pub(crate) const FLEET_STREAM: u64 = 3;

/// A ChaCha8 generator keyed by `seed` and positioned on `stream`.
///
/// Distinct streams never overlap for any seed, zero included.
pub(crate) fn seeded_stream(seed: u64, stream: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(stream);
    rng
}

/// Simulation context backed by seeded ChaCha8 streams.
///
/// All three streams are derived from one master seed, so a seed fully
/// determines a run.
#[derive(Debug, Clone)]
pub struct SeededContext {
    /// Master seed for this simulation
    seed: u64,

    /// Graph growth: identifiers, counts, weights
    growth: ChaCha8Rng,

    /// Shepherd feed building
    feed: ChaCha8Rng,

    /// Sheep reactions
    reaction: ChaCha8Rng,
}

impl SeededContext {
    /// Creates a new SeededContext with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            growth: seeded_stream(seed, GROWTH_STREAM),
            feed: seeded_stream(seed, FEED_STREAM),
            reaction: seeded_stream(seed, REACTION_STREAM),
        }
    }
}

impl FlockContext for SeededContext {
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
        self.seed
    }
}
