//! Core randomness context trait for Flock simulations.

use rand::RngCore;

/// The central interface for entropy in a flock simulation.
///
/// Every stochastic draw in the simulation goes through one of these
/// streams; nothing reads ambient global randomness. The streams are kept
/// separate so that, e.g., changing how many feeds a shepherd builds does
/// not shift the draws that grow the relevance graph.
///
/// # Implementations
///
/// - **Unseeded**: `EntropyContext` - OS-seeded `StdRng` streams
/// - **Seeded**: `SeededContext` (in `shepherd_sim`) - `ChaCha8Rng` streams
///   derived from one master seed
pub trait FlockContext {
    /// Stream used to grow the world: identifiers, counts, group sizes,
    /// edge weights and extremity sampling.
    fn growth_rng(&mut self) -> &mut dyn RngCore;

    /// Stream handed to shepherds when they build feeds.
    fn feed_rng(&mut self) -> &mut dyn RngCore;

    /// Stream used for sheep reaction coin-flips.
    fn reaction_rng(&mut self) -> &mut dyn RngCore;

    /// Returns the context's seed (for logging/debugging).
    ///
    /// Unseeded contexts return 0.
    fn seed(&self) -> u64;
}
