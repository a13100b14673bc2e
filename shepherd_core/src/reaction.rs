//! Consumer Reaction Model
//! =======================
//!
//! Turns graph distance into sentiment. The closer an item sits to a sheep
//! in the relevance graph, the likelier a positive reaction:
//!
//! ```text
//! P(positive) = 2^-w
//! P(neutral)  = 0.9^w
//! ```
//!
//! where `w` is the aggregate weight of the shortest path(s) between them.

use crate::feed::{Feed, Reaction, Responses};
use crate::graph::{NodeRef, RelevanceGraph};
use crate::paths::{shortest_paths, ShortestPaths};
use rand::{Rng, RngCore};
use shepherd_env::{ItemId, SheepId};
use tracing::trace;

/// Exponent of the power mean used to merge tied paths.
pub const TIE_POWER: f64 = 2.0;

/// Probability of a positive reaction at aggregate weight `w`.
pub fn p_positive(w: f64) -> f64 {
    0.5f64.powf(w)
}

/// Threshold for a neutral reaction at aggregate weight `w`.
///
/// NOTE: this is compared against the same draw as `p_positive`, as a
/// second cumulative threshold. It is not derived from
/// `1 - P(positive) - P(negative)`, so the effective neutral band is
/// `0.9^w - 2^-w`. Whether that is the intended shape is an open question.
pub fn p_neutral(w: f64) -> f64 {
    0.9f64.powf(w)
}

/// Generalized mean `(Σ xᵢᵖ / n)^(1/p)`. Zero for an empty slice.
pub fn power_mean(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let sum: f64 = values.iter().map(|v| v.powf(p)).sum();
    (sum / n).powf(1.0 / p)
}

/// Reduces a set of tied shortest paths to one weight.
pub fn aggregate_weight(paths: &ShortestPaths) -> f64 {
    match paths.path_sums.as_slice() {
        [single] => *single,
        sums => power_mean(sums, TIE_POWER),
    }
}

/// Maps a uniform draw in `[0, 1)` to a reaction at aggregate weight `w`.
pub fn reaction_for_draw(w: f64, r: f64) -> Reaction {
    if r <= p_positive(w) {
        Reaction::Positive
    } else if r <= p_neutral(w) {
        Reaction::Neutral
    } else {
        Reaction::Negative
    }
}

/// Decides how `sheep` reacts to `item`.
///
/// No discoverable relevance means rejection: if the graph holds no path
/// between the two, the reaction is negative and no randomness is used.
pub fn react<R: RngCore + ?Sized>(
    rng: &mut R,
    graph: &RelevanceGraph,
    sheep: SheepId,
    item: ItemId,
) -> Reaction {
    let max_paths = graph.config().max_tied_paths;
    let Some(paths) = shortest_paths(graph, NodeRef::Sheep(sheep), NodeRef::Item(item), max_paths)
    else {
        trace!(%sheep, %item, "No path, rejecting");
        return Reaction::Negative;
    };

    let w = aggregate_weight(&paths);
    let r: f64 = rng.gen();
    let reaction = reaction_for_draw(w, r);

    trace!(
        %sheep,
        %item,
        distance = paths.distance,
        tied = paths.len(),
        w,
        r,
        threshold = p_positive(w),
        ?reaction,
        "Reaction"
    );

    reaction
}

/// Produces one reaction per feed item, in feed order.
pub fn process_feed(
    rng: &mut dyn RngCore,
    graph: &RelevanceGraph,
    sheep: SheepId,
    feed: &Feed,
) -> Responses {
    Responses(
        feed.items()
            .iter()
            .map(|item| react(&mut *rng, graph, sheep, *item))
            .collect(),
    )
}
