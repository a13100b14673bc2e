//! Agent contracts for shepherds and sheep.
//!
//! Every contract method takes the agent by value and hands back the next
//! instance. The engine threads that instance forward; agents never hold a
//! mutable reference to shared simulation state.

use crate::epoch::Epoch;
use crate::feed::{Feed, Responses};
use crate::graph::RelevanceGraph;
use crate::reaction;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use shepherd_env::{SheepId, ShepherdId, TagId};

/// A tag a sheep is associated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssociatedTag {
    pub id: TagId,

    /// True if the sheep is averse to the tag rather than drawn to it
    pub negated: bool,
}

impl AssociatedTag {
    pub fn preferred(id: TagId) -> Self {
        Self { id, negated: false }
    }
}

/// What a shepherd is allowed to know about a sheep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagedSheep {
    pub id: SheepId,
    pub tags: Vec<AssociatedTag>,
}

impl PackagedSheep {
    /// Packages a sheep with plain (non-negated) tag preferences.
    pub fn new(id: SheepId, tags: impl IntoIterator<Item = TagId>) -> Self {
        Self {
            id,
            tags: tags.into_iter().map(AssociatedTag::preferred).collect(),
        }
    }

    /// Tags the sheep is drawn to.
    pub fn preferred_tags(&self) -> impl Iterator<Item = TagId> + '_ {
        self.tags.iter().filter(|t| !t.negated).map(|t| t.id)
    }
}

/// A content distributor.
pub trait Shepherd: Sized {
    fn id(&self) -> ShepherdId;

    /// Tells the shepherd about sheep.
    ///
    /// Called again every epoch with the full flock, so introducing an
    /// already-known sheep must replace its information, not duplicate it.
    fn introduce_to(self, sheep: &[PackagedSheep]) -> Self;

    /// Starts a new epoch.
    ///
    /// May be followed by zero feed requests.
    fn begin(self, epoch: &Epoch) -> Self;

    /// Builds the next feed for one sheep.
    fn build_feed(self, rng: &mut dyn RngCore, sheep: SheepId) -> (Self, Feed);

    /// Folds back the reactions to the feed last built for `sheep`.
    ///
    /// `responses` is aligned with that feed, item by item.
    fn incorporate_responses(self, sheep: SheepId, responses: &Responses) -> Self;
}

/// A content consumer.
pub trait Sheep: Sized {
    fn id(&self) -> SheepId;

    /// Builds a sheep from its packaged projection.
    fn from_package(package: PackagedSheep) -> Self;

    fn begin(self, epoch: &Epoch) -> Self;

    fn package(&self) -> PackagedSheep;

    /// Reacts to a feed, one reaction per item in feed order.
    fn process_feed(
        &self,
        rng: &mut dyn RngCore,
        graph: &RelevanceGraph,
        feed: &Feed,
    ) -> Responses {
        reaction::process_feed(rng, graph, self.id(), feed)
    }
}
