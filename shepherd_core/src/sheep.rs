//! Sheep variants.

use crate::agent::{PackagedSheep, Sheep};
use crate::epoch::Epoch;
use crate::feed::{Feed, Reaction, Responses};
use crate::graph::RelevanceGraph;
use rand::RngCore;
use shepherd_env::{EpochId, SheepId};

/// A sheep whose reactions come from the relevance graph.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphSheep {
    package: PackagedSheep,
    current_epoch: Option<EpochId>,
}

impl GraphSheep {
    pub fn current_epoch(&self) -> Option<EpochId> {
        self.current_epoch
    }
}

impl Sheep for GraphSheep {
    fn id(&self) -> SheepId {
        self.package.id
    }

    fn from_package(package: PackagedSheep) -> Self {
        Self {
            package,
            current_epoch: None,
        }
    }

    fn begin(self, epoch: &Epoch) -> Self {
        Self {
            current_epoch: Some(epoch.id()),
            ..self
        }
    }

    fn package(&self) -> PackagedSheep {
        self.package.clone()
    }
}

/// A sheep that answers every item the same way, whatever the graph says.
///
/// Useful as a control group and in tests.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedSheep {
    package: PackagedSheep,
    reaction: Reaction,
}

impl FixedSheep {
    pub fn new(package: PackagedSheep, reaction: Reaction) -> Self {
        Self { package, reaction }
    }

    pub fn reaction(&self) -> Reaction {
        self.reaction
    }
}

impl Sheep for FixedSheep {
    fn id(&self) -> SheepId {
        self.package.id
    }

    /// Defaults to liking everything.
    fn from_package(package: PackagedSheep) -> Self {
        Self::new(package, Reaction::Positive)
    }

    fn begin(self, _epoch: &Epoch) -> Self {
        self
    }

    fn package(&self) -> PackagedSheep {
        self.package.clone()
    }

    fn process_feed(
        &self,
        _rng: &mut dyn RngCore,
        _graph: &RelevanceGraph,
        feed: &Feed,
    ) -> Responses {
        Responses(vec![self.reaction; feed.len()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeRef;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use shepherd_env::{ItemId, TagId};

    #[test]
    fn test_graph_sheep_uses_reaction_model() {
        let sheep_id = SheepId::from_seed(1);
        let tag = TagId::from_seed(2);
        let near = ItemId::from_seed(3);
        let stranded = ItemId::from_seed(4);

        let mut graph = RelevanceGraph::default();
        graph.insert_edge(NodeRef::Sheep(sheep_id), NodeRef::Tag(tag), 0.1);
        graph.insert_edge(NodeRef::Tag(tag), NodeRef::Item(near), 0.1);
        graph.add_items([stranded]);

        let sheep = GraphSheep::from_package(PackagedSheep::new(sheep_id, [tag]));
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let responses = sheep.process_feed(&mut rng, &graph, &Feed(vec![stranded, near, stranded]));

        assert_eq!(responses.len(), 3);
        assert_eq!(responses.reactions()[0], Reaction::Negative);
        assert_eq!(responses.reactions()[2], Reaction::Negative);
    }

    #[test]
    fn test_fixed_sheep_ignores_graph() {
        let package = PackagedSheep::new(SheepId::from_seed(1), Vec::<TagId>::new());
        let sheep = FixedSheep::new(package.clone(), Reaction::Neutral);
        let graph = RelevanceGraph::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let feed = Feed(vec![ItemId::from_seed(1), ItemId::from_seed(2)]);
        let responses = sheep.process_feed(&mut rng, &graph, &feed);

        assert_eq!(responses.count(Reaction::Neutral), 2);
        assert_eq!(sheep.package(), package);
    }

    #[test]
    fn test_begin_tracks_epoch() {
        let sheep = GraphSheep::from_package(PackagedSheep::new(SheepId::from_seed(1), Vec::<TagId>::new()));
        assert_eq!(sheep.current_epoch(), None);

        let epoch = Epoch::introduction(EpochId::from_seed(5), Vec::new());
        let sheep = sheep.begin(&epoch);
        assert_eq!(sheep.current_epoch(), Some(EpochId::from_seed(5)));
    }
}
