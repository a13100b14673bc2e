//! Flock - the epoch simulation engine.
//!
//! Owns the relevance graph and one pasture per shepherd. Every call to
//! [`Flock::simulate_epoch`] runs one tick:
//!
//! 1. grow tags and fold them into the tag groups
//! 2. grow items and attach them to the tag substrate
//! 3. record the epoch
//! 4. tell every agent the epoch has begun
//! 5. for every shepherd and every sheep: build a feed, react, learn
//!
//! Attached [`FlockObserver`]s hear about steps 3 and 5 as they happen.

use crate::config::Settings;
use crate::observer::FlockObserver;
use serde::Serialize;
use shepherd_core::{
    ConfigError, Epoch, Item, PackagedSheep, RelevanceGraph, Sheep, Shepherd, TagGroups,
};
use shepherd_env::{EpochId, FlockContext, ItemId, SheepId, ShepherdId, TagId};
use std::collections::HashMap;
use std::mem;
use tracing::{debug, info};

/// A shepherd together with everything it has shown each sheep.
#[derive(Debug, Clone, PartialEq)]
pub struct Pasture<S> {
    pub shepherd: S,

    /// Items shown to each sheep, in the order they were shown
    pub sheep: HashMap<SheepId, Vec<ItemId>>,
}

impl<S: Shepherd> Pasture<S> {
    fn new(shepherd: S, sheep: &[SheepId]) -> Self {
        Self {
            shepherd,
            sheep: sheep.iter().map(|id| (*id, Vec::new())).collect(),
        }
    }

    pub fn id(&self) -> ShepherdId {
        self.shepherd.id()
    }

    /// Items shown to one sheep so far.
    pub fn history(&self, sheep: SheepId) -> &[ItemId] {
        self.sheep.get(&sheep).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total items shown across all sheep.
    pub fn exposure(&self) -> usize {
        self.sheep.values().map(Vec::len).sum()
    }
}

/// Counts describing the state of a flock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlockStats {
    pub epoch: u64,
    pub n_tags: usize,
    pub n_groups: usize,
    pub n_orphans: usize,
    pub n_items: usize,
    pub n_sheep: usize,
    pub n_edges: usize,
    pub density: f64,
}

/// Everything a flock owned, handed back by [`Flock::stop`].
#[derive(Debug)]
pub struct FlockParts<S, P, C> {
    pub context: C,
    pub graph: RelevanceGraph,
    pub pastures: Vec<Pasture<S>>,
    pub sheep: Vec<P>,
    pub tags: Vec<TagId>,
    pub tag_groups: TagGroups,
    pub items: Vec<ItemId>,
    pub epochs: Vec<Epoch>,
}

/// The simulation engine.
///
/// Generic over the shepherd and sheep implementations and over the source
/// of randomness. Use [`shepherd_core::AnyShepherd`] for a fleet of mixed
/// shepherd variants.
pub struct Flock<S, P, C> {
    settings: Settings,
    context: C,
    graph: RelevanceGraph,
    pastures: Vec<Pasture<S>>,
    sheep: Vec<P>,
    tags: Vec<TagId>,
    tag_groups: Vec<Vec<TagId>>,
    tag_orphans: Vec<TagId>,
    items: Vec<ItemId>,
    epochs: Vec<Epoch>,
    observers: Vec<Box<dyn FlockObserver>>,
}

impl<S, P, C> Flock<S, P, C>
where
    S: Shepherd,
    P: Sheep,
    C: FlockContext,
{
    /// Seeds a new flock: initial tags and groups, sheep, items, and an
    /// introduction epoch handed to every shepherd.
    pub fn new(
        settings: Settings,
        shepherds: impl IntoIterator<Item = S>,
        mut context: C,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;

        let mut graph = RelevanceGraph::try_new(settings.graph.clone())?;
        let avg_group_size = settings.graph.average_group_size;
        let rng = context.growth_rng();

        let n_tags = settings.initial_n_tags_bounds.sample(rng);
        let tags: Vec<TagId> = (0..n_tags).map(|_| TagId::generate(rng)).collect();
        graph.add_tags(tags.iter().copied());
        let groups = graph.form_tag_groups(rng, n_tags / avg_group_size, tags.iter().copied());

        let n_sheep = settings.initial_n_sheep_bounds.sample(rng);
        let sheep_ids: Vec<SheepId> = (0..n_sheep).map(|_| SheepId::generate(rng)).collect();
        graph.add_sheep(sheep_ids.iter().copied());
        let sheep: Vec<P> = graph
            .connect_extremities(
                rng,
                sheep_ids.iter().copied(),
                &tags,
                settings.n_sheep_tags_bounds,
            )
            .into_iter()
            .map(|(id, attached)| P::from_package(PackagedSheep::new(id, attached)))
            .collect();

        let n_items = settings.initial_n_items_bounds.sample(rng);
        let items: Vec<ItemId> = (0..n_items).map(|_| ItemId::generate(rng)).collect();
        graph.add_items(items.iter().copied());
        graph.connect_extremities(
            rng,
            items.iter().copied(),
            &tags,
            settings.n_item_tags_bounds,
        );

        let introduction = Epoch::introduction(EpochId::generate(rng), tags.clone());
        let packages: Vec<PackagedSheep> = sheep.iter().map(Sheep::package).collect();
        let pastures: Vec<Pasture<S>> = shepherds
            .into_iter()
            .map(|shepherd| {
                let shepherd = shepherd.begin(&introduction).introduce_to(&packages);
                Pasture::new(shepherd, &sheep_ids)
            })
            .collect();

        info!(
            seed = context.seed(),
            n_tags = tags.len(),
            n_groups = groups.groups.len(),
            n_orphans = groups.orphans.len(),
            n_sheep = sheep.len(),
            n_items = items.len(),
            n_shepherds = pastures.len(),
            "Flock seeded"
        );

        Ok(Self {
            settings,
            context,
            graph,
            pastures,
            sheep,
            tags,
            tag_groups: groups.groups,
            tag_orphans: groups.orphans,
            items,
            epochs: vec![introduction],
            observers: Vec::new(),
        })
    }

    /// Attaches an observer. The introduction epoch has already been
    /// recorded by then and is only reachable through [`Flock::epochs`].
    pub fn add_observer(&mut self, observer: impl FlockObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Builder form of [`Flock::add_observer`].
    pub fn with_observer(mut self, observer: impl FlockObserver + 'static) -> Self {
        self.add_observer(observer);
        self
    }

    /// Runs one epoch.
    pub fn simulate_epoch(&mut self) {
        let number = self.epochs.len() as u64;
        let avg_group_size = self.settings.graph.average_group_size;
        let rng = self.context.growth_rng();

        // Tags
        let n_tags = self.settings.n_tags_bounds.sample(rng);
        let new_tags: Vec<TagId> = (0..n_tags).map(|_| TagId::generate(rng)).collect();
        self.graph.add_tags(new_tags.iter().copied());
        let extended = self.graph.extend_tag_groups(
            rng,
            mem::take(&mut self.tag_groups),
            new_tags.iter().copied(),
        );
        self.tag_groups = extended.groups;
        self.tag_orphans.extend(extended.orphans);
        self.tags.extend(new_tags.iter().copied());

        if self.tag_orphans.len() >= self.settings.orphaned_tag_threshold {
            let orphans = mem::take(&mut self.tag_orphans);
            let max_groups = orphans.len() / avg_group_size;
            let formed = self.graph.form_tag_groups(rng, max_groups, orphans);
            debug!(
                epoch = number,
                new_groups = formed.groups.len(),
                still_orphaned = formed.orphans.len(),
                "Regrouped orphaned tags"
            );
            self.tag_groups.extend(formed.groups);
            self.tag_orphans = formed.orphans;
        }

        // Items
        let n_items = self.settings.n_items_bounds.sample(rng);
        let item_ids: Vec<ItemId> = (0..n_items).map(|_| ItemId::generate(rng)).collect();
        self.graph.add_items(item_ids.iter().copied());
        let new_items: Vec<Item> = self
            .graph
            .connect_extremities(
                rng,
                item_ids.iter().copied(),
                &self.tags,
                self.settings.n_item_tags_bounds,
            )
            .into_iter()
            .map(|(id, tags)| Item { id, tags })
            .collect();
        self.items.extend(item_ids);

        let epoch = Epoch::new(EpochId::generate(rng), number, new_items, new_tags);
        for observer in &mut self.observers {
            observer.epoch_begun(&epoch);
        }

        // Agents
        self.sheep = mem::take(&mut self.sheep)
            .into_iter()
            .map(|sheep| sheep.begin(&epoch))
            .collect();
        let packages: Vec<PackagedSheep> = self.sheep.iter().map(Sheep::package).collect();

        let mut pastures = Vec::with_capacity(self.pastures.len());
        for pasture in mem::take(&mut self.pastures) {
            let Pasture {
                shepherd,
                sheep: mut history,
            } = pasture;
            let mut shepherd = shepherd.begin(&epoch).introduce_to(&packages);
            let shepherd_id = shepherd.id();

            for sheep in &self.sheep {
                let id = sheep.id();
                let (next, feed) = shepherd.build_feed(self.context.feed_rng(), id);
                history.entry(id).or_default().extend(feed.items().iter().copied());
                for observer in &mut self.observers {
                    observer.feed_built(shepherd_id, id, &feed);
                }

                let responses = sheep.process_feed(self.context.reaction_rng(), &self.graph, &feed);
                debug!(
                    shepherd = %shepherd_id,
                    sheep = %id,
                    items = feed.len(),
                    positive = responses.count(shepherd_core::Reaction::Positive),
                    "Feed"
                );
                for observer in &mut self.observers {
                    observer.feed_rated(shepherd_id, id, &feed, &responses);
                }
                shepherd = next.incorporate_responses(id, &responses);
            }

            pastures.push(Pasture {
                shepherd,
                sheep: history,
            });
        }
        self.pastures = pastures;
        self.epochs.push(epoch);

        let stats = self.stats();
        info!(
            epoch = stats.epoch,
            n_tags = stats.n_tags,
            n_orphans = stats.n_orphans,
            n_groups = stats.n_groups,
            n_items = stats.n_items,
            n_sheep = stats.n_sheep,
            p_edges = stats.density,
            "Epoch complete"
        );
    }

    /// Runs `epochs` epochs back to back.
    pub fn simulate(&mut self, epochs: u64) {
        for _ in 0..epochs {
            self.simulate_epoch();
        }
    }

    /// Current counts.
    pub fn stats(&self) -> FlockStats {
        FlockStats {
            epoch: self.current_epoch().map_or(0, Epoch::number),
            n_tags: self.tags.len(),
            n_groups: self.tag_groups.len(),
            n_orphans: self.tag_orphans.len(),
            n_items: self.items.len(),
            n_sheep: self.sheep.len(),
            n_edges: self.graph.edge_count(),
            density: self.graph.density(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn seed(&self) -> u64 {
        self.context.seed()
    }

    /// Every tag, in creation order.
    pub fn tags(&self) -> &[TagId] {
        &self.tags
    }

    pub fn tag_groups(&self) -> &[Vec<TagId>] {
        &self.tag_groups
    }

    pub fn tag_orphans(&self) -> &[TagId] {
        &self.tag_orphans
    }

    /// Every item, in creation order.
    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    pub fn sheep(&self) -> &[P] {
        &self.sheep
    }

    pub fn pastures(&self) -> &[Pasture<S>] {
        &self.pastures
    }

    /// The pasture of one shepherd.
    pub fn pasture(&self, shepherd: ShepherdId) -> Option<&Pasture<S>> {
        self.pastures.iter().find(|p| p.id() == shepherd)
    }

    pub fn graph(&self) -> &RelevanceGraph {
        &self.graph
    }

    /// Every epoch so far, starting with the introduction epoch.
    pub fn epochs(&self) -> &[Epoch] {
        &self.epochs
    }

    pub fn current_epoch(&self) -> Option<&Epoch> {
        self.epochs.last()
    }

    /// Ends the simulation and hands back its state.
    pub fn stop(self) -> FlockParts<S, P, C> {
        FlockParts {
            context: self.context,
            graph: self.graph,
            pastures: self.pastures,
            sheep: self.sheep,
            tags: self.tags,
            tag_groups: TagGroups {
                groups: self.tag_groups,
                orphans: self.tag_orphans,
            },
            items: self.items,
            epochs: self.epochs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SeededContext;
    use crate::observer::FeedLog;
    use shepherd_core::{
        AnyShepherd, DummyShepherd, FeedMix, FixedSheep, GraphConfig, GraphSheep, MixedShepherd,
        Reaction, TaggedShepherd,
    };
    use shepherd_env::{Bounds, EntropyContext};
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::rc::Rc;

    fn scenario_settings() -> Settings {
        Settings {
            initial_n_tags_bounds: Bounds::exactly(30),
            initial_n_sheep_bounds: Bounds::exactly(25),
            n_sheep_tags_bounds: Bounds::ordered(5, 25),
            // At least one new item per epoch so the dummy always has stock
            n_items_bounds: Bounds::ordered(1, 50),
            graph: GraphConfig {
                average_group_size: 7,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn dummy_flock(seed: u64) -> Flock<DummyShepherd, GraphSheep, SeededContext> {
        let shepherd = DummyShepherd::new(ShepherdId::from_seed(1));
        Flock::new(scenario_settings(), [shepherd], SeededContext::new(seed)).unwrap()
    }

    fn assert_tags_partitioned<S: Shepherd, P: Sheep, C: FlockContext>(flock: &Flock<S, P, C>) {
        let mut seen = HashSet::new();
        for tag in flock.tag_groups().iter().flatten().chain(flock.tag_orphans()) {
            assert!(seen.insert(*tag), "tag {} placed twice", tag);
        }
        let all: HashSet<TagId> = flock.tags().iter().copied().collect();
        assert_eq!(seen, all);
    }

    #[test]
    fn test_seeding_scenario() {
        let flock = dummy_flock(42);

        assert_eq!(flock.tags().len(), 30);
        assert!(flock.tag_groups().len() <= 4);
        assert_eq!(flock.sheep().len(), 25);
        assert_tags_partitioned(&flock);

        let bounds = flock.settings().n_sheep_tags_bounds;
        for sheep in flock.sheep() {
            let attached = flock.graph().associated_tags(sheep.id());
            assert!(bounds.contains(attached.len()));
        }
    }

    #[test]
    fn test_introduction_epoch_has_no_items() {
        let flock = dummy_flock(1);

        assert_eq!(flock.epochs().len(), 1);
        let intro = &flock.epochs()[0];
        assert_eq!(intro.number(), 0);
        assert!(intro.items().is_empty());
        assert_eq!(intro.tags(), flock.tags());
    }

    #[test]
    fn test_exposure_after_twenty_epochs() {
        let mut flock = dummy_flock(42);
        flock.simulate(20);

        assert_eq!(flock.epochs().len(), 21);
        let pasture = &flock.pastures()[0];
        for sheep in flock.sheep() {
            assert_eq!(pasture.history(sheep.id()).len(), 5 * 20);
        }
        assert_eq!(pasture.exposure(), 5 * 20 * 25);
        assert_tags_partitioned(&flock);
    }

    #[test]
    fn test_epoch_records_only_new_content() {
        let mut flock = dummy_flock(3);
        let tags_before = flock.tags().len();
        let items_before = flock.items().len();

        flock.simulate_epoch();

        let epoch = flock.current_epoch().unwrap();
        assert_eq!(epoch.number(), 1);
        assert_eq!(epoch.tags(), &flock.tags()[tags_before..]);
        let ids: Vec<ItemId> = epoch.item_ids().collect();
        assert_eq!(ids, &flock.items()[items_before..]);
        for item in epoch.items() {
            assert!(flock.settings().n_item_tags_bounds.contains(item.tags.len()));
        }
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let mut a = dummy_flock(99);
        let mut b = dummy_flock(99);
        a.simulate(5);
        b.simulate(5);

        assert_eq!(a.tags(), b.tags());
        assert_eq!(a.items(), b.items());
        assert_eq!(a.tag_groups(), b.tag_groups());
        assert_eq!(a.epochs(), b.epochs());
        assert_eq!(a.pastures(), b.pastures());
        assert_eq!(a.graph().edge_count(), b.graph().edge_count());

        let mut c = dummy_flock(100);
        c.simulate(5);
        assert_ne!(a.tags(), c.tags());
    }

    #[test]
    fn test_orphans_are_regrouped() {
        // Too few seed tags for a single group, so everything starts orphaned
        let settings = Settings {
            initial_n_tags_bounds: Bounds::exactly(2),
            n_tags_bounds: Bounds::exactly(10),
            orphaned_tag_threshold: 5,
            graph: GraphConfig {
                average_group_size: 3,
                ..Default::default()
            },
            ..scenario_settings()
        };
        let mut flock: Flock<DummyShepherd, GraphSheep, _> =
            Flock::new(settings, Vec::new(), SeededContext::new(5)).unwrap();
        assert!(flock.tag_groups().is_empty());
        assert_eq!(flock.tag_orphans().len(), 2);

        flock.simulate(6);

        assert_eq!(flock.tags().len(), 62);
        assert!(!flock.tag_groups().is_empty());
        assert_tags_partitioned(&flock);
    }

    #[test]
    fn test_tagged_shepherd_learns_from_fixed_sheep() {
        let shepherd = TaggedShepherd::new(ShepherdId::from_seed(2));
        let mut flock: Flock<TaggedShepherd, FixedSheep, _> =
            Flock::new(scenario_settings(), [shepherd], SeededContext::new(8)).unwrap();
        flock.simulate(3);

        let pasture = &flock.pastures()[0];
        for sheep in flock.sheep() {
            let history = pasture.history(sheep.id());
            assert_eq!(pasture.shepherd.liked(sheep.id()), history);
            let distinct: HashSet<&ItemId> = history.iter().collect();
            assert_eq!(distinct.len(), history.len());
            assert_eq!(sheep.reaction(), Reaction::Positive);
        }
    }

    #[test]
    fn test_mixed_fleet_runs() {
        let fleet: Vec<AnyShepherd> = vec![
            DummyShepherd::new(ShepherdId::from_seed(1)).into(),
            TaggedShepherd::new(ShepherdId::from_seed(2)).into(),
            MixedShepherd::new(ShepherdId::from_seed(3), FeedMix::new(40, 60).unwrap()).into(),
        ];
        let mut flock: Flock<AnyShepherd, GraphSheep, _> =
            Flock::new(scenario_settings(), fleet, SeededContext::new(11)).unwrap();
        flock.simulate(4);

        assert_eq!(flock.pastures().len(), 3);
        assert!(flock.pasture(ShepherdId::from_seed(3)).is_some());
        assert_eq!(
            flock.pasture(ShepherdId::from_seed(1)).map(Pasture::exposure),
            Some(5 * 4 * 25)
        );
    }

    #[test]
    fn test_unseeded_context_runs() {
        let mut flock: Flock<DummyShepherd, GraphSheep, _> = Flock::new(
            Settings::default(),
            [DummyShepherd::new(ShepherdId::from_seed(1))],
            EntropyContext::new(),
        )
        .unwrap();
        flock.simulate_epoch();

        assert_eq!(flock.epochs().len(), 2);
        assert_eq!(flock.seed(), 0);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut settings = Settings::default();
        settings.graph.average_group_size = 0;

        let result: Result<Flock<DummyShepherd, GraphSheep, _>, _> =
            Flock::new(settings, Vec::new(), SeededContext::new(1));
        assert!(matches!(result, Err(ConfigError::Zero { .. })));
    }

    #[test]
    fn test_stop_returns_state() {
        let mut flock = dummy_flock(4);
        flock.simulate(2);
        let n_tags = flock.tags().len();

        let parts = flock.stop();
        assert_eq!(parts.tags.len(), n_tags);
        assert_eq!(parts.epochs.len(), 3);
        assert_eq!(parts.tag_groups.all_tags().count(), n_tags);
        assert_eq!(parts.context.seed(), 4);
    }

    #[test]
    fn test_observer_sees_every_feed_with_its_responses() {
        let log = Rc::new(RefCell::new(FeedLog::new()));
        let mut flock = dummy_flock(6).with_observer(log.clone());
        flock.simulate(3);

        let log = log.borrow();
        let epoch_ids: Vec<EpochId> = flock.epochs()[1..].iter().map(Epoch::id).collect();
        assert_eq!(log.epochs(), epoch_ids.as_slice());

        let n_sheep = flock.sheep().len();
        assert_eq!(log.built(), 3 * n_sheep);
        assert_eq!(log.rated().len(), 3 * n_sheep);

        let pasture = &flock.pastures()[0];
        for sheep in flock.sheep() {
            let shown: Vec<ItemId> = log
                .rated()
                .iter()
                .filter(|rated| rated.sheep == sheep.id())
                .flat_map(|rated| rated.feed.items().iter().copied())
                .collect();
            assert_eq!(shown, pasture.history(sheep.id()));
        }
        for rated in log.rated() {
            assert_eq!(rated.shepherd, pasture.id());
            assert_eq!(rated.responses.len(), rated.feed.len());
            assert!(matches!(rated.epoch, Some(id) if epoch_ids.contains(&id)));
        }
    }

    #[test]
    fn test_observer_hooks_default_to_nothing() {
        #[derive(Default)]
        struct Negatives(usize);

        impl FlockObserver for Negatives {
            fn feed_rated(
                &mut self,
                _shepherd: ShepherdId,
                _sheep: SheepId,
                _feed: &shepherd_core::Feed,
                responses: &shepherd_core::Responses,
            ) {
                self.0 += responses.count(Reaction::Negative);
            }
        }

        let counter = Rc::new(RefCell::new(Negatives::default()));
        let shepherd = DummyShepherd::new(ShepherdId::from_seed(1));
        let mut flock: Flock<DummyShepherd, FixedSheep, _> =
            Flock::new(scenario_settings(), [shepherd], SeededContext::new(3))
                .unwrap()
                .with_observer(counter.clone());
        flock.simulate(2);

        // Fixed sheep like everything
        assert_eq!(counter.borrow().0, 0);
        assert_eq!(flock.epochs().len(), 3);
    }
}
