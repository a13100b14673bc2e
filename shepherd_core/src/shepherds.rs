//! Shepherd variants.
//!
//! - [`DummyShepherd`]: random picks from everything it has heard of.
//! - [`TaggedShepherd`]: unseen items that share a tag with the sheep.
//! - [`MixedShepherd`]: a fixed percentage split between the two.
//! - [`AnyShepherd`]: one type for a fleet of mixed variants.

use crate::agent::{PackagedSheep, Shepherd};
use crate::epoch::Epoch;
use crate::error::ConfigError;
use crate::feed::{Feed, Responses};
use rand::seq::{IteratorRandom, SliceRandom};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use shepherd_env::{ItemId, SheepId, ShepherdId, TagId};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Items per feed for [`DummyShepherd`].
pub const DUMMY_FEED_SIZE: usize = 5;

/// Items per feed for [`TaggedShepherd`] and [`MixedShepherd`].
pub const TAGGED_FEED_SIZE: usize = 10;

// =============================================================================
// DUMMY
// =============================================================================

/// Ignores preferences entirely and picks random known items, with
/// replacement.
#[derive(Debug, Clone, PartialEq)]
pub struct DummyShepherd {
    id: ShepherdId,
    feed_size: usize,
    known_items: Vec<ItemId>,
}

impl DummyShepherd {
    pub fn new(id: ShepherdId) -> Self {
        Self {
            id,
            feed_size: DUMMY_FEED_SIZE,
            known_items: Vec::new(),
        }
    }

    pub fn with_feed_size(mut self, feed_size: usize) -> Self {
        self.feed_size = feed_size;
        self
    }

    pub fn known_items(&self) -> &[ItemId] {
        &self.known_items
    }

    /// Draws `n` random known items. Empty if nothing is known yet.
    fn pick(&self, rng: &mut dyn RngCore, n: usize) -> Vec<ItemId> {
        if self.known_items.is_empty() {
            return Vec::new();
        }
        (0..n)
            .filter_map(|_| self.known_items.choose(rng).copied())
            .collect()
    }
}

impl Shepherd for DummyShepherd {
    fn id(&self) -> ShepherdId {
        self.id
    }

    fn introduce_to(self, _sheep: &[PackagedSheep]) -> Self {
        self
    }

    fn begin(mut self, epoch: &Epoch) -> Self {
        self.known_items.extend(epoch.item_ids());
        self
    }

    fn build_feed(self, rng: &mut dyn RngCore, _sheep: SheepId) -> (Self, Feed) {
        let feed = Feed(self.pick(rng, self.feed_size));
        (self, feed)
    }

    fn incorporate_responses(self, _sheep: SheepId, _responses: &Responses) -> Self {
        self
    }
}

// =============================================================================
// TAGGED
// =============================================================================

/// Serves each sheep unseen items that share at least one tag with it.
///
/// Tags of items a sheep liked are treated as extra preferences for that
/// sheep from then on.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedShepherd {
    id: ShepherdId,
    feed_size: usize,
    items_by_tag: BTreeMap<TagId, Vec<ItemId>>,
    item_tags: BTreeMap<ItemId, Vec<TagId>>,
    sheep_tags: BTreeMap<SheepId, Vec<TagId>>,
    seen: BTreeMap<SheepId, BTreeSet<ItemId>>,
    pending: BTreeMap<SheepId, Feed>,
    liked: BTreeMap<SheepId, Vec<ItemId>>,
}

impl TaggedShepherd {
    pub fn new(id: ShepherdId) -> Self {
        Self {
            id,
            feed_size: TAGGED_FEED_SIZE,
            items_by_tag: BTreeMap::new(),
            item_tags: BTreeMap::new(),
            sheep_tags: BTreeMap::new(),
            seen: BTreeMap::new(),
            pending: BTreeMap::new(),
            liked: BTreeMap::new(),
        }
    }

    pub fn with_feed_size(mut self, feed_size: usize) -> Self {
        self.feed_size = feed_size;
        self
    }

    /// Items the sheep reacted positively to, oldest first.
    pub fn liked(&self, sheep: SheepId) -> &[ItemId] {
        self.liked.get(&sheep).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of sheep this shepherd has been introduced to.
    pub fn known_sheep(&self) -> usize {
        self.sheep_tags.len()
    }

    /// Tags that count as a preference of the sheep.
    fn preferences(&self, sheep: SheepId) -> BTreeSet<TagId> {
        let mut tags: BTreeSet<TagId> = self
            .sheep_tags
            .get(&sheep)
            .into_iter()
            .flatten()
            .copied()
            .collect();
        for item in self.liked(sheep) {
            if let Some(item_tags) = self.item_tags.get(item) {
                tags.extend(item_tags.iter().copied());
            }
        }
        tags
    }

    fn mark_seen(&mut self, sheep: SheepId, items: &[ItemId]) {
        self.seen.entry(sheep).or_default().extend(items.iter().copied());
    }

    /// Picks up to `n` unseen, tag-sharing items and marks them seen.
    fn pick(&mut self, rng: &mut dyn RngCore, sheep: SheepId, n: usize) -> Vec<ItemId> {
        let seen = self.seen.get(&sheep);
        let candidates: BTreeSet<ItemId> = self
            .preferences(sheep)
            .iter()
            .filter_map(|tag| self.items_by_tag.get(tag))
            .flatten()
            .filter(|item| seen.map_or(true, |s| !s.contains(*item)))
            .copied()
            .collect();

        let chosen = candidates.into_iter().choose_multiple(rng, n);
        self.mark_seen(sheep, &chosen);
        chosen
    }

    /// How many leading items of the last feed for `sheep` came from here.
    fn pending_len(&self, sheep: SheepId) -> usize {
        self.pending.get(&sheep).map_or(0, Feed::len)
    }
}

impl Shepherd for TaggedShepherd {
    fn id(&self) -> ShepherdId {
        self.id
    }

    fn introduce_to(mut self, sheep: &[PackagedSheep]) -> Self {
        for package in sheep {
            self.sheep_tags
                .insert(package.id, package.preferred_tags().collect());
        }
        self
    }

    fn begin(mut self, epoch: &Epoch) -> Self {
        for item in epoch.items() {
            for tag in &item.tags {
                self.items_by_tag.entry(*tag).or_default().push(item.id);
            }
            self.item_tags.insert(item.id, item.tags.clone());
        }
        self
    }

    fn build_feed(mut self, rng: &mut dyn RngCore, sheep: SheepId) -> (Self, Feed) {
        let feed = Feed(self.pick(rng, sheep, self.feed_size));
        self.pending.insert(sheep, feed.clone());
        (self, feed)
    }

    fn incorporate_responses(mut self, sheep: SheepId, responses: &Responses) -> Self {
        let Some(feed) = self.pending.remove(&sheep) else {
            return self;
        };
        let liked: Vec<ItemId> = responses
            .paired(&feed)
            .filter(|(_, reaction)| reaction.is_positive())
            .map(|(item, _)| item)
            .collect();
        if !liked.is_empty() {
            self.liked.entry(sheep).or_default().extend(liked);
        }
        self
    }
}

// =============================================================================
// MIXED
// =============================================================================

/// Percentage split of a feed between random and tag-matched items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedMix {
    random: u32,
    tagged: u32,
}

impl FeedMix {
    /// Creates a split. The two shares must add up to exactly 100.
    pub fn new(random: u32, tagged: u32) -> Result<Self, ConfigError> {
        let total = random.saturating_add(tagged);
        if total != 100 {
            return Err(ConfigError::FeedMixTotal {
                expected: 100,
                actual: total,
            });
        }
        Ok(Self { random, tagged })
    }

    pub fn random(&self) -> u32 {
        self.random
    }

    pub fn tagged(&self) -> u32 {
        self.tagged
    }

    /// Tag-matched slots in a feed of `feed_size`, rounded down.
    pub fn tagged_slots(&self, feed_size: usize) -> usize {
        feed_size * self.tagged as usize / 100
    }
}

impl Default for FeedMix {
    fn default() -> Self {
        Self {
            random: 50,
            tagged: 50,
        }
    }
}

/// Fills the tag-matched share first, then tops up with random known items.
#[derive(Debug, Clone, PartialEq)]
pub struct MixedShepherd {
    id: ShepherdId,
    mix: FeedMix,
    feed_size: usize,
    random: DummyShepherd,
    tagged: TaggedShepherd,
}

impl MixedShepherd {
    pub fn new(id: ShepherdId, mix: FeedMix) -> Self {
        Self {
            id,
            mix,
            feed_size: TAGGED_FEED_SIZE,
            random: DummyShepherd::new(id),
            tagged: TaggedShepherd::new(id),
        }
    }

    pub fn with_feed_size(mut self, feed_size: usize) -> Self {
        self.feed_size = feed_size;
        self
    }

    pub fn mix(&self) -> FeedMix {
        self.mix
    }
}

impl Shepherd for MixedShepherd {
    fn id(&self) -> ShepherdId {
        self.id
    }

    fn introduce_to(mut self, sheep: &[PackagedSheep]) -> Self {
        self.random = self.random.introduce_to(sheep);
        self.tagged = self.tagged.introduce_to(sheep);
        self
    }

    fn begin(mut self, epoch: &Epoch) -> Self {
        self.random = self.random.begin(epoch);
        self.tagged = self.tagged.begin(epoch);
        self
    }

    fn build_feed(mut self, rng: &mut dyn RngCore, sheep: SheepId) -> (Self, Feed) {
        let wanted = self.mix.tagged_slots(self.feed_size);
        let mut items = self.tagged.pick(rng, sheep, wanted);
        self.tagged.pending.insert(sheep, Feed(items.clone()));

        let rest = self.random.pick(rng, self.feed_size - items.len());
        self.tagged.mark_seen(sheep, &rest);
        items.extend(rest);

        debug!(shepherd = %self.id, %sheep, tagged = self.tagged.pending_len(sheep), total = items.len(), "Mixed feed");
        (self, Feed(items))
    }

    fn incorporate_responses(mut self, sheep: SheepId, responses: &Responses) -> Self {
        // Only the leading, tag-matched part of the feed teaches anything
        let tagged_part = Responses(
            responses
                .reactions()
                .iter()
                .take(self.tagged.pending_len(sheep))
                .copied()
                .collect(),
        );
        self.tagged = self.tagged.incorporate_responses(sheep, &tagged_part);
        self
    }
}

// =============================================================================
// ANY
// =============================================================================

/// Any of the built-in shepherds.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyShepherd {
    Dummy(DummyShepherd),
    Tagged(TaggedShepherd),
    Mixed(MixedShepherd),
}

impl AnyShepherd {
    /// Short name of the wrapped variant.
    pub fn name(&self) -> &'static str {
        match self {
            AnyShepherd::Dummy(_) => "dummy",
            AnyShepherd::Tagged(_) => "tagged",
            AnyShepherd::Mixed(_) => "mixed",
        }
    }
}

impl From<DummyShepherd> for AnyShepherd {
    fn from(shepherd: DummyShepherd) -> Self {
        AnyShepherd::Dummy(shepherd)
    }
}

impl From<TaggedShepherd> for AnyShepherd {
    fn from(shepherd: TaggedShepherd) -> Self {
        AnyShepherd::Tagged(shepherd)
    }
}

impl From<MixedShepherd> for AnyShepherd {
    fn from(shepherd: MixedShepherd) -> Self {
        AnyShepherd::Mixed(shepherd)
    }
}

impl Shepherd for AnyShepherd {
    fn id(&self) -> ShepherdId {
        match self {
            AnyShepherd::Dummy(s) => s.id(),
            AnyShepherd::Tagged(s) => s.id(),
            AnyShepherd::Mixed(s) => s.id(),
        }
    }

    fn introduce_to(self, sheep: &[PackagedSheep]) -> Self {
        match self {
            AnyShepherd::Dummy(s) => s.introduce_to(sheep).into(),
            AnyShepherd::Tagged(s) => s.introduce_to(sheep).into(),
            AnyShepherd::Mixed(s) => s.introduce_to(sheep).into(),
        }
    }

    fn begin(self, epoch: &Epoch) -> Self {
        match self {
            AnyShepherd::Dummy(s) => s.begin(epoch).into(),
            AnyShepherd::Tagged(s) => s.begin(epoch).into(),
            AnyShepherd::Mixed(s) => s.begin(epoch).into(),
        }
    }

    fn build_feed(self, rng: &mut dyn RngCore, sheep: SheepId) -> (Self, Feed) {
        match self {
            AnyShepherd::Dummy(s) => {
                let (s, feed) = s.build_feed(rng, sheep);
                (s.into(), feed)
            }
            AnyShepherd::Tagged(s) => {
                let (s, feed) = s.build_feed(rng, sheep);
                (s.into(), feed)
            }
            AnyShepherd::Mixed(s) => {
                let (s, feed) = s.build_feed(rng, sheep);
                (s.into(), feed)
            }
        }
    }

    fn incorporate_responses(self, sheep: SheepId, responses: &Responses) -> Self {
        match self {
            AnyShepherd::Dummy(s) => s.incorporate_responses(sheep, responses).into(),
            AnyShepherd::Tagged(s) => s.incorporate_responses(sheep, responses).into(),
            AnyShepherd::Mixed(s) => s.incorporate_responses(sheep, responses).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epoch::Item;
    use crate::feed::Reaction;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use shepherd_env::EpochId;
    use std::collections::HashSet;

    /// Two tags, two sheep (one per tag), six items (three per tag).
    fn fixture() -> (Vec<PackagedSheep>, Epoch, [TagId; 2]) {
        let tags = [TagId::from_seed(1), TagId::from_seed(2)];
        let sheep = vec![
            PackagedSheep::new(SheepId::from_seed(10), [tags[0]]),
            PackagedSheep::new(SheepId::from_seed(11), [tags[1]]),
        ];
        let items = (0..6)
            .map(|n| Item {
                id: ItemId::from_seed(100 + n),
                tags: vec![tags[(n % 2) as usize]],
            })
            .collect();
        let epoch = Epoch::new(EpochId::from_seed(1), 1, items, tags.to_vec());
        (sheep, epoch, tags)
    }

    fn all_variants() -> Vec<AnyShepherd> {
        vec![
            DummyShepherd::new(ShepherdId::from_seed(1)).into(),
            TaggedShepherd::new(ShepherdId::from_seed(2)).into(),
            MixedShepherd::new(ShepherdId::from_seed(3), FeedMix::default()).into(),
        ]
    }

    #[test]
    fn test_reintroduction_is_idempotent() {
        let (sheep, epoch, _) = fixture();

        for shepherd in all_variants() {
            let once = shepherd.begin(&epoch).introduce_to(&sheep);
            let twice = once.clone().introduce_to(&sheep);
            assert_eq!(once, twice, "{} changed on re-introduction", once.name());
        }
    }

    #[test]
    fn test_dummy_picks_known_items_with_replacement() {
        let (_, epoch, _) = fixture();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let sheep = SheepId::from_seed(10);

        let shepherd = DummyShepherd::new(ShepherdId::from_seed(1));
        let (shepherd, empty) = shepherd.build_feed(&mut rng, sheep);
        assert!(empty.is_empty());

        let shepherd = shepherd.begin(&epoch).with_feed_size(50);
        let (_, feed) = shepherd.build_feed(&mut rng, sheep);
        assert_eq!(feed.len(), 50);
        let known: HashSet<ItemId> = epoch.item_ids().collect();
        assert!(feed.items().iter().all(|item| known.contains(item)));
    }

    #[test]
    fn test_tagged_serves_matching_items_without_repeats() {
        let (sheep, epoch, tags) = fixture();
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let sheep_id = sheep[0].id;
        let matching: HashSet<ItemId> = epoch
            .items()
            .iter()
            .filter(|item| item.tags.contains(&tags[0]))
            .map(|item| item.id)
            .collect();

        let mut shepherd = TaggedShepherd::new(ShepherdId::from_seed(2))
            .with_feed_size(2)
            .begin(&epoch)
            .introduce_to(&sheep);

        let mut served = Vec::new();
        for _ in 0..3 {
            let (next, feed) = shepherd.build_feed(&mut rng, sheep_id);
            let responses = Responses(vec![Reaction::Neutral; feed.len()]);
            shepherd = next.incorporate_responses(sheep_id, &responses);
            served.extend(feed.0);
        }

        assert_eq!(served.len(), 3);
        let distinct: HashSet<ItemId> = served.iter().copied().collect();
        assert_eq!(distinct, matching);
    }

    #[test]
    fn test_tagged_learns_from_likes() {
        let (sheep, epoch, tags) = fixture();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let sheep_id = sheep[0].id;

        let shepherd = TaggedShepherd::new(ShepherdId::from_seed(2))
            .begin(&epoch)
            .introduce_to(&sheep);
        let (shepherd, feed) = shepherd.build_feed(&mut rng, sheep_id);
        assert_eq!(feed.len(), 3);

        let responses = Responses(vec![Reaction::Positive, Reaction::Negative, Reaction::Neutral]);
        let shepherd = shepherd.incorporate_responses(sheep_id, &responses);
        assert_eq!(shepherd.liked(sheep_id), &feed.items()[..1]);
        assert!(shepherd.preferences(sheep_id).contains(&tags[0]));
    }

    #[test]
    fn test_feed_mix_must_total_100() {
        assert!(FeedMix::new(30, 70).is_ok());
        assert_eq!(
            FeedMix::new(30, 30),
            Err(ConfigError::FeedMixTotal {
                expected: 100,
                actual: 60
            })
        );
        assert_eq!(FeedMix::new(30, 70).unwrap().tagged_slots(10), 7);
    }

    #[test]
    fn test_mixed_puts_tagged_items_first() {
        let (sheep, epoch, tags) = fixture();
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let sheep_id = sheep[1].id;

        let mix = FeedMix::new(80, 20).unwrap();
        let shepherd = MixedShepherd::new(ShepherdId::from_seed(3), mix)
            .begin(&epoch)
            .introduce_to(&sheep);
        let (shepherd, feed) = shepherd.build_feed(&mut rng, sheep_id);

        assert_eq!(feed.len(), TAGGED_FEED_SIZE);
        for item in &feed.items()[..2] {
            let tagged = epoch.items().iter().find(|i| i.id == *item).unwrap();
            assert!(tagged.tags.contains(&tags[1]));
        }

        let responses = Responses(vec![Reaction::Positive; feed.len()]);
        let shepherd = shepherd.incorporate_responses(sheep_id, &responses);
        assert_eq!(shepherd.tagged.liked(sheep_id).len(), 2);
    }
}
