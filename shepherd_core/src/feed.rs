//! Feeds and the reactions sheep return for them.

use serde::{Deserialize, Serialize};
use shepherd_env::ItemId;

/// A sheep's reaction to one feed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reaction {
    Positive,
    Neutral,
    Negative,
}

impl Reaction {
    pub fn is_positive(&self) -> bool {
        matches!(self, Reaction::Positive)
    }
}

/// The feed built by a shepherd for one sheep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed(pub Vec<ItemId>);

impl Feed {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn items(&self) -> &[ItemId] {
        &self.0
    }
}

/// The reactions a sheep returned for a feed.
///
/// Reactions are in the same order as the items of the feed they answer;
/// shepherds rely on that to attribute sentiment to the right item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Responses(pub Vec<Reaction>);

impl Responses {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn reactions(&self) -> &[Reaction] {
        &self.0
    }

    /// Pairs each reaction with the feed item it answers.
    pub fn paired<'a>(&'a self, feed: &'a Feed) -> impl Iterator<Item = (ItemId, Reaction)> + 'a {
        feed.0.iter().copied().zip(self.0.iter().copied())
    }

    /// Number of reactions equal to `reaction`.
    pub fn count(&self, reaction: Reaction) -> usize {
        self.0.iter().filter(|r| **r == reaction).count()
    }
}
