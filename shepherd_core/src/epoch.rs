//! Epoch records: what entered the simulation during one tick.

use serde::{Deserialize, Serialize};
use shepherd_env::{EpochId, ItemId, TagId};

/// An item within the simulation.
///
/// This can represent anything. All it has is an ID and the tags it was
/// attached to when it was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub tags: Vec<TagId>,
}

/// The tags and items introduced at the beginning of one epoch.
///
/// An epoch never holds cumulative state, only what is new in its tick.
/// Fields are private so a record cannot change once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Epoch {
    id: EpochId,
    number: u64,
    items: Vec<Item>,
    tags: Vec<TagId>,
}

impl Epoch {
    /// Creates a new epoch record.
    pub fn new(id: EpochId, number: u64, items: Vec<Item>, tags: Vec<TagId>) -> Self {
        Self {
            id,
            number,
            items,
            tags,
        }
    }

    /// The synthetic epoch handed to agents at tick zero: seed tags, no items.
    pub fn introduction(id: EpochId, tags: Vec<TagId>) -> Self {
        Self::new(id, 0, Vec::new(), tags)
    }

    pub fn id(&self) -> EpochId {
        self.id
    }

    /// Tick number, 0 for the introduction epoch.
    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn tags(&self) -> &[TagId] {
        &self.tags
    }

    /// Iterates over the IDs of the items introduced in this epoch.
    pub fn item_ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.items.iter().map(|item| item.id)
    }
}
