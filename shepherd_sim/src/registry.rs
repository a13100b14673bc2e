//! Built-in shepherd kinds, addressable by name.

use serde::{Deserialize, Serialize};
use shepherd_core::{AnyShepherd, DummyShepherd, FeedMix, MixedShepherd, TaggedShepherd};
use shepherd_env::ShepherdId;

/// Shepherd kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShepherdKind {
    /// Random known items, preferences ignored
    Dummy,

    /// Unseen items sharing a tag with the sheep
    Tagged,

    /// Half tag-matched, half random
    Mixed,
}

impl ShepherdKind {
    /// Returns a list of all kinds.
    pub fn all() -> Vec<ShepherdKind> {
        vec![ShepherdKind::Dummy, ShepherdKind::Tagged, ShepherdKind::Mixed]
    }

    /// Returns the kind name.
    pub fn name(&self) -> &'static str {
        match self {
            ShepherdKind::Dummy => "dummy",
            ShepherdKind::Tagged => "tagged",
            ShepherdKind::Mixed => "mixed",
        }
    }

    /// Returns a description of the kind.
    pub fn description(&self) -> &'static str {
        match self {
            ShepherdKind::Dummy => "5 random known items per feed, with replacement",
            ShepherdKind::Tagged => "Up to 10 unseen items sharing a tag with the sheep",
            ShepherdKind::Mixed => "10 items: tag-matched first, random known items after (50/50)",
        }
    }

    /// Builds a fresh shepherd of this kind.
    pub fn build(&self, id: ShepherdId) -> AnyShepherd {
        match self {
            ShepherdKind::Dummy => DummyShepherd::new(id).into(),
            ShepherdKind::Tagged => TaggedShepherd::new(id).into(),
            ShepherdKind::Mixed => MixedShepherd::new(id, FeedMix::default()).into(),
        }
    }
}

impl std::fmt::Display for ShepherdKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ShepherdKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dummy" | "random" => Ok(ShepherdKind::Dummy),
            "tagged" | "tag" => Ok(ShepherdKind::Tagged),
            "mixed" | "mix" => Ok(ShepherdKind::Mixed),
            _ => Err(format!("Unknown shepherd: {}", s)),
        }
    }
}
