//! Flock Core - the relevance graph and the agents that live on it.
//!
//! This library holds everything a simulation tick needs except the tick
//! itself:
//! 1. **Relevance Graph**: clustered tag groups, weak cross-links, and sheep
//!    and items hanging off the tag substrate
//! 2. **Reaction Model**: graph distance to probabilistic sentiment
//! 3. **Agent Contracts**: the `Shepherd` and `Sheep` traits plus the
//!    built-in variants
//!
//! # Architecture
//!
//! ```text
//!   Shepherd ──Feed──► Sheep ──process_feed──► Reaction Model
//!      ▲                                          │
//!      └──────────────── Responses ◄──────────────┘
//!                                                 │
//!                                     shortest paths over
//!                                       RelevanceGraph
//! ```

pub mod agent;
pub mod epoch;
pub mod error;
pub mod feed;
pub mod graph;
pub mod paths;
pub mod reaction;
pub mod sheep;
pub mod shepherds;

// Re-export key types for convenience
pub use agent::{AssociatedTag, PackagedSheep, Sheep, Shepherd};
pub use epoch::{Epoch, Item};
pub use error::ConfigError;
pub use feed::{Feed, Reaction, Responses};
pub use graph::{GraphConfig, NodeKind, NodeRef, RelevanceGraph, TagGroups, MAX_EDGE_WEIGHT};
pub use sheep::{FixedSheep, GraphSheep};
pub use shepherds::{AnyShepherd, DummyShepherd, FeedMix, MixedShepherd, TaggedShepherd};
