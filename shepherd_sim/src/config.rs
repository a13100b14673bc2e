//! Simulation settings.

use serde::{Deserialize, Serialize};
use shepherd_core::{ConfigError, GraphConfig};
use shepherd_env::Bounds;

/// Configuration for a flock simulation.
///
/// All count ranges are inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Number of tags added at the start of each epoch
    pub n_tags_bounds: Bounds<usize>,

    /// Number of items added at the start of each epoch
    pub n_items_bounds: Bounds<usize>,

    /// Number of tags a new item is attached to
    pub n_item_tags_bounds: Bounds<usize>,

    /// Number of tags a sheep is attached to
    pub n_sheep_tags_bounds: Bounds<usize>,

    /// Number of tags used to seed the simulation
    pub initial_n_tags_bounds: Bounds<usize>,

    /// Number of items used to seed the simulation
    pub initial_n_items_bounds: Bounds<usize>,

    /// Number of sheep in the simulation
    pub initial_n_sheep_bounds: Bounds<usize>,

    /// Orphaned tag count at which the orphans are formed into new groups.
    ///
    /// Should be at most the lower end of `initial_n_tags_bounds`.
    pub orphaned_tag_threshold: usize,

    /// Graph-building parameters
    pub graph: GraphConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            n_tags_bounds: Bounds::ordered(0, 5),
            n_items_bounds: Bounds::ordered(0, 50),
            n_item_tags_bounds: Bounds::ordered(5, 10),
            n_sheep_tags_bounds: Bounds::ordered(5, 25),
            initial_n_tags_bounds: Bounds::ordered(20, 40),
            initial_n_items_bounds: Bounds::ordered(40, 60),
            initial_n_sheep_bounds: Bounds::ordered(20, 40),
            orphaned_tag_threshold: 20,
            graph: GraphConfig::default(),
        }
    }
}

impl Settings {
    /// Rejects malformed settings before a flock is built from them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let counts = [
            ("n_tags_bounds", &self.n_tags_bounds),
            ("n_items_bounds", &self.n_items_bounds),
            ("n_item_tags_bounds", &self.n_item_tags_bounds),
            ("n_sheep_tags_bounds", &self.n_sheep_tags_bounds),
            ("initial_n_tags_bounds", &self.initial_n_tags_bounds),
            ("initial_n_items_bounds", &self.initial_n_items_bounds),
            ("initial_n_sheep_bounds", &self.initial_n_sheep_bounds),
        ];
        for (field, bounds) in counts {
            if !bounds.is_valid() {
                return Err(ConfigError::bounds(field, bounds.lower(), bounds.upper()));
            }
        }

        if self.orphaned_tag_threshold == 0 {
            return Err(ConfigError::Zero {
                field: "orphaned_tag_threshold",
            });
        }

        self.graph.validate()
    }
}
