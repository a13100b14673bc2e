//! Relevance Graph - the weighted substrate that defines affinity.
//! ===============================================================
//!
//! An undirected weighted graph over three node kinds:
//! - **Tags** clustered into groups. Tags inside a group are densely linked
//!   with strong weights, and a sparse random set of weak cross-links joins
//!   groups into a small-world structure.
//! - **Sheep** and **Items** hanging off the tag substrate through a handful
//!   of randomly sampled "extremity" edges.
//!
//! The graph is append-only. Nodes and edges are never removed, and an
//! edge's weight never changes once it exists.
//!
//! Usage:
//! ```ignore
//! use shepherd_core::graph::{GraphConfig, RelevanceGraph};
//!
//! let mut graph = RelevanceGraph::new(GraphConfig::default());
//! graph.add_tags(tags.iter().copied());
//! let groups = graph.form_tag_groups(&mut rng, 4, tags.iter().copied());
//! graph.add_sheep(sheep.iter().copied());
//! graph.connect_extremities(&mut rng, sheep.iter().copied(), &tags, bounds);
//! ```

use crate::error::ConfigError;
use petgraph::graph::{NodeIndex, UnGraph};
use rand::seq::{index, SliceRandom};
use rand::Rng;
use rand_distr::{Distribution, Poisson};
use serde::{Deserialize, Serialize};
use shepherd_env::{Bounds, ItemId, SheepId, TagId};
use std::collections::HashMap;

/// Upper limit on any edge weight.
pub const MAX_EDGE_WEIGHT: f64 = 10.0;

// =============================================================================
// NODES
// =============================================================================

/// The kinds of nodes in the relevance graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Sheep,
    Tag,
    Item,
}

impl NodeKind {
    /// Display colour for front-ends. Purely cosmetic.
    pub fn color(&self) -> &'static str {
        match self {
            NodeKind::Sheep => "#ffb8b8",
            NodeKind::Tag => "#00eb00",
            NodeKind::Item => "#c7c7ff",
        }
    }
}

/// Identity of a node in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeRef {
    Sheep(SheepId),
    Tag(TagId),
    Item(ItemId),
}

impl NodeRef {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeRef::Sheep(_) => NodeKind::Sheep,
            NodeRef::Tag(_) => NodeKind::Tag,
            NodeRef::Item(_) => NodeKind::Item,
        }
    }
}

/// Node weight stored in the petgraph graph.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub node: NodeRef,
    pub color: &'static str,
}

/// Identifiers that name a node in the relevance graph.
///
/// The node kind is carried by the identifier type, so `add_nodes` with a
/// batch of `TagId`s always inserts tag nodes.
pub trait GraphKey: Copy {
    const KIND: NodeKind;

    fn node_ref(self) -> NodeRef;
}

impl GraphKey for TagId {
    const KIND: NodeKind = NodeKind::Tag;

    fn node_ref(self) -> NodeRef {
        NodeRef::Tag(self)
    }
}

impl GraphKey for SheepId {
    const KIND: NodeKind = NodeKind::Sheep;

    fn node_ref(self) -> NodeRef {
        NodeRef::Sheep(self)
    }
}

impl GraphKey for ItemId {
    const KIND: NodeKind = NodeKind::Item;

    fn node_ref(self) -> NodeRef {
        NodeRef::Item(self)
    }
}

/// Marker for node kinds that attach to the tag substrate (sheep and items).
pub trait Extremity: GraphKey {}

impl Extremity for SheepId {}

impl Extremity for ItemId {}

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Parameters of the graph-building algorithms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Weight range for edges inside a tag group
    pub strong_weights: Bounds<f64>,

    /// Weight range for cross-group tag edges
    pub weak_weights: Bounds<f64>,

    /// Weight range for sheep/item to tag edges
    pub extremity_weights: Bounds<f64>,

    /// Chance that any one cross-group tag pair gets a weak edge
    pub cross_link_probability: f64,

    /// Mean of the Poisson draw that sizes new tag groups.
    ///
    /// Also used by the engine to decide how many groups to form from a
    /// batch of tags (`tags / average_group_size`).
    pub average_group_size: usize,

    /// Cap on how many tied shortest paths the reaction model enumerates
    pub max_tied_paths: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            strong_weights: Bounds::ordered(0.5, 1.0),
            weak_weights: Bounds::ordered(0.1, 0.5),
            extremity_weights: Bounds::ordered(0.1, 1.0),
            cross_link_probability: 0.01,
            average_group_size: 7,
            max_tied_paths: 64,
        }
    }
}

impl GraphConfig {
    /// Checks every range and probability.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_weights("strong", &self.strong_weights)?;
        validate_weights("weak", &self.weak_weights)?;
        validate_weights("extremity", &self.extremity_weights)?;

        if !(0.0..=1.0).contains(&self.cross_link_probability) {
            return Err(ConfigError::Probability {
                field: "cross_link_probability",
                value: self.cross_link_probability,
            });
        }
        if self.average_group_size == 0 {
            return Err(ConfigError::Zero {
                field: "average_group_size",
            });
        }
        if self.max_tied_paths == 0 {
            return Err(ConfigError::Zero {
                field: "max_tied_paths",
            });
        }
        Ok(())
    }
}

fn validate_weights(field: &'static str, weights: &Bounds<f64>) -> Result<(), ConfigError> {
    let (lower, upper) = (weights.lower(), weights.upper());
    if !weights.is_valid() || !(lower > 0.0) || !(upper <= MAX_EDGE_WEIGHT) {
        return Err(ConfigError::WeightRange {
            field,
            lower,
            upper,
            max: MAX_EDGE_WEIGHT,
        });
    }
    Ok(())
}

// =============================================================================
// TAG GROUPS
// =============================================================================

/// Tag clusters plus the tags that belong to none of them.
///
/// Every tag handed to a grouping operation ends up in exactly one group or
/// in `orphans`, never both and never twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagGroups {
    pub groups: Vec<Vec<TagId>>,
    pub orphans: Vec<TagId>,
}

impl TagGroups {
    /// Number of tags placed in some group.
    pub fn grouped_count(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    /// Every tag, grouped ones first.
    pub fn all_tags(&self) -> impl Iterator<Item = TagId> + '_ {
        self.groups
            .iter()
            .flatten()
            .chain(self.orphans.iter())
            .copied()
    }
}

/// Draws Poisson batch sizes against a finite supply.
///
/// Stops early once the supply runs out: the batch that would overrun takes
/// everything left. A zero draw while supply remains is kept as a zero-sized
/// batch; callers decide what an empty batch means. A non-positive mean
/// yields only zero draws.
fn draw_batch_sizes<R: Rng + ?Sized>(
    rng: &mut R,
    mean: f64,
    max_batches: usize,
    supply: usize,
) -> Vec<usize> {
    let poisson = Poisson::new(mean).ok();
    let mut sizes = Vec::with_capacity(max_batches);
    let mut taken = 0;

    for _ in 0..max_batches {
        let drawn: f64 = match &poisson {
            Some(poisson) => poisson.sample(rng),
            None => 0.0,
        };
        let n = drawn as usize;

        if taken + n >= supply {
            let rest = supply - taken;
            if rest > 0 {
                sizes.push(rest);
            }
            break;
        }

        sizes.push(n);
        taken += n;
    }

    sizes
}

// =============================================================================
// RELEVANCE GRAPH
// =============================================================================

/// The shared weighted graph over sheep, tags and items.
#[derive(Debug, Clone)]
pub struct RelevanceGraph {
    pub(crate) graph: UnGraph<GraphNode, f64>,
    pub(crate) index: HashMap<NodeRef, NodeIndex>,
    config: GraphConfig,
}

impl Default for RelevanceGraph {
    fn default() -> Self {
        Self::new(GraphConfig::default())
    }
}

impl RelevanceGraph {
    /// Creates an empty graph without checking `config`.
    ///
    /// # Panics
    ///
    /// The grouping and attachment operations panic if `config` fails
    /// [`GraphConfig::validate`]: a cross-link probability outside `[0, 1]`
    /// or NaN weight bounds cannot be sampled. Use [`RelevanceGraph::try_new`]
    /// for untrusted configuration.
    pub fn new(config: GraphConfig) -> Self {
        Self {
            graph: UnGraph::default(),
            index: HashMap::new(),
            config,
        }
    }

    /// Creates an empty graph, rejecting a configuration that fails
    /// [`GraphConfig::validate`].
    pub fn try_new(config: GraphConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Inserts nodes of the key's kind. Already-present IDs are skipped.
    ///
    /// Returns how many nodes were actually inserted.
    pub fn add_nodes<K: GraphKey>(&mut self, ids: impl IntoIterator<Item = K>) -> usize {
        let before = self.graph.node_count();
        for id in ids {
            self.ensure_node(id.node_ref());
        }
        self.graph.node_count() - before
    }

    pub fn add_sheep(&mut self, sheep: impl IntoIterator<Item = SheepId>) -> usize {
        self.add_nodes(sheep)
    }

    pub fn add_tags(&mut self, tags: impl IntoIterator<Item = TagId>) -> usize {
        self.add_nodes(tags)
    }

    pub fn add_items(&mut self, items: impl IntoIterator<Item = ItemId>) -> usize {
        self.add_nodes(items)
    }

    fn ensure_node(&mut self, node: NodeRef) -> NodeIndex {
        if let Some(idx) = self.index.get(&node) {
            return *idx;
        }
        let idx = self.graph.add_node(GraphNode {
            node,
            color: node.kind().color(),
        });
        self.index.insert(node, idx);
        idx
    }

    /// Adds an edge unless it would be a self-loop or already exists.
    ///
    /// Returns true if an edge was added. Existing weights are left alone.
    pub(crate) fn insert_edge(&mut self, a: NodeRef, b: NodeRef, weight: f64) -> bool {
        if a == b || !(weight > 0.0) {
            return false;
        }
        let ia = self.ensure_node(a);
        let ib = self.ensure_node(b);
        if self.graph.find_edge(ia, ib).is_some() {
            return false;
        }
        self.graph.add_edge(ia, ib, weight);
        true
    }

    fn link_tags<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        a: TagId,
        b: TagId,
        weights: Bounds<f64>,
    ) -> bool {
        let weight = weights.sample(rng);
        self.insert_edge(NodeRef::Tag(a), NodeRef::Tag(b), weight)
    }

    /// Forms up to `max_groups` tag groups from the provided tags.
    ///
    /// Tags are shuffled, then consumed in Poisson-sized runs (mean
    /// `average_group_size`). Whatever is left over becomes orphans. Every
    /// pair inside a group gets a strong edge; each cross-group pair gets a
    /// weak edge with probability `cross_link_probability`.
    pub fn form_tag_groups<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        max_groups: usize,
        tags: impl IntoIterator<Item = TagId>,
    ) -> TagGroups {
        let mut tags: Vec<TagId> = tags.into_iter().collect();
        self.add_tags(tags.iter().copied());
        tags.shuffle(rng);

        let mean = self.config.average_group_size as f64;
        let mut groups: Vec<Vec<TagId>> = Vec::with_capacity(max_groups);
        let mut taken = 0;
        for n in draw_batch_sizes(rng, mean, max_groups, tags.len()) {
            if n == 0 {
                continue;
            }
            groups.push(tags[taken..taken + n].to_vec());
            taken += n;
        }
        let orphans = tags[taken..].to_vec();

        let strong = self.config.strong_weights;
        let weak = self.config.weak_weights;
        let p_cross = self.config.cross_link_probability;

        for group in &groups {
            for i in 0..group.len() {
                for j in (i + 1)..group.len() {
                    self.link_tags(rng, group[i], group[j], strong);
                }
            }
        }

        for a in 0..groups.len() {
            for b in (a + 1)..groups.len() {
                for &x in &groups[a] {
                    for &y in &groups[b] {
                        if rng.gen_bool(p_cross) {
                            self.link_tags(rng, x, y, weak);
                        }
                    }
                }
            }
        }

        TagGroups { groups, orphans }
    }

    /// Distributes new tags across existing groups.
    ///
    /// One Poisson-sized batch per existing group, with mean
    /// `new_tags / (groups + 1)` so that on average some tags are left to
    /// orphan. New members get strong edges to each other and to every
    /// pre-existing member of their group. Every cross-group pair involving
    /// at least one new member gets a weak edge with the cross-link
    /// probability.
    ///
    /// Returns the extended groups and the newly orphaned tags only.
    pub fn extend_tag_groups<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        mut groups: Vec<Vec<TagId>>,
        new_tags: impl IntoIterator<Item = TagId>,
    ) -> TagGroups {
        let mut tags: Vec<TagId> = new_tags.into_iter().collect();
        if tags.is_empty() {
            return TagGroups {
                groups,
                orphans: Vec::new(),
            };
        }
        self.add_tags(tags.iter().copied());
        tags.shuffle(rng);

        let mean = tags.len() as f64 / (groups.len() + 1) as f64;
        let mut batches: Vec<Vec<TagId>> = Vec::with_capacity(groups.len());
        let mut taken = 0;
        for n in draw_batch_sizes(rng, mean, groups.len(), tags.len()) {
            batches.push(tags[taken..taken + n].to_vec());
            taken += n;
        }
        let orphans = tags[taken..].to_vec();

        let strong = self.config.strong_weights;
        let weak = self.config.weak_weights;
        let p_cross = self.config.cross_link_probability;

        for (i, batch) in batches.iter().enumerate() {
            for a in 0..batch.len() {
                for b in (a + 1)..batch.len() {
                    self.link_tags(rng, batch[a], batch[b], strong);
                }
            }
            for &member in batch {
                for &existing in &groups[i] {
                    self.link_tags(rng, member, existing, strong);
                }
            }
        }

        for i in 0..batches.len() {
            for j in 0..groups.len() {
                if i == j {
                    continue;
                }
                // New members of i against old members of j
                for &x in &batches[i] {
                    for &y in &groups[j] {
                        if rng.gen_bool(p_cross) {
                            self.link_tags(rng, x, y, weak);
                        }
                    }
                }
                // New against new, once per unordered pair of groups
                if i < j && j < batches.len() {
                    for &x in &batches[i] {
                        for &y in &batches[j] {
                            if rng.gen_bool(p_cross) {
                                self.link_tags(rng, x, y, weak);
                            }
                        }
                    }
                }
            }
        }

        for (group, batch) in groups.iter_mut().zip(batches) {
            group.extend(batch);
        }

        TagGroups { groups, orphans }
    }

    /// Attaches sheep or items to the tag substrate.
    ///
    /// Each source draws an edge count from `edge_count_bounds`, clamped to
    /// the number of targets, and links to that many distinct targets
    /// sampled without replacement. Weights come from `extremity_weights`.
    ///
    /// Returns each source with the tags it was attached to, in sampled order.
    pub fn connect_extremities<K, R>(
        &mut self,
        rng: &mut R,
        sources: impl IntoIterator<Item = K>,
        targets: &[TagId],
        edge_count_bounds: Bounds<usize>,
    ) -> Vec<(K, Vec<TagId>)>
    where
        K: Extremity,
        R: Rng + ?Sized,
    {
        let weights = self.config.extremity_weights;
        let mut attachments = Vec::new();

        for source in sources {
            self.ensure_node(source.node_ref());
            let n_edges = edge_count_bounds.sample(rng).min(targets.len());
            let picks = index::sample(rng, targets.len(), n_edges);

            let mut attached = Vec::with_capacity(n_edges);
            for i in picks.iter() {
                let tag = targets[i];
                let weight = weights.sample(rng);
                if self.insert_edge(source.node_ref(), NodeRef::Tag(tag), weight) {
                    attached.push(tag);
                }
            }
            attachments.push((source, attached));
        }

        attachments
    }

    // =========================================================================
    // READ-ONLY QUERIES
    // =========================================================================

    /// Returns true if the node exists.
    pub fn contains<K: GraphKey>(&self, id: K) -> bool {
        self.index.contains_key(&id.node_ref())
    }

    /// Kind of the node, if present.
    pub fn kind(&self, node: NodeRef) -> Option<NodeKind> {
        self.index.get(&node).map(|idx| self.graph[*idx].node.kind())
    }

    /// Tags directly adjacent to a node.
    ///
    /// For sheep and items these are exactly the tags they were attached to.
    pub fn associated_tags<K: GraphKey>(&self, id: K) -> Vec<TagId> {
        let Some(idx) = self.index.get(&id.node_ref()) else {
            return Vec::new();
        };
        self.graph
            .neighbors(*idx)
            .filter_map(|n| match self.graph[n].node {
                NodeRef::Tag(tag) => Some(tag),
                _ => None,
            })
            .collect()
    }

    /// Weight of the edge between two nodes, if any.
    pub fn edge_weight(&self, a: NodeRef, b: NodeRef) -> Option<f64> {
        let ia = self.index.get(&a)?;
        let ib = self.index.get(&b)?;
        let edge = self.graph.find_edge(*ia, *ib)?;
        self.graph.edge_weight(edge).copied()
    }

    /// Iterates over every edge as `(a, b, weight)`.
    pub fn edges(&self) -> impl Iterator<Item = (NodeRef, NodeRef, f64)> + '_ {
        self.graph.edge_indices().filter_map(move |e| {
            let (a, b) = self.graph.edge_endpoints(e)?;
            Some((self.graph[a].node, self.graph[b].node, self.graph[e]))
        })
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Fraction of possible undirected edges that exist.
    pub fn density(&self) -> f64 {
        let n = self.graph.node_count() as f64;
        if n < 2.0 {
            return 0.0;
        }
        (2.0 * self.graph.edge_count() as f64) / (n * (n - 1.0))
    }
}
