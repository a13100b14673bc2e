//! Shortest paths between two nodes of the relevance graph.
//!
//! Path length is the sum of *floored* edge weights, so every edge lighter
//! than 1.0 is free. Two paths tie when their floored sums are equal, however
//! many hops each one takes. Only simple paths count, and enumeration stops
//! at a caller-supplied cap so zero-cost plateaus stay bounded.

use crate::graph::{NodeRef, RelevanceGraph};
use petgraph::algo::dijkstra;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet};

/// Floored cost of traversing a single edge.
pub fn floored(weight: f64) -> u64 {
    weight.floor() as u64
}

/// Every tied shortest path between two nodes, reduced to real weight sums.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortestPaths {
    /// Floored length shared by all the paths
    pub distance: u64,

    /// Sum of the unfloored edge weights along each path
    pub path_sums: Vec<f64>,
}

impl ShortestPaths {
    pub fn len(&self) -> usize {
        self.path_sums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path_sums.is_empty()
    }
}

/// Finds up to `max_paths` tied shortest paths from `from` to `to`.
///
/// Paths are visited fewest hops first, so a capped result keeps the most
/// direct ties. Returns `None` when either node is missing or no path exists.
pub fn shortest_paths(
    graph: &RelevanceGraph,
    from: NodeRef,
    to: NodeRef,
    max_paths: usize,
) -> Option<ShortestPaths> {
    let start = *graph.index.get(&from)?;
    let goal = *graph.index.get(&to)?;

    if start == goal {
        return Some(ShortestPaths {
            distance: 0,
            path_sums: vec![0.0],
        });
    }

    // Both maps are searched from the goal. A node lies on a shortest path
    // exactly when the floored cost so far plus its distance to the goal
    // still equals the best distance.
    let to_goal = dijkstra(&graph.graph, goal, None, |e| floored(*e.weight()));
    let hops_to_goal = dijkstra(&graph.graph, goal, None, |_| 1u32);
    let distance = *to_goal.get(&start)?;

    let mut walk = TieWalk {
        graph,
        goal,
        distance,
        to_goal: &to_goal,
        hops_to_goal: &hops_to_goal,
        max_paths,
        steps_left: max_paths.saturating_mul(graph.node_count().max(1)),
        on_path: HashSet::from([start]),
        path_sums: Vec::new(),
    };
    walk.visit(start, 0, 0.0);

    Some(ShortestPaths {
        distance,
        path_sums: walk.path_sums,
    })
}

/// Depth-first enumeration of simple paths that stay at the best distance.
struct TieWalk<'a> {
    graph: &'a RelevanceGraph,
    goal: NodeIndex,
    distance: u64,
    to_goal: &'a HashMap<NodeIndex, u64>,
    hops_to_goal: &'a HashMap<NodeIndex, u32>,
    max_paths: usize,
    steps_left: usize,
    on_path: HashSet<NodeIndex>,
    path_sums: Vec<f64>,
}

impl TieWalk<'_> {
    fn done(&self) -> bool {
        self.path_sums.len() >= self.max_paths || self.steps_left == 0
    }

    fn visit(&mut self, at: NodeIndex, cost: u64, sum: f64) {
        if at == self.goal {
            self.path_sums.push(sum);
            return;
        }

        let mut next_steps: Vec<(u32, NodeIndex, u64, f64)> = Vec::new();
        for edge in self.graph.graph.edges(at) {
            let next = if edge.source() == at {
                edge.target()
            } else {
                edge.source()
            };
            if self.on_path.contains(&next) {
                continue;
            }
            let (Some(&remaining), Some(&hops)) =
                (self.to_goal.get(&next), self.hops_to_goal.get(&next))
            else {
                continue;
            };
            let weight = *edge.weight();
            let next_cost = cost + floored(weight);
            if next_cost + remaining == self.distance {
                next_steps.push((hops, next, next_cost, sum + weight));
            }
        }
        next_steps.sort_by_key(|&(hops, next, _, _)| (hops, next));

        for (_, next, next_cost, next_sum) in next_steps {
            if self.done() {
                return;
            }
            self.steps_left -= 1;
            self.on_path.insert(next);
            self.visit(next, next_cost, next_sum);
            self.on_path.remove(&next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use shepherd_env::{ItemId, SheepId, TagId};

    fn sheep() -> NodeRef {
        NodeRef::Sheep(SheepId::from_seed(1))
    }

    fn item() -> NodeRef {
        NodeRef::Item(ItemId::from_seed(2))
    }

    fn tag(n: u64) -> NodeRef {
        NodeRef::Tag(TagId::from_seed(100 + n))
    }

    #[test]
    fn test_floored_edge_cost() {
        assert_eq!(floored(1.7), 1);
        assert_eq!(floored(0.999), 0);
        assert_eq!(floored(10.0), 10);
    }

    #[test]
    fn test_single_chain() {
        let mut graph = RelevanceGraph::default();
        graph.insert_edge(sheep(), tag(1), 1.0);
        graph.insert_edge(tag(1), tag(2), 1.0);
        graph.insert_edge(tag(2), item(), 1.0);

        let paths = shortest_paths(&graph, sheep(), item(), 64).unwrap();

        assert_eq!(paths.distance, 3);
        assert_eq!(paths.len(), 1);
        assert_relative_eq!(paths.path_sums[0], 3.0);
    }

    #[test]
    fn test_finds_every_tie() {
        let mut graph = RelevanceGraph::default();
        for t in 1..=3 {
            graph.insert_edge(sheep(), tag(t), 0.5);
            graph.insert_edge(tag(t), item(), 0.5);
        }

        let paths = shortest_paths(&graph, sheep(), item(), 64).unwrap();

        assert_eq!(paths.len(), 3);
        for sum in &paths.path_sums {
            assert_relative_eq!(*sum, 1.0);
        }
    }

    #[test]
    fn test_longer_path_with_same_floor_ties() {
        // sheep - t0 - item and sheep - t1 - t2 - item both floor to zero.
        let mut graph = RelevanceGraph::default();
        graph.insert_edge(sheep(), tag(0), 0.5);
        graph.insert_edge(tag(0), item(), 0.5);
        graph.insert_edge(sheep(), tag(1), 0.5);
        graph.insert_edge(tag(1), tag(2), 0.5);
        graph.insert_edge(tag(2), item(), 0.5);

        let paths = shortest_paths(&graph, sheep(), item(), 64).unwrap();

        assert_eq!(paths.distance, 0);
        assert_eq!(paths.len(), 2);
        // Fewest hops first
        assert_relative_eq!(paths.path_sums[0], 1.0);
        assert_relative_eq!(paths.path_sums[1], 1.5);
    }

    #[test]
    fn test_heavier_floor_is_not_a_tie() {
        let mut graph = RelevanceGraph::default();
        graph.insert_edge(sheep(), tag(0), 1.2);
        graph.insert_edge(tag(0), item(), 0.5);
        graph.insert_edge(sheep(), tag(1), 0.5);
        graph.insert_edge(tag(1), tag(2), 0.5);
        graph.insert_edge(tag(2), item(), 0.5);

        let paths = shortest_paths(&graph, sheep(), item(), 64).unwrap();

        assert_eq!(paths.distance, 0);
        assert_eq!(paths.len(), 1);
        assert_relative_eq!(paths.path_sums[0], 1.5);
    }

    #[test]
    fn test_cycles_are_not_walked() {
        // A free triangle next to the path must not produce repeat visits.
        let mut graph = RelevanceGraph::default();
        graph.insert_edge(sheep(), tag(1), 0.1);
        graph.insert_edge(tag(1), tag(2), 0.1);
        graph.insert_edge(tag(2), tag(3), 0.1);
        graph.insert_edge(tag(3), tag(1), 0.1);
        graph.insert_edge(tag(1), item(), 0.1);

        let paths = shortest_paths(&graph, sheep(), item(), 64).unwrap();

        // sheep-t1-item, sheep-t1-t2-t3-... cannot return to t1
        assert_eq!(paths.len(), 1);
        assert_relative_eq!(paths.path_sums[0], 0.2);
    }

    #[test]
    fn test_tie_enumeration_is_capped() {
        let mut graph = RelevanceGraph::default();
        for t in 1..=10 {
            graph.insert_edge(sheep(), tag(t), 0.2);
            graph.insert_edge(tag(t), item(), 0.2);
        }

        let paths = shortest_paths(&graph, sheep(), item(), 4).unwrap();

        assert_eq!(paths.len(), 4);
    }

    #[test]
    fn test_dense_plateau_stays_bounded() {
        // A free clique between sheep and item has factorially many simple
        // paths; the cap still ends the walk.
        let mut graph = RelevanceGraph::default();
        for a in 1..=12 {
            graph.insert_edge(sheep(), tag(a), 0.3);
            graph.insert_edge(tag(a), item(), 0.3);
            for b in (a + 1)..=12 {
                graph.insert_edge(tag(a), tag(b), 0.3);
            }
        }

        let paths = shortest_paths(&graph, sheep(), item(), 64).unwrap();

        assert_eq!(paths.len(), 64);
        assert!(paths.path_sums.iter().all(|sum| *sum >= 0.6 - 1e-12));
    }

    #[test]
    fn test_missing_or_disconnected() {
        let mut graph = RelevanceGraph::default();
        assert!(shortest_paths(&graph, sheep(), item(), 64).is_none());

        graph.insert_edge(sheep(), tag(1), 0.5);
        graph.insert_edge(item(), tag(2), 0.5);
        assert!(shortest_paths(&graph, sheep(), item(), 64).is_none());
    }
}
