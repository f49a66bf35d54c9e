//! Graph-wide structural metrics.

use petgraph::unionfind::UnionFind;
use petgraph::Direction;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use crate::graph::CodeDependencyGraph;

/// Link counts at one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NodeDegree {
    /// Links pointing at the file (its dependents).
    pub in_degree: usize,
    /// Links leaving the file (its dependencies).
    pub out_degree: usize,
}

impl NodeDegree {
    pub fn total(&self) -> usize {
        self.in_degree + self.out_degree
    }
}

/// Summary statistics for a [`CodeDependencyGraph`].
///
/// Everything is derived from graph content alone, so two equal graphs
/// always produce equal metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphMetrics {
    pub node_count: usize,
    pub edge_count: usize,
    /// `edges / (nodes * (nodes - 1))`, 0 for fewer than two nodes.
    pub density: f64,
    pub is_dag: bool,
    /// Number of strongly connected components with two or more members.
    pub cycle_count: usize,
    /// Members of those components, sorted.
    pub cycle_members: Vec<Vec<String>>,
    pub self_loop_count: usize,
    pub strongly_connected_components: usize,
    pub weakly_connected_components: usize,
    pub degrees: BTreeMap<String, NodeDegree>,
    pub edges_by_type: BTreeMap<String, usize>,
    pub nodes_by_container: BTreeMap<String, usize>,
    /// Files without a container.
    pub uncontained_nodes: usize,
    pub nodes_by_language: BTreeMap<String, usize>,
}

impl GraphMetrics {
    /// The `limit` files with the most dependents, ties broken by id.
    pub fn most_depended_upon(&self, limit: usize) -> Vec<(&str, NodeDegree)> {
        let mut ranked: Vec<(&str, NodeDegree)> = self
            .degrees
            .iter()
            .filter(|(_, degree)| degree.in_degree > 0)
            .map(|(id, degree)| (id.as_str(), *degree))
            .collect();
        ranked.sort_by(|a, b| b.1.in_degree.cmp(&a.1.in_degree).then(a.0.cmp(b.0)));
        ranked.truncate(limit);
        ranked
    }

    /// Files with neither dependencies nor dependents.
    pub fn isolated_nodes(&self) -> Vec<&str> {
        self.degrees
            .iter()
            .filter(|(_, degree)| degree.total() == 0)
            .map(|(id, _)| id.as_str())
            .collect()
    }
}

/// Directed graph density: the share of possible ordered pairs that are
/// linked.
///
/// ```rust
/// use codegraph::analysis::density;
///
/// assert_eq!(density(0, 0), 0.0);
/// assert_eq!(density(1, 1), 0.0);
/// assert!((density(3, 2) - 1.0 / 3.0).abs() < f64::EPSILON);
/// ```
pub fn density(nodes: usize, edges: usize) -> f64 {
    if nodes < 2 {
        return 0.0;
    }
    edges as f64 / (nodes as f64 * (nodes as f64 - 1.0))
}

impl CodeDependencyGraph {
    /// Computes structural metrics for the whole graph.
    pub fn calculate_metrics(&self) -> GraphMetrics {
        let graph = self.inner();

        let sccs = self.strongly_connected_components();
        let strongly_connected_components = sccs.len();
        let cycle_members: Vec<Vec<String>> =
            sccs.into_iter().filter(|members| members.len() > 1).collect();

        let mut degrees = BTreeMap::new();
        let mut nodes_by_container: BTreeMap<String, usize> = BTreeMap::new();
        let mut nodes_by_language: BTreeMap<String, usize> = BTreeMap::new();
        let mut uncontained_nodes = 0;

        for idx in graph.node_indices() {
            let node = &graph[idx];
            degrees.insert(
                node.unique_id().to_string(),
                NodeDegree {
                    in_degree: graph.edges_directed(idx, Direction::Incoming).count(),
                    out_degree: graph.edges_directed(idx, Direction::Outgoing).count(),
                },
            );
            match node.container_name() {
                Some(container) => {
                    *nodes_by_container.entry(container.to_string()).or_default() += 1
                }
                None => uncontained_nodes += 1,
            }
            *nodes_by_language.entry(node.language().to_string()).or_default() += 1;
        }

        let mut edges_by_type: BTreeMap<String, usize> = BTreeMap::new();
        let mut self_loop_count = 0;
        for edge in graph.edge_indices() {
            let link = &graph[edge];
            *edges_by_type.entry(link.dependency_type().to_string()).or_default() += 1;
            if link.is_self_loop() {
                self_loop_count += 1;
            }
        }

        let node_count = self.node_count();
        let edge_count = self.edge_count();
        let metrics = GraphMetrics {
            node_count,
            edge_count,
            density: density(node_count, edge_count),
            is_dag: !self.has_cycles(),
            cycle_count: cycle_members.len(),
            cycle_members,
            self_loop_count,
            strongly_connected_components,
            weakly_connected_components: self.weakly_connected_components(),
            degrees,
            edges_by_type,
            nodes_by_container,
            uncontained_nodes,
            nodes_by_language,
        };

        debug!(
            graph = %self.name(),
            nodes = metrics.node_count,
            edges = metrics.edge_count,
            cycles = metrics.cycle_count,
            "calculated metrics"
        );
        metrics
    }

    /// Number of connected components when link direction is ignored.
    pub fn weakly_connected_components(&self) -> usize {
        let graph = self.inner();
        let bound = graph
            .node_indices()
            .map(|idx| idx.index() + 1)
            .max()
            .unwrap_or(0);

        let mut sets = UnionFind::<usize>::new(bound);
        for edge in graph.edge_indices() {
            if let Some((from, to)) = graph.edge_endpoints(edge) {
                sets.union(from.index(), to.index());
            }
        }

        graph
            .node_indices()
            .map(|idx| sets.find(idx.index()))
            .collect::<HashSet<_>>()
            .len()
    }
}
