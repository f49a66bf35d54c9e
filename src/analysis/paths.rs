//! Path and reachability queries.

use petgraph::algo::tarjan_scc;
use petgraph::stable_graph::NodeIndex;
use petgraph::Direction;
use std::collections::{BTreeSet, HashMap, VecDeque};

use crate::graph::CodeDependencyGraph;
use crate::model::DependencyLink;

/// A chain of dependencies between two files.
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyPath {
    /// Node ids from start to end, both included.
    pub nodes: Vec<String>,
    /// The link followed at each hop; one shorter than `nodes`.
    pub links: Vec<DependencyLink>,
}

impl DependencyPath {
    /// Number of hops.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// True for the one-node path from a file to itself.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Formats the path as "a -> b -> c".
    pub fn display_path(&self) -> String {
        self.nodes.join(" -> ")
    }
}

impl CodeDependencyGraph {
    /// Finds a shortest dependency chain from `from` to `to`.
    ///
    /// Neighbours are visited in id order, so among equally short chains
    /// the one with the smallest ids is returned. When several links join
    /// two consecutive files, the one with the smallest dependency type is
    /// reported. Returns `None` when either id is unknown or `to` cannot be
    /// reached.
    ///
    /// # Example
    ///
    /// ```rust
    /// use codegraph::graph::CodeDependencyGraph;
    /// use codegraph::model::{DependencyLink, DependencyStatement, DependencyType, FileNode};
    ///
    /// let mut graph = CodeDependencyGraph::new("chain");
    /// for name in ["a", "b", "c"] {
    ///     graph.add_node(FileNode::python(name, name, None)).unwrap();
    /// }
    /// for (from, to) in [("a", "b"), ("b", "c")] {
    ///     graph
    ///         .add_link(DependencyLink::single(
    ///             format!("python:{}", from),
    ///             format!("python:{}", to),
    ///             DependencyType::IntrinsicImport,
    ///             DependencyStatement::import(to),
    ///         ))
    ///         .unwrap();
    /// }
    ///
    /// let path = graph.find_dependency_path("python:a", "python:c").unwrap();
    /// assert_eq!(path.display_path(), "python:a -> python:b -> python:c");
    /// assert!(graph.find_dependency_path("python:c", "python:a").is_none());
    /// ```
    pub fn find_dependency_path(&self, from: &str, to: &str) -> Option<DependencyPath> {
        let start = self.index_of(from)?;
        let goal = self.index_of(to)?;

        let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut queue = VecDeque::from([start]);
        let mut found = start == goal;

        while let Some(current) = queue.pop_front() {
            if found {
                break;
            }
            for next in self.sorted_neighbors(current, Direction::Outgoing) {
                if next == start || parent.contains_key(&next) {
                    continue;
                }
                parent.insert(next, current);
                if next == goal {
                    found = true;
                    break;
                }
                queue.push_back(next);
            }
        }

        if !found {
            return None;
        }

        let mut chain = vec![goal];
        let mut cursor = goal;
        while let Some(&prev) = parent.get(&cursor) {
            chain.push(prev);
            cursor = prev;
        }
        chain.reverse();

        let graph = self.inner();
        let nodes: Vec<String> = chain
            .iter()
            .map(|&idx| graph[idx].unique_id().to_string())
            .collect();
        let links = nodes
            .windows(2)
            .filter_map(|pair| self.links_between(&pair[0], &pair[1]).first().copied())
            .cloned()
            .collect();

        Some(DependencyPath { nodes, links })
    }

    /// Every file `id` depends on, directly or transitively.
    ///
    /// The start node is excluded even when it lies on a cycle.
    pub fn descendants(&self, id: &str) -> BTreeSet<String> {
        self.reachable(id, Direction::Outgoing)
    }

    /// Every file that depends on `id`, directly or transitively.
    pub fn ancestors(&self, id: &str) -> BTreeSet<String> {
        self.reachable(id, Direction::Incoming)
    }

    /// Node ids ordered so that every file comes after the files it
    /// depends on. Ties are broken by id. Returns `None` when the graph has
    /// a cycle or self-loop.
    pub fn topological_order(&self) -> Option<Vec<String>> {
        let graph = self.inner();
        let mut pending: HashMap<NodeIndex, usize> = graph
            .node_indices()
            .map(|idx| (idx, self.sorted_neighbors(idx, Direction::Outgoing).len()))
            .collect();

        let mut ready: BTreeSet<(&str, NodeIndex)> = pending
            .iter()
            .filter(|&(_, &count)| count == 0)
            .map(|(&idx, _)| (graph[idx].unique_id(), idx))
            .collect();

        let mut order = Vec::with_capacity(graph.node_count());
        while let Some((id, idx)) = ready.pop_first() {
            order.push(id.to_string());
            for dependent in self.sorted_neighbors(idx, Direction::Incoming) {
                if dependent == idx {
                    continue;
                }
                if let Some(count) = pending.get_mut(&dependent) {
                    *count -= 1;
                    if *count == 0 {
                        ready.insert((graph[dependent].unique_id(), dependent));
                    }
                }
            }
        }

        (order.len() == graph.node_count()).then_some(order)
    }

    /// Groups files into dependency layers.
    ///
    /// Layer 0 holds files whose dependencies all lie outside the graph;
    /// every other file sits one layer above its deepest dependency. Files
    /// on a common cycle share a layer. Ids within a layer are sorted.
    pub fn dependency_layers(&self) -> Vec<Vec<String>> {
        let graph = self.inner();
        // tarjan_scc yields components in postorder: dependencies first
        let components = tarjan_scc(graph);

        let mut component_of: HashMap<NodeIndex, usize> = HashMap::new();
        for (i, members) in components.iter().enumerate() {
            for &idx in members {
                component_of.insert(idx, i);
            }
        }

        let mut level = vec![0usize; components.len()];
        for (i, members) in components.iter().enumerate() {
            let deepest = members
                .iter()
                .flat_map(|&idx| graph.neighbors_directed(idx, Direction::Outgoing))
                .filter_map(|next| component_of.get(&next).copied())
                .filter(|&j| j != i)
                .map(|j| level[j] + 1)
                .max()
                .unwrap_or(0);
            level[i] = deepest;
        }

        let depth = level.iter().copied().max().map_or(0, |max| max + 1);
        let mut layers: Vec<Vec<String>> = vec![Vec::new(); depth];
        for (i, members) in components.iter().enumerate() {
            layers[level[i]].extend(members.iter().map(|&idx| graph[idx].unique_id().to_string()));
        }
        for layer in &mut layers {
            layer.sort();
        }
        layers
    }

    fn reachable(&self, id: &str, direction: Direction) -> BTreeSet<String> {
        let Some(start) = self.index_of(id) else {
            return BTreeSet::new();
        };

        let graph = self.inner();
        let mut seen: BTreeSet<NodeIndex> = BTreeSet::from([start]);
        let mut queue = VecDeque::from([start]);
        let mut found = BTreeSet::new();

        while let Some(current) = queue.pop_front() {
            for next in graph.neighbors_directed(current, direction) {
                if seen.insert(next) {
                    found.insert(graph[next].unique_id().to_string());
                    queue.push_back(next);
                }
            }
        }
        found
    }
}
