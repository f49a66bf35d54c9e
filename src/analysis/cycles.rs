//! Circular dependency detection.
//!
//! Strongly connected components are found with Tarjan's algorithm. For
//! each non-trivial component a representative cycle is derived, and the
//! component's elementary cycles are enumerated up to a configurable cap.

use petgraph::algo::{is_cyclic_directed, tarjan_scc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, VecDeque};
use tracing::{debug, warn};

use crate::graph::CodeDependencyGraph;

/// Default cap on the number of elementary cycles enumerated per component.
pub const DEFAULT_MAX_CYCLES: usize = 1_000;

/// Default cap on the search steps spent enumerating one component.
pub const DEFAULT_MAX_STEPS: usize = 100_000;

/// Bounds for elementary cycle enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleLimits {
    /// Maximum number of cycles to list for one component.
    pub max_cycles: usize,
    /// Maximum number of edge explorations for one component.
    pub max_steps: usize,
}

impl Default for CycleLimits {
    fn default() -> Self {
        Self {
            max_cycles: DEFAULT_MAX_CYCLES,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl CycleLimits {
    pub fn with_max_cycles(max_cycles: usize) -> Self {
        Self {
            max_cycles,
            ..Default::default()
        }
    }
}

/// Outcome of enumerating the elementary cycles of a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CycleEnumeration {
    /// Every elementary cycle, each starting at its smallest node id, in
    /// lexicographic order.
    Complete { cycles: Vec<Vec<String>> },
    /// The component holds more cycles than the limits allow.
    CapExceeded { cap: usize, found: usize },
}

impl CycleEnumeration {
    /// The enumerated cycles, or `None` when the cap was exceeded.
    pub fn cycles(&self) -> Option<&[Vec<String>]> {
        match self {
            CycleEnumeration::Complete { cycles } => Some(cycles),
            CycleEnumeration::CapExceeded { .. } => None,
        }
    }

    pub fn is_capped(&self) -> bool {
        matches!(self, CycleEnumeration::CapExceeded { .. })
    }
}

/// Information about one group of circularly dependent files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleInfo {
    /// Members of the strongly connected component, sorted by id.
    pub nodes: Vec<String>,
    /// The lexicographically smallest elementary cycle of the component
    /// (the last node connects back to the first).
    pub representative: Vec<String>,
    /// All elementary cycles of the component, within limits.
    pub enumeration: CycleEnumeration,
}

impl CycleInfo {
    /// Returns the representative cycle as a path string.
    ///
    /// For example: "a -> b -> c -> a"
    pub fn cycle_path(&self) -> String {
        match self.representative.first() {
            Some(first) => format!("{} -> {}", self.representative.join(" -> "), first),
            None => String::new(),
        }
    }

    /// Returns the number of files in the component.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the component is empty (should not happen in practice).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Result of [`CodeDependencyGraph::detect_cycles`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// Strongly connected components with at least two members, ordered by
    /// their smallest member.
    pub components: Vec<CycleInfo>,
    /// Files that depend on themselves, sorted.
    pub self_loops: Vec<String>,
}

impl CycleReport {
    /// True when the graph has neither cyclic components nor self-loops.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty() && self.self_loops.is_empty()
    }

    /// Every file that takes part in a cycle or self-loop.
    pub fn nodes_in_cycles(&self) -> BTreeSet<String> {
        self.components
            .iter()
            .flat_map(|c| c.nodes.iter().cloned())
            .chain(self.self_loops.iter().cloned())
            .collect()
    }
}

impl CodeDependencyGraph {
    /// Checks if the graph contains any cycle, self-loops included.
    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(self.inner())
    }

    /// All strongly connected components, trivial ones included.
    ///
    /// Members are sorted by id and components by their first member.
    pub fn strongly_connected_components(&self) -> Vec<Vec<String>> {
        let graph = self.inner();
        let mut components: Vec<Vec<String>> = tarjan_scc(graph)
            .into_iter()
            .map(|scc| {
                let mut ids: Vec<String> = scc
                    .iter()
                    .map(|&idx| graph[idx].unique_id().to_string())
                    .collect();
                ids.sort();
                ids
            })
            .collect();
        components.sort();
        components
    }

    /// Detects circular dependencies with the default enumeration limits.
    ///
    /// # Example
    ///
    /// ```rust
    /// use codegraph::graph::CodeDependencyGraph;
    /// use codegraph::model::{DependencyLink, DependencyStatement, DependencyType, FileNode};
    ///
    /// let mut graph = CodeDependencyGraph::new("cyclic");
    /// for name in ["a", "b", "c"] {
    ///     let file = format!("{}.py", name);
    ///     graph.add_node(FileNode::python(file.clone(), file, None)).unwrap();
    /// }
    /// for (from, to) in [("a", "b"), ("b", "c"), ("c", "a")] {
    ///     graph
    ///         .add_link(DependencyLink::single(
    ///             format!("python:{}.py", from),
    ///             format!("python:{}.py", to),
    ///             DependencyType::IntrinsicImport,
    ///             DependencyStatement::import(to),
    ///         ))
    ///         .unwrap();
    /// }
    ///
    /// let report = graph.detect_cycles();
    /// assert_eq!(report.components.len(), 1);
    /// assert_eq!(
    ///     report.components[0].cycle_path(),
    ///     "python:a.py -> python:b.py -> python:c.py -> python:a.py"
    /// );
    /// ```
    pub fn detect_cycles(&self) -> CycleReport {
        self.detect_cycles_with(CycleLimits::default())
    }

    /// Detects circular dependencies, enumerating at most `limits` cycles
    /// per component.
    pub fn detect_cycles_with(&self, limits: CycleLimits) -> CycleReport {
        let mut components: Vec<CycleInfo> = self
            .strongly_connected_components()
            .into_iter()
            .filter(|members| members.len() > 1)
            .map(|members| self.describe_component(members, limits))
            .collect();
        components.sort_by(|a, b| a.nodes.cmp(&b.nodes));

        let self_loops: Vec<String> = self
            .links()
            .into_iter()
            .filter(|link| link.is_self_loop())
            .map(|link| link.source_node_id().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        debug!(
            components = components.len(),
            self_loops = self_loops.len(),
            "cycle detection finished"
        );

        CycleReport {
            components,
            self_loops,
        }
    }

    /// Returns the ids of files that are part of any cycle.
    ///
    /// Useful for marking nodes in reports that participate in circular
    /// dependencies.
    pub fn nodes_in_cycles(&self) -> BTreeSet<String> {
        let mut nodes: BTreeSet<String> = self
            .strongly_connected_components()
            .into_iter()
            .filter(|members| members.len() > 1)
            .flatten()
            .collect();
        nodes.extend(
            self.links()
                .into_iter()
                .filter(|link| link.is_self_loop())
                .map(|link| link.source_node_id().to_string()),
        );
        nodes
    }

    fn describe_component(&self, members: Vec<String>, limits: CycleLimits) -> CycleInfo {
        let adjacency = self.component_adjacency(&members);
        let to_ids = |cycle: Vec<usize>| -> Vec<String> {
            cycle.into_iter().map(|i| members[i].clone()).collect()
        };

        let representative = to_ids(smallest_cycle(&adjacency));
        let enumeration = match enumerate_cycles(&adjacency, limits) {
            Ok(cycles) => CycleEnumeration::Complete {
                cycles: cycles.into_iter().map(to_ids).collect(),
            },
            Err(found) => {
                warn!(
                    component_size = members.len(),
                    cap = limits.max_cycles,
                    found,
                    "cycle count exceeds cap, enumeration stopped"
                );
                CycleEnumeration::CapExceeded {
                    cap: limits.max_cycles,
                    found,
                }
            }
        };

        CycleInfo {
            nodes: members,
            representative,
            enumeration,
        }
    }

    /// Adjacency of the subgraph induced by `members` (sorted ids), using
    /// positions in `members` as local indices. Self-loops are dropped.
    fn component_adjacency(&self, members: &[String]) -> Vec<Vec<usize>> {
        let local: HashMap<&str, usize> = members
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();

        members
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let mut next: Vec<usize> = self
                    .dependencies(id)
                    .into_iter()
                    .filter_map(|node| local.get(node.unique_id()).copied())
                    .filter(|&j| j != i)
                    .collect();
                next.sort_unstable();
                next
            })
            .collect()
    }
}

/// The lexicographically smallest elementary cycle through node 0 of a
/// strongly connected adjacency (neighbour lists sorted ascending).
///
/// Greedy: at every step take the smallest neighbour from which node 0 is
/// still reachable without revisiting the path, closing the cycle as soon
/// as node 0 is a neighbour.
fn smallest_cycle(adjacency: &[Vec<usize>]) -> Vec<usize> {
    let start = 0;
    let mut path = vec![start];
    let mut on_path = vec![false; adjacency.len()];
    on_path[start] = true;

    while let Some(&current) = path.last() {
        if path.len() > 1 && adjacency[current].contains(&start) {
            break;
        }

        let next = adjacency[current]
            .iter()
            .copied()
            .find(|&w| !on_path[w] && reaches(adjacency, w, start, &on_path));

        match next {
            Some(w) => {
                on_path[w] = true;
                path.push(w);
            }
            None => break,
        }
    }

    path
}

/// Whether `to` is reachable from `from` without passing through blocked
/// nodes (`to` itself is never blocked).
fn reaches(adjacency: &[Vec<usize>], from: usize, to: usize, blocked: &[bool]) -> bool {
    let mut seen = vec![false; adjacency.len()];
    let mut queue = VecDeque::from([from]);
    seen[from] = true;

    while let Some(v) = queue.pop_front() {
        for &w in &adjacency[v] {
            if w == to {
                return true;
            }
            if !seen[w] && !blocked[w] {
                seen[w] = true;
                queue.push_back(w);
            }
        }
    }
    false
}

/// Lists every elementary cycle, each rooted at its smallest node.
///
/// Returns `Err(found)` once more than `max_cycles` cycles exist or the
/// search exceeds `max_steps` edge explorations.
fn enumerate_cycles(
    adjacency: &[Vec<usize>],
    limits: CycleLimits,
) -> Result<Vec<Vec<usize>>, usize> {
    let n = adjacency.len();
    let mut cycles = Vec::new();
    let mut steps = 0usize;

    for start in 0..n {
        let mut path = vec![start];
        let mut on_path = vec![false; n];
        on_path[start] = true;
        // Next neighbour position to explore for each node on the path
        let mut cursor = vec![0usize];

        while let Some(pos) = cursor.last_mut() {
            let v = path[path.len() - 1];
            if *pos < adjacency[v].len() {
                let w = adjacency[v][*pos];
                *pos += 1;

                steps += 1;
                if steps > limits.max_steps {
                    return Err(cycles.len());
                }

                if w == start {
                    cycles.push(path.clone());
                    if cycles.len() > limits.max_cycles {
                        return Err(cycles.len());
                    }
                } else if w > start && !on_path[w] {
                    on_path[w] = true;
                    path.push(w);
                    cursor.push(0);
                }
            } else {
                cursor.pop();
                if let Some(done) = path.pop() {
                    on_path[done] = false;
                }
            }
        }
    }

    Ok(cycles)
}
