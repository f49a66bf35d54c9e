//! Code dependency graph implementation using petgraph.
//!
//! Provides the directed graph container for file nodes and typed
//! dependency links, with mutation, neighbourhood queries and filtering.
//! Cycle, path and metrics analyses live in [`crate::analysis`].

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

use crate::error::{GraphError, GraphResult};
use crate::model::{DependencyLink, DependencyType, FileNode, Language, LinkKey};

/// A directed graph of source files and their typed dependencies.
///
/// Nodes are keyed by [`FileNode::unique_id`]. Links point from the
/// dependent file to its dependency, and at most one link exists per
/// `(source, target, dependency_type)`. Every link endpoint is a node of
/// the graph at all times.
///
/// # Example
///
/// ```rust
/// use codegraph::graph::CodeDependencyGraph;
/// use codegraph::model::{DependencyLink, DependencyStatement, DependencyType, FileNode};
///
/// let mut graph = CodeDependencyGraph::new("sample");
/// let a = FileNode::java("A.java", "A.java", Some("com.example.core"));
/// let g = FileNode::java("G.java", "G.java", Some("com.example.util"));
/// let (a_id, g_id) = (a.unique_id().to_string(), g.unique_id().to_string());
///
/// graph.add_node(a).unwrap();
/// graph.add_node(g).unwrap();
/// graph
///     .add_link(DependencyLink::single(
///         a_id.as_str(),
///         g_id.as_str(),
///         DependencyType::IntrinsicImport,
///         DependencyStatement::import("com.example.util.StringUtils"),
///     ))
///     .unwrap();
///
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.edge_count(), 1);
/// assert_eq!(graph.dependencies(&a_id)[0].unique_id(), g_id);
/// ```
#[derive(Debug, Clone)]
pub struct CodeDependencyGraph {
    name: String,
    /// Free-form annotations carried alongside the graph.
    pub metadata: BTreeMap<String, Value>,
    /// The underlying directed graph; indices stay valid across removals
    graph: StableDiGraph<FileNode, DependencyLink>,
    /// Maps node ids to their indices for O(1) lookup
    node_indices: HashMap<String, NodeIndex>,
    /// Maps link keys to edge indices, enforcing link uniqueness
    link_indices: HashMap<LinkKey, EdgeIndex>,
}

impl Default for CodeDependencyGraph {
    fn default() -> Self {
        Self::new("CodeGraph")
    }
}

impl CodeDependencyGraph {
    /// Creates a new empty graph.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metadata: BTreeMap::new(),
            graph: StableDiGraph::new(),
            node_indices: HashMap::new(),
            link_indices: HashMap::new(),
        }
    }

    /// Creates a new graph with pre-allocated capacity.
    pub fn with_capacity(name: impl Into<String>, nodes: usize, links: usize) -> Self {
        Self {
            name: name.into(),
            metadata: BTreeMap::new(),
            graph: StableDiGraph::with_capacity(nodes, links),
            node_indices: HashMap::with_capacity(nodes),
            link_indices: HashMap::with_capacity(links),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Adds a file node.
    ///
    /// # Errors
    ///
    /// [`GraphError::DuplicateNode`] if a node with the same id exists.
    pub fn add_node(&mut self, node: FileNode) -> GraphResult<()> {
        if self.node_indices.contains_key(node.unique_id()) {
            return Err(GraphError::DuplicateNode(node.unique_id().to_string()));
        }

        debug!(node = node.unique_id(), "adding node");
        self.insert_node(node);
        Ok(())
    }

    /// Removes a node together with every link it is an endpoint of.
    ///
    /// # Errors
    ///
    /// [`GraphError::NodeNotFound`] if no such node exists.
    pub fn remove_node(&mut self, id: &str) -> GraphResult<FileNode> {
        let idx = self
            .node_indices
            .get(id)
            .copied()
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))?;

        let touching: Vec<LinkKey> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .chain(self.graph.edges_directed(idx, Direction::Incoming))
            .map(|edge| edge.weight().key())
            .collect();
        for key in &touching {
            self.link_indices.remove(key);
        }

        self.node_indices.remove(id);
        let node = self
            .graph
            .remove_node(idx)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))?;

        debug!(node = id, cascaded_links = touching.len(), "removed node");
        Ok(node)
    }

    /// Adds a dependency link between two existing nodes.
    ///
    /// # Errors
    ///
    /// - [`GraphError::UnknownEndpoint`] if either endpoint is not a node.
    /// - [`GraphError::DuplicateLink`] if a link with the same source,
    ///   target and type exists. Extend that link through
    ///   [`link_mut`](Self::link_mut) or use [`merge_link`](Self::merge_link)
    ///   instead.
    pub fn add_link(&mut self, link: DependencyLink) -> GraphResult<()> {
        self.check_endpoints(&link)?;

        let key = link.key();
        if self.link_indices.contains_key(&key) {
            return Err(GraphError::DuplicateLink {
                from: key.source,
                to: key.target,
                dependency_type: key.dependency_type,
            });
        }

        debug!(%link, "adding link");
        self.insert_link(link);
        Ok(())
    }

    /// Adds a link, or appends its statements to the existing link with the
    /// same key.
    ///
    /// # Errors
    ///
    /// [`GraphError::UnknownEndpoint`] if either endpoint is not a node.
    pub fn merge_link(&mut self, link: DependencyLink) -> GraphResult<()> {
        self.check_endpoints(&link)?;

        match self.link_indices.get(&link.key()).copied() {
            Some(edge) => {
                if let Some(existing) = self.graph.edge_weight_mut(edge) {
                    debug!(%link, statements = link.weight(), "merging link evidence");
                    existing.extend_statements(link.into_statements());
                }
            }
            None => self.insert_link(link),
        }
        Ok(())
    }

    /// Like [`merge_link`](Self::merge_link), but skips statements the
    /// existing link already holds. Applying the same evidence twice leaves
    /// the graph unchanged.
    ///
    /// # Errors
    ///
    /// [`GraphError::UnknownEndpoint`] if either endpoint is not a node.
    pub fn merge_link_distinct(&mut self, link: DependencyLink) -> GraphResult<()> {
        self.check_endpoints(&link)?;

        match self.link_indices.get(&link.key()).copied() {
            Some(edge) => {
                if let Some(existing) = self.graph.edge_weight_mut(edge) {
                    let fresh: Vec<_> = link
                        .into_statements()
                        .into_iter()
                        .filter(|statement| !existing.dependency_statements().contains(statement))
                        .collect();
                    if !fresh.is_empty() {
                        debug!(link = %existing, statements = fresh.len(), "merging new evidence");
                        existing.extend_statements(fresh);
                    }
                }
            }
            None => self.insert_link(link),
        }
        Ok(())
    }

    /// Removes the link with the given key.
    ///
    /// # Errors
    ///
    /// [`GraphError::LinkNotFound`] if no such link exists.
    pub fn remove_link(
        &mut self,
        source: &str,
        target: &str,
        dependency_type: &DependencyType,
    ) -> GraphResult<DependencyLink> {
        let key = LinkKey::new(source, target, dependency_type.clone());
        let not_found = || GraphError::LinkNotFound {
            from: source.to_string(),
            to: target.to_string(),
            dependency_type: dependency_type.clone(),
        };

        let edge = self.link_indices.remove(&key).ok_or_else(not_found)?;
        let link = self.graph.remove_edge(edge).ok_or_else(not_found)?;
        debug!(%link, "removed link");
        Ok(link)
    }

    /// Gets a node by id.
    pub fn node(&self, id: &str) -> Option<&FileNode> {
        self.node_indices
            .get(id)
            .and_then(|&idx| self.graph.node_weight(idx))
    }

    /// Gets a mutable node by id. The node's id cannot change through it.
    pub fn node_mut(&mut self, id: &str) -> Option<&mut FileNode> {
        self.node_indices
            .get(id)
            .and_then(|&idx| self.graph.node_weight_mut(idx))
    }

    /// Checks if a node exists in the graph.
    pub fn contains_node(&self, id: &str) -> bool {
        self.node_indices.contains_key(id)
    }

    /// All nodes, sorted by id.
    pub fn nodes(&self) -> Vec<&FileNode> {
        let mut nodes: Vec<&FileNode> = self
            .graph
            .node_indices()
            .filter_map(|idx| self.graph.node_weight(idx))
            .collect();
        nodes.sort_by(|a, b| a.unique_id().cmp(b.unique_id()));
        nodes
    }

    /// All node ids, sorted.
    pub fn node_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.node_indices.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Gets a link by key.
    pub fn link(
        &self,
        source: &str,
        target: &str,
        dependency_type: &DependencyType,
    ) -> Option<&DependencyLink> {
        let key = LinkKey::new(source, target, dependency_type.clone());
        self.link_indices
            .get(&key)
            .and_then(|&edge| self.graph.edge_weight(edge))
    }

    /// Gets a mutable link by key, e.g. to add statements to it.
    pub fn link_mut(
        &mut self,
        source: &str,
        target: &str,
        dependency_type: &DependencyType,
    ) -> Option<&mut DependencyLink> {
        let key = LinkKey::new(source, target, dependency_type.clone());
        self.link_indices
            .get(&key)
            .and_then(|&edge| self.graph.edge_weight_mut(edge))
    }

    /// All links, sorted by (source, target, type).
    pub fn links(&self) -> Vec<&DependencyLink> {
        let mut links: Vec<&DependencyLink> = self
            .graph
            .edge_indices()
            .filter_map(|edge| self.graph.edge_weight(edge))
            .collect();
        links.sort_by_key(|link| link.key());
        links
    }

    /// All links from `source` to `target`, one per dependency type.
    pub fn links_between(&self, source: &str, target: &str) -> Vec<&DependencyLink> {
        let mut links: Vec<&DependencyLink> = self
            .outgoing_links(source)
            .into_iter()
            .filter(|link| link.target_node_id() == target)
            .collect();
        links.sort_by(|a, b| a.dependency_type().cmp(b.dependency_type()));
        links
    }

    /// Links whose source is `id`, sorted by key.
    pub fn outgoing_links(&self, id: &str) -> Vec<&DependencyLink> {
        self.links_directed(id, Direction::Outgoing)
    }

    /// Links whose target is `id`, sorted by key.
    pub fn incoming_links(&self, id: &str) -> Vec<&DependencyLink> {
        self.links_directed(id, Direction::Incoming)
    }

    /// Gets the direct dependencies of a node (targets of its outgoing
    /// links), sorted by id without duplicates.
    pub fn dependencies(&self, id: &str) -> Vec<&FileNode> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Gets the direct dependents of a node (sources of its incoming
    /// links), sorted by id without duplicates.
    pub fn dependents(&self, id: &str) -> Vec<&FileNode> {
        self.neighbors(id, Direction::Incoming)
    }

    /// Returns the number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of links in the graph. Links of different types
    /// between the same pair count separately.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Checks if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Subgraph of the nodes written in `language`, keeping only links
    /// between two such nodes.
    pub fn filter_by_language(&self, language: &Language) -> Self {
        self.filter_nodes(format!("{}_{}", self.name, language), |node| {
            &node.language() == language
        })
    }

    /// Subgraph of the nodes whose container is exactly `container_name`,
    /// keeping only links between two such nodes.
    pub fn filter_by_container(&self, container_name: &str) -> Self {
        self.filter_nodes(format!("{}_{}", self.name, container_name), |node| {
            node.container_name() == Some(container_name)
        })
    }

    /// Subgraph of the links of `dependency_type` and the nodes they touch.
    pub fn filter_by_dependency_type(&self, dependency_type: &DependencyType) -> Self {
        let links: Vec<&DependencyLink> = self
            .links()
            .into_iter()
            .filter(|link| link.dependency_type() == dependency_type)
            .collect();
        let touched: BTreeSet<&str> = links
            .iter()
            .flat_map(|link| [link.source_node_id(), link.target_node_id()])
            .collect();

        let mut filtered = Self::with_capacity(
            format!("{}_{}", self.name, dependency_type),
            touched.len(),
            links.len(),
        );
        for id in touched {
            if let Some(node) = self.node(id) {
                filtered.insert_node(node.clone());
            }
        }
        for link in links {
            filtered.insert_link(link.clone());
        }

        debug!(
            filter = %dependency_type,
            nodes = filtered.node_count(),
            links = filtered.edge_count(),
            "filtered graph by dependency type"
        );
        filtered
    }

    /// The petgraph view used by the analysis passes.
    pub(crate) fn inner(&self) -> &StableDiGraph<FileNode, DependencyLink> {
        &self.graph
    }

    pub(crate) fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.node_indices.get(id).copied()
    }

    /// Distinct neighbour indices of `idx`, ordered by node id.
    pub(crate) fn sorted_neighbors(&self, idx: NodeIndex, direction: Direction) -> Vec<NodeIndex> {
        let mut neighbors: Vec<NodeIndex> = self.graph.neighbors_directed(idx, direction).collect();
        neighbors.sort_by(|a, b| self.graph[*a].unique_id().cmp(self.graph[*b].unique_id()));
        neighbors.dedup();
        neighbors
    }

    fn filter_nodes(&self, name: String, keep: impl Fn(&FileNode) -> bool) -> Self {
        let mut filtered = Self::new(name);

        for node in self.nodes().into_iter().filter(|node| keep(*node)) {
            filtered.insert_node(node.clone());
        }
        for link in self.links() {
            if filtered.contains_node(link.source_node_id())
                && filtered.contains_node(link.target_node_id())
            {
                filtered.insert_link(link.clone());
            }
        }

        debug!(
            graph = %filtered.name,
            nodes = filtered.node_count(),
            links = filtered.edge_count(),
            "filtered graph by node"
        );
        filtered
    }

    fn check_endpoints(&self, link: &DependencyLink) -> GraphResult<()> {
        for id in [link.source_node_id(), link.target_node_id()] {
            if !self.node_indices.contains_key(id) {
                return Err(GraphError::UnknownEndpoint(id.to_string()));
            }
        }
        Ok(())
    }

    /// Inserts a node whose id is known to be new.
    fn insert_node(&mut self, node: FileNode) {
        let id = node.unique_id().to_string();
        let idx = self.graph.add_node(node);
        self.node_indices.insert(id, idx);
    }

    /// Inserts a link whose endpoints exist and whose key is known to be new.
    fn insert_link(&mut self, link: DependencyLink) {
        let (Some(&from), Some(&to)) = (
            self.node_indices.get(link.source_node_id()),
            self.node_indices.get(link.target_node_id()),
        ) else {
            return;
        };
        let key = link.key();
        let edge = self.graph.add_edge(from, to, link);
        self.link_indices.insert(key, edge);
    }

    fn links_directed(&self, id: &str, direction: Direction) -> Vec<&DependencyLink> {
        let Some(&idx) = self.node_indices.get(id) else {
            return Vec::new();
        };

        let mut links: Vec<&DependencyLink> = self
            .graph
            .edges_directed(idx, direction)
            .map(|edge| edge.weight())
            .collect();
        links.sort_by_key(|link| link.key());
        links
    }

    fn neighbors(&self, id: &str, direction: Direction) -> Vec<&FileNode> {
        let Some(&idx) = self.node_indices.get(id) else {
            return Vec::new();
        };

        self.sorted_neighbors(idx, direction)
            .into_iter()
            .filter_map(|n| self.graph.node_weight(n))
            .collect()
    }
}

/// Two graphs are equal when they have the same name, metadata, nodes and
/// links, regardless of insertion order.
impl PartialEq for CodeDependencyGraph {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.metadata == other.metadata
            && self.nodes() == other.nodes()
            && self.links() == other.links()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DependencyStatement;

    fn node(name: &str, container: &str) -> FileNode {
        FileNode::java(format!("src/{}.java", name), format!("{}.java", name), Some(container))
    }

    fn id(name: &str) -> String {
        format!("java:src/{}.java", name)
    }

    fn import(from: &str, to: &str) -> DependencyLink {
        DependencyLink::single(
            id(from),
            id(to),
            DependencyType::IntrinsicImport,
            DependencyStatement::import(format!("com.example.{}", to)),
        )
    }

    fn sample_graph() -> CodeDependencyGraph {
        let mut graph = CodeDependencyGraph::new("sample");
        for name in ["A", "B", "C"] {
            graph.add_node(node(name, "com.example")).unwrap();
        }
        graph.add_link(import("A", "B")).unwrap();
        graph.add_link(import("B", "C")).unwrap();
        graph
    }

    #[test]
    fn test_create_empty_graph() {
        let graph = CodeDependencyGraph::new("empty");
        assert_eq!(graph.name(), "empty");
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.is_empty());
    }

    #[test]
    fn test_add_node_rejects_duplicates() {
        let mut graph = CodeDependencyGraph::new("g");
        graph.add_node(node("A", "x")).unwrap();

        let err = graph.add_node(node("A", "y")).unwrap_err();
        assert_eq!(err, GraphError::DuplicateNode(id("A")));
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.node(&id("A")).unwrap().container_name(), Some("x"));
    }

    #[test]
    fn test_add_link_requires_endpoints() {
        let mut graph = CodeDependencyGraph::new("g");
        graph.add_node(node("A", "x")).unwrap();

        let err = graph.add_link(import("A", "Missing")).unwrap_err();
        assert_eq!(err, GraphError::UnknownEndpoint(id("Missing")));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_duplicate_link_rejected_but_other_type_allowed() {
        let mut graph = sample_graph();

        let err = graph.add_link(import("A", "B")).unwrap_err();
        assert!(matches!(err, GraphError::DuplicateLink { .. }));
        assert_eq!(graph.edge_count(), 2);

        graph
            .add_link(DependencyLink::single(
                id("A"),
                id("B"),
                DependencyType::Inheritance,
                DependencyStatement::import("com.example.B"),
            ))
            .unwrap();
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.links_between(&id("A"), &id("B")).len(), 2);
        // Still a single neighbour
        assert_eq!(graph.dependencies(&id("A")).len(), 1);
    }

    #[test]
    fn test_merge_link_appends_statements() {
        let mut graph = sample_graph();
        let extra = DependencyLink::single(
            id("A"),
            id("B"),
            DependencyType::IntrinsicImport,
            DependencyStatement::import("com.example.B.Inner"),
        );
        graph.merge_link(extra).unwrap();

        let link = graph
            .link(&id("A"), &id("B"), &DependencyType::IntrinsicImport)
            .unwrap();
        assert_eq!(link.weight(), 2);
        assert_eq!(link.dependency_statements()[1].raw_target, "com.example.B.Inner");
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_merge_link_distinct_skips_known_statements() {
        let mut graph = sample_graph();
        let before = graph.clone();

        graph.merge_link_distinct(import("A", "B")).unwrap();
        assert_eq!(graph, before);

        let mut mixed = import("A", "B");
        mixed.add_statement(DependencyStatement::import("com.example.B.Inner"));
        graph.merge_link_distinct(mixed.clone()).unwrap();
        graph.merge_link_distinct(mixed).unwrap();

        let link = graph
            .link(&id("A"), &id("B"), &DependencyType::IntrinsicImport)
            .unwrap();
        assert_eq!(link.weight(), 2);
        assert_eq!(link.dependency_statements()[1].raw_target, "com.example.B.Inner");

        graph.merge_link_distinct(import("C", "A")).unwrap();
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_link_mut_extends_existing_link() {
        let mut graph = sample_graph();
        graph
            .link_mut(&id("B"), &id("C"), &DependencyType::IntrinsicImport)
            .unwrap()
            .add_statement(DependencyStatement::import("com.example.C.Other"));

        let link = graph
            .link(&id("B"), &id("C"), &DependencyType::IntrinsicImport)
            .unwrap();
        assert_eq!(link.weight(), 2);
    }

    #[test]
    fn test_remove_node_cascades_links() {
        let mut graph = sample_graph();
        let removed = graph.remove_node(&id("B")).unwrap();

        assert_eq!(removed.unique_id(), id("B"));
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.dependencies(&id("A")).is_empty());
        for link in graph.links() {
            assert!(graph.contains_node(link.source_node_id()));
            assert!(graph.contains_node(link.target_node_id()));
        }

        // Keys are released: the link can be re-added once B is back
        graph.add_node(node("B", "com.example")).unwrap();
        graph.add_link(import("A", "B")).unwrap();
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_remove_node_with_self_loop() {
        let mut graph = sample_graph();
        graph.add_link(import("A", "A")).unwrap();
        graph.remove_node(&id("A")).unwrap();
        assert_eq!(graph.edge_count(), 1);
        assert!(graph
            .link(&id("A"), &id("A"), &DependencyType::IntrinsicImport)
            .is_none());
    }

    #[test]
    fn test_add_then_remove_node_restores_graph() {
        let mut graph = sample_graph();
        let before = graph.clone();

        graph.add_node(node("D", "com.example")).unwrap();
        graph.add_link(import("D", "A")).unwrap();
        graph.add_link(import("C", "D")).unwrap();
        graph.remove_node(&id("D")).unwrap();

        assert_eq!(graph, before);
    }

    #[test]
    fn test_remove_missing_node_and_link() {
        let mut graph = sample_graph();
        assert_eq!(
            graph.remove_node("java:nope").unwrap_err(),
            GraphError::NodeNotFound("java:nope".to_string())
        );

        let err = graph
            .remove_link(&id("C"), &id("A"), &DependencyType::IntrinsicImport)
            .unwrap_err();
        assert!(matches!(err, GraphError::LinkNotFound { .. }));

        let removed = graph
            .remove_link(&id("A"), &id("B"), &DependencyType::IntrinsicImport)
            .unwrap();
        assert_eq!(removed.source_node_id(), id("A"));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_get_dependencies_and_dependents() {
        let mut graph = sample_graph();
        graph.add_link(import("C", "B")).unwrap();

        let dependents: Vec<&str> = graph
            .dependents(&id("B"))
            .iter()
            .map(|n| n.unique_id())
            .collect();
        assert_eq!(dependents, vec![id("A"), id("C")]);

        assert!(graph.dependencies("java:nonexistent").is_empty());
        assert_eq!(graph.outgoing_links(&id("B")).len(), 1);
        assert_eq!(graph.incoming_links(&id("B")).len(), 2);
    }

    #[test]
    fn test_nodes_and_links_sorted() {
        let graph = sample_graph();
        assert_eq!(graph.node_ids(), vec![id("A"), id("B"), id("C")]);
        let sources: Vec<&str> = graph.links().iter().map(|l| l.source_node_id()).collect();
        assert_eq!(sources, vec![id("A"), id("B")]);
    }

    #[test]
    fn test_filter_by_language_mixed_graph() {
        let mut graph = sample_graph();
        let py = FileNode::python("app/util.py", "util.py", Some("app"));
        let py_id = py.unique_id().to_string();
        graph.add_node(py).unwrap();
        graph
            .add_link(DependencyLink::single(
                py_id.as_str(),
                id("A"),
                DependencyType::ExtrinsicImport,
                DependencyStatement::import("jpype"),
            ))
            .unwrap();

        let java = graph.filter_by_language(&Language::Java);
        assert_eq!(java.name(), "sample_java");
        assert_eq!(java.node_count(), 3);
        assert_eq!(java.edge_count(), 2);
        assert!(java.nodes().iter().all(|n| n.language() == Language::Java));

        let python = graph.filter_by_language(&Language::Python);
        assert_eq!(python.node_count(), 1);
        assert_eq!(python.edge_count(), 0);

        // Source graph untouched
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_filter_by_container() {
        let mut graph = sample_graph();
        graph.add_node(node("D", "com.example.sub")).unwrap();
        graph.add_link(import("A", "D")).unwrap();

        let filtered = graph.filter_by_container("com.example");
        assert_eq!(filtered.node_count(), 3);
        assert_eq!(filtered.edge_count(), 2);
        assert!(!filtered.contains_node(&id("D")));
    }

    #[test]
    fn test_filter_by_dependency_type_keeps_touched_nodes() {
        let mut graph = sample_graph();
        graph
            .add_link(DependencyLink::single(
                id("C"),
                id("A"),
                DependencyType::Composition,
                DependencyStatement::import("com.example.A"),
            ))
            .unwrap();

        let filtered = graph.filter_by_dependency_type(&DependencyType::Composition);
        assert_eq!(filtered.name(), "sample_composition");
        assert_eq!(filtered.node_ids(), vec![id("A"), id("C")]);
        assert_eq!(filtered.edge_count(), 1);
    }

    #[test]
    fn test_graph_equality_ignores_insertion_order() {
        let forward = sample_graph();

        let mut backward = CodeDependencyGraph::new("sample");
        for name in ["C", "B", "A"] {
            backward.add_node(node(name, "com.example")).unwrap();
        }
        backward.add_link(import("B", "C")).unwrap();
        backward.add_link(import("A", "B")).unwrap();

        assert_eq!(forward, backward);

        backward.set_name("renamed");
        assert_ne!(forward, backward);
    }
}
