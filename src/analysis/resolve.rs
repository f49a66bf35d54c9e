//! Derives typed links from the dependency statements declared on nodes.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

use crate::graph::CodeDependencyGraph;
use crate::model::{DependencyLink, DependencyStatement, DependencyType, FileNode, LinkKey};

/// Lookup tables from import targets to the files that satisfy them.
struct TargetIndex<'g> {
    by_name: HashMap<String, BTreeSet<&'g str>>,
    by_container: HashMap<&'g str, BTreeSet<&'g str>>,
}

impl<'g> TargetIndex<'g> {
    fn build(nodes: &[&'g FileNode]) -> Self {
        let mut by_name: HashMap<String, BTreeSet<&'g str>> = HashMap::new();
        let mut by_container: HashMap<&'g str, BTreeSet<&'g str>> = HashMap::new();

        for &node in nodes {
            let id = node.unique_id();
            by_name.entry(node.module_path()).or_default().insert(id);
            for class in node.classes() {
                let qualified = match node.container_name() {
                    Some(container) => format!("{}.{}", container, class.name),
                    None => class.name.clone(),
                };
                by_name.entry(qualified).or_default().insert(id);
            }
            if let Some(container) = node.container_name() {
                by_container.entry(container).or_default().insert(id);
            }
        }

        Self {
            by_name,
            by_container,
        }
    }

    fn lookup(&self, statement: &DependencyStatement) -> BTreeSet<&'g str> {
        let mut found = self
            .by_name
            .get(&statement.raw_target)
            .cloned()
            .unwrap_or_default();
        if statement.is_wildcard || statement.raw_target.ends_with(".*") {
            if let Some(members) = self.by_container.get(statement.target_prefix()) {
                found.extend(members.iter().copied());
            }
        }
        found
    }
}

impl CodeDependencyGraph {
    /// Files that a statement refers to.
    ///
    /// A target matches a declared class (`container.ClassName`), a file's
    /// module path (`container.file` without extension) or, for wildcard
    /// statements, every file of the named container.
    pub fn resolve_target(&self, statement: &DependencyStatement) -> Vec<&FileNode> {
        let nodes = self.nodes();
        let index = TargetIndex::build(&nodes);
        index
            .lookup(statement)
            .into_iter()
            .filter_map(|id| self.node(id))
            .collect()
    }

    /// Derives candidate links from the statements declared on every node.
    ///
    /// Each resolved statement becomes evidence for a link classified with
    /// [`DependencyType::classify`]; statements sharing a
    /// `(source, target, type)` key are grouped into one link, in
    /// declaration order. Unresolved statements and self references yield
    /// no link. The graph itself is left untouched; feed the result to
    /// [`merge_link`](Self::merge_link) to apply it.
    ///
    /// # Example
    ///
    /// ```rust
    /// use codegraph::graph::CodeDependencyGraph;
    /// use codegraph::model::{DependencyStatement, DependencyType, FileNode, Visibility};
    ///
    /// let mut service = FileNode::java("src/Service.java", "Service.java", Some("com.app"));
    /// service.add_dependency(DependencyStatement::import("com.app.Repository"));
    /// service.add_dependency(DependencyStatement::import("java.util.List"));
    /// let mut repository =
    ///     FileNode::java("src/Repository.java", "Repository.java", Some("com.app"));
    /// repository.add_class("Repository", Visibility::Public);
    ///
    /// let mut graph = CodeDependencyGraph::new("app");
    /// graph.add_node(service).unwrap();
    /// graph.add_node(repository).unwrap();
    ///
    /// let links = graph.resolve_links();
    /// assert_eq!(links.len(), 1);
    /// assert_eq!(links[0].dependency_type(), &DependencyType::ImplicitImport);
    /// ```
    pub fn resolve_links(&self) -> Vec<DependencyLink> {
        let nodes = self.nodes();
        let index = TargetIndex::build(&nodes);

        let mut grouped: BTreeMap<LinkKey, DependencyLink> = BTreeMap::new();
        let mut unresolved = 0usize;

        for source in &nodes {
            for statement in source.dependency_statements() {
                let targets = index.lookup(statement);
                if targets.is_empty() {
                    unresolved += 1;
                    continue;
                }
                for target_id in targets {
                    if target_id == source.unique_id() {
                        continue;
                    }
                    let target = self.node(target_id);
                    let key = LinkKey::new(
                        source.unique_id(),
                        target_id,
                        DependencyType::classify(source, target),
                    );
                    match grouped.entry(key) {
                        Entry::Occupied(mut entry) => {
                            entry.get_mut().add_statement(statement.clone())
                        }
                        Entry::Vacant(entry) => {
                            let key = entry.key().clone();
                            entry.insert(DependencyLink::single(
                                key.source,
                                key.target,
                                key.dependency_type,
                                statement.clone(),
                            ));
                        }
                    }
                }
            }
        }

        debug!(
            graph = %self.name(),
            links = grouped.len(),
            unresolved,
            "resolved dependency statements"
        );

        grouped.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Visibility;

    fn java(path: &str, package: &str) -> FileNode {
        let name = path.rsplit('/').next().unwrap_or(path);
        FileNode::java(path, name, Some(package))
    }

    fn sample_graph() -> CodeDependencyGraph {
        let mut controller = java("web/UserController.java", "com.app.web");
        controller.add_class("UserController", Visibility::Public);
        for (target, line) in [
            ("com.app.core.UserService", 3),
            ("com.app.web.Routes", 4),
            ("org.slf4j.Logger", 5),
            ("com.app.core.UserService", 9),
        ] {
            controller.add_dependency(DependencyStatement::import(target).with_line(line));
        }

        let mut routes = java("web/Routes.java", "com.app.web");
        routes.add_class("Routes", Visibility::Public);
        routes.add_dependency(DependencyStatement::import("com.app.web.Routes"));

        let mut service = java("core/UserService.java", "com.app.core");
        service.add_class("UserService", Visibility::Public);
        service.add_dependency(DependencyStatement::import("com.app.web.*").wildcard());

        let mut graph = CodeDependencyGraph::new("resolve");
        graph.add_node(controller).unwrap();
        graph.add_node(routes).unwrap();
        graph.add_node(service).unwrap();
        graph
    }

    #[test]
    fn test_resolve_links_classifies_by_container() {
        let graph = sample_graph();
        let links = graph.resolve_links();

        let controller_links: Vec<&DependencyLink> = links
            .iter()
            .filter(|l| l.source_node_id() == "java:web/UserController.java")
            .collect();
        assert_eq!(controller_links.len(), 2);

        let to_service = controller_links
            .iter()
            .find(|l| l.target_node_id() == "java:core/UserService.java")
            .unwrap();
        assert_eq!(to_service.dependency_type(), &DependencyType::IntrinsicImport);
        assert_eq!(to_service.weight(), 2);
        assert_eq!(to_service.dependency_statements()[0].line_number, Some(3));
        assert_eq!(to_service.dependency_statements()[1].line_number, Some(9));

        let to_routes = controller_links
            .iter()
            .find(|l| l.target_node_id() == "java:web/Routes.java")
            .unwrap();
        assert_eq!(to_routes.dependency_type(), &DependencyType::ImplicitImport);
    }

    #[test]
    fn test_resolve_links_skips_self_references() {
        let links = sample_graph().resolve_links();
        assert!(links.iter().all(|l| !l.is_self_loop()));
        assert!(!links
            .iter()
            .any(|l| l.source_node_id() == "java:web/Routes.java"));
    }

    #[test]
    fn test_wildcard_resolves_every_container_member() {
        let links = sample_graph().resolve_links();
        let mut targets: Vec<&str> = links
            .iter()
            .filter(|l| l.source_node_id() == "java:core/UserService.java")
            .map(|l| l.target_node_id())
            .collect();
        targets.sort();
        assert_eq!(
            targets,
            vec!["java:web/Routes.java", "java:web/UserController.java"]
        );
    }

    #[test]
    fn test_resolve_target_by_module_path() {
        let mut graph = CodeDependencyGraph::new("py");
        graph
            .add_node(FileNode::python("app/models/user.py", "user.py", Some("app.models")))
            .unwrap();

        let found = graph.resolve_target(&DependencyStatement::new(
            "app.models.user",
            crate::model::StatementKind::From,
        ));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].unique_id(), "python:app/models/user.py");

        assert!(graph
            .resolve_target(&DependencyStatement::import("requests"))
            .is_empty());
    }

    #[test]
    fn test_resolved_links_apply_idempotently() {
        let mut graph = sample_graph();
        for link in graph.resolve_links() {
            graph.merge_link_distinct(link).unwrap();
        }
        assert_eq!(graph.edge_count(), 4);
        assert!(graph.has_cycles());
        let resolved = graph.clone();

        for link in graph.resolve_links() {
            graph.merge_link_distinct(link).unwrap();
        }
        assert_eq!(graph, resolved);
        let weights: Vec<usize> = graph.links().iter().map(|l| l.weight()).collect();
        let expected: Vec<usize> = resolved.links().iter().map(|l| l.weight()).collect();
        assert_eq!(weights, expected);
    }

    #[test]
    fn test_resolve_twice_keeps_same_package_weight() {
        let mut a = java("p/A.java", "p");
        a.add_dependency(DependencyStatement::import("p.B"));
        let mut b = java("p/B.java", "p");
        b.add_class("B", Visibility::Public);

        let mut graph = CodeDependencyGraph::new("twice");
        graph.add_node(a).unwrap();
        graph.add_node(b).unwrap();
        for _ in 0..2 {
            for link in graph.resolve_links() {
                graph.merge_link_distinct(link).unwrap();
            }
        }

        let link = graph
            .link("java:p/A.java", "java:p/B.java", &DependencyType::ImplicitImport)
            .unwrap();
        assert_eq!(link.weight(), 1);
    }
}
