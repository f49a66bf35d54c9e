//! Graph module for code dependency modeling.
//!
//! This module provides the [`CodeDependencyGraph`] container, which holds
//! [`FileNode`](crate::model::FileNode)s as vertices and
//! [`DependencyLink`](crate::model::DependencyLink)s as edges.
//!
//! # Example
//!
//! ```rust
//! use codegraph::graph::CodeDependencyGraph;
//! use codegraph::model::{DependencyLink, DependencyStatement, DependencyType, FileNode};
//!
//! let mut graph = CodeDependencyGraph::new("demo");
//! graph.add_node(FileNode::python("app/a.py", "a.py", Some("app"))).unwrap();
//! graph.add_node(FileNode::python("app/b.py", "b.py", Some("app"))).unwrap();
//! graph
//!     .add_link(DependencyLink::single(
//!         "python:app/a.py",
//!         "python:app/b.py",
//!         DependencyType::ImplicitImport,
//!         DependencyStatement::import("app.b"),
//!     ))
//!     .unwrap();
//!
//! assert_eq!(graph.node_count(), 2);
//! assert_eq!(graph.edge_count(), 1);
//! ```

mod code_graph;

pub use code_graph::CodeDependencyGraph;
