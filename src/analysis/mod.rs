//! Structural analysis of a [`CodeDependencyGraph`](crate::graph::CodeDependencyGraph).
//!
//! Each submodule extends the graph with read-only queries:
//!
//! - [`cycles`]: strongly connected components, representative cycles and
//!   bounded cycle enumeration
//! - [`paths`]: shortest dependency chains, reachability and layering
//! - [`metrics`]: density, degree and breakdown statistics
//! - [`resolve`]: turning declared statements into typed links
//!
//! Analyses borrow the graph immutably and never fail; "no cycle" and
//! "no path" are ordinary results.
//!
//! # Example
//!
//! ```rust
//! use codegraph::graph::CodeDependencyGraph;
//! use codegraph::model::{DependencyLink, DependencyStatement, DependencyType, FileNode};
//!
//! let mut graph = CodeDependencyGraph::new("demo");
//! graph.add_node(FileNode::python("a.py", "a.py", None)).unwrap();
//! graph.add_node(FileNode::python("b.py", "b.py", None)).unwrap();
//! graph
//!     .add_link(DependencyLink::single(
//!         "python:a.py",
//!         "python:b.py",
//!         DependencyType::IntrinsicImport,
//!         DependencyStatement::import("b"),
//!     ))
//!     .unwrap();
//!
//! let metrics = graph.calculate_metrics();
//! assert!(metrics.is_dag);
//! assert_eq!(graph.dependency_layers().len(), 2);
//! ```

pub mod cycles;
pub mod metrics;
pub mod paths;
pub mod resolve;

// Re-export main types for convenience
pub use cycles::{CycleEnumeration, CycleInfo, CycleLimits, CycleReport};
pub use metrics::{density, GraphMetrics, NodeDegree};
pub use paths::DependencyPath;
