//! codegraph - typed dependency graphs of source files
//!
//! This crate models files, the dependency statements they declare and the
//! typed links between them as a directed graph, and answers structural
//! questions about it: cycles, dependency chains, layering and metrics.
//! Graphs persist to a JSON document and can be exported as JSON, CSV or
//! Markdown reports.

pub mod analysis;
pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod graph;
pub mod logging;
pub mod model;

pub use analysis::{CycleLimits, CycleReport, DependencyPath, GraphMetrics};
pub use document::{DocumentError, GraphDocument};
pub use error::{GraphError, GraphResult, ParseValueError};
pub use graph::CodeDependencyGraph;
pub use model::{DependencyLink, DependencyStatement, DependencyType, FileNode, Language};
