//! Error types shared by the model and the graph container.

use crate::model::DependencyType;

/// Errors raised by graph mutations.
///
/// A mutation that returns one of these leaves the graph exactly as it was
/// before the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A node with the same unique id is already part of the graph.
    #[error("Node already exists: {0}")]
    DuplicateNode(String),

    /// No node with this unique id exists.
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// A link references an endpoint that is not a node of the graph.
    #[error("Link endpoint not found: {0}")]
    UnknownEndpoint(String),

    /// A link with the same (source, target, type) key already exists.
    #[error("Link already exists: {from} -> {to} ({dependency_type})")]
    DuplicateLink {
        from: String,
        to: String,
        dependency_type: DependencyType,
    },

    /// No link with this (source, target, type) key exists.
    #[error("Link not found: {from} -> {to} ({dependency_type})")]
    LinkNotFound {
        from: String,
        to: String,
        dependency_type: DependencyType,
    },

    /// A link must be evidenced by at least one dependency statement.
    #[error("Link {from} -> {to} carries no dependency statements")]
    EmptyLink { from: String, to: String },
}

/// Error returned when a textual enum value cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind}: '{value}'")]
pub struct ParseValueError {
    /// What was being parsed (e.g. "language").
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl ParseValueError {
    pub(crate) fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// Result type alias for graph mutations.
pub type GraphResult<T> = Result<T, GraphError>;
