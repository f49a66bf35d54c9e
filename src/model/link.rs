//! Typed, directed dependency links between file nodes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::{parse_other, DependencyStatement, FileNode};
use crate::error::{GraphError, GraphResult, ParseValueError};

/// Classification of a dependency relationship.
///
/// Ordering follows declaration order, which is also the order used when
/// several typed links connect the same pair of nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DependencyType {
    /// Dependency on another file of the modeled codebase.
    IntrinsicImport,
    /// Dependency on something outside the modeled codebase.
    ExtrinsicImport,
    /// Dependency that needs no statement, e.g. same-package access in Java.
    ImplicitImport,
    /// Class inheritance.
    Inheritance,
    /// Object composition.
    Composition,
    /// Interface implementation.
    InterfaceImplementation,
    /// User-defined classification.
    Other(String),
}

impl DependencyType {
    /// The built-in classifications, in declaration order.
    pub const BUILTIN: [DependencyType; 6] = [
        DependencyType::IntrinsicImport,
        DependencyType::ExtrinsicImport,
        DependencyType::ImplicitImport,
        DependencyType::Inheritance,
        DependencyType::Composition,
        DependencyType::InterfaceImplementation,
    ];

    /// Classifies an import from `source` to `target`.
    ///
    /// An unresolved target (`None`) is extrinsic. A resolved target sharing
    /// the exact same container as the source is implicit; nested
    /// sub-containers are different containers. Everything else is
    /// intrinsic.
    ///
    /// # Example
    ///
    /// ```rust
    /// use codegraph::model::{DependencyType, FileNode};
    ///
    /// let a = FileNode::java("src/a/A.java", "A.java", Some("com.a"));
    /// let b = FileNode::java("src/a/B.java", "B.java", Some("com.a"));
    /// let c = FileNode::java("src/a/b/C.java", "C.java", Some("com.a.b"));
    ///
    /// assert_eq!(DependencyType::classify(&a, Some(&b)), DependencyType::ImplicitImport);
    /// assert_eq!(DependencyType::classify(&a, Some(&c)), DependencyType::IntrinsicImport);
    /// assert_eq!(DependencyType::classify(&a, None), DependencyType::ExtrinsicImport);
    /// ```
    pub fn classify(source: &FileNode, target: Option<&FileNode>) -> Self {
        match target {
            None => DependencyType::ExtrinsicImport,
            Some(target) => match (source.container_name(), target.container_name()) {
                (Some(a), Some(b)) if a == b => DependencyType::ImplicitImport,
                _ => DependencyType::IntrinsicImport,
            },
        }
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DependencyType::IntrinsicImport => "intrinsic_import",
            DependencyType::ExtrinsicImport => "extrinsic_import",
            DependencyType::ImplicitImport => "implicit_import",
            DependencyType::Inheritance => "inheritance",
            DependencyType::Composition => "composition",
            DependencyType::InterfaceImplementation => "interface_implementation",
            DependencyType::Other(s) => return write!(f, "other:{}", s),
        };
        write!(f, "{}", s)
    }
}

impl FromStr for DependencyType {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "intrinsic_import" => Ok(DependencyType::IntrinsicImport),
            "extrinsic_import" => Ok(DependencyType::ExtrinsicImport),
            "implicit_import" => Ok(DependencyType::ImplicitImport),
            "inheritance" => Ok(DependencyType::Inheritance),
            "composition" => Ok(DependencyType::Composition),
            "interface_implementation" => Ok(DependencyType::InterfaceImplementation),
            _ => parse_other(s)
                .map(DependencyType::Other)
                .ok_or_else(|| ParseValueError::new("dependency type", s)),
        }
    }
}

impl TryFrom<String> for DependencyType {
    type Error = ParseValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DependencyType> for String {
    fn from(dependency_type: DependencyType) -> Self {
        dependency_type.to_string()
    }
}

/// Identity of a link inside a graph: at most one link exists per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkKey {
    pub source: String,
    pub target: String,
    pub dependency_type: DependencyType,
}

impl LinkKey {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        dependency_type: DependencyType,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            dependency_type,
        }
    }
}

/// A typed, directed dependency from one file node to another.
///
/// Endpoints and type are fixed at construction. The statement list can
/// only grow, so a link always carries at least one statement.
///
/// # Example
///
/// ```rust
/// use codegraph::model::{DependencyLink, DependencyStatement, DependencyType};
///
/// let mut link = DependencyLink::new(
///     "java:C.java",
///     "java:A.java",
///     DependencyType::IntrinsicImport,
///     vec![DependencyStatement::import("com.example.core.User")],
/// )
/// .unwrap();
///
/// link.add_statement(DependencyStatement::import("com.example.core.UserService"));
/// assert_eq!(link.weight(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyLink {
    source_node_id: String,
    target_node_id: String,
    dependency_type: DependencyType,
    dependency_statements: Vec<DependencyStatement>,
    /// Free-form annotations carried alongside the link.
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl DependencyLink {
    /// Creates a link, failing with [`GraphError::EmptyLink`] when no
    /// statement evidences it.
    pub fn new(
        source_node_id: impl Into<String>,
        target_node_id: impl Into<String>,
        dependency_type: DependencyType,
        dependency_statements: Vec<DependencyStatement>,
    ) -> GraphResult<Self> {
        let source_node_id = source_node_id.into();
        let target_node_id = target_node_id.into();

        if dependency_statements.is_empty() {
            return Err(GraphError::EmptyLink {
                from: source_node_id,
                to: target_node_id,
            });
        }

        Ok(Self {
            source_node_id,
            target_node_id,
            dependency_type,
            dependency_statements,
            metadata: BTreeMap::new(),
        })
    }

    /// Creates a link evidenced by a single statement.
    pub fn single(
        source_node_id: impl Into<String>,
        target_node_id: impl Into<String>,
        dependency_type: DependencyType,
        statement: DependencyStatement,
    ) -> Self {
        Self {
            source_node_id: source_node_id.into(),
            target_node_id: target_node_id.into(),
            dependency_type,
            dependency_statements: vec![statement],
            metadata: BTreeMap::new(),
        }
    }

    pub fn source_node_id(&self) -> &str {
        &self.source_node_id
    }

    pub fn target_node_id(&self) -> &str {
        &self.target_node_id
    }

    pub fn dependency_type(&self) -> &DependencyType {
        &self.dependency_type
    }

    /// Statements evidencing this link, in insertion order.
    pub fn dependency_statements(&self) -> &[DependencyStatement] {
        &self.dependency_statements
    }

    /// Appends evidence to the link.
    pub fn add_statement(&mut self, statement: DependencyStatement) {
        self.dependency_statements.push(statement);
    }

    /// Appends several statements, preserving their order.
    pub fn extend_statements(&mut self, statements: impl IntoIterator<Item = DependencyStatement>) {
        self.dependency_statements.extend(statements);
    }

    /// Strength of the dependency: the number of statements behind it.
    pub fn weight(&self) -> usize {
        self.dependency_statements.len()
    }

    pub fn is_self_loop(&self) -> bool {
        self.source_node_id == self.target_node_id
    }

    pub fn key(&self) -> LinkKey {
        LinkKey::new(
            self.source_node_id.clone(),
            self.target_node_id.clone(),
            self.dependency_type.clone(),
        )
    }

    pub(crate) fn into_statements(self) -> Vec<DependencyStatement> {
        self.dependency_statements
    }
}

impl fmt::Display for DependencyLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} ({})",
            self.source_node_id, self.target_node_id, self.dependency_type
        )
    }
}
