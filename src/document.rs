//! JSON persistence of a [`CodeDependencyGraph`].
//!
//! The on-disk document lists nodes sorted by id and links sorted by
//! `(source, target, type)`. Loading validates the whole document before a
//! graph is produced, so a malformed file never yields a partial graph.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::graph::CodeDependencyGraph;
use crate::model::{
    ClassDecl, DependencyLink, DependencyStatement, DependencyType, FileNode, Language,
    LanguageDetails,
};

/// Errors that can occur while saving or loading a graph document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Failed to read or write the document file
    #[error("Failed to access graph document: {0}")]
    Io(#[from] io::Error),

    /// The document is not a valid graph
    #[error("Malformed graph document: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for DocumentError {
    fn from(err: serde_json::Error) -> Self {
        DocumentError::Malformed(err.to_string())
    }
}

/// Result type alias for document operations.
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Root of the persisted graph document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    pub graph_name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,
    pub nodes: Vec<NodeDocument>,
    pub links: Vec<LinkDocument>,
}

/// A persisted file node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDocument {
    pub unique_id: String,
    pub file_path: String,
    pub file_name: String,
    pub language: Language,
    pub container_name: Option<String>,
    pub classes: Vec<ClassDecl>,
    pub dependency_statements: Vec<DependencyStatement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exports: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,
    #[serde(default)]
    pub language_specific: BTreeMap<String, Value>,
}

/// A persisted dependency link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkDocument {
    pub source_node_id: String,
    pub target_node_id: String,
    pub dependency_type: DependencyType,
    pub dependency_statements: Vec<DependencyStatement>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,
}

impl From<&FileNode> for NodeDocument {
    fn from(node: &FileNode) -> Self {
        Self {
            unique_id: node.unique_id().to_string(),
            file_path: node.file_path().to_string(),
            file_name: node.file_name().to_string(),
            language: node.language(),
            container_name: node.container_name().map(str::to_string),
            classes: node.classes().to_vec(),
            dependency_statements: node.dependency_statements().to_vec(),
            exports: node.exports().to_vec(),
            metadata: node.metadata.clone(),
            language_specific: node.get_language_specific_info(),
        }
    }
}

impl From<&DependencyLink> for LinkDocument {
    fn from(link: &DependencyLink) -> Self {
        Self {
            source_node_id: link.source_node_id().to_string(),
            target_node_id: link.target_node_id().to_string(),
            dependency_type: link.dependency_type().clone(),
            dependency_statements: link.dependency_statements().to_vec(),
            metadata: link.metadata.clone(),
        }
    }
}

impl From<&CodeDependencyGraph> for GraphDocument {
    fn from(graph: &CodeDependencyGraph) -> Self {
        Self {
            graph_name: graph.name().to_string(),
            metadata: graph.metadata.clone(),
            nodes: graph.nodes().into_iter().map(NodeDocument::from).collect(),
            links: graph.links().into_iter().map(LinkDocument::from).collect(),
        }
    }
}

impl TryFrom<NodeDocument> for FileNode {
    type Error = DocumentError;

    fn try_from(doc: NodeDocument) -> DocumentResult<Self> {
        let mut class_names = HashSet::new();
        if let Some(class) = doc.classes.iter().find(|c| !class_names.insert(c.name.as_str())) {
            return Err(DocumentError::Malformed(format!(
                "class '{}' is declared twice in node '{}'",
                class.name, doc.unique_id
            )));
        }

        let details = details_from(&doc.language, &doc.file_name, doc.language_specific)?;
        let node = FileNode::from_parts(
            doc.file_path,
            doc.file_name,
            doc.container_name,
            doc.classes,
            doc.dependency_statements,
            doc.exports,
            details,
            doc.metadata,
        );

        if node.unique_id() != doc.unique_id {
            return Err(DocumentError::Malformed(format!(
                "node id '{}' does not match its language and path (expected '{}')",
                doc.unique_id,
                node.unique_id()
            )));
        }
        Ok(node)
    }
}

impl TryFrom<LinkDocument> for DependencyLink {
    type Error = DocumentError;

    fn try_from(doc: LinkDocument) -> DocumentResult<Self> {
        let mut link = DependencyLink::new(
            doc.source_node_id,
            doc.target_node_id,
            doc.dependency_type,
            doc.dependency_statements,
        )
        .map_err(|e| DocumentError::Malformed(e.to_string()))?;
        link.metadata = doc.metadata;
        Ok(link)
    }
}

impl TryFrom<GraphDocument> for CodeDependencyGraph {
    type Error = DocumentError;

    fn try_from(doc: GraphDocument) -> DocumentResult<Self> {
        let mut graph =
            CodeDependencyGraph::with_capacity(doc.graph_name, doc.nodes.len(), doc.links.len());
        graph.metadata = doc.metadata;

        for node in doc.nodes {
            graph
                .add_node(FileNode::try_from(node)?)
                .map_err(|e| DocumentError::Malformed(e.to_string()))?;
        }
        for link in doc.links {
            graph
                .add_link(DependencyLink::try_from(link)?)
                .map_err(|e| DocumentError::Malformed(e.to_string()))?;
        }
        Ok(graph)
    }
}

/// Rebuilds the language payload from its key-value view.
fn details_from(
    language: &Language,
    file_name: &str,
    info: BTreeMap<String, Value>,
) -> DocumentResult<LanguageDetails> {
    if info.is_empty() {
        return Ok(LanguageDetails::for_language(language, file_name));
    }

    let value = Value::Object(info.into_iter().collect());
    let details = match language {
        Language::Java => LanguageDetails::Java(serde_json::from_value(value)?),
        Language::Python => LanguageDetails::Python(serde_json::from_value(value)?),
        Language::CSharp => LanguageDetails::CSharp(serde_json::from_value(value)?),
        other => LanguageDetails::Generic(other.clone()),
    };
    Ok(details)
}

impl CodeDependencyGraph {
    /// Builds the persisted form of this graph.
    pub fn to_document(&self) -> GraphDocument {
        GraphDocument::from(self)
    }

    /// Builds a graph from a document, validating every node and link.
    pub fn from_document(doc: GraphDocument) -> DocumentResult<Self> {
        Self::try_from(doc)
    }

    /// Serializes the graph to a pretty-printed JSON string.
    pub fn to_json_string(&self) -> DocumentResult<String> {
        Ok(serde_json::to_string_pretty(&self.to_document())?)
    }

    /// Parses a graph from a JSON string.
    ///
    /// # Example
    ///
    /// ```rust
    /// use codegraph::graph::CodeDependencyGraph;
    /// use codegraph::model::FileNode;
    ///
    /// let mut graph = CodeDependencyGraph::new("roundtrip");
    /// graph.add_node(FileNode::python("a.py", "a.py", None)).unwrap();
    ///
    /// let json = graph.to_json_string().unwrap();
    /// let loaded = CodeDependencyGraph::from_json_str(&json).unwrap();
    /// assert_eq!(loaded, graph);
    /// ```
    pub fn from_json_str(json: &str) -> DocumentResult<Self> {
        let doc: GraphDocument = serde_json::from_str(json)?;
        Self::from_document(doc)
    }

    /// Writes the graph document to `path`.
    pub fn save_to_json(&self, path: impl AsRef<Path>) -> DocumentResult<()> {
        let path = path.as_ref();
        let json = self.to_json_string()?;
        fs::write(path, json)?;
        debug!(
            graph = %self.name(),
            path = %path.display(),
            nodes = self.node_count(),
            links = self.edge_count(),
            "saved graph document"
        );
        Ok(())
    }

    /// Reads a graph document from `path`.
    ///
    /// # Errors
    ///
    /// [`DocumentError::Io`] when the file cannot be read and
    /// [`DocumentError::Malformed`] when its content is not a valid graph.
    pub fn load_from_json(path: impl AsRef<Path>) -> DocumentResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let graph = Self::from_json_str(&content)?;
        debug!(
            graph = %graph.name(),
            path = %path.display(),
            nodes = graph.node_count(),
            links = graph.edge_count(),
            "loaded graph document"
        );
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{StatementKind, Visibility};
    use serde_json::json;

    fn sample_graph() -> CodeDependencyGraph {
        let mut user = FileNode::java("src/User.java", "User.java", Some("com.app.model"));
        user.add_class("User", Visibility::Public);
        user.add_class("UserId", Visibility::PackagePrivate);
        user.add_interface("Identifiable", Visibility::Public);
        user.add_dependency(DependencyStatement::import("java.util.UUID").with_line(3));
        user.metadata.insert("lines".into(), json!(120));

        let mut service = FileNode::python("app/service.py", "service.py", Some("app"));
        service.add_function("handle", false);
        service.add_function("_helper", true);
        service.add_variable("TIMEOUT");
        service.add_dependency(
            DependencyStatement::new("app.models", StatementKind::From)
                .with_alias("m")
                .with_line(1),
        );
        service.add_dependency(DependencyStatement::import("os"));
        service.add_dependency(DependencyStatement::import("os"));

        let mut ctl = FileNode::csharp("Web/Ctl.cs", "Ctl.cs", Some("Web"));
        ctl.add_struct("Point");
        ctl.add_class("Ctl", Visibility::Internal);

        let mut graph = CodeDependencyGraph::new("sample");
        graph.metadata.insert("ratio".into(), json!(0.1 + 0.2));
        graph.add_node(user).unwrap();
        graph.add_node(service).unwrap();
        graph.add_node(ctl).unwrap();

        let mut link = DependencyLink::new(
            "python:app/service.py",
            "java:src/User.java",
            DependencyType::Other("rpc".into()),
            vec![
                DependencyStatement::import("b").with_line(9),
                DependencyStatement::import("a").with_line(2),
            ],
        )
        .unwrap();
        link.metadata.insert("confidence".into(), json!(0.75));
        graph.add_link(link).unwrap();
        graph
            .add_link(DependencyLink::single(
                "csharp:Web/Ctl.cs",
                "csharp:Web/Ctl.cs",
                DependencyType::ImplicitImport,
                DependencyStatement::using("Web"),
            ))
            .unwrap();
        graph
    }

    fn sample_json() -> Value {
        serde_json::from_str(&sample_graph().to_json_string().unwrap()).unwrap()
    }

    fn load_value(value: Value) -> DocumentResult<CodeDependencyGraph> {
        CodeDependencyGraph::from_json_str(&value.to_string())
    }

    #[test]
    fn test_round_trip_via_file() {
        let graph = sample_graph();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");

        graph.save_to_json(&path).unwrap();
        let loaded = CodeDependencyGraph::load_from_json(&path).unwrap();

        assert_eq!(loaded, graph);
        assert_eq!(loaded.metadata["ratio"], json!(0.1 + 0.2));
        let link = loaded
            .link(
                "python:app/service.py",
                "java:src/User.java",
                &DependencyType::Other("rpc".into()),
            )
            .unwrap();
        assert_eq!(link.dependency_statements()[0].raw_target, "b");
        assert_eq!(link.dependency_statements()[1].raw_target, "a");
        assert_eq!(
            loaded.node("python:app/service.py").unwrap().dependency_statements().len(),
            3
        );
    }

    #[test]
    fn test_document_layout() {
        let value = sample_json();
        assert_eq!(value["graph_name"], "sample");

        let ids: Vec<&str> = value["nodes"]
            .as_array()
            .unwrap()
            .iter()
            .map(|n| n["unique_id"].as_str().unwrap())
            .collect();
        assert_eq!(
            ids,
            vec!["csharp:Web/Ctl.cs", "java:src/User.java", "python:app/service.py"]
        );

        let java = &value["nodes"][1];
        assert_eq!(java["language"], "java");
        assert_eq!(java["language_specific"]["package_name"], "com.app.model");
        assert_eq!(java["language_specific"]["interfaces"], json!(["Identifiable"]));
        assert_eq!(java["classes"][1]["visibility"], "package-private");

        let links = value["links"].as_array().unwrap();
        assert_eq!(links[0]["dependency_type"], "implicit_import");
        assert_eq!(links[1]["dependency_type"], "other:rpc");
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CodeDependencyGraph::load_from_json(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, DocumentError::Io(_)));
    }

    #[test]
    fn test_load_rejects_missing_field() {
        let mut value = sample_json();
        value["nodes"][0].as_object_mut().unwrap().remove("file_path");
        assert!(matches!(load_value(value), Err(DocumentError::Malformed(_))));

        let mut value = sample_json();
        value.as_object_mut().unwrap().remove("links");
        assert!(matches!(load_value(value), Err(DocumentError::Malformed(_))));
    }

    #[test]
    fn test_load_rejects_unknown_enum_values() {
        let mut value = sample_json();
        value["nodes"][0]["language"] = json!("kotlin");
        assert!(matches!(load_value(value), Err(DocumentError::Malformed(_))));

        let mut value = sample_json();
        value["links"][0]["dependency_type"] = json!("friendship");
        assert!(matches!(load_value(value), Err(DocumentError::Malformed(_))));

        let mut value = sample_json();
        value["nodes"][1]["classes"][0]["visibility"] = json!("secret");
        assert!(matches!(load_value(value), Err(DocumentError::Malformed(_))));
    }

    #[test]
    fn test_round_trip_with_empty_other_names() {
        let mut graph = CodeDependencyGraph::new("unnamed");
        let mut source = FileNode::new("a.kt", "a.kt", Language::Other(String::new()), None);
        source.add_class("A", Visibility::Other(String::new()));
        graph.add_node(source).unwrap();
        graph.add_node(FileNode::python("b.py", "b.py", None)).unwrap();
        graph
            .add_link(DependencyLink::single(
                "other::a.kt",
                "python:b.py",
                DependencyType::Other(String::new()),
                DependencyStatement::new("b", StatementKind::Other(String::new())),
            ))
            .unwrap();

        let json = graph.to_json_string().unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["nodes"][0]["language"], "other:");
        assert_eq!(value["nodes"][0]["classes"][0]["visibility"], "other:");
        assert_eq!(value["links"][0]["dependency_type"], "other:");
        assert_eq!(value["links"][0]["dependency_statements"][0]["kind"], "other:");

        let loaded = CodeDependencyGraph::from_json_str(&json).unwrap();
        assert_eq!(loaded, graph);
    }

    #[test]
    fn test_load_rejects_duplicate_class_names() {
        let mut value = sample_json();
        let first = value["nodes"][1]["classes"][0].clone();
        value["nodes"][1]["classes"].as_array_mut().unwrap().push(first);
        let err = load_value(value).unwrap_err();
        assert!(matches!(err, DocumentError::Malformed(_)));
        assert!(err.to_string().contains("class 'User' is declared twice"));
    }

    #[test]
    fn test_load_rejects_id_mismatch() {
        let mut value = sample_json();
        value["nodes"][0]["unique_id"] = json!("csharp:Other.cs");
        let err = load_value(value).unwrap_err();
        assert!(err.to_string().contains("does not match"));
    }

    #[test]
    fn test_load_rejects_duplicate_nodes_and_links() {
        let mut value = sample_json();
        let first = value["nodes"][0].clone();
        value["nodes"].as_array_mut().unwrap().push(first);
        assert!(matches!(load_value(value), Err(DocumentError::Malformed(_))));

        let mut value = sample_json();
        let first = value["links"][0].clone();
        value["links"].as_array_mut().unwrap().push(first);
        assert!(matches!(load_value(value), Err(DocumentError::Malformed(_))));
    }

    #[test]
    fn test_load_rejects_dangling_and_empty_links() {
        let mut value = sample_json();
        value["links"][0]["target_node_id"] = json!("java:Missing.java");
        let err = load_value(value).unwrap_err();
        assert!(err.to_string().contains("java:Missing.java"));

        let mut value = sample_json();
        value["links"][0]["dependency_statements"] = json!([]);
        assert!(matches!(load_value(value), Err(DocumentError::Malformed(_))));
    }

    #[test]
    fn test_language_specific_optional_on_load() {
        let mut value = sample_json();
        value["nodes"][2]
            .as_object_mut()
            .unwrap()
            .remove("language_specific");
        let loaded = load_value(value).unwrap();
        let node = loaded.node("python:app/service.py").unwrap();
        assert_eq!(node.details(), &LanguageDetails::Python(Default::default()));
    }
}
