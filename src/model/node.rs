//! File nodes: one vertex per source file.
//!
//! A [`FileNode`] is a common record (path, container, classes, statements)
//! plus a [`LanguageDetails`] payload holding the declarations only some
//! languages have. The payload never affects identity or edges.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::{parse_other, DependencyStatement};
use crate::error::ParseValueError;

/// Programming language of a file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Language {
    Java,
    Python,
    CSharp,
    JavaScript,
    TypeScript,
    Cpp,
    Go,
    /// Any language without built-in support.
    Other(String),
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Language::Java => "java",
            Language::Python => "python",
            Language::CSharp => "csharp",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Cpp => "cpp",
            Language::Go => "go",
            Language::Other(s) => return write!(f, "other:{}", s),
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Language {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "java" => Ok(Language::Java),
            "python" => Ok(Language::Python),
            "csharp" => Ok(Language::CSharp),
            "javascript" => Ok(Language::JavaScript),
            "typescript" => Ok(Language::TypeScript),
            "cpp" => Ok(Language::Cpp),
            "go" => Ok(Language::Go),
            _ => parse_other(s)
                .map(Language::Other)
                .ok_or_else(|| ParseValueError::new("language", s)),
        }
    }
}

impl TryFrom<String> for Language {
    type Error = ParseValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Language> for String {
    fn from(language: Language) -> Self {
        language.to_string()
    }
}

/// Access qualifier of a declared type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Visibility {
    Public,
    Protected,
    Internal,
    PackagePrivate,
    Private,
    Other(String),
}

impl Visibility {
    /// Whether a type with this visibility is visible outside its file.
    pub fn is_exported(&self, language: &Language) -> bool {
        match language {
            Language::Java => matches!(self, Visibility::Public | Visibility::Protected),
            Language::Python => !matches!(self, Visibility::Private),
            _ => matches!(self, Visibility::Public),
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Internal => "internal",
            Visibility::PackagePrivate => "package-private",
            Visibility::Private => "private",
            Visibility::Other(s) => return write!(f, "other:{}", s),
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Visibility {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Visibility::Public),
            "protected" => Ok(Visibility::Protected),
            "internal" => Ok(Visibility::Internal),
            "package-private" => Ok(Visibility::PackagePrivate),
            "private" => Ok(Visibility::Private),
            _ => parse_other(s)
                .map(Visibility::Other)
                .ok_or_else(|| ParseValueError::new("visibility", s)),
        }
    }
}

impl TryFrom<String> for Visibility {
    type Error = ParseValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Visibility> for String {
    fn from(visibility: Visibility) -> Self {
        visibility.to_string()
    }
}

/// A type declared in a file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: String,
    pub visibility: Visibility,
}

/// Java-only declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JavaDetails {
    pub interfaces: Vec<String>,
}

/// Python-only declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PythonDetails {
    pub functions: Vec<String>,
    pub variables: Vec<String>,
    pub is_package_init: bool,
}

/// C#-only declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CSharpDetails {
    pub interfaces: Vec<String>,
    pub structs: Vec<String>,
}

/// Language-specific payload of a [`FileNode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageDetails {
    Java(JavaDetails),
    Python(PythonDetails),
    CSharp(CSharpDetails),
    /// Languages without a dedicated payload.
    Generic(Language),
}

impl LanguageDetails {
    /// The empty payload matching `language`.
    pub fn for_language(language: &Language, file_name: &str) -> Self {
        match language {
            Language::Java => LanguageDetails::Java(JavaDetails::default()),
            Language::Python => LanguageDetails::Python(PythonDetails {
                is_package_init: file_name == "__init__.py",
                ..Default::default()
            }),
            Language::CSharp => LanguageDetails::CSharp(CSharpDetails::default()),
            other => LanguageDetails::Generic(other.clone()),
        }
    }

    pub fn language(&self) -> Language {
        match self {
            LanguageDetails::Java(_) => Language::Java,
            LanguageDetails::Python(_) => Language::Python,
            LanguageDetails::CSharp(_) => Language::CSharp,
            LanguageDetails::Generic(language) => language.clone(),
        }
    }
}

/// Kind of a language-specific declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Interface,
    Struct,
    Function,
    Variable,
}

/// One source file and its declarations.
///
/// # Example
///
/// ```rust
/// use codegraph::model::{DependencyStatement, FileNode, Language, Visibility};
///
/// let mut node = FileNode::java(
///     "src/main/java/com/example/core/A.java",
///     "A.java",
///     Some("com.example.core"),
/// );
/// node.add_class("User", Visibility::Public);
/// node.add_dependency(DependencyStatement::import("com.example.util.StringUtils"));
///
/// assert_eq!(node.unique_id(), "java:src/main/java/com/example/core/A.java");
/// assert_eq!(node.language(), Language::Java);
/// assert!(node.exports().contains(&"User".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FileNode {
    unique_id: String,
    file_path: String,
    file_name: String,
    container_name: Option<String>,
    classes: Vec<ClassDecl>,
    dependency_statements: Vec<DependencyStatement>,
    exports: Vec<String>,
    details: LanguageDetails,
    /// Free-form annotations carried alongside the node.
    pub metadata: BTreeMap<String, Value>,
}

impl FileNode {
    /// Creates a node for a file in any language.
    pub fn new(
        file_path: impl Into<String>,
        file_name: impl Into<String>,
        language: Language,
        container_name: Option<&str>,
    ) -> Self {
        let file_path = file_path.into();
        let file_name = file_name.into();
        let details = LanguageDetails::for_language(&language, &file_name);

        Self {
            unique_id: Self::derive_id(&language, &file_path),
            file_path,
            file_name,
            container_name: container_name.map(str::to_string),
            classes: Vec::new(),
            dependency_statements: Vec::new(),
            exports: Vec::new(),
            details,
            metadata: BTreeMap::new(),
        }
    }

    /// Creates a Java file node; `package_name` is the container.
    pub fn java(
        file_path: impl Into<String>,
        file_name: impl Into<String>,
        package_name: Option<&str>,
    ) -> Self {
        Self::new(file_path, file_name, Language::Java, package_name)
    }

    /// Creates a Python file node; `module_name` is the container.
    pub fn python(
        file_path: impl Into<String>,
        file_name: impl Into<String>,
        module_name: Option<&str>,
    ) -> Self {
        Self::new(file_path, file_name, Language::Python, module_name)
    }

    /// Creates a C# file node; `namespace` is the container.
    pub fn csharp(
        file_path: impl Into<String>,
        file_name: impl Into<String>,
        namespace: Option<&str>,
    ) -> Self {
        Self::new(file_path, file_name, Language::CSharp, namespace)
    }

    /// The identity a file of `language` at `file_path` receives.
    pub fn derive_id(language: &Language, file_path: &str) -> String {
        format!("{}:{}", language, file_path)
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn language(&self) -> Language {
        self.details.language()
    }

    pub fn container_name(&self) -> Option<&str> {
        self.container_name.as_deref()
    }

    /// `container.file_name`, or just the file name without a container.
    pub fn qualified_name(&self) -> String {
        match &self.container_name {
            Some(container) => format!("{}.{}", container, self.file_name),
            None => self.file_name.clone(),
        }
    }

    /// Like [`qualified_name`](Self::qualified_name) with the file
    /// extension removed, e.g. `app.models.user` for `user.py`.
    pub fn module_path(&self) -> String {
        let stem = self
            .file_name
            .rsplit_once('.')
            .map_or(self.file_name.as_str(), |(stem, _)| stem);
        match &self.container_name {
            Some(container) => format!("{}.{}", container, stem),
            None => stem.to_string(),
        }
    }

    pub fn classes(&self) -> &[ClassDecl] {
        &self.classes
    }

    pub fn dependency_statements(&self) -> &[DependencyStatement] {
        &self.dependency_statements
    }

    pub fn exports(&self) -> &[String] {
        &self.exports
    }

    pub fn details(&self) -> &LanguageDetails {
        &self.details
    }

    /// Records a declared type. Adding a name that is already declared
    /// leaves the node unchanged.
    pub fn add_class(&mut self, name: impl Into<String>, visibility: Visibility) {
        let name = name.into();
        if self.has_class(&name) {
            return;
        }
        let language = self.language();
        let underscored = language == Language::Python && name.starts_with('_');
        if visibility.is_exported(&language) && !underscored {
            self.add_export(name.clone());
        }
        self.classes.push(ClassDecl { name, visibility });
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.classes.iter().any(|c| c.name == name)
    }

    /// Appends a dependency statement. Identical statements are kept: a
    /// file may declare the same import twice.
    pub fn add_dependency(&mut self, statement: DependencyStatement) {
        self.dependency_statements.push(statement);
    }

    /// Records an exported name (idempotent).
    pub fn add_export(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.exports.contains(&name) {
            self.exports.push(name);
        }
    }

    /// Records a language-specific declaration.
    ///
    /// Returns `false`, leaving the node unchanged, when the node's language
    /// has no declarations of this kind.
    pub fn add_member(&mut self, kind: MemberKind, name: impl Into<String>) -> bool {
        let name = name.into();
        let list = match (&mut self.details, kind) {
            (LanguageDetails::Java(d), MemberKind::Interface) => &mut d.interfaces,
            (LanguageDetails::CSharp(d), MemberKind::Interface) => &mut d.interfaces,
            (LanguageDetails::CSharp(d), MemberKind::Struct) => &mut d.structs,
            (LanguageDetails::Python(d), MemberKind::Function) => &mut d.functions,
            (LanguageDetails::Python(d), MemberKind::Variable) => &mut d.variables,
            _ => return false,
        };
        if !list.contains(&name) {
            list.push(name);
        }
        true
    }

    /// Records an interface (Java, C#), exporting it when `visibility`
    /// allows.
    pub fn add_interface(&mut self, name: impl Into<String>, visibility: Visibility) -> bool {
        let name = name.into();
        let added = self.add_member(MemberKind::Interface, name.clone());
        if added && visibility.is_exported(&self.language()) {
            self.add_export(name);
        }
        added
    }

    /// Records a struct (C#).
    pub fn add_struct(&mut self, name: impl Into<String>) -> bool {
        self.add_member(MemberKind::Struct, name)
    }

    /// Records a function (Python); public names are exported.
    pub fn add_function(&mut self, name: impl Into<String>, is_private: bool) -> bool {
        let name = name.into();
        let added = self.add_member(MemberKind::Function, name.clone());
        if added && !is_private && !name.starts_with('_') {
            self.add_export(name);
        }
        added
    }

    /// Records a module-level variable (Python).
    pub fn add_variable(&mut self, name: impl Into<String>) -> bool {
        self.add_member(MemberKind::Variable, name)
    }

    /// Uniform key-value view of the language-specific fields.
    ///
    /// Intended for serialization and display only.
    pub fn get_language_specific_info(&self) -> BTreeMap<String, Value> {
        let mut info = BTreeMap::new();
        let class_names: Vec<&str> = self.classes.iter().map(|c| c.name.as_str()).collect();
        let access_modifiers: BTreeMap<&str, String> = self
            .classes
            .iter()
            .map(|c| (c.name.as_str(), c.visibility.to_string()))
            .collect();

        match &self.details {
            LanguageDetails::Java(d) => {
                info.insert("package_name".into(), json!(self.container_name));
                info.insert("classes".into(), json!(class_names));
                info.insert("interfaces".into(), json!(d.interfaces));
                info.insert("access_modifiers".into(), json!(access_modifiers));
            }
            LanguageDetails::Python(d) => {
                info.insert("module_name".into(), json!(self.container_name));
                info.insert("functions".into(), json!(d.functions));
                info.insert("classes".into(), json!(class_names));
                info.insert("variables".into(), json!(d.variables));
                info.insert("is_package_init".into(), json!(d.is_package_init));
            }
            LanguageDetails::CSharp(d) => {
                info.insert("namespace".into(), json!(self.container_name));
                info.insert("classes".into(), json!(class_names));
                info.insert("interfaces".into(), json!(d.interfaces));
                info.insert("structs".into(), json!(d.structs));
                info.insert("access_modifiers".into(), json!(access_modifiers));
            }
            LanguageDetails::Generic(_) => {
                info.insert("container_name".into(), json!(self.container_name));
                info.insert("classes".into(), json!(class_names));
            }
        }

        info
    }

    /// Rebuilds a node from its persisted parts. The id is derived, never
    /// taken from the caller.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        file_path: String,
        file_name: String,
        container_name: Option<String>,
        classes: Vec<ClassDecl>,
        dependency_statements: Vec<DependencyStatement>,
        exports: Vec<String>,
        details: LanguageDetails,
        metadata: BTreeMap<String, Value>,
    ) -> Self {
        Self {
            unique_id: Self::derive_id(&details.language(), &file_path),
            file_path,
            file_name,
            container_name,
            classes,
            dependency_statements,
            exports,
            details,
            metadata,
        }
    }
}

impl fmt::Display for FileNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.unique_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_parse_and_display() {
        assert_eq!("csharp".parse::<Language>().unwrap(), Language::CSharp);
        assert_eq!(Language::CSharp.to_string(), "csharp");
        assert_eq!(
            "other:kotlin".parse::<Language>().unwrap(),
            Language::Other("kotlin".to_string())
        );
        assert!("kotlin".parse::<Language>().is_err());
    }

    #[test]
    fn test_unique_id_derived_from_language_and_path() {
        let node = FileNode::python("app/models/user.py", "user.py", Some("app.models"));
        assert_eq!(node.unique_id(), "python:app/models/user.py");
        assert_eq!(node.qualified_name(), "app.models.user.py");
        assert_eq!(node.module_path(), "app.models.user");
    }

    #[test]
    fn test_add_class_is_idempotent() {
        let mut node = FileNode::java("A.java", "A.java", Some("com.a"));
        node.add_class("User", Visibility::Public);
        node.add_class("User", Visibility::Private);

        assert_eq!(node.classes().len(), 1);
        assert_eq!(node.classes()[0].visibility, Visibility::Public);
    }

    #[test]
    fn test_add_class_exports_by_language() {
        let mut java = FileNode::java("A.java", "A.java", None);
        java.add_class("Open", Visibility::Protected);
        java.add_class("Hidden", Visibility::PackagePrivate);
        assert_eq!(java.exports(), &["Open".to_string()]);

        let mut csharp = FileNode::csharp("A.cs", "A.cs", None);
        csharp.add_class("Service", Visibility::Internal);
        assert!(csharp.exports().is_empty());

        let mut python = FileNode::python("a.py", "a.py", None);
        python.add_class("Model", Visibility::Public);
        python.add_class("_Helper", Visibility::Public);
        assert_eq!(python.exports(), &["Model".to_string()]);
    }

    #[test]
    fn test_add_dependency_keeps_duplicates_in_order() {
        let mut node = FileNode::java("A.java", "A.java", None);
        node.add_dependency(DependencyStatement::import("java.util.List"));
        node.add_dependency(DependencyStatement::import("java.util.Map"));
        node.add_dependency(DependencyStatement::import("java.util.List"));

        let targets: Vec<&str> = node
            .dependency_statements()
            .iter()
            .map(|s| s.raw_target.as_str())
            .collect();
        assert_eq!(targets, vec!["java.util.List", "java.util.Map", "java.util.List"]);
    }

    #[test]
    fn test_language_members() {
        let mut java = FileNode::java("A.java", "A.java", None);
        assert!(java.add_interface("Repository", Visibility::Public));
        assert!(!java.add_struct("Point"));
        assert!(!java.add_function("main", false));

        let mut python = FileNode::python("__init__.py", "__init__.py", Some("app"));
        assert!(python.add_function("load", false));
        assert!(python.add_function("_cache", false));
        assert!(python.add_variable("VERSION"));
        assert!(!python.add_interface("Protocol", Visibility::Public));

        match python.details() {
            LanguageDetails::Python(d) => {
                assert!(d.is_package_init);
                assert_eq!(d.functions, vec!["load", "_cache"]);
            }
            other => panic!("unexpected payload: {:?}", other),
        }
        assert_eq!(python.exports(), &["load".to_string()]);
    }

    #[test]
    fn test_language_specific_info_keys() {
        let mut node = FileNode::csharp("Svc.cs", "Svc.cs", Some("Acme.Services"));
        node.add_class("Svc", Visibility::Public);
        node.add_struct("Options");

        let info = node.get_language_specific_info();
        assert_eq!(info["namespace"], json!("Acme.Services"));
        assert_eq!(info["classes"], json!(["Svc"]));
        assert_eq!(info["structs"], json!(["Options"]));
        assert_eq!(info["access_modifiers"]["Svc"], json!("public"));

        let go = FileNode::new("main.go", "main.go", Language::Go, Some("main"));
        let info = go.get_language_specific_info();
        assert_eq!(info["container_name"], json!("main"));
        assert_eq!(go.language(), Language::Go);
    }
}
