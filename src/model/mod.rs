//! Entity model: file nodes, dependency statements and typed links.
//!
//! Every enumeration here is open for extension through an `Other(String)`
//! variant, written as `other:<name>` in text and JSON.

mod link;
mod node;
mod statement;

pub use link::{DependencyLink, DependencyType, LinkKey};
pub use node::{
    CSharpDetails, ClassDecl, FileNode, JavaDetails, Language, LanguageDetails, MemberKind,
    PythonDetails, Visibility,
};
pub use statement::{DependencyStatement, StatementKind};

/// Extracts the name of an `other:<name>` value. The name may be empty, so
/// every `Other` value reads back from its own text.
fn parse_other(s: &str) -> Option<String> {
    s.strip_prefix("other:").map(str::to_string)
}
