//! Dependency statements: the textual evidence behind a dependency.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::parse_other;
use crate::error::ParseValueError;

/// The syntactic form of a dependency statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StatementKind {
    /// Java/Python `import`, TypeScript `import ... from`.
    Import,
    /// C# `using`.
    Using,
    /// C/C++ `#include`.
    Include,
    /// CommonJS `require()`.
    Require,
    /// Python `from x import y`.
    From,
    /// Any other statement form, kept verbatim.
    Other(String),
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementKind::Import => write!(f, "import"),
            StatementKind::Using => write!(f, "using"),
            StatementKind::Include => write!(f, "include"),
            StatementKind::Require => write!(f, "require"),
            StatementKind::From => write!(f, "from"),
            StatementKind::Other(s) => write!(f, "other:{}", s),
        }
    }
}

impl FromStr for StatementKind {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "import" => Ok(StatementKind::Import),
            "using" => Ok(StatementKind::Using),
            "include" => Ok(StatementKind::Include),
            "require" => Ok(StatementKind::Require),
            "from" => Ok(StatementKind::From),
            _ => parse_other(s)
                .map(StatementKind::Other)
                .ok_or_else(|| ParseValueError::new("statement kind", s)),
        }
    }
}

impl TryFrom<String> for StatementKind {
    type Error = ParseValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StatementKind> for String {
    fn from(kind: StatementKind) -> Self {
        kind.to_string()
    }
}

/// A single dependency declaration, e.g. one `import` line.
///
/// Statements are plain values: two statements are equal when every field
/// is equal.
///
/// # Example
///
/// ```rust
/// use codegraph::model::{DependencyStatement, StatementKind};
///
/// let stmt = DependencyStatement::import("com.example.util.StringUtils").with_line(3);
/// assert_eq!(stmt.kind, StatementKind::Import);
/// assert_eq!(stmt.line_number, Some(3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyStatement {
    /// The dependency target as written (e.g. a fully-qualified class name).
    pub raw_target: String,

    /// How the dependency was declared.
    pub kind: StatementKind,

    /// Local alias, as in `import numpy as np`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    /// True for wildcard imports such as `import com.example.*`.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_wildcard: bool,

    /// Line of the statement in its source file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u32>,
}

impl DependencyStatement {
    /// Creates a statement with no alias, wildcard or line information.
    pub fn new(raw_target: impl Into<String>, kind: StatementKind) -> Self {
        Self {
            raw_target: raw_target.into(),
            kind,
            alias: None,
            is_wildcard: false,
            line_number: None,
        }
    }

    /// Shorthand for an `import` statement.
    pub fn import(raw_target: impl Into<String>) -> Self {
        Self::new(raw_target, StatementKind::Import)
    }

    /// Shorthand for a `using` statement.
    pub fn using(raw_target: impl Into<String>) -> Self {
        Self::new(raw_target, StatementKind::Using)
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_line(mut self, line_number: u32) -> Self {
        self.line_number = Some(line_number);
        self
    }

    /// Marks the statement as a wildcard import.
    pub fn wildcard(mut self) -> Self {
        self.is_wildcard = true;
        self
    }

    /// The target with any trailing `.*` wildcard segment removed.
    pub fn target_prefix(&self) -> &str {
        self.raw_target
            .strip_suffix(".*")
            .unwrap_or(&self.raw_target)
    }
}

impl fmt::Display for DependencyStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.raw_target)?;
        if let Some(alias) = &self.alias {
            write!(f, " as {}", alias)?;
        }
        Ok(())
    }
}
