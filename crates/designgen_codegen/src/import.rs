//! Generated `use` declarations.

use std::fmt;

/// A `use` declaration emitted by a file header.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImportSpec {
    /// Local name the path is bound to, if it differs from the last path segment.
    pub alias: Option<String>,
    /// Full path of the imported item (for example `std::collections::BTreeMap`).
    pub path: String,
}

impl ImportSpec {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            alias: None,
            path: path.into(),
        }
    }

    pub fn aliased(alias: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            alias: Some(alias.into()),
            path: path.into(),
        }
    }

    /// Import a trait for its methods only (`use path as _;`).
    ///
    /// Anonymous imports are never removed by normalization since their uses cannot be seen by name.
    pub fn anonymous(path: impl Into<String>) -> Self {
        Self::aliased("_", path)
    }

    /// The Rust source for this import.
    pub fn code(&self) -> String {
        match &self.alias {
            Some(alias) => format!("use {} as {};", self.path, alias),
            None => format!("use {};", self.path),
        }
    }
}

impl fmt::Display for ImportSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code())
    }
}
