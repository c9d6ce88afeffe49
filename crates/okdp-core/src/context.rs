//! Resolve Context: what every stage may read during a pipeline run
use serde::{Deserialize, Serialize};
use std::fmt;

/// Branch identifier usable as a tag path segment.
///
/// Hierarchical branch names (`feature/my-feature`) are flattened with `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BranchId(String);

impl BranchId {
    pub fn new(raw: &str) -> Self {
        Self(raw.replace('/', "-"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct ResolveContext {
    pub branch: BranchId,
    /// Where the matrix specification came from, used in error messages
    pub source: String,
}

impl ResolveContext {
    pub fn new(branch: BranchId, source: impl Into<String>) -> Self {
        Self {
            branch,
            source: source.into(),
        }
    }
}
