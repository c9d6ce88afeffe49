//! Loading of the versions matrix document.
//!
//! ```yaml
//! compatibility-matrix:
//!   - python_version: "3.11"
//!     spark_version: [3.5.0]
//!     java_version: [17, 21]
//!     ...
//! build-matrix:
//!   spark_version: 3.5.0
//! ```

use crate::normalizer::{normalize_fields, RawFields};
use okdp_core::{BuildFilter, CompatibilityGroup, OkdpError};
use serde::Deserialize;
use std::path::Path;

/// Top-level document structure, before normalization
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatrixDocument {
    #[serde(rename = "compatibility-matrix", default)]
    pub compatibility_matrix: Option<Vec<RawFields>>,
    #[serde(rename = "build-matrix", default)]
    pub build_matrix: Option<RawFields>,
}

/// Normalized matrix specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixSpec {
    pub groups: Vec<CompatibilityGroup>,
    pub filter: BuildFilter,
}

impl MatrixSpec {
    /// Load and normalize a specification from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, OkdpError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| OkdpError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and normalize a specification from YAML content
    pub fn from_yaml(yaml: &str) -> Result<Self, OkdpError> {
        let document: MatrixDocument = serde_yaml::from_str(yaml)
            .map_err(|e| OkdpError::Parse(format!("Failed to parse versions matrix: {}", e)))?;
        Self::from_document(document)
    }

    /// Validate the mandatory section, then normalize every value
    pub fn from_document(document: MatrixDocument) -> Result<Self, OkdpError> {
        let raw_groups = match document.compatibility_matrix {
            Some(groups) if !groups.is_empty() => groups,
            _ => {
                return Err(OkdpError::Config(
                    "The compatibility-matrix section is mandatory".to_string(),
                ))
            }
        };

        Ok(Self {
            groups: raw_groups.iter().map(normalize_fields).collect(),
            filter: document
                .build_matrix
                .as_ref()
                .map(normalize_fields)
                .unwrap_or_default(),
        })
    }
}
