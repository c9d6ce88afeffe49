//! Scala variant normalization.
//!
//! Spark distributions are published with a `-scala2.13` suffix only for
//! the 2.13 build of Spark 3.x, e.g.
//! `spark-3.4.0-bin-hadoop3-scala2.13.tgz`. From Spark 4 the suffix is gone.

use okdp_core::fields::{SCALA_VERSION, SPARK_VERSION};
use okdp_core::{MatrixRow, OkdpError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantPolicy {
    /// Field cleared or kept by the policy
    pub field: String,
    /// Field whose major version selects the rule
    pub engine_field: String,
    /// From this engine major version on, the variant is always cleared
    pub major_threshold: u32,
    /// Below the threshold, the only value kept as-is
    pub pinned: String,
}

impl Default for VariantPolicy {
    fn default() -> Self {
        Self {
            field: SCALA_VERSION.to_string(),
            engine_field: SPARK_VERSION.to_string(),
            major_threshold: 4,
            pinned: "2.13".to_string(),
        }
    }
}

impl VariantPolicy {
    /// Normalized value of the variant field for one row.
    ///
    /// The major version check takes precedence over the pinned value.
    pub fn resolve(&self, row: &MatrixRow, current: &str) -> Result<String, OkdpError> {
        if self.engine_major(row)? >= self.major_threshold {
            return Ok(String::new());
        }
        if current == self.pinned {
            Ok(current.to_string())
        } else {
            Ok(String::new())
        }
    }

    pub fn apply(&self, rows: Vec<MatrixRow>) -> Result<Vec<MatrixRow>, OkdpError> {
        rows.into_iter()
            .map(|mut row| {
                if let Some(current) = row.get(&self.field) {
                    let resolved = self.resolve(&row, current)?;
                    row.set(&self.field, resolved);
                }
                Ok(row)
            })
            .collect()
    }

    /// An absent engine field counts as major 0, a blank one is an error.
    fn engine_major(&self, row: &MatrixRow) -> Result<u32, OkdpError> {
        let Some(version) = row.get(&self.engine_field) else {
            return Ok(0);
        };
        let major = version.split('.').next().unwrap_or_default();
        major.parse().map_err(|e: std::num::ParseIntError| OkdpError::InvalidVersion {
            field: self.engine_field.clone(),
            value: version.to_string(),
            reason: e.to_string(),
        })
    }
}
