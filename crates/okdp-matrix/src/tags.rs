//! Dev tags of the intermediate images.
//!
//! Intermediate images are pushed with a unique, branch scoped `latest` tag
//! so that later build stages can pull them without rebuilding their bases.

use okdp_core::fields::{
    JAVA_VERSION, PYTHON_DEV_TAG, PYTHON_VERSION, SCALA_VERSION, SPARK_DEV_TAG, SPARK_VERSION,
};
use okdp_core::{BranchId, MatrixRow};

#[derive(Debug, Clone)]
pub struct TagDeriver {
    pub branch: BranchId,
    /// Scala version rendered in the spark tag when the row has none
    pub fallback_scala: String,
}

impl TagDeriver {
    pub fn new(branch: BranchId) -> Self {
        Self {
            branch,
            fallback_scala: "2.12".to_string(),
        }
    }

    pub fn spark_dev_tag(&self, row: &MatrixRow) -> String {
        let scala = match row.get(SCALA_VERSION) {
            Some(v) if !v.is_empty() => v,
            _ => self.fallback_scala.as_str(),
        };
        format!(
            "spark{}-python{}-java{}-scala{}-{}-latest",
            field(row, SPARK_VERSION),
            field(row, PYTHON_VERSION),
            field(row, JAVA_VERSION),
            scala,
            self.branch
        )
    }

    pub fn python_dev_tag(&self, python_version: &str) -> String {
        format!("python{}-{}-latest", python_version, self.branch)
    }

    /// Appends `spark_dev_tag` then `python_dev_tag` to the row
    pub fn derive(&self, mut row: MatrixRow) -> MatrixRow {
        let spark_tag = self.spark_dev_tag(&row);
        let python_tag = self.python_dev_tag(field(&row, PYTHON_VERSION));
        row.set(SPARK_DEV_TAG, spark_tag);
        row.set(PYTHON_DEV_TAG, python_tag);
        row
    }

    pub fn add_latest_dev_tags(&self, rows: Vec<MatrixRow>) -> Vec<MatrixRow> {
        rows.into_iter().map(|row| self.derive(row)).collect()
    }
}

fn field<'a>(row: &'a MatrixRow, name: &str) -> &'a str {
    row.get(name).unwrap_or_default()
}
