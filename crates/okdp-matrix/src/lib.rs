//! OKDP Matrix: version compatibility matrix resolution
//!
//! Resolves the declared compatibility groups (Spark, Python, Java, Scala,
//! Hadoop) and an optional build filter into the flat job matrix consumed by
//! the CI, plus the reduced matrix of unique Python environments.
//!
//! # Pipeline Flow
//!
//! ```text
//! YAML → normalize → group → intersect → validate → expand → validate rows → tag → variant
//!                                                                            ↓
//!                                                   spark matrix → python matrix
//! ```
//!
//! # Example
//!
//! ```
//! use okdp_matrix::VersionCompatibilityMatrix;
//!
//! let yaml = r#"
//! compatibility-matrix:
//!   - python_version: "3.11"
//!     spark_version: [3.5.0]
//!     java_version: [17, 21]
//!     scala_version: ["2.12", "2.13"]
//!     hadoop_version: 3
//!     spark_download_url: https://archive.apache.org/dist/spark/
//! build-matrix:
//!   java_version: 17
//! "#;
//!
//! let matrix = VersionCompatibilityMatrix::from_yaml(yaml, "feature/x", "inline").unwrap();
//! let generated = matrix.generate().unwrap();
//! assert_eq!(generated.spark.len(), 2);
//! assert_eq!(generated.python.len(), 1);
//! ```

pub mod dedupe;
pub mod expander;
pub mod grouper;
pub mod intersect;
pub mod loader;
pub mod normalizer;
pub mod stages;
pub mod tags;
pub mod validator;
pub mod variant;

pub use loader::{MatrixDocument, MatrixSpec};
pub use tags::TagDeriver;
pub use variant::VariantPolicy;

use okdp_core::{
    BranchId, BuildFilter, CompatibilityGroup, MatrixRow, OkdpError, PipelineRunner,
    ResolveContext, StageData, StageProof,
};
use std::path::Path;
use tracing::info;

/// Output of a matrix resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMatrix {
    /// Fully expanded and tagged rows
    pub spark: Vec<MatrixRow>,
    /// Unique `python_version` / `python_dev_tag` pairs
    pub python: Vec<MatrixRow>,
    pub proofs: Vec<StageProof>,
}

impl GeneratedMatrix {
    /// An empty matrix means the configuration filtered out every candidate
    pub fn ensure_not_empty(&self, source: &str) -> Result<(), OkdpError> {
        if self.spark.is_empty() {
            return Err(OkdpError::EmptyMatrix(source.to_string()));
        }
        Ok(())
    }

    /// The two labeled output lines consumed by the CI
    pub fn render_outputs(&self) -> Result<[String; 2], OkdpError> {
        Ok([
            format!("spark={}", serde_json::to_string(&self.spark)?),
            format!("python={}", serde_json::to_string(&self.python)?),
        ])
    }
}

pub struct VersionCompatibilityMatrix {
    spec: MatrixSpec,
    ctx: ResolveContext,
    policy: VariantPolicy,
}

impl VersionCompatibilityMatrix {
    pub fn from_path(path: impl AsRef<Path>, git_branch: &str) -> Result<Self, OkdpError> {
        let path = path.as_ref();
        info!(
            path = %path.display(),
            git_branch,
            version = okdp_core::OKDP_VERSION,
            "Building version compatibility matrix"
        );
        let spec = MatrixSpec::load(path)?;
        Ok(Self::from_spec(spec, git_branch, path.display().to_string()))
    }

    pub fn from_yaml(yaml: &str, git_branch: &str, source: &str) -> Result<Self, OkdpError> {
        Ok(Self::from_spec(MatrixSpec::from_yaml(yaml)?, git_branch, source))
    }

    /// Build from already normalized groups and filter
    pub fn from_parts(
        groups: Vec<CompatibilityGroup>,
        filter: BuildFilter,
        git_branch: &str,
    ) -> Result<Self, OkdpError> {
        if groups.is_empty() {
            return Err(OkdpError::Config(
                "The compatibility-matrix section is mandatory".to_string(),
            ));
        }
        Ok(Self::from_spec(MatrixSpec { groups, filter }, git_branch, "inline"))
    }

    fn from_spec(spec: MatrixSpec, git_branch: &str, source: impl Into<String>) -> Self {
        Self {
            spec,
            ctx: ResolveContext::new(BranchId::new(git_branch), source),
            policy: VariantPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: VariantPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn spec(&self) -> &MatrixSpec {
        &self.spec
    }

    pub fn branch(&self) -> &BranchId {
        &self.ctx.branch
    }

    pub fn source(&self) -> &str {
        &self.ctx.source
    }

    pub fn runner(&self) -> PipelineRunner {
        PipelineRunner::new(stages::matrix_stages(
            self.spec.filter.clone(),
            self.policy.clone(),
        ))
    }

    /// Resolve the spark matrix and its reduced python projection
    pub fn generate(&self) -> Result<GeneratedMatrix, OkdpError> {
        let runner = self.runner();
        let input = StageData::Groups(self.spec.groups.clone());
        let (output, proofs) = runner.run(input, &self.ctx)?;

        let spark = match output {
            StageData::Rows(rows) => rows,
            StageData::Groups(_) => {
                return Err(OkdpError::Config(format!(
                    "pipeline {} did not produce rows",
                    runner.pipeline_id()
                )))
            }
        };
        let python = dedupe::python_matrix(&spark);

        info!(
            pipeline = runner.pipeline_id(),
            spark_rows = spark.len(),
            python_rows = python.len(),
            "Version compatibility matrix generated"
        );

        Ok(GeneratedMatrix {
            spark,
            python,
            proofs,
        })
    }
}
