//! Stage Trait: single contract for every matrix stage
use crate::context::ResolveContext;
use crate::data_model::StageData;

/// Contract of a matrix resolution stage
pub trait Stage: Send + Sync {
    /// Unique stage id (ex: "intersect.build-filter.v1")
    fn id(&self) -> &'static str;

    /// Whether the output is a pure function of the input (default: true)
    fn deterministic(&self) -> bool {
        true
    }

    /// Runs the stage
    fn run(&self, input: StageData, ctx: &ResolveContext) -> Result<StageData, StageError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageError {
    ValidationFailed(String),
    InvalidVersion {
        field: String,
        value: String,
        reason: String,
    },
    SchemaMismatch { expected: String, got: String },
    Determinism(String),
}

impl StageError {
    /// Shorthand for stages receiving the wrong payload kind
    pub fn mismatch(expected: &str, got: &StageData) -> Self {
        Self::SchemaMismatch {
            expected: expected.to_string(),
            got: got.kind().to_string(),
        }
    }
}

impl std::fmt::Display for StageError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "PARSE/VALIDATION: {}", msg),
            Self::InvalidVersion { field, value, reason } => {
                write!(f, "VERSION/invalid {} '{}': {}", field, value, reason)
            }
            Self::SchemaMismatch { expected, got } => {
                write!(f, "SCHEMA/MISMATCH: expected {}, got {}", expected, got)
            }
            Self::Determinism(msg) => write!(f, "DET/HASH: {}", msg),
        }
    }
}

impl std::error::Error for StageError {}
