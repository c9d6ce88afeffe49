//! Unified Error Model
use crate::stage::StageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OkdpError {
    #[error("CONFIG/{0}")]
    Config(String),

    #[error("PARSE/{0}")]
    Parse(String),

    #[error("IO/{path}: {message}")]
    Io { path: String, message: String },

    #[error("VERSION/invalid {field} '{value}': {reason}")]
    InvalidVersion {
        field: String,
        value: String,
        reason: String,
    },

    #[error("EMPTY/The resulting build matrix was empty. Please, review your configuration '{0}'")]
    EmptyMatrix(String),

    #[error("STAGE/{0}")]
    Stage(StageError),

    #[error("SERIALIZE/{0}")]
    Serialize(String),
}

impl From<serde_json::Error> for OkdpError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialize(err.to_string())
    }
}

/// Version errors raised inside a stage surface as `InvalidVersion`
impl From<StageError> for OkdpError {
    fn from(err: StageError) -> Self {
        match err {
            StageError::InvalidVersion { field, value, reason } => {
                Self::InvalidVersion { field, value, reason }
            }
            other => Self::Stage(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_version_error_keeps_its_type() {
        let err: OkdpError = StageError::InvalidVersion {
            field: "spark_version".to_string(),
            value: "".to_string(),
            reason: "cannot parse integer from empty string".to_string(),
        }
        .into();
        assert!(matches!(err, OkdpError::InvalidVersion { ref field, .. } if field == "spark_version"));
        assert!(err.to_string().starts_with("VERSION/invalid spark_version ''"));
    }

    #[test]
    fn test_other_stage_errors_are_wrapped() {
        let err: OkdpError = StageError::Determinism("drift".to_string()).into();
        assert_eq!(err.to_string(), "STAGE/DET/HASH: drift");
    }
}
