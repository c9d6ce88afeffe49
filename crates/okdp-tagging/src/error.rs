use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaggingError {
    #[error("unknown image: {0}")]
    UnknownImage(String),

    #[error("invalid image name '{0}', expected <name>:<tag>")]
    InvalidImageName(String),

    #[error("unsupported {kind} '{value}'")]
    Unsupported { kind: &'static str, value: String },

    #[error("{probe} version not found: {reason}")]
    VersionNotFound { probe: String, reason: String },

    #[error("command failed: {command}: {message}")]
    Command { command: String, message: String },
}
