//! OKDP Core: data model, stage trait and pipeline runner
//!
//! Shared building blocks for the build matrix resolution engine. Every stage
//! is a pure function over [`StageData`] and the runner chains them while
//! recording a hash proof per stage, so two runs over the same input can be
//! compared for bit-identical output.

pub mod stage;
pub mod runner;
pub mod data_model;
pub mod error;
pub mod context;
pub mod fields;

pub use stage::{Stage, StageError};
pub use runner::{PipelineRunner, StageProof};
pub use data_model::{BuildFilter, CompatibilityGroup, FieldPresence, MatrixRow, StageData};
pub use context::{BranchId, ResolveContext};
pub use error::OkdpError;

/// Engine version reported in logs
pub const OKDP_VERSION: &str = env!("CARGO_PKG_VERSION");
