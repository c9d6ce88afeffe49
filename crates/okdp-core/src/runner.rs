//! Pipeline Runner: chains stages and records a hash proof per stage
use crate::context::ResolveContext;
use crate::data_model::StageData;
use crate::error::OkdpError;
use crate::stage::{Stage, StageError};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageProof {
    pub id: String,
    pub in_hash: String,
    pub out_hash: String,
    pub items_in: usize,
    pub items_out: usize,
    pub deterministic: bool,
    pub latency_ms: u64,
}

pub struct PipelineRunner {
    stages: Vec<Box<dyn Stage>>,
    pipeline_id: String,
}

impl PipelineRunner {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        let pipeline_id = stages
            .iter()
            .map(|s| s.id().split('.').next().unwrap_or("?"))
            .collect::<Vec<_>>()
            .join("→");

        Self { stages, pipeline_id }
    }

    pub fn run(
        &self,
        input: StageData,
        ctx: &ResolveContext,
    ) -> Result<(StageData, Vec<StageProof>), OkdpError> {
        let mut current = input;
        let mut proofs = Vec::with_capacity(self.stages.len());

        for stage in &self.stages {
            let start = Instant::now();
            let in_hash = hash_data(&current)?;
            let items_in = current.len();

            current = stage.run(current, ctx)?;

            let out_hash = hash_data(&current)?;
            let latency_ms = start.elapsed().as_millis() as u64;
            debug!(
                stage = stage.id(),
                items_in,
                items_out = current.len(),
                "stage completed"
            );

            proofs.push(StageProof {
                id: stage.id().to_string(),
                in_hash,
                out_hash,
                items_in,
                items_out: current.len(),
                deterministic: stage.deterministic(),
                latency_ms,
            });
        }

        Ok((current, proofs))
    }

    /// Re-runs the pipeline and checks that every deterministic stage
    /// reproduces the hashes recorded in `proofs`.
    pub fn replay(
        &self,
        input: StageData,
        ctx: &ResolveContext,
        proofs: &[StageProof],
    ) -> Result<StageData, OkdpError> {
        let (output, replayed) = self.run(input, ctx)?;
        if replayed.len() != proofs.len() {
            return Err(StageError::Determinism(format!(
                "expected {} stage proofs, replay produced {}",
                proofs.len(),
                replayed.len()
            ))
            .into());
        }

        for (recorded, fresh) in proofs.iter().zip(&replayed) {
            if fresh.deterministic && recorded.out_hash != fresh.out_hash {
                return Err(StageError::Determinism(format!(
                    "stage {} produced {} instead of {}",
                    fresh.id, fresh.out_hash, recorded.out_hash
                ))
                .into());
            }
        }

        Ok(output)
    }

    pub fn pipeline_id(&self) -> &str {
        &self.pipeline_id
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

fn hash_data(data: &StageData) -> Result<String, OkdpError> {
    let bytes = serde_json::to_vec(data)?;
    Ok(format!("blake3:{}", blake3::hash(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::BranchId;
    use crate::data_model::{CompatibilityGroup, MatrixRow};

    struct CountRows;

    impl Stage for CountRows {
        fn id(&self) -> &'static str {
            "count.rows.v1"
        }

        fn run(&self, input: StageData, _ctx: &ResolveContext) -> Result<StageData, StageError> {
            match input {
                StageData::Groups(groups) => Ok(StageData::Rows(
                    groups
                        .iter()
                        .map(|g| MatrixRow::new().with("fields", g.len().to_string()))
                        .collect(),
                )),
                other => Err(StageError::mismatch("groups", &other)),
            }
        }
    }

    fn ctx() -> ResolveContext {
        ResolveContext::new(BranchId::new("main"), "test")
    }

    #[test]
    fn test_pipeline_id_uses_stage_prefix() {
        let runner = PipelineRunner::new(vec![Box::new(CountRows), Box::new(CountRows)]);
        assert_eq!(runner.pipeline_id(), "count→count");
        assert_eq!(runner.len(), 2);
    }

    #[test]
    fn test_run_records_proofs() {
        let runner = PipelineRunner::new(vec![Box::new(CountRows)]);
        let input = StageData::Groups(vec![CompatibilityGroup::new().with("a", ["1"])]);

        let (output, proofs) = runner.run(input.clone(), &ctx()).unwrap();
        assert_eq!(output, StageData::Rows(vec![MatrixRow::new().with("fields", "1")]));
        assert_eq!(proofs.len(), 1);
        assert_eq!(proofs[0].items_in, 1);
        assert_eq!(proofs[0].items_out, 1);
        assert!(proofs[0].in_hash.starts_with("blake3:"));

        let replayed = runner.replay(input, &ctx(), &proofs).unwrap();
        assert_eq!(replayed, output);
    }

    #[test]
    fn test_stage_errors_are_propagated() {
        let runner = PipelineRunner::new(vec![Box::new(CountRows), Box::new(CountRows)]);
        let err = runner
            .run(StageData::Groups(vec![CompatibilityGroup::new()]), &ctx())
            .unwrap_err();
        assert!(err.to_string().contains("SCHEMA/MISMATCH: expected groups, got rows"));
    }

    #[test]
    fn test_replay_detects_tampered_proofs() {
        let runner = PipelineRunner::new(vec![Box::new(CountRows)]);
        let input = StageData::Groups(vec![CompatibilityGroup::new()]);
        let (_, mut proofs) = runner.run(input.clone(), &ctx()).unwrap();
        proofs[0].out_hash = "blake3:0".to_string();

        let err = runner.replay(input, &ctx(), &proofs).unwrap_err();
        assert!(err.to_string().contains("DET/HASH"));
    }
}
